use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub enum Gender {
    Male,
    Female,
    #[default]
    Other,
}

/// Student profile. The academic fields are informational and set by the
/// institution; only `id` and `email` are treated as immutable identity.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct User {
    pub id: String,
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub gender: Gender,
    #[serde(default)]
    pub english_level: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_photo_url: Option<String>,
    #[serde(default)]
    pub faculty: String,
    #[serde(default)]
    pub department: String,
    #[serde(default)]
    pub registration_type: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub class_level: String,
    #[serde(default)]
    pub education_type: String,
    #[serde(default)]
    pub registration_date: String,
}

impl User {
    /// Profile synthesized for an authenticated identity that has no stored
    /// profile row yet.
    pub fn default_profile(id: &str, email: &str) -> Self {
        let first_name = email
            .split('@')
            .next()
            .filter(|local| !local.is_empty())
            .unwrap_or("Student")
            .to_string();

        User {
            id: id.to_string(),
            email: email.to_string(),
            first_name,
            last_name: String::new(),
            gender: Gender::Other,
            english_level: String::new(),
            profile_photo_url: None,
            faculty: String::new(),
            department: String::new(),
            registration_type: String::new(),
            status: "ACTIVE".to_string(),
            class_level: String::new(),
            education_type: String::new(),
            registration_date: String::new(),
        }
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}
