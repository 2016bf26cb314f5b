use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    pub sub: String, // owner id
    pub email: String,
    pub exp: usize,
    pub iat: usize,
}

impl SessionClaims {
    pub fn new(user_id: &str, email: &str, expiration_hours: i64) -> Self {
        let now = Utc::now();
        let exp = now + Duration::hours(expiration_hours);

        Self {
            sub: user_id.to_string(),
            email: email.to_string(),
            iat: now.timestamp() as usize,
            exp: exp.timestamp() as usize,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_claims_creation() {
        let claims = SessionClaims::new("user-1", "student@uni.example", 24);

        assert_eq!(claims.sub, "user-1");
        assert_eq!(claims.email, "student@uni.example");
        assert!(claims.exp > claims.iat);
    }
}
