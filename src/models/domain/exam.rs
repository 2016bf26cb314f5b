use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub enum ExamType {
    Quiz,
    Midterm,
    Final,
    Speaking,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct Exam {
    pub id: String,
    pub user_id: String,
    pub exam_title: String,
    pub exam_type: ExamType,
    pub exam_date: NaiveDate,
    pub grade: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl Exam {
    pub fn band(&self) -> GradeBand {
        GradeBand::for_grade(self.grade)
    }
}

/// Coarse grade classification used to highlight results.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum GradeBand {
    Excellent,
    Good,
    Fair,
    NeedsWork,
}

impl GradeBand {
    pub fn for_grade(grade: u8) -> Self {
        match grade {
            90..=u8::MAX => GradeBand::Excellent,
            75..=89 => GradeBand::Good,
            60..=74 => GradeBand::Fair,
            _ => GradeBand::NeedsWork,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grade_band_boundaries() {
        assert_eq!(GradeBand::for_grade(100), GradeBand::Excellent);
        assert_eq!(GradeBand::for_grade(90), GradeBand::Excellent);
        assert_eq!(GradeBand::for_grade(89), GradeBand::Good);
        assert_eq!(GradeBand::for_grade(75), GradeBand::Good);
        assert_eq!(GradeBand::for_grade(74), GradeBand::Fair);
        assert_eq!(GradeBand::for_grade(60), GradeBand::Fair);
        assert_eq!(GradeBand::for_grade(59), GradeBand::NeedsWork);
        assert_eq!(GradeBand::for_grade(0), GradeBand::NeedsWork);
    }

    #[test]
    fn test_exam_wire_format() {
        let json = r#"{
            "id": "1",
            "user_id": "user-1",
            "exam_title": "Unit 1 Quiz",
            "exam_type": "Quiz",
            "exam_date": "2023-10-15",
            "grade": 85
        }"#;

        let exam: Exam = serde_json::from_str(json).unwrap();
        assert_eq!(exam.exam_type, ExamType::Quiz);
        assert_eq!(exam.exam_date, NaiveDate::from_ymd_opt(2023, 10, 15).unwrap());
        assert!(exam.notes.is_none());
        assert_eq!(exam.band(), GradeBand::Good);

        let out = serde_json::to_string(&exam).unwrap();
        assert!(out.contains("\"exam_date\":\"2023-10-15\""));
        assert!(!out.contains("notes"));
    }
}
