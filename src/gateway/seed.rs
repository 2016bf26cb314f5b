//! Demo records served by the local gateway until real data is stored.

use chrono::NaiveDate;

use crate::{
    models::domain::{
        AssessmentTrack, Assignment, AssignmentStatus, Attendance, AttendanceStatus, Exam,
        ExamType, Gender, User,
    },
    services::tracks::{reconcile_tracks, TRACK_SCHEDULE},
};

pub const DEMO_USER_ID: &str = "user-1";

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default()
}

pub fn demo_user() -> User {
    User {
        id: DEMO_USER_ID.to_string(),
        email: "student@anadolubil.edu.tr".to_string(),
        first_name: "Alex".to_string(),
        last_name: "Johnson".to_string(),
        gender: Gender::Male,
        english_level: "B1".to_string(),
        profile_photo_url: None,
        faculty: "ANADOLU BIL VOCATIONAL SCHOOL".to_string(),
        department: "COMPUTER PROGRAMMING (ENGLISH)".to_string(),
        registration_type: "OSYM".to_string(),
        status: "ACTIVE".to_string(),
        class_level: "PREPARATORY".to_string(),
        education_type: "FIRST EDUCATION".to_string(),
        registration_date: "03.09.2025".to_string(),
    }
}

pub fn demo_exams() -> Vec<Exam> {
    let exam = |id: &str, title: &str, exam_type, exam_date, grade| Exam {
        id: id.to_string(),
        user_id: DEMO_USER_ID.to_string(),
        exam_title: title.to_string(),
        exam_type,
        exam_date,
        grade,
        notes: None,
    };

    vec![
        exam("1", "Unit 1 Quiz", ExamType::Quiz, date(2023, 10, 15), 85),
        exam("2", "Midterm 1", ExamType::Midterm, date(2023, 11, 10), 78),
        exam("3", "Speaking Task", ExamType::Speaking, date(2023, 11, 12), 90),
        exam("4", "Final Exam", ExamType::Final, date(2024, 1, 15), 82),
    ]
}

pub fn demo_assignments() -> Vec<Assignment> {
    let assignment = |id: &str, title: &str, description: &str, due_date, status| Assignment {
        id: id.to_string(),
        user_id: DEMO_USER_ID.to_string(),
        title: title.to_string(),
        description: Some(description.to_string()),
        due_date,
        status,
    };

    vec![
        assignment(
            "1",
            "Essay on Technology",
            "Write 300 words about AI.",
            date(2023, 12, 1),
            AssignmentStatus::Pending,
        ),
        assignment(
            "2",
            "Workbook Unit 5",
            "Complete pages 45-50.",
            date(2023, 11, 20),
            AssignmentStatus::Completed,
        ),
        assignment(
            "3",
            "Moodle Quiz 3",
            "Online platform task",
            date(2023, 11, 25),
            AssignmentStatus::InProgress,
        ),
    ]
}

pub fn demo_attendance() -> Vec<Attendance> {
    let statuses = [
        AttendanceStatus::Present,
        AttendanceStatus::Absent,
        AttendanceStatus::Present,
        AttendanceStatus::Present,
        AttendanceStatus::Present,
    ];

    statuses
        .iter()
        .enumerate()
        .map(|(i, status)| Attendance {
            id: (i + 1).to_string(),
            user_id: DEMO_USER_ID.to_string(),
            date: date(2023, 11, i as u32 + 1),
            hours: 4.0,
            status: *status,
        })
        .collect()
}

pub fn demo_tracks() -> Vec<AssessmentTrack> {
    reconcile_tracks(&TRACK_SCHEDULE, &[], DEMO_USER_ID)
}
