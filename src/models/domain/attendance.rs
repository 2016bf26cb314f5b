use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub enum AttendanceStatus {
    Present,
    Absent,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct Attendance {
    pub id: String,
    pub user_id: String,
    pub date: NaiveDate,
    pub hours: f64,
    pub status: AttendanceStatus,
}

impl Attendance {
    pub fn is_absent(&self) -> bool {
        self.status == AttendanceStatus::Absent
    }
}
