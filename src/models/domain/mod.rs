pub mod assignment;
pub mod attendance;
pub mod exam;
pub mod theme;
pub mod track;
pub mod user;
pub use assignment::{Assignment, AssignmentStatus};
pub use attendance::{Attendance, AttendanceStatus};
pub use exam::{Exam, ExamType, GradeBand};
pub use theme::Theme;
pub use track::{AssessmentTrack, TrackScoreRow};
pub use user::{Gender, User};
