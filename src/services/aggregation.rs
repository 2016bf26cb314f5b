//! Derived values computed from a session snapshot.
//!
//! Everything here is a pure function of its inputs.

use chrono::NaiveDate;
use serde::Serialize;

use crate::{
    models::domain::{AssessmentTrack, Assignment, Attendance, Exam, ExamType, GradeBand},
    services::session_service::Snapshot,
};

const DASHBOARD_LIMIT: usize = 3;

/// Sum of `score * weight / 100` over all tracks.
pub fn weighted_score(tracks: &[AssessmentTrack]) -> f64 {
    tracks.iter().map(AssessmentTrack::contribution).sum()
}

pub fn total_absence_hours(attendance: &[Attendance]) -> f64 {
    attendance
        .iter()
        .filter(|record| record.is_absent())
        .map(|record| record.hours)
        .sum()
}

pub fn completed_task_count(assignments: &[Assignment]) -> usize {
    assignments.iter().filter(|a| a.is_completed()).count()
}

/// Exams on or after `today`, soonest first, at most three.
pub fn upcoming_exams(exams: &[Exam], today: NaiveDate) -> Vec<Exam> {
    let mut upcoming: Vec<Exam> = exams
        .iter()
        .filter(|exam| exam.exam_date >= today)
        .cloned()
        .collect();
    upcoming.sort_by_key(|exam| exam.exam_date);
    upcoming.truncate(DASHBOARD_LIMIT);
    upcoming
}

/// Assignments not yet completed, earliest due first, at most three.
pub fn pending_assignments(assignments: &[Assignment]) -> Vec<Assignment> {
    let mut pending: Vec<Assignment> = assignments
        .iter()
        .filter(|a| !a.is_completed())
        .cloned()
        .collect();
    pending.sort_by_key(|a| a.due_date);
    pending.truncate(DASHBOARD_LIMIT);
    pending
}

/// Mean grade rounded to the nearest integer, 0 for no exams.
pub fn average_exam_grade(exams: &[Exam]) -> u32 {
    if exams.is_empty() {
        return 0;
    }
    let total: u32 = exams.iter().map(|exam| u32::from(exam.grade)).sum();
    (f64::from(total) / exams.len() as f64).round() as u32
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct AttendanceBreakdown {
    pub present_hours: f64,
    pub absent_hours: f64,
    pub total_hours: f64,
}

pub fn attendance_breakdown(attendance: &[Attendance]) -> AttendanceBreakdown {
    let total_hours: f64 = attendance.iter().map(|record| record.hours).sum();
    let absent_hours = total_absence_hours(attendance);
    AttendanceBreakdown {
        present_hours: total_hours - absent_hours,
        absent_hours,
        total_hours,
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct AssignmentBreakdown {
    pub completed: usize,
    pub pending: usize,
}

pub fn assignment_breakdown(assignments: &[Assignment]) -> AssignmentBreakdown {
    let completed = completed_task_count(assignments);
    AssignmentBreakdown {
        completed,
        pending: assignments.len() - completed,
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TrackContribution {
    pub id: String,
    pub name: String,
    pub weight_percentage: u8,
    pub score: f64,
    pub contribution: f64,
}

pub fn track_contributions(tracks: &[AssessmentTrack]) -> Vec<TrackContribution> {
    tracks
        .iter()
        .map(|track| TrackContribution {
            id: track.id.clone(),
            name: track.name.clone(),
            weight_percentage: track.weight_percentage,
            score: track.score,
            contribution: track.contribution(),
        })
        .collect()
}

/// `None` keeps every exam.
pub fn exams_of_type(exams: &[Exam], exam_type: Option<ExamType>) -> Vec<Exam> {
    exams
        .iter()
        .filter(|exam| exam_type.map_or(true, |t| exam.exam_type == t))
        .cloned()
        .collect()
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ExamPoint {
    pub date: NaiveDate,
    pub title: String,
    pub grade: u8,
    pub band: GradeBand,
}

/// Exam results in chronological order.
pub fn exam_timeline(exams: &[Exam]) -> Vec<ExamPoint> {
    let mut sorted: Vec<&Exam> = exams.iter().collect();
    sorted.sort_by_key(|exam| exam.exam_date);
    sorted
        .into_iter()
        .map(|exam| ExamPoint {
            date: exam.exam_date,
            title: exam.exam_title.clone(),
            grade: exam.grade,
            band: exam.band(),
        })
        .collect()
}

/// Every derived value for one snapshot, as of `today`.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Dashboard {
    pub weighted_score: f64,
    pub total_absence_hours: f64,
    pub completed_task_count: usize,
    pub average_exam_grade: u32,
    pub upcoming_exams: Vec<Exam>,
    pub pending_assignments: Vec<Assignment>,
    pub attendance: AttendanceBreakdown,
    pub assignments: AssignmentBreakdown,
    pub tracks: Vec<TrackContribution>,
    pub exam_timeline: Vec<ExamPoint>,
}

impl Dashboard {
    pub fn from_snapshot(snapshot: &Snapshot, today: NaiveDate) -> Self {
        Dashboard {
            weighted_score: weighted_score(&snapshot.tracks),
            total_absence_hours: total_absence_hours(&snapshot.attendance),
            completed_task_count: completed_task_count(&snapshot.assignments),
            average_exam_grade: average_exam_grade(&snapshot.exams),
            upcoming_exams: upcoming_exams(&snapshot.exams, today),
            pending_assignments: pending_assignments(&snapshot.assignments),
            attendance: attendance_breakdown(&snapshot.attendance),
            assignments: assignment_breakdown(&snapshot.assignments),
            tracks: track_contributions(&snapshot.tracks),
            exam_timeline: exam_timeline(&snapshot.exams),
        }
    }
}
