use std::collections::HashMap;

use crate::{
    errors::{AppError, AppResult},
    models::domain::{AssessmentTrack, TrackScoreRow},
};

/// A fixed entry of the assessment schedule.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TrackDefinition {
    pub default_id: &'static str,
    pub name: &'static str,
    pub weight_percentage: u8,
}

const fn track(
    default_id: &'static str,
    name: &'static str,
    weight_percentage: u8,
) -> TrackDefinition {
    TrackDefinition {
        default_id,
        name,
        weight_percentage,
    }
}

/// The nine weighted tracks, in display order. Weights sum to 100.
pub const TRACK_SCHEDULE: [TrackDefinition; 9] = [
    track("t1", "Project-1", 10),
    track("t2", "Readers-1", 5),
    track("t3", "ELAT-1", 25),
    track("t4", "Writing-1", 10),
    track("t5", "Mid Term-1", 15),
    track("t6", "M.E.C.-1", 10),
    track("t7", "Assignment-1", 5),
    track("t8", "Online Learning Platforms-1", 10),
    track("t9", "Weekly Test-1", 10),
];

/// Checks the schedule invariant. Called once at startup.
pub fn verify_schedule(schedule: &[TrackDefinition]) -> AppResult<()> {
    let total: u32 = schedule
        .iter()
        .map(|t| u32::from(t.weight_percentage))
        .sum();
    if total != 100 {
        return Err(AppError::InternalError(format!(
            "Track weights sum to {} instead of 100",
            total
        )));
    }

    let mut names: Vec<&str> = schedule.iter().map(|t| t.name).collect();
    names.sort_unstable();
    names.dedup();
    if names.len() != schedule.len() {
        return Err(AppError::InternalError(
            "Track schedule contains duplicate names".to_string(),
        ));
    }

    Ok(())
}

/// Clamps a raw score into [0, 100]. NaN counts as 0.
pub fn clamp_score(raw: f64) -> f64 {
    if raw.is_nan() {
        0.0
    } else {
        raw.clamp(0.0, 100.0)
    }
}

/// Outer join of the fixed schedule with stored score rows, keyed by name.
///
/// Produces exactly one track per schedule entry, in schedule order. Rows
/// whose name is not in the schedule are ignored; schedule entries without a
/// row get score 0 and the schedule's default id. If several rows share a
/// name, the last one wins.
pub fn reconcile_tracks(
    schedule: &[TrackDefinition],
    rows: &[TrackScoreRow],
    user_id: &str,
) -> Vec<AssessmentTrack> {
    let by_name: HashMap<&str, &TrackScoreRow> =
        rows.iter().map(|row| (row.name.as_str(), row)).collect();

    schedule
        .iter()
        .map(|definition| match by_name.get(definition.name) {
            Some(row) => AssessmentTrack {
                id: row.id.clone(),
                user_id: user_id.to_string(),
                name: definition.name.to_string(),
                weight_percentage: definition.weight_percentage,
                score: clamp_score(row.score),
            },
            None => AssessmentTrack {
                id: definition.default_id.to_string(),
                user_id: user_id.to_string(),
                name: definition.name.to_string(),
                weight_percentage: definition.weight_percentage,
                score: 0.0,
            },
        })
        .collect()
}

/// Resolves a track id against a reconciled list to its schedule name.
pub fn resolve_track_name<'a>(
    tracks: &'a [AssessmentTrack],
    track_id: &str,
) -> AppResult<&'a str> {
    tracks
        .iter()
        .find(|t| t.id == track_id)
        .map(|t| t.name.as_str())
        .ok_or_else(|| AppError::TrackNotFound(track_id.to_string()))
}
