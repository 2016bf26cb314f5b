use serde::{Deserialize, Serialize};

/// One of the fixed weighted assessment categories, with the owner's score.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct AssessmentTrack {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub weight_percentage: u8,
    pub score: f64,
}

impl AssessmentTrack {
    /// Points this track adds to the weighted total.
    pub fn contribution(&self) -> f64 {
        self.score * f64::from(self.weight_percentage) / 100.0
    }
}

/// Stored score row. Weights are never persisted; rows are matched to the
/// schedule by `name`.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct TrackScoreRow {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub score: f64,
}

impl From<AssessmentTrack> for TrackScoreRow {
    fn from(track: AssessmentTrack) -> Self {
        TrackScoreRow {
            id: track.id,
            user_id: track.user_id,
            name: track.name,
            score: track.score,
        }
    }
}
