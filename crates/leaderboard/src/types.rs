//! Types for leaderboard entries and incoming submissions

use crate::error::{LeaderboardError, LeaderboardResult};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Number, Value};

/// A single ranked record as stored in the document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreEntry {
    pub name: String,
    /// Lower is better
    pub score: f64,
    /// Milliseconds since the Unix epoch, assigned on insert
    #[serde(default, deserialize_with = "timestamp_from_number")]
    pub timestamp: i64,
}

/// Any JSON number (integer or float) or `null`; floats are truncated to whole millis
fn timestamp_from_number<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let number = Option::<Number>::deserialize(deserializer)?;
    Ok(number
        .and_then(|n| n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)))
        .unwrap_or(0))
}

/// A validated submission: a name and a score, nothing else
#[derive(Debug, Clone, PartialEq)]
pub struct Submission {
    pub name: String,
    pub score: f64,
}

impl Submission {
    pub fn new(name: impl Into<String>, score: f64) -> Self {
        Self {
            name: name.into(),
            score,
        }
    }

    /// Validate a raw request body.
    ///
    /// `name` must be a JSON string and `score` a JSON number. Empty names and
    /// any numeric value are accepted.
    pub fn from_json(body: &Value) -> LeaderboardResult<Self> {
        let name = body.get("name").and_then(Value::as_str);
        let score = body
            .get("score")
            .filter(|v| v.is_number())
            .and_then(Value::as_f64);

        match (name, score) {
            (Some(name), Some(score)) => Ok(Self::new(name, score)),
            _ => Err(LeaderboardError::InvalidInput(
                "Name and score are required".to_string(),
            )),
        }
    }

    /// Scores must be finite: NaN and infinities have no JSON encoding
    pub fn validate(&self) -> LeaderboardResult<()> {
        if self.score.is_finite() {
            Ok(())
        } else {
            Err(LeaderboardError::InvalidInput(format!(
                "Score must be a finite number, got {}",
                self.score
            )))
        }
    }

    pub(crate) fn into_entry(self, timestamp: i64) -> ScoreEntry {
        ScoreEntry {
            name: self.name,
            score: self.score,
            timestamp,
        }
    }
}
