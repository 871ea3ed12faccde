use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Calendar date -> completion count, replaced wholesale on each fetch.
pub type TaskHistory = BTreeMap<NaiveDate, i64>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub username: String,
    pub points: i64,
    pub profile_photo: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub username: String,
    pub text: String,
    pub profile_photo: String,
    pub timestamp: NaiveDateTime,
}

/// One row of the my-points feed; only the first row is ever rendered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointsRecord {
    pub points: i64,
}
