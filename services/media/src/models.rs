use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

/// A picture in a user's album, or the picture of the day
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct Media {
    pub filename: String,
    /// Album day, `YYYY-MM-DD`
    pub date: String,
    pub url: String,
    pub last_modified: DateTime<Utc>,
}

/// An entry returned by an object store listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectInfo {
    pub key: String,
    pub size: u64,
    pub last_modified: DateTime<Utc>,
}
