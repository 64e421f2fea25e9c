use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Link {
    pub id: i64,
    pub code: String,
    pub target_url: String,
    pub created_at: DateTime<Utc>,
    pub click_count: i64,
    pub last_clicked_at: Option<DateTime<Utc>>,
}

impl Link {
    /// Public URL visitors follow to reach this link, e.g. `https://sl.example/abc123`.
    pub fn short_url(&self, origin: &str) -> String {
        format!("{}/{}", origin.trim_end_matches('/'), self.code)
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct CreateLinkRequest {
    pub target_url: Option<String>,
    /// Empty or absent means "generate one".
    pub code: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateLinkResponse {
    pub id: i64,
    pub code: String,
    pub target_url: String,
    pub short_url: String,
}

impl CreateLinkResponse {
    pub fn new(link: Link, origin: &str) -> Self {
        let short_url = link.short_url(origin);
        Self {
            id: link.id,
            code: link.code,
            target_url: link.target_url,
            short_url,
        }
    }
}
