use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::guideline::Platform;

/// Engagement metric name → count (likes, comments, shares, ...).
pub type Engagement = BTreeMap<String, u64>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentStatus {
    Draft,
    Pending,
    Approved,
    Posted,
}

impl ContentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentStatus::Draft => "draft",
            ContentStatus::Pending => "pending",
            ContentStatus::Approved => "approved",
            ContentStatus::Posted => "posted",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "draft" => Some(ContentStatus::Draft),
            "pending" => Some(ContentStatus::Pending),
            "approved" => Some(ContentStatus::Approved),
            "posted" => Some(ContentStatus::Posted),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewContent {
    pub guideline_id: i64,
    pub content: String,
    pub platform: Platform,
    pub status: ContentStatus,
    #[serde(default)]
    pub scheduled_for: Option<DateTime<Utc>>,
}

/// Partial update applied by the owner of a content item.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContentUpdate {
    #[serde(default)]
    pub status: Option<ContentStatus>,
    #[serde(default)]
    pub engagement: Option<Engagement>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentItem {
    pub id: i64,
    pub user_id: i64,
    pub guideline_id: i64,
    pub content: String,
    pub platform: Platform,
    pub status: ContentStatus,
    pub scheduled_for: Option<DateTime<Utc>>,
    #[serde(default)]
    pub engagement: Engagement,
    pub created: DateTime<Utc>,
}

impl ContentItem {
    /// Sum of every engagement metric on this item.
    pub fn total_engagement(&self) -> u64 {
        self.engagement
            .values()
            .fold(0, |sum, count| sum.saturating_add(*count))
    }

    pub fn is_posted(&self) -> bool {
        self.status == ContentStatus::Posted
    }
}

#[cfg(test)]
pub(crate) fn content_item(
    id: i64,
    guideline_id: i64,
    status: ContentStatus,
    engagement: &[(&str, u64)],
) -> ContentItem {
    ContentItem {
        id,
        user_id: 1,
        guideline_id,
        content: format!("post #{id}"),
        platform: Platform::Instagram,
        status,
        scheduled_for: None,
        engagement: engagement
            .iter()
            .map(|(k, v)| (k.to_string(), *v))
            .collect(),
        created: Utc::now(),
    }
}
