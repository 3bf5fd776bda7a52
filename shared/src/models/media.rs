//! Media Model (carousel images and profile photos)

use super::text_enum;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    Carousel,
    ProfilePhoto,
    DishPhoto,
}

text_enum!(MediaKind, "media kind", {
    Carousel => "carousel",
    ProfilePhoto => "profile_photo",
    DishPhoto => "dish_photo",
});

impl MediaKind {
    /// Object key prefix in the bucket
    pub const fn key_prefix(&self) -> &'static str {
        match self {
            Self::Carousel => "carousel",
            Self::ProfilePhoto => "profiles",
            Self::DishPhoto => "dishes",
        }
    }
}

/// Stored media item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct MediaItem {
    pub id: i64,
    pub kind: MediaKind,
    /// Object storage key
    pub key: String,
    /// Public URL served to the UI
    pub url: String,
    pub sort_order: i32,
    pub created_at: DateTime<Utc>,
}
