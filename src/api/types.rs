// Instagram API response types.
// Defines structs for deserializing the `data` payload of API replies.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Instagram user profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub username: String,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub profile_picture: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub counts: Option<UserCounts>,
}

/// Follower and media totals, present on full profile lookups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserCounts {
    pub media: u64,
    pub follows: u64,
    pub followed_by: u64,
}

/// Media item kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    #[default]
    Image,
    Video,
    Carousel,
    #[serde(other)]
    Unknown,
}

/// A photo or video post.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Media {
    pub id: String,
    #[serde(rename = "type", default)]
    pub media_type: MediaType,
    pub link: Option<String>,
    #[serde(with = "unix_timestamp")]
    pub created_time: DateTime<Utc>,
    pub user: User,
    #[serde(default)]
    pub caption: Option<Caption>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub filter: Option<String>,
    #[serde(default)]
    pub likes: Option<Count>,
    #[serde(default)]
    pub comments: Option<Count>,
    #[serde(default)]
    pub images: Option<Images>,
    #[serde(default)]
    pub location: Option<Location>,
}

/// Renditions of a media item's image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Images {
    pub low_resolution: Option<Image>,
    pub thumbnail: Option<Image>,
    pub standard_resolution: Option<Image>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Image {
    pub url: String,
    pub width: u32,
    pub height: u32,
}

/// Caption attached to a media item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Caption {
    pub id: Option<String>,
    pub text: String,
    #[serde(default, with = "unix_timestamp::option")]
    pub created_time: Option<DateTime<Utc>>,
    pub from: Option<User>,
}

/// A counter such as likes or comments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Count {
    pub count: u64,
}

/// Geotag attached to a media item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub id: Option<String>,
    pub name: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

/// Comment on a media item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: String,
    pub text: String,
    #[serde(with = "unix_timestamp")]
    pub created_time: DateTime<Utc>,
    pub from: User,
}

/// Hashtag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub name: String,
    pub media_count: u64,
}

/// Timestamps arrive as Unix seconds, usually as strings.
mod unix_timestamp {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer, de};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(i64),
    }

    fn to_datetime<E: de::Error>(raw: Raw) -> Result<DateTime<Utc>, E> {
        let secs = match raw {
            Raw::Number(secs) => secs,
            Raw::Text(text) => text
                .trim()
                .parse()
                .map_err(|_| E::custom(format!("invalid unix timestamp {:?}", text)))?,
        };
        DateTime::from_timestamp(secs, 0)
            .ok_or_else(|| E::custom(format!("unix timestamp {} out of range", secs)))
    }

    pub fn serialize<S: Serializer>(time: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&time.timestamp().to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        to_datetime(Raw::deserialize(deserializer)?)
    }

    pub mod option {
        use super::*;

        pub fn serialize<S: Serializer>(
            time: &Option<DateTime<Utc>>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            match time {
                Some(time) => super::serialize(time, serializer),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<DateTime<Utc>>, D::Error> {
            Option::<Raw>::deserialize(deserializer)?
                .map(to_datetime)
                .transpose()
        }
    }
}
