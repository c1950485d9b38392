// Instagram API endpoint functions.
// Typed accessors that build a path and parameters and hand them to `execute`.

use serde::de::DeserializeOwned;

use crate::error::{InstafeedError, Result};

use super::client::InstagramClient;
use super::types::{Comment, Media, Tag, User};

/// Default number of items requested by list endpoints.
pub const DEFAULT_LIMIT: u32 = 20;

const NO_PARAMS: [(&str, &str); 0] = [];

/// Media lookups accept either a numeric id or a shortcode from a post URL.
fn media_segments(id_or_shortcode: &str) -> Vec<&str> {
    let is_numeric =
        !id_or_shortcode.is_empty() && id_or_shortcode.bytes().all(|b| b.is_ascii_digit());

    if is_numeric {
        vec!["media", id_or_shortcode]
    } else {
        vec!["media", "shortcode", id_or_shortcode]
    }
}

impl InstagramClient {
    /// Run a query and decode its payload into `T`.
    async fn fetch<T, I, K, V>(&self, segments: &[&str], params: I) -> Result<T>
    where
        T: DeserializeOwned,
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let payload = self.execute(segments, params).await?;
        serde_json::from_value(payload).map_err(|e| {
            InstafeedError::UnexpectedPayload(format!("{}: {}", segments.join("/"), e))
        })
    }

    /// Get the numeric id of the configured user, looking it up once.
    pub async fn user_id(&self) -> Result<String> {
        if let Some(id) = self.cached_user_id() {
            return Ok(id);
        }

        let username = self.config().username.clone();
        let user = self.user_info(Some(&username)).await?;
        self.remember_user_id(&user.id);
        Ok(user.id)
    }

    /// Get a user's profile, defaulting to the configured user.
    pub async fn user_info(&self, username: Option<&str>) -> Result<User> {
        let username = username.unwrap_or(&self.config().username);
        self.search_users(username)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| InstafeedError::UserNotFound(username.to_string()))
    }

    /// Search for users by name.
    pub async fn search_users(&self, query: &str) -> Result<Vec<User>> {
        self.fetch(&["users", "search"], [("q", query)]).await
    }

    /// Get recent media posted by the configured user.
    pub async fn user_media(&self, limit: u32) -> Result<Vec<Media>> {
        let id = self.user_id().await?;
        self.fetch(&["users", &id, "media", "recent"], [("count", limit.to_string())])
            .await
    }

    /// Get media the authenticated user has liked.
    pub async fn user_liked(&self, limit: u32) -> Result<Vec<Media>> {
        self.fetch(&["users", "self", "media", "liked"], [("count", limit.to_string())])
            .await
    }

    /// Get the users the configured user follows.
    pub async fn user_follows(&self) -> Result<Vec<User>> {
        let id = self.user_id().await?;
        self.fetch(&["users", &id, "follows"], NO_PARAMS).await
    }

    /// Get the users following the configured user.
    pub async fn user_followers(&self) -> Result<Vec<User>> {
        let id = self.user_id().await?;
        self.fetch(&["users", &id, "followed-by"], NO_PARAMS).await
    }

    /// Get a media item by numeric id or shortcode.
    pub async fn media(&self, id_or_shortcode: &str) -> Result<Media> {
        self.fetch(&media_segments(id_or_shortcode), NO_PARAMS).await
    }

    /// Get recent comments on a media item.
    pub async fn comments(&self, media_id: &str) -> Result<Vec<Comment>> {
        self.fetch(&["media", media_id, "comments"], NO_PARAMS).await
    }

    /// Get the users who liked a media item.
    pub async fn likes(&self, media_id: &str) -> Result<Vec<User>> {
        self.fetch(&["media", media_id, "likes"], NO_PARAMS).await
    }

    /// Get recent media carrying a tag.
    pub async fn tag_media(&self, tag: &str, limit: u32) -> Result<Vec<Media>> {
        self.fetch(&["tags", tag, "media", "recent"], [("count", limit.to_string())])
            .await
    }

    /// Search for tags by name.
    pub async fn search_tags(&self, query: &str) -> Result<Vec<Tag>> {
        self.fetch(&["tags", "search"], [("q", query)]).await
    }

    /// Get a tag's details.
    pub async fn tag_info(&self, tag: &str) -> Result<Tag> {
        self.fetch(&["tags", tag], NO_PARAMS).await
    }
}
