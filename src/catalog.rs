use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("authorization failed: {0}")]
    Authorization(String),
    #[error("{0}")]
    Api(String),
    #[error("invalid catalog identifier: {0}")]
    InvalidId(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedPlaylist {
    pub id: String,
    pub url: String,
}

/// A music platform reachable through a one-time authorization code.
#[async_trait]
pub trait Catalog: Send + Sync {
    type Session: CatalogSession;

    /// Trade the code for an access token. Codes are single-use.
    async fn exchange_code(&self, code: &str) -> Result<Self::Session, CatalogError>;
}

/// Calls made on behalf of one authorized user. Dropped with the request.
#[async_trait]
pub trait CatalogSession: Send + Sync {
    async fn current_user_id(&self) -> Result<String, CatalogError>;

    async fn create_playlist(
        &self,
        user_id: &str,
        name: &str,
        description: &str,
    ) -> Result<CreatedPlaylist, CatalogError>;

    /// Identifier of the top hit for `query`, `None` when nothing matched.
    async fn search_track(&self, query: &str) -> Result<Option<String>, CatalogError>;

    async fn add_tracks(&self, playlist_id: &str, track_ids: &[String]) -> Result<(), CatalogError>;
}
