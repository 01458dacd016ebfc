use async_trait::async_trait;
use rspotify::model::{FullTrack, Page, PlayableId, PlaylistId, SearchResult, SearchType, TrackId, UserId};
use rspotify::prelude::*;
use rspotify::{scopes, AuthCodeSpotify, ClientError, Credentials, OAuth};

use crate::catalog::{Catalog, CatalogError, CatalogSession, CreatedPlaylist};
use crate::config::{ConfigError, SpotifyConfig};

impl From<ClientError> for CatalogError {
    fn from(err: ClientError) -> Self {
        CatalogError::Api(err.to_string())
    }
}

/// Spotify, authorized through the authorization-code flow. Tokens are never
/// cached to disk; each exchanged code yields a fresh client.
pub struct SpotifyCatalog {
    credentials: Credentials,
    oauth: OAuth,
}

impl SpotifyCatalog {
    pub fn from_config(config: &SpotifyConfig) -> Result<Self, ConfigError> {
        let (client_id, client_secret) = config.credentials()?;
        let oauth = OAuth {
            redirect_uri: config.redirect_uri.clone(),
            scopes: scopes!("playlist-modify-private"),
            ..Default::default()
        };

        Ok(Self {
            credentials: Credentials::new(client_id, client_secret),
            oauth,
        })
    }

    fn client(&self) -> AuthCodeSpotify {
        AuthCodeSpotify::new(self.credentials.clone(), self.oauth.clone())
    }

    /// URL the user visits to grant `playlist-modify-private`
    pub fn authorize_url(&self) -> Result<String, CatalogError> {
        Ok(self.client().get_authorize_url(false)?)
    }
}

#[async_trait]
impl Catalog for SpotifyCatalog {
    type Session = SpotifySession;

    async fn exchange_code(&self, code: &str) -> Result<SpotifySession, CatalogError> {
        let spotify = self.client();
        spotify
            .request_token(code)
            .await
            .map_err(|e| CatalogError::Authorization(e.to_string()))?;
        Ok(SpotifySession { spotify })
    }
}

pub struct SpotifySession {
    spotify: AuthCodeSpotify,
}

#[async_trait]
impl CatalogSession for SpotifySession {
    async fn current_user_id(&self) -> Result<String, CatalogError> {
        let user = self.spotify.current_user().await?;
        Ok(user.id.id().to_string())
    }

    async fn create_playlist(
        &self,
        user_id: &str,
        name: &str,
        description: &str,
    ) -> Result<CreatedPlaylist, CatalogError> {
        let user_id = UserId::from_id(user_id).map_err(|e| CatalogError::InvalidId(e.to_string()))?;
        let playlist = self
            .spotify
            .user_playlist_create(user_id, name, Some(false), Some(false), Some(description))
            .await?;

        let id = playlist.id.id().to_string();
        let url = playlist
            .external_urls
            .get("spotify")
            .cloned()
            .unwrap_or_else(|| format!("https://open.spotify.com/playlist/{}", id));
        Ok(CreatedPlaylist { id, url })
    }

    async fn search_track(&self, query: &str) -> Result<Option<String>, CatalogError> {
        let result = self
            .spotify
            .search(query, SearchType::Track, None, None, Some(1), None)
            .await?;

        match result {
            SearchResult::Tracks(page) => Ok(first_track_uri(&page)),
            _ => Ok(None),
        }
    }

    async fn add_tracks(&self, playlist_id: &str, track_ids: &[String]) -> Result<(), CatalogError> {
        let playlist_id =
            PlaylistId::from_id(playlist_id).map_err(|e| CatalogError::InvalidId(e.to_string()))?;
        let items = track_ids
            .iter()
            .map(|uri| TrackId::from_id_or_uri(uri).map(|id| PlayableId::from(id.into_static())))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| CatalogError::InvalidId(e.to_string()))?;

        self.spotify.playlist_add_items(playlist_id, items, None).await?;
        Ok(())
    }
}

fn first_track_uri(page: &Page<FullTrack>) -> Option<String> {
    page.items
        .first()
        .and_then(|track| track.id.as_ref())
        .map(|id| id.uri())
}
