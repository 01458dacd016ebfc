// Turns a generated song list into a real playlist on the user's account.
//
// Token exchange, user lookup, creation and attachment run strictly in order.
// Searches run through an ordered buffered stream, so matches come back in
// song order and the first failed search aborts the rest. A playlist that was
// already created is left in place on failure.

use futures::{stream, StreamExt, TryStreamExt};
use std::fmt;
use thiserror::Error;

use crate::catalog::{Catalog, CatalogError, CatalogSession};
use crate::logger::Logger;
use crate::models::{RequestedTrack, TrackMatch};
use crate::resolver::TrackResolver;

pub const PLAYLIST_NAME: &str = "My Buttercup Playlist";
pub const PLAYLIST_DESCRIPTION: &str = "A personalized playlist generated by Buttercup";
const SEARCH_CONCURRENCY: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    TokenExchange,
    IdentifyUser,
    CreatePlaylist,
    ResolveTracks,
    AttachTracks,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::TokenExchange => "token exchange",
            Stage::IdentifyUser => "user lookup",
            Stage::CreatePlaylist => "playlist creation",
            Stage::ResolveTracks => "track search",
            Stage::AttachTracks => "track attachment",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error)]
#[error("{stage} failed: {source}")]
pub struct AssembleError {
    pub stage: Stage,
    #[source]
    pub source: CatalogError,
}

fn at(stage: Stage) -> impl FnOnce(CatalogError) -> AssembleError {
    move |source| AssembleError { stage, source }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssembledPlaylist {
    pub playlist_url: String,
    pub matched_count: usize,
}

pub struct PlaylistAssembler<C> {
    catalog: C,
    logger: Logger,
}

impl<C: Catalog> PlaylistAssembler<C> {
    pub fn new(catalog: C, logger: Logger) -> Self {
        Self { catalog, logger }
    }

    pub async fn assemble(&self, code: &str, songs: &[RequestedTrack]) -> Result<AssembledPlaylist, AssembleError> {
        let session = self
            .catalog
            .exchange_code(code)
            .await
            .map_err(at(Stage::TokenExchange))?;
        self.build(&session, songs).await
    }

    async fn build(&self, session: &C::Session, songs: &[RequestedTrack]) -> Result<AssembledPlaylist, AssembleError> {
        let user_id = session
            .current_user_id()
            .await
            .map_err(at(Stage::IdentifyUser))?;

        let playlist = session
            .create_playlist(&user_id, PLAYLIST_NAME, PLAYLIST_DESCRIPTION)
            .await
            .map_err(at(Stage::CreatePlaylist))?;
        self.logger.debug(&format!("Created playlist {}", playlist.id));

        let resolver = TrackResolver::new(session);
        // Collected eagerly; the stream must not own a closure over borrowed songs
        let lookups: Vec<_> = songs
            .iter()
            .enumerate()
            .map(|(index, song)| resolver.resolve(index, song))
            .collect();
        let matches: Vec<TrackMatch> = stream::iter(lookups)
            .buffered(SEARCH_CONCURRENCY)
            .try_collect()
            .await
            .map_err(at(Stage::ResolveTracks))?;

        let mut track_ids = Vec::with_capacity(matches.len());
        for found in matches {
            match found.track_id {
                Some(id) => track_ids.push(id),
                None => {
                    let song = &songs[found.song_index];
                    self.logger.track_unmatched(&song.artist, &song.title);
                }
            }
        }

        if !track_ids.is_empty() {
            session
                .add_tracks(&playlist.id, &track_ids)
                .await
                .map_err(at(Stage::AttachTracks))?;
        }

        self.logger.playlist_created(&playlist.url, track_ids.len(), songs.len());
        Ok(AssembledPlaylist {
            playlist_url: playlist.url,
            matched_count: track_ids.len(),
        })
    }
}
