use crate::catalog::{CatalogError, CatalogSession};
use crate::models::{RequestedTrack, TrackMatch};

/// Field-qualified catalog query for one song
pub fn search_query(song: &RequestedTrack) -> String {
    format!("track:{} artist:{}", song.title.trim(), song.artist.trim())
}

/// Looks songs up in the catalog, one top hit each.
pub struct TrackResolver<'a, S: ?Sized> {
    session: &'a S,
}

impl<'a, S: CatalogSession + ?Sized> TrackResolver<'a, S> {
    pub fn new(session: &'a S) -> Self {
        Self { session }
    }

    /// No hit is a normal `TrackMatch` with no id; only transport and
    /// authorization failures are errors.
    pub async fn resolve(&self, song_index: usize, song: &RequestedTrack) -> Result<TrackMatch, CatalogError> {
        let track_id = self.session.search_track(&search_query(song)).await?;
        Ok(TrackMatch { song_index, track_id })
    }
}
