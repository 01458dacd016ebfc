// Pulls the song list out of free-form model output.
//
// The model usually wraps the JSON array in prose or a code fence. We take the
// first balanced `[...]` span that parses as an array of objects, falling back
// to the widest `[` .. `]` span so the error message points at something real.
// A single bad record fails the whole batch.

use serde_json::Value;
use thiserror::Error;

use crate::models::SongEntry;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("no JSON array found in completion text")]
    NoArray,
    #[error("invalid playlist JSON: {0}")]
    Parse(String),
}

pub fn extract_playlist(raw: &str) -> Result<Vec<SongEntry>, ExtractError> {
    let span = find_array(raw)?;
    let value: Value = serde_json::from_str(span).map_err(|e| ExtractError::Parse(e.to_string()))?;
    let mut songs: Vec<SongEntry> =
        serde_json::from_value(value).map_err(|e| ExtractError::Parse(e.to_string()))?;

    // stable: equal years keep model order
    songs.sort_by_key(|song| song.year);
    Ok(songs)
}

fn find_array(raw: &str) -> Result<&str, ExtractError> {
    for (start, _) in raw.match_indices('[') {
        if let Some(end) = balanced_end(raw, start) {
            let candidate = &raw[start..=end];
            if is_record_array(candidate) {
                return Ok(candidate);
            }
        }
    }

    match (raw.find('['), raw.rfind(']')) {
        (Some(start), Some(end)) if start < end => Ok(&raw[start..=end]),
        _ => Err(ExtractError::NoArray),
    }
}

fn is_record_array(candidate: &str) -> bool {
    match serde_json::from_str::<Value>(candidate) {
        Ok(Value::Array(items)) => !items.is_empty() && items.iter().all(Value::is_object),
        _ => false,
    }
}

/// Byte index of the `]` closing the `[` at `start`, ignoring brackets inside
/// JSON strings.
fn balanced_end(raw: &str, start: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, byte) in raw.as_bytes()[start..].iter().enumerate() {
        if in_string {
            match byte {
                _ if escaped => escaped = false,
                b'\\' => escaped = true,
                b'"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match byte {
            b'"' => in_string = true,
            b'[' => depth += 1,
            b']' => {
                depth -= 1;
                if depth == 0 {
                    return Some(start + offset);
                }
            }
            _ => {}
        }
    }
    None
}
