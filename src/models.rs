use serde::{de, Deserialize, Deserializer, Serialize};

/// Who the playlist is for. Built per request, never stored.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BirthProfile {
    #[serde(deserialize_with = "lenient_int")]
    pub birth_year: i32,
    #[serde(deserialize_with = "lenient_int")]
    pub birth_month: u32,
    pub country: String,
    #[serde(default)]
    pub genre: String,
}

impl BirthProfile {
    /// Birth date normalised to the first of the month (YYYY-MM-01)
    pub fn date_of_birth(&self) -> String {
        format!("{:04}-{:02}-01", self.birth_year, self.birth_month)
    }

    pub fn validate(&self, current_year: i32) -> Result<(), String> {
        if !(1..=12).contains(&self.birth_month) {
            return Err(format!("Invalid birth month: {}", self.birth_month));
        }
        if self.birth_year < 1900 || self.birth_year > current_year {
            return Err(format!("Invalid birth year: {}", self.birth_year));
        }
        if self.country.trim().is_empty() {
            return Err("Country is required".to_string());
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SongEntry {
    #[serde(deserialize_with = "lenient_int")]
    pub year: i32,
    pub title: String,
    pub artist: String,
    pub significance: String,
}

/// A song as the front end sends it back for playlist creation. Only the
/// fields needed for the catalog search are read.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RequestedTrack {
    pub title: String,
    pub artist: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackMatch {
    pub song_index: usize,
    pub track_id: Option<String>,
}

/// Accepts `1990`, `"1990"` and `1990.0`; anything else is an error.
fn lenient_int<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: TryFrom<i64>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Int(i64),
        Float(f64),
        Text(String),
    }

    let value = match Raw::deserialize(deserializer)? {
        Raw::Int(n) => n,
        Raw::Float(f) if f.fract() == 0.0 => f as i64,
        Raw::Float(f) => return Err(de::Error::custom(format!("expected an integer, got {}", f))),
        Raw::Text(s) => s
            .trim()
            .parse::<i64>()
            .map_err(|_| de::Error::custom(format!("expected an integer, got {:?}", s)))?,
    };

    T::try_from(value).map_err(|_| de::Error::custom(format!("integer {} out of range", value)))
}
