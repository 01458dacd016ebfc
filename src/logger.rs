use crate::cli::{LogConfig, OutputFormat};
use serde::Serialize;

#[derive(Clone, Default)]
pub struct Logger {
    config: LogConfig,
}

#[derive(Serialize)]
struct JsonEvent {
    #[serde(rename = "type")]
    event_type: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<serde_json::Value>,
}

impl Logger {
    pub fn new(config: LogConfig) -> Self {
        Self { config }
    }

    pub fn info(&self, message: &str) {
        self.output("info", message, None);
    }

    pub fn error(&self, message: &str) {
        self.output("error", message, None);
    }

    pub fn debug(&self, message: &str) {
        if !self.config.verbose {
            return;
        }
        self.output("debug", message, None);
    }

    pub fn playlist_generated(&self, dob: &str, country: &str, songs: usize) {
        let data = serde_json::json!({
            "dob": dob,
            "country": country,
            "songs": songs
        });
        self.output(
            "playlist_generated",
            &format!("Generated {} songs for DOB: {}, Country: {}", songs, dob, country),
            Some(data),
        );
    }

    pub fn track_unmatched(&self, artist: &str, title: &str) {
        let data = serde_json::json!({
            "artist": artist,
            "title": title
        });
        self.output("track_unmatched", &format!("No catalog match: {} by {}", title, artist), Some(data));
    }

    pub fn playlist_created(&self, url: &str, matched: usize, requested: usize) {
        let data = serde_json::json!({
            "url": url,
            "matched": matched,
            "requested": requested
        });
        self.output(
            "playlist_created",
            &format!("Playlist {} created with {}/{} tracks", url, matched, requested),
            Some(data),
        );
    }

    pub fn payment_session(&self, flow_id: &str, currency: &str, amount: u32) {
        let data = serde_json::json!({
            "flow_id": flow_id,
            "currency": currency,
            "amount": amount
        });
        self.output(
            "payment_session",
            &format!("Billing flow {} started for {} {}", flow_id, amount, currency),
            Some(data),
        );
    }

    fn output(&self, event_type: &str, message: &str, data: Option<serde_json::Value>) {
        match self.config.output_format {
            OutputFormat::Json => {
                let event = JsonEvent {
                    event_type: event_type.to_string(),
                    message: message.to_string(),
                    data,
                };
                if let Ok(json) = serde_json::to_string(&event) {
                    println!("{}", json);
                }
            }
            OutputFormat::Text => {
                let prefix = match event_type {
                    "error" => "[ERROR]",
                    "warn" | "track_unmatched" => "[WARN]",
                    "debug" => "[DEBUG]",
                    "playlist_generated" | "playlist_created" | "payment_session" => "[OK]",
                    _ => "[INFO]",
                };
                println!("{} {}", prefix, message);
            }
        }
    }
}
