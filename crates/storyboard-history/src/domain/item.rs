//! History item value type.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Kind of artifact a history item refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    /// A still image.
    Image,
    /// A video clip.
    Video,
}

/// One rendered artifact. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryItem {
    /// Opaque unique identifier.
    pub id: String,
    /// Reference to the artifact.
    pub url: String,
    /// Artifact kind.
    #[serde(rename = "type")]
    pub media_type: MediaType,
    /// The prompt the artifact was rendered from.
    pub prompt: String,
    /// Creation time, persisted as Unix epoch milliseconds.
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_item_serializes_to_stored_field_names() {
        // Arrange
        let item = HistoryItem {
            id: "k3j9x0a1b".to_owned(),
            url: "data:image/png;base64,AAAA".to_owned(),
            media_type: MediaType::Image,
            prompt: "a lighthouse at dusk".to_owned(),
            timestamp: Utc.timestamp_millis_opt(1_760_000_000_123).unwrap(),
        };

        // Act
        let value = serde_json::to_value(&item).unwrap();

        // Assert
        assert_eq!(
            value,
            serde_json::json!({
                "id": "k3j9x0a1b",
                "url": "data:image/png;base64,AAAA",
                "type": "image",
                "prompt": "a lighthouse at dusk",
                "timestamp": 1_760_000_000_123_i64
            })
        );
    }

    #[test]
    fn test_item_round_trips_without_losing_fields() {
        let item = HistoryItem {
            id: "abc".to_owned(),
            url: "https://cdn.test/clip.mp4".to_owned(),
            media_type: MediaType::Video,
            prompt: "waves".to_owned(),
            timestamp: Utc.timestamp_millis_opt(1_700_000_000_001).unwrap(),
        };

        let json = serde_json::to_string(&item).unwrap();
        let back: HistoryItem = serde_json::from_str(&json).unwrap();

        assert_eq!(back, item);
    }
}
