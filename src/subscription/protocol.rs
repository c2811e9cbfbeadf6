use crate::point::{DataPoint, TagValue};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Client → Server message types
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type")]
pub enum ClientMessage {
    #[serde(rename = "subscribe")]
    Subscribe { tag: String },
    #[serde(rename = "unsubscribe")]
    Unsubscribe { tag: String },
}

/// Server → Client: a point published to a subscribed tag
#[derive(Debug, Clone, Serialize)]
pub struct DataPointMessage {
    #[serde(rename = "type")]
    pub msg_type: String,
    pub tag: String,
    pub value: TagValue,
    pub timestamp: DateTime<Utc>,
}

impl From<DataPoint> for DataPointMessage {
    fn from(point: DataPoint) -> Self {
        Self {
            msg_type: "data_point".to_string(),
            tag: point.tag,
            value: point.value,
            timestamp: point.timestamp,
        }
    }
}

/// Server → Client: Error message
#[derive(Debug, Clone, Serialize)]
pub struct ErrorMessage {
    #[serde(rename = "type")]
    pub msg_type: String,
    pub error: String,
}

impl ErrorMessage {
    pub fn new(error: String) -> Self {
        Self {
            msg_type: "error".to_string(),
            error,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_parse_client_messages() {
        let msg: ClientMessage =
            serde_json::from_str(r#"{"type": "subscribe", "tag": "Card.UID"}"#).unwrap();
        assert_eq!(
            msg,
            ClientMessage::Subscribe {
                tag: "Card.UID".to_string()
            }
        );

        let msg: ClientMessage =
            serde_json::from_str(r#"{"type": "unsubscribe", "tag": "games.length"}"#).unwrap();
        assert_eq!(
            msg,
            ClientMessage::Unsubscribe {
                tag: "games.length".to_string()
            }
        );

        assert!(serde_json::from_str::<ClientMessage>(r#"{"type": "publish"}"#).is_err());
    }

    #[test]
    fn test_data_point_message_json() {
        let ts = Utc.with_ymd_and_hms(2024, 2, 11, 13, 0, 0).unwrap();
        let msg = DataPointMessage::from(DataPoint::at("player.tickets", 12, ts));

        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["type"], "data_point");
        assert_eq!(json["tag"], "player.tickets");
        assert_eq!(json["value"], 12);
        assert_eq!(json["timestamp"], "2024-02-11T13:00:00Z");
    }

    #[test]
    fn test_marker_value_serializes_as_null() {
        let ts = Utc.with_ymd_and_hms(2024, 2, 11, 13, 0, 0).unwrap();
        let msg = DataPointMessage::from(DataPoint::marker("games.$", ts));

        let json = serde_json::to_value(&msg).unwrap();
        assert!(json["value"].is_null());
    }
}
