use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

/// Webhook delivery: one batch of events, still undecoded so a single
/// malformed event cannot reject the whole batch.
#[derive(Debug, Deserialize)]
pub struct WebhookPayload {
    #[serde(default)]
    pub destination: Option<String>,
    #[serde(default)]
    pub events: Vec<Value>,
}

/// Decodes each event on its own, dropping the ones that do not decode.
pub fn decode_events(raw: Vec<Value>) -> Vec<Event> {
    raw.into_iter()
        .enumerate()
        .filter_map(|(index, event)| match serde_json::from_value::<Event>(event) {
            Ok(event) => Some(event),
            Err(e) => {
                warn!(index, error = %e, "Skipping undecodable webhook event");
                None
            }
        })
        .collect()
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    #[serde(rename = "message")]
    Message {
        #[serde(rename = "replyToken")]
        reply_token: String,
        message: MessageContent,
    },
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
pub enum MessageContent {
    #[serde(rename = "text")]
    Text { text: String },
    #[serde(other)]
    Other,
}

#[derive(Debug, Serialize)]
pub struct WebhookAck {
    pub received: usize,
    pub replied: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_mixed_event_batch() {
        let payload: WebhookPayload = serde_json::from_str(
            r#"{
                "destination": "U123",
                "events": [
                    {"type": "follow", "replyToken": "t0", "timestamp": 1},
                    {"type": "message", "replyToken": "t1",
                     "message": {"type": "sticker", "id": "1", "packageId": "2", "stickerId": "3"}},
                    {"type": "message", "replyToken": "t2",
                     "message": {"type": "text", "id": "2", "text": "天気"}}
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(payload.destination.as_deref(), Some("U123"));
        let events = decode_events(payload.events);
        assert!(matches!(events[0], Event::Other));
        assert!(matches!(
            events[1],
            Event::Message { message: MessageContent::Other, .. }
        ));
        match &events[2] {
            Event::Message { reply_token, message: MessageContent::Text { text } } => {
                assert_eq!(reply_token, "t2");
                assert_eq!(text, "天気");
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn undecodable_event_is_dropped_without_losing_the_rest() {
        let payload: WebhookPayload = serde_json::from_str(
            r#"{
                "events": [
                    {"type": "message", "mode": "standby",
                     "message": {"type": "text", "id": "1", "text": "PSY"}},
                    {"type": "message", "replyToken": "t2",
                     "message": {"type": "text", "id": "2", "text": "PSY"}}
                ]
            }"#,
        )
        .unwrap();

        let events = decode_events(payload.events);
        assert_eq!(events.len(), 1);
        assert!(matches!(&events[0], Event::Message { reply_token, .. } if reply_token == "t2"));
    }

    #[test]
    fn empty_verification_payload_has_no_events() {
        let payload: WebhookPayload = serde_json::from_str(r#"{"destination":"U1","events":[]}"#).unwrap();
        assert!(payload.events.is_empty());
    }
}
