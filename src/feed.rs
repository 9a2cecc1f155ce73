//! In-process message feed.
//!
//! Each session gets a broadcast channel; subscribers receive committed
//! messages as they are appended. Delivery is best effort: a slow
//! subscriber may lag and miss entries, and consumers are expected to
//! reconcile against the store via [`merge_message`] plus a full reload
//! when in doubt.

use std::collections::HashMap;
use std::sync::Mutex;

use tokio::sync::broadcast;
use uuid::Uuid;

use crate::models::Message;

const FEED_CAPACITY: usize = 256;

/// Per-session fan-out of committed messages.
#[derive(Default)]
pub struct MessageFeed {
    channels: Mutex<HashMap<Uuid, broadcast::Sender<Message>>>,
}

impl MessageFeed {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe to a session's feed, creating the channel on first use.
    pub fn subscribe(&self, session_id: &Uuid) -> broadcast::Receiver<Message> {
        let mut channels = match self.channels.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        channels
            .entry(*session_id)
            .or_insert_with(|| broadcast::channel(FEED_CAPACITY).0)
            .subscribe()
    }

    /// Publish a committed message to any live subscribers.
    ///
    /// Channels with no remaining receivers are pruned rather than kept
    /// around for sessions nobody is watching.
    pub fn publish(&self, message: &Message) {
        let mut channels = match self.channels.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Some(sender) = channels.get(&message.session_id) {
            if sender.receiver_count() == 0 {
                channels.remove(&message.session_id);
            } else {
                // Err here only means all receivers dropped between the
                // count check and the send; nothing to do either way.
                let _ = sender.send(message.clone());
            }
        }
    }
}

/// Merge a feed delivery into an already-loaded transcript.
///
/// Returns false when the message is already present, which happens when
/// the subscriber wrote the message itself and then saw its own echo.
pub fn merge_message(transcript: &mut Vec<Message>, incoming: Message) -> bool {
    if transcript.iter().any(|m| m.id == incoming.id) {
        return false;
    }
    transcript.push(incoming);
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{MessageContent, SenderType};
    use chrono::Utc;

    fn text_message(session_id: Uuid) -> Message {
        Message {
            id: Uuid::new_v4(),
            session_id,
            sender_type: SenderType::Patient,
            sender_id: Some(Uuid::new_v4()),
            content: MessageContent::Text {
                text: "hello".to_string(),
            },
            ai_processed: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn subscriber_receives_published_message() {
        let feed = MessageFeed::new();
        let session_id = Uuid::new_v4();
        let mut rx = feed.subscribe(&session_id);

        let message = text_message(session_id);
        feed.publish(&message);

        let received = rx.try_recv().unwrap();
        assert_eq!(received.id, message.id);
    }

    #[test]
    fn sessions_are_isolated() {
        let feed = MessageFeed::new();
        let watched = Uuid::new_v4();
        let other = Uuid::new_v4();
        let mut rx = feed.subscribe(&watched);

        feed.publish(&text_message(other));

        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn publish_without_subscribers_is_silent() {
        let feed = MessageFeed::new();
        feed.publish(&text_message(Uuid::new_v4()));
    }

    #[test]
    fn channel_pruned_after_last_receiver_drops() {
        let feed = MessageFeed::new();
        let session_id = Uuid::new_v4();
        let rx = feed.subscribe(&session_id);
        drop(rx);

        feed.publish(&text_message(session_id));

        let channels = feed.channels.lock().unwrap();
        assert!(!channels.contains_key(&session_id));
    }

    #[test]
    fn merge_dedupes_by_id() {
        let session_id = Uuid::new_v4();
        let message = text_message(session_id);
        let mut transcript = vec![message.clone()];

        assert!(!merge_message(&mut transcript, message.clone()));
        assert_eq!(transcript.len(), 1);

        assert!(merge_message(&mut transcript, text_message(session_id)));
        assert_eq!(transcript.len(), 2);
    }
}
