//! Change notification for the progression record.
//!
//! Each engine owns one [`ProgressionEvents`] hub. Services publish a
//! [`ProgressionChanged`] after every successful write that touches XP,
//! level, or coins; UI layers subscribe and refresh their display.
//! Publishing never blocks and never fails the write it follows.

use tokio::sync::broadcast;

use bookleaf_types::ProgressionChanged;

/// Capacity of the progression broadcast channel.
///
/// A subscriber that falls behind by more than this many events receives
/// [`broadcast::error::RecvError::Lagged`] and skips to the newest one.
const EVENT_CAPACITY: usize = 64;

/// Broadcast hub for [`ProgressionChanged`] events.
#[derive(Debug, Clone)]
pub struct ProgressionEvents {
    /// Sending half; receivers are created on demand.
    tx: broadcast::Sender<ProgressionChanged>,
}

impl ProgressionEvents {
    /// A hub with no subscribers.
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(EVENT_CAPACITY);
        Self { tx }
    }

    /// Subscribe to future progression changes.
    pub fn subscribe(&self) -> broadcast::Receiver<ProgressionChanged> {
        self.tx.subscribe()
    }

    /// Publish a change to every current subscriber.
    ///
    /// Returns the number of subscribers reached. Returns 0 if nobody is
    /// listening (this is not an error).
    pub fn publish(&self, event: ProgressionChanged) -> usize {
        self.tx.send(event).unwrap_or(0)
    }

    /// Number of live subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for ProgressionEvents {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use bookleaf_types::{ProgressionChangeCause, UserProgression};

    use super::*;

    #[test]
    fn publish_without_subscribers_is_fine() {
        let events = ProgressionEvents::new();
        let event =
            ProgressionChanged::from_record(ProgressionChangeCause::XpAwarded, &UserProgression::new(100));
        assert_eq!(events.publish(event), 0);
    }

    #[test]
    fn every_subscriber_receives_event() {
        let events = ProgressionEvents::new();
        let mut first = events.subscribe();
        let mut second = events.subscribe();
        assert_eq!(events.subscriber_count(), 2);

        let record = UserProgression::new(40);
        let event = ProgressionChanged::from_record(ProgressionChangeCause::CoinsSpent, &record);
        assert_eq!(events.publish(event.clone()), 2);

        assert_eq!(first.try_recv().unwrap(), event);
        assert_eq!(second.try_recv().unwrap(), event);
    }
}
