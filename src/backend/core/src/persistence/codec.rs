//! Store ⇄ event log codec.
//!
//! The durable form of a store is the single, globally time-ordered array of
//! every clock's events. Decoding replays that array, in file order, from an
//! empty store; any event that fails to apply fails the whole load.

use crate::engine::replay;
use crate::error::{PunchError, Result};
use crate::events::{ClockEvent, ClockStore};

/// Flatten a store into its time-ordered event log.
pub fn encode_store(store: &ClockStore) -> Vec<ClockEvent> {
    store.ordered_events()
}

/// Rebuild a store from an event log.
pub fn decode_store(events: &[ClockEvent]) -> Result<ClockStore> {
    replay(events).map_err(PunchError::corrupt_store)
}

/// Encode a store as pretty-printed JSON.
pub fn to_json(store: &ClockStore) -> Result<String> {
    Ok(serde_json::to_string_pretty(&encode_store(store))?)
}

/// Decode a store from JSON produced by [`to_json`].
pub fn from_json(json: &str) -> Result<ClockStore> {
    let events: Vec<ClockEvent> = serde_json::from_str(json)?;
    decode_store(&events)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{clock_in, clock_out, clock_reset};
    use crate::error::ErrorCode;
    use crate::events::Timestamp;
    use chrono::DateTime;

    fn at(s: &str) -> Timestamp {
        DateTime::parse_from_rfc3339(s).unwrap()
    }

    fn sample_store() -> ClockStore {
        let store = clock_in(ClockStore::new(), "b", at("2024-03-01T08:00:00+01:00")).unwrap();
        let store = clock_out(store, "b", at("2024-03-01T09:00:00+01:00")).unwrap();
        let store = clock_in(store, "a", at("2024-03-01T09:00:00+01:00")).unwrap();
        let store = clock_out(store, "a", at("2024-03-01T09:45:00+01:00")).unwrap();
        let (store, _) = clock_reset(store, "b", at("2024-03-01T10:00:00+01:00")).unwrap();
        clock_in(store, "a", at("2024-03-01T11:00:00-05:00")).unwrap()
    }

    #[test]
    fn test_round_trip_reproduces_store() {
        let store = sample_store();
        let restored = from_json(&to_json(&store).unwrap()).unwrap();

        assert_eq!(restored, store);
        assert_eq!(restored.currently_clocked_in().map(|c| c.id.as_str()), Some("a"));
    }

    #[test]
    fn test_encoded_log_is_time_sorted() {
        let events = encode_store(&sample_store());
        assert!(events.windows(2).all(|w| w[0].timestamp() <= w[1].timestamp()));
        assert_eq!(events.len(), 6);
    }

    #[test]
    fn test_offsets_survive_round_trip() {
        let restored = from_json(&to_json(&sample_store()).unwrap()).unwrap();
        let last = restored.get("a").unwrap().events.last().unwrap().clone();
        assert_eq!(last.timestamp().offset().local_minus_utc(), -5 * 3600);
    }

    #[test]
    fn test_load_rejects_log_that_does_not_replay() {
        let json = r#"[
            {"event": "start", "timestamp": "2024-03-01T09:00:00Z", "id": "a"},
            {"event": "start", "timestamp": "2024-03-01T09:30:00Z", "id": "b"}
        ]"#;

        let err = from_json(json).unwrap_err();
        assert_eq!(err.code(), ErrorCode::CorruptStore);
    }

    #[test]
    fn test_load_rejects_unknown_event_kind() {
        let json = r#"[{"event": "pause", "timestamp": "2024-03-01T09:00:00Z", "id": "a"}]"#;
        let err = from_json(json).unwrap_err();
        assert_eq!(err.code(), ErrorCode::CorruptStore);
    }

    #[test]
    fn test_empty_log() {
        assert!(from_json("[]").unwrap().is_empty());
    }
}
