//! Property-based tests for the event history buffer

use proptest::prelude::*;
use serde_json::json;
use timeplanner::backend::realtime::EventHistory;
use timeplanner::shared::{Domain, EventType};

fn filled(capacity: usize, clock: &[i64]) -> EventHistory {
    let mut history = EventHistory::new(capacity);
    for (n, now) in clock.iter().enumerate() {
        history.append_at(EventType::created(Domain::Task), json!({ "id": n }), *now);
    }
    history
}

proptest! {
    #[test]
    fn test_never_exceeds_capacity(capacity in 1usize..50, count in 0usize..200) {
        let clock: Vec<i64> = (0..count as i64).collect();
        let history = filled(capacity, &clock);
        prop_assert_eq!(history.len(), count.min(capacity));
    }

    #[test]
    fn test_timestamps_never_decrease(clock in prop::collection::vec(0i64..1_000, 0..100)) {
        let history = filled(100, &clock);
        let stamps: Vec<i64> = history.since(i64::MIN).map(|e| e.timestamp).collect();
        prop_assert!(stamps.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn test_since_is_exact_and_repeatable(
        clock in prop::collection::vec(0i64..1_000, 0..100),
        since in 0i64..1_000,
    ) {
        let history = filled(64, &clock);
        let replay = history.since(since);
        let first: Vec<i64> = replay.clone().map(|e| e.timestamp).collect();
        let second: Vec<i64> = replay.map(|e| e.timestamp).collect();

        prop_assert_eq!(&first, &second);
        prop_assert!(first.iter().all(|t| *t > since));
        let expected = history.since(i64::MIN).filter(|e| e.timestamp > since).count();
        prop_assert_eq!(first.len(), expected);
    }
}
