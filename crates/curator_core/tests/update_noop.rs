use chrono::{DateTime, Utc};
use curator_core::{update, AppState, Msg};

#[test]
fn update_is_noop() {
    let now = DateTime::<Utc>::from_timestamp(1_700_000_000, 0).unwrap();
    let state = AppState::new();
    let (next, effects) = update(state.clone(), Msg::NoOp, now);

    assert_eq!(state, next);
    assert!(effects.is_empty());
}
