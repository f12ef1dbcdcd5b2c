//! Inscription completion-state transition.
//!
//! An inscription is COMPLETE once the hours tracked against it reach the
//! hour obligation of its commitment's service tier, and reverts to
//! INCOMPLETE if tombstoning a transaction drops the total back below the
//! target. Recomputation is idempotent: calling it again with the same
//! inputs yields no transition.

/// Decide the next value of `is_complete` after the tracked hour total
/// changed.
///
/// Returns `Some(new_flag)` when the flag must flip, `None` when the
/// current state already matches the total (no-op branch).
///
/// Hours are whole integers compared with ordinary `>=` / `<`; fractional
/// hours are not represented.
pub fn next_state(tracked_hours: i64, required_hours: i32, is_complete: bool) -> Option<bool> {
    let target_met = tracked_hours >= i64::from(required_hours);
    match (target_met, is_complete) {
        (true, false) => Some(true),
        (false, true) => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reaching_target_completes() {
        assert_eq!(next_state(40, 40, false), Some(true));
        assert_eq!(next_state(41, 40, false), Some(true));
    }

    #[test]
    fn below_target_stays_incomplete() {
        assert_eq!(next_state(39, 40, false), None);
        assert_eq!(next_state(0, 40, false), None);
    }

    #[test]
    fn dropping_below_target_reverts() {
        assert_eq!(next_state(15, 40, true), Some(false));
    }

    #[test]
    fn at_or_above_target_stays_complete() {
        assert_eq!(next_state(40, 40, true), None);
        assert_eq!(next_state(100, 40, true), None);
    }

    #[test]
    fn recomputation_is_idempotent() {
        // Apply a transition, then feed the resulting state back in with
        // the same totals: the second call must be a no-op.
        let first = next_state(40, 40, false);
        assert_eq!(first, Some(true));
        assert_eq!(next_state(40, 40, first.unwrap()), None);

        let back = next_state(15, 40, true);
        assert_eq!(back, Some(false));
        assert_eq!(next_state(15, 40, back.unwrap()), None);
    }
}
