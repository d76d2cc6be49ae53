//! Pending rotation angles and the selection set.
//!
//! Two pieces of state are kept per [`IdentityKey`]:
//!
//! - the pending angle, created on first selection (0) and removed only by a
//!   commit or a global cancel
//! - selection membership, toggled independently of the angle
//!
//! A key is never selected without a pending entry. Deselecting keeps the
//! pending angle so a thumbnail can be rotated, put down, and still be
//! committed later.

use crate::config::AnglePolicy;
use crate::identity::IdentityKey;
use std::collections::{HashMap, HashSet};

/// Selection and pending-angle state, keyed by identity.
#[derive(Debug, Clone, Default)]
pub struct RotationState {
    angles: HashMap<IdentityKey, i32>,
    selected: HashSet<IdentityKey>,
    policy: AnglePolicy,
}

impl RotationState {
    pub fn new(policy: AnglePolicy) -> Self {
        Self {
            policy,
            ..Self::default()
        }
    }

    /// Flip selection of `key` and return whether it is now selected.
    ///
    /// Selecting creates a zero entry when the key has none. Deselecting
    /// leaves the pending angle untouched.
    pub fn toggle(&mut self, key: &IdentityKey) -> bool {
        if self.selected.remove(key) {
            return false;
        }
        self.angles.entry(key.clone()).or_insert(0);
        self.selected.insert(key.clone());
        true
    }

    /// Apply `delta` to every selected key according to the angle policy.
    pub fn adjust(&mut self, delta: i32) {
        let policy = self.policy;
        for key in &self.selected {
            let angle = self.angles.entry(key.clone()).or_insert(0);
            *angle = policy.apply(*angle, delta);
        }
    }

    /// Pending angle for `key`, 0 when absent.
    pub fn angle(&self, key: &IdentityKey) -> i32 {
        self.angles.get(key).copied().unwrap_or(0)
    }

    /// Whether `key` has an entry at all, even a zero one.
    pub fn is_tracked(&self, key: &IdentityKey) -> bool {
        self.angles.contains_key(key)
    }

    pub fn is_selected(&self, key: &IdentityKey) -> bool {
        self.selected.contains(key)
    }

    /// Drop both the selection and the pending entry of `key`.
    pub fn forget(&mut self, key: &IdentityKey) {
        self.selected.remove(key);
        self.angles.remove(key);
    }

    /// Drop all state.
    pub fn clear(&mut self) {
        self.selected.clear();
        self.angles.clear();
    }

    pub fn selected_count(&self) -> usize {
        self.selected.len()
    }

    /// Number of keys with a non-zero pending angle.
    pub fn pending_count(&self) -> usize {
        self.angles.values().filter(|angle| **angle != 0).count()
    }

    pub fn is_empty(&self) -> bool {
        self.angles.is_empty() && self.selected.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn key(name: &str) -> IdentityKey {
        IdentityKey::from(name)
    }

    #[test]
    fn test_select_creates_zero_entry() {
        let mut state = RotationState::default();
        assert!(state.toggle(&key("a.jpg")));
        assert!(state.is_selected(&key("a.jpg")));
        assert!(state.is_tracked(&key("a.jpg")));
        assert_eq!(state.angle(&key("a.jpg")), 0);
        assert_eq!(state.pending_count(), 0);
    }

    #[test]
    fn test_deselect_keeps_angle() {
        let mut state = RotationState::default();
        state.toggle(&key("a.jpg"));
        state.adjust(90);
        assert!(!state.toggle(&key("a.jpg")));
        assert!(!state.is_selected(&key("a.jpg")));
        assert_eq!(state.angle(&key("a.jpg")), 90);

        // Reselecting without adjusting preserves the angle exactly
        assert!(state.toggle(&key("a.jpg")));
        assert_eq!(state.angle(&key("a.jpg")), 90);
    }

    #[test]
    fn test_adjust_only_touches_selected() {
        let mut state = RotationState::default();
        state.toggle(&key("a.jpg"));
        state.toggle(&key("b.jpg"));
        state.adjust(90);
        state.toggle(&key("b.jpg"));
        state.adjust(90);

        assert_eq!(state.angle(&key("a.jpg")), 180);
        assert_eq!(state.angle(&key("b.jpg")), 90);
    }

    #[test]
    fn test_adjust_without_selection_is_noop() {
        let mut state = RotationState::default();
        state.adjust(90);
        assert!(state.is_empty());
    }

    #[test]
    fn test_clockwise_twice_then_back() {
        let mut state = RotationState::default();
        state.toggle(&key("a.jpg"));
        state.adjust(90);
        state.adjust(90);
        assert_eq!(state.angle(&key("a.jpg")), 180);
        state.adjust(-90);
        assert_eq!(state.angle(&key("a.jpg")), 90);
    }

    #[test]
    fn test_wrap_policy() {
        let mut state = RotationState::new(AnglePolicy::Wrap);
        state.toggle(&key("a.jpg"));
        for _ in 0..5 {
            state.adjust(90);
        }
        assert_eq!(state.angle(&key("a.jpg")), 90);
        state.adjust(-180);
        assert_eq!(state.angle(&key("a.jpg")), 270);
    }

    #[test]
    fn test_full_turn_counts_as_pending_when_accumulating() {
        let mut state = RotationState::default();
        state.toggle(&key("a.jpg"));
        for _ in 0..4 {
            state.adjust(90);
        }
        assert_eq!(state.angle(&key("a.jpg")), 360);
        assert_eq!(state.pending_count(), 1);
    }

    #[test]
    fn test_forget_and_clear() {
        let mut state = RotationState::default();
        state.toggle(&key("a.jpg"));
        state.toggle(&key("b.jpg"));
        state.adjust(270);

        state.forget(&key("a.jpg"));
        assert!(!state.is_tracked(&key("a.jpg")));
        assert!(!state.is_selected(&key("a.jpg")));
        assert_eq!(state.selected_count(), 1);

        state.clear();
        assert!(state.is_empty());
        assert_eq!(state.angle(&key("b.jpg")), 0);
    }

    #[derive(Debug, Clone)]
    enum Op {
        Toggle(u8),
        Adjust(i32),
        Forget(u8),
    }

    fn op_strategy() -> impl Strategy<Value = Op> {
        prop_oneof![
            (0u8..4).prop_map(Op::Toggle),
            prop_oneof![Just(90), Just(-90), Just(180)].prop_map(Op::Adjust),
            (0u8..4).prop_map(Op::Forget),
        ]
    }

    proptest! {
        /// Property: stored angle equals the sum of deltas applied while selected.
        #[test]
        fn prop_angle_is_sum_of_deltas(
            deltas in proptest::collection::vec(prop_oneof![Just(90), Just(-90)], 0..64),
        ) {
            let mut state = RotationState::default();
            state.toggle(&key("a.jpg"));
            for delta in &deltas {
                state.adjust(*delta);
            }
            prop_assert_eq!(state.angle(&key("a.jpg")), deltas.iter().sum::<i32>());
        }

        /// Property: a selected key always has a pending entry.
        #[test]
        fn prop_selection_subset_of_pending(ops in proptest::collection::vec(op_strategy(), 0..64)) {
            let mut state = RotationState::default();
            let keys: Vec<IdentityKey> = (0..4).map(|i| key(&format!("{i}.jpg"))).collect();
            for op in ops {
                match op {
                    Op::Toggle(i) => { state.toggle(&keys[i as usize]); }
                    Op::Adjust(delta) => state.adjust(delta),
                    Op::Forget(i) => state.forget(&keys[i as usize]),
                }
                for k in &keys {
                    if state.is_selected(k) {
                        prop_assert!(state.is_tracked(k));
                    }
                }
            }
        }

        /// Property: deselecting never removes the pending entry.
        #[test]
        fn prop_deselect_preserves_entry(delta in prop_oneof![Just(90), Just(-90), Just(270)]) {
            let mut state = RotationState::default();
            state.toggle(&key("a.jpg"));
            state.adjust(delta);
            state.toggle(&key("a.jpg"));
            prop_assert!(state.is_tracked(&key("a.jpg")));
            prop_assert_eq!(state.angle(&key("a.jpg")), delta);
        }
    }
}
