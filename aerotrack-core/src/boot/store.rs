//! Boot store protocol
//!
//! The boot store only holds raw words; this module owns what they mean.

use aerotrack_hal::{BootAction, BootIndex, BootStore};

/// Read the stored boot action
///
/// Values outside the vocabulary (e.g. retained RAM after a brown-out) are
/// treated as [`BootAction::Normal`].
pub fn load_action<S: BootStore>(store: &mut S) -> BootAction {
    let raw = store.read(BootIndex::Action);
    match BootAction::from_u32(raw) {
        Some(action) => action,
        None => {
            warn!("unknown boot action {}, booting normally", raw);
            BootAction::Normal
        }
    }
}

/// Persist the action the next boot should take
pub fn request_action<S: BootStore>(store: &mut S, action: BootAction) {
    store.write(BootIndex::Action, action.as_u32());
}

/// Increment the boot counter and return the new value
///
/// Wraps at `u32::MAX`.
pub fn bump_counter<S: BootStore>(store: &mut S) -> u32 {
    let count = store.read(BootIndex::Counter).wrapping_add(1);
    store.write(BootIndex::Counter, count);
    count
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct MockStore {
        regs: [u32; 3],
        writes: usize,
    }

    impl BootStore for MockStore {
        fn read(&mut self, index: BootIndex) -> u32 {
            self.regs[index.as_usize()]
        }

        fn write(&mut self, index: BootIndex, value: u32) {
            self.regs[index.as_usize()] = value;
            self.writes += 1;
        }
    }

    #[test]
    fn test_request_then_load() {
        let mut store = MockStore::default();
        assert_eq!(load_action(&mut store), BootAction::Normal);

        request_action(&mut store, BootAction::Shutdown);
        assert_eq!(load_action(&mut store), BootAction::Shutdown);
    }

    #[test]
    fn test_garbage_action_is_normal() {
        let mut store = MockStore::default();
        store.regs[BootIndex::Action.as_usize()] = 0xFFFF_FFFF;
        assert_eq!(load_action(&mut store), BootAction::Normal);
    }

    #[test]
    fn test_counter_increments_and_wraps() {
        let mut store = MockStore::default();
        assert_eq!(bump_counter(&mut store), 1);
        assert_eq!(bump_counter(&mut store), 2);

        store.regs[BootIndex::Counter.as_usize()] = u32::MAX;
        assert_eq!(bump_counter(&mut store), 0);
        assert_eq!(store.writes, 3);
    }
}
