// Host callbacks around run boundaries

use crate::session::Session;

/// Pre- and post-run hook. Context the host needs travels inside the
/// closure's captures. An `Err` from the pre-run hook aborts the run before
/// the engine starts; an `Err` from the post-run hook is recorded as a run
/// error.
pub type RunHook = Box<dyn FnMut(&mut Session) -> Result<(), String>>;

/// Fired once when a fatal stop unwinds a run. May re-enter the session to
/// inspect partial results.
pub type CatchHook = Box<dyn FnMut(&mut Session)>;

/// One hook slot with a take/call/restore discipline.
///
/// A hook is taken out of its slot for the duration of its call so it can
/// borrow the session mutably. The slot remembers whether it was reassigned
/// in the meantime: `restore` is skipped once `install` has run again, so a
/// hook that replaces or removes itself mid-call stays replaced or removed.
pub struct HookSlot<F> {
    hook: Option<F>,
    reassigned: bool,
}

impl<F> HookSlot<F> {
    pub(crate) fn install(&mut self, hook: Option<F>) {
        self.hook = hook;
        self.reassigned = true;
    }

    pub(crate) fn take(&mut self) -> Option<F> {
        self.reassigned = false;
        self.hook.take()
    }

    pub(crate) fn restore(&mut self, hook: F) {
        if !self.reassigned {
            self.hook = Some(hook);
        }
    }
}

impl<F> Default for HookSlot<F> {
    fn default() -> Self {
        Self {
            hook: None,
            reassigned: false,
        }
    }
}

#[derive(Default)]
pub struct Hooks {
    pub(crate) pre_run: HookSlot<RunHook>,
    pub(crate) post_run: HookSlot<RunHook>,
    pub(crate) catch_stop: HookSlot<CatchHook>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_untouched_slot_restores_the_taken_hook() {
        let mut slot = HookSlot::default();
        slot.install(Some("original"));
        let taken = slot.take().unwrap();
        slot.restore(taken);
        assert_eq!(slot.take(), Some("original"));
    }

    #[test]
    fn test_replacement_during_call_wins() {
        let mut slot = HookSlot::default();
        slot.install(Some("original"));
        let taken = slot.take().unwrap();
        // The hook body swapped itself out.
        slot.install(Some("replacement"));
        slot.restore(taken);
        assert_eq!(slot.take(), Some("replacement"));
    }

    #[test]
    fn test_clearing_during_call_sticks() {
        let mut slot = HookSlot::default();
        slot.install(Some("original"));
        let taken = slot.take().unwrap();
        slot.install(None);
        slot.restore(taken);
        assert_eq!(slot.take(), None);
    }

    #[test]
    fn test_empty_slot_takes_nothing() {
        let mut slot: HookSlot<&str> = HookSlot::default();
        assert_eq!(slot.take(), None);
    }
}
