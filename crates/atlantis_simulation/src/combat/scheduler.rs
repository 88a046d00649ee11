//! Delayed callbacks owned by one combo instance.
//!
//! Explicit countdown list ticked from `FixedUpdate` (no engine timers, no async).
//! `cancel_all()` removes every entry synchronously, so a callback from a previous
//! chain can never fire after `ComboController::reset`.

/// Callbacks closer than this to zero are treated as due (f32 accumulation).
pub const DUE_EPSILON: f32 = 1e-5;

/// Handle returned by [`ComboScheduler::schedule`], used for targeted cancellation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TimerHandle(u64);

/// What the controller should do when a callback comes due.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ScheduledAction {
    /// Attack cooldown elapsed → `reset_attack_state`
    CooldownReset,
    /// Combo window elapsed without continuation → end chain
    ComboWindowExpired,
    /// Start the next chained stage after a successful spark
    AutoChain,
    /// Backup attack-notify (hit sweep) at a fraction of the clip
    AttackNotify,
    /// Clear the duplicate-notify guard
    NotifyGuardReset,
    /// Cosmetic: hide the bloom indicator
    BloomHide,
}

#[derive(Clone, Debug)]
struct PendingCallback {
    handle: TimerHandle,
    action: ScheduledAction,
    remaining: f32,
}

#[derive(Clone, Debug, Default)]
pub struct ComboScheduler {
    pending: Vec<PendingCallback>,
    next_id: u64,
}

impl ComboScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule `action` to fire after `delay` seconds.
    pub fn schedule(&mut self, delay: f32, action: ScheduledAction) -> TimerHandle {
        self.next_id += 1;
        let handle = TimerHandle(self.next_id);
        self.pending.push(PendingCallback {
            handle,
            action,
            remaining: delay.max(0.0),
        });
        handle
    }

    /// Same as `schedule`, but replaces any pending callback of the same kind
    /// (one timer handle per purpose).
    pub fn schedule_unique(&mut self, delay: f32, action: ScheduledAction) -> TimerHandle {
        self.cancel_action(action);
        self.schedule(delay, action)
    }

    pub fn cancel(&mut self, handle: TimerHandle) -> bool {
        let before = self.pending.len();
        self.pending.retain(|p| p.handle != handle);
        before != self.pending.len()
    }

    pub fn cancel_action(&mut self, action: ScheduledAction) -> usize {
        let before = self.pending.len();
        self.pending.retain(|p| p.action != action);
        before - self.pending.len()
    }

    pub fn cancel_all(&mut self) -> usize {
        let cancelled = self.pending.len();
        self.pending.clear();
        cancelled
    }

    pub fn is_pending(&self, action: ScheduledAction) -> bool {
        self.pending.iter().any(|p| p.action == action)
    }

    /// Seconds until the earliest callback of this kind, if any.
    pub fn remaining(&self, action: ScheduledAction) -> Option<f32> {
        self.pending
            .iter()
            .filter(|p| p.action == action)
            .map(|p| p.remaining)
            .min_by(|a, b| a.total_cmp(b))
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Count every pending callback down by `delta` seconds.
    pub fn advance(&mut self, delta: f32) {
        for pending in self.pending.iter_mut() {
            pending.remaining -= delta;
        }
    }

    /// Pop the most overdue callback (ties: scheduling order).
    ///
    /// Callers drain in a loop; anything cancelled by a handler in between is
    /// already gone from the list and will not be returned.
    pub fn pop_due(&mut self) -> Option<(TimerHandle, ScheduledAction)> {
        let index = self
            .pending
            .iter()
            .enumerate()
            .filter(|(_, p)| p.remaining <= DUE_EPSILON)
            .min_by(|(_, a), (_, b)| {
                a.remaining
                    .total_cmp(&b.remaining)
                    .then(a.handle.0.cmp(&b.handle.0))
            })
            .map(|(index, _)| index)?;

        let due = self.pending.remove(index);
        Some((due.handle, due.action))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_callback_fires_after_delay() {
        let mut scheduler = ComboScheduler::new();
        scheduler.schedule(0.5, ScheduledAction::CooldownReset);

        scheduler.advance(0.3);
        assert!(scheduler.pop_due().is_none());

        scheduler.advance(0.2);
        let (_, action) = scheduler.pop_due().expect("cooldown should be due");
        assert_eq!(action, ScheduledAction::CooldownReset);
        assert!(scheduler.is_empty());
    }

    #[test]
    fn test_due_callbacks_pop_most_overdue_first() {
        let mut scheduler = ComboScheduler::new();
        scheduler.schedule(0.2, ScheduledAction::BloomHide);
        scheduler.schedule(0.1, ScheduledAction::AutoChain);
        scheduler.schedule(0.2, ScheduledAction::NotifyGuardReset);

        scheduler.advance(0.25);
        assert_eq!(scheduler.pop_due().map(|(_, a)| a), Some(ScheduledAction::AutoChain));
        // tie → scheduling order
        assert_eq!(scheduler.pop_due().map(|(_, a)| a), Some(ScheduledAction::BloomHide));
        assert_eq!(
            scheduler.pop_due().map(|(_, a)| a),
            Some(ScheduledAction::NotifyGuardReset)
        );
        assert!(scheduler.pop_due().is_none());
    }

    #[test]
    fn test_schedule_unique_replaces_previous() {
        let mut scheduler = ComboScheduler::new();
        scheduler.schedule_unique(2.0, ScheduledAction::ComboWindowExpired);
        scheduler.advance(1.5);
        scheduler.schedule_unique(2.0, ScheduledAction::ComboWindowExpired);

        assert_eq!(scheduler.len(), 1);
        assert_eq!(scheduler.remaining(ScheduledAction::ComboWindowExpired), Some(2.0));
    }

    #[test]
    fn test_cancel_by_handle() {
        let mut scheduler = ComboScheduler::new();
        let notify = scheduler.schedule(0.1, ScheduledAction::AttackNotify);
        scheduler.schedule(0.1, ScheduledAction::CooldownReset);

        assert!(scheduler.cancel(notify));
        assert!(!scheduler.cancel(notify));
        assert!(!scheduler.is_pending(ScheduledAction::AttackNotify));
        assert!(scheduler.is_pending(ScheduledAction::CooldownReset));
    }

    #[test]
    fn test_cancel_all_during_drain_drops_remaining() {
        let mut scheduler = ComboScheduler::new();
        scheduler.schedule(0.1, ScheduledAction::ComboWindowExpired);
        scheduler.schedule(0.2, ScheduledAction::AutoChain);
        scheduler.advance(0.5);

        let (_, first) = scheduler.pop_due().expect("first due");
        assert_eq!(first, ScheduledAction::ComboWindowExpired);

        // handler of the first callback resets the chain
        assert_eq!(scheduler.cancel_all(), 1);
        assert!(scheduler.pop_due().is_none());
    }
}
