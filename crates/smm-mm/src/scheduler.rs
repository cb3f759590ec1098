//! Refresh gating for the outer tick loop.

/// When the next reconcile may run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RefreshState {
    /// Earliest time (Unix ms) the next reconcile is allowed. 0 means due now.
    pub next_allowed_ms: u64,
}

/// Scheduler state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SchedulerState {
    #[default]
    Idle,
    /// A reconcile was granted and has not completed yet.
    Quoting,
}

/// What the owner should do on this tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickDecision {
    /// Run a reconcile, then call [`TickScheduler::complete`].
    Due,
    /// Refresh interval has not elapsed.
    NotDue { next_allowed_ms: u64 },
    /// The connector cannot trade yet.
    NotReady,
}

/// Decides on each tick whether a reconcile is due.
#[derive(Debug, Clone)]
pub struct TickScheduler {
    refresh_interval_ms: u64,
    refresh: RefreshState,
    state: SchedulerState,
}

impl TickScheduler {
    /// Create a scheduler that is due immediately.
    pub fn new(refresh_interval_ms: u64) -> Self {
        Self {
            refresh_interval_ms,
            refresh: RefreshState::default(),
            state: SchedulerState::Idle,
        }
    }

    pub fn state(&self) -> SchedulerState {
        self.state
    }

    pub fn refresh(&self) -> RefreshState {
        self.refresh
    }

    /// Gate one tick. Moves to `Quoting` on `Due`.
    pub fn poll(&mut self, now_ms: u64, is_ready_to_trade: bool) -> TickDecision {
        if self.state == SchedulerState::Quoting {
            return TickDecision::NotDue {
                next_allowed_ms: self.refresh.next_allowed_ms,
            };
        }
        if !is_ready_to_trade {
            return TickDecision::NotReady;
        }
        if now_ms < self.refresh.next_allowed_ms {
            return TickDecision::NotDue {
                next_allowed_ms: self.refresh.next_allowed_ms,
            };
        }
        self.state = SchedulerState::Quoting;
        TickDecision::Due
    }

    /// Record a finished reconcile and return to `Idle`.
    pub fn complete(&mut self, now_ms: u64) {
        self.refresh.next_allowed_ms = now_ms.saturating_add(self.refresh_interval_ms);
        self.state = SchedulerState::Idle;
    }
}
