use std::time::{Duration, Instant};

/// Mutable state for one read session. Owned by the loop, dropped when it exits.
#[derive(Debug, Clone)]
pub struct SessionState {
    /// Time origin; unset until the first byte unless set at launch.
    pub base_time: Option<Instant>,
    /// Elapsed time stamped on the previous line.
    pub prev_elapsed: Duration,
    /// True when the next byte begins a new line.
    pub at_line_start: bool,
    /// Bytes since the last `\n`, carriage returns excluded.
    pub current_line: Vec<u8>,
    /// When the first byte of `current_line` arrived.
    pub line_started_at: Option<Instant>,
    /// Offset from `base_time` of the first instant-pattern match. Write-once.
    pub instant_time: Option<Duration>,
    pub deadline: Option<Instant>,
    pub quit_requested: bool,
    pub bytes_seen: u64,
    pub lines_seen: u64,
}

impl SessionState {
    pub fn new(base_time: Option<Instant>, deadline: Option<Instant>) -> Self {
        Self {
            base_time,
            prev_elapsed: Duration::ZERO,
            at_line_start: true,
            current_line: Vec::new(),
            line_started_at: None,
            instant_time: None,
            deadline,
            quit_requested: false,
            bytes_seen: 0,
            lines_seen: 0,
        }
    }

    /// Time since the origin. Falls back to zero before the origin is known.
    pub fn elapsed_at(&self, now: Instant) -> Duration {
        self.base_time
            .map(|base| now.saturating_duration_since(base))
            .unwrap_or_default()
    }

    /// Make the start of the line that just completed the new time origin.
    pub fn rebase(&mut self) {
        if let Some(started) = self.line_started_at {
            self.base_time = Some(started);
        }
        self.prev_elapsed = Duration::ZERO;
    }
}
