//! Line assembly and timing for the incoming byte stream.
//!
//! Every byte passes through [`LineTimer::process_byte`] in arrival order. The timer stamps the
//! first byte of each line, keeps the partial line for the pattern matchers, and tracks the
//! conditions that end a session.

mod format;
mod pattern;
mod state;

use std::io::{self, Write};
use std::time::{Duration, Instant};

pub use format::{format_instant_report, format_line_prefix};
pub use pattern::{LinePattern, PatternHits, PatternRole, PatternSet};
pub use state::SessionState;

/// What the caller should do after a byte was processed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteOutcome {
    Continue,
    /// The quit pattern matched; stop without reading further.
    Quit,
}

/// Per-session line timer and pattern watcher.
#[derive(Debug)]
pub struct LineTimer {
    state: SessionState,
    patterns: PatternSet,
    show_time: bool,
}

impl LineTimer {
    /// `base_time` pre-sets the origin (launch-time mode); otherwise the first byte sets it.
    pub fn new(
        show_time: bool,
        patterns: PatternSet,
        base_time: Option<Instant>,
        deadline: Option<Instant>,
    ) -> Self {
        Self {
            state: SessionState::new(base_time, deadline),
            patterns,
            show_time,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn instant_time(&self) -> Option<Duration> {
        self.state.instant_time
    }

    pub fn quit_requested(&self) -> bool {
        self.state.quit_requested
    }

    pub fn deadline_passed(&self, now: Instant) -> bool {
        self.state.deadline.is_some_and(|deadline| now > deadline)
    }

    /// Checked once per read attempt, before any byte of that read is processed.
    pub fn should_stop(&self, now: Instant) -> bool {
        self.deadline_passed(now) || self.state.quit_requested
    }

    /// Echo one byte to `out`, updating timing and pattern state.
    pub fn process_byte<W: Write>(
        &mut self,
        byte: u8,
        now: Instant,
        out: &mut W,
    ) -> io::Result<ByteOutcome> {
        if byte == b'\r' {
            return Ok(ByteOutcome::Continue);
        }
        self.state.bytes_seen += 1;
        let base = *self.state.base_time.get_or_insert(now);

        if self.state.at_line_start {
            self.state.at_line_start = false;
            self.state.line_started_at = Some(now);
            if self.show_time {
                let elapsed = now.saturating_duration_since(base);
                let delta = elapsed.as_secs_f64() - self.state.prev_elapsed.as_secs_f64();
                out.write_all(format_line_prefix(elapsed, delta).as_bytes())?;
                out.flush()?;
                self.state.prev_elapsed = elapsed;
            }
        }

        out.write_all(&[byte])?;
        self.state.current_line.push(byte);

        let line_complete = byte == b'\n';
        let hits = self.patterns.scan(
            &self.state.current_line,
            line_complete,
            self.state.instant_time.is_none(),
        );

        if hits.instant {
            let offset = self.state.elapsed_at(now);
            tracing::debug!(offset = offset.as_secs_f64(), "instant pattern matched");
            self.state.instant_time = Some(offset);
        }
        if hits.quit {
            tracing::debug!("quit pattern matched");
            self.state.quit_requested = true;
        }

        if line_complete {
            self.state.at_line_start = true;
            self.state.lines_seen += 1;
            if hits.base {
                tracing::debug!("base pattern matched, rebasing time origin");
                self.state.rebase();
            }
            self.state.current_line.clear();
            out.flush()?;
        }

        Ok(if hits.quit {
            ByteOutcome::Quit
        } else {
            ByteOutcome::Continue
        })
    }

    /// Write the instant-pattern line if the pattern ever matched. Returns whether it wrote.
    pub fn write_report<W: Write>(&self, out: &mut W) -> io::Result<bool> {
        let (Some(pattern), Some(offset)) = (&self.patterns.instant, self.state.instant_time)
        else {
            return Ok(false);
        };
        out.write_all(format_instant_report(pattern, offset).as_bytes())?;
        out.flush()?;
        Ok(true)
    }
}
