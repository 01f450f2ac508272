//! The blocking read loop that feeds the line timer.

use anyhow::{Context, Result};
use std::io::Write;
use std::time::{Duration, Instant};

use crate::config::WatchSettings;
use crate::serial::ByteSource;
use crate::timer::{ByteOutcome, LineTimer};

/// Source of "now" for the loop. Tests swap in a scripted clock.
pub trait Clock {
    fn now(&self) -> Instant;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Why the loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    QuitPattern,
    Deadline,
    Interrupted,
    ReadError,
}

impl StopReason {
    pub fn label(self) -> &'static str {
        match self {
            StopReason::QuitPattern => "quit pattern matched",
            StopReason::Deadline => "end time reached",
            StopReason::Interrupted => "interrupted",
            StopReason::ReadError => "read error",
        }
    }
}

/// What a finished session looked like.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSummary {
    pub reason: StopReason,
    pub bytes: u64,
    pub lines: u64,
    pub instant_time: Option<Duration>,
}

/// Build the timer for one run. `started` is the launch instant: it anchors the deadline and,
/// in launch-time mode, the time origin.
pub fn build_timer(watch: &WatchSettings, started: Instant) -> LineTimer {
    let base_time = watch.launch_time.then_some(started);
    let deadline = watch.run_for.and_then(|run_for| started.checked_add(run_for));
    LineTimer::new(watch.show_time, watch.patterns.clone(), base_time, deadline)
}

/// Send the startup command, if any, with a trailing newline.
pub fn send_command<S: ByteSource>(source: &mut S, command: Option<&str>) -> Result<()> {
    let Some(command) = command else {
        return Ok(());
    };
    let mut line = command.as_bytes().to_vec();
    line.push(b'\n');
    source
        .write_command(&line)
        .context("failed to send startup command")?;
    tracing::info!(command, "sent startup command");
    Ok(())
}

/// Read until the quit pattern, the deadline, an interrupt, or a read failure, then write the
/// instant report. Output write failures are returned as errors.
pub fn run_session<S, C, W, F>(
    source: &mut S,
    clock: &C,
    timer: &mut LineTimer,
    out: &mut W,
    interrupted: F,
) -> Result<SessionSummary>
where
    S: ByteSource,
    C: Clock,
    W: Write,
    F: Fn() -> bool,
{
    let reason = read_loop(source, clock, timer, out, interrupted);
    let reason = match reason {
        Ok(reason) => reason,
        Err(err) => {
            // Best effort; the writer already failed once.
            let _ = timer.write_report(out);
            return Err(err);
        }
    };
    out.flush().context("failed to flush output")?;
    timer
        .write_report(out)
        .context("failed to write instant report")?;

    let state = timer.state();
    tracing::debug!(
        reason = reason.label(),
        bytes = state.bytes_seen,
        lines = state.lines_seen,
        "session ended"
    );
    Ok(SessionSummary {
        reason,
        bytes: state.bytes_seen,
        lines: state.lines_seen,
        instant_time: timer.instant_time(),
    })
}

fn read_loop<S, C, W, F>(
    source: &mut S,
    clock: &C,
    timer: &mut LineTimer,
    out: &mut W,
    interrupted: F,
) -> Result<StopReason>
where
    S: ByteSource,
    C: Clock,
    W: Write,
    F: Fn() -> bool,
{
    loop {
        if interrupted() {
            return Ok(StopReason::Interrupted);
        }
        let now = clock.now();
        if timer.should_stop(now) {
            return Ok(if timer.quit_requested() {
                StopReason::QuitPattern
            } else {
                StopReason::Deadline
            });
        }

        let byte = match source.read_byte() {
            Ok(Some(byte)) => byte,
            Ok(None) => continue,
            Err(err) => {
                tracing::warn!(error = %err, "serial read failed, stopping");
                return Ok(StopReason::ReadError);
            }
        };

        let outcome = timer
            .process_byte(byte, clock.now(), out)
            .context("failed to write output")?;
        if outcome == ByteOutcome::Quit {
            return Ok(StopReason::QuitPattern);
        }
    }
}
