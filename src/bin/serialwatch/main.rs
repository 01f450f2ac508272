//! serialwatch entrypoint.
//!
//! Opens the configured serial device, optionally sends a startup command, then echoes every
//! byte to stdout through the line timer until the quit pattern, the end time, Ctrl-C, or a read
//! failure stops it.

mod cli_utils;

use anyhow::Result;
use clap::Parser;
use serialwatch::config::AppConfig;
use serialwatch::serial::SerialDevice;
use serialwatch::session::{build_timer, run_session, send_command, SystemClock};
use serialwatch::signal::{install_interrupt_handler, interrupt_requested};
use serialwatch::telemetry;
use std::io;
use std::process::ExitCode;
use std::time::Instant;

use crate::cli_utils::{exit_code_for, list_devices};

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("serialwatch: {err:#}");
            ExitCode::from(exit_code_for(&err))
        }
    }
}

fn run() -> Result<()> {
    let started = Instant::now();
    let config = AppConfig::parse();
    telemetry::init_tracing(&config);
    telemetry::install_panic_hook();

    if config.list_devices {
        return list_devices();
    }

    let plan = config.validate()?;
    tracing::debug!(version = env!("CARGO_PKG_VERSION"), "serialwatch started");
    tracing::info!(
        device = %plan.port.device,
        settings = %plan.port.summary(),
        xonxoff = plan.port.xonxoff,
        rtscts = plan.port.rtscts,
        force_reset = plan.port.force_reset,
        "opening serial port"
    );
    for pattern in plan.watch.patterns.iter() {
        tracing::info!(role = pattern.role().label(), pattern = pattern.as_str(), "watching");
    }

    install_interrupt_handler()?;
    let mut device = SerialDevice::open(&plan.port)?;
    let mut timer = build_timer(&plan.watch, started);
    send_command(&mut device, plan.watch.command.as_deref())?;
    tracing::info!("reading {}; press Ctrl-C to stop", device.name());

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let summary = run_session(
        &mut device,
        &SystemClock,
        &mut timer,
        &mut out,
        interrupt_requested,
    )?;

    tracing::info!(
        reason = summary.reason.label(),
        bytes = summary.bytes,
        lines = summary.lines,
        instant = summary.instant_time.map(|offset| offset.as_secs_f64()),
        "session finished"
    );
    Ok(())
}
