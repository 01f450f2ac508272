use std::process::Command;

fn combined_output(output: &std::process::Output) -> String {
    let mut combined = String::new();
    combined.push_str(&String::from_utf8_lossy(&output.stdout));
    combined.push_str(&String::from_utf8_lossy(&output.stderr));
    combined
}

fn serialwatch_bin() -> &'static str {
    option_env!("CARGO_BIN_EXE_serialwatch").expect("serialwatch test binary not built")
}

fn run(args: &[&str]) -> std::process::Output {
    Command::new(serialwatch_bin())
        .args(args)
        .env_remove("SERIALWATCH_LOGS")
        .output()
        .expect("run serialwatch")
}

#[test]
fn help_lists_flags_and_exits_zero() {
    let output = run(&["--help"]);
    assert_eq!(output.status.code(), Some(0));
    let combined = combined_output(&output);
    assert!(combined.contains("--baudrate"));
    assert!(combined.contains("--instantpat"));
}

#[test]
fn version_exits_zero() {
    let output = run(&["-V"]);
    assert_eq!(output.status.code(), Some(0));
    assert!(combined_output(&output).contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn unknown_flag_exits_two() {
    let output = run(&["--no-such-flag"]);
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn missing_device_exits_two() {
    let output = run(&["-d", "/definitely/not/a/tty"]);
    assert_eq!(output.status.code(), Some(2));
    assert!(combined_output(&output).contains("/definitely/not/a/tty"));
    assert!(output.stdout.is_empty());
}

#[test]
fn invalid_baud_exits_three_and_lists_allowed_rates() {
    let output = run(&["-b", "12345"]);
    assert_eq!(output.status.code(), Some(3));
    let combined = combined_output(&output);
    assert!(combined.contains("12345"));
    assert!(combined.contains("115200"));
}

#[test]
fn invalid_values_exit_three() {
    for args in [
        ["-w", "4"],
        ["-p", "Z"],
        ["-s", "3"],
        ["-e", "never"],
    ] {
        let output = run(&args);
        assert_eq!(output.status.code(), Some(3), "args {args:?}");
    }
}

#[test]
fn list_devices_prints_message() {
    let output = Command::new(serialwatch_bin())
        .arg("--list-devices")
        .env("SERIALWATCH_TEST_DEVICES", "/dev/ttyFAKE0, /dev/ttyFAKE1")
        .output()
        .expect("run serialwatch --list-devices");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Available serial devices:"));
    assert!(stdout.contains("/dev/ttyFAKE1"));
}

#[test]
fn list_devices_reports_none() {
    let output = Command::new(serialwatch_bin())
        .arg("--list-devices")
        .env("SERIALWATCH_TEST_DEVICES", "")
        .output()
        .expect("run serialwatch --list-devices");
    assert!(output.status.success());
    assert!(combined_output(&output).contains("No serial devices detected."));
}

#[cfg(target_os = "linux")]
#[test]
fn echoes_pty_stream_until_quit_pattern() {
    use serialport::{SerialPort, TTYPort};
    use std::io::Write;
    use std::process::Stdio;
    use std::thread;
    use std::time::Duration;

    let (mut master, slave) = TTYPort::pair().expect("open pty pair");
    let path = slave.name().expect("pty slave has a path");
    // serialwatch locks the port on open.
    drop(slave);

    let child = Command::new(serialwatch_bin())
        .args(["-d", &path, "-i", "READY", "-q", "DONE", "-e", "10"])
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("spawn serialwatch");
    thread::sleep(Duration::from_millis(1000));
    master
        .write_all(b"boot\r\nREADY\r\nDONE tail")
        .expect("write to pty master");
    master.flush().expect("flush pty master");

    let output = child.wait_with_output().expect("wait for serialwatch");
    assert_eq!(output.status.code(), Some(0), "{}", combined_output(&output));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("boot\nREADY\nDONE"), "stdout: {stdout:?}");
    assert!(!stdout.contains("tail"));
    assert!(stdout.contains("The instantpat: \"READY\", was matched at "));
}
