use anyhow::{Error, Result};
use serialwatch::config::ConfigError;
use serialwatch::serial;

/// Exit status for a failed run: configuration errors carry their own, anything else is 1.
pub(crate) fn exit_code_for(err: &Error) -> u8 {
    err.chain()
        .find_map(|cause| cause.downcast_ref::<ConfigError>())
        .map(ConfigError::exit_code)
        .unwrap_or(1)
}

fn parse_device_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|item| item.trim().to_string())
        .filter(|item| !item.is_empty())
        .collect()
}

pub(crate) fn list_devices() -> Result<()> {
    // Support SERIALWATCH_TEST_DEVICES for testing
    let devices = if let Ok(raw) = std::env::var("SERIALWATCH_TEST_DEVICES") {
        parse_device_list(&raw)
    } else {
        serial::list_ports().unwrap_or_else(|err| {
            eprintln!("Failed to list serial devices: {err:#}");
            Vec::new()
        })
    };

    if devices.is_empty() {
        println!("No serial devices detected.");
    } else {
        println!("Available serial devices:");
        for name in devices {
            println!("  - {name}");
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;

    #[test]
    fn config_errors_keep_their_exit_code() {
        let err = Error::new(ConfigError::InvalidWidth("9".to_string()));
        assert_eq!(exit_code_for(&err), 3);
        let err = Error::new(ConfigError::MissingDevice("/dev/nope".to_string()))
            .context("startup failed");
        assert_eq!(exit_code_for(&err), 2);
    }

    #[test]
    fn runtime_errors_exit_with_one() {
        let err: Result<()> = Err(std::io::Error::other("port busy")).context("open failed");
        assert_eq!(exit_code_for(&err.expect_err("error")), 1);
    }

    #[test]
    fn device_list_skips_blank_entries() {
        assert_eq!(
            parse_device_list(" /dev/ttyS0, ,/dev/ttyUSB1 ,"),
            vec!["/dev/ttyS0".to_string(), "/dev/ttyUSB1".to_string()]
        );
        assert!(parse_device_list("   ").is_empty());
    }
}
