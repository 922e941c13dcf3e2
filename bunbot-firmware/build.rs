//! Build script for bunbot-firmware
//!
//! - Adds the esp-hal and defmt linker scripts
//! - Validates board.toml at compile time
//! - Passes WiFi credentials and the trigger server from `.env`

use std::fs;
use std::path::Path;

fn main() {
    setup_linker();
    validate_config();
    export_network_env();
}

/// Linker scripts for the binaries
fn setup_linker() {
    println!("cargo:rustc-link-arg=-Tlinkall.x");
    println!("cargo:rustc-link-arg=-Tdefmt.x");
    println!("cargo:rerun-if-changed=build.rs");
}

/// Validate board.toml at compile time
fn validate_config() {
    println!("cargo:rerun-if-changed=board.toml");

    let config_path = Path::new("board.toml");

    if !config_path.exists() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: board.toml not found!                                    ║\n\
            ║                                                                  ║\n\
            ║  The firmware embeds board.toml. Create one in the               ║\n\
            ║  bunbot-firmware directory (an empty file uses the defaults).    ║\n\
            ╚══════════════════════════════════════════════════════════════════╝\n"
        );
    }

    let content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => {
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Failed to read board.toml                                ║\n\
                ║                                                                  ║\n\
                ║  Error: {:<56} ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                e
            );
        }
    };

    let config: toml::Value = match toml::from_str(&content) {
        Ok(value) => value,
        Err(e) => {
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Invalid TOML syntax in board.toml                        ║\n\
                ╠══════════════════════════════════════════════════════════════════╣\n\
                {}\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                format_error_lines(&e.to_string())
            );
        }
    };

    let mut errors = Vec::new();
    validate_sections(&config, &mut errors);
    validate_intervals(&config, &mut errors);
    validate_radio(&config, &mut errors);
    validate_pwm(&config, &mut errors);
    validate_console(&config, &mut errors);

    if !errors.is_empty() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: Invalid board configuration                              ║\n\
            ╠══════════════════════════════════════════════════════════════════╣\n\
            {}\n\
            ╚══════════════════════════════════════════════════════════════════╝\n",
            errors
                .iter()
                .map(|e| format!("║  • {:<62} ║", e))
                .collect::<Vec<_>>()
                .join("\n")
        );
    }

    println!("cargo:warning=board.toml validated successfully");
}

/// Format error message lines with box drawing
fn format_error_lines(msg: &str) -> String {
    msg.lines()
        .map(|line| {
            let truncated = if line.len() > 64 {
                format!("{}...", &line[..61])
            } else {
                line.to_string()
            };
            format!("║  {:<64} ║", truncated)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

const SECTIONS: &[&str] = &["sequence", "button", "status", "pwm", "sound", "radio", "console"];

/// Unknown top-level tables are almost always typos
fn validate_sections(config: &toml::Value, errors: &mut Vec<String>) {
    let Some(table) = config.as_table() else {
        return;
    };
    for (name, value) in table {
        if !SECTIONS.contains(&name.as_str()) {
            errors.push(format!("unknown section [{}]", name));
        } else if !value.is_table() {
            errors.push(format!("[{}] must be a table", name));
        }
    }
}

/// Every period must be a positive integer
fn validate_intervals(config: &toml::Value, errors: &mut Vec<String>) {
    const INTERVALS: &[(&str, &str)] = &[
        ("sequence", "broadcast_interval_ms"),
        ("status", "led_good_ms"),
        ("status", "led_error_ms"),
        ("status", "hello_interval_ms"),
        ("sound", "sample_interval_ms"),
        ("radio", "broadcast_period_ms"),
    ];

    for (section, key) in INTERVALS {
        if let Some(value) = config.get(section).and_then(|s| s.get(key)) {
            match value.as_integer() {
                Some(n) if n > 0 => {}
                _ => errors.push(format!("[{}] {} must be a positive integer", section, key)),
            }
        }
    }

    if let Some(sequence) = config.get("sequence") {
        for bun in ["bottom", "top"] {
            let Some(waits) = sequence.get(bun).and_then(|b| b.as_table()) else {
                continue;
            };
            for (key, value) in waits {
                if value.as_integer().is_none_or(|n| n < 0) {
                    errors.push(format!("[sequence.{}] {} must be >= 0", bun, key));
                }
            }
        }
    }
}

/// `master_mac` must look like `AA:BB:CC:DD:EE:FF`
fn validate_radio(config: &toml::Value, errors: &mut Vec<String>) {
    let Some(mac) = config.get("radio").and_then(|r| r.get("master_mac")) else {
        return;
    };
    let valid = mac.as_str().is_some_and(|s| {
        let groups: Vec<&str> = s.split(':').collect();
        groups.len() == 6
            && groups
                .iter()
                .all(|g| g.len() == 2 && g.chars().all(|c| c.is_ascii_hexdigit()))
    });
    if !valid {
        errors.push("[radio] master_mac must be AA:BB:CC:DD:EE:FF".to_string());
    }
}

/// Resolutions the LEDC timers are set up for (`ledc_duty` in bunbot-hal-esp32)
const PWM_RESOLUTIONS: &[i64] = &[8, 10, 12, 13, 14];

fn validate_pwm(config: &toml::Value, errors: &mut Vec<String>) {
    let Some(pwm) = config.get("pwm") else {
        return;
    };
    if let Some(bits) = pwm.get("resolution_bits") {
        if !bits.as_integer().is_some_and(|b| PWM_RESOLUTIONS.contains(&b)) {
            errors.push("[pwm] resolution_bits must be 8, 10, 12, 13 or 14".to_string());
        }
    }
    if let (Some(bits), Some(duty)) = (
        pwm.get("resolution_bits").and_then(|b| b.as_integer()),
        pwm.get("default_duty").and_then(|d| d.as_integer()),
    ) {
        if PWM_RESOLUTIONS.contains(&bits) && !(0..(1i64 << bits)).contains(&duty) {
            errors.push(format!("[pwm] default_duty must fit {} bits", bits));
        }
    }
}

/// Only the baud rate is configurable; line and queue sizes are consts
fn validate_console(config: &toml::Value, errors: &mut Vec<String>) {
    let Some(console) = config.get("console").and_then(|c| c.as_table()) else {
        return;
    };
    for key in console.keys() {
        if key != "baud" {
            errors.push(format!("[console] unknown key {}", key));
        }
    }
}

/// WiFi and trigger server settings for the proximity board
///
/// Read from `.env` (see `.env.example`) or the build environment. Empty
/// values are allowed so the other boards build without a `.env`.
fn export_network_env() {
    println!("cargo:rerun-if-changed=.env");
    let _ = dotenvy::dotenv();

    for (key, default) in [
        ("BUNBOT_WIFI_SSID", ""),
        ("BUNBOT_WIFI_PASSWORD", ""),
        ("BUNBOT_TRIGGER_HOST", ""),
        ("BUNBOT_TRIGGER_PORT", "8080"),
    ] {
        println!("cargo:rerun-if-env-changed={}", key);
        let value = std::env::var(key).unwrap_or_else(|_| default.to_string());
        println!("cargo:rustc-env={}={}", key, value);
    }
}
