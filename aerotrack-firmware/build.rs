//! Build script for aerotrack-firmware
//!
//! - Validates board.toml at compile time
//! - Exports the selected board to the firmware
//!
//! The linker script comes from embassy-stm32's `memory-x` feature.

use std::fs;
use std::path::Path;

/// Variants this firmware's backend can drive
const SUPPORTED_VARIANTS: &[&str] = &["twatch_eb_1_3", "tmotion_1_1"];

/// Largest over-the-air address
const ADDRESS_MAX: i64 = 0x00FF_FFFF;

struct BoardSelection {
    variant: String,
    probe: bool,
    address: Option<u32>,
}

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-changed=board.toml");

    let board = match load_board(Path::new("board.toml")) {
        Ok(board) => board,
        Err(errors) => fail(&errors),
    };

    println!("cargo:rustc-env=AEROTRACK_BOARD={}", board.variant);
    println!(
        "cargo:rustc-env=AEROTRACK_PROBE={}",
        if board.probe { "1" } else { "0" }
    );
    let address = board
        .address
        .map(|a| format!("{:06X}", a))
        .unwrap_or_default();
    println!("cargo:rustc-env=AEROTRACK_ADDRESS={}", address);
}

fn load_board(path: &Path) -> Result<BoardSelection, Vec<String>> {
    if !path.exists() {
        return Err(vec![
            "board.toml not found".into(),
            "Create one in the aerotrack-firmware directory".into(),
        ]);
    }

    let content = fs::read_to_string(path)
        .map_err(|e| vec![format!("failed to read board.toml: {}", e)])?;

    let config: toml::Value = toml::from_str(&content).map_err(|e| {
        e.to_string()
            .lines()
            .map(|line| format!("syntax: {}", line))
            .collect::<Vec<_>>()
    })?;

    let board = match config.get("board") {
        Some(toml::Value::Table(t)) => t,
        Some(_) => return Err(vec!["[board] must be a table".into()]),
        None => return Err(vec!["missing [board] section".into()]),
    };

    let mut errors = Vec::new();

    let variant = match board.get("variant") {
        Some(toml::Value::String(name)) if SUPPORTED_VARIANTS.contains(&name.as_str()) => {
            name.clone()
        }
        Some(toml::Value::String(name)) if name == "blue_pill" => {
            errors.push("'blue_pill' needs an STM32F1 backend, not this firmware".into());
            String::new()
        }
        Some(toml::Value::String(name)) => {
            errors.push(format!(
                "unknown variant '{}' (expected one of: {})",
                name,
                SUPPORTED_VARIANTS.join(", ")
            ));
            String::new()
        }
        Some(_) => {
            errors.push("[board] variant must be a string".into());
            String::new()
        }
        None => {
            errors.push("[board] missing 'variant'".into());
            String::new()
        }
    };

    let probe = match board.get("probe") {
        Some(toml::Value::Boolean(probe)) => *probe,
        Some(_) => {
            errors.push("[board] probe must be true or false".into());
            false
        }
        None => true,
    };

    let address = match board.get("address") {
        Some(toml::Value::Integer(a)) if (0..=ADDRESS_MAX).contains(a) => Some(*a as u32),
        Some(toml::Value::Integer(_)) => {
            errors.push("[board] address must fit in 24 bits".into());
            None
        }
        Some(_) => {
            errors.push("[board] address must be an integer".into());
            None
        }
        None => None,
    };

    for key in board.keys() {
        if !matches!(key.as_str(), "variant" | "probe" | "address") {
            errors.push(format!("[board] unknown key '{}'", key));
        }
    }

    if errors.is_empty() {
        Ok(BoardSelection {
            variant,
            probe,
            address,
        })
    } else {
        Err(errors)
    }
}

fn fail(errors: &[String]) -> ! {
    panic!(
        "\n\
        ╔══════════════════════════════════════════════════════════════════╗\n\
        ║  ERROR: Invalid board.toml                                       ║\n\
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
