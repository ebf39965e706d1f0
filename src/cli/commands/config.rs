//! Config command implementation.
//!
//! View and modify timelens configuration settings.

use std::path::Path;

use crate::cli::{Cli, ConfigAction, ConfigArgs, OutputFormat};
use crate::config::Config;
use crate::error::{Result, TimelensError};

/// Run the config command.
pub fn run(cli: &Cli, args: &ConfigArgs) -> Result<()> {
    let path = cli.config_path()?;
    match &args.action {
        ConfigAction::Show => show_config(cli, &path),
        ConfigAction::Get { key } => get_config_value(cli, &path, key),
        ConfigAction::Set { key, value } => set_config_value(&path, key, value),
        ConfigAction::Path => {
            println!("{}", path.display());
            Ok(())
        }
        ConfigAction::Init => init_config(&path),
        ConfigAction::Reset => reset_config(&path),
    }
}

fn load_or_default(path: &Path) -> Result<Config> {
    if path.exists() {
        Config::load_from(path)
    } else {
        Ok(Config::default())
    }
}

/// Show full configuration.
fn show_config(cli: &Cli, path: &Path) -> Result<()> {
    let config = load_or_default(path)?;

    match cli.effective_output() {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
        OutputFormat::Text => {
            println!("timelens Configuration");
            println!("======================\n");

            println!("[categories]");
            println!("  names = {:?}", config.categories.names);
            println!();

            println!("[sprint]");
            println!("  length_days = {}", config.sprint.length_days);
            println!();

            println!("[heatmap]");
            println!("  padding_months = {}", config.heatmap.padding_months);
            println!("  fallback_months = {}", config.heatmap.fallback_months);
            println!("  level_thresholds_hours = {:?}", config.heatmap.level_thresholds_hours);
            println!();

            println!("[deviation]");
            println!("  excellent_percent = {}", config.deviation.excellent_percent);
            println!("  good_percent = {}", config.deviation.good_percent);
            println!();

            println!("[display]");
            println!("  top_collaborations = {}", config.display.top_collaborations);
            println!("  top_issues = {}", config.display.top_issues);
            println!("  decimal_places = {}", config.display.decimal_places);
        }
    }

    Ok(())
}

/// Look up a dotted key.
pub fn config_value(config: &Config, key: &str) -> Result<String> {
    let value = match key {
        "categories.names" => config.categories.names.join(","),
        "sprint.length_days" => config.sprint.length_days.to_string(),
        "heatmap.padding_months" => config.heatmap.padding_months.to_string(),
        "heatmap.fallback_months" => config.heatmap.fallback_months.to_string(),
        "heatmap.level_thresholds_hours" => config
            .heatmap
            .level_thresholds_hours
            .iter()
            .map(f64::to_string)
            .collect::<Vec<_>>()
            .join(","),
        "deviation.excellent_percent" => config.deviation.excellent_percent.to_string(),
        "deviation.good_percent" => config.deviation.good_percent.to_string(),
        "display.top_collaborations" => config.display.top_collaborations.to_string(),
        "display.top_issues" => config.display.top_issues.to_string(),
        "display.decimal_places" => config.display.decimal_places.to_string(),
        _ => return Err(unknown_key(key)),
    };
    Ok(value)
}

/// Apply a dotted key. The result is validated before it is returned.
pub fn apply_config_value(config: &mut Config, key: &str, value: &str) -> Result<()> {
    match key {
        "categories.names" => {
            config.categories.names = value
                .split(',')
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .map(String::from)
                .collect();
        }
        "sprint.length_days" => config.sprint.length_days = parse_number(value)?,
        "heatmap.padding_months" => config.heatmap.padding_months = parse_number(value)?,
        "heatmap.fallback_months" => config.heatmap.fallback_months = parse_number(value)?,
        "heatmap.level_thresholds_hours" => {
            let parsed: Vec<f64> = value.split(',').map(|part| parse_number(part.trim())).collect::<Result<_>>()?;
            config.heatmap.level_thresholds_hours = parsed.try_into().map_err(|_| TimelensError::ConfigError {
                message: format!("Expected three comma-separated thresholds: {value}"),
            })?;
        }
        "deviation.excellent_percent" => config.deviation.excellent_percent = parse_number(value)?,
        "deviation.good_percent" => config.deviation.good_percent = parse_number(value)?,
        "display.top_collaborations" => config.display.top_collaborations = parse_number(value)?,
        "display.top_issues" => config.display.top_issues = parse_number(value)?,
        "display.decimal_places" => config.display.decimal_places = parse_number(value)?,
        _ => return Err(unknown_key(key)),
    }
    config.validate()
}

/// Get a specific configuration value.
fn get_config_value(cli: &Cli, path: &Path, key: &str) -> Result<()> {
    let config = load_or_default(path)?;
    let value = config_value(&config, key)?;

    match cli.effective_output() {
        OutputFormat::Json => println!("{}", serde_json::json!({ key: value })),
        OutputFormat::Text => println!("{value}"),
    }

    Ok(())
}

/// Set a configuration value.
fn set_config_value(path: &Path, key: &str, value: &str) -> Result<()> {
    let mut config = load_or_default(path)?;
    apply_config_value(&mut config, key, value)?;
    config.save_to(path)?;
    println!("Set {key} = {value}");
    Ok(())
}

/// Initialize configuration file with defaults.
fn init_config(path: &Path) -> Result<()> {
    if path.exists() {
        println!("Configuration file already exists at: {}", path.display());
        println!("Use 'timelens config reset' to reset to defaults.");
        return Ok(());
    }

    Config::default().save_to(path)?;
    println!("Created configuration file at: {}", path.display());
    Ok(())
}

/// Reset configuration to defaults.
fn reset_config(path: &Path) -> Result<()> {
    if !path.exists() {
        println!("No configuration file exists. Use 'timelens config init' to create one.");
        return Ok(());
    }

    Config::default().save_to(path)?;
    println!("Reset configuration to defaults at: {}", path.display());
    Ok(())
}

fn unknown_key(key: &str) -> TimelensError {
    TimelensError::ConfigError {
        message: format!("Unknown configuration key: {key}"),
    }
}

fn parse_number<T: std::str::FromStr>(value: &str) -> Result<T> {
    value.parse().map_err(|_| TimelensError::ConfigError {
        message: format!("Invalid number: {value}"),
    })
}
