use clap::{CommandFactory, Parser};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::warn;

use crate::models::{OutputFormat, ViewMode};
use crate::time_utils::TimezoneHandler;

// ── Settings (CLI) ─────────────────────────────────────────────────────────────

/// Estimate the water footprint of your AI chat history
#[derive(Parser, Debug, Clone)]
#[command(
    name = "water-impact",
    about = "Estimate the water footprint of your AI chat history",
    version
)]
pub struct Settings {
    /// Conversation export: a conversations.json file or the export .zip
    pub input: PathBuf,

    /// Output format
    #[arg(long, env = "WATER_IMPACT_FORMAT", default_value = "summary", value_parser = ["summary", "json", "csv", "report"])]
    pub format: String,

    /// Period view used by the summary output
    #[arg(long, env = "WATER_IMPACT_VIEW", default_value = "daily", value_parser = ["daily", "weekly", "monthly"])]
    pub view: String,

    /// IANA timezone used to assign messages to calendar days
    #[arg(long, env = "WATER_IMPACT_TIMEZONE", default_value = "UTC")]
    pub timezone: String,

    /// Logging level
    #[arg(long, env = "WATER_IMPACT_LOG_LEVEL", default_value = "WARNING", value_parser = ["DEBUG", "INFO", "WARNING", "ERROR", "CRITICAL"])]
    pub log_level: String,

    /// Log file path
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,

    /// Clear saved configuration
    #[arg(long)]
    pub clear: bool,
}

// ── LastUsedParams ─────────────────────────────────────────────────────────────

/// Persisted last-used parameters saved to `~/.water-impact/last_used.json`.
#[derive(Debug, Serialize, Deserialize, Default, Clone)]
pub struct LastUsedParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub view: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
}

impl LastUsedParams {
    /// Return the default path to the persisted config file.
    pub fn config_path() -> PathBuf {
        Self::config_path_in(&dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
    }

    /// Return the config path rooted at `base_dir`.
    pub fn config_path_in(base_dir: &std::path::Path) -> PathBuf {
        base_dir.join(".water-impact").join("last_used.json")
    }

    /// Load persisted params from an explicit path.
    /// Returns `Default` when the file is absent or cannot be parsed.
    pub fn load_from(path: &std::path::Path) -> Self {
        let Ok(content) = std::fs::read_to_string(path) else {
            return Self::default();
        };
        serde_json::from_str(&content).unwrap_or_default()
    }

    /// Atomically write params to `path`, creating parent directories if needed.
    pub fn save_to(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;

        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, &json)?;
        std::fs::rename(&tmp, path)?;

        Ok(())
    }

    /// Delete the config file at `path` if it exists.
    pub fn clear_at(path: &std::path::Path) -> Result<(), std::io::Error> {
        if path.exists() {
            std::fs::remove_file(path)?;
        }
        Ok(())
    }
}

// ── Settings impl ──────────────────────────────────────────────────────────────

impl Settings {
    /// Parse CLI arguments, merge with last-used params where no explicit
    /// value was provided, validate, and persist the result.
    pub fn load_with_last_used() -> Self {
        Self::load_with_last_used_impl(
            std::env::args_os().collect(),
            &LastUsedParams::config_path(),
        )
    }

    /// Same as [`Settings::load_with_last_used`] with an explicit argument
    /// list and config path.
    pub fn load_with_last_used_impl(
        args: Vec<std::ffi::OsString>,
        config_path: &std::path::Path,
    ) -> Self {
        let matches = Settings::command().get_matches_from(args.clone());
        let mut settings = Settings::parse_from(args);

        if settings.clear {
            if let Err(e) = LastUsedParams::clear_at(config_path) {
                warn!("Failed to clear {}: {}", config_path.display(), e);
            }
            return Self::resolve(settings);
        }

        let last = LastUsedParams::load_from(config_path);

        // CLI and environment always win over persisted values.
        if !is_arg_explicitly_set(&matches, "format") {
            if let Some(v) = last.format {
                settings.format = v;
            }
        }
        if !is_arg_explicitly_set(&matches, "view") {
            if let Some(v) = last.view {
                settings.view = v;
            }
        }
        if !is_arg_explicitly_set(&matches, "timezone") {
            if let Some(v) = last.timezone {
                settings.timezone = v;
            }
        }

        settings = Self::resolve(settings);

        let params = LastUsedParams::from(&settings);
        if let Err(e) = params.save_to(config_path) {
            warn!("Failed to persist settings to {}: {}", config_path.display(), e);
        }

        settings
    }

    /// Repair invalid persisted values and apply the `--debug` flag.
    fn resolve(mut settings: Settings) -> Settings {
        if !TimezoneHandler::validate_timezone(&settings.timezone) {
            warn!(
                "Unrecognised timezone \"{}\", grouping days in UTC",
                settings.timezone
            );
            settings.timezone = "UTC".to_string();
        }
        if settings.format.parse::<OutputFormat>().is_err() {
            settings.format = "summary".to_string();
        }
        if settings.view.parse::<ViewMode>().is_err() {
            settings.view = "daily".to_string();
        }

        if settings.debug {
            settings.log_level = "DEBUG".to_string();
        }

        settings
    }

    /// The selected output format.
    pub fn output_format(&self) -> OutputFormat {
        self.format.parse().unwrap_or(OutputFormat::Summary)
    }

    /// The selected period view.
    pub fn view_mode(&self) -> ViewMode {
        self.view.parse().unwrap_or(ViewMode::Daily)
    }
}

// ── Conversion ─────────────────────────────────────────────────────────────────

impl From<&Settings> for LastUsedParams {
    fn from(s: &Settings) -> Self {
        LastUsedParams {
            format: Some(s.format.clone()),
            view: Some(s.view.clone()),
            timezone: Some(s.timezone.clone()),
        }
    }
}

/// Returns `true` when `name` was supplied on the command line or through its
/// environment variable (not via default value).
fn is_arg_explicitly_set(matches: &clap::ArgMatches, name: &str) -> bool {
    matches!(
        matches.value_source(name),
        Some(clap::parser::ValueSource::CommandLine) | Some(clap::parser::ValueSource::EnvVariable)
    )
}

// ── Tests ──────────────────────────────────────────────────────────────────────
