//! Tracing setup: a preset picks the base filter, `--log target=level`
//! refines it, and `RUST_LOG` replaces both when set.

use clap::ValueEnum;
use std::collections::BTreeMap;
use tracing::Level;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const TARGET_PREFIX: &str = "agentwatch::";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogPreset {
    /// Startup, API and worker lifecycle
    #[default]
    Production,
    Verbose,
    Debug,
    Trace,
    Quiet,
}

impl LogPreset {
    /// The quietest requested flag wins, then the most detailed.
    pub fn from_flags(verbose: bool, debug: bool, trace: bool, quiet: bool) -> Self {
        match (quiet, trace, debug, verbose) {
            (true, ..) => LogPreset::Quiet,
            (_, true, ..) => LogPreset::Trace,
            (_, _, true, _) => LogPreset::Debug,
            (_, _, _, true) => LogPreset::Verbose,
            _ => LogPreset::Production,
        }
    }

    fn directives(self) -> &'static [&'static str] {
        match self {
            LogPreset::Production => &[
                "agentwatch::startup=info",
                "agentwatch::api=info",
                "agentwatch::ws=info",
                "agentwatch::ws::ping=off",
                "agentwatch::workers=info",
                "agentwatch::presence=warn",
                "agentwatch::presence::tick=off",
                "agentwatch::classifier=warn",
                "tower_http=warn",
            ],
            LogPreset::Verbose => &[
                "agentwatch=info",
                "agentwatch::presence=debug",
                "agentwatch::ws::ping=off",
                "tower_http=info",
            ],
            LogPreset::Debug => &["agentwatch=debug", "agentwatch::ws::ping=off", "tower_http=debug"],
            LogPreset::Trace => &["agentwatch=trace", "tower_http=trace"],
            LogPreset::Quiet => &["agentwatch=warn", "tower_http=error"],
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct LogConfig {
    pub preset: LogPreset,
    /// Fully qualified target -> level, e.g. "agentwatch::presence" -> DEBUG.
    pub overrides: BTreeMap<String, Level>,
    pub format: LogFormat,
}

impl LogConfig {
    /// `log_overrides` entries are `target=level`, repeated or comma separated.
    /// Short targets get the `agentwatch::` prefix; unknown levels are skipped.
    pub fn from_cli(
        verbose: bool,
        debug: bool,
        trace: bool,
        quiet: bool,
        log_overrides: Vec<String>,
        format: LogFormat,
    ) -> Self {
        let overrides = log_overrides
            .iter()
            .flat_map(|arg| arg.split(','))
            .filter_map(parse_override)
            .collect();

        Self {
            preset: LogPreset::from_flags(verbose, debug, trace, quiet),
            overrides,
            format,
        }
    }

    /// Preset directives followed by overrides, so overrides take precedence.
    pub fn directives(&self) -> String {
        self.preset
            .directives()
            .iter()
            .map(|d| d.to_string())
            .chain(
                self.overrides
                    .iter()
                    .map(|(target, level)| format!("{}={}", target, level.as_str().to_ascii_lowercase())),
            )
            .collect::<Vec<_>>()
            .join(",")
    }

    pub fn build_filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(self.directives()))
            .unwrap_or_else(|_| EnvFilter::new("info"))
    }
}

fn parse_override(part: &str) -> Option<(String, Level)> {
    let (target, level) = part.split_once('=')?;
    let target = target.trim();
    let level = level.trim().parse::<Level>().ok()?;

    let target = if target.starts_with(TARGET_PREFIX) || target == "tower_http" {
        target.to_string()
    } else {
        format!("{}{}", TARGET_PREFIX, target)
    };
    Some((target, level))
}

pub fn init(config: &LogConfig) {
    let (text, json) = match config.format {
        LogFormat::Text => (Some(fmt::layer().with_target(true)), None),
        LogFormat::Json => (None, Some(fmt::layer().json().with_target(true))),
    };

    tracing_subscriber::registry()
        .with(config.build_filter())
        .with(text)
        .with(json)
        .init();
}
