//! Process-wide logger bootstrap.
//!
//! Both the host thread and the render thread log through the `log` facade;
//! this module wires those lines to stderr via `env_logger`. Hosts that
//! install their own logger simply never call [`init`].

use std::sync::Once;

/// Baseline filter when neither the config nor `RUST_LOG` say otherwise.
/// Lifecycle and bring-up lines stay visible at info; wgpu's internals are
/// held to warnings so they do not bury them.
pub const DEFAULT_FILTER: &str = "info,wgpu_core=warn,wgpu_hal=warn,naga=warn";

/// Bootstrap options for [`init`].
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Filter in `env_logger` syntax (e.g. "debug", "gyre_render=trace").
    /// Overrides both `RUST_LOG` and [`DEFAULT_FILTER`] when set.
    pub filter: Option<String>,
    /// ANSI color handling for the stderr writer.
    pub write_style: env_logger::WriteStyle,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: None,
            write_style: env_logger::WriteStyle::Auto,
        }
    }
}

static INIT: Once = Once::new();

/// Installs the process-wide logger. Only the first call does anything, so
/// hosts and tests can call it without coordinating.
///
/// Filter precedence: `config.filter`, then `RUST_LOG`, then
/// [`DEFAULT_FILTER`].
pub fn init(config: &LoggingConfig) {
    INIT.call_once(|| {
        let filter = resolve_filter(config);
        env_logger::Builder::new()
            .parse_filters(&filter)
            .write_style(config.write_style)
            .init();

        log::debug!("logging ready (filter: {filter})");
    });
}

fn resolve_filter(config: &LoggingConfig) -> String {
    config
        .filter
        .clone()
        .or_else(|| std::env::var("RUST_LOG").ok())
        .unwrap_or_else(|| DEFAULT_FILTER.to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_filter_beats_everything_else() {
        let config = LoggingConfig {
            filter: Some("debug".into()),
            ..LoggingConfig::default()
        };
        assert_eq!(resolve_filter(&config), "debug");
    }

    #[test]
    fn baseline_keeps_info_and_quiets_wgpu() {
        assert!(DEFAULT_FILTER.starts_with("info"));
        for noisy in ["wgpu_core=warn", "wgpu_hal=warn", "naga=warn"] {
            assert!(DEFAULT_FILTER.contains(noisy), "missing {noisy}");
        }
    }
}
