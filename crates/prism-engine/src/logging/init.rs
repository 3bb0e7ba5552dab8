use std::sync::Once;

use log::LevelFilter;

/// Logger setup for prism binaries and tests.
///
/// An explicit `env_filter` wins over `RUST_LOG`; both use the `env_logger`
/// directive syntax, e.g. `"prism_engine::convert=debug"`. Without either,
/// prism logs at `level` and the wgpu backends only at warnings.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub env_filter: Option<String>,
    pub level: LevelFilter,
    /// Logs every owner-side state change (stage skips, invalidations) at trace.
    pub trace_conversions: bool,
    pub write_style: env_logger::WriteStyle,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            env_filter: None,
            level: LevelFilter::Info,
            trace_conversions: false,
            write_style: env_logger::WriteStyle::Auto,
        }
    }
}

impl LoggingConfig {
    /// Module directives applied when no filter string is given.
    fn default_directives(&self) -> Vec<(Option<&'static str>, LevelFilter)> {
        let mut directives = vec![
            (None, self.level),
            (Some("wgpu_core"), LevelFilter::Warn),
            (Some("wgpu_hal"), LevelFilter::Warn),
        ];
        if self.trace_conversions {
            directives.push((Some("prism_engine::data"), LevelFilter::Trace));
        }
        directives
    }
}

static INIT: Once = Once::new();

/// Installs the global logger on first call; later calls do nothing.
///
/// Leaves an already installed logger in place, so a host application or
/// test harness keeps its own.
pub fn init_logging(config: LoggingConfig) {
    INIT.call_once(|| {
        let mut builder = env_logger::Builder::new();

        let filter = config.env_filter.clone().or_else(|| std::env::var("RUST_LOG").ok());
        match filter {
            Some(filter) => {
                builder.parse_filters(&filter);
            }
            None => {
                for (module, level) in config.default_directives() {
                    builder.filter(module, level);
                }
            }
        }
        builder.write_style(config.write_style);

        if builder.try_init().is_ok() {
            log::debug!("prism logging ready");
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_quiet_wgpu_backends() {
        let directives = LoggingConfig::default().default_directives();
        assert_eq!(directives[0], (None, LevelFilter::Info));
        assert!(directives.contains(&(Some("wgpu_core"), LevelFilter::Warn)));
        assert!(!directives.iter().any(|(m, _)| *m == Some("prism_engine::data")));
    }

    #[test]
    fn conversion_tracing_targets_the_owner() {
        let config = LoggingConfig {
            level: LevelFilter::Warn,
            trace_conversions: true,
            ..LoggingConfig::default()
        };
        let directives = config.default_directives();
        assert_eq!(directives[0], (None, LevelFilter::Warn));
        assert!(directives.contains(&(Some("prism_engine::data"), LevelFilter::Trace)));
    }

    #[test]
    fn repeated_init_is_harmless() {
        init_logging(LoggingConfig::default());
        init_logging(LoggingConfig::default());
    }
}
