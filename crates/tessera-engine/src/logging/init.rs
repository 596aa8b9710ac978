use std::sync::Once;

/// Modules that log every pipeline and texture creation at info.
const GPU_MODULES: [&str; 3] = ["wgpu_core", "wgpu_hal", "naga"];

/// Logger configuration.
///
/// `env_filter` follows the `env_logger` filter syntax (e.g.
/// "tessera_engine::frame=trace"). Without it `RUST_LOG` is honoured, and
/// without that `level` applies with the GPU stack held at `gpu_level`.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub env_filter: Option<String>,
    pub level: log::LevelFilter,
    pub gpu_level: log::LevelFilter,
    pub write_style: env_logger::WriteStyle,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            env_filter: None,
            level: log::LevelFilter::Info,
            gpu_level: log::LevelFilter::Warn,
            write_style: env_logger::WriteStyle::Auto,
        }
    }
}

impl LoggingConfig {
    /// Per-frame decisions (skips, resizes, uploads) at trace.
    pub fn verbose() -> Self {
        Self {
            level: log::LevelFilter::Trace,
            ..Self::default()
        }
    }
}

fn builder_for(config: LoggingConfig, env: Option<String>) -> env_logger::Builder {
    let mut builder = env_logger::Builder::new();

    match config.env_filter.or(env) {
        Some(filter) => {
            builder.parse_filters(&filter);
        }
        None => {
            builder.filter_level(config.level);
            for module in GPU_MODULES {
                builder.filter_module(module, config.gpu_level.min(config.level));
            }
        }
    }

    builder.write_style(config.write_style);
    builder
}

static INIT: Once = Once::new();

/// Initializes the global logger once.
///
/// Later calls are ignored. Call before the GPU comes up so adapter
/// selection and the float-table check show in the log.
pub fn init_logging(config: LoggingConfig) {
    INIT.call_once(|| {
        let env = std::env::var("RUST_LOG").ok();
        // `try_init`: a test harness may already own the global logger.
        if builder_for(config, env).try_init().is_ok() {
            log::debug!("logging initialized");
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn enabled(logger: &env_logger::Logger, level: log::Level, target: &str) -> bool {
        logger.matches(&log::Record::builder().level(level).target(target).build())
    }

    #[test]
    fn default_quiets_gpu_stack() {
        let logger = builder_for(LoggingConfig::default(), None).build();
        assert!(enabled(&logger, log::Level::Info, "tessera_engine::render"));
        assert!(!enabled(&logger, log::Level::Debug, "tessera_engine::render"));
        assert!(!enabled(&logger, log::Level::Info, "wgpu_core::device"));
        assert!(enabled(&logger, log::Level::Warn, "naga::valid"));
    }

    #[test]
    fn verbose_reaches_trace() {
        let logger = builder_for(LoggingConfig::verbose(), None).build();
        assert!(enabled(&logger, log::Level::Trace, "tessera_engine::frame"));
        assert!(!enabled(&logger, log::Level::Info, "wgpu_hal::vulkan"));
    }

    #[test]
    fn explicit_filter_beats_environment() {
        let config = LoggingConfig {
            env_filter: Some("error".to_string()),
            ..LoggingConfig::default()
        };
        let logger = builder_for(config, Some("trace".to_string())).build();
        assert!(!enabled(&logger, log::Level::Warn, "tessera_engine"));

        let logger = builder_for(LoggingConfig::default(), Some("debug".to_string())).build();
        assert!(enabled(&logger, log::Level::Debug, "tessera_engine"));
    }
}
