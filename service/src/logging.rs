use crate::config::{Config, RustEnv};
use log::{LevelFilter, SetLoggerError};
use simplelog::{self, ConfigBuilder};

/// Modules to filter out from logging when not in Trace mode.
/// The HTTP and WebSocket stacks log every frame at debug level.
const FILTERED_MODULES: &[&str] = &[
    "tower",
    "tower_http",
    "tracing",
    "hyper",
    "axum",
    "tungstenite",
    "tokio_tungstenite",
];

pub struct Logger {}

impl Logger {
    /// Initializes the global terminal logger from the provided Config.
    ///
    /// Dependency logs only show up at Trace level. Fails if a global logger
    /// was already installed.
    pub fn init_logger(config: &Config) -> Result<(), SetLoggerError> {
        let apply_filters = Self::should_filter_dependencies(config.log_level_filter);
        let log_config = Self::build_log_config(apply_filters, &config.runtime_env);

        simplelog::TermLogger::init(
            config.log_level_filter,
            log_config,
            simplelog::TerminalMode::Mixed,
            Self::color_choice(&config.runtime_env),
        )
    }

    fn should_filter_dependencies(level: LevelFilter) -> bool {
        level != LevelFilter::Trace
    }

    /// Production logs usually end up in a collector, so no ANSI colors there.
    fn color_choice(runtime_env: &RustEnv) -> simplelog::ColorChoice {
        match runtime_env {
            RustEnv::Production => simplelog::ColorChoice::Never,
            RustEnv::Development | RustEnv::Staging => simplelog::ColorChoice::Auto,
        }
    }

    fn build_log_config(apply_filters: bool, runtime_env: &RustEnv) -> simplelog::Config {
        let mut builder = ConfigBuilder::new();
        builder.set_time_format_rfc3339();

        // Module paths help when following a connection through hub and web.
        if *runtime_env == RustEnv::Development {
            builder.set_target_level(LevelFilter::Error);
        }

        if apply_filters {
            for module in FILTERED_MODULES {
                builder.add_filter_ignore_str(module);
            }
        }

        builder.build()
    }
}
