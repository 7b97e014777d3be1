use crate::config::{Config, RustEnv};
use log::LevelFilter;
use simplelog::{self, ColorChoice, ConfigBuilder, TermLogger, TerminalMode};

/// Dependencies whose logs are suppressed below Trace. Provider HTTP traffic in
/// particular is logged by the gateways themselves with secrets redacted.
const FILTERED_MODULES: &[&str] = &[
    "sqlx", "sea_orm", "tower", "tracing", "hyper", "axum", "reqwest", "rustls",
];

/// Settings derived from `Config` that decide how the terminal logger behaves.
#[derive(Debug)]
struct LogSettings {
    level: simplelog::LevelFilter,
    filter_dependencies: bool,
    color: ColorChoice,
}

impl LogSettings {
    fn from_config(config: &Config) -> Self {
        Self {
            level: Logger::convert_level_filter(config.log_level_filter),
            filter_dependencies: config.log_level_filter != LevelFilter::Trace,
            // No ANSI colors outside development
            color: match config.runtime_env {
                RustEnv::Development => ColorChoice::Auto,
                RustEnv::Staging | RustEnv::Production => ColorChoice::Never,
            },
        }
    }
}

pub struct Logger {}

impl Logger {
    /// Initializes the global logger with configuration based on the provided Config.
    ///
    /// When the log level is set to Trace, all logs including dependency logs are shown.
    /// For all other log levels, verbose dependency logs are filtered out.
    pub fn init_logger(config: &Config) {
        let settings = LogSettings::from_config(config);
        let log_config = Self::build_log_config(settings.filter_dependencies);

        TermLogger::init(
            settings.level,
            log_config,
            TerminalMode::Mixed,
            settings.color,
        )
        .expect("Failed to start simplelog");
    }

    /// Converts log::LevelFilter to simplelog::LevelFilter.
    fn convert_level_filter(level: LevelFilter) -> simplelog::LevelFilter {
        match level {
            LevelFilter::Off => simplelog::LevelFilter::Off,
            LevelFilter::Error => simplelog::LevelFilter::Error,
            LevelFilter::Warn => simplelog::LevelFilter::Warn,
            LevelFilter::Info => simplelog::LevelFilter::Info,
            LevelFilter::Debug => simplelog::LevelFilter::Debug,
            LevelFilter::Trace => simplelog::LevelFilter::Trace,
        }
    }

    fn build_log_config(filter_dependencies: bool) -> simplelog::Config {
        let mut builder = ConfigBuilder::new();
        builder.set_time_format_rfc3339();

        if filter_dependencies {
            for module in FILTERED_MODULES {
                builder.add_filter_ignore_str(module);
            }
        }

        builder.build()
    }
}
