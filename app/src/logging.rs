use crate::EnvPaths;
use time::format_description::well_known::Rfc3339;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{
    fmt::{self, time::OffsetTime},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

const LOG_FILE_PREFIX: &str = "docsign";

/// Install console and daily-rolling file logging.
///
/// The filter comes from `RUST_LOG` and defaults to `info`. Keep the returned
/// guard alive for as long as file output is wanted.
pub fn init_logging(env_paths: &EnvPaths) -> Result<WorkerGuard, Box<dyn std::error::Error>> {
    let logs_dir = env_paths.logs_path();
    std::fs::create_dir_all(&logs_dir)?;

    let file_appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(LOG_FILE_PREFIX)
        .filename_suffix("log")
        .build(&logs_dir)?;
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    let timer = local_timer();

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(file_writer)
                .with_timer(timer.clone())
                .with_ansi(false)
                .with_target(true)
                .with_thread_ids(true)
                .with_file(true)
                .with_line_number(true),
        )
        .with(fmt::layer().with_timer(timer).with_target(false))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .try_init()?;

    tracing::info!("Logging to {:?}", logs_dir);
    Ok(guard)
}

/// Local RFC 3339 timestamps, or UTC where the local offset is unavailable.
fn local_timer() -> OffsetTime<Rfc3339> {
    OffsetTime::local_rfc_3339().unwrap_or_else(|_| OffsetTime::new(time::UtcOffset::UTC, Rfc3339))
}

pub fn log_shutdown() {
    tracing::info!("=== DocSign shutdown complete ===");
}
