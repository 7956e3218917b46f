use std::io;

use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::Layer;

pub(crate) const LOG_ENV: &str = "BLOBSURF_LOG";

/// Level from `--log-level`, then `BLOBSURF_LOG`, else INFO.
pub(crate) fn resolve_level(cli: Option<&str>) -> Result<LevelFilter, String> {
    let env = std::env::var(LOG_ENV).ok();
    match cli.or(env.as_deref()) {
        Some(value) => value
            .trim()
            .parse::<LevelFilter>()
            .map_err(|_| format!("unknown log level {value:?}")),
        None => Ok(LevelFilter::INFO),
    }
}

pub(crate) fn setup_tracing(level: LevelFilter) {
    let filter_layer = tracing_subscriber::filter::filter_fn(move |metadata| {
        let is_blobsurf = metadata.target().starts_with("blobsurf");
        let effective = if is_blobsurf {
            level
        } else {
            level.min(LevelFilter::WARN)
        };
        effective >= *metadata.level()
    });
    // stdout is reserved for --print output.
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_ansi(false)
        .with_writer(io::stderr);

    tracing_subscriber::registry()
        .with(fmt_layer.with_filter(filter_layer))
        .init();
}
