use std::io::IsTerminal;

use tracing::Subscriber;
use tracing::subscriber::set_global_default;
use tracing_log::LogTracer;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::{EnvFilter, Registry, fmt, layer::SubscriberExt};

/// Log an error if it exists using the alternate selector, which emits the
/// error chain.
pub fn log_error(e: impl Into<anyhow::Error>) {
    let e: anyhow::Error = e.into();
    tracing::error!("{e:#}");
}

/// Subscriber for the command line: compact single-line events on stderr,
/// colored only when stderr is a terminal. `RUST_LOG` takes precedence
/// over `env_filter`.
pub fn get_subscriber(env_filter: String) -> impl Subscriber + Sync + Send {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(env_filter));
    let ansi = std::io::stderr().is_terminal();
    cli_subscriber(env_filter, std::io::stderr, ansi)
}

/// Compact events without targets, timestamps, or span open/close lines, so
/// request logs stay out of the way of the printed result.
pub fn cli_subscriber<W>(
    env_filter: EnvFilter,
    writer: W,
    ansi: bool,
) -> impl Subscriber + Sync + Send
where
    W: for<'a> MakeWriter<'a> + Send + Sync + 'static,
{
    let layer = fmt::Layer::new()
        .compact()
        .with_writer(writer)
        .with_ansi(ansi)
        .with_target(false)
        .without_time()
        .with_span_events(fmt::format::FmtSpan::NONE);
    Registry::default().with(env_filter).with(layer)
}

/// Register a subscriber as global default to process span data.
///
/// It should only be called once!
pub fn init_subscriber(
    subscriber: impl Subscriber + Sync + Send,
) -> anyhow::Result<()> {
    LogTracer::init()?;
    set_global_default(subscriber)?;
    Ok(())
}
