//! Logging sink.
//!
//! One process-wide subscriber, installed on the first call. With the logger
//! enabled events go to stdout; disabled, they are appended to `verdict.log`
//! in the working directory. Each line reads
//! `dd-mm-YYYY HH:MM:SS | verdict | <target>::<span> | message`.

use std::fmt;
use std::sync::OnceLock;

use tracing::{Event, Subscriber};
use tracing_subscriber::fmt::format::{DefaultFields, Writer};
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields, MakeWriter};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Environment variable holding an `EnvFilter` directive.
pub const LOG_ENV: &str = "VERDICT_LOG";

/// File written when the logger is disabled.
pub const LOG_FILE: &str = "verdict.log";

/// Library internals (hyper, rustls, reqwest) stay at `warn`.
const DEFAULT_FILTER: &str =
    "warn,verdict_domain=debug,verdict_application=debug,verdict_infrastructure=debug";

static SINK: OnceLock<LogSink> = OnceLock::new();

/// Where log lines end up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogSink {
    /// Standard output.
    Stdout,
    /// Appended to [`LOG_FILE`].
    File,
    /// Another global subscriber was already installed.
    External,
}

/// Installs the subscriber once and reports the sink in use.
///
/// Later calls return the first sink regardless of `enabled`.
pub fn init_logger(enabled: bool) -> LogSink {
    *SINK.get_or_init(|| install(enabled))
}

fn install(enabled: bool) -> LogSink {
    let filter =
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let installed = if enabled {
        tracing_subscriber::registry()
            .with(filter)
            .with(line_layer(std::io::stdout))
            .try_init()
            .map(|()| LogSink::Stdout)
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(line_layer(tracing_appender::rolling::never(".", LOG_FILE)))
            .try_init()
            .map(|()| LogSink::File)
    };

    installed.unwrap_or(LogSink::External)
}

/// Plain-text [`LineFormat`] layer over `writer`. No ANSI escapes on any sink.
fn line_layer<S, W>(writer: W) -> tracing_subscriber::fmt::Layer<S, DefaultFields, LineFormat, W>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    W: for<'w> MakeWriter<'w> + 'static,
{
    tracing_subscriber::fmt::layer()
        .event_format(LineFormat)
        .with_ansi(false)
        .with_writer(writer)
}

/// `timestamp | verdict | target::span | message`
#[derive(Debug, Clone, Copy, Default)]
pub struct LineFormat;

impl<S, N> FormatEvent<S, N> for LineFormat
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let now = chrono::Local::now();
        write!(
            writer,
            "{} | verdict | {}",
            now.format("%d-%m-%Y %H:%M:%S"),
            event.metadata().target()
        )?;

        if let Some(scope) = ctx.event_scope() {
            for span in scope.from_root() {
                write!(writer, "::{}", span.name())?;
            }
        }

        write!(writer, " | ")?;
        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}
