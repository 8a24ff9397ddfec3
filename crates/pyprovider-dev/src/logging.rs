use std::fmt;
use std::str::FromStr;

use anstream::ColorChoice;
use anyhow::Context;
use owo_colors::OwoColorize;
use tracing::{Event, Subscriber};
use tracing_subscriber::filter::Directive;
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

use crate::env_vars::EnvVars;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Level {
    /// Show info messages by default (overridable by `RUST_LOG`).
    #[default]
    Default,
    /// Show debug messages by default (overridable by `RUST_LOG`).
    Verbose,
}

impl Level {
    fn default_directive(self) -> &'static str {
        match self {
            Self::Default => "pyprovider=info",
            Self::Verbose => "pyprovider=debug",
        }
    }
}

/// A compact format: the colored level, the target when verbose, then the message.
struct PyproviderFormat {
    display_target: bool,
}

/// See <https://docs.rs/tracing-subscriber/0.3.18/src/tracing_subscriber/fmt/format/mod.rs.html#1026-1156>
impl<S, N> FormatEvent<S, N> for PyproviderFormat
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
        let meta = event.metadata();
        let ansi = writer.has_ansi_escapes();

        let level = meta.level();
        // Same colors as tracing
        if ansi {
            match *level {
                tracing::Level::TRACE => write!(writer, "{} ", level.purple())?,
                tracing::Level::DEBUG => write!(writer, "{} ", level.blue())?,
                tracing::Level::INFO => write!(writer, "{} ", level.green())?,
                tracing::Level::WARN => write!(writer, "{} ", level.yellow())?,
                tracing::Level::ERROR => write!(writer, "{} ", level.red())?,
            }
        } else {
            write!(writer, "{level} ")?;
        }

        if self.display_target {
            if ansi {
                write!(writer, "{} ", meta.target().dimmed())?;
            } else {
                write!(writer, "{} ", meta.target())?;
            }
        }

        ctx.field_format().format_fields(writer.by_ref(), event)?;

        writeln!(writer)
    }
}

/// Configure `tracing` based on the given [`Level`], taking into account the `RUST_LOG`
/// environment variable.
///
/// Logs always go to stderr, so the output of a command can be piped.
pub(crate) fn setup_logging(level: Level) -> anyhow::Result<()> {
    let default_directive = Directive::from_str(level.default_directive())
        .context("Invalid default log directive")?;
    let filter = EnvFilter::builder()
        .with_env_var(EnvVars::RUST_LOG)
        .with_default_directive(default_directive)
        .from_env()
        .context("Invalid RUST_LOG directives")?;

    let ansi = match anstream::Stderr::choice(&std::io::stderr()) {
        ColorChoice::Always | ColorChoice::AlwaysAnsi => true,
        ColorChoice::Never | ColorChoice::Auto => false,
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .event_format(PyproviderFormat {
                    display_target: level == Level::Verbose,
                })
                .with_writer(std::io::stderr)
                .with_ansi(ansi)
                .with_filter(filter),
        )
        .init();

    Ok(())
}
