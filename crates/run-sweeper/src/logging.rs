//! Tracing setup.
//!
//! Inside a GitHub Actions job, events are rendered as workflow commands so
//! errors and warnings show up as annotations and debug output follows the
//! runner's step-debug switch. Elsewhere a plain fmt layer is used.

use std::fmt;

use tracing::{Event, Level, Subscriber};
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};
use tracing_subscriber::EnvFilter;

use crate::actions;

/// Install the global subscriber. `RUST_LOG` overrides the default filter.
pub fn init(debug: bool) -> Result<(), TryInitError> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter(debug)));

    let in_actions = actions::in_actions();
    let workflow_layer = in_actions.then(|| {
        tracing_subscriber::fmt::layer()
            .event_format(WorkflowCommands)
            .with_writer(std::io::stdout)
    });
    let plain_layer = (!in_actions).then(|| tracing_subscriber::fmt::layer().with_target(false));

    tracing_subscriber::registry()
        .with(filter)
        .with(workflow_layer)
        .with(plain_layer)
        .try_init()
}

fn default_filter(debug: bool) -> String {
    let level = if debug { "debug" } else { "info" };
    format!("info,run_sweeper={level},github_client={level}")
}

/// Renders events as GitHub Actions workflow commands.
#[derive(Debug, Clone, Copy, Default)]
pub struct WorkflowCommands;

impl<S, N> FormatEvent<S, N> for WorkflowCommands
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
        let mut fields = String::new();
        ctx.format_fields(Writer::new(&mut fields), event)?;

        match command_for(*event.metadata().level()) {
            Some(command) => writeln!(writer, "::{command}::{}", actions::escape_data(&fields)),
            None => writeln!(writer, "{fields}"),
        }
    }
}

fn command_for(level: Level) -> Option<&'static str> {
    if level == Level::ERROR {
        Some("error")
    } else if level == Level::WARN {
        Some("warning")
    } else if level == Level::INFO {
        None
    } else {
        Some("debug")
    }
}
