//! Process entry point for recordhub.
//!
//! # Responsibility
//! - Read configuration once and own the store/sink lifecycles.
//! - Run one invocation and print its JSON result.
//!
//! # Exit codes
//! - `0` success, `2` rejected request (validation/unknown operation),
//!   `1` store failure or startup error.

use clap::{Parser, Subcommand};
use log::{info, warn};
use recordhub_core::db::open_db_with_timeout;
use recordhub_core::{
    core_version, dispatch_invocation, init_logging, init_stderr_logging, ErrorKind, EventSink,
    EventSinks, Invocation, JsonlTopicSink, RecordService, ServiceConfig, ServiceError,
    SqliteQueueSink, SqliteRecordStore,
};
use std::error::Error;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

#[derive(Debug, Parser)]
#[command(name = "recordhub", version, about = "Record store with queue/topic fan-out")]
struct Cli {
    /// TOML config file. Falls back to RECORDHUB_* environment variables.
    #[arg(long, env = "RECORDHUB_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Invoke one operation by name with a JSON arguments object.
    Invoke {
        /// createRecord | listRecords | getRecord
        operation: String,
        #[arg(default_value = "{}")]
        arguments: String,
    },
    /// Invoke from a resolver event (`{info: {fieldName}, arguments}`).
    Event {
        /// Event JSON file; `-` reads stdin.
        #[arg(default_value = "-")]
        input: PathBuf,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("recordhub: {err}");
            ExitCode::from(1)
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode, Box<dyn Error>> {
    let config = match cli.config.as_ref() {
        Some(path) => ServiceConfig::from_toml_file(path)?,
        None => ServiceConfig::from_env()?,
    };
    start_logging(&config)?;
    info!(
        "event=cli_start module=cli status=ok version={}",
        core_version()
    );

    let invocation = match cli.command {
        Command::Invoke {
            operation,
            arguments,
        } => Invocation::from_arguments_text(operation, &arguments),
        Command::Event { input } => Ok(Invocation::from_event(&read_event(&input)?)),
    };
    let invocation = match invocation {
        Ok(invocation) => invocation,
        Err(err) => return report_error(&err),
    };

    let conn = open_db_with_timeout(&config.store_path, config.busy_timeout())?;
    let store = SqliteRecordStore::try_new(&conn)?;
    let service = RecordService::with_sinks(store, open_sinks(&config));

    match dispatch_invocation(&service, &invocation) {
        Ok(output) => {
            println!("{}", serde_json::to_string_pretty(&output.to_json()?)?);
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => report_error(&err),
    }
}

/// Prints the JSON error body on stdout and maps the kind to an exit code.
fn report_error(err: &ServiceError) -> Result<ExitCode, Box<dyn Error>> {
    println!("{}", serde_json::to_string_pretty(&err.to_response())?);
    Ok(ExitCode::from(exit_code(err.kind())))
}

fn exit_code(kind: ErrorKind) -> u8 {
    match kind {
        ErrorKind::ValidationError | ErrorKind::UnknownOperation => 2,
        _ => 1,
    }
}

fn start_logging(config: &ServiceConfig) -> Result<(), String> {
    match config.log_dir.as_ref() {
        Some(dir) => init_logging(&config.log_level, &dir.to_string_lossy()),
        None => init_stderr_logging(&config.log_level),
    }
}

/// Opens configured sinks. A sink that cannot be opened is left disabled.
fn open_sinks(config: &ServiceConfig) -> EventSinks {
    let mut sinks = EventSinks::none();

    if let Some(queue) = config.queue.as_ref() {
        match SqliteQueueSink::open(&queue.path, queue.queue_name.as_str(), config.busy_timeout()) {
            Ok(sink) => {
                info!(
                    "event=sink_open module=cli status=ok sink=queue queue={}",
                    sink.queue_name()
                );
                sinks = sinks.with_queue(Arc::new(sink) as Arc<dyn EventSink>);
            }
            Err(err) => warn!(
                "event=sink_open module=cli status=error sink=queue path={} error={}",
                queue.path.display(),
                err
            ),
        }
    }

    if let Some(topic) = config.topic.as_ref() {
        match JsonlTopicSink::open(&topic.path, topic.topic_name.as_str()) {
            Ok(sink) => {
                info!(
                    "event=sink_open module=cli status=ok sink=topic topic={} path={}",
                    sink.topic_name(),
                    sink.path().display()
                );
                sinks = sinks.with_topic(Arc::new(sink) as Arc<dyn EventSink>);
            }
            Err(err) => warn!(
                "event=sink_open module=cli status=error sink=topic path={} error={}",
                topic.path.display(),
                err
            ),
        }
    }

    if sinks.is_empty() {
        info!("event=sink_open module=cli status=skipped reason=no_sinks_configured");
    }
    sinks
}

fn read_event(input: &Path) -> Result<serde_json::Value, Box<dyn Error>> {
    let text = if input.as_os_str() == "-" {
        let mut buffer = String::new();
        std::io::stdin().read_to_string(&mut buffer)?;
        buffer
    } else {
        std::fs::read_to_string(input)?
    };
    Ok(serde_json::from_str(&text)?)
}
