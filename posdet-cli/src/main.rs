use anyhow::{Context, Result};
use clap::{ArgGroup, Parser, Subcommand};
use clap_verbosity_flag::{InfoLevel, Verbosity};
use std::fs::File;
use std::path::{Path, PathBuf};
use std::process;
use tracing::{debug, error, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use posdet_lib::capture::CaptureLog;
use posdet_lib::{ConfigPresetKind, DetectorConfig, Message, NotificationKind, PositionKind};

/// Build, inspect and replay carried-position detector messages.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
    /// Optional path to a file to write logs to, in addition to the console.
    #[arg(short, long, global = true)]
    log_file: Option<PathBuf>,
    #[command(flatten)]
    verbose: Verbosity<InfoLevel>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Encode a message and print the frame as hex.
    Encode {
        #[command(subcommand)]
        message: EncodeMessage,
        /// Print message type and payload separately, for transports that
        /// carry the type out of band.
        #[arg(short, long, global = true)]
        split: bool,
    },
    /// Decode a hex frame.
    Decode {
        /// Frame bytes as hex. Whitespace is ignored.
        hex: String,
        /// Treat the input as a bare payload of this message type.
        #[arg(short = 't', long)]
        message_type: Option<u32>,
        /// Print the decoded message as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Load a detector tuning file and report documented constraints it breaks.
    CheckConfig {
        path: PathBuf,
    },
    /// Decode every frame in a JSON-lines capture log.
    Replay {
        path: PathBuf,
        /// Print the summary as JSON.
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand, Debug)]
enum EncodeMessage {
    /// Start the detector.
    Enable,
    /// Stop the detector.
    Disable,
    /// Ask for a position update.
    RequestUpdate,
    /// Ask for an immediate position update.
    ForceUpdate,
    /// Configure the detector from a preset or a tuning file.
    #[command(group(ArgGroup::new("source").required(true).args(["preset", "file"])))]
    Configure {
        /// default | sticky-stationary
        #[arg(long)]
        preset: Option<ConfigPresetKind>,
        /// JSON tuning file
        #[arg(long)]
        file: Option<PathBuf>,
    },
    /// Acknowledge a request (hub side).
    Ack {
        /// enable | disable | request-update | force-update | configure
        notification: NotificationKind,
    },
    /// Report a position (hub side).
    Position {
        /// in-motion | face-up-on-table | face-down-on-table | stationary-unknown
        position: PositionKind,
    },
}

fn setup_logging(log_file_path: Option<PathBuf>, verbosity: &Verbosity<InfoLevel>) -> Result<Option<WorkerGuard>> {
    // stdout carries command output
    let console_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .without_time();

    let (file_layer, guard) = if let Some(ref path) = log_file_path {
        let log_file = File::create(path).with_context(|| format!("Failed to create log file at: {:?}", path))?;
        let (non_blocking_writer, guard) = tracing_appender::non_blocking(log_file);
        let layer = tracing_subscriber::fmt::layer()
            .with_writer(non_blocking_writer)
            .with_ansi(false)
            .with_target(false);
        (Some(layer), Some(guard))
    } else {
        (None, None)
    };

    let filter = EnvFilter::builder()
        .with_default_directive(verbosity.tracing_level_filter().into())
        .from_env_lossy();

    tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .with(file_layer)
        .init();

    if let Some(path) = log_file_path {
        info!("Logging to file: {:?}", path);
    }

    Ok(guard)
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let _guard = setup_logging(cli.log_file, &cli.verbose)?;

    if let Err(e) = run(cli.command) {
        error!("{:#}", e);
        process::exit(1);
    }

    Ok(())
}

fn run(command: Command) -> Result<()> {
    match command {
        Command::Encode { message, split } => encode(message, split),
        Command::Decode {
            hex,
            message_type,
            json,
        } => decode(&hex, message_type, json),
        Command::CheckConfig { path } => check_config(&path),
        Command::Replay { path, json } => replay(&path, json),
    }
}

fn encode(request: EncodeMessage, split: bool) -> Result<()> {
    let message = match request {
        EncodeMessage::Enable => Message::EnableDetector,
        EncodeMessage::Disable => Message::DisableDetector,
        EncodeMessage::RequestUpdate => Message::RequestUpdate,
        EncodeMessage::ForceUpdate => Message::ForceUpdate,
        EncodeMessage::Configure { preset, file } => {
            let config = match file {
                Some(path) => DetectorConfig::from_json_file(&path)
                    .with_context(|| format!("Failed to load tuning file {:?}", path))?,
                None => DetectorConfig::from_parts(preset, None)?,
            };
            warn_violations(&config);
            Message::ConfigureDetector(config)
        }
        EncodeMessage::Ack { notification } => Message::AckNotification(notification),
        EncodeMessage::Position { position } => Message::PositionDetected(position),
    };
    debug!(%message, "Encoding");

    if split {
        let raw = message.to_raw();
        println!("message_type: {}", raw.message_type);
        match raw.payload {
            Some(payload) => println!("payload: {}", hex::encode(payload)),
            None => println!("payload: (none)"),
        }
    } else {
        println!("{}", hex::encode(message.encode()));
    }
    Ok(())
}

fn decode(text: &str, message_type: Option<u32>, json: bool) -> Result<()> {
    let message = match message_type {
        Some(message_type) => {
            let compact: String = text.chars().filter(|c| !c.is_whitespace()).collect();
            let payload = hex::decode(compact).context("Payload is not valid hex")?;
            Message::decode_parts(message_type, &payload)
        }
        None => Message::decode_hex(text),
    }
    .context("Failed to decode message")?;

    if let Message::ConfigureDetector(config) = &message {
        warn_violations(config);
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&message)?);
    } else {
        println!("{message}");
    }
    Ok(())
}

fn check_config(path: &Path) -> Result<()> {
    let config =
        DetectorConfig::from_json_file(path).with_context(|| format!("Failed to load tuning file {:?}", path))?;
    println!("{config}");

    let violations = config.advisory_violations();
    if violations.is_empty() {
        println!("OK: within all documented constraints");
    } else {
        // Advisory only; the hub accepts these values
        for violation in &violations {
            println!("warning: {violation}");
        }
    }
    Ok(())
}

fn replay(path: &Path, json: bool) -> Result<()> {
    let log = CaptureLog::read_jsonl(path).with_context(|| format!("Failed to read capture log {:?}", path))?;
    info!(records = log.len(), "Replaying capture log");

    for (record, result) in log.records().iter().zip(log.decode_all()) {
        match result {
            Ok(message) => println!("{} {}", record.timestamp.to_rfc3339(), message),
            Err(e) => println!(
                "{} [{}] <undecodable: {}> {}",
                record.timestamp.to_rfc3339(),
                record.direction,
                e,
                record.hex_string()
            ),
        }
    }

    let summary = log.summarize();
    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!("--------------------------------------------------------------------------------");
        for (kind, count) in &summary.per_kind {
            println!("{kind:>20}: {count}");
        }
        println!("{:>20}: {}", "undecodable", summary.failures);
    }
    Ok(())
}

fn warn_violations(config: &DetectorConfig) {
    for violation in config.advisory_violations() {
        warn!(%violation, "Detector config outside documented range");
    }
}
