//! FSM graph editor project tool.
//!
//! Provides the `fsmgraph` binary for working with `*.fsm.json` project
//! files outside the editor: create a project, inspect a saved one, re-save
//! one into canonical form, and list the durable node fields.
//!
//! Uses the same `ProjectSession` save/load pipeline as the editor, so files
//! written here are byte-for-byte what the editor would write.

use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand};
use serde_json::json;
use thiserror::Error;

use fsmgraph_core::fields::{NODE_FIELDS, NODE_FIELDS_VERSION};
use fsmgraph_core::{AppFile, CoreError};
use fsmgraph_storage::{
    AssumeYes, DirectorySink, FileSource, GraphStore, InMemoryGraphStore, LoadOutcome,
    LoadSummary, ProjectSession, SaveSummary, StorageError, TracingNotifier,
};

/// FSM graph editor project tool.
#[derive(Parser)]
#[command(name = "fsmgraph", about = "FSM graph editor project tool", version)]
struct Cli {
    /// Log filter used when RUST_LOG is not set.
    #[arg(long, env = "FSMGRAPH_LOG", default_value = "info", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Create a project with empty graphs and save it.
    New {
        /// Client file to create (repeatable).
        #[arg(long = "client", value_name = "NAME")]
        clients: Vec<String>,

        /// Server file to create (repeatable).
        #[arg(long = "server", value_name = "NAME")]
        servers: Vec<String>,

        /// Directory the project file is written to.
        #[arg(short, long, env = "FSMGRAPH_OUT_DIR", default_value = ".")]
        out_dir: PathBuf,
    },

    /// Load and validate a project file and print a JSON summary.
    Inspect {
        /// Path to the project file.
        file: PathBuf,
    },

    /// Load a project file and save it again in canonical form.
    Resave {
        /// Path to the project file.
        file: PathBuf,

        /// Directory the new project file is written to.
        #[arg(short, long, env = "FSMGRAPH_OUT_DIR", default_value = ".")]
        out_dir: PathBuf,
    },

    /// Print the durable node fields.
    Fields,
}

fn main() {
    let cli = Cli::parse();
    init_logging(&cli.log_level);

    let result = match cli.command {
        Commands::New {
            clients,
            servers,
            out_dir,
        } => run_new(&clients, &servers, &out_dir),
        Commands::Inspect { file } => run_inspect(&file),
        Commands::Resave { file, out_dir } => run_resave(&file, &out_dir),
        Commands::Fields => Ok(fields_json()),
    };

    match result {
        Ok(output) => {
            // Print as JSON to stdout for machine-readable output
            let text = serde_json::to_string_pretty(&output).unwrap_or_else(|e| {
                format!("{{\"error\": \"failed to serialize output: {}\"}}", e)
            });
            println!("{}", text);
        }
        Err(err) => {
            eprintln!("Error: {}", err);
            process::exit(err.exit_code());
        }
    }
}

/// Initializes the tracing subscriber on stderr.
fn init_logging(default_filter: &str) {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// A failed command.
#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    /// The user declined to continue.
    #[error("aborted")]
    Aborted,
}

impl CliError {
    /// Exit code: 1 = general error, 2 = invalid project structure,
    /// 3 = I/O error, 4 = malformed project file.
    fn exit_code(&self) -> i32 {
        match self {
            CliError::Storage(StorageError::Validation(_)) => 2,
            CliError::Storage(StorageError::Io { .. } | StorageError::Emit { .. }) => 3,
            CliError::Storage(StorageError::Parse(_) | StorageError::Encoding { .. }) => 4,
            _ => 1,
        }
    }
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

fn session(out_dir: &Path) -> ProjectSession<InMemoryGraphStore> {
    ProjectSession::new(
        InMemoryGraphStore::new(),
        DirectorySink::new(out_dir),
        AssumeYes,
        TracingNotifier,
    )
}

fn run_new(clients: &[String], servers: &[String], out_dir: &Path) -> Result<serde_json::Value, CliError> {
    tracing::debug!(clients = clients.len(), servers = servers.len(), "creating project");
    let mut session = session(out_dir);
    for name in clients {
        session.add_file(AppFile::client(name.as_str()))?;
    }
    for name in servers {
        session.add_file(AppFile::server(name.as_str()))?;
    }
    let summary = session.save()?;
    Ok(save_json(&summary, out_dir))
}

fn run_inspect(file: &Path) -> Result<serde_json::Value, CliError> {
    // Nothing is written, so the sink directory is never touched.
    let mut session = session(Path::new("."));
    let summary = load(&mut session, file)?;

    let project = session.store().project();
    let files: Vec<serde_json::Value> = project
        .files()
        .iter()
        .map(|f| {
            let nodes = project.graph(&f.key()).map_or(0, |g| g.len());
            json!({"name": f.name, "type": f.file_type, "nodes": nodes})
        })
        .collect();

    Ok(json!({
        "source": summary.source,
        "savedAt": summary.saved_at,
        "appVersion": summary.app_version,
        "files": files,
        "nodes": summary.nodes,
        "droppedFields": summary.dropped_fields,
        "synthesizedGraphs": summary
            .synthesized_graphs
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>(),
        "digest": summary.digest.to_hex().to_string(),
    }))
}

fn run_resave(file: &Path, out_dir: &Path) -> Result<serde_json::Value, CliError> {
    let mut session = session(out_dir);
    load(&mut session, file)?;
    let summary = session.save()?;
    Ok(save_json(&summary, out_dir))
}

fn load(
    session: &mut ProjectSession<InMemoryGraphStore>,
    file: &Path,
) -> Result<LoadSummary, CliError> {
    match session.load(&mut FileSource::new(file))? {
        LoadOutcome::Committed(summary) => Ok(summary),
        LoadOutcome::Aborted { .. } => Err(CliError::Aborted),
    }
}

fn save_json(summary: &SaveSummary, out_dir: &Path) -> serde_json::Value {
    json!({
        "path": out_dir.join(&summary.filename).display().to_string(),
        "savedAt": summary.saved_at,
        "bytes": summary.bytes,
        "digest": summary.digest.to_hex().to_string(),
        "warnings": summary
            .warnings
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>(),
    })
}

fn fields_json() -> serde_json::Value {
    json!({
        "version": NODE_FIELDS_VERSION,
        "fields": NODE_FIELDS,
    })
}
