//! blocklab command-line client.
//!
//! Provides the `blocklab` binary for working with projects stored on a
//! running blocklab server and for running generated code locally through the
//! same sandboxes the server uses.
//!
//! Exit codes: 0 = success, 1 = the program raised an error, 2 = gateway or
//! store error, 3 = I/O error, 4 = nothing to run.

use std::path::{Path, PathBuf};
use std::process;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use blocklab_sandbox::{ExecutionResult, SandboxConfig, SandboxSet};
use blocklab_session::{
    GatewayError, HttpGateway, ProjectGateway, RunOutcome, Session, SessionError,
};
use blocklab_storage::{Language, NewProject, Project, ProjectId};

const EXIT_OK: i32 = 0;
const EXIT_PROGRAM_ERROR: i32 = 1;
const EXIT_GATEWAY: i32 = 2;
const EXIT_IO: i32 = 3;
const EXIT_NOTHING_TO_RUN: i32 = 4;

/// Block editor project tools.
#[derive(Debug, Parser)]
#[command(name = "blocklab", about = "Block editor project tools")]
struct Cli {
    /// Base URL of the blocklab server.
    #[arg(
        long,
        global = true,
        env = "BLOCKLAB_SERVER",
        default_value = "http://localhost:3000"
    )]
    server: String,

    /// Execution budget per run, in milliseconds.
    #[arg(long, global = true, env = "BLOCKLAB_EXEC_TIMEOUT_MS", default_value_t = 10_000)]
    timeout_ms: u64,

    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
enum Commands {
    /// List stored projects, newest first.
    List,

    /// Print one project as JSON.
    Show {
        /// Project ID.
        id: ProjectId,
    },

    /// Delete a project.
    Delete {
        /// Project ID.
        id: ProjectId,
    },

    /// Save a diagram (and optionally its generated code) as a new project.
    Save {
        /// Project name.
        #[arg(short, long)]
        name: String,

        /// Target language: javascript or python.
        #[arg(short, long)]
        language: Language,

        /// File holding the serialized diagram.
        #[arg(short, long)]
        diagram: PathBuf,

        /// File holding the generated source.
        #[arg(short, long)]
        code: Option<PathBuf>,
    },

    /// Load a stored project and run its generated code locally.
    Run {
        /// Project ID.
        id: ProjectId,
    },

    /// Run a source file through the sandbox.
    Exec {
        /// Source language: javascript or python.
        #[arg(short, long)]
        language: Language,

        /// Source file.
        file: PathBuf,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();
    let gateway = HttpGateway::new(&cli.server);
    let sandboxes = SandboxSet::from_config(
        SandboxConfig::default().with_timeout(Duration::from_millis(cli.timeout_ms)),
    );

    let exit_code = match cli.command {
        Commands::List => run_list(&gateway).await,
        Commands::Show { id } => run_show(&gateway, id).await,
        Commands::Delete { id } => run_delete(&gateway, id).await,
        Commands::Save {
            name,
            language,
            diagram,
            code,
        } => run_save(&gateway, name, language, &diagram, code.as_deref()).await,
        Commands::Run { id } => run_project(gateway, sandboxes, id).await,
        Commands::Exec { language, file } => run_exec(&sandboxes, language, &file).await,
    };
    process::exit(exit_code);
}

/// Execute the list subcommand.
async fn run_list(gateway: &dyn ProjectGateway) -> i32 {
    match gateway.list_projects().await {
        Ok(projects) => {
            if projects.is_empty() {
                eprintln!("No projects saved yet");
            }
            for project in &projects {
                println!("{}", summary_line(project));
            }
            EXIT_OK
        }
        Err(e) => gateway_failure("failed to list projects", &e),
    }
}

async fn run_show(gateway: &dyn ProjectGateway, id: ProjectId) -> i32 {
    match gateway.get_project(id).await {
        Ok(project) => {
            let json = serde_json::to_string_pretty(&project).unwrap_or_else(|e| {
                format!("{{\"error\": \"failed to serialize project: {}\"}}", e)
            });
            println!("{}", json);
            EXIT_OK
        }
        Err(e) => gateway_failure(&format!("failed to fetch project {}", id), &e),
    }
}

async fn run_delete(gateway: &dyn ProjectGateway, id: ProjectId) -> i32 {
    match gateway.delete_project(id).await {
        Ok(()) => {
            eprintln!("Deleted {}", id);
            EXIT_OK
        }
        Err(e) => gateway_failure(&format!("failed to delete project {}", id), &e),
    }
}

async fn run_save(
    gateway: &dyn ProjectGateway,
    name: String,
    language: Language,
    diagram_path: &Path,
    code_path: Option<&Path>,
) -> i32 {
    let diagram = match read_file(diagram_path).await {
        Ok(text) => text,
        Err(code) => return code,
    };
    let code = match code_path {
        Some(path) => match read_file(path).await {
            Ok(text) => text,
            Err(code) => return code,
        },
        None => String::new(),
    };

    match gateway
        .create_project(NewProject::new(name, language, diagram, code))
        .await
    {
        Ok(project) => {
            println!("{}", project.id);
            EXIT_OK
        }
        Err(e) => gateway_failure("failed to save project", &e),
    }
}

/// Execute the run subcommand: load the project into a fresh session and
/// run it like the editor's Run button would.
async fn run_project(gateway: HttpGateway, sandboxes: SandboxSet, id: ProjectId) -> i32 {
    let session = Session::new(Arc::new(gateway), sandboxes);
    if let Err(e) = session.load_project_by_id(id).await {
        return match e {
            SessionError::Gateway(e) => {
                gateway_failure(&format!("failed to load project {}", id), &e)
            }
            other => {
                eprintln!("Error: {}", other);
                EXIT_GATEWAY
            }
        };
    }

    let outcome = session.run_code().await;
    for notification in session.take_notifications() {
        tracing::info!(title = %notification.title, "{}", notification.description);
    }
    match outcome {
        RunOutcome::Completed(result) => report_result(&result),
        RunOutcome::NothingToRun | RunOutcome::Ignored => {
            eprintln!("Nothing to run: project {} has no generated code", id);
            EXIT_NOTHING_TO_RUN
        }
    }
}

async fn run_exec(sandboxes: &SandboxSet, language: Language, path: &Path) -> i32 {
    let source = match read_file(path).await {
        Ok(text) => text,
        Err(code) => return code,
    };
    if source.trim().is_empty() {
        eprintln!("Nothing to run: {} is empty", path.display());
        return EXIT_NOTHING_TO_RUN;
    }
    let result = sandboxes.execute(language, &source).await;
    report_result(&result)
}

async fn read_file(path: &Path) -> Result<String, i32> {
    tokio::fs::read_to_string(path).await.map_err(|e| {
        eprintln!("I/O error: failed to read '{}': {}", path.display(), e);
        EXIT_IO
    })
}

fn gateway_failure(context: &str, err: &GatewayError) -> i32 {
    eprintln!("Error: {}: {}", context, err);
    EXIT_GATEWAY
}

/// Writes program output to stdout and the captured error to stderr.
fn report_result(result: &ExecutionResult) -> i32 {
    if !result.output.is_empty() {
        if result.output.ends_with('\n') {
            print!("{}", result.output);
        } else {
            println!("{}", result.output);
        }
    }
    if result.is_success() {
        EXIT_OK
    } else {
        eprintln!("{}", result.error);
        EXIT_PROGRAM_ERROR
    }
}

fn summary_line(project: &Project) -> String {
    format!(
        "{}  {:<10}  {}  {}",
        project.id,
        project.language.as_str(),
        project.created_at.format("%Y-%m-%d %H:%M:%S"),
        project.name
    )
}
