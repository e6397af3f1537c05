use std::path::PathBuf;
use std::process::exit;

use clap::{Parser, Subcommand};
use log::error;
use pipeline_core::{Environment, FlowTerminalState};
use pipeline_infra::{should_provision_pipeline_resources_named, ExecutionStatus};
use pipeline_persistence::StoreBackend;
use retraining_pipeline::logging::init_logging;
use retraining_pipeline::{run_delivery_pipeline, run_workflow, AppConfig, AppError};

#[derive(Parser, Debug)]
#[command(name = "retraining-pipeline")]
#[command(about = "Champion/challenger model retraining pipeline", long_about = None)]
struct Args {
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Pisa PIPELINE_PROJECT.
    #[arg(long, global = true)]
    project: Option<String>,

    /// Pisa PIPELINE_STORE_BACKEND (memory | fs).
    #[arg(long, global = true)]
    store: Option<StoreBackend>,

    /// Pisa PIPELINE_ARTIFACT_ROOT.
    #[arg(long, global = true)]
    artifact_root: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Corre una ejecución del workflow de entrenamiento.
    Workflow {
        /// Entorno destino; por defecto, el de la cuenta configurada.
        #[arg(long)]
        environment: Option<Environment>,
    },
    /// Corre una ejecución del pipeline de entrega para un commit.
    Pipeline {
        #[arg(long)]
        commit: String,
        /// Por defecto, PIPELINE_BRANCH.
        #[arg(long)]
        branch: Option<String>,
        /// Por defecto, PIPELINE_REPO.
        #[arg(long)]
        repository: Option<String>,
    },
    /// Imprime si el entorno aprovisiona recursos de pipeline.
    Gate { environment: String },
}

fn load_config(args: &Args) -> Result<AppConfig, AppError> {
    let mut cfg = AppConfig::from_env()?;
    if let Some(project) = &args.project {
        cfg.project = project.clone();
    }
    if let Some(backend) = args.store {
        cfg.store.backend = backend;
    }
    if let Some(root) = &args.artifact_root {
        cfg.store.root = root.clone();
    }
    Ok(cfg)
}

async fn run(args: Args) -> Result<i32, AppError> {
    match &args.command {
        Command::Gate { environment } => {
            println!("{}", should_provision_pipeline_resources_named(environment));
            Ok(0)
        }
        Command::Workflow { environment } => {
            let cfg = load_config(&args)?;
            let env = match environment {
                Some(env) => *env,
                None => cfg.environment()?,
            };
            let outcome = run_workflow(&cfg, env).await;
            match &outcome.state {
                FlowTerminalState::Done { fingerprint } => {
                    println!("workflow {} done (fingerprint {fingerprint})", outcome.flow_id);
                    if let Some(report) = &outcome.evaluation {
                        println!("{}", serde_json::to_string_pretty(&report.result).map_err(|e| AppError::Internal(e.to_string()))?);
                    }
                    Ok(0)
                }
                FlowTerminalState::Failed { step_id, error } => {
                    eprintln!("workflow {} failed at '{step_id}': {error}", outcome.flow_id);
                    Ok(2)
                }
                FlowTerminalState::Running { next_step } => {
                    eprintln!("workflow {} stopped before {next_step:?}", outcome.flow_id);
                    Ok(2)
                }
            }
        }
        Command::Pipeline { commit,
                            branch,
                            repository, } => {
            let cfg = load_config(&args)?;
            let env = cfg.environment()?;
            let event = cfg.commit_event(commit, branch.as_deref(), repository.as_deref());
            match run_delivery_pipeline(&cfg, env, &event).await? {
                None => {
                    println!("commit {commit} ignored: pipeline listens on {}/{}", cfg.repository, cfg.branch);
                    Ok(0)
                }
                Some(execution) => {
                    println!("{}", serde_json::to_string_pretty(&execution).map_err(|e| AppError::Internal(e.to_string()))?);
                    Ok(match execution.status {
                        ExecutionStatus::Succeeded => 0,
                        ExecutionStatus::Failed { .. } => 3,
                    })
                }
            }
        }
    }
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    init_logging(args.verbose);
    match run(args).await {
        Ok(code) => exit(code),
        Err(e) => {
            error!("{e}");
            eprintln!("[retraining-pipeline] {e}");
            exit(match e {
                AppError::Config(_) => 4,
                _ => 5,
            });
        }
    }
}
