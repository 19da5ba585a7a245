use std::path::PathBuf;
use std::sync::Arc;

use clap::{CommandFactory, Parser, Subcommand};
use serde_json::{json, Value};
use tracing::info;
use tracing_subscriber::EnvFilter;

use weft_core::config::AppConfig;
use weft_core::model::{AgentDef, OrchestrationRequest, Workflow};
use weft_core::traits::{AgentStore, WorkflowStore};
use weft_engine::{EngineRegistry, Orchestrator};
use weft_gateway::GatewayServer;
use weft_store::SqliteStore;

#[derive(Parser)]
#[command(name = "weft", version, about = "Workflow orchestration service")]
struct Cli {
    /// Path to config file
    #[arg(short, long, default_value = "weft.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP gateway server
    Serve,
    /// Run one workflow and print the result as JSON
    Run {
        /// Engine to run with (defaults to the configured engine)
        #[arg(long)]
        engine: Option<String>,
        /// Workflow id to execute
        #[arg(long)]
        workflow: String,
        /// Run inputs as a JSON object
        #[arg(long)]
        inputs: Option<String>,
    },
    /// Insert demo agents and workflows into the store
    Seed,
    /// Show current configuration
    Config,
    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("weft=info,warn")),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();

    // Handle completions before config loading
    if let Commands::Completions { shell } = &cli.command {
        let mut cmd = Cli::command();
        clap_complete::generate(*shell, &mut cmd, "weft", &mut std::io::stdout());
        return Ok(());
    }

    // Load config
    let config = if cli.config.exists() {
        AppConfig::load(&cli.config)?
    } else {
        let home_config = dirs_home().map(|h| h.join(".weft").join("config.toml"));
        match home_config {
            Some(path) if path.exists() => {
                info!(path = %path.display(), "Loading config from home directory");
                AppConfig::load(&path)?
            }
            _ => {
                info!("No config file found, using built-in defaults");
                AppConfig::default()
            }
        }
    };

    // Handle config display before opening the store
    if let Commands::Config = &cli.command {
        println!("{}", toml::to_string_pretty(&config)?);
        return Ok(());
    }

    // Set up components
    let store = Arc::new(SqliteStore::open(&config.store_path())?);
    let workflows: Arc<dyn WorkflowStore> = store.clone();
    let agents: Arc<dyn AgentStore> = store;

    let model = weft_llm::create_model(&config.engines.chat)?;
    let registry = EngineRegistry::from_config(&config.engines, agents.clone(), model);
    let orchestrator = Arc::new(Orchestrator::new(registry, workflows.clone()));

    match cli.command {
        Commands::Serve => {
            info!(bind = %config.gateway.bind, "Starting gateway");
            let server = GatewayServer::new(config, orchestrator, workflows, agents);
            let cancel = tokio_util::sync::CancellationToken::new();
            let cancel_clone = cancel.clone();

            // Graceful shutdown on Ctrl-C
            tokio::spawn(async move {
                tokio::signal::ctrl_c().await.ok();
                info!("Shutting down gateway...");
                cancel_clone.cancel();
            });

            server.run(cancel).await?;
        }
        Commands::Run {
            engine,
            workflow,
            inputs,
        } => {
            let inputs = match inputs {
                Some(raw) => serde_json::from_str::<serde_json::Map<String, Value>>(&raw)
                    .map_err(|e| anyhow::anyhow!("--inputs must be a JSON object: {}", e))?,
                None => serde_json::Map::new(),
            };
            let engine = engine.unwrap_or_else(|| config.engines.default_engine.clone());
            let request = OrchestrationRequest::new(engine, workflow).with_inputs(inputs);
            let result = orchestrator.execute(&request).await?;
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        Commands::Seed => {
            seed_demo_data(&workflows, &agents).await?;
        }
        Commands::Config | Commands::Completions { .. } => {
            unreachable!("handled before component setup")
        }
    }

    Ok(())
}

/// Insert the demo personas and the linear demo workflows that exercise
/// them. Node ids double as agent references so every engine can run the
/// seeded graphs.
async fn seed_demo_data(
    workflows: &Arc<dyn WorkflowStore>,
    agents: &Arc<dyn AgentStore>,
) -> anyhow::Result<()> {
    println!("Seeding demo agents:");
    let api = seed_agent(
        agents,
        "API Designer",
        "Senior API architect",
        "Design clear, versioned HTTP APIs. Produce endpoint lists with request and response shapes.",
    )
    .await?;
    let dba = seed_agent(
        agents,
        "Database Architect",
        "Database architect",
        "Design relational schemas and safe migration plans. Call out indexes and integrity constraints.",
    )
    .await?;
    let backend = seed_agent(
        agents,
        "Backend Developer",
        "Senior backend engineer",
        "Implement services and endpoints to match the agreed API. Note any contract changes explicitly.",
    )
    .await?;
    let frontend = seed_agent(
        agents,
        "Frontend Developer",
        "Frontend engineer",
        "Build UI flows against the published API. List the endpoints consumed and any gaps found.",
    )
    .await?;
    let qa = seed_agent(
        agents,
        "QA Engineer",
        "Quality engineer",
        "Write and run test plans for new changes. Report failures with reproduction steps.",
    )
    .await?;
    let reviewer = seed_agent(
        agents,
        "Code Reviewer",
        "Staff engineer",
        "Review changes for correctness and clarity. Approve or request changes with concrete reasons.",
    )
    .await?;
    let security = seed_agent(
        agents,
        "Security Engineer",
        "Application security engineer",
        "Audit changes for vulnerabilities. Flag injection, authorization and secrets issues with severity.",
    )
    .await?;
    let devops = seed_agent(
        agents,
        "DevOps Engineer",
        "Platform engineer",
        "Prepare deploys and rollbacks. Confirm health checks and monitoring before sign-off.",
    )
    .await?;

    println!("Seeding demo workflows:");
    seed_workflow(
        workflows,
        "CI/CD Pipeline",
        "Automated continuous integration and deployment pipeline with quality gates",
        vec![
            agent_node(&backend, "Backend Developer"),
            agent_node(&qa, "QA Engineer"),
            agent_node(&reviewer, "Code Reviewer"),
            agent_node(&devops, "DevOps Engineer"),
        ],
        vec![
            edge(&backend, &reviewer, "code_review"),
            edge(&reviewer, &qa, "approved"),
            edge(&qa, &devops, "tests_passed"),
        ],
    )
    .await?;
    seed_workflow(
        workflows,
        "Feature Development Flow",
        "End-to-end feature development from backend to frontend with testing",
        vec![
            agent_node(&backend, "Backend Developer"),
            agent_node(&api, "API Designer"),
            agent_node(&frontend, "Frontend Developer"),
            agent_node(&qa, "QA Engineer"),
        ],
        vec![
            edge(&api, &backend, "api_spec"),
            edge(&backend, &frontend, "api_ready"),
            edge(&frontend, &qa, "feature_complete"),
        ],
    )
    .await?;
    seed_workflow(
        workflows,
        "Security Review Process",
        "Comprehensive security review workflow for new features",
        vec![
            agent_node(&backend, "Backend Developer"),
            agent_node(&security, "Security Engineer"),
            agent_node(&reviewer, "Code Reviewer"),
            agent_node(&devops, "DevOps Engineer"),
        ],
        vec![
            edge(&backend, &security, "security_scan"),
            edge(&security, &reviewer, "vulnerabilities_fixed"),
            edge(&reviewer, &devops, "approved_for_deploy"),
        ],
    )
    .await?;
    seed_workflow(
        workflows,
        "Database Migration Flow",
        "Safe database schema changes with review and deployment",
        vec![
            agent_node(&dba, "Database Architect"),
            agent_node(&backend, "Backend Developer"),
            agent_node(&reviewer, "Code Reviewer"),
            agent_node(&devops, "DevOps Engineer"),
        ],
        vec![
            edge(&dba, &backend, "migration_scripts"),
            edge(&backend, &reviewer, "code_updated"),
            edge(&reviewer, &devops, "ready_to_migrate"),
        ],
    )
    .await?;
    seed_workflow(
        workflows,
        "Full Stack Development",
        "Complete development cycle from API design to deployment",
        vec![
            agent_node(&api, "API Designer"),
            agent_node(&dba, "Database Architect"),
            agent_node(&backend, "Backend Developer"),
            agent_node(&frontend, "Frontend Developer"),
            agent_node(&qa, "QA Engineer"),
            agent_node(&security, "Security Engineer"),
            agent_node(&devops, "DevOps Engineer"),
        ],
        vec![
            edge(&api, &dba, "data_requirements"),
            edge(&dba, &backend, "schema_ready"),
            edge(&backend, &frontend, "api_implemented"),
            edge(&frontend, &qa, "ui_complete"),
            edge(&qa, &security, "tests_passed"),
            edge(&security, &devops, "security_approved"),
        ],
    )
    .await?;

    println!("Done. Run one with: weft run --workflow <id>");
    Ok(())
}

async fn seed_agent(
    store: &Arc<dyn AgentStore>,
    name: &str,
    role: &str,
    prompt: &str,
) -> anyhow::Result<String> {
    let agent = AgentDef::new(name, prompt).with_role(role);
    store.create_agent(&agent).await?;
    println!("  - {}: {}", name, agent.id);
    Ok(agent.id)
}

async fn seed_workflow(
    store: &Arc<dyn WorkflowStore>,
    name: &str,
    description: &str,
    nodes: Vec<Value>,
    edges: Vec<Value>,
) -> anyhow::Result<()> {
    let (node_count, edge_count) = (nodes.len(), edges.len());
    let workflow =
        Workflow::new(name, json!({"nodes": nodes, "edges": edges})).with_description(description);
    store.create_workflow(&workflow).await?;
    println!(
        "  - {} ({} nodes, {} edges): {}",
        name, node_count, edge_count, workflow.id
    );
    Ok(())
}

fn agent_node(agent_id: &str, label: &str) -> Value {
    json!({"id": agent_id, "agentId": agent_id, "label": label})
}

fn edge(from: &str, to: &str, label: &str) -> Value {
    json!({"from": from, "to": to, "label": label})
}

fn dirs_home() -> Option<PathBuf> {
    std::env::var("HOME").ok().map(PathBuf::from)
}
