//! Treadle CLI binary: manage, compile, and run agent workflows.
//!
//! A pure caller of the core's compile/execute plus the storage and template
//! collaborators. Subcommands: `status`, `templates`, `list`, `show`, `new`,
//! `delete`, `run`.

use std::sync::Arc;

use clap::{Parser, Subcommand};
use treadle::{
    GraphBuilder, LlmManager, Router, Settings, TemplateLoader, Workflow, WorkflowExecutor,
    WorkflowStorage,
};

#[derive(Parser, Debug)]
#[command(name = "treadle")]
#[command(about = "Treadle — compile and run agent workflows from the CLI")]
struct Args {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show configuration status (credential, model, storage path)
    Status,

    /// List built-in workflow templates
    Templates {
        /// Show the full node structure of one template
        #[arg(long, value_name = "ID")]
        show: Option<String>,
    },

    /// List saved workflows
    List,

    /// Show a saved workflow
    Show {
        /// Workflow id
        id: String,
    },

    /// Create a workflow from a template and save it
    New {
        /// Template id (see `templates`)
        #[arg(long, value_name = "ID")]
        template: String,

        /// Name for the new workflow (default: template name)
        #[arg(long, value_name = "NAME")]
        name: Option<String>,
    },

    /// Delete a saved workflow
    Delete {
        /// Workflow id
        id: String,
    },

    /// Compile and run a saved workflow against an input
    Run {
        /// Workflow id
        id: String,

        /// Input text for the workflow
        #[arg(short, long, value_name = "TEXT")]
        input: String,

        /// Print the execution log after the output
        #[arg(long)]
        log: bool,
    },
}

fn init_logging() {
    use tracing_subscriber::EnvFilter;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn print_workflow(workflow: &Workflow) {
    println!("{} ({})", workflow.name, workflow.id);
    if !workflow.description.is_empty() {
        println!("  {}", workflow.description);
    }
    for (i, node) in workflow.nodes.iter().enumerate() {
        println!("  {}. {} [{}]", i + 1, node.name, node.id);
        let preview: String = node.prompt.chars().take(80).collect();
        println!("     prompt: {}", preview);
        println!("     default → {}", node.routing_rules.default_target);
        for (key, target) in &node.routing_rules.conditional_targets {
            println!("     '{}' → {}", key, target);
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging();

    let args = Args::parse();
    let settings = Settings::from_env();
    let storage = WorkflowStorage::new(settings.workflow_storage_path.clone())?;
    let templates = TemplateLoader::new();

    match args.cmd {
        Command::Status => {
            match settings.validate() {
                Ok(()) => println!("✅ configuration valid"),
                Err(e) => println!("❌ {}", e),
            }
            println!("model: {}", settings.llm_model_name);
            println!("temperature: {}", settings.llm_temperature);
            println!("storage: {}", settings.workflow_storage_path.display());
        }

        Command::Templates { show } => {
            if let Some(id) = show {
                match templates.load_template(&id) {
                    Some(wf) => print_workflow(&wf),
                    None => {
                        eprintln!("unknown template: {}", id);
                        std::process::exit(1);
                    }
                }
            } else {
                for info in templates.list_templates() {
                    println!("{:<24} {} ({})", info.id, info.description, info.category);
                }
            }
        }

        Command::List => {
            let metas = storage.list_with_metadata()?;
            if metas.is_empty() {
                println!("no saved workflows");
            }
            for meta in metas {
                println!(
                    "{:<34} {:<24} {} node(s)",
                    meta.id, meta.name, meta.node_count
                );
            }
        }

        Command::Show { id } => {
            let workflow = storage.load(&id)?;
            print_workflow(&workflow);
        }

        Command::New { template, name } => {
            let Some(mut workflow) = templates.load_template(&template) else {
                eprintln!("unknown template: {}", template);
                std::process::exit(1);
            };
            // A template instance is an ordinary workflow with its own id.
            workflow.id = uuid::Uuid::new_v4().simple().to_string();
            if let Some(name) = name {
                workflow.name = name;
            }
            storage.save(&workflow)?;
            println!("saved workflow {} ({})", workflow.name, workflow.id);
        }

        Command::Delete { id } => {
            storage.delete(&id)?;
            println!("deleted {}", id);
        }

        Command::Run { id, input, log } => {
            if let Err(e) = settings.validate() {
                eprintln!("cannot run: {}", e);
                std::process::exit(1);
            }
            let workflow = storage.load(&id)?;

            let llm = Arc::new(LlmManager::new(settings.clone()));
            let builder = GraphBuilder::new(settings.clone(), llm);
            let (compiled, recursion_limit) = match builder.compile(&workflow) {
                Ok(out) => out,
                Err(e) => {
                    eprintln!("compilation failed: {}", e);
                    std::process::exit(1);
                }
            };
            tracing::debug!(workflow = %workflow.id, recursion_limit, "compiled, running");

            let executor = WorkflowExecutor::new();
            let (state, execution_log) = executor
                .execute(&compiled, &input, recursion_limit, Vec::new())
                .await;

            let router = Router::new(&settings);
            println!("{}", router.clean_content(&state.last_response_content));

            let summary = executor.execution_summary(&state);
            println!();
            println!("{}", serde_json::to_string_pretty(&summary)?);

            if log {
                println!();
                for line in &execution_log {
                    println!("{}", line);
                }
            }
            if summary.has_error {
                std::process::exit(1);
            }
        }
    }

    Ok(())
}
