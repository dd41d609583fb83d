use agent::{Checkpointer, ConversationState, FileCheckpointer, MemorySaver, Node};
use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use config::{Config, NodeConfig};
use providers::{Message, Provider, SafeProvider};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Config file to use instead of the default search path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Node to run. Defaults to the first configured node
    #[arg(short, long, global = true)]
    node: Option<String>,

    /// Write logs to this file instead of stderr
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Keep talking to the same node session
    Interactive,

    /// Run a single prompt through the node
    Exec {
        #[arg(required = true)]
        prompt: String,
    },

    /// Print the node's state machine as Graphviz DOT
    Graph,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_file.as_deref())?;

    let config = match &cli.config {
        Some(path) => config::load_config_from(path),
        None => config::load_config_file(),
    }
    .context("Failed to load configuration")?;

    let node_config = select_node(&config, cli.node.as_deref())?.clone();
    info!(
        node = %node_config.name,
        session = %node_config.session_id(),
        step_budget = config.step_budget,
        "Selected node"
    );

    match cli.command {
        Some(Commands::Graph) => {
            print!("{}", agent::graph::render_dot(&node_config.name));
        }
        Some(Commands::Exec { prompt }) => {
            let node = build_node(&config, node_config)?;
            let state = ConversationState::new(vec![Message::human(prompt)], config.step_budget);
            let state = node.invoke(state).await?;
            report(&node, &state);
        }
        Some(Commands::Interactive) | None => {
            let node = build_node(&config, node_config)?;
            interactive_loop(&node, config.step_budget).await?;
        }
    }

    Ok(())
}

fn init_tracing(log_file: Option<&Path>) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    match log_file {
        Some(path) => {
            let file = open_log_file(path)?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::sync::Mutex::new(file))
                .with_ansi(false)
                .init();
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
    Ok(())
}

/// Open `path` for appending, creating it and its parent directory if needed.
fn open_log_file(path: &Path) -> Result<std::fs::File> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open log file {}", path.display()))
}

fn select_node<'a>(config: &'a Config, name: Option<&str>) -> Result<&'a NodeConfig> {
    match name {
        Some(name) => config
            .node(name)
            .ok_or_else(|| anyhow!("No node named `{}` in the configuration", name)),
        None => config
            .nodes
            .first()
            .ok_or_else(|| anyhow!("The configuration does not define any nodes")),
    }
}

fn build_node(config: &Config, node_config: NodeConfig) -> Result<Node<SafeProvider<Provider>>> {
    let provider = SafeProvider::new(Provider::try_from(config)?, config.retry);
    let tools = tools::builtin_registry()?;
    let checkpointer: Arc<dyn Checkpointer> = match &config.checkpoint_dir {
        Some(dir) => Arc::new(FileCheckpointer::new(dir)),
        None => Arc::new(MemorySaver::new()),
    };

    let node = Node::new(
        node_config,
        provider,
        tools,
        checkpointer,
        Some(config.log_dir.as_path()),
    )?;
    Ok(node)
}

fn report(node: &Node<SafeProvider<Provider>>, state: &ConversationState) {
    if let Some(message) = state.last_message() {
        println!("{}", message.content);
    }
    println!(
        "[{} steps left, next: {}]",
        state.remaining_steps,
        node.decide_next(state)
    );
}

async fn interactive_loop(node: &Node<SafeProvider<Provider>>, step_budget: u32) -> Result<()> {
    println!("Interactive mode. Enter 'exit' or 'quit' to end the session.");

    let mut state = ConversationState::new(Vec::new(), step_budget);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        print!("> ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let input = line.trim();
        if input.eq_ignore_ascii_case("exit") || input.eq_ignore_ascii_case("quit") {
            break;
        }
        if input.is_empty() {
            continue;
        }

        let mut next = state.clone();
        next.messages.push(Message::human(input));
        match node.invoke(next).await {
            Ok(result) => {
                report(node, &result);
                state = result;
            }
            Err(e) => {
                warn!(error = %e, "Invocation failed");
                eprintln!("Error: {}", e);
            }
        }
    }

    Ok(())
}
