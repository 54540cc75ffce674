//! Mermaid CLI - contextual prompts and local text generation

use anyhow::Result;
use clap::{Parser, Subcommand};
use mermaid_core::Config;

mod commands;

#[derive(Parser)]
#[command(name = "mermaid")]
#[command(version)]
#[command(about = "Contextual prompts for local text-generation models", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to config file (default: ./config.json)
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Verbose output (show timings and debug info)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a response to a contextual request
    Contextual {
        /// Context block (e.g. "date: ...\nurl: ...")
        #[arg(long, default_value = "")]
        context: String,

        /// Input passage
        #[arg(short, long, default_value = "")]
        input: String,

        /// Instruction for the model
        #[arg(long, default_value = "")]
        instruction: String,

        /// Also print the formatted template
        #[arg(long)]
        show_template: bool,
    },

    /// Send free text to the model (reads stdin when TEXT is omitted)
    Flow {
        /// Text to continue
        text: Option<String>,
    },

    /// Print the template and response for a built-in example
    Example,

    /// Print the contextual template without running a model
    Template {
        #[arg(long, default_value = "")]
        context: String,

        #[arg(short, long, default_value = "")]
        input: String,

        #[arg(long, default_value = "")]
        instruction: String,
    },

    /// Two-page interactive form
    Interactive,

    /// Download a GGUF model from Hugging Face and select it
    Setup {
        /// Repository, e.g. TheBloke/airoboros-l2-7B-gpt4-2.0-GGUF
        #[arg(long)]
        repo: String,

        /// GGUF file inside the repository
        #[arg(long)]
        file: String,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show current configuration
    Show,

    /// Set the model id (GGUF path or id under the models directory)
    SetModel {
        model_id: String,
    },

    /// Set the inference backend (llama-cpp, mistral-rs)
    SetBackend {
        backend: String,
    },

    /// Show config file path
    Path,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(log_level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config_path = cli.config.as_deref();

    match cli.command {
        Commands::Contextual {
            context,
            input,
            instruction,
            show_template,
        } => {
            let config = Config::load(config_path)?;
            commands::contextual::run(&config, &context, &input, &instruction, show_template)
        }

        Commands::Flow { text } => {
            let config = Config::load(config_path)?;
            commands::flow::run(&config, text.as_deref())
        }

        Commands::Example => {
            let config = Config::load(config_path)?;
            commands::example::run(&config)
        }

        Commands::Template {
            context,
            input,
            instruction,
        } => commands::template::run(&context, &input, &instruction),

        Commands::Interactive => {
            let config = Config::load(config_path)?;
            commands::interactive::run(&config)
        }

        Commands::Setup { repo, file } => commands::setup::run(config_path, &repo, &file),

        Commands::Config { action } => {
            let mut config = Config::load(config_path)?;
            match action {
                ConfigAction::Show => commands::config::show(&config, config_path),
                ConfigAction::SetModel { model_id } => {
                    commands::config::set_model(&mut config, config_path, &model_id)
                }
                ConfigAction::SetBackend { backend } => {
                    commands::config::set_backend(&mut config, config_path, &backend)
                }
                ConfigAction::Path => commands::config::show_path(config_path),
            }
        }
    }
}
