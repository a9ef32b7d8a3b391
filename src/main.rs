use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use tracing::warn;

use sshq::app::AppState;
use sshq::config::Config;
use sshq::query::SYNOPSIS;
use sshq::settings::{FileSettings, TemplateKey, Templates};
use sshq::ssh::TerminalLauncher;

#[derive(Parser)]
#[command(name = "sshq")]
#[command(author, version, about = "Launch ssh sessions by host prefix from your ssh config")]
#[command(arg_required_else_help = true)]
struct Cli {
    /// Configuration file (defaults to the platform config dir)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List every host alias found in the ssh config files
    Hosts,
    /// Show ranked matches and their command lines
    Query {
        /// Allow trailing script text, as if the launcher was triggered explicitly
        #[arg(short, long)]
        trigger: bool,
        #[arg(value_name = SYNOPSIS, trailing_var_arg = true, allow_hyphen_values = true)]
        query: Vec<String>,
    },
    /// Open a terminal for the best match
    Connect {
        #[arg(short, long)]
        trigger: bool,
        #[arg(value_name = SYNOPSIS, trailing_var_arg = true, allow_hyphen_values = true)]
        query: Vec<String>,
    },
    /// Command template management
    Template {
        #[command(subcommand)]
        action: TemplateAction,
    },
    /// Configuration file management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum TemplateAction {
    /// Print both templates
    Show,
    /// Override a template (local or remote); an empty value resets it
    Set {
        key: TemplateKey,
        #[arg(allow_hyphen_values = true)]
        value: String,
    },
    /// Restore the built-in default
    Reset { key: TemplateKey },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Write a commented default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Print the effective configuration
    Show,
}

fn main() -> ExitCode {
    init_tracing();

    match run() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {e:?}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing() {
    let level = if std::env::var("SSHQ_DEBUG").is_ok() {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

fn run() -> Result<ExitCode> {
    let cli = Cli::parse();
    let config_path = match cli.config {
        Some(path) => path,
        None => Config::default_config_path()?,
    };

    match cli.command {
        Commands::Config { action } => handle_config(action, &config_path),
        Commands::Template { action } => {
            let templates = open_templates(&config_path)?;
            handle_template(action, &templates)
        }
        Commands::Hosts => {
            let (app, _) = open_app(&config_path)?;
            for host in app.hosts().iter() {
                println!("{host}");
            }
            Ok(ExitCode::SUCCESS)
        }
        Commands::Query { trigger, query } => {
            let (app, _) = open_app(&config_path)?;
            let results = app.handle_query(&query.join(" "), trigger);
            if results.is_empty() {
                return Ok(ExitCode::FAILURE);
            }
            for item in results {
                for action in &item.actions {
                    println!("{:.3}\t{}\t{}\t{}", item.score, item.text, action.label, action.command);
                }
            }
            Ok(ExitCode::SUCCESS)
        }
        Commands::Connect { trigger, query } => {
            let (app, config) = open_app(&config_path)?;
            let launcher = TerminalLauncher::new(config.terminal);
            match app.activate(&query.join(" "), trigger, &launcher)? {
                Some(_) => Ok(ExitCode::SUCCESS),
                None => {
                    eprintln!("No matching host");
                    Ok(ExitCode::FAILURE)
                }
            }
        }
    }
}

fn load_config(path: &Path) -> Result<Config> {
    let config = Config::load_or_default(path)?;
    config
        .validate()
        .with_context(|| format!("Invalid configuration: {}", path.display()))?;
    Ok(config)
}

fn open_templates(path: &Path) -> Result<Templates> {
    let store = FileSettings::open(path.to_path_buf())?;
    Ok(Templates::new(Arc::new(store)))
}

fn open_app(path: &Path) -> Result<(AppState, Config)> {
    let config = load_config(path)?;
    let templates = open_templates(path)?;
    let app = AppState::new(&config, templates);
    if app.hosts().is_empty() {
        warn!("No ssh hosts found in {:?}", config.ssh.config_paths);
    }
    Ok((app, config))
}

fn handle_template(action: TemplateAction, templates: &Templates) -> Result<ExitCode> {
    match action {
        TemplateAction::Show => {
            for key in TemplateKey::ALL {
                println!("{} = {}", key.as_str(), templates.get(key));
            }
        }
        TemplateAction::Set { key, value } => templates.set(key, &value)?,
        TemplateAction::Reset { key } => templates.reset(key)?,
    }
    Ok(ExitCode::SUCCESS)
}

fn handle_config(action: ConfigAction, path: &Path) -> Result<ExitCode> {
    match action {
        ConfigAction::Init { force } => {
            if path.exists() && !force {
                anyhow::bail!(
                    "{} already exists. Use --force to overwrite",
                    path.display()
                );
            }
            Config::save_default_config(path)?;
            println!("Created {}", path.display());
        }
        ConfigAction::Show => {
            let config = load_config(path)?;
            print!(
                "{}",
                toml::to_string_pretty(&config).context("Failed to serialize configuration")?
            );
        }
    }
    Ok(ExitCode::SUCCESS)
}
