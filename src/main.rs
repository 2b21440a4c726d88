//! inputgraph CLI - check, show and fill form definitions

use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use serde_json::{Map, Value};

use inputgraph::{
    render_reference, FixSuggestion, FormDefinition, FormError, Input, InputGroup, JsonRecord,
    ProcessEnv, PromptConfig, ShowOption, TextPrompter,
};

#[derive(Parser)]
#[command(name = "inputgraph")]
#[command(about = "Hierarchical input forms with dependency-gated prompts")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a form definition
    Check {
        /// Path to the form definition (.yaml)
        file: PathBuf,
    },

    /// Print a reference of all inputs
    Show {
        /// Path to the form definition (.yaml)
        file: PathBuf,

        /// Show current values (environment and defaults) instead of defaults
        #[arg(long)]
        values: bool,

        /// Prompt config file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Line width
        #[arg(short, long)]
        width: Option<usize>,
    },

    /// Ask for every input on stdin and print the values as JSON
    Fill {
        /// Path to the form definition (.yaml)
        file: PathBuf,

        /// Only ask for fields with this tag (repeatable)
        #[arg(short, long = "tag")]
        tags: Vec<String>,

        /// Prompt config file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Line width
        #[arg(short, long)]
        width: Option<usize>,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Check { file } => check(&file),
        Commands::Show {
            file,
            values,
            config,
            width,
        } => show(&file, values, config, width),
        Commands::Fill {
            file,
            tags,
            config,
            width,
        } => fill(&file, &tags, config, width),
    };

    if let Err(e) = result {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        if let Some(suggestion) = e.downcast_ref::<FormError>().and_then(|fe| fe.fix_suggestion()) {
            eprintln!("  {} {}", "Fix:".yellow(), suggestion);
        }
        std::process::exit(1);
    }
}

fn load(file: &Path) -> Result<(FormDefinition, InputGroup)> {
    let definition = FormDefinition::from_file(file)
        .with_context(|| format!("unable to load form '{}'", file.display()))?;
    let group = definition
        .build(Arc::new(ProcessEnv))
        .with_context(|| format!("invalid form '{}'", definition.name))?;
    Ok((definition, group))
}

fn prompt_config(config: Option<PathBuf>, width: Option<usize>, tags: &[String]) -> Result<PromptConfig> {
    let mut config = PromptConfig::load(config.as_deref(), &ProcessEnv)?;
    config.apply_cli(width, tags);
    Ok(config)
}

/// Bind every field to a member of one JSON record so the entered values
/// can be printed as a document.
fn bind_record(group: &mut InputGroup) -> Result<JsonRecord> {
    let members: Map<String, Value> = group
        .input_fields()
        .iter()
        .map(|f| (f.name().to_string(), Value::Null))
        .collect();
    let record = JsonRecord::new(Value::Object(members));
    group.bind_fields(&record)?;
    Ok(record)
}

fn check(file: &Path) -> Result<()> {
    let (definition, group) = load(file)?;
    println!(
        "{} Form '{}' is valid ({} fields, {} containers)",
        "✓".green(),
        definition.name.cyan().bold(),
        group.input_fields().len(),
        definition.containers.len()
    );
    Ok(())
}

fn show(file: &Path, values: bool, config: Option<PathBuf>, width: Option<usize>) -> Result<()> {
    let (definition, mut group) = load(file)?;
    let config = prompt_config(config, width, &[])?;
    bind_record(&mut group)?;

    let option = if values {
        ShowOption::DescAndValues
    } else if config.show_defaults {
        ShowOption::DescAndDefaults
    } else {
        ShowOption::DescOnly
    };
    let title = format!("Input Data Form for '{}'", definition.name);
    print!("{}", render_reference(&group, &title, option, &config));
    Ok(())
}

fn fill(file: &Path, tags: &[String], config: Option<PathBuf>, width: Option<usize>) -> Result<()> {
    let (definition, mut group) = load(file)?;
    let config = prompt_config(config, width, tags)?;
    bind_record(&mut group)?;

    let title = format!("Input Data Form for '{}'", definition.name);
    let stdin = io::stdin();
    let mut prompter = TextPrompter::new(stdin.lock(), io::stdout(), config);
    match prompter.run(&mut group, &title) {
        Err(FormError::PromptAborted) => {
            eprintln!("{}", "Configuration input aborted.".red());
            std::process::exit(1);
        }
        other => other?,
    }

    let values: BTreeMap<String, String> = group.input_values();
    println!("{}", serde_json::to_string_pretty(&values)?);
    Ok(())
}
