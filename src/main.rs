use clap::{Parser, Subcommand};
use mathop_gen::config::{self, DEFAULT_CONFIG_FILE, GeneratorConfig};
use mathop_gen::generate::{self, GenerateOptions};
use mathop_gen::template::{Placeholder, Template, TemplateError};
use mathop_gen::{logging, output};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
enum CliError {
    #[error("template {}: {source}", path.display())]
    Template { path: PathBuf, source: TemplateError },
    #[error("unknown operation: {0}")]
    UnknownOperation(String),
    #[error("progress printer thread panicked")]
    Printer,
}

fn version_string() -> &'static str {
    let hash = env!("GIT_HASH");
    if hash.is_empty() {
        env!("CARGO_PKG_VERSION")
    } else {
        // Leaked once at startup
        Box::leak(format!("{}@{hash}", env!("CARGO_PKG_VERSION")).into_boxed_str())
    }
}

#[derive(Parser)]
#[command(name = "mathop-gen")]
#[command(about = "Generate GEGL math point-composer operations from a template")]
#[command(long_about = "\
Generate GEGL math point-composer operations from a template

Each operation is a (name, formula, default value) triple. One file named
<name>.<extension> is written per operation by filling the template's
placeholders:

  @name@      add
  @title@     Add
  @filename@  add.c
  @formula@   result = input + value
  @default@   0.0

Without a config file the five stock operations (add, subtract, multiply,
divide, gamma) are generated into the current directory.

Run 'mathop-gen gen-config' to print a documented mathop-gen.toml.")]
#[command(version = version_string())]
struct Cli {
    /// Config file [default: mathop-gen.toml, used only if present]
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Output directory (overrides config)
    #[arg(long, global = true)]
    output: Option<PathBuf>,

    /// Template file (overrides config)
    #[arg(long, global = true)]
    template: Option<PathBuf>,

    /// Debug logging on stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Write one source file per operation (default)
    Generate,
    /// Report which generated files are up to date, stale or missing
    Check,
    /// Print the resolved operation list
    List {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print one rendered operation to stdout
    Render {
        /// Operation name
        name: String,
    },
    /// Print a stock mathop-gen.toml with all options documented
    GenConfig,
}

fn main() {
    if let Err(e) = run() {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let command = cli.command.unwrap_or(Command::Generate);
    if let Command::GenConfig = command {
        print!("{}", config::stock_config_toml());
        return Ok(());
    }

    let config = resolve_config(cli.config.as_deref(), cli.output, cli.template)?;
    let template = load_template(&config)?;
    let options = GenerateOptions {
        output_dir: config.output_dir.clone(),
        extension: config.extension.clone(),
    };

    match command {
        Command::Generate => {
            let (mut tx, rx) = std::sync::mpsc::channel();
            let printer = std::thread::spawn(move || {
                for event in rx {
                    if let Some(line) = output::format_event(&event) {
                        println!("{}", line);
                    }
                }
            });
            let result = generate::generate(&config.operations, &template, &options, &mut tx);
            // Closing the channel lets the printer drain and exit, even on error.
            drop(tx);
            printer.join().map_err(|_| CliError::Printer)?;
            let summary = result?;
            output::print_generate_summary(&summary, &options.output_dir);
        }
        Command::Check => {
            let report = generate::check(&config.operations, &template, &options)?;
            output::print_check_report(&report);
            if !report.is_clean() {
                std::process::exit(1);
            }
        }
        Command::List { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(&config.operations)?);
            } else {
                output::print_operation_list(&config.operations, &config.extension);
            }
        }
        Command::Render { name } => {
            // Last match, mirroring which file a duplicate name ends up in.
            let op = config
                .operations
                .iter()
                .rev()
                .find(|op| op.name == name)
                .ok_or_else(|| CliError::UnknownOperation(name.clone()))?;
            print!("{}", template.render(op, &config.extension));
        }
        Command::GenConfig => unreachable!("handled before config resolution"),
    }

    Ok(())
}

/// Load the config file and apply command-line overrides.
fn resolve_config(
    path: Option<&Path>,
    output_dir: Option<PathBuf>,
    template: Option<PathBuf>,
) -> Result<GeneratorConfig, config::ConfigError> {
    let (path, required) = match path {
        Some(p) => (p.to_path_buf(), true),
        None => (PathBuf::from(DEFAULT_CONFIG_FILE), false),
    };
    let mut config = config::load_config(&path, required)?;
    tracing::debug!(
        config = %path.display(),
        operations = config.operations.len(),
        "resolved config"
    );

    if let Some(dir) = output_dir {
        config.output_dir = dir;
    }
    if let Some(t) = template {
        config.template = Some(t);
    }
    Ok(config)
}

fn load_template(config: &GeneratorConfig) -> Result<Template, CliError> {
    let template = match &config.template {
        Some(path) => Template::load(path).map_err(|source| CliError::Template {
            path: path.clone(),
            source,
        })?,
        None => Template::builtin(),
    };
    for placeholder in [Placeholder::Name, Placeholder::Formula] {
        if !template.uses(placeholder) {
            tracing::warn!(
                "template has no @{}@ placeholder; every operation will render it identically",
                placeholder.key()
            );
        }
    }
    Ok(template)
}
