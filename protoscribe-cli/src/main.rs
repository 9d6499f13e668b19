//! # protoscribe
//!
//! CLI for compiling extracted type-definition IR into Protocol Buffers
//! schema files.
//!
//! ## Usage
//!
//! ```bash
//! # Compile an extracted IR program with defaults (proto2, one file per namespace)
//! protoscribe compile --input ir.json --out-path ./protos
//!
//! # proto3 output with automatic cycle and collision resolution
//! protoscribe compile --input ir.json --proto3 \
//!     --resolve-circular-dependencies --resolve-name-collisions
//!
//! # Everything in a single dump.proto
//! protoscribe compile --input ir.json --dump-mode
//!
//! # Stamp a file option onto every emitted file
//! protoscribe compile --input ir.json --file-option "csharp_namespace={namespace}"
//!
//! # Initialize configuration
//! protoscribe init
//! ```

use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;
use std::process::ExitCode;

use protoscribe::ProtoCompiler;
use protoscribe_cli::{
    config::{CliArgs, ConfigManager},
    error::{CliError, ConfigError},
    ir_input::IrLoader,
    writer::{FileWriter, WriteResult},
};

#[derive(Parser)]
#[command(name = "protoscribe")]
#[command(author, version, about = "Compile extracted type-definition IR into Protocol Buffers schemas", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile an extracted IR program into .proto files
    Compile {
        /// Path to the extracted IR program (JSON)
        #[arg(short, long)]
        input: PathBuf,

        /// Root directory for compiled proto files
        #[arg(short, long)]
        out_path: Option<PathBuf>,

        /// Dependency resolution path for the extractor
        #[arg(long)]
        lib_path: Option<PathBuf>,

        /// Collapse the whole program into a single dump.proto
        #[arg(long)]
        dump_mode: bool,

        /// Emit proto3 syntax in output files
        #[arg(long)]
        proto3: bool,

        /// Break import cycles automatically by inlining files
        #[arg(long)]
        resolve_circular_dependencies: bool,

        /// Path to the manual packaging file
        #[arg(long)]
        manual_packaging_file: Option<PathBuf>,

        /// Group similar namespaces into packages automatically
        #[arg(long)]
        automatic_packaging: bool,

        /// Rename colliding types automatically
        #[arg(long)]
        resolve_name_collisions: bool,

        /// Write all files flat into the output root
        #[arg(long)]
        flat: bool,

        /// File option applied to every emitted file, as key=value.
        /// `{namespace}` and `{file}` expand per file.
        #[arg(long = "file-option", value_name = "KEY=VALUE")]
        file_options: Vec<String>,

        /// Preview the planned files without writing
        #[arg(long)]
        dry_run: bool,

        /// Configuration file path
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Initialize a new protoscribe configuration file
    Init {
        /// Output path for configuration file
        #[arg(short, long, default_value = "protoscribe.toml")]
        output: PathBuf,

        /// Overwrite existing configuration file
        #[arg(long)]
        force: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", "Error:".red().bold(), e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Commands::Compile {
            input,
            out_path,
            lib_path,
            dump_mode,
            proto3,
            resolve_circular_dependencies,
            manual_packaging_file,
            automatic_packaging,
            resolve_name_collisions,
            flat,
            file_options,
            dry_run,
            config,
        } => {
            let args = CliArgs {
                lib_path,
                out_path,
                manual_packaging_file,
                dump_mode: dump_mode.then_some(true),
                proto3: proto3.then_some(true),
                package_structured: flat.then_some(false),
                resolve_circular_dependencies: resolve_circular_dependencies.then_some(true),
                resolve_name_collisions: resolve_name_collisions.then_some(true),
                automatic_packaging: automatic_packaging.then_some(true),
            };
            cmd_compile(input, args, file_options, dry_run, config)
        }

        Commands::Init { output, force } => cmd_init(output, force),
    }
}

/// Compile command implementation.
fn cmd_compile(
    input: PathBuf,
    args: CliArgs,
    file_options: Vec<String>,
    dry_run: bool,
    config_path: Option<PathBuf>,
) -> Result<(), CliError> {
    let config = ConfigManager::load(config_path.as_deref())?;
    let config = ConfigManager::merge_cli_args(config, &args);

    println!("{}", "Loading IR program...".cyan());
    let program = IrLoader::load(&input)?;
    println!(
        "  Loaded {} namespace(s)",
        program.namespaces.len().to_string().green()
    );

    let compiler_config = config.compiler_config()?;
    let mut compiler = ProtoCompiler::new(program, compiler_config);

    for spec in &file_options {
        let (key, template) = parse_file_option(spec)?;
        compiler
            .register_file_option(key, move |ns, file| {
                template
                    .replace("{namespace}", &ns.name)
                    .replace("{file}", file)
            })
            .map_err(protoscribe::CompileError::from)?;
    }

    println!("{}", "Compiling proto files...".cyan());
    let outputs = compiler.compile()?;
    println!(
        "  Planned {} file(s)",
        outputs.len().to_string().green()
    );

    let writer = FileWriter::new(&config.paths.out_path, dry_run);
    let results = writer.write_all(&outputs)?;

    for (result, output) in results.iter().zip(&outputs) {
        match result {
            WriteResult::Written { path, bytes } => {
                println!("{} Written {} bytes to {}", "✓".green(), bytes, path.display());
            }
            WriteResult::DryRun { path } => {
                println!("{} Would write to {}:", "[dry-run]".yellow(), path.display());
                println!("{}", "─".repeat(60).dimmed());
                println!("{}", output.content);
                println!("{}", "─".repeat(60).dimmed());
            }
        }
    }

    Ok(())
}

/// Init command implementation.
fn cmd_init(output: PathBuf, force: bool) -> Result<(), CliError> {
    if output.exists() && !force {
        println!(
            "{} Configuration file already exists: {}",
            "Error:".red(),
            output.display()
        );
        println!("  Use --force to overwrite");
        return Err(ConfigError::invalid_value(
            "output",
            "configuration file already exists",
        )
        .into());
    }

    let content = ConfigManager::default_config_content();
    std::fs::write(&output, content)?;

    println!(
        "{} Created configuration file: {}",
        "✓".green(),
        output.display()
    );

    Ok(())
}

/// Parse a `key=value` file option specification.
fn parse_file_option(spec: &str) -> Result<(String, String), CliError> {
    spec.split_once('=')
        .map(|(key, value)| (key.trim().to_string(), value.to_string()))
        .ok_or_else(|| {
            ConfigError::invalid_value("file-option", format!("expected key=value, got '{spec}'"))
                .into()
        })
}
