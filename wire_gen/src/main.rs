use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

mod cmds;

#[derive(Parser)]
#[command(name = "wire-gen")]
#[command(about = "Wire format compiler: generates Rust decode/encode/validate code", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /* Generate a Rust module from format descriptions */
    Codegen {
        /* Input YAML files containing format descriptions */
        #[arg(short = 'f', long = "files", value_name = "FILE", required = true)]
        files: Vec<PathBuf>,

        /* Include directories for imported files */
        #[arg(short = 'i', long = "include-dir", value_name = "DIR")]
        include_dirs: Vec<PathBuf>,

        /* Output Rust file */
        #[arg(short = 'o', long = "output", value_name = "FILE", default_value = "generated/wire.rs")]
        output: PathBuf,

        /* Do not emit `pub const` items for named constants */
        #[arg(long = "no-constants")]
        no_constants: bool,

        /* Enable verbose output */
        #[arg(short = 'v', long = "verbose")]
        verbose: bool,
    },

    /* Analyze format descriptions and report structure and dependency information */
    Analyze {
        /* Input YAML files containing format descriptions */
        #[arg(short = 'f', long = "files", value_name = "FILE", required = true)]
        files: Vec<PathBuf>,

        /* Include directories for imported files */
        #[arg(short = 'i', long = "include-dir", value_name = "DIR")]
        include_dirs: Vec<PathBuf>,

        /* Print the summary as JSON */
        #[arg(long = "json")]
        json: bool,

        /* Print the generated code for a specific struct */
        #[arg(long = "print-struct", value_name = "STRUCT")]
        print_struct: Option<String>,

        /* Enable verbose output */
        #[arg(short = 'v', long = "verbose")]
        verbose: bool,
    },
}

fn init_tracing(verbose: bool) {
    /* RUST_LOG wins over --verbose when set */
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Codegen {
            files,
            include_dirs,
            output,
            no_constants,
            verbose,
        } => {
            init_tracing(verbose);
            cmds::codegen::run(files, include_dirs, output, no_constants, verbose)?;
        }

        Commands::Analyze {
            files,
            include_dirs,
            json,
            print_struct,
            verbose,
        } => {
            init_tracing(verbose);
            cmds::analyze::run(files, include_dirs, json, print_struct)?;
        }
    }

    Ok(())
}
