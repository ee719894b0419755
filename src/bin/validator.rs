//! Environment Validator CLI
//!
//! Checks a `.env` file (and/or the process environment) against a JSON
//! schema and reports every error and warning.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use env_schema::{parse_env, validate_env, load_dotenv, RawEnv, Schema};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "env-validator")]
#[command(about = "Validate environment variables against a schema")]
struct Cli {
    /// Path to the JSON schema file
    #[arg(short, long, default_value = "env.schema.json")]
    schema: PathBuf,

    /// Path to a .env file to load
    #[arg(short, long)]
    env_file: Option<PathBuf>,

    /// Also read the process environment (a .env file takes precedence)
    #[arg(long)]
    system: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Report all errors and warnings without coercing values
    Check,

    /// Coerce the environment into typed values and print them as JSON
    Parse {
        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let schema = Schema::from_json_file(&cli.schema)?;

    let mut env = RawEnv::new();
    if cli.system {
        env.extend(std::env::vars());
    }
    if let Some(path) = &cli.env_file {
        env.extend(load_dotenv(path)?);
    }

    match cli.command {
        Commands::Check => {
            let report = validate_env(&env, &schema);

            for error in &report.errors {
                println!("❌ {}: {}", error.variable, error.message);
                if let Some(expected) = &error.expected {
                    println!("   Expected: {}", expected);
                }
                if let Some(received) = &error.received {
                    println!("   Received: {}", received);
                }
            }
            for warning in &report.warnings {
                println!("⚠️  {}", warning);
            }

            if report.valid {
                println!("✅ {} variable(s) valid", schema.len());
            } else {
                println!();
                println!("❌ {} error(s) found", report.errors.len());
                std::process::exit(1);
            }
            Ok(())
        }

        Commands::Parse { output } => {
            let typed = parse_env(&env, &schema)?;
            let json = serde_json::to_string_pretty(&typed)?;

            if let Some(path) = output {
                std::fs::write(&path, &json)?;
                println!("✅ Typed environment written to {:?}", path);
            } else {
                println!("{}", json);
            }
            Ok(())
        }
    }
}
