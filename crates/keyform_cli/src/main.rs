//! Keyform CLI
//!
//! Command-line tools for designing and debugging key patterns.
//!
//! # Commands
//!
//! - `inspect` - Show the parsed structure of a pattern
//! - `check` - Compile a pattern against field types and report sortability
//! - `extract` - Derive a key attribute from a stored record
//! - `render` - Render a key from typed field values

mod commands;

use clap::{Parser, Subcommand};
use keyform_attr::AttributeKind;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Keyform command-line pattern tools.
#[derive(Parser)]
#[command(name = "keyform")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(global = true, short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the parsed structure of a pattern
    Inspect {
        /// Key pattern, e.g. `USER#{id}`
        pattern: String,

        /// Attribute kind (S, N, B)
        #[arg(short, long, default_value = "S")]
        kind: AttributeKind,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Compile a pattern against field types and report sortability
    Check {
        /// Key pattern
        pattern: String,

        /// Field type as path=type (repeatable)
        #[arg(long = "field", value_name = "PATH=TYPE")]
        fields: Vec<String>,

        /// Treat the pattern as a sort key
        #[arg(short, long)]
        sort: bool,

        /// Entity label used in diagnostics
        #[arg(short, long, default_value = "Entity")]
        entity: String,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Derive a key attribute from a stored record
    Extract {
        /// Key pattern
        pattern: String,

        /// Record file in attribute-value JSON
        #[arg(short, long)]
        record: PathBuf,

        /// Attribute kind (S, N, B)
        #[arg(short, long, default_value = "S")]
        kind: AttributeKind,

        /// Report missing fields as non-participation instead of failing
        #[arg(long)]
        sparse: bool,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Render a key from typed field values
    Render {
        /// Key pattern
        pattern: String,

        /// Field type as path=type (repeatable)
        #[arg(long = "field", value_name = "PATH=TYPE")]
        fields: Vec<String>,

        /// Field value as path=value (repeatable); timestamps are RFC 3339
        #[arg(long = "value", value_name = "PATH=VALUE")]
        values: Vec<String>,

        /// Attribute kind (S, N, B)
        #[arg(short, long, default_value = "S")]
        kind: AttributeKind,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Show version information
    Version,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Inspect {
            pattern,
            kind,
            format,
        } => {
            commands::inspect::run(&pattern, kind, &format)?;
        }
        Commands::Check {
            pattern,
            fields,
            sort,
            entity,
            format,
        } => {
            commands::check::run(&pattern, &fields, sort, &entity, &format)?;
        }
        Commands::Extract {
            pattern,
            record,
            kind,
            sparse,
            format,
        } => {
            commands::extract::run(&pattern, &record, kind, sparse, &format)?;
        }
        Commands::Render {
            pattern,
            fields,
            values,
            kind,
            format,
        } => {
            commands::render::run(&pattern, &fields, &values, kind, &format)?;
        }
        Commands::Version => {
            println!("Keyform CLI v{}", env!("CARGO_PKG_VERSION"));
            println!("Keyform Core v{}", keyform_core::VERSION);
        }
    }

    Ok(())
}
