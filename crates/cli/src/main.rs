mod cmd;
mod logging;

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "rk", version, about = "Validate records against declared record types")]
struct Cli {
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[arg(long, global = true)]
    profile: Option<String>,

    /// Directory of record type declarations (overrides the profile)
    #[arg(long, global = true)]
    types_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Validate configuration and print resolved paths
    Doctor,

    /// List declared record types
    Types,

    /// Show the fields of a record type
    Describe(DescribeArgs),

    /// Construct a record from a YAML or JSON mapping
    Check(CheckArgs),
}

#[derive(Debug, Args)]
pub struct DescribeArgs {
    /// Record type name
    pub record_type: String,
}

#[derive(Debug, Args)]
pub struct CheckArgs {
    /// Record type name
    pub record_type: String,

    /// Input file (YAML or JSON), or "-" for stdin
    pub input: PathBuf,

    /// Output format for the normalized record
    #[arg(long, short, value_enum, default_value_t = OutputFormat::Text)]
    pub output: OutputFormat,

    /// Report every failing field instead of the first
    #[arg(long)]
    pub all: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
    Yaml,
}

fn main() {
    let cli = Cli::parse();
    let config = cli.config.as_deref();
    let profile = cli.profile.as_deref();
    let types_dir = cli.types_dir.as_deref();

    match cli.command {
        Commands::Doctor => cmd::doctor::run(config, profile, types_dir),
        Commands::Types => cmd::types::run(config, profile, types_dir),
        Commands::Describe(args) => cmd::describe::run(config, profile, types_dir, &args),
        Commands::Check(args) => cmd::check::run(config, profile, types_dir, &args),
    }
}
