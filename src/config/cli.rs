use crate::core::SearchCriteria;
use clap::{Args, Parser, Subcommand};

/// Flags shared by the three HTTP services.
#[derive(Debug, Clone, Args)]
pub struct ServiceArgs {
    /// Path to a TOML configuration file (environment variables are used when omitted)
    #[arg(short, long)]
    pub config: Option<String>,

    /// Port to listen on (overrides PORT and the config file)
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Debug, Clone, Parser)]
#[command(name = "octopets")]
#[command(about = "Search the pet sitter dataset or ask the recommendation agent")]
pub struct CliConfig {
    #[command(flatten)]
    pub service: ServiceArgs,

    /// Sitter dataset path (overrides SITTER_DATA_PATH and the config file)
    #[arg(long, global = true)]
    pub data_path: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Filter sitters and print the top matches as JSON
    Search(SearchArgs),
    /// Print one sitter record as JSON
    Show {
        /// Sitter ID
        id: i64,
    },
    /// Send a single request to the pet sitter agent
    Ask {
        /// The request, e.g. "dog walker in Seattle on Saturday under $30"
        #[arg(required = true, num_args = 1..)]
        query: Vec<String>,
    },
}

#[derive(Debug, Clone, Default, Args)]
pub struct SearchArgs {
    #[arg(long)]
    pub location: Option<String>,

    #[arg(long)]
    pub pet_type: Option<String>,

    #[arg(long)]
    pub service: Option<String>,

    /// Weekday name, matched case-sensitively (e.g. "Monday")
    #[arg(long = "day")]
    pub day_needed: Option<String>,

    /// Inclusive hourly rate limit; 0 only matches free sitters
    #[arg(long, value_parser = parse_rate)]
    pub max_rate: Option<f64>,

    #[arg(long)]
    pub specialization: Option<String>,
}

fn parse_rate(value: &str) -> Result<f64, String> {
    let rate: f64 = value
        .parse()
        .map_err(|e| format!("'{}' is not a number: {}", value, e))?;
    if !rate.is_finite() {
        return Err(format!("'{}' is not a finite rate", value));
    }
    Ok(rate)
}

impl From<SearchArgs> for SearchCriteria {
    fn from(args: SearchArgs) -> Self {
        SearchCriteria {
            location: args.location,
            pet_type: args.pet_type,
            service: args.service,
            day_needed: args.day_needed,
            max_rate: args.max_rate,
            specialization: args.specialization,
        }
        .normalized()
    }
}
