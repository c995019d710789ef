//! CLI argument definitions.

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};

#[derive(Parser)]
#[command(
    name = "ukstat",
    version,
    about = "Retrieve UK demographic and geographic reference data",
    long_about = "Retrieve population estimates, census tables and geography \
                  lookups for UK statistical areas.\n\n\
                  Area codes are classified automatically: each code is routed \
                  to the population series and census table variant that covers \
                  its geography."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for debug, -vv for trace, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,
}

#[derive(Subcommand)]
pub enum Command {
    /// Classify area codes: entity type, granularity and data routing.
    Classify(ClassifyArgs),

    /// Resolve a census table title to its upstream dataset.
    Resolve(ResolveArgs),

    /// Fetch mid-year population estimates.
    Population(PopulationArgs),

    /// Fetch a census table, reshaped to one row per area.
    Census(CensusArgs),

    /// Fetch the unified area-to-parent geography lookup.
    Lookup(LookupArgs),
}

#[derive(Parser)]
pub struct ClassifyArgs {
    /// Nine-character GSS area codes (e.g. E07000178).
    #[arg(value_name = "CODE", required = true)]
    pub codes: Vec<String>,
}

#[derive(Parser)]
pub struct ResolveArgs {
    /// Census table title (e.g. KS201EW).
    #[arg(value_name = "TITLE")]
    pub title: String,
}

#[derive(Parser)]
pub struct PopulationArgs {
    /// Nine-character GSS area codes.
    #[arg(value_name = "CODE", required = true)]
    pub codes: Vec<String>,

    /// Estimate year.
    #[arg(long, default_value_t = 2020)]
    pub year: i32,

    /// Sex: m, f or t.
    #[arg(long, default_value = "t")]
    pub sex: String,

    /// Output mode: count or percent.
    #[arg(long, default_value = "count")]
    pub mode: String,

    /// Restrict to an inclusive age range, e.g. 0-17.
    ///
    /// Only available for local authorities and larger areas.
    #[arg(long, value_name = "LOWER-UPPER")]
    pub ages: Option<String>,
}

#[derive(Parser)]
pub struct CensusArgs {
    /// Census table title (e.g. KS201EW).
    #[arg(value_name = "TITLE")]
    pub title: String,

    /// Nine-character GSS area codes.
    #[arg(value_name = "CODE", required = true)]
    pub codes: Vec<String>,

    /// Output mode: count or percent.
    #[arg(long, default_value = "count")]
    pub mode: String,
}

#[derive(Parser)]
pub struct LookupArgs {
    /// Region-based feature layer URL (covers England).
    #[arg(long = "region-url", value_name = "URL")]
    pub region_url: Option<String>,

    /// Nation-based feature layer URL (covers the whole UK).
    #[arg(long = "nation-url", value_name = "URL")]
    pub nation_url: Option<String>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
