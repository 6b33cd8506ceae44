use clap::Parser;
use std::path::PathBuf;

/*-------------------------------------------------------------------------------------------------
  Command Line Interface (CLI) Arguments
-------------------------------------------------------------------------------------------------*/

#[derive(Parser, Debug)]
#[command(author, version, about = "Aggregate IPv4 and IPv6 CIDR prefixes.", long_about = None)]
pub struct Args {
    /// Input file containing IP prefixes, one per line
    #[arg(short, long)]
    pub input: PathBuf,

    /// Output file for aggregated prefixes (default: stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Minimum IPv4 prefix length (0-32, 0 disables)
    #[arg(long = "min-ipv4", value_name = "LEN", default_value_t = 0)]
    pub min_ipv4: u8,

    /// Minimum IPv6 prefix length (0-128, 0 disables)
    #[arg(long = "min-ipv6", value_name = "LEN", default_value_t = 0)]
    pub min_ipv6: u8,

    /// File containing prefixes to include
    #[arg(long, value_name = "FILE")]
    pub include: Option<PathBuf>,

    /// File containing prefixes to exclude
    #[arg(long, value_name = "FILE")]
    pub exclude: Option<PathBuf>,

    /// Comma-separated list of prefixes to include
    #[arg(long = "include-prefix", value_name = "LIST")]
    pub include_prefix: Option<String>,

    /// Comma-separated list of prefixes to exclude
    #[arg(long = "exclude-prefix", value_name = "LIST")]
    pub exclude_prefix: Option<String>,

    /// Show aggregation statistics
    #[arg(long)]
    pub stats: bool,

    /// Show memory usage statistics
    #[arg(long)]
    pub memory: bool,

    /// Logging verbosity
    #[command(flatten)]
    pub verbose: clap_verbosity_flag::Verbosity,
}
