use crate::cli;
use log::info;
use prefixagg::{PrefixAggregator, Result};
use std::io;

/*-------------------------------------------------------------------------------------------------
  Core Functions
-------------------------------------------------------------------------------------------------*/

/*--------------------------------------------------------------------------------------
  Run the Aggregation
--------------------------------------------------------------------------------------*/

pub fn run(args: &cli::Args) -> Result<()> {
    let aggregator = PrefixAggregator::new();

    // Configuration
    if args.min_ipv4 > 0 || args.min_ipv6 > 0 {
        info!(
            "Setting minimum prefix lengths: IPv4={}, IPv6={}",
            args.min_ipv4, args.min_ipv6
        );
        aggregator.set_min_prefix_length(args.min_ipv4, args.min_ipv6)?;
    }

    let include_prefixes = cli::utils::gather_prefix_list(&args.include, &args.include_prefix)?;
    if !include_prefixes.is_empty() {
        info!("Loaded {} include prefixes", include_prefixes.len());
        aggregator.set_include_prefixes(&include_prefixes)?;
    }

    let exclude_prefixes = cli::utils::gather_prefix_list(&args.exclude, &args.exclude_prefix)?;
    if !exclude_prefixes.is_empty() {
        info!("Loaded {} exclude prefixes", exclude_prefixes.len());
        aggregator.set_exclude_prefixes(&exclude_prefixes)?;
    }

    // Warnings stream to stderr as they are produced.
    aggregator.set_warning_handler(|warning| eprintln!("{warning}"));

    // Load the primary input.
    info!("Loading prefixes from {}", args.input.display());
    aggregator.add_from_file(&args.input)?;

    let loaded = aggregator.get_stats();
    info!(
        "Loaded {} prefixes ({} IPv4, {} IPv6)",
        loaded.original_count, loaded.ipv4_prefix_count, loaded.ipv6_prefix_count
    );

    // Aggregate.
    info!("Performing aggregation...");
    aggregator.aggregate()?;

    let stats = aggregator.get_stats();

    // Write the result.
    match &args.output {
        Some(path) => {
            aggregator.write_to_file(path)?;
            info!("Wrote {} aggregated prefixes to {}", stats.total_prefixes, path.display());
        }
        None => {
            let stdout = io::stdout();
            aggregator.write_to_writer(&mut stdout.lock())?;
        }
    }

    // Diagnostics.
    if args.stats {
        cli::output::stats_table(&stats);
    }

    if args.memory {
        cli::output::memory_table(&aggregator.get_memory_stats());
    }

    Ok(())
}
