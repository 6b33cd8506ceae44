use crate::cli::utils::format_bytes;
use comfy_table::presets::NOTHING;
use comfy_table::{Cell, CellAlignment, ContentArrangement, Table};
use prefixagg::{AggregationStats, MemoryStats};

/*-------------------------------------------------------------------------------------------------
  Output Functions
-------------------------------------------------------------------------------------------------*/

/*
    Statistics go to stderr so they never mix with the aggregated prefix
    list on stdout.
*/

/*--------------------------------------------------------------------------------------
  Aggregation Statistics
--------------------------------------------------------------------------------------*/

pub fn stats_table(stats: &AggregationStats) {
    let mut table = new_label_value_table();

    table.add_row(vec![
        Cell::new("Original prefixes"),
        Cell::new(stats.original_count),
    ]);
    table.add_row(vec![
        Cell::new("Aggregated prefixes"),
        Cell::new(stats.total_prefixes),
    ]);
    table.add_row(vec![
        Cell::new("IPv4 prefixes"),
        Cell::new(stats.ipv4_prefix_count),
    ]);
    table.add_row(vec![
        Cell::new("IPv6 prefixes"),
        Cell::new(stats.ipv6_prefix_count),
    ]);
    table.add_row(vec![
        Cell::new("Reduction ratio"),
        Cell::new(format!("{:.2}%", stats.reduction_ratio * 100.0)),
    ]);
    table.add_row(vec![
        Cell::new("Processing time"),
        Cell::new(format!("{} ms", stats.processing_time_ms)),
    ]);
    table.add_row(vec![
        Cell::new("Memory usage"),
        Cell::new(format_bytes(stats.memory_usage_bytes)),
    ]);

    align_value_column(&mut table);

    eprintln!("\nAggregation Statistics:");
    eprintln!("{table}");
}

/*--------------------------------------------------------------------------------------
  Memory Statistics
--------------------------------------------------------------------------------------*/

pub fn memory_table(memory: &MemoryStats) {
    let mut table = new_label_value_table();

    table.add_row(vec![
        Cell::new("Aggregator memory"),
        Cell::new(format_bytes(memory.aggregator_bytes)),
    ]);
    table.add_row(vec![
        Cell::new("Prefix sequences"),
        Cell::new(format_bytes(memory.prefix_bytes)),
    ]);
    table.add_row(vec![
        Cell::new("Include lists"),
        Cell::new(format_bytes(memory.include_bytes)),
    ]);
    table.add_row(vec![
        Cell::new("Exclude lists"),
        Cell::new(format_bytes(memory.exclude_bytes)),
    ]);
    table.add_row(vec![
        Cell::new("Scratch buffer"),
        Cell::new(format_bytes(memory.scratch_bytes)),
    ]);

    align_value_column(&mut table);

    eprintln!("\nMemory Statistics:");
    eprintln!("{table}");
}

/*--------------------------------------------------------------------------------------
  Table Construction
--------------------------------------------------------------------------------------*/

fn new_label_value_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(NOTHING)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

fn align_value_column(table: &mut Table) {
    let column = table.column_mut(1).expect("The value column exists");
    column.set_cell_alignment(CellAlignment::Right);
}
