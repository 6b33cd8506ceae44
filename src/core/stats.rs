use serde::Serialize;

/*-------------------------------------------------------------------------------------------------
  Aggregation Statistics
-------------------------------------------------------------------------------------------------*/

/// Metrics describing the aggregator's current contents and the most
/// recent [aggregate](crate::PrefixAggregator::aggregate) run.
#[derive(Clone, Copy, Debug, Default, Serialize)]
pub struct AggregationStats {
    /// Number of IPv4 prefixes currently held.
    pub ipv4_prefix_count: usize,

    /// Number of IPv6 prefixes currently held.
    pub ipv6_prefix_count: usize,

    /// Total prefixes across both families.
    pub total_prefixes: usize,

    /// Number of primary inputs accepted by the `add` operations. Include
    /// prefixes never bump this counter.
    pub original_count: usize,

    /// `1 - total_prefixes / original_count`, measured against the
    /// primary-input counter only. Zero until something has been added.
    pub reduction_ratio: f64,

    /// Wall-clock duration of the last `aggregate` call, in milliseconds.
    pub processing_time_ms: u64,

    /// Bytes of prefix storage owned by the aggregator.
    pub memory_usage_bytes: u64,
}

/*-------------------------------------------------------------------------------------------------
  Memory Statistics
-------------------------------------------------------------------------------------------------*/

/// Capacity-based accounting of every buffer the aggregator owns.
#[derive(Clone, Copy, Debug, Default, Serialize)]
pub struct MemoryStats {
    /// Total bytes across all buffers, including the aggregator struct.
    pub aggregator_bytes: u64,

    /// Bytes held by the two result sequences.
    pub prefix_bytes: u64,

    /// Bytes held by the include lists.
    pub include_bytes: u64,

    /// Bytes held by the exclude lists.
    pub exclude_bytes: u64,

    /// Bytes held by the merge-pass scratch buffer.
    pub scratch_bytes: u64,
}
