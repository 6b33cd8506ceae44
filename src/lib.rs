//! Aggregate IPv4 and IPv6 CIDR prefixes into a minimal, canonical set of
//! disjoint prefixes covering the same address space.
//!
//! The [PrefixAggregator] collects prefixes from strings, readers, or
//! files, then [aggregates](PrefixAggregator::aggregate) them under three
//! orthogonal constraints: per-family minimum prefix lengths, an include
//! set merged into the working universe, and an exclude set subtracted
//! from the aggregated result.
//!
//! ```
//! # fn main() -> prefixagg::Result<()> {
//! let aggregator = prefixagg::PrefixAggregator::new();
//! aggregator.add_many(["192.168.0.0/24", "192.168.1.0/24", "2001:db8::/64"])?;
//! aggregator.set_exclude_prefixes(["192.168.0.0/26"])?;
//! aggregator.aggregate()?;
//!
//! assert_eq!(
//!     aggregator.get_prefixes(),
//!     vec!["192.168.0.64/26", "192.168.0.128/25", "192.168.1.0/24", "2001:db8::/64"]
//! );
//! # Ok(())
//! # }
//! ```

mod core;

/*-------------------------------------------------------------------------------------------------
  Library Interface
-------------------------------------------------------------------------------------------------*/

pub use crate::core::aggregator::{AggregatorBuilder, PrefixAggregator};
pub use crate::core::errors::{Error, Result};
pub use crate::core::prefix::IpPrefix;
pub use crate::core::prefix_type::PrefixType;
pub use crate::core::stats::{AggregationStats, MemoryStats};
