use crate::core::algorithms;
use crate::core::errors::{Error, Result};
use crate::core::exclusion;
use crate::core::prefix::IpPrefix;
use crate::core::prefix_type::PrefixType;
use crate::core::stats::{AggregationStats, MemoryStats};
use log::{debug, trace};
use parking_lot::RwLock;
use std::env;
use std::fs::File;
use std::io::{BufRead, BufReader, Write};
use std::mem;
use std::path::Path;
use std::time::{Duration, Instant};

/*-------------------------------------------------------------------------------------------------
  Prefix Aggregator
-------------------------------------------------------------------------------------------------*/

type WarningHandler = Box<dyn Fn(&str) + Send + Sync + 'static>;

/// Aggregates IPv4 and IPv6 CIDR prefixes into a minimal set of disjoint
/// prefixes covering the same address space, subject to per-family
/// minimum-length floors, an include set, and an exclude set.
///
/// The aggregator is safe to share between threads: read operations take a
/// shared lock and return defensive copies, while mutating operations hold
/// an exclusive lock for their entire duration. The warning handler is
/// invoked while the exclusive lock is held, so handlers must not call
/// back into the aggregator.
///
/// ```
/// # fn main() -> prefixagg::Result<()> {
/// let aggregator = prefixagg::PrefixAggregator::new();
/// aggregator.add("192.168.0.0/24")?;
/// aggregator.add("192.168.1.0/24")?;
/// aggregator.aggregate()?;
/// assert_eq!(aggregator.get_prefixes(), vec!["192.168.0.0/23"]);
/// # Ok(())
/// # }
/// ```
#[derive(Default)]
pub struct PrefixAggregator {
    state: RwLock<AggregatorState>,
}

#[derive(Default)]
struct AggregatorState {
    ipv4_prefixes: Vec<IpPrefix>,
    ipv6_prefixes: Vec<IpPrefix>,
    include_ipv4: Vec<IpPrefix>,
    include_ipv6: Vec<IpPrefix>,
    exclude_ipv4: Vec<IpPrefix>,
    exclude_ipv6: Vec<IpPrefix>,
    min_prefix_len_ipv4: u8,
    min_prefix_len_ipv6: u8,
    original_count: usize,
    last_process_time: Duration,
    warnings: Vec<String>,
    warning_handler: Option<WarningHandler>,
    scratch: Vec<IpPrefix>,
}

impl PrefixAggregator {
    /// Create an empty aggregator with no floors, includes, or excludes.
    pub fn new() -> Self {
        Self::default()
    }

    /*-------------------------------------------------------------------------
      Loading Prefixes
    -------------------------------------------------------------------------*/

    /// Add one prefix to the primary set. Accepts CIDR notation or a bare
    /// address (treated as a host route). Bumps the original-input counter
    /// used for the reduction-ratio metric.
    pub fn add(&self, prefix: &str) -> Result<()> {
        let parsed: IpPrefix = prefix.parse()?;
        self.state.write().push_primary(parsed);
        Ok(())
    }

    /// Add a batch of prefixes to the primary set, stopping at the first
    /// parse failure.
    pub fn add_many<I, S>(&self, prefixes: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut state = self.state.write();
        for prefix in prefixes {
            let parsed: IpPrefix = prefix.as_ref().parse()?;
            state.push_primary(parsed);
        }
        Ok(())
    }

    /// Read prefixes from a stream, one per line.
    ///
    /// Lines are trimmed; empty lines, `#` comments, and the bare header
    /// tokens `network`, `prefix`, and `cidr` are skipped. Lines without a
    /// `/` are promoted to host routes when they look like an address
    /// (`:` means `/128`, exactly three `.` means `/32`); anything else is
    /// dropped, as are lines that fail to parse. Only an I/O failure of
    /// the underlying stream produces an error.
    pub fn add_from_reader<R: BufRead>(&self, reader: R) -> Result<()> {
        let mut state = self.state.write();

        for line in reader.lines() {
            let line = line?;
            let line = line.trim();

            if line.is_empty()
                || line.starts_with('#')
                || matches!(line, "network" | "prefix" | "cidr")
            {
                continue;
            }

            let parsed: Result<IpPrefix> = if line.contains('/') {
                line.parse()
            } else if line.contains(':') {
                format!("{line}/128").parse()
            } else if line.matches('.').count() == 3 {
                format!("{line}/32").parse()
            } else {
                continue;
            };

            match parsed {
                Ok(prefix) => state.push_primary(prefix),
                Err(_) => trace!("skipping unparseable line: {line:?}"),
            }
        }

        Ok(())
    }

    /// Read prefixes from a file with [add_from_reader](Self::add_from_reader)
    /// semantics. A missing path reports [Error::FileNotFound].
    pub fn add_from_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::FileNotFound(path.to_path_buf()));
        }

        let file = File::open(path)?;
        self.add_from_reader(BufReader::new(file))
    }

    /*-------------------------------------------------------------------------
      Configuration
    -------------------------------------------------------------------------*/

    /// Set the per-family minimum prefix lengths. Zero disables the floor
    /// for that family. During aggregation every prefix more specific than
    /// the floor is replaced by its covering prefix at the floor length.
    pub fn set_min_prefix_length(&self, ipv4_len: u8, ipv6_len: u8) -> Result<()> {
        if ipv4_len > 32 {
            return Err(Error::InvalidMinPrefixLen(format!(
                "IPv4 length must be 0-32, got {ipv4_len}"
            )));
        }
        if ipv6_len > 128 {
            return Err(Error::InvalidMinPrefixLen(format!(
                "IPv6 length must be 0-128, got {ipv6_len}"
            )));
        }

        let mut state = self.state.write();
        state.min_prefix_len_ipv4 = ipv4_len;
        state.min_prefix_len_ipv6 = ipv6_len;
        Ok(())
    }

    /// Replace the include set. Include prefixes join the working universe
    /// at the start of every aggregation but do not bump the
    /// original-input counter. A parse failure leaves the previous include
    /// set untouched.
    pub fn set_include_prefixes<I, S>(&self, prefixes: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let (ipv4, ipv6) = parse_prefix_list(prefixes)?;

        let mut state = self.state.write();
        state.include_ipv4 = ipv4;
        state.include_ipv6 = ipv6;
        Ok(())
    }

    /// Replace the exclude set. Exclusions are subtracted from the
    /// aggregated result, fragmenting any touched prefix into the minimal
    /// CIDR cover of its remainder. A parse failure leaves the previous
    /// exclude set untouched.
    pub fn set_exclude_prefixes<I, S>(&self, prefixes: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let (ipv4, ipv6) = parse_prefix_list(prefixes)?;

        let mut state = self.state.write();
        state.exclude_ipv4 = ipv4;
        state.exclude_ipv6 = ipv6;
        Ok(())
    }

    /// Install a handler invoked with each warning as it is produced.
    /// The handler runs while the aggregator's exclusive lock is held and
    /// must not call back into the aggregator.
    pub fn set_warning_handler<F>(&self, handler: F)
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        self.state.write().warning_handler = Some(Box::new(handler));
    }

    /// Remove the warning handler. Warnings continue to accumulate in the
    /// aggregator either way.
    pub fn clear_warning_handler(&self) {
        self.state.write().warning_handler = None;
    }

    /*-------------------------------------------------------------------------
      Aggregation
    -------------------------------------------------------------------------*/

    /// Run the aggregation pipeline: merge in the include set, enforce the
    /// minimum-length floors, sort and deduplicate, merge to a fixed
    /// point, apply the exclusions, and restore the sequence invariants.
    ///
    /// On failure the aggregator may hold partially transformed sequences;
    /// callers should [reset](Self::reset) it before further use.
    pub fn aggregate(&self) -> Result<()> {
        let start = Instant::now();
        let mut state = self.state.write();

        state.aggregate()?;

        state.last_process_time = start.elapsed();
        debug!(
            "aggregation completed in {:?}: {} IPv4, {} IPv6 prefixes",
            state.last_process_time,
            state.ipv4_prefixes.len(),
            state.ipv6_prefixes.len()
        );
        Ok(())
    }

    /// Clear every input, result, configuration value, and diagnostic,
    /// returning the aggregator to its freshly constructed state.
    pub fn reset(&self) {
        let mut state = self.state.write();
        let warning_handler = state.warning_handler.take();
        *state = AggregatorState {
            warning_handler,
            ..AggregatorState::default()
        };
    }

    /*-------------------------------------------------------------------------
      Results and Diagnostics
    -------------------------------------------------------------------------*/

    /// Snapshot of the current prefixes in canonical text form, IPv4
    /// entries before IPv6 entries, each family in ascending order.
    pub fn get_prefixes(&self) -> Vec<String> {
        let state = self.state.read();

        let mut result = Vec::with_capacity(state.ipv4_prefixes.len() + state.ipv6_prefixes.len());
        result.extend(state.ipv4_prefixes.iter().map(|prefix| prefix.to_string()));
        result.extend(state.ipv6_prefixes.iter().map(|prefix| prefix.to_string()));
        result
    }

    /// Snapshot of the current IPv4 prefixes in ascending order.
    pub fn get_ipv4_prefixes(&self) -> Vec<String> {
        let state = self.state.read();
        state.ipv4_prefixes.iter().map(|prefix| prefix.to_string()).collect()
    }

    /// Snapshot of the current IPv6 prefixes in ascending order.
    pub fn get_ipv6_prefixes(&self) -> Vec<String> {
        let state = self.state.read();
        state.ipv6_prefixes.iter().map(|prefix| prefix.to_string()).collect()
    }

    /// Metrics for the current contents and the last aggregation run.
    pub fn get_stats(&self) -> AggregationStats {
        let state = self.state.read();

        let ipv4_prefix_count = state.ipv4_prefixes.len();
        let ipv6_prefix_count = state.ipv6_prefixes.len();
        let total_prefixes = ipv4_prefix_count + ipv6_prefix_count;

        let reduction_ratio = if state.original_count > 0 {
            1.0 - (total_prefixes as f64 / state.original_count as f64)
        } else {
            0.0
        };

        AggregationStats {
            ipv4_prefix_count,
            ipv6_prefix_count,
            total_prefixes,
            original_count: state.original_count,
            reduction_ratio,
            processing_time_ms: state.last_process_time.as_millis() as u64,
            memory_usage_bytes: state.memory_usage(),
        }
    }

    /// Capacity-based accounting of the aggregator's buffers.
    pub fn get_memory_stats(&self) -> MemoryStats {
        let state = self.state.read();

        let prefix_bytes = slice_bytes(&state.ipv4_prefixes) + slice_bytes(&state.ipv6_prefixes);
        let include_bytes = slice_bytes(&state.include_ipv4) + slice_bytes(&state.include_ipv6);
        let exclude_bytes = slice_bytes(&state.exclude_ipv4) + slice_bytes(&state.exclude_ipv6);
        let scratch_bytes = slice_bytes(&state.scratch);

        MemoryStats {
            aggregator_bytes: state.memory_usage(),
            prefix_bytes,
            include_bytes,
            exclude_bytes,
            scratch_bytes,
        }
    }

    /// Copy of the warnings produced by the last aggregation run.
    pub fn get_warnings(&self) -> Vec<String> {
        self.state.read().warnings.clone()
    }

    /*-------------------------------------------------------------------------
      Output
    -------------------------------------------------------------------------*/

    /// Write the current prefix set to `writer`, one prefix per line,
    /// IPv4 entries before IPv6 entries.
    pub fn write_to_writer<W: Write>(&self, writer: &mut W) -> Result<()> {
        let state = self.state.read();

        for prefix in state.ipv4_prefixes.iter().chain(state.ipv6_prefixes.iter()) {
            writeln!(writer, "{prefix}")?;
        }

        Ok(())
    }

    /// Write the current prefix set to a file, creating or truncating it.
    pub fn write_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let mut file = File::create(path)?;
        self.write_to_writer(&mut file)
    }
}

/*--------------------------------------------------------------------------------------
  Aggregator State
--------------------------------------------------------------------------------------*/

impl AggregatorState {
    fn push_primary(&mut self, prefix: IpPrefix) {
        match prefix.prefix_type() {
            PrefixType::IPv4 => self.ipv4_prefixes.push(prefix),
            PrefixType::IPv6 => self.ipv6_prefixes.push(prefix),
        }
        self.original_count += 1;
    }

    fn add_warning(&mut self, warning: String) {
        if let Some(handler) = &self.warning_handler {
            handler(&warning);
        }
        self.warnings.push(warning);
    }

    fn aggregate(&mut self) -> Result<()> {
        self.warnings.clear();

        // Includes join the working universe before any other step so they
        // participate fully in rounding and merging.
        self.ipv4_prefixes.extend_from_slice(&self.include_ipv4);
        self.ipv6_prefixes.extend_from_slice(&self.include_ipv6);

        algorithms::enforce_min_prefix_length(&mut self.ipv4_prefixes, self.min_prefix_len_ipv4);
        algorithms::enforce_min_prefix_length(&mut self.ipv6_prefixes, self.min_prefix_len_ipv6);

        algorithms::sort_and_deduplicate(&mut self.ipv4_prefixes);
        algorithms::sort_and_deduplicate(&mut self.ipv6_prefixes);

        algorithms::aggregate_prefixes(&mut self.ipv4_prefixes, &mut self.scratch)?;
        algorithms::aggregate_prefixes(&mut self.ipv6_prefixes, &mut self.scratch)?;

        self.process_exclusions(PrefixType::IPv4);
        self.process_exclusions(PrefixType::IPv6);

        algorithms::sort_and_deduplicate(&mut self.ipv4_prefixes);
        algorithms::sort_and_deduplicate(&mut self.ipv6_prefixes);

        Ok(())
    }

    fn process_exclusions(&mut self, prefix_type: PrefixType) {
        let excludes = match prefix_type {
            PrefixType::IPv4 => self.exclude_ipv4.clone(),
            PrefixType::IPv6 => self.exclude_ipv6.clone(),
        };
        if excludes.is_empty() {
            return;
        }

        let mut prefixes = match prefix_type {
            PrefixType::IPv4 => mem::take(&mut self.ipv4_prefixes),
            PrefixType::IPv6 => mem::take(&mut self.ipv6_prefixes),
        };

        for exclude in &excludes {
            if let Some(warning) = exclusion::specificity_warning(exclude) {
                self.add_warning(warning);
            }
            exclusion::apply_exclusion(&mut prefixes, exclude);
        }

        match prefix_type {
            PrefixType::IPv4 => self.ipv4_prefixes = prefixes,
            PrefixType::IPv6 => self.ipv6_prefixes = prefixes,
        }
    }

    fn memory_usage(&self) -> u64 {
        mem::size_of::<Self>() as u64
            + slice_bytes(&self.ipv4_prefixes)
            + slice_bytes(&self.ipv6_prefixes)
            + slice_bytes(&self.include_ipv4)
            + slice_bytes(&self.include_ipv6)
            + slice_bytes(&self.exclude_ipv4)
            + slice_bytes(&self.exclude_ipv6)
            + slice_bytes(&self.scratch)
            + self.warnings.iter().map(|warning| warning.len() as u64).sum::<u64>()
    }
}

fn slice_bytes(prefixes: &Vec<IpPrefix>) -> u64 {
    (mem::size_of::<Vec<IpPrefix>>() + prefixes.capacity() * mem::size_of::<IpPrefix>()) as u64
}

fn parse_prefix_list<I, S>(prefixes: I) -> Result<(Vec<IpPrefix>, Vec<IpPrefix>)>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut ipv4 = Vec::new();
    let mut ipv6 = Vec::new();

    for prefix in prefixes {
        let parsed: IpPrefix = prefix.as_ref().parse()?;
        match parsed.prefix_type() {
            PrefixType::IPv4 => ipv4.push(parsed),
            PrefixType::IPv6 => ipv6.push(parsed),
        }
    }

    Ok((ipv4, ipv6))
}

/*-------------------------------------------------------------------------------------------------
  Aggregator Builder
-------------------------------------------------------------------------------------------------*/

/// A builder for [PrefixAggregator] that collects configuration up front.
///
/// ```
/// # fn main() -> prefixagg::Result<()> {
/// let aggregator = prefixagg::AggregatorBuilder::new()
///     .min_ipv4_length(24)
///     .min_ipv6_length(48)
///     .exclude_prefixes(["192.168.0.0/16"])
///     .build()?;
/// # Ok(())
/// # }
/// ```
///
/// [AggregatorBuilder::new] sources the minimum prefix lengths from the
/// `PREFIXAGG_MIN_IPV4` and `PREFIXAGG_MIN_IPV6` environment variables
/// when set. Use [AggregatorBuilder::default] to ignore the environment.
#[derive(Clone, Debug, Default)]
pub struct AggregatorBuilder {
    min_ipv4_len: u8,
    min_ipv6_len: u8,
    include_prefixes: Vec<String>,
    exclude_prefixes: Vec<String>,
}

impl AggregatorBuilder {
    /// Create a builder, reading initial floor values from the environment
    /// variables `PREFIXAGG_MIN_IPV4` and `PREFIXAGG_MIN_IPV6` when they
    /// are set and parseable.
    pub fn new() -> Self {
        let mut builder = Self::default();

        if let Ok(value) = env::var("PREFIXAGG_MIN_IPV4") {
            if let Ok(len) = value.parse() {
                builder.min_ipv4_len = len;
            }
        }
        if let Ok(value) = env::var("PREFIXAGG_MIN_IPV6") {
            if let Ok(len) = value.parse() {
                builder.min_ipv6_len = len;
            }
        }

        builder
    }

    /// Minimum IPv4 prefix length (0 disables the floor).
    pub fn min_ipv4_length(mut self, len: u8) -> Self {
        self.min_ipv4_len = len;
        self
    }

    /// Minimum IPv6 prefix length (0 disables the floor).
    pub fn min_ipv6_length(mut self, len: u8) -> Self {
        self.min_ipv6_len = len;
        self
    }

    /// Prefixes to merge into every aggregation.
    pub fn include_prefixes<I, S>(mut self, prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.include_prefixes = prefixes.into_iter().map(|p| p.as_ref().to_string()).collect();
        self
    }

    /// Prefixes to subtract from every aggregation.
    pub fn exclude_prefixes<I, S>(mut self, prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.exclude_prefixes = prefixes.into_iter().map(|p| p.as_ref().to_string()).collect();
        self
    }

    /// Validate the configuration and produce the aggregator.
    pub fn build(self) -> Result<PrefixAggregator> {
        let aggregator = PrefixAggregator::new();
        aggregator.set_min_prefix_length(self.min_ipv4_len, self.min_ipv6_len)?;

        if !self.include_prefixes.is_empty() {
            aggregator.set_include_prefixes(&self.include_prefixes)?;
        }
        if !self.exclude_prefixes.is_empty() {
            aggregator.set_exclude_prefixes(&self.exclude_prefixes)?;
        }

        Ok(aggregator)
    }
}

/*-------------------------------------------------------------------------------------------------
  Unit Tests
-------------------------------------------------------------------------------------------------*/
