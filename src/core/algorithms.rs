use crate::core::errors::{Error, Result};
use crate::core::prefix::IpPrefix;

/*-------------------------------------------------------------------------------------------------
  Aggregation Algorithms
-------------------------------------------------------------------------------------------------*/

/// Safety cap on merge passes. Production inputs converge in a handful of
/// passes; hitting this cap indicates an implementation bug.
pub(crate) const MAX_AGGREGATION_ITERATIONS: u32 = 5000;

/*--------------------------------------------------------------------------------------
  Sort and Deduplicate
--------------------------------------------------------------------------------------*/

/// Sort ascending by range start and drop consecutive entries with an
/// identical range. Ties on `min` can only occur pre-dedup, so the
/// unstable sort is fine.
pub(crate) fn sort_and_deduplicate(prefixes: &mut Vec<IpPrefix>) {
    if prefixes.len() <= 1 {
        return;
    }

    prefixes.sort_unstable_by_key(|prefix| prefix.min());
    prefixes.dedup_by(|a, b| a.min() == b.min() && a.max() == b.max());
}

/*--------------------------------------------------------------------------------------
  Minimum Prefix Length Enforcement
--------------------------------------------------------------------------------------*/

/// Replace every prefix more specific than `floor` with its covering
/// prefix at the floor length. Runs before the merge pass so that the
/// collapsed specifics fall out as ordinary duplicates and containments.
/// A floor of zero disables enforcement.
pub(crate) fn enforce_min_prefix_length(prefixes: &mut [IpPrefix], floor: u8) {
    if floor == 0 {
        return;
    }

    for prefix in prefixes.iter_mut() {
        if prefix.bits() > floor {
            *prefix = prefix.rounded_to(floor);
        }
    }
}

/*--------------------------------------------------------------------------------------
  Fixed-Point Merge
--------------------------------------------------------------------------------------*/

/// Repeat single merge passes until one makes no change.
///
/// A pass walks the sorted sequence with a two-element window, eliminating
/// containments and merging adjacent or overlapping neighbours whose union
/// is a valid aligned CIDR block. Merging two equal-size neighbours can
/// align the result for a further merge with its own neighbour, so one
/// pass is not always enough; the pass count is bounded by the family
/// width in theory and stays in the single digits in practice.
///
/// `scratch` is the output buffer for each pass; its allocation is reused
/// across passes and across aggregations.
pub(crate) fn aggregate_prefixes(prefixes: &mut Vec<IpPrefix>, scratch: &mut Vec<IpPrefix>) -> Result<()> {
    if prefixes.len() <= 1 {
        return Ok(());
    }

    let mut changed = true;
    let mut iterations = 0u32;

    while changed {
        if iterations >= MAX_AGGREGATION_ITERATIONS {
            return Err(Error::AggregationDivergence(iterations));
        }
        changed = false;
        iterations += 1;

        scratch.clear();
        let mut i = 0;

        while i < prefixes.len() {
            let current = prefixes[i];

            if i == prefixes.len() - 1 {
                scratch.push(current);
                break;
            }

            let next = prefixes[i + 1];

            if current.contains(&next) {
                scratch.push(current);
                i += 2;
                changed = true;
            } else if next.contains(&current) {
                scratch.push(next);
                i += 2;
                changed = true;
            } else if current.is_adjacent_to(&next) || current.overlaps(&next) {
                match current.merge(&next) {
                    Some(merged) => {
                        scratch.push(merged);
                        i += 2;
                        changed = true;
                    }
                    None => {
                        scratch.push(current);
                        i += 1;
                    }
                }
            } else {
                scratch.push(current);
                i += 1;
            }
        }

        std::mem::swap(prefixes, scratch);
    }

    Ok(())
}

/*-------------------------------------------------------------------------------------------------
  Unit Tests
-------------------------------------------------------------------------------------------------*/
