use crate::core::decompose::decompose_range;
use crate::core::prefix::IpPrefix;
use std::ops::Range;

/*-------------------------------------------------------------------------------------------------
  Exclusion Engine
-------------------------------------------------------------------------------------------------*/

/*
    Exclusions run after the initial aggregation pass, so the sequence is
    sorted, disjoint, and CIDR-aligned when each exclusion is applied. The
    replacement fragments produced here are themselves aligned, disjoint,
    and confined to the span of the entries they replace, which keeps the
    sequence invariants intact for the next exclusion's binary search.
*/

/// Warning text for an exclusion more specific than the per-family
/// recommended floor (/30 for IPv4, /64 for IPv6). Such exclusions are
/// still processed; they just fragment the result badly.
pub(crate) fn specificity_warning(exclude: &IpPrefix) -> Option<String> {
    let recommended = exclude.prefix_type().recommended_min_exclusion();
    if exclude.bits() > recommended {
        Some(format!(
            "WARNING: {} exclusion {} is more specific than recommended /{}. \
             This may significantly impact aggregation efficiency.",
            exclude.prefix_type(),
            exclude,
            recommended
        ))
    } else {
        None
    }
}

/// Subtract `exclude` from the sorted, disjoint sequence, rebuilding the
/// complement of the exclusion within every touched entry.
pub(crate) fn apply_exclusion(prefixes: &mut Vec<IpPrefix>, exclude: &IpPrefix) {
    let Some(range) = find_overlapping_range(prefixes, exclude) else {
        return;
    };

    let mut replacement = Vec::new();
    for overlapping in &prefixes[range.clone()] {
        if exclude.contains(overlapping) {
            // Entirely excluded; drop it.
            continue;
        }

        if overlapping.contains(exclude) {
            create_complement(overlapping, exclude, &mut replacement);
        } else if overlapping.overlaps(exclude) {
            trim_overlap(overlapping, exclude, &mut replacement);
        } else {
            // The candidate window can be wider than the true overlap set.
            replacement.push(*overlapping);
        }
    }

    prefixes.splice(range, replacement);
    prefixes.sort_unstable_by_key(|prefix| prefix.min());
}

/// Locate the entries overlapping `target` with a binary search over the
/// sorted sequence: find the rightmost entry whose `min` is at most
/// `target.max`, then walk left while ranges still reach `target.min`.
fn find_overlapping_range(prefixes: &[IpPrefix], target: &IpPrefix) -> Option<Range<usize>> {
    if prefixes.is_empty() {
        return None;
    }

    let upper = prefixes.partition_point(|prefix| prefix.min() <= target.max());
    if upper == 0 {
        return None;
    }

    let mut lower = upper;
    while lower > 0 && prefixes[lower - 1].max() >= target.min() {
        lower -= 1;
    }

    if lower == upper {
        None
    } else {
        Some(lower..upper)
    }
}

/// The residue of `container` minus `exclude`, as an optimal CIDR cover of
/// the ranges on either side of the exclusion. Either side may be empty.
fn create_complement(container: &IpPrefix, exclude: &IpPrefix, out: &mut Vec<IpPrefix>) {
    let prefix_type = container.prefix_type();

    if container.min() < exclude.min() {
        decompose_range(prefix_type, container.min(), exclude.min() - 1, out);
    }

    if exclude.max() < container.max() {
        decompose_range(prefix_type, exclude.max() + 1, container.max(), out);
    }
}

/// Partial overlap: keep the one side of `original` that `exclude` does
/// not reach.
fn trim_overlap(original: &IpPrefix, exclude: &IpPrefix, out: &mut Vec<IpPrefix>) {
    let prefix_type = original.prefix_type();

    if exclude.min() <= original.min() && exclude.max() < original.max() {
        decompose_range(prefix_type, exclude.max() + 1, original.max(), out);
    } else if exclude.min() > original.min() && exclude.max() >= original.max() {
        decompose_range(prefix_type, original.min(), exclude.min() - 1, out);
    }
}

/*-------------------------------------------------------------------------------------------------
  Unit Tests
-------------------------------------------------------------------------------------------------*/

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::prefix::tests::prefix;

    fn prefixes(texts: &[&str]) -> Vec<IpPrefix> {
        texts.iter().map(|text| prefix(text)).collect()
    }

    fn strings(prefixes: &[IpPrefix]) -> Vec<String> {
        prefixes.iter().map(|p| p.to_string()).collect()
    }

    /*----------------------------------------------------------------------------------
      Overlap Search
    ----------------------------------------------------------------------------------*/

    #[test]
    fn test_find_overlapping_range() {
        let seq = prefixes(&["10.0.0.0/24", "10.0.2.0/24", "10.0.4.0/24", "10.0.6.0/24"]);

        assert_eq!(find_overlapping_range(&seq, &prefix("10.0.2.0/24")), Some(1..2));
        assert_eq!(find_overlapping_range(&seq, &prefix("10.0.0.0/21")), Some(0..4));
        assert_eq!(find_overlapping_range(&seq, &prefix("10.0.4.0/23")), Some(2..3));
        // Below, between, and above every entry.
        assert_eq!(find_overlapping_range(&seq, &prefix("9.0.0.0/24")), None);
        assert_eq!(find_overlapping_range(&seq, &prefix("10.0.1.0/24")), None);
        assert_eq!(find_overlapping_range(&seq, &prefix("10.0.8.0/24")), None);
        assert_eq!(find_overlapping_range(&[], &prefix("10.0.0.0/8")), None);
    }

    /*----------------------------------------------------------------------------------
      Applying Exclusions
    ----------------------------------------------------------------------------------*/

    #[test]
    fn test_exclude_half_of_block() {
        let mut seq = prefixes(&["192.168.0.0/24"]);
        apply_exclusion(&mut seq, &prefix("192.168.0.0/25"));
        assert_eq!(strings(&seq), vec!["192.168.0.128/25"]);
    }

    #[test]
    fn test_exclude_interior_fragmenting_block() {
        let mut seq = prefixes(&["192.168.0.0/16"]);
        apply_exclusion(&mut seq, &prefix("192.168.1.0/24"));
        assert_eq!(
            strings(&seq),
            vec![
                "192.168.0.0/24",
                "192.168.2.0/23",
                "192.168.4.0/22",
                "192.168.8.0/21",
                "192.168.16.0/20",
                "192.168.32.0/19",
                "192.168.64.0/18",
                "192.168.128.0/17",
            ]
        );
    }

    #[test]
    fn test_exclude_entire_block() {
        let mut seq = prefixes(&["192.168.1.0/24"]);
        apply_exclusion(&mut seq, &prefix("192.168.0.0/16"));
        assert!(seq.is_empty());
    }

    #[test]
    fn test_exclude_disjoint_is_noop() {
        let mut seq = prefixes(&["192.168.0.0/24"]);
        apply_exclusion(&mut seq, &prefix("10.0.0.0/8"));
        assert_eq!(strings(&seq), vec!["192.168.0.0/24"]);
    }

    #[test]
    fn test_exclude_spanning_multiple_blocks() {
        let mut seq = prefixes(&["10.0.0.0/24", "10.0.1.0/24", "10.0.2.0/24"]);
        apply_exclusion(&mut seq, &prefix("10.0.1.0/24"));
        assert_eq!(strings(&seq), vec!["10.0.0.0/24", "10.0.2.0/24"]);
    }

    /*----------------------------------------------------------------------------------
      Warnings
    ----------------------------------------------------------------------------------*/

    #[test]
    fn test_specificity_warning_thresholds() {
        assert!(specificity_warning(&prefix("10.0.0.0/30")).is_none());
        assert!(specificity_warning(&prefix("2001:db8::/64")).is_none());

        let warning = specificity_warning(&prefix("10.0.0.1/32")).unwrap();
        assert!(warning.contains("10.0.0.1/32"));
        assert!(warning.contains("more specific than recommended /30"));

        let warning = specificity_warning(&prefix("2001:db8::1/128")).unwrap();
        assert!(warning.contains("more specific than recommended /64"));
    }
}
