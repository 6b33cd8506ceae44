use prefixagg::{Error, IpPrefix, PrefixAggregator, PrefixType};

/*-------------------------------------------------------------------------------------------------
  Library Integration Tests
-------------------------------------------------------------------------------------------------*/

/*--------------------------------------------------------------------------------------
  Test Helper Functions
--------------------------------------------------------------------------------------*/

fn aggregated(inputs: &[&str]) -> PrefixAggregator {
    let aggregator = PrefixAggregator::new();
    aggregator.add_many(inputs).unwrap();
    aggregator.aggregate().unwrap();
    aggregator
}

fn parse(text: &str) -> IpPrefix {
    text.parse().unwrap()
}

/*--------------------------------------------------------------------------------------
  Merging
--------------------------------------------------------------------------------------*/

#[test]
fn adjacent_pair_merges_into_covering_block() {
    let aggregator = aggregated(&["192.168.0.0/24", "192.168.1.0/24"]);
    assert_eq!(aggregator.get_prefixes(), vec!["192.168.0.0/23"]);
}

#[test]
fn mixed_families_aggregate_independently() {
    let aggregator = aggregated(&[
        "192.168.1.0/24",
        "192.168.2.0/24",
        "2001:db8::/64",
        "2001:db8:0:1::/64",
    ]);

    // The IPv4 pair sits on the wrong boundary to merge; the IPv6 pair
    // collapses to a /63.
    assert_eq!(
        aggregator.get_prefixes(),
        vec!["192.168.1.0/24", "192.168.2.0/24", "2001:db8::/63"]
    );
}

#[test]
fn default_route_absorbs_same_family_prefixes() {
    let aggregator = aggregated(&["0.0.0.0/0", "10.0.0.0/8", "203.0.113.0/24", "2001:db8::/32"]);
    assert_eq!(aggregator.get_prefixes(), vec!["0.0.0.0/0", "2001:db8::/32"]);
}

#[test]
fn duplicate_adds_do_not_change_the_result() {
    let once = aggregated(&["10.0.0.0/24"]);
    let twice = aggregated(&["10.0.0.0/24", "10.0.0.0/24"]);
    assert_eq!(once.get_prefixes(), twice.get_prefixes());
}

/*--------------------------------------------------------------------------------------
  Minimum Prefix Length
--------------------------------------------------------------------------------------*/

#[test]
fn min_length_collapses_specifics_into_one_floor_block() {
    let aggregator = PrefixAggregator::new();
    aggregator.set_min_prefix_length(21, 0).unwrap();
    aggregator
        .add_many([
            "1.0.0.0/24",
            "1.0.1.0/24",
            "1.0.2.0/23",
            "1.0.4.0/24",
            "1.0.5.0/25",
            "1.0.5.128/26",
            "1.0.5.192/28",
            "1.0.5.208/30",
            "1.0.5.212",
            "1.0.5.213",
            "1.0.5.214/31",
            "1.0.5.216/29",
            "1.0.5.224/27",
            "1.0.6.0/23",
        ])
        .unwrap();
    aggregator.aggregate().unwrap();

    assert_eq!(aggregator.get_prefixes(), vec!["1.0.0.0/21"]);
}

#[test]
fn zero_floor_is_a_noop() {
    let aggregator = PrefixAggregator::new();
    aggregator.set_min_prefix_length(0, 0).unwrap();
    aggregator.add("10.1.2.3/32").unwrap();
    aggregator.aggregate().unwrap();

    assert_eq!(aggregator.get_prefixes(), vec!["10.1.2.3/32"]);
}

#[test]
fn floors_apply_per_family() {
    let aggregator = PrefixAggregator::new();
    aggregator.set_min_prefix_length(24, 48).unwrap();
    aggregator
        .add_many(["10.5.5.128/25", "2001:db8:1:2::/64"])
        .unwrap();
    aggregator.aggregate().unwrap();

    assert_eq!(
        aggregator.get_prefixes(),
        vec!["10.5.5.0/24", "2001:db8:1::/48"]
    );
}

/*--------------------------------------------------------------------------------------
  Includes
--------------------------------------------------------------------------------------*/

#[test]
fn includes_participate_in_aggregation() {
    let aggregator = PrefixAggregator::new();
    aggregator.add("192.168.0.0/24").unwrap();
    aggregator.set_include_prefixes(["192.168.1.0/24"]).unwrap();
    aggregator.aggregate().unwrap();

    assert_eq!(aggregator.get_prefixes(), vec!["192.168.0.0/23"]);
    // The include never counts as a primary input.
    assert_eq!(aggregator.get_stats().original_count, 1);
}

/*--------------------------------------------------------------------------------------
  Exclusions
--------------------------------------------------------------------------------------*/

#[test]
fn excluding_half_a_block_leaves_the_other_half() {
    let aggregator = PrefixAggregator::new();
    aggregator.add("192.168.0.0/24").unwrap();
    aggregator.set_exclude_prefixes(["192.168.0.0/25"]).unwrap();
    aggregator.aggregate().unwrap();

    assert_eq!(aggregator.get_prefixes(), vec!["192.168.0.128/25"]);
}

#[test]
fn excluding_an_interior_block_fragments_minimally() {
    let aggregator = PrefixAggregator::new();
    aggregator.add("192.168.0.0/16").unwrap();
    aggregator.set_exclude_prefixes(["192.168.1.0/24"]).unwrap();
    aggregator.aggregate().unwrap();

    assert_eq!(
        aggregator.get_prefixes(),
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
fn excluding_a_covering_prefix_removes_it_cleanly() {
    let aggregator = PrefixAggregator::new();
    aggregator.add("192.168.1.0/24").unwrap();
    aggregator.set_exclude_prefixes(["192.168.0.0/16"]).unwrap();
    aggregator.aggregate().unwrap();

    assert!(aggregator.get_prefixes().is_empty());
    assert!(aggregator.get_warnings().is_empty());
}

#[test]
fn disjoint_exclusion_is_a_silent_noop() {
    let aggregator = PrefixAggregator::new();
    aggregator.add("192.168.0.0/24").unwrap();
    aggregator.set_exclude_prefixes(["172.16.0.0/12"]).unwrap();
    aggregator.aggregate().unwrap();

    assert_eq!(aggregator.get_prefixes(), vec!["192.168.0.0/24"]);
    assert!(aggregator.get_warnings().is_empty());
}

#[test]
fn host_exclusion_warns_and_splits_around_the_address() {
    let aggregator = PrefixAggregator::new();
    aggregator.add("10.0.0.0/8").unwrap();
    aggregator.set_exclude_prefixes(["10.0.0.1/32"]).unwrap();
    aggregator.aggregate().unwrap();

    assert_eq!(
        aggregator.get_prefixes(),
        vec![
            "10.0.0.0/32",
            "10.0.0.2/31",
            "10.0.0.4/30",
            "10.0.0.8/29",
            "10.0.0.16/28",
            "10.0.0.32/27",
            "10.0.0.64/26",
            "10.0.0.128/25",
            "10.0.1.0/24",
            "10.0.2.0/23",
            "10.0.4.0/22",
            "10.0.8.0/21",
            "10.0.16.0/20",
            "10.0.32.0/19",
            "10.0.64.0/18",
            "10.0.128.0/17",
            "10.1.0.0/16",
            "10.2.0.0/15",
            "10.4.0.0/14",
            "10.8.0.0/13",
            "10.16.0.0/12",
            "10.32.0.0/11",
            "10.64.0.0/10",
            "10.128.0.0/9",
        ]
    );

    let warnings = aggregator.get_warnings();
    assert_eq!(warnings.len(), 1);
    assert!(warnings[0].contains("10.0.0.1/32"));
    assert!(warnings[0].contains("more specific than recommended /30"));
}

#[test]
fn exclusion_spanning_several_aggregated_blocks() {
    let aggregator = PrefixAggregator::new();
    aggregator
        .add_many(["10.0.0.0/24", "10.0.2.0/24", "10.0.4.0/24"])
        .unwrap();
    aggregator.set_exclude_prefixes(["10.0.0.0/22"]).unwrap();
    aggregator.aggregate().unwrap();

    assert_eq!(aggregator.get_prefixes(), vec!["10.0.4.0/24"]);
}

#[test]
fn ipv6_exclusion_respects_the_recommended_floor() {
    let aggregator = PrefixAggregator::new();
    aggregator.add("2001:db8::/32").unwrap();
    aggregator.set_exclude_prefixes(["2001:db8::/96"]).unwrap();
    aggregator.aggregate().unwrap();

    let warnings = aggregator.get_warnings();
    assert_eq!(warnings.len(), 1);
    assert!(warnings[0].contains("more specific than recommended /64"));

    // Nothing in the output intersects the excluded range.
    let excluded = parse("2001:db8::/96");
    for text in aggregator.get_prefixes() {
        assert!(!parse(&text).overlaps(&excluded), "{text} intersects the exclusion");
    }
}

/*--------------------------------------------------------------------------------------
  Boundary Behaviors
--------------------------------------------------------------------------------------*/

#[test]
fn empty_aggregator_aggregates_to_nothing() {
    let aggregator = PrefixAggregator::new();
    aggregator.aggregate().unwrap();
    assert!(aggregator.get_prefixes().is_empty());
}

#[test]
fn single_prefix_passes_through_unchanged() {
    let aggregator = aggregated(&["203.0.113.0/24"]);
    assert_eq!(aggregator.get_prefixes(), vec!["203.0.113.0/24"]);
}

#[test]
fn aggregate_is_idempotent() {
    let aggregator = PrefixAggregator::new();
    aggregator
        .add_many(["10.0.0.0/24", "10.0.1.0/24", "10.0.2.0/23", "2001:db8::/64"])
        .unwrap();
    aggregator.set_exclude_prefixes(["10.0.1.0/26"]).unwrap();

    aggregator.aggregate().unwrap();
    let first = aggregator.get_prefixes();

    aggregator.aggregate().unwrap();
    assert_eq!(aggregator.get_prefixes(), first);
}

/*--------------------------------------------------------------------------------------
  Output Invariants
--------------------------------------------------------------------------------------*/

#[test]
fn output_is_sorted_disjoint_and_minimal() {
    let aggregator = PrefixAggregator::new();
    aggregator
        .add_many([
            "10.0.64.0/18",
            "10.0.0.0/16",
            "10.1.0.0/24",
            "10.1.1.0/24",
            "10.1.2.0/23",
            "10.3.0.0/16",
            "10.2.0.0/16",
            "172.16.99.0/24",
            "2001:db8::/48",
            "2001:db8:1::/48",
        ])
        .unwrap();
    aggregator.set_exclude_prefixes(["10.2.128.0/17"]).unwrap();
    aggregator.aggregate().unwrap();

    for family in [
        aggregator.get_ipv4_prefixes(),
        aggregator.get_ipv6_prefixes(),
    ] {
        let prefixes: Vec<IpPrefix> = family.iter().map(|text| parse(text)).collect();

        for pair in prefixes.windows(2) {
            // Sorted and pairwise disjoint.
            assert!(pair[0].max() < pair[1].min(), "{} and {} overlap or are out of order", pair[0], pair[1]);

            // Minimal: no adjacent pair may form a single aligned block.
            if pair[0].max() + 1 == pair[1].min() {
                assert!(
                    IpPrefix::from_range(pair[0].prefix_type(), pair[0].min(), pair[1].max()).is_err(),
                    "{} and {} should have been merged",
                    pair[0],
                    pair[1]
                );
            }
        }
    }
}

/*--------------------------------------------------------------------------------------
  Round Trips
--------------------------------------------------------------------------------------*/

#[test]
fn write_then_read_preserves_the_prefix_set() {
    let aggregator = PrefixAggregator::new();
    aggregator
        .add_many(["10.0.0.0/24", "10.0.1.0/24", "2001:db8::/33", "2001:db8:8000::/33"])
        .unwrap();
    aggregator.aggregate().unwrap();

    let mut buffer: Vec<u8> = Vec::new();
    aggregator.write_to_writer(&mut buffer).unwrap();

    let reloaded = PrefixAggregator::new();
    reloaded.add_from_reader(buffer.as_slice()).unwrap();
    reloaded.aggregate().unwrap();

    assert_eq!(reloaded.get_prefixes(), aggregator.get_prefixes());
}

#[test]
fn parse_render_round_trip_on_canonical_text() {
    for text in ["0.0.0.0/0", "10.0.0.0/8", "198.51.100.17/32", "::/0", "2001:db8::/32"] {
        assert_eq!(parse(text).to_string(), text);
    }
}

#[test]
fn prefix_range_round_trip() {
    for text in ["10.0.0.0/8", "192.0.2.128/25", "2001:db8::/64"] {
        let prefix = parse(text);
        let back = IpPrefix::from_range(prefix.prefix_type(), prefix.min(), prefix.max()).unwrap();
        assert_eq!(back, prefix);
    }
}

/*--------------------------------------------------------------------------------------
  Error Kinds
--------------------------------------------------------------------------------------*/

#[test]
fn error_kinds_are_distinguishable() {
    let aggregator = PrefixAggregator::new();

    assert!(matches!(
        aggregator.add("512.0.0.0/8"),
        Err(Error::InvalidPrefix(_))
    ));
    assert!(matches!(
        aggregator.set_min_prefix_length(64, 0),
        Err(Error::InvalidMinPrefixLen(_))
    ));
    assert!(matches!(
        aggregator.add_from_file("/no/such/file.txt"),
        Err(Error::FileNotFound(_))
    ));
    assert!(matches!(
        IpPrefix::from_range(PrefixType::IPv4, 1, 2),
        Err(Error::InvalidPrefix(_))
    ));
}
