use crate::core::ip_math;
use crate::core::prefix::IpPrefix;
use crate::core::prefix_type::PrefixType;

/*-------------------------------------------------------------------------------------------------
  Range Decomposition
-------------------------------------------------------------------------------------------------*/

/// Append to `out` the minimal ordered list of aligned CIDR blocks whose
/// union is exactly `[start, end]`.
///
/// At each step the block size is limited by two things: the alignment of
/// the current position (its trailing zero bits) and the amount of range
/// left to cover. Taking the smaller of the two yields the largest block
/// that fits, which makes the cover minimal.
pub(crate) fn decompose_range(prefix_type: PrefixType, start: u128, end: u128, out: &mut Vec<IpPrefix>) {
    debug_assert!(start <= end);

    let width = prefix_type.width();
    let mut cur = start;

    loop {
        let alignment = ip_math::trailing_zeros(cur, width);
        let span = if cur == 0 && end == u128::MAX {
            width
        } else {
            ip_math::floor_log2(end - cur + 1).min(width)
        };
        let host_bits = alignment.min(span);

        let block_max = cur | ip_math::host_mask(host_bits);
        out.push(
            IpPrefix::new(prefix_type, cur, width - host_bits)
                .expect("aligned block within the family width"),
        );

        if block_max >= end {
            break;
        }
        cur = block_max + 1;
    }
}

/*-------------------------------------------------------------------------------------------------
  Unit Tests
-------------------------------------------------------------------------------------------------*/

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::prefix::tests::prefix;

    fn decompose(prefix_type: PrefixType, start: u128, end: u128) -> Vec<String> {
        let mut out = Vec::new();
        decompose_range(prefix_type, start, end, &mut out);
        out.iter().map(|p| p.to_string()).collect()
    }

    fn v4(s: &str) -> u128 {
        let p = prefix(s);
        p.min()
    }

    #[test]
    fn test_exact_block() {
        assert_eq!(
            decompose(PrefixType::IPv4, v4("192.168.0.0"), prefix("192.168.0.0/24").max()),
            vec!["192.168.0.0/24"]
        );
    }

    #[test]
    fn test_single_address() {
        assert_eq!(
            decompose(PrefixType::IPv4, v4("10.0.0.1"), v4("10.0.0.1")),
            vec!["10.0.0.1/32"]
        );
    }

    #[test]
    fn test_unaligned_start() {
        // 10.0.0.1 .. 10.0.0.6: alignment forces small blocks at both ends.
        assert_eq!(
            decompose(PrefixType::IPv4, v4("10.0.0.1"), v4("10.0.0.6")),
            vec!["10.0.0.1/32", "10.0.0.2/31", "10.0.0.4/31", "10.0.0.6/32"]
        );
    }

    #[test]
    fn test_growing_then_shrinking_cover() {
        // 192.168.0.0 .. 192.168.255.255 minus the second /24: the residue
        // above the hole doubles in size while alignment allows.
        assert_eq!(
            decompose(PrefixType::IPv4, v4("192.168.2.0"), prefix("192.168.0.0/16").max()),
            vec![
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
    fn test_full_ipv4_space() {
        assert_eq!(
            decompose(PrefixType::IPv4, 0, u128::from(u32::MAX)),
            vec!["0.0.0.0/0"]
        );
    }

    #[test]
    fn test_full_ipv6_space() {
        assert_eq!(decompose(PrefixType::IPv6, 0, u128::MAX), vec!["::/0"]);
    }

    #[test]
    fn test_ipv6_range() {
        let start = prefix("2001:db8:0:1::/64").min();
        let end = prefix("2001:db8:0:3::/64").max();
        assert_eq!(
            decompose(PrefixType::IPv6, start, end),
            vec!["2001:db8:0:1::/64", "2001:db8:0:2::/63"]
        );
    }

    #[test]
    fn test_cover_is_contiguous_and_exact() {
        let start = v4("10.0.0.3");
        let end = v4("10.0.200.77");
        let mut out = Vec::new();
        decompose_range(PrefixType::IPv4, start, end, &mut out);

        assert_eq!(out.first().unwrap().min(), start);
        assert_eq!(out.last().unwrap().max(), end);
        for pair in out.windows(2) {
            assert_eq!(pair[0].max() + 1, pair[1].min());
        }
    }
}
