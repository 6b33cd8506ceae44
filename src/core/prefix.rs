use crate::core::errors::{Error, Result};
use crate::core::ip_math;
use crate::core::prefix_type::PrefixType;
use ipnetwork::IpNetwork;
use std::fmt;
use std::net::{Ipv4Addr, Ipv6Addr};
use std::str::FromStr;

/*-------------------------------------------------------------------------------------------------
  IP Prefix
-------------------------------------------------------------------------------------------------*/

/// A CIDR block in canonical range form: the family, the prefix length in
/// bits, and the closed address interval `[min, max]` as 128-bit integers.
///
/// Invariants at rest: `max >= min`, `max - min + 1 == 2^(width - bits)`,
/// `min` has its low `width - bits` bits zero, and for IPv4 both endpoints
/// fit in the low 32 bits.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct IpPrefix {
    prefix_type: PrefixType,
    bits: u8,
    min: u128,
    max: u128,
}

impl IpPrefix {
    /// Create a prefix of length `bits` covering `addr`. Host bits in
    /// `addr` are masked off.
    pub fn new(prefix_type: PrefixType, addr: u128, bits: u8) -> Result<IpPrefix> {
        let width = prefix_type.width();
        if bits > width {
            return Err(Error::InvalidPrefix(format!(
                "{prefix_type} prefix length must be 0-{width}, got {bits}"
            )));
        }
        if prefix_type.is_ipv4() && addr > u128::from(u32::MAX) {
            return Err(Error::InvalidPrefix(format!(
                "IPv4 address out of range: {addr:#x}"
            )));
        }

        let mask = ip_math::host_mask(width - bits);
        let min = addr & !mask;
        Ok(IpPrefix {
            prefix_type,
            bits,
            min,
            max: min | mask,
        })
    }

    /// Convert a closed range back into a prefix. This direction is
    /// partial: the range size must be a power of two and `min` must be
    /// aligned to it, otherwise the range is not a single CIDR block.
    pub fn from_range(prefix_type: PrefixType, min: u128, max: u128) -> Result<IpPrefix> {
        if min > max {
            return Err(Error::InvalidPrefix(format!(
                "min > max in range [{min:#x}, {max:#x}]"
            )));
        }

        let width = prefix_type.width();
        if prefix_type.is_ipv4() && max > u128::from(u32::MAX) {
            return Err(Error::InvalidPrefix(format!(
                "IPv4 address out of range: {max:#x}"
            )));
        }

        if min == 0 && max == ip_math::host_mask(width) {
            // Full address space of the family; the size computation below
            // would overflow for IPv6.
            return Ok(IpPrefix {
                prefix_type,
                bits: 0,
                min,
                max,
            });
        }

        let size = max - min + 1;
        if !ip_math::is_power_of_two(size) {
            return Err(Error::InvalidPrefix(format!(
                "range size {size:#x} is not a power of two"
            )));
        }

        let host_bits = ip_math::floor_log2(size);
        if min & ip_math::host_mask(host_bits) != 0 {
            return Err(Error::InvalidPrefix(format!(
                "range start {min:#x} is not aligned to a /{} boundary",
                width - host_bits
            )));
        }

        Ok(IpPrefix {
            prefix_type,
            bits: width - host_bits,
            min,
            max,
        })
    }

    pub(crate) fn from_network(network: IpNetwork) -> IpPrefix {
        match network {
            IpNetwork::V4(ipv4_network) => {
                let bits = ipv4_network.prefix();
                let mask = ip_math::host_mask(32 - bits);
                let min = u128::from(u32::from(ipv4_network.network()));
                IpPrefix {
                    prefix_type: PrefixType::IPv4,
                    bits,
                    min,
                    max: min | mask,
                }
            }
            IpNetwork::V6(ipv6_network) => {
                let bits = ipv6_network.prefix();
                let mask = ip_math::host_mask(128 - bits);
                let min = u128::from(ipv6_network.network());
                IpPrefix {
                    prefix_type: PrefixType::IPv6,
                    bits,
                    min,
                    max: min | mask,
                }
            }
        }
    }

    /*-------------------------------------------------------------------------
      Accessors
    -------------------------------------------------------------------------*/

    pub fn prefix_type(&self) -> PrefixType {
        self.prefix_type
    }

    pub fn bits(&self) -> u8 {
        self.bits
    }

    /// Lowest address in the block.
    pub fn min(&self) -> u128 {
        self.min
    }

    /// Highest address in the block.
    pub fn max(&self) -> u128 {
        self.max
    }

    /*-------------------------------------------------------------------------
      Range Relations
    -------------------------------------------------------------------------*/

    /// True when `other` lies entirely within `self`.
    pub fn contains(&self, other: &IpPrefix) -> bool {
        self.min <= other.min && self.max >= other.max
    }

    /// True when the ranges share at least one address.
    pub fn overlaps(&self, other: &IpPrefix) -> bool {
        !(self.max < other.min || other.max < self.min)
    }

    /// True when the ranges are disjoint and touch end to end.
    pub fn is_adjacent_to(&self, other: &IpPrefix) -> bool {
        (self.max != u128::MAX && self.max + 1 == other.min)
            || (other.max != u128::MAX && other.max + 1 == self.min)
    }

    /// Union of two blocks when that union is itself a valid aligned CIDR
    /// block; `None` otherwise.
    pub(crate) fn merge(&self, other: &IpPrefix) -> Option<IpPrefix> {
        let min = self.min.min(other.min);
        let max = self.max.max(other.max);
        IpPrefix::from_range(self.prefix_type, min, max).ok()
    }

    /// The covering prefix at length `floor`. Prefixes already at or
    /// broader than `floor` are returned unchanged.
    pub(crate) fn rounded_to(&self, floor: u8) -> IpPrefix {
        if self.bits <= floor {
            return *self;
        }
        let mask = ip_math::host_mask(self.prefix_type.width() - floor);
        let min = self.min & !mask;
        IpPrefix {
            prefix_type: self.prefix_type,
            bits: floor,
            min,
            max: min | mask,
        }
    }
}

/*--------------------------------------------------------------------------------------
  Textual Parsing and Rendering
--------------------------------------------------------------------------------------*/

impl FromStr for IpPrefix {
    type Err = Error;

    /// Parse `A.B.C.D/n`, `H:...:H/n`, or a bare address (implicitly `/32`
    /// or `/128`). Surrounding whitespace is trimmed.
    fn from_str(s: &str) -> Result<IpPrefix> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(Error::InvalidPrefix("empty prefix string".to_string()));
        }

        let network: IpNetwork = trimmed
            .parse()
            .map_err(|error| Error::InvalidPrefix(format!("failed to parse {trimmed:?}: {error}")))?;

        Ok(IpPrefix::from_network(network))
    }
}

impl fmt::Display for IpPrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.prefix_type {
            PrefixType::IPv4 => write!(f, "{}/{}", Ipv4Addr::from(self.min as u32), self.bits),
            PrefixType::IPv6 => write!(f, "{}/{}", Ipv6Addr::from(self.min), self.bits),
        }
    }
}

/*-------------------------------------------------------------------------------------------------
  Unit Tests
-------------------------------------------------------------------------------------------------*/
