/*-------------------------------------------------------------------------------------------------
  128-Bit Address Arithmetic
-------------------------------------------------------------------------------------------------*/

/*
    An IP address is a 128-bit unsigned integer; IPv4 addresses occupy the
    low 32 bits and the family is tracked out of band. A native `u128`
    covers every operation the aggregation engine needs, but shift amounts
    equal to the full width (host bits of 128 for a ::/0, or a trailing-zero
    count taken of zero) are undefined for the shift operators, so every
    width-dependent operation lives here behind an explicit guard.
*/

/// Mask covering `host_bits` low bits: `2^host_bits - 1`.
pub(crate) fn host_mask(host_bits: u8) -> u128 {
    debug_assert!(host_bits <= 128);
    if host_bits >= 128 {
        u128::MAX
    } else {
        (1u128 << host_bits) - 1
    }
}

/// Number of trailing zero bits in `value`, capped at the family width.
/// A value of zero is aligned to any boundary within the family.
pub(crate) fn trailing_zeros(value: u128, width: u8) -> u8 {
    if value == 0 {
        width
    } else {
        (value.trailing_zeros() as u8).min(width)
    }
}

/// Largest `n` with `2^n <= value`. `value` must be non-zero.
pub(crate) fn floor_log2(value: u128) -> u8 {
    debug_assert!(value != 0);
    (127 - value.leading_zeros()) as u8
}

/// True when `value` is an exact power of two.
pub(crate) fn is_power_of_two(value: u128) -> bool {
    value != 0 && value & (value - 1) == 0
}

/*-------------------------------------------------------------------------------------------------
  Unit Tests
-------------------------------------------------------------------------------------------------*/
