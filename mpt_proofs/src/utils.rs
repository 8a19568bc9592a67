//! Byte-level helpers shared by the decoder and the proof walk.

use std::ops::BitAnd;

use num_traits::PrimInt;

use crate::fragment::Fragment;

pub(crate) fn is_even<T: PrimInt + BitAnd<Output = T>>(num: T) -> bool {
    (num & T::one()) == T::zero()
}

/// Shifts the logical content of a fragment left by `n` whole bytes,
/// zero-filling on the right. Source positions past the window read as zero,
/// so shifting by more than the length yields an all-zero fragment of the
/// same length.
pub fn left_byte_shift<const M: usize>(frag: &Fragment<u8, M>, n: usize) -> Fragment<u8, M> {
    let mut out = Fragment::empty();
    for i in 0..frag.len() {
        let src = i + n;
        let v = if src < frag.len() { frag.at(src) } else { 0 };
        out.push_back(v);
    }

    out
}

/// Strips leading zero bytes, returning the packed tail and its length.
/// All-zero input yields an empty tail.
pub fn byte_value<const M: usize>(frag: &Fragment<u8, M>) -> (Fragment<u8, M>, usize) {
    let leading_zeros = frag.iter().take_while(|b| **b == 0).count();
    let tail = frag.sub_fragment(leading_zeros, frag.len() - leading_zeros);

    (tail, tail.len())
}

/// Strips leading zero bytes from a borrowed slice.
pub(crate) fn strip_leading_zeros(bytes: &[u8]) -> &[u8] {
    let leading_zeros = bytes.iter().take_while(|b| **b == 0).count();
    &bytes[leading_zeros..]
}

/// Fixed-width big-endian encoding of a `u32`.
pub fn u32_to_u8(v: u32) -> Fragment<u8, 4> {
    Fragment::from_array(v.to_be_bytes())
}

/// Fixed-width big-endian encoding of a `u64`.
pub fn u64_to_u8(v: u64) -> Fragment<u8, 8> {
    Fragment::from_array(v.to_be_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn is_even_works() {
        assert!(is_even(0_u8));
        assert!(is_even(4_usize));
        assert!(!is_even(7_u64));
    }

    #[test]
    fn left_byte_shift_zero_fills() {
        let frag: Fragment<u8, 4> = Fragment::from_slice(&[1, 2, 3, 4]).unwrap();

        assert_eq!(left_byte_shift(&frag, 0).as_slice(), &[1, 2, 3, 4]);
        assert_eq!(left_byte_shift(&frag, 1).as_slice(), &[2, 3, 4, 0]);
        assert_eq!(left_byte_shift(&frag, 3).as_slice(), &[4, 0, 0, 0]);
        assert_eq!(left_byte_shift(&frag, 9).as_slice(), &[0, 0, 0, 0]);
    }

    #[test]
    fn byte_value_strips_leading_zeros() {
        let frag: Fragment<u8, 4> = Fragment::from_slice(&[0x00, 0x00, 0x12, 0x34]).unwrap();
        let (tail, len) = byte_value(&frag);

        assert_eq!(len, 2);
        assert_eq!(tail.as_slice(), &[0x12, 0x34]);
    }

    #[test]
    fn byte_value_of_all_zeros_is_empty() {
        let frag: Fragment<u8, 4> = Fragment::from_slice(&[0, 0, 0, 0]).unwrap();
        let (tail, len) = byte_value(&frag);

        assert_eq!(len, 0);
        assert!(tail.is_empty());
    }

    #[test]
    fn fixed_width_encodings_are_big_endian() {
        assert_eq!(u32_to_u8(0x0102_0304).as_slice(), &[1, 2, 3, 4]);
        assert_eq!(
            u64_to_u8(0x0102_0304_0506_0708).as_slice(),
            &[1, 2, 3, 4, 5, 6, 7, 8]
        );
    }
}
