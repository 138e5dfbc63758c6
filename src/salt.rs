//! Self-describing random salt
//!
//! A salt is a run of random non-zero bytes whose own length (0-255) is
//! spread over its first four bytes, two bits per byte:
//!
//! | byte | bits kept from random fill | bits of the length |
//! |------|----------------------------|--------------------|
//! | 0    | `0xfc`                     | `0x03`             |
//! | 1    | `0xf3`                     | `0x0c`             |
//! | 2    | `0xcf`                     | `0x30`             |
//! | 3    | `0x3f`                     | `0xc0`             |
//!
//! Each length field sits at the same bit position in the header byte as in
//! the length itself, so reading it back is a mask and an OR.

use rand::rngs::OsRng;
use rand::{Rng, RngCore};
use zeroize::Zeroizing;

/// Number of leading salt bytes carrying the length.
pub const SALT_HEADER_LEN: usize = 4;

/// Largest salt length the header can describe.
pub const MAX_SALT_LEN: usize = u8::MAX as usize;

const LENGTH_MASKS: [u8; SALT_HEADER_LEN] = [0x03, 0x0c, 0x30, 0xc0];

/// Write `len` into the first four bytes of `header`, keeping the bits of
/// each byte that are not part of its length field.
///
/// Panics if `header` is shorter than [`SALT_HEADER_LEN`].
pub fn pack_length(header: &mut [u8], len: u8) {
    for (byte, mask) in header[..SALT_HEADER_LEN].iter_mut().zip(LENGTH_MASKS) {
        *byte = (*byte & !mask) | (len & mask);
    }
}

/// Read back the length written by [`pack_length`].
///
/// Panics if `header` is shorter than [`SALT_HEADER_LEN`].
pub fn unpack_length(header: &[u8]) -> u8 {
    header[..SALT_HEADER_LEN]
        .iter()
        .zip(LENGTH_MASKS)
        .fold(0, |len, (byte, mask)| len | (byte & mask))
}

/// Fill `buf` from the OS RNG with bytes that are never zero.
pub fn fill_non_zero(buf: &mut [u8]) {
    OsRng.fill_bytes(buf);
    for byte in buf.iter_mut().filter(|b| **b == 0) {
        *byte = OsRng.gen_range(1..=u8::MAX);
    }
}

/// Generate a salt of `min..=max` bytes with its length packed into the header.
///
/// The length is drawn uniformly from the OS RNG unless `min == max`. Lengths
/// below [`SALT_HEADER_LEN`] cannot hold the header and are raised to it.
pub fn generate_salt(min: u8, max: u8) -> Zeroizing<Vec<u8>> {
    let min = usize::from(min).max(SALT_HEADER_LEN);
    let max = usize::from(max).max(min);

    let len = if min == max {
        min
    } else {
        OsRng.gen_range(min..=max)
    };

    let mut salt = Zeroizing::new(vec![0u8; len]);
    fill_non_zero(&mut salt);
    // len <= MAX_SALT_LEN, so the cast is lossless.
    pack_length(&mut salt, len as u8);

    tracing::trace!(salt_len = len, "generated salt");
    salt
}
