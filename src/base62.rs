//! Base62 codec used to render numeric picks into short codes.
//!
//! Digit values map onto `0-9`, then `a-z`, then `A-Z`, so `10 -> 'a'` and
//! `36 -> 'A'`. The encoding carries no padding: zero is the single
//! character `"0"`.

const ALPHABET: &[u8; 62] = b"0123456789abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";

const BASE: u64 = ALPHABET.len() as u64;

/// `u64::MAX` needs 11 base62 digits.
pub const MAX_ENCODED_LEN: usize = 11;

/// Encode an unsigned integer as base62.
pub fn encode(mut n: u64) -> String {
    let mut buf = [0u8; MAX_ENCODED_LEN];
    let mut i = buf.len();

    while n >= BASE {
        i -= 1;
        buf[i] = ALPHABET[(n % BASE) as usize];
        n /= BASE;
    }

    i -= 1;
    buf[i] = ALPHABET[n as usize];

    buf[i..].iter().map(|&b| b as char).collect()
}

/// Decode a base62 string back into the integer it encodes.
///
/// Returns `None` for empty input, characters outside the alphabet, or
/// values that do not fit in a `u64`.
pub fn decode(s: &str) -> Option<u64> {
    if s.is_empty() {
        return None;
    }

    s.bytes().try_fold(0u64, |acc, b| {
        let digit = digit_value(b)?;
        acc.checked_mul(BASE)?.checked_add(digit)
    })
}

fn digit_value(b: u8) -> Option<u64> {
    let value = match b {
        b'0'..=b'9' => b - b'0',
        b'a'..=b'z' => b - b'a' + 10,
        b'A'..=b'Z' => b - b'A' + 36,
        _ => return None,
    };
    Some(u64::from(value))
}

/// Largest integer whose encoding fits in `len` characters: `62^len - 1`.
///
/// Saturates at `u64::MAX` for lengths of 11 and above.
pub fn max_value_for_len(len: u32) -> u64 {
    BASE.checked_pow(len).map_or(u64::MAX, |n| n - 1)
}
