//! Byte-level helpers for splitting CoNLL-U lines

use memchr::memchr_iter;

/// Split a line into exactly `n` tab-separated fields.
///
/// The last field absorbs any remaining tabs. Returns `None` when the
/// line has fewer than `n` fields.
#[inline]
pub fn split_fields(line: &str, n: usize) -> Option<Vec<&str>> {
    if n == 0 {
        return None;
    }
    let mut fields = Vec::with_capacity(n);
    let mut start = 0;
    for tab in memchr_iter(b'\t', line.as_bytes()) {
        if fields.len() == n - 1 {
            break;
        }
        // tabs are ASCII, so these are char boundaries
        fields.push(&line[start..tab]);
        start = tab + 1;
    }
    if fields.len() < n - 1 {
        return None;
    }
    fields.push(&line[start..]);
    Some(fields)
}

/// True if every byte is an ASCII digit (the empty slice included)
#[inline]
pub fn is_digits(bytes: &[u8]) -> bool {
    bytes.iter().all(u8::is_ascii_digit)
}

/// Strict unsigned integer coercion: digits only, no sign, no overflow.
/// An empty slice is not a number.
#[inline]
pub fn bs_atoi(bytes: &[u8]) -> Option<usize> {
    if bytes.is_empty() {
        return None;
    }

    let mut n: usize = 0;
    for &b in bytes {
        // Convert ASCII digit to value 0..9; reject non-digits.
        let d = (b.wrapping_sub(b'0')) as usize;
        if d > 9 {
            return None;
        }
        n = n.checked_mul(10)?.checked_add(d)?;
    }
    Some(n)
}
