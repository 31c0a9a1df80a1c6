//! Natural-order string comparison.
//!
//! Orders embedded numerals numerically rather than lexically, so
//! "site 9" sorts before "site 10" and "S2" before "S10". Used by the
//! row-reordering step when sorting text key columns.

use std::cmp::Ordering;

#[derive(Debug, PartialEq, Eq)]
enum Chunk<'a> {
    Digits(&'a str),
    Text(&'a str),
}

fn chunks(s: &str) -> Vec<Chunk<'_>> {
    let mut out = Vec::new();
    let bytes = s.as_bytes();
    let mut start = 0;
    let mut i = 0;
    let mut in_digits = bytes.first().is_some_and(u8::is_ascii_digit);

    while i < bytes.len() {
        let digit = bytes[i].is_ascii_digit();
        if digit != in_digits {
            out.push(if in_digits {
                Chunk::Digits(&s[start..i])
            } else {
                Chunk::Text(&s[start..i])
            });
            start = i;
            in_digits = digit;
        }
        i += 1;
    }
    if start < bytes.len() {
        out.push(if in_digits {
            Chunk::Digits(&s[start..])
        } else {
            Chunk::Text(&s[start..])
        });
    }
    out
}

fn cmp_digits(a: &str, b: &str) -> Ordering {
    let a = a.trim_start_matches('0');
    let b = b.trim_start_matches('0');
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

/// Compares two strings in natural order.
///
/// Digit runs compare as numbers (leading zeros ignored), text runs
/// compare lexically, and a digit run sorts before a text run at the
/// same position.
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let ca = chunks(a);
    let cb = chunks(b);

    for pair in ca.iter().zip(cb.iter()) {
        let ord = match pair {
            (Chunk::Digits(x), Chunk::Digits(y)) => cmp_digits(x, y),
            (Chunk::Text(x), Chunk::Text(y)) => x.cmp(y),
            (Chunk::Digits(_), Chunk::Text(_)) => Ordering::Less,
            (Chunk::Text(_), Chunk::Digits(_)) => Ordering::Greater,
        };
        if ord != Ordering::Equal {
            return ord;
        }
    }
    ca.len().cmp(&cb.len())
}
