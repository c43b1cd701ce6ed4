//! Cell addressing.
//!
//! A cell is identified by its zero-based `(sheet, row, col)` triple, where
//! `col` counts columns *after* repeated-column expansion. The presentation
//! layer sends addresses as `"sheet:row:col"` strings; the TUI also accepts
//! spreadsheet-style references ("A1", "B2", "AA100") for navigation.
//!
//! # Examples
//!
//! ```
//! use odsgrid_core::CellAddress;
//!
//! let addr: CellAddress = "0:2:1".parse().unwrap();
//! assert_eq!(addr, CellAddress::new(0, 2, 1));
//! assert_eq!(addr.to_string(), "0:2:1");
//! assert_eq!(addr.a1(), "B3");
//! ```

use crate::error::AddressError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A reference to one expanded cell (all indices 0-based).
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub struct CellAddress {
    pub sheet: usize,
    pub row: usize,
    pub col: usize,
}

impl CellAddress {
    pub fn new(sheet: usize, row: usize, col: usize) -> CellAddress {
        CellAddress { sheet, row, col }
    }

    /// Spreadsheet-style label of the cell within its sheet (e.g. "B3").
    pub fn a1(&self) -> String {
        format!("{}{}", col_to_letters(self.col), self.row + 1)
    }
}

impl FromStr for CellAddress {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || AddressError::Invalid(s.to_string());
        let mut parts = s.trim().split(':');
        let mut next = || -> Result<usize, AddressError> {
            parts
                .next()
                .and_then(|p| p.trim().parse::<usize>().ok())
                .ok_or_else(invalid)
        };
        let sheet = next()?;
        let row = next()?;
        let col = next()?;
        if parts.next().is_some() {
            return Err(invalid());
        }
        Ok(CellAddress::new(sheet, row, col))
    }
}

impl fmt::Display for CellAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.sheet, self.row, self.col)
    }
}

/// Convert column index to spreadsheet-style letters (0 -> A, 25 -> Z, 26 -> AA).
pub fn col_to_letters(col: usize) -> String {
    let mut result = String::new();
    let mut n = col as u128 + 1;
    while n > 0 {
        n -= 1;
        result.insert(0, (b'A' + (n % 26) as u8) as char);
        n /= 26;
    }
    result
}

/// Parse column letters to a 0-based index ("A" -> 0, "AA" -> 26).
pub fn letters_to_col(letters: &str) -> Option<usize> {
    if letters.is_empty() || !letters.bytes().all(|b| b.is_ascii_alphabetic()) {
        return None;
    }
    let mut col_acc = 0usize;
    for c in letters.to_ascii_uppercase().bytes() {
        let digit = (c - b'A') as usize + 1;
        col_acc = col_acc.checked_mul(26)?.checked_add(digit)?;
    }
    col_acc.checked_sub(1)
}

/// Parse a spreadsheet-style reference ("B3") into `(row, col)`.
pub fn parse_a1(name: &str) -> Result<(usize, usize), AddressError> {
    let invalid = || AddressError::InvalidReference(name.to_string());
    let name = name.trim();
    let split = name
        .find(|c: char| c.is_ascii_digit())
        .ok_or_else(invalid)?;
    let (letters, numbers) = name.split_at(split);
    if !numbers.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }
    let col = letters_to_col(letters).ok_or_else(invalid)?;
    let row = numbers
        .parse::<usize>()
        .ok()
        .and_then(|r| r.checked_sub(1))
        .ok_or_else(invalid)?;
    Ok((row, col))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_address_string() {
        let addr: CellAddress = "1:20:3".parse().unwrap();
        assert_eq!(addr, CellAddress::new(1, 20, 3));
    }

    #[test]
    fn test_parse_address_rejects_garbage() {
        assert!("".parse::<CellAddress>().is_err());
        assert!("1:2".parse::<CellAddress>().is_err());
        assert!("1:2:3:4".parse::<CellAddress>().is_err());
        assert!("a:b:c".parse::<CellAddress>().is_err());
        assert!("-1:0:0".parse::<CellAddress>().is_err());
    }

    #[test]
    fn test_col_to_letters() {
        assert_eq!(col_to_letters(0), "A");
        assert_eq!(col_to_letters(25), "Z");
        assert_eq!(col_to_letters(26), "AA");
        assert_eq!(col_to_letters(51), "AZ");
        assert_eq!(col_to_letters(52), "BA");
    }

    #[test]
    fn test_col_to_letters_handles_max_usize() {
        let letters = col_to_letters(usize::MAX);
        assert!(!letters.is_empty());
        assert!(letters.chars().all(|c| c.is_ascii_uppercase()));
    }

    #[test]
    fn test_parse_a1() {
        assert_eq!(parse_a1("A1").unwrap(), (0, 0));
        assert_eq!(parse_a1("b3").unwrap(), (2, 1));
        assert_eq!(parse_a1("AA10").unwrap(), (9, 26));
    }

    #[test]
    fn test_parse_a1_invalid_inputs() {
        assert!(parse_a1("").is_err());
        assert!(parse_a1("123").is_err());
        assert!(parse_a1("ABC").is_err());
        assert!(parse_a1("A0").is_err());
        assert!(parse_a1("1A").is_err());
        assert!(parse_a1("A 1").is_err());
    }

    #[test]
    fn test_parse_a1_overflow_is_error() {
        let huge = format!("{}1", "Z".repeat(40));
        assert!(parse_a1(&huge).is_err());
    }
}
