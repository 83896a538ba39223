//! Barcode syntax and checksum validation.
//!
//! Gates which scanned codes are even used as product lookup keys. Pure
//! string work, no I/O; callers decide what to do with a rejected code.

use crate::models::{BarcodeFormat, BarcodeValidationResult};
use thiserror::Error;

const MIN_BARCODE_LEN: usize = 6;
const MAX_BARCODE_LEN: usize = 14;

/// Reasons a scanned code is rejected. The `Display` strings are the
/// human-readable `error` field of [`BarcodeValidationResult`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BarcodeError {
    #[error("Barcode cannot be empty")]
    Empty,
    #[error("Barcode is too short (minimum {MIN_BARCODE_LEN} characters)")]
    TooShort,
    #[error("Barcode is too long (maximum {MAX_BARCODE_LEN} characters)")]
    TooLong,
    #[error("Barcode can only contain digits (and X for ISBN-10)")]
    InvalidCharacters,
    #[error("{format} checksum verification failed")]
    ChecksumMismatch { format: BarcodeFormat },
    #[error("Unrecognized barcode format")]
    UnrecognizedFormat,
}

/// Classifies and checksum-verifies a raw scanned string.
///
/// Classification runs in a fixed priority order; the first matching pattern
/// wins. That order is a tie-break policy, not mere type detection: a
/// 13-digit string is always treated as EAN-13, even when it carries an ISBN
/// `978`/`979` prefix, and a checksum failure on that path reports EAN-13
/// rather than falling through.
pub fn validate(raw: &str) -> BarcodeValidationResult {
    let cleaned = strip_separators(raw);

    if cleaned.is_empty() {
        return rejected(BarcodeError::Empty, None);
    }
    if cleaned.len() < MIN_BARCODE_LEN {
        return rejected(BarcodeError::TooShort, None);
    }
    if cleaned.len() > MAX_BARCODE_LEN {
        return rejected(BarcodeError::TooLong, None);
    }
    if !cleaned
        .chars()
        .all(|c| c.is_ascii_digit() || c == 'X' || c == 'x')
    {
        return rejected(BarcodeError::InvalidCharacters, None);
    }

    let all_digits = cleaned.chars().all(|c| c.is_ascii_digit());

    if all_digits && cleaned.len() == 13 {
        return if ean13_checksum_ok(&cleaned) {
            accepted(BarcodeFormat::Ean13, cleaned)
        } else {
            rejected(
                BarcodeError::ChecksumMismatch {
                    format: BarcodeFormat::Ean13,
                },
                Some(BarcodeFormat::Ean13),
            )
        };
    }

    if all_digits && cleaned.len() == 8 {
        return accepted(BarcodeFormat::Ean8, cleaned);
    }

    if all_digits && cleaned.len() == 12 {
        return if upca_checksum_ok(&cleaned) {
            accepted(BarcodeFormat::UpcA, cleaned)
        } else {
            rejected(
                BarcodeError::ChecksumMismatch {
                    format: BarcodeFormat::UpcA,
                },
                Some(BarcodeFormat::UpcA),
            )
        };
    }

    // Dead branch: the EAN-13 arm above consumes every 13-digit string before
    // the ISBN prefix is ever inspected. Kept in place to preserve the
    // documented classification order.
    if all_digits
        && cleaned.len() == 13
        && (cleaned.starts_with("978") || cleaned.starts_with("979"))
    {
        return accepted(BarcodeFormat::Isbn13, cleaned);
    }

    if is_isbn10(&cleaned) {
        return accepted(BarcodeFormat::Isbn10, cleaned);
    }

    // Only 6-7 digit strings reach this arm; 8-digit strings were already
    // taken by EAN-8.
    if all_digits && (MIN_BARCODE_LEN..=8).contains(&cleaned.len()) {
        return accepted(BarcodeFormat::UpcE, cleaned);
    }

    if all_digits {
        return accepted(BarcodeFormat::Unknown, cleaned);
    }

    rejected(BarcodeError::UnrecognizedFormat, None)
}

/// Cheap pre-filter: is this plausibly a barcode at all (6-14 digits after
/// separator stripping)? Performs no checksum work; callers use it to
/// distinguish barcode input from free text before paying for validation.
pub fn looks_like_barcode(input: &str) -> bool {
    let cleaned = strip_separators(input);
    (MIN_BARCODE_LEN..=MAX_BARCODE_LEN).contains(&cleaned.len())
        && cleaned.chars().all(|c| c.is_ascii_digit())
}

/// Scanners and manual entry both introduce spaces and hyphens; neither
/// carries information for lookup purposes.
fn strip_separators(raw: &str) -> String {
    raw.trim()
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '-')
        .collect()
}

fn accepted(format: BarcodeFormat, cleaned: String) -> BarcodeValidationResult {
    BarcodeValidationResult {
        is_valid: true,
        format: Some(format),
        error: None,
        // Uppercasing only matters for the trailing X of ISBN-10.
        normalized_barcode: Some(cleaned.to_uppercase()),
    }
}

fn rejected(error: BarcodeError, format: Option<BarcodeFormat>) -> BarcodeValidationResult {
    BarcodeValidationResult {
        is_valid: false,
        format,
        error: Some(error.to_string()),
        normalized_barcode: None,
    }
}

/// EAN-13: weights 1/3 on even/odd 0-indexed positions of the first 12
/// digits; `(10 - sum mod 10) mod 10` must equal digit 12.
fn ean13_checksum_ok(code: &str) -> bool {
    weighted_checksum_ok(code, 13, |index| if index % 2 == 0 { 1 } else { 3 })
}

/// UPC-A: same formula with the weights swapped, 3 on even positions of the
/// first 11 digits, against digit 11.
fn upca_checksum_ok(code: &str) -> bool {
    weighted_checksum_ok(code, 12, |index| if index % 2 == 0 { 3 } else { 1 })
}

fn weighted_checksum_ok(code: &str, len: usize, weight: fn(usize) -> u32) -> bool {
    let digits: Vec<u32> = code.chars().filter_map(|c| c.to_digit(10)).collect();
    if digits.len() != len {
        return false;
    }
    let sum: u32 = digits[..len - 1]
        .iter()
        .enumerate()
        .map(|(index, digit)| digit * weight(index))
        .sum();
    (10 - sum % 10) % 10 == digits[len - 1]
}

fn is_isbn10(code: &str) -> bool {
    let chars: Vec<char> = code.chars().collect();
    chars.len() == 10
        && chars[..9].iter().all(char::is_ascii_digit)
        && (chars[9].is_ascii_digit() || chars[9] == 'X' || chars[9] == 'x')
}
