//! Validation utilities for the Little Bites platform

use crate::models::AgeGroup;

// ============================================================================
// Barcode Validations
// ============================================================================

/// Validate a scanned or typed barcode and return its digits.
///
/// Accepts EAN-13, UPC-A and EAN-8 codes with a correct check digit.
/// Separators (spaces, dashes) are ignored, but the raw input must be at
/// least 8 characters long.
pub fn validate_barcode(barcode: &str) -> Result<String, &'static str> {
    let barcode = barcode.trim();
    if barcode.len() < 8 {
        return Err("Barcode must be at least 8 characters");
    }

    let digits: String = barcode.chars().filter(|c| c.is_ascii_digit()).collect();
    let valid = match digits.len() {
        13 => validate_ean13(&digits),
        12 => validate_upca(&digits),
        8 => validate_ean8(&digits),
        _ => return Err("Barcode must be EAN-13, UPC-A or EAN-8"),
    };

    if valid {
        Ok(digits)
    } else {
        Err("Invalid barcode check digit")
    }
}

/// Check if a barcode is valid
pub fn is_valid_barcode(barcode: &str) -> bool {
    validate_barcode(barcode).is_ok()
}

/// EAN-13: weights 1,3,1,3... over the first 12 digits
fn validate_ean13(digits: &str) -> bool {
    check_digit_matches(digits, |i| if i % 2 == 0 { 1 } else { 3 })
}

/// UPC-A: weights 3,1,3,1... over the first 11 digits
fn validate_upca(digits: &str) -> bool {
    check_digit_matches(digits, |i| if i % 2 == 0 { 3 } else { 1 })
}

/// EAN-8: weights 3,1,3,1... over the first 7 digits
fn validate_ean8(digits: &str) -> bool {
    check_digit_matches(digits, |i| if i % 2 == 0 { 3 } else { 1 })
}

fn check_digit_matches(digits: &str, weight: impl Fn(usize) -> u32) -> bool {
    let values: Vec<u32> = digits.chars().filter_map(|c| c.to_digit(10)).collect();
    let Some((&check, body)) = values.split_last() else {
        return false;
    };

    let sum: u32 = body.iter().enumerate().map(|(i, d)| d * weight(i)).sum();
    (10 - (sum % 10)) % 10 == check
}

// ============================================================================
// Grading Input Validations
// ============================================================================

/// Validate an age group label strictly (the grading engine itself falls
/// back to `6-12months` for unknown labels)
pub fn validate_age_group(age_group: &str) -> Result<AgeGroup, &'static str> {
    age_group.trim().parse()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn accepts_known_good_codes() {
        assert_eq!(validate_barcode("4006381333931"), Ok("4006381333931".to_string()));
        assert_eq!(validate_barcode("036000291452"), Ok("036000291452".to_string()));
        assert_eq!(validate_barcode("96385074"), Ok("96385074".to_string()));
    }

    #[test]
    fn strips_separators() {
        assert_eq!(validate_barcode("4006381-333931"), Ok("4006381333931".to_string()));
        assert_eq!(validate_barcode(" 0 36000 29145 2 "), Ok("036000291452".to_string()));
    }

    #[test]
    fn rejects_bad_check_digit() {
        assert_eq!(validate_barcode("4006381333932"), Err("Invalid barcode check digit"));
        assert!(!is_valid_barcode("036000291453"));
    }

    #[test]
    fn rejects_short_or_odd_lengths() {
        assert!(validate_barcode("1234567").is_err());
        assert!(validate_barcode("").is_err());
        assert_eq!(
            validate_barcode("1234567890"),
            Err("Barcode must be EAN-13, UPC-A or EAN-8")
        );
    }

    #[test]
    fn age_group_labels() {
        assert_eq!(validate_age_group("2-5years"), Ok(AgeGroup::TwoToFiveYears));
        assert_eq!(validate_age_group(" 0-6months "), Ok(AgeGroup::ZeroToSixMonths));
        assert!(validate_age_group("6-12 months").is_err());
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Appending the computed check digit always yields a valid EAN-13
        #[test]
        fn prop_ean13_with_computed_check_digit_is_valid(body in proptest::collection::vec(0u32..10, 12)) {
            let sum: u32 = body
                .iter()
                .enumerate()
                .map(|(i, d)| d * if i % 2 == 0 { 1 } else { 3 })
                .sum();
            let check = (10 - (sum % 10)) % 10;
            let code: String = body
                .iter()
                .chain(std::iter::once(&check))
                .map(|d| char::from_digit(*d, 10).unwrap())
                .collect();

            prop_assert!(is_valid_barcode(&code));
        }
    }
}
