//! Amount formatting — raw input to integer and back to a grouped display
//! string.

/// Strip every non-digit character and parse the remainder as a base-10
/// integer (saturating on overflow). No digits at all is 0, not an error.
pub fn normalize_numeric(raw: &str) -> u64 {
    raw.chars()
        .filter_map(|c| c.to_digit(10))
        .fold(0u64, |acc, d| acc.saturating_mul(10).saturating_add(d as u64))
}

/// Render an amount with comma grouping in threes, the way 원 amounts are
/// displayed to the user.
pub fn display_numeric(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// Grouped rendering for signed amounts (the forgiveness estimate may go
/// negative on malformed data and is displayed as-is).
pub fn display_signed(n: i64) -> String {
    if n < 0 {
        format!("-{}", display_numeric(n.unsigned_abs()))
    } else {
        display_numeric(n as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn normalize_strips_grouping() {
        assert_eq!(normalize_numeric("1,000,000"), 1_000_000);
        assert_eq!(normalize_numeric("3000만원"), 3000);
        assert_eq!(normalize_numeric("  12 34 "), 1234);
    }

    #[test]
    fn normalize_without_digits_is_zero() {
        assert_eq!(normalize_numeric(""), 0);
        assert_eq!(normalize_numeric("abc"), 0);
        assert_eq!(normalize_numeric("원"), 0);
    }

    #[test]
    fn normalize_saturates_on_overflow() {
        let huge = "9".repeat(40);
        assert_eq!(normalize_numeric(&huge), u64::MAX);
    }

    #[test]
    fn display_groups_in_threes() {
        assert_eq!(display_numeric(0), "0");
        assert_eq!(display_numeric(999), "999");
        assert_eq!(display_numeric(1_000), "1,000");
        assert_eq!(display_numeric(1_900_000), "1,900,000");
        assert_eq!(display_numeric(50_000_000), "50,000,000");
    }

    #[test]
    fn display_signed_keeps_negative_values() {
        assert_eq!(display_signed(-1_500_000), "-1,500,000");
        assert_eq!(display_signed(32_000_000), "32,000,000");
    }

    proptest! {
        #[test]
        fn display_round_trips_through_normalize(n in any::<u64>()) {
            prop_assert_eq!(normalize_numeric(&display_numeric(n)), n);
        }
    }
}
