//! Admissibility predicate for decrypted pricing records.
//!
//! The verifier certifies that a disclosed multiplier lies in the legal
//! band and that a base price was set.  It is deliberately a range check:
//! at verification time the original demand/supply plaintext is no longer
//! available, so the multiplier is not re-derived from scratch.

use crate::pricing::{MAX_SURGE, NO_SURGE};

/// Returns true when the decrypted pricing fields pass the admissibility
/// check: `100 <= multiplier <= 300` and `base_price > 0`.
pub fn is_admissible(multiplier: u32, base_price: u64) -> bool {
    (NO_SURGE..=MAX_SURGE).contains(&multiplier) && base_price > 0
}

#[cfg(test)]
mod tests {
    use super::is_admissible;
    use crate::pricing::DEFAULT_BASE_PRICE;

    #[test]
    fn test_band_edges_are_inclusive() {
        assert!(is_admissible(100, DEFAULT_BASE_PRICE));
        assert!(is_admissible(300, DEFAULT_BASE_PRICE));
        assert!(!is_admissible(99, DEFAULT_BASE_PRICE));
        assert!(!is_admissible(301, DEFAULT_BASE_PRICE));
    }

    #[test]
    fn test_zero_base_price_is_rejected() {
        assert!(!is_admissible(200, 0));
        assert!(is_admissible(200, 1));
    }
}
