//! Deterministic surge-multiplier calculation.
//!
//! The formula is fixed and public: the multiplier is a scaled integer
//! (100 = 1.00x) chosen from five buckets by the demand/supply ratio.  All
//! arithmetic is integer-only so that independent verifiers reproduce the
//! result bit-for-bit.

/// Scale factor for multipliers: a value of 100 means 1.00x.
pub const MULTIPLIER_SCALE: u32 = 100;

/// Multiplier applied when no surge is in effect (1.00x).
pub const NO_SURGE: u32 = 100;

/// Saturation multiplier applied when no drivers are available (3.00x).
pub const MAX_SURGE: u32 = 300;

/// Placeholder base price (in smallest currency unit) attached to every
/// computed pricing record.  Policy decision external to the calculator.
pub const DEFAULT_BASE_PRICE: u64 = 1000;

/// Computes the surge multiplier for the given demand and supply counts.
///
/// Total over all input pairs: `available_drivers == 0` saturates at
/// [`MAX_SURGE`]; otherwise the scaled ratio `request_count * 100 /
/// available_drivers` (truncating division) selects one of the remaining
/// buckets.  The widening to `u64` keeps the intermediate product exact for
/// every `u32` input.
pub fn surge_multiplier(request_count: u32, available_drivers: u32) -> u32 {
    if available_drivers == 0 {
        return MAX_SURGE;
    }
    let ratio = u64::from(request_count) * u64::from(MULTIPLIER_SCALE) / u64::from(available_drivers);
    if ratio > 200 {
        250
    } else if ratio > 150 {
        200
    } else if ratio > 100 {
        150
    } else {
        NO_SURGE
    }
}
