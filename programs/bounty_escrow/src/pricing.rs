//! Entry price escalation.
//!
//! `price(n) = min(base_price * (1 + rate_bps / 10_000)^n, price_cap)`
//!
//! The growth factor is a 1e18 fixed-point value raised by squaring, so the
//! cost is O(log n) regardless of how many entries an epoch has seen. Once
//! the factor alone is enough to push the price past the cap the loop stops
//! and the result saturates at `price_cap`; nothing wraps.

use crate::constants::BPS_DENOMINATOR;

const WAD: u128 = 1_000_000_000_000_000_000;

/// `floor(a * b / WAD)` without a 256-bit intermediate. `None` only when the
/// result itself does not fit in a u128.
fn mul_wad(a: u128, b: u128) -> Option<u128> {
    let (a_hi, a_lo) = (a / WAD, a % WAD);
    let (b_hi, b_lo) = (b / WAD, b % WAD);

    a_hi.checked_mul(b_hi)?
        .checked_mul(WAD)?
        .checked_add(a_hi.checked_mul(b_lo)?)?
        .checked_add(a_lo.checked_mul(b_hi)?)?
        .checked_add(a_lo * b_lo / WAD)
}

pub fn current_price(base_price: u64, rate_bps: u16, price_cap: u64, entry_count: u32) -> u64 {
    if base_price == 0 {
        return 0;
    }

    // Any factor above this puts the price over the cap.
    let limit = ((price_cap / base_price) as u128 + 1) * WAD;

    let mut step = WAD + WAD * rate_bps as u128 / BPS_DENOMINATOR as u128;
    let mut factor = WAD;
    let mut exp = entry_count;

    while exp > 0 {
        if exp & 1 == 1 {
            factor = match mul_wad(factor, step) {
                Some(f) if f <= limit => f,
                _ => return price_cap,
            };
        }
        exp >>= 1;
        if exp > 0 {
            step = match mul_wad(step, step) {
                Some(s) if s <= limit => s,
                // the remaining exponent is non-zero, so this step still gets applied
                _ => return price_cap,
            };
        }
    }

    match mul_wad(base_price as u128, factor) {
        Some(p) if p <= price_cap as u128 => p as u64,
        _ => price_cap,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const USDC: u64 = 1_000_000;

    #[test]
    fn first_entry_costs_base_price() {
        assert_eq!(current_price(10 * USDC, 78, 1_000 * USDC, 0), 10 * USDC);
    }

    #[test]
    fn one_entry_escalates_by_rate() {
        // 10 USDC at 0.78% per entry
        assert_eq!(current_price(10 * USDC, 78, 1_000 * USDC, 1), 10_078_000);
    }

    #[test]
    fn tracks_compound_growth() {
        for n in 0..200u32 {
            let got = current_price(10 * USDC, 78, u64::MAX, n) as f64;
            let expected = 10_000_000f64 * 1.0078f64.powi(n as i32);
            assert!((expected - got).abs() <= 2.0, "n={n} expected~{expected} got={got}");
        }
    }

    #[test]
    fn zero_rate_is_flat() {
        for n in [0u32, 1, 10, 1_000, u32::MAX] {
            assert_eq!(current_price(5 * USDC, 0, 100 * USDC, n), 5 * USDC);
        }
    }

    #[test]
    fn doubling_rate_stays_exact_until_cap() {
        assert_eq!(current_price(1, 10_000, 1_000_000_000_000, 9), 512);
        assert_eq!(current_price(1, 10_000, 1_000_000_000_000, 39), 549_755_813_888);
        assert_eq!(current_price(1, 10_000, 1_000_000_000_000, 40), 1_000_000_000_000);
    }

    #[test]
    fn saturates_at_cap_instead_of_overflowing() {
        assert_eq!(current_price(10 * USDC, 78, 50 * USDC, 100_000), 50 * USDC);
        assert_eq!(current_price(u64::MAX, 10_000, u64::MAX, u32::MAX), u64::MAX);
        assert_eq!(current_price(u64::MAX / 2, 10_000, u64::MAX - 1, 2), u64::MAX - 1);
    }

    #[test]
    fn cap_below_base_wins() {
        assert_eq!(current_price(10 * USDC, 78, 5 * USDC, 0), 5 * USDC);
    }

    proptest! {
        #[test]
        fn price_is_monotonic_and_capped(
            base in 1u64..=1_000_000_000_000,
            rate in 0u16..=10_000,
            cap_extra in 0u64..=1_000_000_000_000,
            n in 0u32..=5_000,
        ) {
            let cap = base.saturating_add(cap_extra);
            let p0 = current_price(base, rate, cap, n);
            let p1 = current_price(base, rate, cap, n + 1);
            prop_assert!(p1 >= p0);
            prop_assert!(p0 <= cap);
            prop_assert!(p1 <= cap);
        }
    }
}
