//! Success probability curves
//!
//! All curves take the caster's specialist ratio and the target's, reduce
//! them to a relative ratio, and return a clamped probability. The relative
//! ratio is guarded so the exponentials can never see zero, a negative, or a
//! non-finite input: a probability outside its clamp band is a bug, NaN is a
//! worse one.

use crate::core::config::config;

/// Caster ratio over target ratio, guarded against degenerate inputs.
///
/// A target with no specialists at all gives an effectively infinite
/// advantage; a caster with none gives effectively zero. Both map onto
/// finite extremes so every downstream `powf`/`exp` stays finite.
fn relative_ratio(own: f64, target: f64) -> f64 {
    if !own.is_finite() || !target.is_finite() {
        return 1e-9;
    }
    if own <= 0.0 {
        return 1e-9;
    }
    if target <= 0.0 {
        return 1e9;
    }
    own / target
}

/// Chance for an information gathering operation:
/// `0.8 ^ (2 / (1.4r)^1.2)`, clamped to [0.01, 0.99].
pub fn info_chance(own_ratio: f64, target_ratio: f64) -> f64 {
    let r = relative_ratio(own_ratio, target_ratio);
    let chance = 0.8_f64.powf(2.0 / (r * 1.4).powf(1.2));
    chance.clamp(0.01, 0.99)
}

/// Chance for a theft operation: `0.6 ^ (2 / (1.2r)^1.2)`, clamped to
/// [0.01, 0.99]. Steeper than the info curve so stealing needs real
/// superiority.
pub fn theft_chance(own_ratio: f64, target_ratio: f64) -> f64 {
    let r = relative_ratio(own_ratio, target_ratio);
    let chance = 0.6_f64.powf(2.0 / (r * 1.2).powf(1.2));
    chance.clamp(0.01, 0.99)
}

/// Chance for a hostile operation or spell: a logistic in the relative
/// ratio with a small linear tail, then penalized by the target's absolute
/// ratio, clamped to [0.01, 0.95]. Never certain: a maxed-out caster can
/// still fizzle.
pub fn black_op_chance(own_ratio: f64, target_ratio: f64) -> f64 {
    let r = relative_ratio(own_ratio, target_ratio);
    let logistic = 1.0 / (1.0 + (r.powf(-0.6) - r).exp());
    let chance = logistic + 0.008 * r + 0.07;
    let target_penalty = 1.0 - 0.25 * target_ratio.max(0.0).sqrt();
    (chance * target_penalty).clamp(0.01, 0.95)
}

/// An invasion succeeds when offense strictly exceeds defense. Equal power
/// favors the defender.
pub fn invasion_succeeds(op: f64, dp: f64) -> bool {
    op > dp
}

/// A failed invasion is overwhelmed when offense fell short of defense by
/// the configured fraction or more. Zero-defense targets can never
/// overwhelm an attacker.
pub fn is_overwhelmed(op: f64, dp: f64) -> bool {
    if dp <= 0.0 {
        return false;
    }
    1.0 - op / dp >= config().overwhelmed_threshold
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_even_ratio_info_chance() {
        // r = 1: 0.8^(2 / 1.4^1.2), about 66%
        let chance = info_chance(1.0, 1.0);
        assert!(chance > 0.6 && chance < 0.7, "got {chance}");
    }

    #[test]
    fn test_theft_harder_than_info_at_parity() {
        assert!(theft_chance(1.0, 1.0) < info_chance(1.0, 1.0));
    }

    #[test]
    fn test_zero_target_ratio_maxes_out() {
        assert_eq!(info_chance(1.0, 0.0), 0.99);
        assert_eq!(theft_chance(1.0, 0.0), 0.99);
    }

    #[test]
    fn test_zero_own_ratio_bottoms_out() {
        assert_eq!(info_chance(0.0, 1.0), 0.01);
        assert_eq!(black_op_chance(0.0, 1.0), 0.01);
    }

    #[test]
    fn test_black_op_never_certain() {
        assert!(black_op_chance(1000.0, 0.0) <= 0.95);
    }

    #[test]
    fn test_strong_target_penalizes_black_ops() {
        let vs_weak = black_op_chance(1.0, 0.5);
        let vs_strong = black_op_chance(2.0, 1.0);
        // Same relative ratio, bigger absolute target ratio
        assert!(vs_strong < vs_weak);
    }

    #[test]
    fn test_equal_power_defends() {
        assert!(!invasion_succeeds(1000.0, 1000.0));
        assert!(invasion_succeeds(1000.1, 1000.0));
    }

    #[test]
    fn test_overwhelmed_threshold() {
        assert!(is_overwhelmed(850.0, 1000.0));
        assert!(!is_overwhelmed(851.0, 1000.0));
        assert!(!is_overwhelmed(0.0, 0.0));
    }

    proptest! {
        #[test]
        fn prop_info_chance_stays_in_band(own in 0.0f64..100.0, target in 0.0f64..100.0) {
            let chance = info_chance(own, target);
            prop_assert!((0.01..=0.99).contains(&chance));
        }

        #[test]
        fn prop_theft_chance_stays_in_band(own in 0.0f64..100.0, target in 0.0f64..100.0) {
            let chance = theft_chance(own, target);
            prop_assert!((0.01..=0.99).contains(&chance));
        }

        #[test]
        fn prop_black_op_chance_stays_in_band(own in 0.0f64..100.0, target in 0.0f64..100.0) {
            let chance = black_op_chance(own, target);
            prop_assert!((0.01..=0.95).contains(&chance));
        }

        #[test]
        fn prop_info_chance_monotone_in_own_ratio(
            target in 0.1f64..10.0,
            low in 0.1f64..5.0,
            bump in 0.1f64..5.0,
        ) {
            prop_assert!(info_chance(low + bump, target) >= info_chance(low, target));
        }

        #[test]
        fn prop_invasion_threshold_is_strict(dp in 0.0f64..1e6) {
            prop_assert!(!invasion_succeeds(dp, dp));
        }
    }
}
