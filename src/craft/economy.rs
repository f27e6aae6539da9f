//! Dynamic pricing — pure functions of the counters that grow them.
//!
//! Nothing here is stored: every cost is recomputed from current state on
//! each render. Affordability is `score >= cost`; an unaffordable purchase
//! is a disabled action, not an error.

use super::state::BASE_MAX_COMBO;

fn curve(base: f64, factor: f64, n: u32) -> i64 {
    (base * factor.powi(n as i32)).floor() as i64
}

/// Creating the `n+1`-th custom item: `floor(1000 · 1.5^n)`.
pub fn custom_item_cost(custom_item_count: u32) -> i64 {
    curve(1000.0, 1.5, custom_item_count)
}

/// Unlocking the next decoration: `floor(2000 · 1.8^unlocked)`.
pub fn decoration_cost(unlocked_count: u32) -> i64 {
    curve(2000.0, 1.8, unlocked_count)
}

/// Raising the combo ceiling by one: `floor(5000 · 1.5^(maxCombo−10))`.
/// Price grows exponentially while the benefit stays linear.
pub fn combo_upgrade_cost(max_combo: u32) -> i64 {
    curve(5000.0, 1.5, max_combo.saturating_sub(BASE_MAX_COMBO))
}

/// Summoning the next companion: `floor(5000 · 1.4^owned)`.
pub fn pet_cost(pet_count: u32) -> i64 {
    curve(5000.0, 1.4, pet_count)
}

pub fn can_afford(score: i64, cost: i64) -> bool {
    score >= cost
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn custom_item_examples() {
        assert_eq!(custom_item_cost(0), 1000);
        assert_eq!(custom_item_cost(1), 1500);
        assert_eq!(custom_item_cost(3), 3375);
    }

    #[test]
    fn decoration_examples() {
        assert_eq!(decoration_cost(0), 2000);
        assert_eq!(decoration_cost(1), 3600);
        assert_eq!(decoration_cost(2), 6480);
    }

    #[test]
    fn combo_upgrade_examples() {
        assert_eq!(combo_upgrade_cost(10), 5000);
        assert_eq!(combo_upgrade_cost(11), 7500);
        assert_eq!(combo_upgrade_cost(13), 16875);
        // Defensive: a corrupted max_combo below the base level prices as level 0.
        assert_eq!(combo_upgrade_cost(7), 5000);
    }

    #[test]
    fn pet_examples() {
        assert_eq!(pet_cost(0), 5000);
        assert_eq!(pet_cost(1), 7000);
        assert_eq!(pet_cost(2), 9800);
    }

    #[test]
    fn affordability_is_inclusive() {
        assert!(can_afford(1000, 1000));
        assert!(!can_afford(999, 1000));
    }

    proptest! {
        #[test]
        fn prop_custom_cost_strictly_increases(n in 0u32..40) {
            prop_assert!(custom_item_cost(n + 1) > custom_item_cost(n));
        }

        #[test]
        fn prop_decoration_cost_strictly_increases(n in 0u32..40) {
            prop_assert!(decoration_cost(n + 1) > decoration_cost(n));
        }

        #[test]
        fn prop_combo_cost_strictly_increases(m in 10u32..50) {
            prop_assert!(combo_upgrade_cost(m + 1) > combo_upgrade_cost(m));
        }

        #[test]
        fn prop_pet_cost_strictly_increases(n in 0u32..40) {
            prop_assert!(pet_cost(n + 1) > pet_cost(n));
        }
    }
}
