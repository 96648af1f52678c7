//! Property-based tests for the balance equation.

use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use xref_shared::FiscalYear;

use super::{BalanceComponents, BalanceEquationEvaluator};

fn arb_amount() -> impl Strategy<Value = Decimal> {
    (-100_000_000i64..100_000_000i64).prop_map(|n| Decimal::new(n, 2))
}

fn arb_components() -> impl Strategy<Value = BalanceComponents> {
    (
        arb_amount(),
        arb_amount(),
        arb_amount(),
        arb_amount(),
        arb_amount(),
        arb_amount(),
        arb_amount(),
    )
        .prop_map(
            |(beginning_balance, contributions, alloc_in, distributions, alloc_out, earnings, forfeitures)| {
                let mut components = BalanceComponents {
                    beginning_balance,
                    contributions,
                    alloc_in,
                    distributions,
                    alloc_out,
                    earnings,
                    forfeitures,
                    expected_ending_balance: Decimal::ZERO,
                };
                components.expected_ending_balance = components.calculated_ending_balance().unwrap();
                components
            },
        )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Reported ending balance equal to the computed one always passes.
    #[test]
    fn prop_identity_holds(components in arb_components()) {
        let group = BalanceEquationEvaluator::new(dec!(0.01))
            .evaluate_components(FiscalYear::new(2024).unwrap(), &components, &[]);
        prop_assert!(group.is_valid);
        prop_assert_eq!(group.validations.len(), 8);
    }

    /// A drift of at least the tolerance always fails, with the drift as variance.
    #[test]
    fn prop_drift_fails(components in arb_components(), cents in 1i64..1_000_000i64, negative in any::<bool>()) {
        let drift = if negative { Decimal::new(-cents, 2) } else { Decimal::new(cents, 2) };
        let mut drifted = components;
        drifted.expected_ending_balance += drift;

        let group = BalanceEquationEvaluator::new(dec!(0.01))
            .evaluate_components(FiscalYear::new(2024).unwrap(), &drifted, &[]);
        prop_assert!(!group.is_valid);

        let verdict = group.validations.last().unwrap();
        prop_assert_eq!(verdict.variance, Some(-drift));
    }

    /// Component validations never fail; only the verdict can.
    #[test]
    fn prop_components_are_informational(components in arb_components(), ending in arb_amount()) {
        let mut components = components;
        components.expected_ending_balance = ending;

        let group = BalanceEquationEvaluator::new(dec!(0.01))
            .evaluate_components(FiscalYear::new(2024).unwrap(), &components, &[]);
        prop_assert!(group.validations[..7].iter().all(|v| v.is_valid));
    }
}
