//! Property-based tests for the transfer zero-sum check.

use proptest::prelude::*;
use rust_decimal::Decimal;
use xref_shared::FiscalYear;

use super::AllocTransferEvaluator;

fn arb_postings() -> impl Strategy<Value = Vec<Decimal>> {
    prop::collection::vec((1i64..10_000_000i64).prop_map(|n| Decimal::new(n, 2)), 0..20)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Outgoing postings that mirror the incoming ones always net to zero.
    #[test]
    fn prop_mirrored_transfers_balance(incoming in arb_postings()) {
        let outgoing: Vec<Decimal> = incoming.iter().map(|d| -*d).collect();
        let group = AllocTransferEvaluator::evaluate(FiscalYear::new(2024).unwrap(), &incoming, &outgoing);
        prop_assert!(group.is_valid);
    }

    /// Any non-zero residue fails, reported exactly as the variance.
    #[test]
    fn prop_any_residue_fails(incoming in arb_postings(), residue in (1i64..1_000_000i64).prop_map(|n| Decimal::new(n, 4))) {
        let mut outgoing: Vec<Decimal> = incoming.iter().map(|d| -*d).collect();
        outgoing.push(-residue);

        let group = AllocTransferEvaluator::evaluate(FiscalYear::new(2024).unwrap(), &incoming, &outgoing);
        prop_assert!(!group.is_valid);
        prop_assert_eq!(group.validations[2].variance, Some(-residue));
    }
}
