//! Property-based tests for checksum derivation.

use proptest::prelude::*;
use rust_decimal::Decimal;

use super::{ChecksumValidator, canonical_digest, hash_fields, leaf_digest, walk_numeric_leaves};

fn arb_amount() -> impl Strategy<Value = Decimal> {
    (-1_000_000_000i64..1_000_000_000i64).prop_map(|n| Decimal::new(n, 2))
}

/// Distinct field names with amounts.
fn arb_fields() -> impl Strategy<Value = Vec<(String, Decimal)>> {
    prop::collection::btree_map("[A-Z][A-Za-z]{0,12}", arb_amount(), 1..12)
        .prop_map(|m| m.into_iter().collect())
}

/// Renders fields as a JSON object with members in the given order.
fn render(fields: &[(String, Decimal)]) -> String {
    let members: Vec<String> = fields
        .iter()
        .map(|(name, value)| format!("\"{name}\": {value}"))
        .collect();
    format!("{{{}}}", members.join(", "))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// The same content yields the same digest whatever the member order.
    #[test]
    fn prop_digest_ignores_member_order(fields in arb_fields()) {
        let forward = render(&fields);
        let mut reversed_fields = fields.clone();
        reversed_fields.reverse();
        let reversed = render(&reversed_fields);

        let archived = {
            let value: serde_json::Value = serde_json::from_str(&forward).unwrap();
            canonical_digest(&hash_fields(walk_numeric_leaves(&value)))
        };

        let outcome = ChecksumValidator::new().validate(&archived, reversed.as_bytes()).unwrap();
        prop_assert!(outcome.is_valid);
        prop_assert_eq!(outcome.recomputed_digest, archived);
    }

    /// Changing any single value changes the digest.
    #[test]
    fn prop_any_value_change_is_detected(
        fields in arb_fields(),
        index in any::<prop::sample::Index>(),
        delta in 1i64..1_000_000i64,
    ) {
        let archived = {
            let value: serde_json::Value = serde_json::from_str(&render(&fields)).unwrap();
            canonical_digest(&hash_fields(walk_numeric_leaves(&value)))
        };

        let mut drifted = fields.clone();
        let i = index.index(drifted.len());
        drifted[i].1 += Decimal::new(delta, 2);

        let outcome = ChecksumValidator::new()
            .validate(&archived, render(&drifted).as_bytes())
            .unwrap();
        prop_assert!(!outcome.is_valid);
    }

    /// Trailing zeros never change a leaf digest.
    #[test]
    fn prop_leaf_digest_is_scale_invariant(amount in arb_amount(), extra in 0u32..6) {
        let mut rescaled = amount;
        rescaled.rescale(amount.scale() + extra);
        prop_assert_eq!(leaf_digest(rescaled), leaf_digest(amount));
    }
}
