//! Property-based tests for result aggregation.

use proptest::prelude::*;
use xref_shared::FiscalYear;

use super::{Priority, ReconciliationResult, Validation, ValidationGroup};

fn arb_priority() -> impl Strategy<Value = Priority> {
    prop_oneof![Just(Priority::Critical), Just(Priority::High)]
}

/// A group as (priority, per-validation outcomes).
fn arb_group() -> impl Strategy<Value = (Priority, Vec<bool>)> {
    (arb_priority(), prop::collection::vec(any::<bool>(), 0..5))
}

fn build(groups: &[(Priority, Vec<bool>)]) -> Vec<ValidationGroup> {
    groups
        .iter()
        .enumerate()
        .map(|(i, (priority, outcomes))| {
            let validations = outcomes
                .iter()
                .map(|&ok| {
                    let mut v = Validation::error(format!("F{i}"), "R", "m");
                    v.is_valid = ok;
                    v
                })
                .collect();
            ValidationGroup::new(format!("Group {i}"), "", *priority, "", validations, "")
        })
        .collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// The Master Update is blocked exactly when some Critical group fails.
    #[test]
    fn prop_block_iff_critical_failure(groups in prop::collection::vec(arb_group(), 0..10)) {
        let built = build(&groups);
        let expected_block = built.iter().any(|g| g.priority == Priority::Critical && !g.is_valid);

        let result = ReconciliationResult::summarize(FiscalYear::new(2024).unwrap(), built);

        prop_assert_eq!(result.block_master_update, expected_block);
        prop_assert_eq!(result.block_master_update, !result.critical_issues.is_empty());
    }

    /// Counts always add up and every failing group is classified once.
    #[test]
    fn prop_counts_are_consistent(groups in prop::collection::vec(arb_group(), 0..10)) {
        let built = build(&groups);
        let failing_groups = built.iter().filter(|g| !g.is_valid).count();
        let total: usize = groups.iter().map(|(_, o)| o.len()).sum();
        let failed: usize = groups.iter().map(|(_, o)| o.iter().filter(|ok| !**ok).count()).sum();

        let result = ReconciliationResult::summarize(FiscalYear::new(2024).unwrap(), built);

        prop_assert_eq!(result.total_validations, total);
        prop_assert_eq!(result.failed_validations, failed);
        prop_assert_eq!(result.passed_validations + result.failed_validations, result.total_validations);
        prop_assert_eq!(result.critical_issues.len() + result.warnings.len(), failing_groups);
    }
}
