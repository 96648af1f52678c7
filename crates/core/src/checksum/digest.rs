//! Canonical value encoding and SHA-256 digests.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// An archived key field: its value and the digest of that value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldHash {
    /// Field value as archived.
    pub value: Decimal,
    /// Hex SHA-256 of the canonical value.
    pub digest: String,
}

impl FieldHash {
    /// Hashes a value.
    #[must_use]
    pub fn of(value: Decimal) -> Self {
        Self {
            value,
            digest: leaf_digest(value),
        }
    }

    /// Returns true if the stored digest still matches the stored value.
    #[must_use]
    pub fn is_intact(&self) -> bool {
        digests_match(&self.digest, &leaf_digest(self.value))
    }
}

/// Canonical text of a decimal: trailing zeros stripped, `-0` folded to `0`.
#[must_use]
pub fn canonical_decimal(value: Decimal) -> String {
    value.normalize().to_string()
}

fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

/// Hex SHA-256 of a value's canonical text.
#[must_use]
pub fn leaf_digest(value: Decimal) -> String {
    sha256_hex(canonical_decimal(value).as_bytes())
}

/// Hashes every extracted field.
#[must_use]
pub fn hash_fields(fields: BTreeMap<String, Decimal>) -> BTreeMap<String, FieldHash> {
    fields
        .into_iter()
        .map(|(path, value)| (path, FieldHash::of(value)))
        .collect()
}

#[derive(Serialize)]
struct CanonicalEntry<'a> {
    value: String,
    digest: &'a str,
}

/// Digest of a whole field map.
///
/// Entries are encoded in key order with canonical values, so two maps with
/// the same content always produce the same digest regardless of how they
/// were built.
#[must_use]
pub fn canonical_digest(fields: &BTreeMap<String, FieldHash>) -> String {
    let canonical: BTreeMap<&str, CanonicalEntry<'_>> = fields
        .iter()
        .map(|(path, hash)| {
            (
                path.as_str(),
                CanonicalEntry {
                    value: canonical_decimal(hash.value),
                    digest: &hash.digest,
                },
            )
        })
        .collect();

    // Serializing string keys and string values cannot fail.
    let encoded = serde_json::to_vec(&canonical).unwrap_or_default();
    sha256_hex(&encoded)
}

/// Exact, byte-wise digest comparison. No tolerance ever applies here.
#[must_use]
pub fn digests_match(archived: &str, recomputed: &str) -> bool {
    archived.as_bytes() == recomputed.as_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_canonical_decimal_strips_scale() {
        assert_eq!(canonical_decimal(dec!(250.50)), "250.5");
        assert_eq!(canonical_decimal(dec!(100.000)), "100");
        assert_eq!(canonical_decimal(dec!(-0.00)), "0");
    }

    #[test]
    fn test_leaf_digest_ignores_scale() {
        assert_eq!(leaf_digest(dec!(1.10)), leaf_digest(dec!(1.1)));
        assert_ne!(leaf_digest(dec!(1.1)), leaf_digest(dec!(1.11)));
        assert_eq!(leaf_digest(dec!(0)).len(), 64);
    }

    #[test]
    fn test_field_hash_integrity() {
        let mut hash = FieldHash::of(dec!(1000));
        assert!(hash.is_intact());

        hash.value = dec!(1001);
        assert!(!hash.is_intact());
    }

    #[test]
    fn test_canonical_digest_changes_with_any_field() {
        let mut fields = BTreeMap::new();
        fields.insert("TotalEarnings".to_string(), FieldHash::of(dec!(30)));
        fields.insert("TotalForfeitures".to_string(), FieldHash::of(dec!(10)));
        let original = canonical_digest(&fields);

        fields.insert("TotalForfeitures".to_string(), FieldHash::of(dec!(10.01)));
        assert_ne!(canonical_digest(&fields), original);
    }

    #[test]
    fn test_digests_match_is_exact() {
        let digest = leaf_digest(dec!(5));
        assert!(digests_match(&digest, &digest.clone()));
        assert!(!digests_match(&digest, &digest.to_uppercase()));
        assert!(!digests_match(&digest, &digest[..63]));
    }
}
