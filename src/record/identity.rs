//! Identity variants: the alternate keys under which a store may be known.

use std::collections::BTreeSet;

use super::StoreRecord;

/// The non-empty identity keys of a record: lower-cased email, canonical
/// slug, and stringified display id.
///
/// Any one shared variant is enough to treat two records as the same store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdentityVariants(BTreeSet<String>);

impl IdentityVariants {
    pub fn of(record: &StoreRecord) -> Self {
        let mut variants = BTreeSet::new();

        if let Some(email) = record.email.as_deref() {
            let email = email.trim().to_lowercase();
            if !email.is_empty() {
                variants.insert(email);
            }
        }

        if !record.slug.is_empty() {
            variants.insert(record.slug.clone());
        }

        if let Some(id) = &record.display_id {
            let id = id.to_string();
            let id = id.trim();
            if !id.is_empty() {
                variants.insert(id.to_string());
            }
        }

        IdentityVariants(variants)
    }

    /// A record with no variants can never be matched or deduplicated.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn contains(&self, variant: &str) -> bool {
        self.0.contains(variant)
    }

    pub fn intersects(&self, other: &IdentityVariants) -> bool {
        !self.0.is_disjoint(&other.0)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}
