//! StoreRecord - the unit of reconciliation.
//!
//! Every source (seed table, local persistence, remote directory) is
//! normalized into this one shape at its boundary, so merging only ever deals
//! with a single fully-typed record.
//!
//! ## Persisted shape
//!
//! Records serialize as camelCase JSON. Older clients wrote `subdomain`,
//! `nameAr`, `nameEn`, `disabled`, `sliders` and `owner`; [`StoreRecord::from_json`]
//! accepts those when the modern key is absent. Fields this crate does not
//! model are kept in [`StoreRecord::extra`] and written back untouched.

mod identity;

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::slug::canonicalize;

pub use identity::IdentityVariants;

/// Legacy key → modern key, applied only when the modern key is missing.
const LEGACY_KEYS: &[(&str, &str)] = &[
    ("subdomain", "slug"),
    ("nameAr", "nameLocal"),
    ("nameEn", "nameLatin"),
    ("disabled", "disabledFeatures"),
    ("sliders", "sliderImages"),
    ("owner", "ownerName"),
];

/// Where a record was synthesized or read from. Informational only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Origin {
    Seed,
    #[default]
    Local,
    Remote,
}

impl Origin {
    pub fn as_str(&self) -> &'static str {
        match self {
            Origin::Seed => "seed",
            Origin::Local => "local",
            Origin::Remote => "remote",
        }
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Opaque upstream identifier; numeric in some sources, textual in others.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DisplayId {
    Number(serde_json::Number),
    Text(String),
}

impl DisplayId {
    pub fn text(value: impl Into<String>) -> Self {
        DisplayId::Text(value.into())
    }
}

impl From<u64> for DisplayId {
    fn from(value: u64) -> Self {
        DisplayId::Number(value.into())
    }
}

impl From<&str> for DisplayId {
    fn from(value: &str) -> Self {
        DisplayId::Text(value.to_string())
    }
}

impl fmt::Display for DisplayId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DisplayId::Number(number) => write!(f, "{}", number),
            DisplayId::Text(text) => f.write_str(text),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreStatus {
    Active,
    Inactive,
    #[serde(other)]
    Unknown,
}

impl StoreStatus {
    /// Interpret a free-form status string from a remote document.
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "active" => StoreStatus::Active,
            "inactive" => StoreStatus::Inactive,
            _ => StoreStatus::Unknown,
        }
    }
}

/// Login material for a store. Never dropped by a merge from a source
/// lacking it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub phone: String,
}

impl Credentials {
    pub fn is_empty(&self) -> bool {
        self.email.is_empty() && self.password.is_empty() && self.phone.is_empty()
    }
}

/// Operator-supplied metrics.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoreStats {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub orders: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub satisfaction: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub growth: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl StoreStats {
    pub fn is_empty(&self) -> bool {
        self.orders.is_none()
            && self.satisfaction.is_none()
            && self.growth.is_none()
            && self.extra.is_empty()
    }
}

/// Payloads owned by the catalog subsystem. Treated as atomic blobs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogRefs {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub products: Vec<Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub slider_images: Vec<Value>,
}

impl CatalogRefs {
    pub fn is_empty(&self) -> bool {
        self.products.is_empty() && self.slider_images.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreRecord {
    /// Canonical slug; the identity key within the registry.
    #[serde(default)]
    pub slug: String,
    #[serde(default, rename = "id", skip_serializing_if = "Option::is_none")]
    pub display_id: Option<DisplayId>,
    #[serde(default)]
    pub name_local: String,
    #[serde(default)]
    pub name_latin: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credentials: Option<Credentials>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub merchant_email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub merchant_phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_phone: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plan: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tier: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub categories: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stats: Option<StoreStats>,
    /// Authoritative deny-list of dashboard features.
    #[serde(default)]
    pub disabled_features: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub setup_complete: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<StoreStatus>,
    #[serde(default)]
    pub origin: Origin,

    #[serde(flatten)]
    pub catalog: CatalogRefs,
    /// Persisted fields not modelled here.
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl StoreRecord {
    /// A bare record with the given raw slug, canonicalized.
    pub fn new(slug: &str, origin: Origin) -> Self {
        Self {
            slug: canonicalize(slug),
            origin,
            ..Self::default()
        }
    }

    /// Parse a persisted or externally supplied JSON document, accepting the
    /// legacy key names, and canonicalize its slug.
    pub fn from_json(value: Value) -> Result<Self, serde_json::Error> {
        let value = match value {
            Value::Object(map) => Value::Object(upgrade_legacy_keys(map)),
            other => other,
        };
        let record: StoreRecord = serde_json::from_value(value)?;
        Ok(record.normalized())
    }

    /// Re-canonicalize the slug in place.
    pub fn normalized(mut self) -> Self {
        self.slug = canonicalize(&self.slug);
        self
    }

    /// Whether the record has a non-empty canonical slug.
    pub fn is_identified(&self) -> bool {
        !self.slug.is_empty()
    }

    pub fn is_active(&self) -> bool {
        self.status != Some(StoreStatus::Inactive)
    }

    pub fn is_setup_complete(&self) -> bool {
        self.setup_complete == Some(true)
    }

    /// The name to show, preferring the localized one.
    pub fn display_name(&self) -> &str {
        if !self.name_local.is_empty() {
            &self.name_local
        } else if !self.name_latin.is_empty() {
            &self.name_latin
        } else {
            &self.slug
        }
    }

    pub fn identity_variants(&self) -> IdentityVariants {
        IdentityVariants::of(self)
    }

    /// Two records refer to the same store when any identity variant is shared.
    pub fn shares_identity(&self, other: &StoreRecord) -> bool {
        self.identity_variants()
            .intersects(&other.identity_variants())
    }
}

fn upgrade_legacy_keys(mut map: Map<String, Value>) -> Map<String, Value> {
    for (legacy, modern) in LEGACY_KEYS {
        if map.contains_key(*modern) {
            continue;
        }
        if let Some(value) = map.remove(*legacy) {
            map.insert((*modern).to_string(), value);
        }
    }
    map
}
