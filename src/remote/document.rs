//! Remote document shapes and their normalization into [`StoreRecord`]s.
//!
//! The directory is either a bare array of summaries or `{ "stores": [...] }`.
//! Detail documents are per-store objects. Both are parsed leniently: an
//! entry that does not fit is skipped, never fatal for its siblings.

use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

use super::endpoints::resolve_asset;
use crate::record::{CatalogRefs, DisplayId, Origin, StoreRecord, StoreStatus};
use crate::slug::canonicalize;

/// Logo used when no source supplies one.
pub const FALLBACK_LOGO: &str = "/default-store.png";

/// A directory entry.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreSummary {
    pub slug: Option<String>,
    pub subdomain: Option<String>,
    pub name: Option<String>,
    pub name_ar: Option<String>,
    pub name_en: Option<String>,
    pub id: Option<DisplayId>,
    pub logo: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub categories: Vec<String>,
    pub status: Option<String>,
}

impl StoreSummary {
    /// Canonical slug from `slug`, else `subdomain`, else `name`. Empty when
    /// none of them is usable.
    pub fn canonical_slug(&self) -> String {
        let raw = non_blank(&self.slug)
            .or_else(|| non_blank(&self.subdomain))
            .or_else(|| non_blank(&self.name));
        raw.map(canonicalize).unwrap_or_default()
    }
}

/// A per-store detail document.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreDetail {
    pub slug: Option<String>,
    pub subdomain: Option<String>,
    pub id: Option<DisplayId>,
    pub name: Option<String>,
    pub name_ar: Option<String>,
    pub name_en: Option<String>,
    pub description: Option<String>,
    pub logo: Option<String>,
    #[serde(default)]
    pub categories: Vec<String>,
    pub status: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    #[serde(default)]
    pub products: Vec<Value>,
    #[serde(default, alias = "sliders")]
    pub slider_images: Vec<Value>,
}

impl StoreDetail {
    pub fn from_value(value: Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value)
    }

    pub fn canonical_slug(&self) -> String {
        let raw = non_blank(&self.slug).or_else(|| non_blank(&self.subdomain));
        raw.map(canonicalize).unwrap_or_default()
    }
}

/// Directory entries, or `None` when the document has neither accepted shape.
pub fn directory_entries(document: Value) -> Option<Vec<Value>> {
    match document {
        Value::Array(entries) => Some(entries),
        Value::Object(mut map) => match map.remove("stores") {
            Some(Value::Array(entries)) => Some(entries),
            _ => None,
        },
        _ => None,
    }
}

/// Parse one directory entry; unparseable entries are logged and dropped.
pub fn parse_summary(index: usize, entry: Value) -> Option<StoreSummary> {
    match serde_json::from_value(entry) {
        Ok(summary) => Some(summary),
        Err(error) => {
            warn!(index, error = %error, "directory entry is malformed, skipping");
            None
        }
    }
}

/// A fetched detail document and the base that served it.
#[derive(Debug, Clone, PartialEq)]
pub struct ServedDetail {
    pub detail: StoreDetail,
    pub base: String,
}

/// Normalize a summary and its optional detail into one remote record.
///
/// Detail fields win over summary fields. The record is marked set up and
/// active unless the remote data says `inactive`. Names and logo are left
/// empty when neither document has them; see [`fill_display_defaults`].
pub fn remote_record(
    summary: &StoreSummary,
    summary_base: &str,
    detail: Option<&ServedDetail>,
) -> StoreRecord {
    let summary_slug = summary.canonical_slug();
    let detail_doc = detail.map(|served| &served.detail);

    let slug = detail_doc
        .map(StoreDetail::canonical_slug)
        .filter(|slug| !slug.is_empty())
        .unwrap_or(summary_slug);

    let name_local = detail_doc
        .and_then(|d| non_blank(&d.name_ar).or_else(|| non_blank(&d.name)))
        .or_else(|| non_blank(&summary.name_ar).or_else(|| non_blank(&summary.name)))
        .unwrap_or_default()
        .to_string();
    let name_latin = detail_doc
        .and_then(|d| non_blank(&d.name_en))
        .or_else(|| non_blank(&summary.name_en))
        .unwrap_or_default()
        .to_string();

    let logo = match detail {
        Some(served) if non_blank(&served.detail.logo).is_some() => {
            non_blank(&served.detail.logo).map(|logo| resolve_asset(&served.base, logo))
        }
        _ => non_blank(&summary.logo).map(|logo| resolve_asset(summary_base, logo)),
    };

    let status = detail_doc
        .and_then(|d| non_blank(&d.status))
        .or_else(|| non_blank(&summary.status))
        .map(StoreStatus::parse)
        .map(|status| match status {
            StoreStatus::Inactive => StoreStatus::Inactive,
            _ => StoreStatus::Active,
        })
        .unwrap_or(StoreStatus::Active);

    let categories = match detail_doc {
        Some(d) if !d.categories.is_empty() => d.categories.clone(),
        _ => summary.categories.clone(),
    };

    StoreRecord {
        slug,
        display_id: detail_doc
            .and_then(|d| d.id.clone())
            .or_else(|| summary.id.clone()),
        name_local,
        name_latin,
        email: detail_doc.and_then(|d| non_blank(&d.email)).map(str::to_string),
        phone: detail_doc.and_then(|d| non_blank(&d.phone)).map(str::to_string),
        logo,
        description: detail_doc
            .and_then(|d| non_blank(&d.description))
            .or_else(|| non_blank(&summary.description))
            .map(str::to_string),
        categories,
        setup_complete: Some(true),
        status: Some(status),
        origin: Origin::Remote,
        catalog: detail_doc
            .map(|d| CatalogRefs {
                products: d.products.clone(),
                slider_images: d.slider_images.clone(),
            })
            .unwrap_or_default(),
        ..StoreRecord::default()
    }
}

/// Give a merged record a display name and logo if it still lacks them.
pub fn fill_display_defaults(record: &mut StoreRecord) {
    if record.name_local.trim().is_empty() && record.name_latin.trim().is_empty() {
        record.name_local = record.slug.clone();
    }
    if record.logo.as_deref().map_or(true, |logo| logo.trim().is_empty()) {
        record.logo = Some(FALLBACK_LOGO.to_string());
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|value| !value.is_empty())
}
