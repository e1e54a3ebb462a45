//! MergeResolver - combines two records believed to describe the same store.
//!
//! The default rule is that the incoming record's defined fields win. A fixed
//! table of preserved fields is then re-applied from the existing record
//! whenever it holds a non-empty value, so contact, credential and metric data
//! survive a merge with a source that only carries display metadata.
//!
//! A field counts as "defined" when it is `Some`, a non-empty string or a
//! non-empty list. Catalog payloads are taken whole from one side, never
//! combined element-wise.

use crate::record::StoreRecord;

/// A field whose established value must survive a merge with a source that
/// lacks or empties it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreservedField {
    Email,
    Password,
    Phone,
    OwnerName,
    OwnerEmail,
    OwnerPhone,
    MerchantEmail,
    MerchantPhone,
    ContactEmail,
    ContactPhone,
    Stats,
    Credentials,
}

/// The preservation policy, as data.
pub const PRESERVED_FIELDS: &[PreservedField] = &[
    PreservedField::Email,
    PreservedField::Password,
    PreservedField::Phone,
    PreservedField::OwnerName,
    PreservedField::OwnerEmail,
    PreservedField::OwnerPhone,
    PreservedField::MerchantEmail,
    PreservedField::MerchantPhone,
    PreservedField::ContactEmail,
    PreservedField::ContactPhone,
    PreservedField::Stats,
    PreservedField::Credentials,
];

impl PreservedField {
    /// Persisted (camelCase) name of the field.
    pub fn name(&self) -> &'static str {
        match self {
            PreservedField::Email => "email",
            PreservedField::Password => "password",
            PreservedField::Phone => "phone",
            PreservedField::OwnerName => "ownerName",
            PreservedField::OwnerEmail => "ownerEmail",
            PreservedField::OwnerPhone => "ownerPhone",
            PreservedField::MerchantEmail => "merchantEmail",
            PreservedField::MerchantPhone => "merchantPhone",
            PreservedField::ContactEmail => "contactEmail",
            PreservedField::ContactPhone => "contactPhone",
            PreservedField::Stats => "stats",
            PreservedField::Credentials => "credentials",
        }
    }

    /// Whether `record` holds a defined, non-empty value for this field.
    pub fn is_present(&self, record: &StoreRecord) -> bool {
        match self {
            PreservedField::Stats => record.stats.as_ref().is_some_and(|s| !s.is_empty()),
            PreservedField::Credentials => {
                record.credentials.as_ref().is_some_and(|c| !c.is_empty())
            }
            text => text
                .text_slot(record)
                .is_some_and(|value| !value.trim().is_empty()),
        }
    }

    /// Copy this field's value from `from` onto `to`.
    fn copy(&self, from: &StoreRecord, to: &mut StoreRecord) {
        match self {
            PreservedField::Stats => to.stats = from.stats.clone(),
            PreservedField::Credentials => to.credentials = from.credentials.clone(),
            text => {
                let value = text.text_slot(from).cloned();
                if let Some(slot) = text.text_slot_mut(to) {
                    *slot = value;
                }
            }
        }
    }

    fn text_slot<'a>(&self, record: &'a StoreRecord) -> Option<&'a String> {
        match self {
            PreservedField::Email => record.email.as_ref(),
            PreservedField::Password => record.password.as_ref(),
            PreservedField::Phone => record.phone.as_ref(),
            PreservedField::OwnerName => record.owner_name.as_ref(),
            PreservedField::OwnerEmail => record.owner_email.as_ref(),
            PreservedField::OwnerPhone => record.owner_phone.as_ref(),
            PreservedField::MerchantEmail => record.merchant_email.as_ref(),
            PreservedField::MerchantPhone => record.merchant_phone.as_ref(),
            PreservedField::ContactEmail => record.contact_email.as_ref(),
            PreservedField::ContactPhone => record.contact_phone.as_ref(),
            PreservedField::Stats | PreservedField::Credentials => None,
        }
    }

    fn text_slot_mut<'a>(&self, record: &'a mut StoreRecord) -> Option<&'a mut Option<String>> {
        match self {
            PreservedField::Email => Some(&mut record.email),
            PreservedField::Password => Some(&mut record.password),
            PreservedField::Phone => Some(&mut record.phone),
            PreservedField::OwnerName => Some(&mut record.owner_name),
            PreservedField::OwnerEmail => Some(&mut record.owner_email),
            PreservedField::OwnerPhone => Some(&mut record.owner_phone),
            PreservedField::MerchantEmail => Some(&mut record.merchant_email),
            PreservedField::MerchantPhone => Some(&mut record.merchant_phone),
            PreservedField::ContactEmail => Some(&mut record.contact_email),
            PreservedField::ContactPhone => Some(&mut record.contact_phone),
            PreservedField::Stats | PreservedField::Credentials => None,
        }
    }
}

/// Merge `incoming` over `existing`.
///
/// With no `existing` record this is a clone of `incoming`. Neither input is
/// modified.
pub fn merge(incoming: &StoreRecord, existing: Option<&StoreRecord>) -> StoreRecord {
    let Some(existing) = existing else {
        return incoming.clone();
    };

    let mut merged = overlay(incoming, existing);

    for field in PRESERVED_FIELDS {
        if field.is_present(existing) {
            field.copy(existing, &mut merged);
        }
    }

    merged.disabled_features = if !existing.disabled_features.is_empty() {
        existing.disabled_features.clone()
    } else {
        incoming.disabled_features.clone()
    };

    merged
}

/// `{ ...existing, ...incoming }`: incoming's defined fields win.
fn overlay(incoming: &StoreRecord, existing: &StoreRecord) -> StoreRecord {
    let mut extra = existing.extra.clone();
    extra.extend(
        incoming
            .extra
            .iter()
            .map(|(key, value)| (key.clone(), value.clone())),
    );

    StoreRecord {
        slug: pick_text(&incoming.slug, &existing.slug),
        display_id: pick(&incoming.display_id, &existing.display_id),
        name_local: pick_text(&incoming.name_local, &existing.name_local),
        name_latin: pick_text(&incoming.name_latin, &existing.name_latin),
        email: pick(&incoming.email, &existing.email),
        phone: pick(&incoming.phone, &existing.phone),
        password: pick(&incoming.password, &existing.password),
        credentials: pick(&incoming.credentials, &existing.credentials),
        owner_name: pick(&incoming.owner_name, &existing.owner_name),
        owner_email: pick(&incoming.owner_email, &existing.owner_email),
        owner_phone: pick(&incoming.owner_phone, &existing.owner_phone),
        merchant_email: pick(&incoming.merchant_email, &existing.merchant_email),
        merchant_phone: pick(&incoming.merchant_phone, &existing.merchant_phone),
        contact_email: pick(&incoming.contact_email, &existing.contact_email),
        contact_phone: pick(&incoming.contact_phone, &existing.contact_phone),
        plan: pick(&incoming.plan, &existing.plan),
        tier: pick(&incoming.tier, &existing.tier),
        color: pick(&incoming.color, &existing.color),
        logo: pick(&incoming.logo, &existing.logo),
        description: pick(&incoming.description, &existing.description),
        categories: pick_list(&incoming.categories, &existing.categories),
        stats: pick(&incoming.stats, &existing.stats),
        disabled_features: pick_list(&incoming.disabled_features, &existing.disabled_features),
        setup_complete: pick(&incoming.setup_complete, &existing.setup_complete),
        status: pick(&incoming.status, &existing.status),
        origin: incoming.origin,
        catalog: if incoming.catalog.is_empty() {
            existing.catalog.clone()
        } else {
            incoming.catalog.clone()
        },
        extra,
    }
}

fn pick<T: Clone>(incoming: &Option<T>, existing: &Option<T>) -> Option<T> {
    incoming.clone().or_else(|| existing.clone())
}

fn pick_text(incoming: &str, existing: &str) -> String {
    let chosen = if incoming.is_empty() { existing } else { incoming };
    chosen.to_string()
}

fn pick_list<T: Clone>(incoming: &[T], existing: &[T]) -> Vec<T> {
    let chosen = if incoming.is_empty() { existing } else { incoming };
    chosen.to_vec()
}
