//! Seed profiles - known merchants used to bootstrap the registry before any
//! persisted or remote data is available.
//!
//! Profiles and credentials live in two parallel static tables keyed by
//! profile id. A profile without credentials cannot become a loginable store
//! and is dropped.

use tracing::warn;

use crate::record::{Credentials, DisplayId, Origin, StoreRecord, StoreStats};
use crate::slug::canonicalize;

#[derive(Debug, Clone, Copy)]
pub struct SeedStats {
    pub orders: u64,
    pub satisfaction: u32,
    pub growth: &'static str,
}

#[derive(Debug, Clone, Copy)]
pub struct MerchantProfile {
    pub id: &'static str,
    pub name: &'static str,
    pub name_latin: &'static str,
    pub tagline: &'static str,
    pub owner: &'static str,
    pub plan: &'static str,
    pub tier: &'static str,
    pub color: &'static str,
    pub logo: &'static str,
    pub stats: SeedStats,
    pub disabled: Option<&'static [&'static str]>,
}

#[derive(Debug, Clone, Copy)]
pub struct SeedCredentials {
    pub email: &'static str,
    pub password: &'static str,
    pub phone: &'static str,
}

pub const MERCHANT_PROFILES: &[MerchantProfile] = &[
    MerchantProfile {
        id: "nawaem",
        name: "متجر نواعم",
        name_latin: "Nawaem",
        tagline: "منتجات الجمال والعناية النسائية",
        owner: "منير",
        plan: "Enterprise",
        tier: "بلاتيني",
        color: "from-rose-500 to-fuchsia-500",
        logo: "/assets/stores/nawaem.webp",
        stats: SeedStats { orders: 1280, satisfaction: 97, growth: "+18%" },
        disabled: Some(&["logistics-bidding"]),
    },
    MerchantProfile {
        id: "sherine",
        name: "متجر شيرين",
        name_latin: "Sheirine",
        tagline: "أزياء معاصرة بتجربة متكاملة",
        owner: "سالم",
        plan: "Enterprise",
        tier: "ذهبي",
        color: "from-sky-500 to-indigo-500",
        logo: "/assets/stores/sheirine.webp",
        stats: SeedStats { orders: 1124, satisfaction: 94, growth: "+12%" },
        disabled: Some(&["logistics-bidding"]),
    },
    MerchantProfile {
        id: "pretty",
        name: "متجر بيريتي بيوتي",
        name_latin: "Pretty Beauty",
        tagline: "علامة تجارية متخصصة في الجمال الطبيعي",
        owner: "كامل",
        plan: "Pro",
        tier: "ذهبي",
        color: "from-emerald-500 to-lime-500",
        logo: "/assets/stores/pretty.webp",
        stats: SeedStats { orders: 980, satisfaction: 92, growth: "+9%" },
        disabled: Some(&["logistics-bidding", "finance-wallet"]),
    },
    MerchantProfile {
        id: "delta",
        name: "متجر دالتا ستور",
        name_latin: "Delta Store",
        tagline: "حلول تقنية للأجهزة والإلكترونيات",
        owner: "ماجد",
        plan: "Pro",
        tier: "فضي",
        color: "from-purple-500 to-violet-500",
        logo: "/assets/stores/delta-store.webp",
        stats: SeedStats { orders: 846, satisfaction: 90, growth: "+7%" },
        disabled: Some(&["marketing-loyalty", "logistics-bidding"]),
    },
    MerchantProfile {
        id: "magna",
        name: "متجر ميجنا",
        name_latin: "Magna Beauty",
        tagline: "منتجات العناية الفاخرة والبوتيك",
        owner: "حسن",
        plan: "Pro",
        tier: "فضي",
        color: "from-amber-500 to-orange-500",
        logo: "/assets/stores/magna-beauty.webp",
        stats: SeedStats { orders: 772, satisfaction: 89, growth: "+6%" },
        disabled: Some(&["analytics-stock", "logistics-bidding"]),
    },
    MerchantProfile {
        id: "indeesh",
        name: "متجر انديش",
        name_latin: "Indeesh",
        tagline: "حلول العناية المنزلية والعطور",
        owner: "سالم محمد الأشقر",
        plan: "Enterprise",
        tier: "بلاتيني",
        color: "from-indigo-500 to-purple-500",
        logo: "/assets/indeesh/logo/indeesh.png",
        stats: SeedStats { orders: 640, satisfaction: 95, growth: "+14%" },
        disabled: None,
    },
];

/// Login credentials keyed by profile id.
pub const MERCHANT_CREDENTIALS: &[(&str, SeedCredentials)] = &[
    ("nawaem", SeedCredentials { email: "mounir@gmail.com", password: "mounir123", phone: "218910000001" }),
    ("sherine", SeedCredentials { email: "salem@gmail.com", password: "salem123", phone: "218910000002" }),
    ("delta", SeedCredentials { email: "majed@gmail.com", password: "majed123", phone: "218910000003" }),
    ("pretty", SeedCredentials { email: "kamel@gmail.com", password: "kamel123", phone: "218910000004" }),
    ("magna", SeedCredentials { email: "hasan@gmail.com", password: "hasan123", phone: "218910000005" }),
];

pub fn credentials_for(profile_id: &str) -> Option<&'static SeedCredentials> {
    MERCHANT_CREDENTIALS
        .iter()
        .find(|(id, _)| *id == profile_id)
        .map(|(_, credentials)| credentials)
}

/// Build seed records from the static tables.
pub fn load_seed_records() -> Vec<StoreRecord> {
    seed_records_from(MERCHANT_PROFILES, credentials_for)
}

/// Build seed records from arbitrary tables. Deterministic: output order
/// follows `profiles`.
pub fn seed_records_from<'a, F>(profiles: &[MerchantProfile], lookup: F) -> Vec<StoreRecord>
where
    F: Fn(&str) -> Option<&'a SeedCredentials>,
{
    profiles
        .iter()
        .filter_map(|profile| match lookup(profile.id) {
            Some(credentials) => Some(seed_record(profile, credentials)),
            None => {
                warn!(profile = profile.id, "seed profile has no credentials, skipping");
                None
            }
        })
        .collect()
}

fn seed_record(profile: &MerchantProfile, credentials: &SeedCredentials) -> StoreRecord {
    StoreRecord {
        slug: canonicalize(profile.id),
        display_id: Some(DisplayId::text(profile.id)),
        name_local: profile.name.to_string(),
        name_latin: profile.name_latin.to_string(),
        email: Some(credentials.email.to_string()),
        phone: Some(credentials.phone.to_string()),
        password: Some(credentials.password.to_string()),
        credentials: Some(Credentials {
            email: credentials.email.to_string(),
            password: credentials.password.to_string(),
            phone: credentials.phone.to_string(),
        }),
        owner_name: Some(profile.owner.to_string()),
        plan: Some(profile.plan.to_string()),
        tier: Some(profile.tier.to_string()),
        color: Some(profile.color.to_string()),
        logo: Some(profile.logo.to_string()),
        description: Some(profile.tagline.to_string()),
        stats: Some(StoreStats {
            orders: Some(profile.stats.orders),
            satisfaction: Some(f64::from(profile.stats.satisfaction)),
            growth: Some(profile.stats.growth.to_string()),
            ..StoreStats::default()
        }),
        disabled_features: profile
            .disabled
            .unwrap_or_default()
            .iter()
            .map(|feature| feature.to_string())
            .collect(),
        origin: Origin::Seed,
        ..StoreRecord::default()
    }
}
