//! Where remote documents are looked for, in the order they are tried.

/// One URL to try, with the base that relative assets in its response are
/// resolved against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attempt {
    pub url: String,
    pub base: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteEndpoints {
    bases: Vec<String>,
    directory_path: String,
    detail_path: String,
    extra_directory_urls: Vec<String>,
}

impl RemoteEndpoints {
    /// Endpoints rooted at `primary`, with the default document paths and no
    /// fallbacks.
    pub fn new(primary: &str) -> Self {
        Self {
            bases: vec![normalize_base(primary)],
            directory_path: "/assets/stores/index.json".into(),
            detail_path: "/assets/{slug}/store.json".into(),
            extra_directory_urls: Vec::new(),
        }
    }

    pub fn with_fallback(mut self, base: &str) -> Self {
        self.bases.push(normalize_base(base));
        self
    }

    pub fn with_directory_path(mut self, path: &str) -> Self {
        self.directory_path = path.to_string();
        self
    }

    pub fn with_detail_path(mut self, path: &str) -> Self {
        self.detail_path = path.to_string();
        self
    }

    pub fn with_extra_directory_url(mut self, url: &str) -> Self {
        self.extra_directory_urls.push(url.trim().to_string());
        self
    }

    pub fn bases(&self) -> &[String] {
        &self.bases
    }

    /// Directory URLs: each base in order, then the extra URLs. Duplicates
    /// are tried once.
    pub fn directory_attempts(&self) -> Vec<Attempt> {
        let per_base = self.bases.iter().map(|base| Attempt {
            url: join(base, &self.directory_path),
            base: base.clone(),
        });
        let extra = self.extra_directory_urls.iter().map(|url| Attempt {
            url: url.clone(),
            base: origin_of(url),
        });
        dedup(per_base.chain(extra))
    }

    /// Detail URLs for a canonical slug, one per base.
    pub fn detail_attempts(&self, slug: &str) -> Vec<Attempt> {
        let path = self.detail_path.replace("{slug}", slug);
        dedup(self.bases.iter().map(|base| Attempt {
            url: join(base, &path),
            base: base.clone(),
        }))
    }

    pub fn directory_urls(&self) -> Vec<String> {
        self.directory_attempts().into_iter().map(|a| a.url).collect()
    }

    pub fn detail_urls(&self, slug: &str) -> Vec<String> {
        self.detail_attempts(slug).into_iter().map(|a| a.url).collect()
    }
}

/// Resolve an asset reference against the base that served it. Absolute
/// URLs are kept as they are.
pub fn resolve_asset(base: &str, path: &str) -> String {
    let path = path.trim();
    let absolute = ["http://", "https://", "data:", "//"]
        .iter()
        .any(|scheme| path.starts_with(scheme));
    if absolute {
        path.to_string()
    } else {
        join(base, path)
    }
}

/// Join a base and a path with exactly one slash. An empty base yields a
/// site-relative path.
pub fn join(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim().trim_start_matches('/')
    )
}

fn normalize_base(base: &str) -> String {
    base.trim().trim_end_matches('/').to_string()
}

/// `scheme://host[:port]` of an absolute URL, or empty for relative ones.
fn origin_of(url: &str) -> String {
    let Some((scheme, rest)) = url.split_once("://") else {
        return String::new();
    };
    let host = rest.split('/').next().unwrap_or_default();
    format!("{scheme}://{host}")
}

fn dedup(attempts: impl Iterator<Item = Attempt>) -> Vec<Attempt> {
    let mut unique: Vec<Attempt> = Vec::new();
    for attempt in attempts {
        if !unique.iter().any(|seen| seen.url == attempt.url) {
            unique.push(attempt);
        }
    }
    unique
}
