//! Repository (indexed): identity and staleness bookkeeping for one indexed repo.

use serde::{Deserialize, Serialize};

/// An indexed repository entry (§3). `(normalized_url)` is unique across the store.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Repository {
    pub id: String,
    pub normalized_url: String,
    pub branch: String,
    pub language: Option<String>,
    pub last_indexed_commit: Option<String>,
}

/// Strips provider branch/path suffixes and query strings from a repository URL (§4.4).
///
/// Recognizes `/tree/<ref>`, `/blob/<ref>`, `/-/tree/<ref>` (GitLab) segments, and strips
/// any `?...` query string. Idempotent: `normalize_url(normalize_url(x)) == normalize_url(x)`
/// (§8 invariant 6) because once a suffix is stripped there is nothing left to match.
pub fn normalize_url(raw: &str) -> String {
    let without_query = raw.split('?').next().unwrap_or(raw);

    for marker in ["/-/tree/", "/tree/", "/blob/"] {
        if let Some(idx) = without_query.find(marker) {
            return without_query[..idx].to_string();
        }
    }
    without_query.trim_end_matches('/').to_string()
}

/// Extracts the branch from a repository URL (§4.4): the first path component after a
/// `/tree/<ref>` segment, or `"main"` if no such segment exists.
pub fn extract_branch(raw: &str) -> String {
    let without_query = raw.split('?').next().unwrap_or(raw);
    for marker in ["/-/tree/", "/tree/"] {
        if let Some(idx) = without_query.find(marker) {
            let rest = &without_query[idx + marker.len()..];
            let ref_component = rest.split('/').next().unwrap_or("main");
            if !ref_component.is_empty() {
                return ref_component.to_string();
            }
        }
    }
    "main".to_string()
}

/// Derives a repository name from its URL (e.g. `https://github.com/acme/pay` → `pay`),
/// used as the workspace subdirectory name (§4.4).
pub fn extract_repo_name(raw: &str) -> String {
    let normalized = normalize_url(raw);
    normalized
        .trim_end_matches(".git")
        .rsplit('/')
        .next()
        .filter(|s| !s.is_empty())
        .unwrap_or("repo")
        .to_string()
}
