use url::Url;

use crate::error::ProxyError;

pub const API_PREFIX: &str = "/api";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// Forward to the backend at `path`, relative to the backend base.
    Forward { path: String },
    /// Retired surface; answer 404 without contacting the backend.
    Deprecated,
    /// Not under `/api`.
    NotApi,
}

/// Authority used only to resolve dot-segments in request paths.
const NORMALIZE_BASE: &str = "http://proxy.invalid";

/// Decide what to do with an incoming request path (query excluded).
///
/// Dot-segments are resolved first, so `/api/v2/../legacy` is classified
/// as `/api/legacy`.
pub fn classify(path: &str, deprecated: &[String]) -> Route {
    let Some(path) = normalize_path(path) else {
        return Route::NotApi;
    };
    let path = path.as_str();
    let Some(rest) = path.strip_prefix(API_PREFIX) else {
        return Route::NotApi;
    };
    if !rest.is_empty() && !rest.starts_with('/') {
        return Route::NotApi;
    }
    if deprecated.iter().any(|prefix| matches_prefix(path, prefix)) {
        return Route::Deprecated;
    }
    let path = if rest.is_empty() { "/" } else { rest };
    Route::Forward {
        path: path.to_string(),
    }
}

/// Request path with `.` and `..` segments resolved, the way the upstream
/// URL parser would resolve them.
fn normalize_path(path: &str) -> Option<String> {
    if !path.starts_with('/') {
        return None;
    }
    let url = Url::parse(&format!("{NORMALIZE_BASE}{path}")).ok()?;
    Some(url.path().to_string())
}

fn matches_prefix(path: &str, prefix: &str) -> bool {
    path.starts_with(prefix) || path == prefix.trim_end_matches('/')
}

/// Join the backend base, the forwarded path and the original query.
///
/// The base keeps its own path, so `https://b.example/v2` plus `/deals`
/// yields `https://b.example/v2/deals`. A target that resolves outside the
/// base path is rejected.
pub fn upstream_url(base: &Url, path: &str, query: Option<&str>) -> Result<Url, ProxyError> {
    let mut target = base.as_str().trim_end_matches('/').to_string();
    target.push_str(path);
    if let Some(query) = query.filter(|q| !q.is_empty()) {
        target.push('?');
        target.push_str(query);
    }
    let url = Url::parse(&target)?;

    let base_path = base.path().trim_end_matches('/');
    let within_base = url
        .path()
        .strip_prefix(base_path)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'));
    if !within_base {
        return Err(ProxyError::EscapesBase(url.path().to_string()));
    }
    Ok(url)
}
