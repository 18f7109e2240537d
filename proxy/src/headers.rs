//! Header policy between the hosting platform, the proxy and the backend.
//!
//! Hop-by-hop headers describe a single connection and never cross the
//! proxy. Headers injected by the hosting platform are dropped on the way
//! in. Some platforms strip `authorization` before the function sees the
//! request, so clients also send the token under a custom name that is
//! mapped back here.

pub const HOP_BY_HOP: &[&str] = &[
    "connection",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "trailer",
    "trailers",
    "transfer-encoding",
    "upgrade",
];

/// Recomputed by the outgoing client or tied to the incoming hop.
const REQUEST_STRIPPED: &[&str] = &["host", "content-length", "forwarded", "x-real-ip"];

const PLATFORM_PREFIXES: &[&str] = &["x-forwarded-", "x-vercel-", "x-middleware-"];

/// Fallback carriers for the bearer token, in priority order.
pub const AUTH_FALLBACK_HEADERS: &[&str] =
    &["x-hc-authorization", "x-authorization", "x-auth-token"];

const AUTHORIZATION: &str = "authorization";

/// Headers to send upstream, lowercased.
pub fn forward_request_headers<'a, I>(incoming: I) -> Vec<(String, String)>
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let incoming: Vec<(String, &str)> = incoming
        .into_iter()
        .map(|(name, value)| (name.to_ascii_lowercase(), value))
        .collect();
    let listed = connection_listed(&incoming);

    let mut forwarded: Vec<(String, String)> = incoming
        .iter()
        .filter(|(name, _)| {
            !is_hop_by_hop(name, &listed)
                && !REQUEST_STRIPPED.contains(&name.as_str())
                && !PLATFORM_PREFIXES.iter().any(|p| name.starts_with(p))
                && !AUTH_FALLBACK_HEADERS.contains(&name.as_str())
        })
        .map(|(name, value)| (name.clone(), (*value).to_string()))
        .collect();

    let has_authorization = forwarded.iter().any(|(name, _)| name == AUTHORIZATION);
    if !has_authorization && let Some(token) = fallback_authorization(&incoming) {
        tracing::debug!("mapping custom auth header onto authorization");
        forwarded.push((AUTHORIZATION.to_string(), token.to_string()));
    }

    forwarded
}

/// Headers to return to the caller, lowercased.
pub fn forward_response_headers<'a, I>(upstream: I) -> Vec<(String, String)>
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let upstream: Vec<(String, &str)> = upstream
        .into_iter()
        .map(|(name, value)| (name.to_ascii_lowercase(), value))
        .collect();
    let listed = connection_listed(&upstream);

    upstream
        .iter()
        .filter(|(name, _)| !is_hop_by_hop(name, &listed) && name != "content-length")
        .map(|(name, value)| (name.clone(), (*value).to_string()))
        .collect()
}

fn fallback_authorization<'a>(incoming: &[(String, &'a str)]) -> Option<&'a str> {
    AUTH_FALLBACK_HEADERS.iter().find_map(|candidate| {
        incoming
            .iter()
            .find(|(name, value)| name.as_str() == *candidate && !value.trim().is_empty())
            .map(|(_, value)| *value)
    })
}

/// Extra hop-by-hop names announced in `Connection`.
fn connection_listed(headers: &[(String, &str)]) -> Vec<String> {
    headers
        .iter()
        .filter(|(name, _)| name == "connection")
        .flat_map(|(_, value)| value.split(','))
        .map(|token| token.trim().to_ascii_lowercase())
        .filter(|token| !token.is_empty())
        .collect()
}

fn is_hop_by_hop(name: &str, listed: &[String]) -> bool {
    HOP_BY_HOP.contains(&name) || listed.iter().any(|l| l == name)
}
