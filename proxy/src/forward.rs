//! Request forwarding, independent of the listening socket.

use reqwest::Method;
use reqwest::blocking::Client;
use reqwest::header::HeaderMap;
use reqwest::header::HeaderName;
use reqwest::header::HeaderValue;
use reqwest::redirect;
use url::Url;

use crate::config::ProxyConfig;
use crate::error::ProxyError;
use crate::headers::forward_request_headers;
use crate::headers::forward_response_headers;
use crate::route::Route;
use crate::route::classify;
use crate::route::upstream_url;

#[derive(Debug, Clone)]
pub struct ProxyRequest {
    pub method: String,
    /// Path and query as received, e.g. `/api/deals?scope=all`.
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl ProxyResponse {
    pub fn text(status: u16, message: &str) -> Self {
        Self {
            status,
            headers: vec![(
                "content-type".to_string(),
                "text/plain; charset=utf-8".to_string(),
            )],
            body: message.as_bytes().to_vec(),
        }
    }
}

pub struct Forwarder {
    config: ProxyConfig,
    client: Client,
}

impl Forwarder {
    /// Must not be called from inside an async runtime: the blocking
    /// client owns one of its own.
    pub fn new(config: ProxyConfig) -> Result<Self, ProxyError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .redirect(redirect::Policy::none())
            .build()
            .map_err(ProxyError::Client)?;
        Ok(Self { config, client })
    }

    pub fn config(&self) -> &ProxyConfig {
        &self.config
    }

    /// Forward one request. Failures become plain-text error responses.
    pub fn forward(&self, request: ProxyRequest) -> ProxyResponse {
        let (path, query) = match request.url.split_once('?') {
            Some((path, query)) => (path, Some(query)),
            None => (request.url.as_str(), None),
        };

        let rest = match classify(path, &self.config.deprecated_prefixes) {
            Route::NotApi => return ProxyResponse::text(404, "not found"),
            Route::Deprecated => {
                tracing::debug!(path, "rejecting deprecated endpoint");
                return ProxyResponse::text(404, "endpoint has been retired");
            }
            Route::Forward { path } => path,
        };

        let Some(base) = self.config.backend_base.as_ref() else {
            tracing::error!(path, "backend base url is not configured");
            return error_response(&ProxyError::MissingBackend);
        };

        let result = upstream_url(base, &rest, query)
            .and_then(|target| self.try_forward(&request, target));
        match result {
            Ok(response) => response,
            Err(err) => {
                tracing::warn!(method = %request.method, path, "forwarding failed: {err}");
                error_response(&err)
            }
        }
    }

    fn try_forward(
        &self,
        request: &ProxyRequest,
        target: Url,
    ) -> Result<ProxyResponse, ProxyError> {
        let method = Method::from_bytes(request.method.as_bytes())
            .map_err(|_| ProxyError::Method(request.method.clone()))?;

        let mut headers = HeaderMap::new();
        let incoming = request
            .headers
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()));
        for (name, value) in forward_request_headers(incoming) {
            match (
                HeaderName::from_bytes(name.as_bytes()),
                HeaderValue::from_str(&value),
            ) {
                (Ok(name), Ok(value)) => {
                    headers.append(name, value);
                }
                _ => tracing::warn!("dropping invalid request header {name}"),
            }
        }

        tracing::debug!(%method, %target, "forwarding");
        let mut upstream = self.client.request(method, target).headers(headers);
        if !request.body.is_empty() {
            upstream = upstream.body(request.body.clone());
        }
        let response = upstream.send()?;

        let status = response.status().as_u16();
        let headers = forward_response_headers(
            response
                .headers()
                .iter()
                .filter_map(|(name, value)| value.to_str().ok().map(|v| (name.as_str(), v))),
        );
        let body = response.bytes()?.to_vec();

        Ok(ProxyResponse {
            status,
            headers,
            body,
        })
    }
}

fn error_response(err: &ProxyError) -> ProxyResponse {
    ProxyResponse::text(err.status_code(), &err.to_string())
}
