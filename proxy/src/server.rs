//! HTTP front end: accepts requests and hands them to the [`Forwarder`].

use std::io::Read;
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;
use std::time::Duration;

use tiny_http::Header;
use tiny_http::Request;
use tiny_http::Response;
use tiny_http::Server;

use crate::config::ProxyConfig;
use crate::error::ProxyError;
use crate::forward::Forwarder;
use crate::forward::ProxyRequest;
use crate::forward::ProxyResponse;

/// How often the accept loop checks for shutdown.
const ACCEPT_POLL: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, Default)]
pub struct ShutdownHandle {
    flag: Arc<AtomicBool>,
}

impl ShutdownHandle {
    pub fn shutdown(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_shutdown(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

pub struct ProxyServer {
    server: Server,
    forwarder: Arc<Forwarder>,
    shutdown: ShutdownHandle,
}

impl ProxyServer {
    /// Bind the listening socket. Blocking; call outside the async runtime.
    pub fn bind(config: ProxyConfig) -> Result<Self, ProxyError> {
        let addr = config.bind;
        let server = Server::http(addr).map_err(|e| ProxyError::Bind {
            addr,
            message: e.to_string(),
        })?;
        let forwarder = Forwarder::new(config)?;
        Ok(Self {
            server,
            forwarder: Arc::new(forwarder),
            shutdown: ShutdownHandle::default(),
        })
    }

    /// Actual address, useful when binding port 0.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.server.server_addr().to_ip()
    }

    pub fn shutdown_handle(&self) -> ShutdownHandle {
        self.shutdown.clone()
    }

    /// Serve until the shutdown handle fires. Each request runs on its own
    /// thread so a slow backend call does not stall the accept loop.
    pub fn serve(self) {
        tracing::info!(
            addr = ?self.local_addr(),
            backend = ?self.forwarder.config().backend_base.as_ref().map(url::Url::as_str),
            "proxy listening"
        );
        while !self.shutdown.is_shutdown() {
            let request = match self.server.recv_timeout(ACCEPT_POLL) {
                Ok(Some(request)) => request,
                Ok(None) => continue,
                Err(err) => {
                    tracing::error!("accept failed: {err}");
                    continue;
                }
            };
            let forwarder = Arc::clone(&self.forwarder);
            std::thread::spawn(move || handle(&forwarder, request));
        }
        tracing::info!("proxy stopped");
    }
}

fn handle(forwarder: &Forwarder, mut request: Request) {
    let mut body = Vec::new();
    let response = match request.as_reader().read_to_end(&mut body) {
        Ok(_) => {
            let proxied = ProxyRequest {
                method: request.method().to_string(),
                url: request.url().to_string(),
                headers: request
                    .headers()
                    .iter()
                    .map(|h| (h.field.to_string(), h.value.to_string()))
                    .collect(),
                body,
            };
            forwarder.forward(proxied)
        }
        Err(err) => {
            let err = ProxyError::from(err);
            tracing::warn!("{err}");
            ProxyResponse::text(err.status_code(), &err.to_string())
        }
    };

    tracing::debug!(
        method = %request.method(),
        url = request.url(),
        status = response.status,
        "handled"
    );
    if let Err(err) = request.respond(into_tiny_response(response)) {
        tracing::warn!("failed to write response: {err}");
    }
}

fn into_tiny_response(response: ProxyResponse) -> Response<std::io::Cursor<Vec<u8>>> {
    let mut out = Response::from_data(response.body).with_status_code(response.status);
    for (name, value) in &response.headers {
        match Header::from_bytes(name.as_bytes(), value.as_bytes()) {
            Ok(header) => out.add_header(header),
            Err(()) => tracing::warn!("dropping invalid response header {name}"),
        }
    }
    out
}
