use axum::http::Request;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use tower_governor::{key_extractor::KeyExtractor, GovernorError};

/// Per-client key for the API limiter.
///
/// Order: first hop of `X-Forwarded-For`, `X-Real-IP`, the socket peer, then
/// localhost so requests behind an opaque proxy share one bucket instead of
/// failing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClientIpKeyExtractor;

impl KeyExtractor for ClientIpKeyExtractor {
    type Key = IpAddr;

    fn extract<T>(&self, req: &Request<T>) -> Result<Self::Key, GovernorError> {
        Ok(client_ip(req))
    }
}

fn header_ip<T>(req: &Request<T>, name: &str) -> Option<IpAddr> {
    let value = req.headers().get(name)?.to_str().ok()?;
    value.split(',').next()?.trim().parse().ok()
}

fn client_ip<T>(req: &Request<T>) -> IpAddr {
    header_ip(req, "x-forwarded-for")
        .or_else(|| header_ip(req, "x-real-ip"))
        .or_else(|| {
            req.extensions()
                .get::<axum::extract::ConnectInfo<SocketAddr>>()
                .map(|info| info.0.ip())
        })
        .unwrap_or(IpAddr::V4(Ipv4Addr::LOCALHOST))
}
