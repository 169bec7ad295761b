//! Turns a host and a port selection into the ordered list of probe targets.

use std::collections::HashSet;
use std::net::IpAddr;

use async_trait::async_trait;
use portcat_common::error::ScanError;
use portcat_common::network::range::PortSpec;
use portcat_common::network::target::{self, Target};
use tracing::debug;

/// Name resolution collaborator.
///
/// Returns every address the host maps to, in a stable order. An empty
/// answer is treated as a resolution failure by the caller.
#[async_trait]
pub trait HostResolver: Send + Sync {
    async fn resolve_host(&self, host: &str) -> Result<Vec<IpAddr>, ScanError>;
}

/// Resolves through the operating system (`getaddrinfo` via tokio).
///
/// IP literals are returned as-is without touching the resolver.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemResolver;

#[async_trait]
impl HostResolver for SystemResolver {
    async fn resolve_host(&self, host: &str) -> Result<Vec<IpAddr>, ScanError> {
        let host = host.trim();
        if host.is_empty() {
            return Err(ScanError::resolution(host, "empty host name"));
        }
        if let Ok(ip) = host.trim_matches(['[', ']']).parse::<IpAddr>() {
            return Ok(vec![ip]);
        }

        let addrs = tokio::net::lookup_host((host, 0))
            .await
            .map_err(|e| ScanError::resolution(host, e.to_string()))?;

        Ok(addrs.map(|addr| addr.ip()).collect())
    }
}

/// Builds the ordered target list for one scan.
///
/// The port selection is validated first, so a malformed selection fails
/// before any lookup is made. Addresses are deduplicated keeping the first
/// occurrence, then paired with ports address-major.
pub async fn resolve_targets(
    resolver: &dyn HostResolver,
    host: &str,
    spec: &PortSpec,
) -> Result<Vec<Target>, ScanError> {
    let ports: Vec<u16> = spec.expand()?;

    let mut seen: HashSet<IpAddr> = HashSet::new();
    let addresses: Vec<IpAddr> = resolver
        .resolve_host(host)
        .await?
        .into_iter()
        .filter(|ip| seen.insert(*ip))
        .collect();

    if addresses.is_empty() {
        return Err(ScanError::resolution(host, "no addresses found"));
    }

    debug!(
        "{host} resolved to {} address(es), {} port(s) each",
        addresses.len(),
        ports.len()
    );

    Ok(target::cross(&addresses, &ports))
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::{Ipv4Addr, Ipv6Addr};
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Answers every lookup with a fixed list and counts calls.
    struct FixedResolver {
        answer: Vec<IpAddr>,
        calls: AtomicUsize,
    }

    impl FixedResolver {
        fn new(answer: Vec<IpAddr>) -> Self {
            Self {
                answer,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl HostResolver for FixedResolver {
        async fn resolve_host(&self, _host: &str) -> Result<Vec<IpAddr>, ScanError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.answer.clone())
        }
    }

    const A: IpAddr = IpAddr::V4(Ipv4Addr::new(192, 0, 2, 1));
    const B: IpAddr = IpAddr::V4(Ipv4Addr::new(192, 0, 2, 2));

    #[tokio::test]
    async fn multiple_addresses_are_address_major() {
        let resolver = FixedResolver::new(vec![A, B, A]);
        let spec = PortSpec::parse_range("20-21").unwrap();

        let targets = resolve_targets(&resolver, "example", &spec).await.unwrap();

        assert_eq!(
            targets,
            vec![
                Target::new(A, 20),
                Target::new(A, 21),
                Target::new(B, 20),
                Target::new(B, 21),
            ]
        );
    }

    #[tokio::test]
    async fn resolution_is_deterministic() {
        let resolver = FixedResolver::new(vec![A, B]);
        let spec = PortSpec::list(&[443, 80, 443]);

        let first = resolve_targets(&resolver, "example", &spec).await.unwrap();
        let second = resolve_targets(&resolver, "example", &spec).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(first.len(), 4);
    }

    #[tokio::test]
    async fn invalid_port_fails_before_lookup() {
        let resolver = FixedResolver::new(vec![A]);
        let spec = PortSpec::list(&[80, 70_000]);

        let result = resolve_targets(&resolver, "example", &spec).await;

        assert_eq!(result, Err(ScanError::InvalidPort { port: 70_000 }));
        assert_eq!(resolver.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn empty_answer_is_a_resolution_error() {
        let resolver = FixedResolver::new(Vec::new());
        let spec = PortSpec::list(&[80]);

        let result = resolve_targets(&resolver, "nowhere", &spec).await;

        assert!(matches!(result, Err(ScanError::Resolution { .. })));
    }

    #[tokio::test]
    async fn system_resolver_passes_ip_literals_through() {
        let v4 = SystemResolver.resolve_host("127.0.0.1").await.unwrap();
        let v6 = SystemResolver.resolve_host("[::1]").await.unwrap();

        assert_eq!(v4, vec![IpAddr::V4(Ipv4Addr::LOCALHOST)]);
        assert_eq!(v6, vec![IpAddr::V6(Ipv6Addr::LOCALHOST)]);
    }

    #[tokio::test]
    async fn system_resolver_rejects_empty_host() {
        let result = SystemResolver.resolve_host("  ").await;
        assert!(matches!(result, Err(ScanError::Resolution { .. })));
    }

    #[tokio::test]
    async fn system_resolver_fails_on_unknown_name() {
        // `.invalid` is reserved and never resolves.
        let result = SystemResolver.resolve_host("portcat.invalid").await;
        assert!(matches!(result, Err(ScanError::Resolution { .. })));
    }
}
