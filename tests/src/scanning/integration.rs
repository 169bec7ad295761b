#![cfg(test)]
use std::net::{IpAddr, Ipv4Addr};
use std::time::{Duration, Instant};

use portcat_common::config::Config;
use portcat_common::error::ScanError;
use portcat_common::report::{DEADLINE_EXCEEDED, ProbeStatus, ScanReport};
use portcat_core::{Scanner, connect_mode, scan_mode};
use tokio::net::TcpListener;

const LOCALHOST: IpAddr = IpAddr::V4(Ipv4Addr::LOCALHOST);

/// Binds a listener on an ephemeral loopback port.
async fn listen() -> anyhow::Result<(TcpListener, u16)> {
    let listener = TcpListener::bind((LOCALHOST, 0)).await?;
    let port = listener.local_addr()?.port();
    Ok((listener, port))
}

/// Returns a loopback port with nothing listening on it.
async fn free_port() -> anyhow::Result<u16> {
    let (listener, port) = listen().await?;
    drop(listener);
    Ok(port)
}

fn ports_of(report: &ScanReport) -> Vec<u16> {
    report.iter().map(|o| o.target.port).collect()
}

/// One listening port and one free port, probed in caller order.
#[tokio::test]
async fn connect_open_and_closed_loopback() -> anyhow::Result<()> {
    let (_listener, open) = listen().await?;
    let closed = free_port().await?;

    let report = connect_mode(
        "127.0.0.1",
        &[u32::from(open), u32::from(closed)],
        Duration::from_secs(1),
    )
    .await?;

    assert_eq!(ports_of(&report), vec![open, closed]);
    assert_eq!(report.outcomes()[0].status, ProbeStatus::Open);
    assert!(matches!(
        report.outcomes()[1].status,
        ProbeStatus::Closed | ProbeStatus::Filtered
    ));
    Ok(())
}

#[tokio::test]
async fn connect_drops_duplicate_ports() -> anyhow::Result<()> {
    let (_listener, open) = listen().await?;
    let port = u32::from(open);

    let report = connect_mode("127.0.0.1", &[port, port, port], Duration::from_secs(1)).await?;

    assert_eq!(report.len(), 1);
    assert_eq!(report.open_ports(), vec![open]);
    Ok(())
}

#[tokio::test]
async fn scan_range_is_port_ascending() -> anyhow::Result<()> {
    let (_listener, open) = listen().await?;
    let high = open.saturating_add(4);
    let range = format!("{open}-{high}");

    let report = scan_mode("127.0.0.1", &range, Some(Duration::from_millis(500))).await?;

    let expected: Vec<u16> = (open..=high).collect();
    assert_eq!(report.len(), expected.len());
    assert_eq!(ports_of(&report), expected);
    assert_eq!(report.outcomes()[0].status, ProbeStatus::Open);
    Ok(())
}

#[tokio::test]
async fn single_port_range_has_one_outcome() -> anyhow::Result<()> {
    let report = scan_mode("127.0.0.1", "1-1", None).await?;

    assert_eq!(report.len(), 1);
    assert_eq!(report.outcomes()[0].target.port, 1);
    Ok(())
}

#[tokio::test]
async fn reversed_range_is_rejected() {
    let result = scan_mode("127.0.0.1", "25-20", None).await;
    assert!(matches!(result, Err(ScanError::InvalidPortSpec { .. })));
}

#[tokio::test]
async fn unresolvable_host_is_fatal() {
    let result = connect_mode("portcat.invalid", &[80], Duration::from_secs(1)).await;
    assert!(matches!(result, Err(ScanError::Resolution { .. })));
}

/// `localhost` may resolve to both loopback families; every address gets probed.
#[tokio::test]
async fn hostname_probes_every_resolved_address() -> anyhow::Result<()> {
    let (_listener, open) = listen().await?;

    let report = connect_mode("localhost", &[u32::from(open)], Duration::from_secs(1)).await?;

    assert!(!report.is_empty());
    assert!(report.iter().all(|o| o.target.port == open));
    assert!(report.iter().any(|o| o.target.address == LOCALHOST && o.is_open()));
    Ok(())
}

/// A wide scan with a tiny worker cap still reports every port.
#[tokio::test]
async fn small_worker_pool_covers_every_target() -> anyhow::Result<()> {
    let (_listener, open) = listen().await?;
    let low = open.saturating_sub(20).max(1);
    let range = format!("{low}-{open}");
    let scanner = Scanner::new(
        Config::default()
            .with_timeout(Duration::from_millis(500))
            .with_max_concurrency(2),
    );

    let report = scanner.scan_range("127.0.0.1", &range).await?;

    assert_eq!(report.len(), usize::from(open - low) + 1);
    assert_eq!(report.outcomes().last().map(|o| o.status), Some(ProbeStatus::Open));
    Ok(())
}

/// Needs a network that silently drops packets to TEST-NET-1.
#[tokio::test]
#[ignore]
async fn unreachable_host_is_scanned_concurrently() -> anyhow::Result<()> {
    let timeout = Duration::from_millis(200);
    let start = Instant::now();

    let report = scan_mode("192.0.2.1", "20-25", Some(timeout)).await?;

    assert_eq!(report.len(), 6);
    assert_eq!(report.count(ProbeStatus::Open), 0);
    assert!(
        report
            .iter()
            .all(|o| matches!(o.status, ProbeStatus::Filtered | ProbeStatus::Error))
    );
    assert!(start.elapsed() < timeout * 3, "took {:?}", start.elapsed());
    Ok(())
}

#[tokio::test]
#[ignore]
async fn deadline_cuts_scan_short() -> anyhow::Result<()> {
    let scanner = Scanner::new(
        Config::default()
            .with_timeout(Duration::from_secs(2))
            .with_max_concurrency(1)
            .with_deadline(Duration::from_millis(500)),
    );

    let report = scanner.scan_range("192.0.2.1", "20-25").await?;

    assert_eq!(report.len(), 6);
    let cancelled = report
        .iter()
        .filter(|o| o.detail.as_deref() == Some(DEADLINE_EXCEEDED))
        .count();
    assert!(cancelled >= 5, "only {cancelled} cancelled");
    Ok(())
}
