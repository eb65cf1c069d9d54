//! CDN Classification Tests
//!
//! Covers:
//! - Built-in provider coverage for well-known edge addresses
//! - Table-order tie-break on overlapping blocks
//! - Custom tables with IPv6 and malformed entries

use sanresolver::cdn::{CdnProvider, CdnTable, IpPrefix};
use std::net::IpAddr;

fn ip(s: &str) -> IpAddr {
    s.parse().unwrap()
}

fn tag(table: &CdnTable, addrs: &[&str]) -> Option<String> {
    let addrs: Vec<IpAddr> = addrs.iter().map(|a| ip(a)).collect();
    table.classify(&addrs).map(CdnProvider::tag)
}

#[test]
fn test_builtin_known_edges() {
    let table = CdnTable::builtin();
    assert_eq!(tag(&table, &["104.16.132.229"]).as_deref(), Some("CLOUDFLARE"));
    assert_eq!(tag(&table, &["13.32.99.1"]).as_deref(), Some("CLOUDFRONT"));
    assert_eq!(tag(&table, &["75.2.60.5"]).as_deref(), Some("AWS_GLOBAL_ACCELERATOR"));
    assert_eq!(tag(&table, &["151.101.65.69"]).as_deref(), Some("FASTLY"));
    assert_eq!(tag(&table, &["23.32.0.1"]).as_deref(), Some("AKAMAI"));
    assert_eq!(tag(&table, &["93.184.216.34"]), None);
}

#[test]
fn test_overlap_resolved_by_table_order() {
    let table = CdnTable::builtin();
    // Inside both CloudFront's /18 and the accelerator's /16.
    assert_eq!(tag(&table, &["54.239.130.1"]).as_deref(), Some("CLOUDFRONT"));
    // Only inside the accelerator's /16.
    assert_eq!(tag(&table, &["54.239.1.1"]).as_deref(), Some("AWS_GLOBAL_ACCELERATOR"));
}

#[test]
fn test_first_matching_address_wins() {
    let table = CdnTable::builtin();
    assert_eq!(
        tag(&table, &["192.0.2.1", "23.32.0.1", "104.16.0.1"]).as_deref(),
        Some("AKAMAI")
    );
}

#[test]
fn test_custom_table_skips_bad_entries() {
    let table = CdnTable::from_entries(&[
        ("edge_v6", &["2001:db8:100::/40", "not-a-cidr", "10.0.0.0/33"]),
        ("lab", &["10.0.0.0/8"]),
    ]);
    assert_eq!(table.providers()[0].prefixes().len(), 1);
    assert_eq!(tag(&table, &["2001:db8:1ff::1"]).as_deref(), Some("EDGE_V6"));
    assert_eq!(tag(&table, &["10.20.30.40"]).as_deref(), Some("LAB"));
    assert_eq!(tag(&table, &["2001:db8:200::1"]), None);
}

#[test]
fn test_prefix_round_trips_display() {
    let prefix: IpPrefix = " 172.64.0.0/13 ".parse().unwrap();
    assert_eq!(prefix.to_string(), "172.64.0.0/13");
    assert!(prefix.contains(ip("172.71.255.255")));
    assert!(!prefix.contains(ip("172.72.0.0")));
}
