//! Provider address table and classifier.

use super::prefix::IpPrefix;
use std::net::IpAddr;

/// Prefixes published by the CDN and edge providers we recognise.
///
/// Order matters: it is the classifier's tie-break when blocks overlap
/// (CloudFront's `54.239.128.0/18` sits inside the global accelerator's
/// `54.239.0.0/16`).
const BUILTIN_PROVIDERS: &[(&str, &[&str])] = &[
    (
        "cloudflare",
        &[
            "173.245.48.0/20",
            "103.21.244.0/22",
            "103.22.200.0/22",
            "103.31.4.0/22",
            "141.101.64.0/18",
            "108.162.192.0/18",
            "190.93.240.0/20",
            "188.114.96.0/20",
            "197.234.240.0/22",
            "198.41.128.0/17",
            "162.158.0.0/15",
            "104.16.0.0/13",
            "104.24.0.0/14",
            "172.64.0.0/13",
            "131.0.72.0/22",
        ],
    ),
    (
        "cloudfront",
        &[
            "52.84.0.0/15",
            "54.230.0.0/16",
            "54.239.128.0/18",
            "99.84.0.0/16",
            "205.251.192.0/19",
            "54.239.192.0/19",
            "70.132.0.0/18",
            "13.32.0.0/15",
            "13.35.0.0/16",
            "204.246.164.0/22",
            "204.246.168.0/22",
            "71.152.0.0/17",
        ],
    ),
    (
        "aws_global_accelerator",
        &[
            "75.2.0.0/16",
            "99.77.0.0/16",
            "99.83.0.0/16",
            "108.136.0.0/13",
            "130.176.0.0/12",
            "150.222.0.0/16",
            "15.177.0.0/18",
            "52.93.0.0/16",
            "54.239.0.0/16",
        ],
    ),
    (
        "fastly",
        &[
            "23.235.32.0/20",
            "43.249.72.0/22",
            "103.244.50.0/24",
            "103.245.222.0/23",
            "103.245.224.0/24",
            "104.156.80.0/20",
            "140.248.64.0/18",
            "140.248.128.0/17",
            "146.75.0.0/16",
            "151.101.0.0/16",
            "157.52.64.0/18",
            "167.82.0.0/17",
            "167.82.128.0/20",
            "167.82.160.0/20",
            "167.82.224.0/20",
            "172.111.64.0/18",
            "185.31.16.0/22",
            "199.27.72.0/21",
            "199.232.0.0/16",
        ],
    ),
    (
        "akamai",
        &[
            "23.0.0.0/12",
            "2.16.0.0/13",
            "23.192.0.0/11",
            "23.32.0.0/11",
            "23.64.0.0/14",
            "23.72.0.0/13",
            "96.16.0.0/15",
            "96.6.0.0/15",
            "104.64.0.0/10",
            "184.24.0.0/13",
            "184.50.0.0/15",
            "184.84.0.0/14",
            "172.224.0.0/12",
            "172.240.0.0/13",
        ],
    ),
];

/// One provider and its address blocks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CdnProvider {
    name: String,
    prefixes: Vec<IpPrefix>,
}

impl CdnProvider {
    pub fn new(name: impl Into<String>, prefixes: Vec<IpPrefix>) -> Self {
        Self {
            name: name.into(),
            prefixes,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Uppercased name as used in `CDN_MISMATCH_<TAG>`.
    pub fn tag(&self) -> String {
        self.name.to_ascii_uppercase()
    }

    pub fn prefixes(&self) -> &[IpPrefix] {
        &self.prefixes
    }

    pub fn contains(&self, addr: IpAddr) -> bool {
        self.prefixes.iter().any(|p| p.contains(addr))
    }
}

/// Immutable provider table, shared by all workers without locking.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CdnTable {
    providers: Vec<CdnProvider>,
}

impl CdnTable {
    /// The table compiled into the binary.
    pub fn builtin() -> Self {
        Self::from_entries(BUILTIN_PROVIDERS)
    }

    /// Builds a table from textual CIDRs, keeping entry order.
    ///
    /// Malformed CIDRs are skipped with a warning; a provider whose every
    /// entry is malformed is kept with an empty block list.
    pub fn from_entries(entries: &[(&str, &[&str])]) -> Self {
        let providers = entries
            .iter()
            .map(|(name, cidrs)| {
                let prefixes = cidrs
                    .iter()
                    .filter_map(|cidr| match cidr.parse::<IpPrefix>() {
                        Ok(prefix) => Some(prefix),
                        Err(e) => {
                            tracing::warn!(provider = %name, error = %e, "skipping CDN range");
                            None
                        }
                    })
                    .collect();
                CdnProvider::new(*name, prefixes)
            })
            .collect();
        Self { providers }
    }

    /// Builds a table from already parsed providers.
    pub fn new(providers: Vec<CdnProvider>) -> Self {
        Self { providers }
    }

    pub fn providers(&self) -> &[CdnProvider] {
        &self.providers
    }

    /// Returns the provider of the first address that falls inside any
    /// provider's blocks.
    ///
    /// Addresses are walked in the given order; for each address, providers
    /// are walked in table order.
    pub fn classify(&self, addrs: &[IpAddr]) -> Option<&CdnProvider> {
        addrs
            .iter()
            .find_map(|&addr| self.providers.iter().find(|p| p.contains(addr)))
    }
}
