//! Resolution outcomes and their printable form.

use crate::dns::{AnnotatedAddr, StrategyId};
use std::fmt;

/// Classification of one input line. Mutually exclusive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    /// The expected address was among the resolved ones. Never emitted.
    Match,
    IpMismatch,
    /// Mismatch where a resolved address belongs to this provider
    /// (uppercased tag).
    CdnMismatch(String),
    DnsFailure,
    Malformed,
}

impl Status {
    pub fn is_mismatch(&self) -> bool {
        matches!(self, Status::IpMismatch | Status::CdnMismatch(_))
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Match => f.write_str("MATCH"),
            Status::IpMismatch => f.write_str("IP_MISMATCH"),
            Status::CdnMismatch(tag) => write!(f, "CDN_MISMATCH_{tag}"),
            Status::DnsFailure => f.write_str("DNS_FAILURE"),
            Status::Malformed => f.write_str("MALFORMED"),
        }
    }
}

/// The result of pushing one line through the pipeline.
///
/// `emit` is decided here, once; the sink never filters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    line: String,
    status: Status,
    emit: bool,
    addrs: Vec<AnnotatedAddr>,
    via: Option<StrategyId>,
}

impl Outcome {
    pub fn malformed(line: impl Into<String>) -> Self {
        Self {
            line: line.into(),
            status: Status::Malformed,
            emit: true,
            addrs: Vec::new(),
            via: None,
        }
    }

    pub fn dns_failure(line: impl Into<String>) -> Self {
        Self {
            line: line.into(),
            status: Status::DnsFailure,
            emit: true,
            addrs: Vec::new(),
            via: None,
        }
    }

    pub fn matched(line: impl Into<String>, addrs: Vec<AnnotatedAddr>, via: StrategyId) -> Self {
        Self {
            line: line.into(),
            status: Status::Match,
            emit: false,
            addrs,
            via: Some(via),
        }
    }

    /// `IP_MISMATCH`, or `CDN_MISMATCH_<tag>` when `cdn` is set.
    pub fn mismatch(
        line: impl Into<String>,
        cdn: Option<String>,
        addrs: Vec<AnnotatedAddr>,
        via: StrategyId,
    ) -> Self {
        Self {
            line: line.into(),
            status: cdn.map_or(Status::IpMismatch, Status::CdnMismatch),
            emit: true,
            addrs,
            via: Some(via),
        }
    }

    /// Drop the strategy tag so it is not rendered.
    pub fn without_strategy(mut self) -> Self {
        self.via = None;
        self
    }

    pub fn line(&self) -> &str {
        &self.line
    }

    pub fn status(&self) -> &Status {
        &self.status
    }

    pub fn should_emit(&self) -> bool {
        self.emit
    }

    pub fn addrs(&self) -> &[AnnotatedAddr] {
        &self.addrs
    }

    pub fn strategy(&self) -> Option<StrategyId> {
        self.via
    }
}

impl fmt::Display for Outcome {
    /// `<line> <STATUS>[_VIA_<STRATEGY>][ <addr>,<addr>...]`
    ///
    /// The strategy suffix only appears on mismatches.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.line, self.status)?;
        if let (true, Some(via)) = (self.status.is_mismatch(), self.via) {
            write!(f, "_VIA_{}", via.tag())?;
        }
        for (i, addr) in self.addrs.iter().enumerate() {
            f.write_str(if i == 0 { " " } else { "," })?;
            write!(f, "{addr}")?;
        }
        Ok(())
    }
}
