//! Input records.

use crate::dns::Name;
use regex::Regex;
use std::{net::Ipv4Addr, sync::LazyLock};

static RECORD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d+\.\d+\.\d+\.\d+):(\d+)\s+\[([^\]]+)\]").expect("record pattern is valid")
});

/// One unit of resolution work. Immutable once parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolutionRequest {
    /// The input line, carried through to the output unchanged.
    pub line: String,
    pub expected: Ipv4Addr,
    pub port: u16,
    pub domain: Name,
}

/// What a single input line turned into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedLine {
    /// Whitespace only; produces no outcome at all.
    Blank,
    /// Does not follow `IP:PORT [DOMAIN]`.
    Malformed(String),
    Request(ResolutionRequest),
}

/// Parses one `IP:PORT [DOMAIN]` record.
///
/// The line is trimmed first. Anything after the closing bracket is
/// ignored, matching how scanner output often carries trailing columns.
pub fn parse_line(raw: &str) -> ParsedLine {
    let line = raw.trim();
    if line.is_empty() {
        return ParsedLine::Blank;
    }

    let Some(caps) = RECORD.captures(line) else {
        return ParsedLine::Malformed(line.to_string());
    };

    let expected = caps[1].parse::<Ipv4Addr>();
    let port = caps[2].parse::<u16>();
    let domain = caps[3].trim();

    match (expected, port) {
        (Ok(expected), Ok(port)) if !domain.is_empty() => ParsedLine::Request(ResolutionRequest {
            line: line.to_string(),
            expected,
            port,
            domain: Name::new(domain),
        }),
        _ => ParsedLine::Malformed(line.to_string()),
    }
}
