//! Structural comparison of expected and observed route records.
//!
//! Next-hops live in ordered maps on both sides, so comparison is
//! independent of the order the device printed them in. Every difference is
//! collected; a single one makes the comparison fail.

use std::fmt;

use crate::record::{keys, NextHopAttrs, RouteRecord};

/// One difference between the expected and observed record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mismatch {
    /// The route was not found in the dump.
    RouteAbsent,
    /// The located block carries a different prefix.
    Prefix { expected: String, observed: String },
    /// Next-hop counts differ.
    NumberNexthops { expected: usize, observed: usize },
    /// An expected next-hop is not installed.
    MissingNexthop { nexthop: String },
    /// An installed next-hop was not expected.
    UnexpectedNexthop { nexthop: String },
    /// A next-hop attribute differs. Absent values are the empty string.
    Attribute {
        nexthop: String,
        field: &'static str,
        expected: String,
        observed: String,
    },
}

impl fmt::Display for Mismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mismatch::RouteAbsent => write!(f, "route not found"),
            Mismatch::Prefix { expected, observed } => {
                write!(f, "{}: expected {}, observed {}", keys::ROUTE, expected, observed)
            }
            Mismatch::NumberNexthops { expected, observed } => write!(
                f,
                "{}: expected {}, observed {}",
                keys::NUMBER_NEXTHOPS,
                expected,
                observed
            ),
            Mismatch::MissingNexthop { nexthop } => write!(f, "missing next-hop {}", nexthop),
            Mismatch::UnexpectedNexthop { nexthop } => {
                write!(f, "unexpected next-hop {}", nexthop)
            }
            Mismatch::Attribute {
                nexthop,
                field,
                expected,
                observed,
            } => write!(
                f,
                "{} {}: expected \"{}\", observed \"{}\"",
                nexthop, field, expected, observed
            ),
        }
    }
}

/// Result of one comparison.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Comparison {
    diffs: Vec<Mismatch>,
}

impl Comparison {
    /// True when the records are structurally equal.
    pub fn is_match(&self) -> bool {
        self.diffs.is_empty()
    }

    /// Differences in report order.
    pub fn diffs(&self) -> &[Mismatch] {
        &self.diffs
    }

    /// True when the route itself was not found.
    pub fn route_absent(&self) -> bool {
        self.diffs.first() == Some(&Mismatch::RouteAbsent)
    }
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.diffs.is_empty() {
            return f.write_str("match");
        }
        for (i, diff) in self.diffs.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{}", diff)?;
        }
        Ok(())
    }
}

fn attr_text(value: &Option<String>) -> String {
    value.clone().unwrap_or_default()
}

fn compare_attrs(
    nexthop: &str,
    expected: &NextHopAttrs,
    observed: &NextHopAttrs,
    diffs: &mut Vec<Mismatch>,
) {
    let fields = [
        (keys::DISTANCE, attr_text(&expected.distance), attr_text(&observed.distance)),
        (keys::METRIC, attr_text(&expected.metric), attr_text(&observed.metric)),
        (
            keys::ROUTE_TYPE,
            expected.route_type.to_string(),
            observed.route_type.to_string(),
        ),
    ];
    for (field, expected, observed) in fields {
        if expected != observed {
            diffs.push(Mismatch::Attribute {
                nexthop: nexthop.to_string(),
                field,
                expected,
                observed,
            });
        }
    }
}

/// Compares an expected record against an observation.
///
/// `None` stands for a route that could not be located. The next-hop count
/// difference, if any, is reported before per-next-hop differences.
pub fn compare(expected: &RouteRecord, observed: Option<&RouteRecord>) -> Comparison {
    let Some(observed) = observed else {
        return Comparison {
            diffs: vec![Mismatch::RouteAbsent],
        };
    };

    let mut diffs = Vec::new();

    if expected.prefix() != observed.prefix() {
        diffs.push(Mismatch::Prefix {
            expected: expected.prefix().to_string(),
            observed: observed.prefix().to_string(),
        });
    }

    if expected.number_nexthops() != observed.number_nexthops() {
        diffs.push(Mismatch::NumberNexthops {
            expected: expected.number_nexthops(),
            observed: observed.number_nexthops(),
        });
    }

    for (id, want) in expected.nexthops() {
        match observed.nexthop(id) {
            Some(got) => compare_attrs(id, want, got, &mut diffs),
            None => diffs.push(Mismatch::MissingNexthop {
                nexthop: id.clone(),
            }),
        }
    }

    for id in observed.nexthops().keys() {
        if expected.nexthop(id).is_none() {
            diffs.push(Mismatch::UnexpectedNexthop {
                nexthop: id.clone(),
            });
        }
    }

    Comparison { diffs }
}
