//! Canonical route record shared by every dump parser.
//!
//! A [`RouteRecord`] is one prefix plus its next-hops keyed by identifier
//! (an address or an interface). The next-hop count is derived from the map,
//! so it always equals the number of distinct identifiers.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde_json::{Map, Value};
use sonic_types::IpPrefix;

use crate::error::{VerifyError, VerifyResult};

/// A route prefix; host routes compare equal in `addr/len` and bare form.
pub type RoutePrefix = IpPrefix;

/// Mapping keys of the expected/observed state form.
pub mod keys {
    pub const ROUTE: &str = "Route";
    pub const NUMBER_NEXTHOPS: &str = "NumberNexthops";
    pub const DISTANCE: &str = "Distance";
    pub const METRIC: &str = "Metric";
    pub const ROUTE_TYPE: &str = "RouteType";
}

/// Protocol that installed a next-hop.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RouteSource {
    Static,
    Bgp,
    Ospf,
    Connected,
    /// Reported by the kernel, or provenance unknown.
    Kernel,
    /// Any other tag, lowercased.
    Other(String),
}

impl RouteSource {
    /// Returns the tag text.
    pub fn as_str(&self) -> &str {
        match self {
            RouteSource::Static => "static",
            RouteSource::Bgp => "bgp",
            RouteSource::Ospf => "ospf",
            RouteSource::Connected => "connected",
            RouteSource::Kernel => "kernel",
            RouteSource::Other(tag) => tag,
        }
    }
}

impl fmt::Display for RouteSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RouteSource {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tag = s.trim().to_ascii_lowercase();
        Ok(match tag.as_str() {
            "static" => RouteSource::Static,
            "bgp" => RouteSource::Bgp,
            "ospf" => RouteSource::Ospf,
            "connected" => RouteSource::Connected,
            "kernel" | "unknown" | "" => RouteSource::Kernel,
            _ => RouteSource::Other(tag),
        })
    }
}

impl From<&str> for RouteSource {
    fn from(s: &str) -> Self {
        match s.parse() {
            Ok(source) => source,
            Err(never) => match never {},
        }
    }
}

/// Attributes of one next-hop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NextHopAttrs {
    /// Administrative distance; absent for kernel-sourced data.
    pub distance: Option<String>,
    /// Metric; absent for kernel-sourced data.
    pub metric: Option<String>,
    /// Installing protocol.
    pub route_type: RouteSource,
}

impl NextHopAttrs {
    /// Next-hop with distance and metric.
    pub fn new(
        distance: impl Into<String>,
        metric: impl Into<String>,
        route_type: impl Into<RouteSource>,
    ) -> Self {
        Self {
            distance: non_empty(distance.into()),
            metric: non_empty(metric.into()),
            route_type: route_type.into(),
        }
    }

    /// Next-hop without distance or metric (kernel and database dumps).
    pub fn without_preference(route_type: impl Into<RouteSource>) -> Self {
        Self {
            distance: None,
            metric: None,
            route_type: route_type.into(),
        }
    }

    fn to_mapping(&self) -> Value {
        let mut map = Map::new();
        map.insert(
            keys::DISTANCE.to_string(),
            Value::String(self.distance.clone().unwrap_or_default()),
        );
        map.insert(
            keys::METRIC.to_string(),
            Value::String(self.metric.clone().unwrap_or_default()),
        );
        map.insert(
            keys::ROUTE_TYPE.to_string(),
            Value::String(self.route_type.to_string()),
        );
        Value::Object(map)
    }

    fn from_mapping(nexthop: &str, value: &Value) -> VerifyResult<Self> {
        let obj = value.as_object().ok_or_else(|| {
            VerifyError::invalid_expectation(format!("next-hop {} is not a mapping", nexthop))
        })?;
        let field = |name: &str| -> VerifyResult<String> {
            match obj.get(name) {
                None | Some(Value::Null) => Ok(String::new()),
                Some(v) => text_value(v).ok_or_else(|| {
                    VerifyError::invalid_expectation(format!(
                        "next-hop {} field {} is not text",
                        nexthop, name
                    ))
                }),
            }
        };
        Ok(Self::new(
            field(keys::DISTANCE)?,
            field(keys::METRIC)?,
            field(keys::ROUTE_TYPE)?.as_str(),
        ))
    }
}

fn non_empty(s: String) -> Option<String> {
    if s.is_empty() {
        None
    } else {
        Some(s)
    }
}

fn text_value(v: &Value) -> Option<String> {
    match v {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// One route: a prefix and its next-hop set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteRecord {
    prefix: RoutePrefix,
    nexthops: BTreeMap<String, NextHopAttrs>,
}

impl RouteRecord {
    /// Creates a record with no next-hops.
    pub fn new(prefix: RoutePrefix) -> Self {
        Self {
            prefix,
            nexthops: BTreeMap::new(),
        }
    }

    /// Parses `prefix` and creates an empty record.
    pub fn for_prefix(prefix: &str) -> VerifyResult<Self> {
        let prefix = prefix
            .trim()
            .parse()
            .map_err(|e| VerifyError::invalid_expectation(format!("{}", e)))?;
        Ok(Self::new(prefix))
    }

    /// Adds a next-hop, builder style.
    pub fn with_nexthop(mut self, id: impl Into<String>, attrs: NextHopAttrs) -> Self {
        self.insert_nexthop(id, attrs);
        self
    }

    /// Inserts a next-hop, replacing any previous entry with the same
    /// identifier. Returns the replaced attributes.
    pub fn insert_nexthop(
        &mut self,
        id: impl Into<String>,
        attrs: NextHopAttrs,
    ) -> Option<NextHopAttrs> {
        self.nexthops.insert(id.into(), attrs)
    }

    /// Keeps only next-hops installed by `route_type`.
    pub fn retain_route_type(&mut self, route_type: &RouteSource) {
        self.nexthops.retain(|_, attrs| &attrs.route_type == route_type);
    }

    /// Returns the prefix.
    pub fn prefix(&self) -> &RoutePrefix {
        &self.prefix
    }

    /// Returns the next-hops ordered by identifier.
    pub fn nexthops(&self) -> &BTreeMap<String, NextHopAttrs> {
        &self.nexthops
    }

    /// Returns one next-hop.
    pub fn nexthop(&self, id: &str) -> Option<&NextHopAttrs> {
        self.nexthops.get(id)
    }

    /// Returns the number of next-hops.
    pub fn number_nexthops(&self) -> usize {
        self.nexthops.len()
    }

    /// Renders the nested mapping form:
    /// `{Route, NumberNexthops, <nexthop>: {Distance, Metric, RouteType}}`.
    pub fn to_mapping(&self) -> Value {
        let mut map = Map::new();
        map.insert(
            keys::ROUTE.to_string(),
            Value::String(self.prefix.to_string()),
        );
        map.insert(
            keys::NUMBER_NEXTHOPS.to_string(),
            Value::String(self.number_nexthops().to_string()),
        );
        for (id, attrs) in &self.nexthops {
            map.insert(id.clone(), attrs.to_mapping());
        }
        Value::Object(map)
    }

    /// Builds a record from the nested mapping form.
    ///
    /// # Errors
    ///
    /// Fails if `Route` is missing or unparseable, a next-hop entry is not a
    /// mapping, or `NumberNexthops` disagrees with the number of next-hops.
    pub fn from_mapping(value: &Value) -> VerifyResult<Self> {
        let obj = value
            .as_object()
            .ok_or_else(|| VerifyError::invalid_expectation("expected state is not a mapping"))?;

        let route = obj
            .get(keys::ROUTE)
            .and_then(text_value)
            .ok_or_else(|| VerifyError::invalid_expectation("missing Route"))?;
        let mut record = Self::for_prefix(&route)?;

        for (key, value) in obj {
            if key == keys::ROUTE || key == keys::NUMBER_NEXTHOPS {
                continue;
            }
            record.insert_nexthop(key.clone(), NextHopAttrs::from_mapping(key, value)?);
        }

        if let Some(declared) = obj.get(keys::NUMBER_NEXTHOPS) {
            let declared = text_value(declared)
                .and_then(|s| s.trim().parse::<usize>().ok())
                .ok_or_else(|| {
                    VerifyError::invalid_expectation("NumberNexthops is not a count")
                })?;
            if declared != record.number_nexthops() {
                return Err(VerifyError::invalid_expectation(format!(
                    "NumberNexthops is {} but {} next-hops are listed",
                    declared,
                    record.number_nexthops()
                )));
            }
        }

        Ok(record)
    }
}
