//! Scenario-scoped verification settings.
//!
//! A [`VerificationContext`] is built once per test scenario and handed to
//! every verification call, so nothing about a scenario lives in globals.

use sonic_route_exec::OutputSource;
use tracing::info;

use crate::error::VerifyResult;
use crate::format::{OutputFormat, RouteQuery};
use crate::poller::{poll_route, PollPolicy, Presence, Verification};
use crate::record::{RouteRecord, RouteSource};

/// Settings shared by every check of one scenario.
#[derive(Debug, Clone, Default)]
pub struct VerificationContext {
    /// Retry policy.
    pub poll: PollPolicy,
    /// VRF the routes live in; `None` is the default VRF.
    pub vrf: Option<String>,
    /// Keep only next-hops of this type. For kernel dumps this is also the
    /// type reported for every next-hop.
    pub route_type_filter: Option<RouteSource>,
}

impl VerificationContext {
    pub fn new(poll: PollPolicy) -> Self {
        Self {
            poll,
            ..Default::default()
        }
    }

    pub fn with_vrf(mut self, vrf: impl Into<String>) -> Self {
        self.vrf = Some(vrf.into());
        self
    }

    pub fn with_route_type_filter(mut self, route_type: RouteSource) -> Self {
        self.route_type_filter = Some(route_type);
        self
    }

    /// Builds the extraction query for `expected` under this context.
    pub fn query<'a>(&'a self, expected: &'a RouteRecord) -> RouteQuery<'a> {
        RouteQuery::new(expected)
            .with_vrf(self.vrf.as_deref())
            .with_route_type(self.route_type_filter.as_ref())
    }
}

/// An expected route and the dump it is checked against.
#[derive(Debug, Clone)]
pub struct RouteCheck {
    pub expected: RouteRecord,
    pub format: OutputFormat,
}

impl RouteCheck {
    pub fn new(expected: RouteRecord, format: OutputFormat) -> Self {
        Self { expected, format }
    }
}

/// Polls one device until `check` reaches `desired`.
pub async fn verify_route<S: OutputSource + ?Sized>(
    source: &S,
    device: &str,
    check: &RouteCheck,
    desired: Presence,
    ctx: &VerificationContext,
) -> VerifyResult<Verification> {
    let query = ctx.query(&check.expected);
    poll_route(source, device, check.format, &query, desired, &ctx.poll).await
}

/// Runs [`verify_route`] on each device in turn.
///
/// Devices are checked one after another; the first execution error stops
/// the run. State may change on one device while another is being checked.
pub async fn verify_on_devices<S, D>(
    source: &S,
    devices: &[D],
    check: &RouteCheck,
    desired: Presence,
    ctx: &VerificationContext,
) -> VerifyResult<Vec<Verification>>
where
    S: OutputSource + ?Sized,
    D: AsRef<str>,
{
    let mut results = Vec::with_capacity(devices.len());
    for device in devices {
        results.push(verify_route(source, device.as_ref(), check, desired, ctx).await?);
    }
    info!(
        prefix = %check.expected.prefix(),
        devices = results.len(),
        converged = results.iter().filter(|v| v.converged).count(),
        "multi-device verification finished"
    );
    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::time::Duration;

    #[test]
    fn test_context_builds_query() {
        let ctx = VerificationContext::new(PollPolicy::new(Duration::from_millis(1), 2))
            .with_vrf("Vrf1")
            .with_route_type_filter(RouteSource::Static);
        let expected = RouteRecord::for_prefix("10.0.0.0/24").unwrap();
        let query = ctx.query(&expected);

        assert_eq!(query.vrf, Some("Vrf1"));
        assert_eq!(query.route_type, Some(&RouteSource::Static));
        assert_eq!(query.prefix().to_string(), "10.0.0.0/24");
    }

    #[test]
    fn test_default_context() {
        let ctx = VerificationContext::default();
        assert_eq!(ctx.poll, PollPolicy::default());
        assert!(ctx.vrf.is_none());
        assert!(ctx.route_type_filter.is_none());
    }
}
