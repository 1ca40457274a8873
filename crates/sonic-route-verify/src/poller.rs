//! Convergence poller.
//!
//! Route installation travels from the routing daemon through APPL_DB to the
//! kernel with no notification the caller could wait on, so the pipeline
//! (execute, extract, compare) is re-run on a fixed interval until the route
//! reaches the desired state or the attempt budget runs out.

use std::fmt;
use std::time::Duration;

use serde_json::Value;
use sonic_route_exec::OutputSource;
use tokio::time::sleep;
use tracing::{debug, info, instrument, warn};

use crate::compare::{compare, Comparison};
use crate::error::{VerifyError, VerifyResult};
use crate::format::{OutputFormat, RouteQuery};
use crate::record::{RoutePrefix, RouteRecord};

/// Default interval between ticks.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Default attempt budget.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 15;

/// Retry policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    /// Sleep between two ticks.
    pub interval: Duration,
    /// Number of ticks before giving up. Zero is treated as one.
    pub max_attempts: u32,
}

impl PollPolicy {
    pub fn new(interval: Duration, max_attempts: u32) -> Self {
        Self {
            interval,
            max_attempts,
        }
    }

    /// Upper bound of the time spent sleeping.
    pub fn budget(&self) -> Duration {
        self.interval * self.max_attempts.max(1).saturating_sub(1)
    }
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_POLL_INTERVAL, DEFAULT_MAX_ATTEMPTS)
    }
}

/// State the caller waits for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Presence {
    /// The route is installed exactly as expected.
    #[default]
    Present,
    /// The route no longer matches the expected state.
    Absent,
}

impl Presence {
    /// Whether `comparison` satisfies this desired state.
    pub fn is_satisfied(&self, comparison: &Comparison) -> bool {
        match self {
            Presence::Present => comparison.is_match(),
            Presence::Absent => !comparison.is_match(),
        }
    }
}

impl fmt::Display for Presence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Presence::Present => f.write_str("present"),
            Presence::Absent => f.write_str("absent"),
        }
    }
}

/// Terminal outcome of a poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    /// The desired state was observed on tick `attempts`.
    Converged { attempts: u32 },
    /// The budget ran out after `attempts` ticks.
    Exhausted { attempts: u32 },
}

impl PollOutcome {
    pub fn attempts(&self) -> u32 {
        match self {
            PollOutcome::Converged { attempts } | PollOutcome::Exhausted { attempts } => *attempts,
        }
    }

    pub fn is_converged(&self) -> bool {
        matches!(self, PollOutcome::Converged { .. })
    }
}

/// Poller state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollState {
    /// Waiting for tick `attempt` (1-based).
    Polling { attempt: u32 },
    Done(PollOutcome),
}

/// POLLING/DONE state machine, free of any I/O.
#[derive(Debug, Clone)]
pub struct Poller {
    max_attempts: u32,
    state: PollState,
}

impl Poller {
    pub fn new(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            state: PollState::Polling { attempt: 1 },
        }
    }

    pub fn state(&self) -> PollState {
        self.state
    }

    /// Records the result of the current tick and returns the next state.
    ///
    /// Once done, further results are ignored.
    pub fn record(&mut self, satisfied: bool) -> PollState {
        if let PollState::Polling { attempt } = self.state {
            self.state = if satisfied {
                PollState::Done(PollOutcome::Converged { attempts: attempt })
            } else if attempt >= self.max_attempts {
                PollState::Done(PollOutcome::Exhausted { attempts: attempt })
            } else {
                PollState::Polling {
                    attempt: attempt + 1,
                }
            };
        }
        self.state
    }
}

/// Result of polling one route on one device.
#[derive(Debug, Clone)]
pub struct Verification {
    /// Device that was polled.
    pub device: String,
    /// Route that was polled.
    pub prefix: RoutePrefix,
    /// State that was waited for.
    pub desired: Presence,
    /// True if the desired state was reached.
    pub converged: bool,
    /// Ticks performed.
    pub attempts: u32,
    /// Last observation; `None` if the route was not found.
    pub observed: Option<RouteRecord>,
    /// Last comparison against the expected record.
    pub comparison: Comparison,
}

impl Verification {
    /// The last observation in mapping form. A route that was not found is
    /// reported with no next-hops.
    pub fn observed_mapping(&self) -> Value {
        match &self.observed {
            Some(record) => record.to_mapping(),
            None => RouteRecord::new(self.prefix).to_mapping(),
        }
    }

    /// Turns a failed verification into [`VerifyError::Timeout`].
    pub fn ensure_converged(self) -> VerifyResult<Self> {
        if self.converged {
            return Ok(self);
        }
        Err(VerifyError::Timeout {
            device: self.device,
            prefix: self.prefix.to_string(),
            desired: self.desired.to_string(),
            attempts: self.attempts,
            diff: self.comparison.to_string(),
        })
    }
}

/// Runs one tick of the pipeline: execute, scan, locate and parse.
pub async fn observe<S: OutputSource + ?Sized>(
    source: &S,
    device: &str,
    format: OutputFormat,
    query: &RouteQuery<'_>,
) -> VerifyResult<Option<RouteRecord>> {
    let command = format.command(query);
    let text = source.execute(device, &command, format.channel()).await?;
    Ok(format.extract(&text, query))
}

/// Polls `device` until the route of `query` is `desired` or `policy` runs out.
///
/// Execution errors abort the poll immediately. Running out of attempts is
/// not an error; see [`Verification::ensure_converged`].
#[instrument(
    skip_all,
    fields(device = %device, format = %format, prefix = %query.prefix(), desired = %desired)
)]
pub async fn poll_route<S: OutputSource + ?Sized>(
    source: &S,
    device: &str,
    format: OutputFormat,
    query: &RouteQuery<'_>,
    desired: Presence,
    policy: &PollPolicy,
) -> VerifyResult<Verification> {
    let mut poller = Poller::new(policy.max_attempts);

    loop {
        let observed = observe(source, device, format, query).await?;
        let comparison = compare(query.expected(), observed.as_ref());
        let satisfied = desired.is_satisfied(&comparison);
        debug!(state = ?poller.state(), satisfied, diff = %comparison, "poll tick");

        match poller.record(satisfied) {
            PollState::Polling { .. } => sleep(policy.interval).await,
            PollState::Done(outcome) => {
                if outcome.is_converged() {
                    info!(attempts = outcome.attempts(), "route converged");
                } else {
                    warn!(
                        attempts = outcome.attempts(),
                        diff = %comparison,
                        "route did not converge"
                    );
                }
                return Ok(Verification {
                    device: device.to_string(),
                    prefix: *query.prefix(),
                    desired,
                    converged: outcome.is_converged(),
                    attempts: outcome.attempts(),
                    observed,
                    comparison,
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::NextHopAttrs;
    use async_trait::async_trait;
    use pretty_assertions::assert_eq;
    use sonic_route_exec::{CommandError, CommandResult, ExecChannel};
    use std::sync::Mutex;

    const PRESENT: &str = "10.0.0.0/24, 1 unicast next-hops\n    via 1.1.1.2, [1/0], static";

    /// Returns the queued outputs in order, then repeats the last one.
    struct Queued {
        outputs: Mutex<Vec<CommandResult<String>>>,
        calls: Mutex<u32>,
    }

    impl Queued {
        fn new(outputs: Vec<CommandResult<String>>) -> Self {
            Self {
                outputs: Mutex::new(outputs),
                calls: Mutex::new(0),
            }
        }

        fn calls(&self) -> u32 {
            *self.calls.lock().unwrap()
        }
    }

    #[async_trait]
    impl OutputSource for Queued {
        async fn execute(
            &self,
            _device: &str,
            _command: &str,
            _channel: ExecChannel,
        ) -> CommandResult<String> {
            *self.calls.lock().unwrap() += 1;
            let mut outputs = self.outputs.lock().unwrap();
            if outputs.len() > 1 {
                outputs.remove(0)
            } else {
                match &outputs[0] {
                    Ok(text) => Ok(text.clone()),
                    Err(_) => Err(CommandError::failed("dut1", "show", 1, "")),
                }
            }
        }
    }

    fn expected() -> RouteRecord {
        RouteRecord::for_prefix("10.0.0.0/24")
            .unwrap()
            .with_nexthop("1.1.1.2", NextHopAttrs::new("1", "0", "static"))
    }

    async fn run(
        source: &Queued,
        desired: Presence,
        max_attempts: u32,
    ) -> VerifyResult<Verification> {
        let expected = expected();
        let query = RouteQuery::new(&expected);
        let policy = PollPolicy::new(Duration::from_millis(1), max_attempts);
        poll_route(source, "dut1", OutputFormat::Rib, &query, desired, &policy).await
    }

    #[test]
    fn test_default_policy() {
        let policy = PollPolicy::default();
        assert_eq!(policy.interval, Duration::from_secs(2));
        assert_eq!(policy.max_attempts, 15);
        assert_eq!(policy.budget(), Duration::from_secs(28));
    }

    #[test]
    fn test_poller_converges_on_tick() {
        let mut poller = Poller::new(3);
        assert_eq!(poller.record(false), PollState::Polling { attempt: 2 });
        assert_eq!(
            poller.record(true),
            PollState::Done(PollOutcome::Converged { attempts: 2 })
        );
        // Done is terminal.
        assert_eq!(
            poller.record(false),
            PollState::Done(PollOutcome::Converged { attempts: 2 })
        );
    }

    #[test]
    fn test_poller_exhausts_budget() {
        let mut poller = Poller::new(2);
        poller.record(false);
        assert_eq!(
            poller.record(false),
            PollState::Done(PollOutcome::Exhausted { attempts: 2 })
        );
    }

    #[test]
    fn test_zero_budget_still_ticks_once() {
        let mut poller = Poller::new(0);
        assert_eq!(
            poller.record(false),
            PollState::Done(PollOutcome::Exhausted { attempts: 1 })
        );
    }

    #[test]
    fn test_presence() {
        let matched = Comparison::default();
        let absent = compare(&expected(), None);
        assert!(Presence::Present.is_satisfied(&matched));
        assert!(!Presence::Present.is_satisfied(&absent));
        assert!(Presence::Absent.is_satisfied(&absent));
        assert!(!Presence::Absent.is_satisfied(&matched));
    }

    #[tokio::test]
    async fn test_poll_converges_at_third_tick() {
        let source = Queued::new(vec![
            Ok(String::new()),
            Ok(String::new()),
            Ok(PRESENT.to_string()),
        ]);

        let verification = run(&source, Presence::Present, 5).await.unwrap();
        assert!(verification.converged);
        assert_eq!(verification.attempts, 3);
        assert_eq!(source.calls(), 3);
        assert_eq!(verification.observed, Some(expected()));
    }

    #[tokio::test]
    async fn test_poll_times_out() {
        let source = Queued::new(vec![Ok(String::new())]);

        let verification = run(&source, Presence::Present, 4).await.unwrap();
        assert!(!verification.converged);
        assert_eq!(verification.attempts, 4);
        assert_eq!(source.calls(), 4);
        assert_eq!(
            verification.observed_mapping(),
            serde_json::json!({"Route": "10.0.0.0/24", "NumberNexthops": "0"})
        );

        let err = verification.ensure_converged().unwrap_err();
        assert!(matches!(err, VerifyError::Timeout { attempts: 4, .. }));
    }

    #[tokio::test]
    async fn test_poll_waits_for_removal() {
        let source = Queued::new(vec![Ok(PRESENT.to_string()), Ok(String::new())]);

        let verification = run(&source, Presence::Absent, 5).await.unwrap();
        assert!(verification.converged);
        assert_eq!(verification.attempts, 2);
        assert!(verification.comparison.route_absent());
    }

    #[tokio::test]
    async fn test_command_error_is_not_retried() {
        let source = Queued::new(vec![Err(CommandError::failed("dut1", "show", 1, ""))]);

        let err = run(&source, Presence::Present, 5).await.unwrap_err();
        assert!(err.is_command_error());
        assert_eq!(source.calls(), 1);
    }
}
