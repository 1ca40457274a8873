//! Stub output sources
//!
//! [`ScriptedSource`] replays canned output per device and channel, one
//! reply per call, and records every command it was asked to run.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;
use sonic_route_exec::{CommandError, CommandResult, ExecChannel, OutputSource};
use tracing::debug;

/// One scripted reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// Command succeeds with this output.
    Output(String),
    /// Command exits non-zero.
    Fail { exit_code: i32, output: String },
}

impl Reply {
    pub fn output(text: impl Into<String>) -> Self {
        Reply::Output(text.into())
    }

    pub fn fail(exit_code: i32, output: impl Into<String>) -> Self {
        Reply::Fail {
            exit_code,
            output: output.into(),
        }
    }
}

/// A command the source was asked to run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutedCommand {
    pub device: String,
    pub channel: ExecChannel,
    pub command: String,
}

#[derive(Debug, Default)]
struct ScriptState {
    replies: HashMap<(String, ExecChannel), VecDeque<Reply>>,
    executed: Vec<ExecutedCommand>,
}

/// Replays scripted replies.
///
/// Replies for a device and channel are consumed in order; the last one
/// repeats forever. A channel with no script fails with
/// [`CommandError::ChannelUnavailable`].
#[derive(Debug, Default)]
pub struct ScriptedSource {
    state: Mutex<ScriptState>,
}

impl ScriptedSource {
    /// Create a source with no scripts
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue replies for `device` on `channel`
    pub fn script<I>(self, device: &str, channel: ExecChannel, replies: I) -> Self
    where
        I: IntoIterator<Item = Reply>,
    {
        {
            let mut state = self.lock();
            state
                .replies
                .entry((device.to_string(), channel))
                .or_default()
                .extend(replies);
        }
        self
    }

    /// Always reply with `text`
    pub fn always(self, device: &str, channel: ExecChannel, text: impl Into<String>) -> Self {
        self.script(device, channel, [Reply::output(text)])
    }

    /// Reply with `before` for the first `ticks` calls, then with `after`
    pub fn switch_after(
        self,
        device: &str,
        channel: ExecChannel,
        ticks: usize,
        before: &str,
        after: &str,
    ) -> Self {
        let replies = std::iter::repeat(Reply::output(before))
            .take(ticks)
            .chain(std::iter::once(Reply::output(after)));
        self.script(device, channel, replies)
    }

    /// Commands executed so far, in order
    pub fn executed(&self) -> Vec<ExecutedCommand> {
        self.lock().executed.clone()
    }

    /// Number of calls made against `device`
    pub fn calls_to(&self, device: &str) -> usize {
        self.lock()
            .executed
            .iter()
            .filter(|cmd| cmd.device == device)
            .count()
    }

    /// Command lines executed so far
    pub fn command_lines(&self) -> Vec<String> {
        self.lock()
            .executed
            .iter()
            .map(|cmd| cmd.command.clone())
            .collect()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ScriptState> {
        // A poisoned lock only means another test thread panicked.
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl OutputSource for ScriptedSource {
    async fn execute(
        &self,
        device: &str,
        command: &str,
        channel: ExecChannel,
    ) -> CommandResult<String> {
        let mut state = self.lock();
        state.executed.push(ExecutedCommand {
            device: device.to_string(),
            channel,
            command: command.to_string(),
        });

        let queue = state
            .replies
            .get_mut(&(device.to_string(), channel))
            .filter(|queue| !queue.is_empty())
            .ok_or_else(|| CommandError::channel_unavailable(device, channel.as_str()))?;
        let reply = if queue.len() > 1 {
            queue.pop_front()
        } else {
            queue.front().cloned()
        };
        debug!(device, %channel, command, ?reply, "scripted reply");

        match reply {
            Some(Reply::Output(text)) => Ok(text),
            Some(Reply::Fail { exit_code, output }) => {
                Err(CommandError::failed(device, command, exit_code, output))
            }
            None => Err(CommandError::channel_unavailable(device, channel.as_str())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn test_replies_in_order_then_repeat_last() {
        let source = ScriptedSource::new().switch_after("dut1", ExecChannel::Shell, 2, "a", "b");
        let mut seen = Vec::new();
        for _ in 0..4 {
            seen.push(source.execute("dut1", "ip route", ExecChannel::Shell).await.unwrap());
        }
        assert_eq!(seen, vec!["a", "a", "b", "b"]);
        assert_eq!(source.calls_to("dut1"), 4);
    }

    #[tokio::test]
    async fn test_unscripted_channel_is_unavailable() {
        let source = ScriptedSource::new().always("dut1", ExecChannel::Shell, "");
        let err = source
            .execute("dut1", "show ip route", ExecChannel::ManagementCli)
            .await
            .unwrap_err();
        assert!(matches!(err, CommandError::ChannelUnavailable { .. }));
    }

    #[tokio::test]
    async fn test_scripted_failure() {
        let source =
            ScriptedSource::new().script("dut1", ExecChannel::DbClient, [Reply::fail(1, "refused")]);
        let err = source
            .execute("dut1", "HGETALL x", ExecChannel::DbClient)
            .await
            .unwrap_err();
        assert_eq!(err.command(), Some("HGETALL x"));
        assert_eq!(
            source.executed(),
            vec![ExecutedCommand {
                device: "dut1".to_string(),
                channel: ExecChannel::DbClient,
                command: "HGETALL x".to_string(),
            }]
        );
    }
}
