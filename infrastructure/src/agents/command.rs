//! Shell-command agent invoker
//!
//! Each agent is backed by a shell command (`sh -c <command>`). The rendered
//! prompt is written to the command's stdin and its trimmed stdout is the
//! agent's reply. The agent name, temperature and turn purpose are exported
//! as `ROUNDTABLE_AGENT`, `ROUNDTABLE_TEMPERATURE` and `ROUNDTABLE_PURPOSE`.

use async_trait::async_trait;
use roundtable_application::{AgentInvoker, AgentReply, AgentRequest, InvocationError};
use std::collections::HashMap;
use std::io::ErrorKind;
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, warn};

/// Longest stderr excerpt carried in a failure
const MAX_STDERR_CHARS: usize = 2000;

/// Agent invoker that shells out to an external command per turn
#[derive(Debug, Clone, Default)]
pub struct CommandAgentInvoker {
    commands: HashMap<String, String>,
    default_command: Option<String>,
}

impl CommandAgentInvoker {
    pub fn new(commands: HashMap<String, String>) -> Self {
        Self {
            commands,
            default_command: None,
        }
    }

    /// Command used for agents without one of their own
    pub fn with_default_command(mut self, command: impl Into<String>) -> Self {
        let command = command.into();
        self.default_command = (!command.trim().is_empty()).then_some(command);
        self
    }

    fn command_for(&self, agent: &str) -> Option<&str> {
        self.commands
            .get(agent)
            .or(self.default_command.as_ref())
            .map(String::as_str)
    }
}

#[async_trait]
impl AgentInvoker for CommandAgentInvoker {
    async fn invoke(&self, request: &AgentRequest<'_>) -> Result<AgentReply, InvocationError> {
        let agent = request.agent.id.as_str();
        let command = self.command_for(agent).ok_or_else(|| {
            InvocationError::Unavailable(format!("no command configured for agent '{}'", agent))
        })?;

        debug!(agent, purpose = request.purpose.as_str(), "Running agent command");

        let mut child = Command::new("sh")
            .arg("-c")
            .arg(command)
            .env("ROUNDTABLE_AGENT", agent)
            .env(
                "ROUNDTABLE_TEMPERATURE",
                request.agent.temperature.to_string(),
            )
            .env("ROUNDTABLE_PURPOSE", request.purpose.as_str())
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                InvocationError::Unavailable(format!("failed to spawn '{}': {}", command, e))
            })?;

        let prompt = request.render();
        let mut stdin = child.stdin.take();
        let write_prompt = async move {
            if let Some(stdin) = stdin.as_mut() {
                stdin.write_all(prompt.as_bytes()).await?;
                stdin.shutdown().await?;
            }
            drop(stdin);
            Ok::<(), std::io::Error>(())
        };

        let (written, output) = tokio::join!(write_prompt, child.wait_with_output());

        // Commands that ignore their input close stdin early
        if let Err(e) = written
            && e.kind() != ErrorKind::BrokenPipe
        {
            warn!(agent, error = %e, "Failed to write prompt to agent command");
        }

        let output = output
            .map_err(|e| InvocationError::Failed(format!("failed to wait for command: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let stderr: String = stderr.trim().chars().take(MAX_STDERR_CHARS).collect();
            let status = output
                .status
                .code()
                .map_or_else(|| "signal".to_string(), |code| code.to_string());
            return Err(InvocationError::Failed(if stderr.is_empty() {
                format!("command exited with status {}", status)
            } else {
                format!("command exited with status {}: {}", status, stderr)
            }));
        }

        let text = String::from_utf8_lossy(&output.stdout).trim().to_string();
        Ok(AgentReply::new(text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use roundtable_application::TurnPurpose;
    use roundtable_domain::{AgentProfile, Message};

    fn invoker(command: &str) -> CommandAgentInvoker {
        CommandAgentInvoker::default().with_default_command(command)
    }

    async fn run(
        invoker: &CommandAgentInvoker,
        agent: &AgentProfile,
    ) -> Result<AgentReply, InvocationError> {
        let history = vec![Message::user("What is 2+2?", 0, 0)];
        let request = AgentRequest {
            agent,
            history: &history,
            system_prompt: "You are helpful.",
            instruction: "Answer briefly.",
            retry_notice: None,
            purpose: TurnPurpose::Vote,
        };
        invoker.invoke(&request).await
    }

    #[tokio::test]
    async fn test_prompt_is_piped_to_stdin() {
        let agent = AgentProfile::new("agent1", "role");
        let reply = run(&invoker("cat"), &agent).await.unwrap();
        assert!(reply.text.starts_with("### System"));
        assert!(reply.text.contains("What is 2+2?"));
        assert!(reply.text.ends_with("Answer briefly."));
    }

    #[tokio::test]
    async fn test_environment_is_exported() {
        let agent = AgentProfile::new("critic", "role").with_temperature(0.5);
        let reply = run(
            &invoker("echo \"$ROUNDTABLE_AGENT $ROUNDTABLE_TEMPERATURE $ROUNDTABLE_PURPOSE\""),
            &agent,
        )
        .await
        .unwrap();
        assert_eq!(reply.text, "critic 0.5 vote");
    }

    #[tokio::test]
    async fn test_per_agent_command_overrides_default() {
        let mut commands = HashMap::new();
        commands.insert("agent2".to_string(), "echo special".to_string());
        let invoker = CommandAgentInvoker::new(commands).with_default_command("echo plain");

        let a1 = AgentProfile::new("agent1", "role");
        let a2 = AgentProfile::new("agent2", "role");
        assert_eq!(run(&invoker, &a1).await.unwrap().text, "plain");
        assert_eq!(run(&invoker, &a2).await.unwrap().text, "special");
    }

    #[tokio::test]
    async fn test_command_ignoring_stdin_succeeds() {
        let agent = AgentProfile::new("agent1", "role");
        let reply = run(&invoker("echo ok"), &agent).await.unwrap();
        assert_eq!(reply.text, "ok");
    }

    #[tokio::test]
    async fn test_non_zero_exit_is_failure() {
        let agent = AgentProfile::new("agent1", "role");
        let err = run(&invoker("echo boom >&2; exit 3"), &agent)
            .await
            .unwrap_err();
        assert_eq!(
            err,
            InvocationError::Failed("command exited with status 3: boom".to_string())
        );
    }

    #[tokio::test]
    async fn test_missing_command_is_unavailable() {
        let agent = AgentProfile::new("agent1", "role");
        let err = run(&CommandAgentInvoker::default(), &agent)
            .await
            .unwrap_err();
        assert!(matches!(err, InvocationError::Unavailable(_)));
    }
}
