use crate::resolver;
use dockview_common::{ContainerRuntime, Result};
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use tracing::{error, info, instrument};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Start,
    Stop,
    Restart,
}

impl Action {
    fn past_tense(self) -> &'static str {
        match self {
            Action::Start => "started",
            Action::Stop => "stopped",
            Action::Restart => "restarted",
        }
    }
}

impl Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Action::Start => "start",
            Action::Stop => "stop",
            Action::Restart => "restart",
        };
        f.write_str(name)
    }
}

/// State observed after a start or restart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostActionStatus {
    Running,
    Unknown,
}

impl Display for PostActionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PostActionStatus::Running => f.write_str("running"),
            PostActionStatus::Unknown => f.write_str("unknown"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LifecycleOutcome {
    pub action: Action,
    pub container_id: String,
    /// `None` for stop, which reports success without re-reading state.
    pub status: Option<PostActionStatus>,
}

impl Display for LifecycleOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Container {} {} successfully",
            self.container_id,
            self.action.past_tense()
        )?;
        if let Some(status) = self.status {
            write!(f, ". Status: {status}")?;
        }
        Ok(())
    }
}

/// Run `action` against `id` once and log the outcome. This is the only entry
/// point the HTTP layer uses.
#[instrument(skip(runtime))]
pub async fn perform(
    runtime: &dyn ContainerRuntime,
    action: Action,
    id: &str,
) -> Result<LifecycleOutcome> {
    let result = match action {
        Action::Start => start_container(runtime, id).await,
        Action::Stop => stop_container(runtime, id).await,
        Action::Restart => restart_container(runtime, id).await,
    };

    match &result {
        Ok(outcome) => info!(container_id = %id, "{outcome}"),
        Err(e) => error!(container_id = %id, error = %e, "Container {action} failed"),
    }
    result
}

pub async fn start_container(runtime: &dyn ContainerRuntime, id: &str) -> Result<LifecycleOutcome> {
    runtime.inspect_container(id).await?;
    runtime.start_container(id).await?;
    Ok(LifecycleOutcome {
        action: Action::Start,
        container_id: id.to_string(),
        status: Some(post_action_status(runtime, id).await),
    })
}

pub async fn stop_container(runtime: &dyn ContainerRuntime, id: &str) -> Result<LifecycleOutcome> {
    runtime.inspect_container(id).await?;
    runtime.stop_container(id).await?;
    Ok(LifecycleOutcome {
        action: Action::Stop,
        container_id: id.to_string(),
        status: None,
    })
}

pub async fn restart_container(
    runtime: &dyn ContainerRuntime,
    id: &str,
) -> Result<LifecycleOutcome> {
    runtime.inspect_container(id).await?;
    runtime.restart_container(id).await?;
    Ok(LifecycleOutcome {
        action: Action::Restart,
        container_id: id.to_string(),
        status: Some(post_action_status(runtime, id).await),
    })
}

async fn post_action_status(runtime: &dyn ContainerRuntime, id: &str) -> PostActionStatus {
    match resolver::resolve(runtime, id).await.is_running() {
        Some(true) => PostActionStatus::Running,
        _ => PostActionStatus::Unknown,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{MockContainer, MockRuntime, RecordedCall};
    use dockview_common::DockviewError;

    async fn runtime_with(id: &str, state: &str) -> MockRuntime {
        let runtime = MockRuntime::new();
        runtime.add(MockContainer::new(id, "svc", state)).await;
        runtime
    }

    #[tokio::test]
    async fn test_start_reports_running() {
        let runtime = runtime_with("c1", "exited").await;

        let outcome = start_container(&runtime, "c1").await.unwrap();

        assert_eq!(outcome.status, Some(PostActionStatus::Running));
        assert_eq!(
            outcome.to_string(),
            "Container c1 started successfully. Status: running"
        );
        assert_eq!(runtime.state_of("c1").await.as_deref(), Some("running"));
    }

    #[tokio::test]
    async fn test_start_reports_unknown_when_not_running_afterwards() {
        let runtime = runtime_with("c1", "exited").await;
        runtime.keep_stopped("c1").await;

        let outcome = start_container(&runtime, "c1").await.unwrap();

        assert_eq!(outcome.status, Some(PostActionStatus::Unknown));
    }

    #[tokio::test]
    async fn test_restart_reports_unknown_when_reinspect_fails() {
        let runtime = runtime_with("c1", "running").await;
        runtime.fail_image_lookup("c1").await;

        let outcome = restart_container(&runtime, "c1").await.unwrap();

        assert_eq!(
            outcome.to_string(),
            "Container c1 restarted successfully. Status: unknown"
        );
    }

    #[tokio::test]
    async fn test_stop_reports_plain_success() {
        let runtime = runtime_with("c1", "running").await;

        let outcome = stop_container(&runtime, "c1").await.unwrap();

        assert_eq!(outcome.status, None);
        assert_eq!(outcome.to_string(), "Container c1 stopped successfully");
        assert_eq!(runtime.state_of("c1").await.as_deref(), Some("exited"));
    }

    #[tokio::test]
    async fn test_unknown_id_propagates_not_found() {
        let runtime = MockRuntime::new();

        for action in [Action::Start, Action::Stop, Action::Restart] {
            let err = perform(&runtime, action, "missing").await.unwrap_err();
            assert!(err.is_not_found(), "{action}: {err}");
        }
        assert!(runtime.calls().await.is_empty());
    }

    #[tokio::test]
    async fn test_engine_failure_is_surfaced_without_retry() {
        let runtime = runtime_with("c1", "running").await;
        runtime.fail_lifecycle("c1").await;

        let err = perform(&runtime, Action::Restart, "c1").await.unwrap_err();

        assert!(matches!(err, DockviewError::Runtime(_)));
        assert!(runtime.calls().await.is_empty());
    }

    #[tokio::test]
    async fn test_perform_invokes_engine_once() {
        let runtime = runtime_with("c1", "running").await;

        perform(&runtime, Action::Stop, "c1").await.unwrap();

        assert_eq!(runtime.calls().await, vec![RecordedCall::Stop("c1".to_string())]);
    }

    #[test]
    fn test_action_serde_names() {
        let json = serde_json::to_string(&Action::Restart).unwrap();
        assert_eq!(json, "\"restart\"");
    }
}
