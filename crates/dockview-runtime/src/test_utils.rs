/// Test utilities: an in-memory engine with scripted containers and injectable faults
use async_trait::async_trait;
use dockview_common::{
    ContainerAttrs, ContainerRecord, ContainerRuntime, DockviewError, PortMapping, Result,
};
use std::collections::{BTreeMap, HashSet};
use std::process::Command;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

pub fn has_docker() -> bool {
    // Check if docker command exists
    Command::new("docker")
        .arg("info")
        .output()
        .map(|output| output.status.success())
        .unwrap_or(false)
}

/// Macro to skip tests when requirements aren't met
#[macro_export]
macro_rules! require_docker {
    () => {
        if !$crate::test_utils::has_docker() {
            eprintln!("Test ignored: Docker not available");
            return;
        }
    };
}

#[derive(Clone, Debug)]
pub struct MockContainer {
    pub attrs: ContainerAttrs,
    pub tags: Vec<String>,
}

impl MockContainer {
    pub fn new(id: &str, name: &str, state: &str) -> Self {
        Self {
            attrs: ContainerAttrs {
                id: id.to_string(),
                name: name.to_string(),
                state: state.to_string(),
                ip_address: None,
                ports: Vec::new(),
                image: format!("sha256:{id}"),
            },
            tags: Vec::new(),
        }
    }

    pub fn with_ip(mut self, ip: &str) -> Self {
        self.attrs.ip_address = Some(ip.to_string());
        self
    }

    pub fn with_port(mut self, port: PortMapping) -> Self {
        self.attrs.ports.push(port);
        self
    }

    pub fn with_tags(mut self, tags: &[&str]) -> Self {
        self.tags = tags.iter().map(|t| t.to_string()).collect();
        self
    }
}

/// A lifecycle call the mock received.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RecordedCall {
    Start(String),
    Stop(String),
    Restart(String),
}

#[derive(Default)]
struct Faults {
    inspect: HashSet<String>,
    image: HashSet<String>,
    lifecycle: HashSet<String>,
    list: bool,
    ping: bool,
    /// Containers that stay in their current state when started.
    stuck: HashSet<String>,
}

/// In-memory [`ContainerRuntime`]. Lifecycle calls mutate the stored state the
/// way the engine would.
#[derive(Clone, Default)]
pub struct MockRuntime {
    containers: Arc<RwLock<BTreeMap<String, MockContainer>>>,
    faults: Arc<RwLock<Faults>>,
    calls: Arc<Mutex<Vec<RecordedCall>>>,
}

impl MockRuntime {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add(&self, container: MockContainer) {
        self.containers
            .write()
            .await
            .insert(container.attrs.id.clone(), container);
    }

    pub async fn state_of(&self, id: &str) -> Option<String> {
        self.containers
            .read()
            .await
            .get(id)
            .map(|c| c.attrs.state.clone())
    }

    pub async fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().await.clone()
    }

    pub async fn fail_inspect(&self, id: &str) {
        self.faults.write().await.inspect.insert(id.to_string());
    }

    pub async fn fail_image_lookup(&self, id: &str) {
        self.faults.write().await.image.insert(format!("sha256:{id}"));
    }

    pub async fn fail_lifecycle(&self, id: &str) {
        self.faults.write().await.lifecycle.insert(id.to_string());
    }

    pub async fn fail_list(&self) {
        self.faults.write().await.list = true;
    }

    pub async fn fail_ping(&self) {
        self.faults.write().await.ping = true;
    }

    pub async fn keep_stopped(&self, id: &str) {
        self.faults.write().await.stuck.insert(id.to_string());
    }

    async fn transition(&self, call: RecordedCall, id: &str, state: &str) -> Result<()> {
        if !self.containers.read().await.contains_key(id) {
            return Err(not_found(id));
        }
        if self.faults.read().await.lifecycle.contains(id) {
            return Err(DockviewError::Runtime(format!("engine refused {call:?}")));
        }
        self.calls.lock().await.push(call);

        let stuck = self.faults.read().await.stuck.contains(id);
        if let Some(container) = self.containers.write().await.get_mut(id) {
            if !(stuck && state == dockview_common::STATE_RUNNING) {
                container.attrs.state = state.to_string();
            }
        }
        Ok(())
    }
}

fn not_found(id: &str) -> DockviewError {
    DockviewError::NotFound(format!("No such container: {id}"))
}

#[async_trait]
impl ContainerRuntime for MockRuntime {
    async fn list_containers(&self) -> Result<Vec<ContainerRecord>> {
        if self.faults.read().await.list {
            return Err(DockviewError::Runtime("connection refused".to_string()));
        }
        Ok(self
            .containers
            .read()
            .await
            .values()
            .map(|c| ContainerRecord {
                id: c.attrs.id.clone(),
                name: c.attrs.name.clone(),
                state: c.attrs.state.clone(),
            })
            .collect())
    }

    async fn inspect_container(&self, id: &str) -> Result<ContainerAttrs> {
        let container = self
            .containers
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| not_found(id))?;
        if self.faults.read().await.inspect.contains(id) {
            return Err(DockviewError::Runtime("inspect timed out".to_string()));
        }
        Ok(container.attrs)
    }

    async fn image_tags(&self, image: &str) -> Result<Vec<String>> {
        if self.faults.read().await.image.contains(image) {
            return Err(DockviewError::Runtime(format!("No such image: {image}")));
        }
        Ok(self
            .containers
            .read()
            .await
            .values()
            .find(|c| c.attrs.image == image)
            .map(|c| c.tags.clone())
            .unwrap_or_default())
    }

    async fn start_container(&self, id: &str) -> Result<()> {
        self.transition(RecordedCall::Start(id.to_string()), id, "running")
            .await
    }

    async fn stop_container(&self, id: &str) -> Result<()> {
        self.transition(RecordedCall::Stop(id.to_string()), id, "exited")
            .await
    }

    async fn restart_container(&self, id: &str) -> Result<()> {
        self.transition(RecordedCall::Restart(id.to_string()), id, "running")
            .await
    }

    async fn ping(&self) -> Result<()> {
        if self.faults.read().await.ping {
            return Err(DockviewError::Runtime("connection refused".to_string()));
        }
        Ok(())
    }
}
