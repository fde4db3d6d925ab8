use async_trait::async_trait;
use bollard::container::{
    InspectContainerOptions, ListContainersOptions, RestartContainerOptions,
    StartContainerOptions, StopContainerOptions,
};
use bollard::errors::Error as BollardError; // Alias bollard error
use bollard::models::{ContainerInspectResponse, ContainerSummary as BollardSummary, PortMap};
use bollard::Docker;
use dockview_common::{
    ContainerAttrs, ContainerRecord, ContainerRuntime, DockviewError, PortMapping,
    Result as CommonResult, STATE_UNKNOWN,
};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, instrument};

// Re-export dependencies potentially needed by consumers (like the server)
pub use bollard;
pub use dockview_common as common;

pub mod lifecycle;
pub mod resolver;
#[cfg(any(test, feature = "testing"))]
pub mod test_utils;

/// Seconds to wait on the engine socket before giving up on a request.
const SOCKET_TIMEOUT_SECS: u64 = 120;

// --- Custom Error Type ---
#[derive(Error, Debug)]
pub enum RuntimeError {
    #[error("Docker connection failed: {0}")]
    ConnectFailed(#[source] BollardError),
    #[error("Container listing failed: {0}")]
    ListFailed(#[source] BollardError),
    #[error("Container inspect failed: {0}")]
    InspectFailed(#[source] BollardError),
    #[error("Image inspect failed: {0}")]
    ImageInspectFailed(#[source] BollardError),
    #[error("Container start failed: {0}")]
    StartFailed(#[source] BollardError),
    #[error("Container stop failed: {0}")]
    StopFailed(#[source] BollardError),
    #[error("Container restart failed: {0}")]
    RestartFailed(#[source] BollardError),
    #[error("Docker API error: {0}")]
    DockerApi(#[from] BollardError), // Catch-all for other bollard errors
}

impl RuntimeError {
    fn bollard_source(&self) -> &BollardError {
        match self {
            RuntimeError::ConnectFailed(e)
            | RuntimeError::ListFailed(e)
            | RuntimeError::InspectFailed(e)
            | RuntimeError::ImageInspectFailed(e)
            | RuntimeError::StartFailed(e)
            | RuntimeError::StopFailed(e)
            | RuntimeError::RestartFailed(e)
            | RuntimeError::DockerApi(e) => e,
        }
    }
}

// The engine answers 404 for unknown container ids; everything else is a runtime fault
impl From<RuntimeError> for DockviewError {
    fn from(err: RuntimeError) -> Self {
        match err.bollard_source() {
            BollardError::DockerResponseServerError {
                status_code: 404,
                message,
            } => DockviewError::NotFound(message.clone()),
            _ => DockviewError::Runtime(err.to_string()),
        }
    }
}

// Define local Result using the crate's Error type
pub type Result<T> = std::result::Result<T, RuntimeError>;

// --- DockerRuntime Implementation ---

#[derive(Clone)]
pub struct DockerRuntime {
    docker_client: Arc<Docker>,
}

impl DockerRuntime {
    pub fn new(docker_client: Arc<Docker>) -> Self {
        Self { docker_client }
    }

    /// Open the engine connection once. `socket` overrides the local defaults
    /// (`DOCKER_HOST` or `/var/run/docker.sock`).
    pub fn connect(socket: Option<&str>) -> Result<Self> {
        let docker = match socket {
            Some(path) => {
                Docker::connect_with_socket(path, SOCKET_TIMEOUT_SECS, bollard::API_DEFAULT_VERSION)
            }
            None => Docker::connect_with_local_defaults(),
        }
        .map_err(RuntimeError::ConnectFailed)?;

        info!(socket = socket.unwrap_or("local defaults"), "Docker client initialised");
        Ok(Self::new(Arc::new(docker)))
    }
}

#[async_trait]
impl ContainerRuntime for DockerRuntime {
    #[instrument(skip(self))]
    async fn list_containers(&self) -> CommonResult<Vec<ContainerRecord>> {
        let options = ListContainersOptions::<String> {
            all: true,
            ..Default::default()
        };
        let containers = self
            .docker_client
            .list_containers(Some(options))
            .await
            .map_err(RuntimeError::ListFailed)?;

        debug!(count = containers.len(), "Listed containers");
        Ok(containers.into_iter().map(record_from_summary).collect())
    }

    #[instrument(skip(self))]
    async fn inspect_container(&self, id: &str) -> CommonResult<ContainerAttrs> {
        let response = self
            .docker_client
            .inspect_container(id, None::<InspectContainerOptions>)
            .await
            .map_err(RuntimeError::InspectFailed)?;

        Ok(attrs_from_inspect(response))
    }

    #[instrument(skip(self))]
    async fn image_tags(&self, image: &str) -> CommonResult<Vec<String>> {
        let image_info = self
            .docker_client
            .inspect_image(image)
            .await
            .map_err(RuntimeError::ImageInspectFailed)?;

        Ok(image_info.repo_tags.unwrap_or_default())
    }

    #[instrument(skip(self))]
    async fn start_container(&self, id: &str) -> CommonResult<()> {
        self.docker_client
            .start_container(id, None::<StartContainerOptions<String>>)
            .await
            .map_err(RuntimeError::StartFailed)?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn stop_container(&self, id: &str) -> CommonResult<()> {
        self.docker_client
            .stop_container(id, None::<StopContainerOptions>)
            .await
            .map_err(RuntimeError::StopFailed)?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn restart_container(&self, id: &str) -> CommonResult<()> {
        self.docker_client
            .restart_container(id, None::<RestartContainerOptions>)
            .await
            .map_err(RuntimeError::RestartFailed)?;
        Ok(())
    }

    async fn ping(&self) -> CommonResult<()> {
        self.docker_client
            .ping()
            .await
            .map_err(RuntimeError::DockerApi)?;
        Ok(())
    }
}

// --- Conversions from engine models ---

fn record_from_summary(summary: BollardSummary) -> ContainerRecord {
    let name = summary
        .names
        .and_then(|names| names.into_iter().next())
        .map(|n| n.trim_start_matches('/').to_string())
        .unwrap_or_default();

    ContainerRecord {
        id: summary.id.unwrap_or_default(),
        name,
        state: non_empty(summary.state).unwrap_or_else(|| STATE_UNKNOWN.to_string()),
    }
}

pub(crate) fn attrs_from_inspect(response: ContainerInspectResponse) -> ContainerAttrs {
    let state = response
        .state
        .and_then(|s| s.status)
        .map(|status| status.to_string());

    let (ip_address, ports) = match response.network_settings {
        Some(settings) => {
            // The default bridge address lives at the top level; user networks only
            // report theirs per endpoint, so fall back to the first one by name.
            let primary = non_empty(settings.ip_address).or_else(|| {
                let mut networks: Vec<_> = settings.networks.unwrap_or_default().into_iter().collect();
                networks.sort_by(|a, b| a.0.cmp(&b.0));
                networks
                    .into_iter()
                    .find_map(|(_, endpoint)| non_empty(endpoint.ip_address))
            });
            (primary, port_mappings(settings.ports))
        }
        None => (None, Vec::new()),
    };

    ContainerAttrs {
        id: response.id.unwrap_or_default(),
        name: response
            .name
            .map(|n| n.trim_start_matches('/').to_string())
            .unwrap_or_default(),
        state: non_empty(state).unwrap_or_else(|| STATE_UNKNOWN.to_string()),
        ip_address,
        ports,
        image: response.image.unwrap_or_default(),
    }
}

/// Flatten the engine's port map (`"80/tcp" -> [bindings]`) into an ordered list.
pub(crate) fn port_mappings(ports: Option<PortMap>) -> Vec<PortMapping> {
    let mut mappings: Vec<PortMapping> = ports
        .unwrap_or_default()
        .into_iter()
        .filter_map(|(key, bindings)| {
            let (port, protocol) = key.split_once('/').unwrap_or((key.as_str(), "tcp"));
            let Ok(container_port) = port.parse::<u16>() else {
                debug!(%key, "Skipping unparsable port key");
                return None;
            };

            let host = bindings
                .and_then(|b| b.into_iter().next())
                .map(|binding| dockview_common::HostBinding {
                    host_ip: binding.host_ip.unwrap_or_default(),
                    host_port: binding.host_port.unwrap_or_default(),
                });

            Some(PortMapping {
                container_port,
                protocol: protocol.to_string(),
                host,
            })
        })
        .collect();

    mappings.sort_by(|a, b| {
        a.container_port
            .cmp(&b.container_port)
            .then_with(|| a.protocol.cmp(&b.protocol))
    });
    mappings
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

// Re-export the pieces the HTTP layer drives
pub use lifecycle::{perform, Action, LifecycleOutcome, PostActionStatus};
pub use resolver::{resolve, ContainerSummary};
