// Re-export dependencies used in public interfaces of common types

use std::fmt::Display;

use async_trait::async_trait;
pub use serde::{Deserialize, Serialize};
use thiserror::Error;

/// State string reported for a running container.
pub const STATE_RUNNING: &str = "running";

/// State string used when the runtime reports no state at all.
pub const STATE_UNKNOWN: &str = "unknown";

#[derive(Error, Debug)]
pub enum DockviewError {
    #[error("Container Not Found: {0}")]
    NotFound(String),

    #[error("Runtime Error: {0}")]
    Runtime(String),

    #[error("Configuration Error: {0}")]
    Config(String),

    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),
}

impl DockviewError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, DockviewError::NotFound(_))
    }
}

// Define the primary Result type for dashboard operations
pub type Result<T> = std::result::Result<T, DockviewError>;

/// A container as returned by enumeration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerRecord {
    pub id: String,
    pub name: String,
    /// Raw lifecycle state as reported by the runtime (`running`, `exited`, ...).
    pub state: String,
}

/// Host side of a port mapping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostBinding {
    pub host_ip: String,
    pub host_port: String,
}

/// A port declared by a container. `host` is `None` when the port is
/// declared but not published.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortMapping {
    pub container_port: u16,
    pub protocol: String,
    pub host: Option<HostBinding>,
}

impl PortMapping {
    pub fn mapped(container_port: u16, protocol: &str, host_ip: &str, host_port: &str) -> Self {
        Self {
            container_port,
            protocol: protocol.to_string(),
            host: Some(HostBinding {
                host_ip: host_ip.to_string(),
                host_port: host_port.to_string(),
            }),
        }
    }

    pub fn unmapped(container_port: u16, protocol: &str) -> Self {
        Self {
            container_port,
            protocol: protocol.to_string(),
            host: None,
        }
    }
}

impl Display for PortMapping {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.host {
            Some(binding) => write!(
                f,
                "{}/{} ({}:{})",
                self.container_port, self.protocol, binding.host_ip, binding.host_port
            ),
            None => write!(f, "{} (not mapped)", self.container_port),
        }
    }
}

/// Inspected attributes of a single container.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ContainerAttrs {
    pub id: String,
    pub name: String,
    pub state: String,
    /// Primary network address; `None` when unassigned.
    pub ip_address: Option<String>,
    /// Declared ports in declaration order.
    pub ports: Vec<PortMapping>,
    /// Image reference (id) the container was created from.
    pub image: String,
}

impl ContainerAttrs {
    pub fn is_running(&self) -> bool {
        self.state == STATE_RUNNING
    }
}

// The seam between the dashboard and the container engine
#[async_trait]
pub trait ContainerRuntime: Send + Sync {
    /// Enumerate all containers, including stopped ones.
    async fn list_containers(&self) -> Result<Vec<ContainerRecord>>;

    async fn inspect_container(&self, id: &str) -> Result<ContainerAttrs>;

    /// Tags of the image identified by `image`; empty for untagged images.
    async fn image_tags(&self, image: &str) -> Result<Vec<String>>;

    async fn start_container(&self, id: &str) -> Result<()>;

    async fn stop_container(&self, id: &str) -> Result<()>;

    async fn restart_container(&self, id: &str) -> Result<()>;

    async fn ping(&self) -> Result<()>;
}
