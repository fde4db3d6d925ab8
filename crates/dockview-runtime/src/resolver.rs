//! Derives the per-container summary shown on the dashboard.
//!
//! Resolution never fails outright: when the engine errors while attributes are
//! being read, the result is a [`ContainerSummary::Degraded`] carrying fixed
//! placeholder values instead of an error.

use dockview_common::{ContainerAttrs, ContainerRuntime, PortMapping};
use serde::Serialize;
use tracing::{instrument, warn};

/// Address shown when the container has no network address assigned.
pub const UNASSIGNED_ADDRESS: &str = "unknown";

/// Image shown when the image carries no tags.
pub const UNTAGGED_IMAGE: &str = "Unknown";

/// Address shown when resolution hit an engine error.
pub const DEGRADED_ADDRESS: &str = "Unknown";

/// Port text shown when resolution hit an engine error.
pub const DEGRADED_PORTS: &str = "No port";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedInfo {
    pub ip: String,
    pub ports: String,
    pub image: String,
    pub is_running: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DegradedInfo {
    /// Engine error that interrupted resolution.
    pub cause: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "resolution", rename_all = "lowercase")]
pub enum ContainerSummary {
    Resolved(ResolvedInfo),
    Degraded(DegradedInfo),
}

impl ContainerSummary {
    pub fn ip(&self) -> &str {
        match self {
            ContainerSummary::Resolved(info) => &info.ip,
            ContainerSummary::Degraded(_) => DEGRADED_ADDRESS,
        }
    }

    pub fn ports(&self) -> &str {
        match self {
            ContainerSummary::Resolved(info) => &info.ports,
            ContainerSummary::Degraded(_) => DEGRADED_PORTS,
        }
    }

    pub fn image(&self) -> Option<&str> {
        match self {
            ContainerSummary::Resolved(info) => Some(&info.image),
            ContainerSummary::Degraded(_) => None,
        }
    }

    pub fn is_running(&self) -> Option<bool> {
        match self {
            ContainerSummary::Resolved(info) => Some(info.is_running),
            ContainerSummary::Degraded(_) => None,
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, ContainerSummary::Degraded(_))
    }
}

/// Join port entries with `", "` in declaration order.
pub fn format_ports(ports: &[PortMapping]) -> String {
    ports
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// First tag of the image, or [`UNTAGGED_IMAGE`].
pub fn image_label(tags: &[String]) -> String {
    tags.first()
        .cloned()
        .unwrap_or_else(|| UNTAGGED_IMAGE.to_string())
}

/// Inspect `id` and derive its summary.
#[instrument(skip(runtime))]
pub async fn resolve(runtime: &dyn ContainerRuntime, id: &str) -> ContainerSummary {
    match runtime.inspect_container(id).await {
        Ok(attrs) => resolve_attrs(runtime, &attrs).await,
        Err(e) => degraded(id, e.to_string()),
    }
}

/// Derive a summary from already-inspected attributes. Only the image lookup
/// touches the engine here.
pub async fn resolve_attrs(runtime: &dyn ContainerRuntime, attrs: &ContainerAttrs) -> ContainerSummary {
    let tags = match runtime.image_tags(&attrs.image).await {
        Ok(tags) => tags,
        Err(e) => return degraded(&attrs.id, e.to_string()),
    };

    ContainerSummary::Resolved(ResolvedInfo {
        ip: attrs
            .ip_address
            .clone()
            .unwrap_or_else(|| UNASSIGNED_ADDRESS.to_string()),
        ports: format_ports(&attrs.ports),
        image: image_label(&tags),
        is_running: attrs.is_running(),
    })
}

fn degraded(id: &str, cause: String) -> ContainerSummary {
    warn!(container_id = %id, error = %cause, "Container info unavailable, using placeholders");
    ContainerSummary::Degraded(DegradedInfo { cause })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{MockContainer, MockRuntime};

    #[test]
    fn test_no_ports_is_empty_string() {
        assert_eq!(format_ports(&[]), "");
    }

    #[test]
    fn test_single_mapped_port() {
        let ports = vec![PortMapping::mapped(80, "tcp", "0.0.0.0", "8080")];
        assert_eq!(format_ports(&ports), "80/tcp (0.0.0.0:8080)");
    }

    #[test]
    fn test_single_unmapped_port() {
        let ports = vec![PortMapping::unmapped(6379, "tcp")];
        assert_eq!(format_ports(&ports), "6379 (not mapped)");
    }

    #[test]
    fn test_multiple_ports_keep_order_without_trailing_separator() {
        let ports = vec![
            PortMapping::mapped(80, "tcp", "0.0.0.0", "8080"),
            PortMapping::unmapped(443, "tcp"),
            PortMapping::mapped(53, "udp", "127.0.0.1", "5353"),
        ];
        let text = format_ports(&ports);
        assert_eq!(
            text,
            "80/tcp (0.0.0.0:8080), 443 (not mapped), 53/udp (127.0.0.1:5353)"
        );
        assert!(!text.ends_with(", "));
    }

    #[test]
    fn test_image_label() {
        let tags = vec!["myimage:latest".to_string(), "myimage:1.0".to_string()];
        assert_eq!(image_label(&tags), "myimage:latest");
        assert_eq!(image_label(&[]), "Unknown");
    }

    #[tokio::test]
    async fn test_resolve_running_container() {
        let runtime = MockRuntime::new();
        runtime
            .add(
                MockContainer::new("c1", "web", "running")
                    .with_ip("172.17.0.2")
                    .with_port(PortMapping::mapped(80, "tcp", "0.0.0.0", "8080"))
                    .with_tags(&["nginx:latest", "nginx:1.25"]),
            )
            .await;

        let summary = resolve(&runtime, "c1").await;

        assert!(!summary.is_degraded());
        assert_eq!(summary.ip(), "172.17.0.2");
        assert_eq!(summary.ports(), "80/tcp (0.0.0.0:8080)");
        assert_eq!(summary.image(), Some("nginx:latest"));
        assert_eq!(summary.is_running(), Some(true));
    }

    #[tokio::test]
    async fn test_resolve_stopped_untagged_container_without_ports() {
        let runtime = MockRuntime::new();
        runtime.add(MockContainer::new("c2", "job", "exited")).await;

        let summary = resolve(&runtime, "c2").await;

        assert_eq!(summary.ip(), UNASSIGNED_ADDRESS);
        assert_eq!(summary.ports(), "");
        assert_eq!(summary.image(), Some("Unknown"));
        assert_eq!(summary.is_running(), Some(false));
    }

    #[tokio::test]
    async fn test_non_running_states_are_not_running() {
        let runtime = MockRuntime::new();
        for (id, state) in [("a", "exited"), ("b", "paused"), ("c", "Running")] {
            runtime.add(MockContainer::new(id, id, state)).await;
            assert_eq!(resolve(&runtime, id).await.is_running(), Some(false), "{state}");
        }
    }

    #[tokio::test]
    async fn test_inspect_fault_degrades() {
        let runtime = MockRuntime::new();
        runtime
            .add(MockContainer::new("c3", "flaky", "running").with_ip("10.0.0.9"))
            .await;
        runtime.fail_inspect("c3").await;

        let summary = resolve(&runtime, "c3").await;

        assert!(summary.is_degraded());
        assert_eq!(summary.ip(), "Unknown");
        assert_eq!(summary.ports(), "No port");
        assert_eq!(summary.image(), None);
        assert_eq!(summary.is_running(), None);
    }

    #[tokio::test]
    async fn test_image_fault_degrades_whole_summary() {
        let runtime = MockRuntime::new();
        runtime
            .add(
                MockContainer::new("c4", "api", "running")
                    .with_port(PortMapping::unmapped(3000, "tcp")),
            )
            .await;
        runtime.fail_image_lookup("c4").await;

        let summary = resolve(&runtime, "c4").await;

        assert!(summary.is_degraded());
        assert_eq!(summary.ports(), "No port");
        assert_eq!(summary.is_running(), None);
    }
}
