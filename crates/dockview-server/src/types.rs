use dockview_common::ContainerRecord;
use dockview_runtime::ContainerSummary;
use serde::{Deserialize, Serialize};

/// One row of the container list, as handed to the view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerView {
    pub id: String,
    pub name: String,
    pub ip: String,
    pub ports: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_running: Option<bool>,
    /// Raw state string from the engine.
    pub status: String,
}

impl ContainerView {
    pub fn new(record: ContainerRecord, summary: &ContainerSummary) -> Self {
        Self {
            id: record.id,
            name: record.name,
            ip: summary.ip().to_string(),
            ports: summary.ports().to_string(),
            image: summary.image().map(str::to_string),
            is_running: summary.is_running(),
            status: record.state,
        }
    }

    pub fn short_id(&self) -> &str {
        self.id.get(..12).unwrap_or(&self.id)
    }
}

/// Form body of the start/stop/restart routes.
#[derive(Debug, Deserialize)]
pub struct ActionForm {
    pub container_id: String,
}
