use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

impl Task {
    pub fn new(description: impl Into<String>, created_at: String) -> Self {
        Self {
            description: description.into(),
            created_at: Some(created_at),
        }
    }

    pub fn bare(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            created_at: None,
        }
    }

    pub fn label(&self) -> String {
        match &self.created_at {
            Some(stamp) => format!("{} ({stamp})", self.description),
            None => self.description.clone(),
        }
    }
}
