use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A dataset a tab can draw facts from. Only `id` is interpreted here.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RawDataSource {
    pub id: String,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl RawDataSource {
    pub fn display_name(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.id)
    }
}

pub fn find_data_source<'a>(sources: &'a [RawDataSource], id: &str) -> Option<&'a RawDataSource> {
    sources.iter().find(|s| s.id == id)
}
