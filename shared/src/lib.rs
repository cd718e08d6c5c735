use serde::{Deserialize, Serialize};

/// A todo item as the task-list api expects it on creation.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct TaskRecord {
    pub name: String,
    #[serde(rename = "isComplete")]
    pub is_complete: bool,
}

impl TaskRecord {
    pub fn new(name: impl Into<String>, is_complete: bool) -> Self {
        Self {
            name: name.into(),
            is_complete,
        }
    }

    /// `Item {n}`, complete for even n
    pub fn numbered(n: u32) -> Self {
        Self::new(format!("Item {n}"), n % 2 == 0)
    }
}
