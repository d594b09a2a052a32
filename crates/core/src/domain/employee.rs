use serde::{Deserialize, Serialize};

/// Opaque user identifier assigned by the chat platform.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EmployeeId(pub String);

impl std::fmt::Display for EmployeeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
    pub id: EmployeeId,
    pub display_name: String,
    pub email: String,
    pub active: bool,
}

impl Employee {
    /// Fallback record used when sync-on-contact could not reach the store.
    pub fn placeholder(id: EmployeeId) -> Self {
        Self { id, display_name: "сотрудник".to_owned(), email: String::new(), active: true }
    }
}
