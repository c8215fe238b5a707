//! Column mappings for the entity tables

use serde::{Deserialize, Serialize};

/// One table column: the (possibly dotted) field key, its header label,
/// and whether it is shown
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnMapping {
    pub key: String,
    pub label: String,
    pub visible: bool,
}

impl ColumnMapping {
    pub fn new(key: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
            visible: true,
        }
    }

    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }
}

pub fn user_columns() -> Vec<ColumnMapping> {
    vec![
        ColumnMapping::new("username", "Username"),
        ColumnMapping::new("fullName", "Full Name"),
        ColumnMapping::new("email", "Email"),
        ColumnMapping::new("role", "Role"),
        ColumnMapping::new("active", "Active"),
    ]
}

pub fn customer_columns() -> Vec<ColumnMapping> {
    vec![
        ColumnMapping::new("name", "Name"),
        ColumnMapping::new("identifierNo", "Identifier No"),
        ColumnMapping::new("type", "Type"),
        ColumnMapping::new("email", "Email"),
        ColumnMapping::new("phone", "Phone"),
        ColumnMapping::new("address", "Address").hidden(),
        ColumnMapping::new("active", "Active"),
    ]
}

pub fn ticket_columns() -> Vec<ColumnMapping> {
    vec![
        ColumnMapping::new("code", "Code"),
        ColumnMapping::new("title", "Title"),
        ColumnMapping::new("status", "Status"),
        ColumnMapping::new("assignee.username", "Assignee"),
        ColumnMapping::new("reporter.username", "Reporter"),
        ColumnMapping::new("requestBy.name", "Requested By"),
        ColumnMapping::new("createdAtDate", "Created"),
        ColumnMapping::new("dueDate", "Due Date").hidden(),
    ]
}
