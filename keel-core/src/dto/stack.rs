//! Stack DTOs

use serde::{Deserialize, Serialize};

use crate::domain::stack::Stack;

/// Request to create a new stack
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateStack {
    pub name: String,
    pub code: String,
    #[serde(default)]
    pub cwd: Option<String>,
    #[serde(default)]
    pub notes: String,
}

/// Partial update of a stack; absent fields are left untouched
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateStack {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cwd: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl UpdateStack {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.code.is_none() && self.cwd.is_none() && self.notes.is_none()
    }

    /// Apply the present fields onto an existing stack
    pub fn apply_to(self, stack: &mut Stack) {
        if let Some(name) = self.name {
            stack.name = name;
        }
        if let Some(code) = self.code {
            stack.code = code;
        }
        if let Some(cwd) = self.cwd {
            stack.cwd = Some(cwd);
        }
        if let Some(notes) = self.notes {
            stack.notes = notes;
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StackBody {
    pub stack: Stack,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StackListBody {
    pub stacks: Vec<Stack>,
}
