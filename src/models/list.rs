use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{double_option, new_id, now, Item};

/// A to-do list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({
    "id": "dbd6f8ca-e6bc-4d20-9504-d9755ee310e1",
    "title": "Things to do",
    "created_at": "2018-04-23T00:00:00Z"
}))]
pub struct List {
    /// Server-generated id.
    pub id: String,
    /// The title of the list.
    pub title: String,
    /// Time this list was created.
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl List {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            id: new_id(),
            title: title.into(),
            created_at: now(),
            completed_at: None,
        }
    }

    pub fn with_completed_at(mut self, completed_at: Option<DateTime<Utc>>) -> Self {
        self.completed_at = completed_at;
        self
    }

    /// Overwrites every field present in the patch.
    pub fn apply(&mut self, patch: ListPatch) {
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(created_at) = patch.created_at {
            self.created_at = created_at;
        }
        if let Some(completed_at) = patch.completed_at {
            self.completed_at = completed_at;
        }
    }
}

/// A list joined with all items referencing it.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ListWithItems {
    #[serde(flatten)]
    pub list: List,
    pub items: Vec<Item>,
}

/// Body of a list creation request.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct NewList {
    pub title: Option<String>,
    pub completed_at: Option<DateTime<Utc>>,
}

/// Body of a list update request. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct ListPatch {
    pub title: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub completed_at: Option<Option<DateTime<Utc>>>,
}
