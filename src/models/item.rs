use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{double_option, new_id, now};

/// A to-do item. Always belongs to a list through `list_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({
    "id": "c80d3a88-932b-4526-bd51-8869b795aa97",
    "list_id": "dbd6f8ca-e6bc-4d20-9504-d9755ee310e1",
    "label": "Finish this to-do project",
    "created_at": "2020-10-25T15:52:33Z"
}))]
pub struct Item {
    /// Server-generated id.
    pub id: String,
    /// Id of the list this item belongs to.
    pub list_id: String,
    /// The text of the to-do.
    pub label: String,
    /// Time this item was created.
    pub created_at: DateTime<Utc>,
    /// Time this item was marked as completed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl Item {
    pub fn new(list_id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: new_id(),
            list_id: list_id.into(),
            label: label.into(),
            created_at: now(),
            completed_at: None,
        }
    }

    pub fn with_completed_at(mut self, completed_at: Option<DateTime<Utc>>) -> Self {
        self.completed_at = completed_at;
        self
    }

    /// Overwrites every field present in the patch.
    pub fn apply(&mut self, patch: ItemPatch) {
        if let Some(list_id) = patch.list_id {
            self.list_id = list_id;
        }
        if let Some(label) = patch.label {
            self.label = label;
        }
        if let Some(created_at) = patch.created_at {
            self.created_at = created_at;
        }
        if let Some(completed_at) = patch.completed_at {
            self.completed_at = completed_at;
        }
    }
}

/// Body of an item creation request.
///
/// `id` and `created_at` are always generated server-side, so they are not
/// accepted here.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct NewItem {
    pub list_id: Option<String>,
    pub label: Option<String>,
    pub completed_at: Option<DateTime<Utc>>,
}

/// Body of an item update request. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct ItemPatch {
    pub list_id: Option<String>,
    pub label: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    /// `null` clears the completion time.
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub completed_at: Option<Option<DateTime<Utc>>>,
}
