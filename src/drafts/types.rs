use crate::paper::Section;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A persisted snapshot of the working set.
///
/// `sections` is a snapshot by value: editing the working set after a load
/// never mutates a previously loaded draft.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Draft {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub title: String,
    pub sections: Vec<Section>,
}
