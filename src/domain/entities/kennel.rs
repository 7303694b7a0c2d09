use serde::{Deserialize, Serialize};

pub const DEFAULT_BUILDING: &str = "General";
pub const DEFAULT_FLOOR: &str = "Main Floor";

/// A finite-capacity physical resource (run, suite, cabin).
///
/// Occupancy is never stored on the kennel; it is derived from segments by
/// the occupancy calculator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Kennel {
    pub id: String,
    pub name: String,
    pub capacity: u32,
    pub building: String,
    pub floor: String,
    /// `false` means maintenance: no new placements, existing ones stay valid.
    pub is_active: bool,
    /// Set when the kennel was soft-deleted while historical segments still
    /// reference it.
    pub archived_at: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl Kennel {
    pub fn new(
        name: String,
        capacity: u32,
        building: Option<String>,
        floor: Option<String>,
    ) -> Self {
        let now = chrono::Utc::now().to_rfc3339();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name,
            capacity,
            building: location_or_default(building, DEFAULT_BUILDING),
            floor: location_or_default(floor, DEFAULT_FLOOR),
            is_active: true,
            archived_at: None,
            created_at: now.clone(),
            updated_at: now,
        }
    }

    pub fn is_archived(&self) -> bool {
        self.archived_at.is_some()
    }

    /// Whether the kennel may receive new assignments or moves.
    pub fn accepts_placements(&self) -> bool {
        self.is_active && !self.is_archived()
    }
}

/// Blank or missing location labels fall back to the facility defaults.
pub fn location_or_default(value: Option<String>, default: &str) -> String {
    match value {
        Some(v) if !v.trim().is_empty() => v.trim().to_string(),
        _ => default.to_string(),
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateKennelRequest {
    pub name: String,
    pub capacity: u32,
    pub building: Option<String>,
    pub floor: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateKennelRequest {
    pub name: Option<String>,
    pub capacity: Option<u32>,
    pub building: Option<String>,
    pub floor: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetKennelActiveRequest {
    pub is_active: bool,
}

/// What to do with segments that still reference a kennel being deleted.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "strategy")]
pub enum CascadeStrategy {
    /// Refuse while any segment, past or future, references the kennel.
    #[default]
    Reject,
    /// Refuse while current or future active segments exist; archive the
    /// kennel if only historical segments reference it.
    KeepHistorical,
    /// Move current and future active segments to `target_kennel_id`, then
    /// behave like `KeepHistorical`.
    Reassign { target_kennel_id: String },
}

/// Outcome of a kennel deletion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase", tag = "outcome")]
pub enum KennelRemoval {
    #[serde(rename_all = "camelCase")]
    Deleted { kennel_id: String },
    #[serde(rename_all = "camelCase")]
    Archived {
        kennel_id: String,
        historical_segments: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_location_falls_back_to_defaults() {
        let kennel = Kennel::new("Run 1".to_string(), 2, None, Some("  ".to_string()));
        assert_eq!(kennel.building, "General");
        assert_eq!(kennel.floor, "Main Floor");
        assert!(kennel.accepts_placements());
    }

    #[test]
    fn location_labels_are_trimmed() {
        let kennel = Kennel::new(
            "Suite".to_string(),
            1,
            Some(" North ".to_string()),
            Some("Upper".to_string()),
        );
        assert_eq!(kennel.building, "North");
        assert_eq!(kennel.floor, "Upper");
    }

    #[test]
    fn cascade_strategy_defaults_to_reject() {
        assert_eq!(CascadeStrategy::default(), CascadeStrategy::Reject);
    }

    #[test]
    fn removal_serializes_with_outcome_tag() {
        let removal = KennelRemoval::Archived {
            kennel_id: "k1".to_string(),
            historical_segments: 3,
        };
        let value = serde_json::to_value(&removal).unwrap();
        assert_eq!(
            value,
            serde_json::json!({ "outcome": "archived", "kennelId": "k1", "historicalSegments": 3 })
        );
    }
}
