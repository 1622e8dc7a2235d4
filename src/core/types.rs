//! Record types for one site snapshot.
//!
//! Wire records deserialise straight from the document store's JSON shape
//! (camelCase fields). `ActivityRecord` is the only record that needs
//! normalising before the engine sees it; everything else is used as-is.

use serde::{Deserialize, Deserializer, Serialize};

/// Treat an explicit JSON `null` like an absent field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Level of a menu-taxonomy record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaxonomyLevel {
    Main,
    Sub,
}

/// One menu-taxonomy record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxonomyNode {
    pub id: String,
    pub level: TaxonomyLevel,
    pub name: String,
    /// Only meaningful on `Sub` nodes.
    #[serde(default)]
    pub parent_main_id: Option<String>,
    #[serde(default)]
    pub key: Option<String>,
}

impl TaxonomyNode {
    pub fn main(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            level: TaxonomyLevel::Main,
            name: name.into(),
            parent_main_id: None,
            key: None,
        }
    }

    pub fn sub(
        id: impl Into<String>,
        name: impl Into<String>,
        parent_main_id: Option<&str>,
    ) -> Self {
        Self {
            id: id.into(),
            level: TaxonomyLevel::Sub,
            name: name.into(),
            parent_main_id: parent_main_id.map(str::to_string),
            key: None,
        }
    }
}

/// One unit of assigned work.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    #[serde(default)]
    pub pv_area: Option<String>,
    #[serde(default)]
    pub block_area: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub sub_category_key: String,
}

impl Task {
    pub fn new(id: impl Into<String>, sub_category_key: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            sub_category_key: sub_category_key.into(),
            ..Default::default()
        }
    }

    /// Location label shown next to a task's progress.
    ///
    /// ```rust
    /// use siteprogress::core::Task;
    ///
    /// let mut task = Task::new("a1b2c3d4e5", "mv-cable");
    /// assert_eq!(task.display_name(), "Task a1b2c3");
    ///
    /// task.pv_area = Some("PV-3".into());
    /// task.block_area = Some("Block B".into());
    /// assert_eq!(task.display_name(), "PV-3 / Block B");
    /// ```
    pub fn display_name(&self) -> String {
        let pv = non_blank(self.pv_area.as_deref());
        let block = non_blank(self.block_area.as_deref());
        match (pv, block) {
            (Some(pv), Some(block)) => format!("{} / {}", pv, block),
            (Some(only), None) | (None, Some(only)) => only.to_string(),
            (None, None) => {
                let short: String = self.id.chars().take(6).collect();
                format!("Task {}", short)
            }
        }
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// A single grid column: `rows` cells of work.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlexibleColumn {
    pub column: String,
    pub rows: u32,
}

/// Grid layout used to compute scope when no flat scope is recorded.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridConfig {
    #[serde(default, deserialize_with = "null_as_default")]
    pub flexible_columns: Vec<FlexibleColumn>,
    #[serde(default)]
    pub per_cell_value: Option<f64>,
}

/// An activity exactly as stored.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityRecord {
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default)]
    pub task_id: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub sub_category_key: String,
    #[serde(default)]
    pub scope_value: Option<f64>,
    #[serde(default)]
    pub grid_config: Option<GridConfig>,
    #[serde(default)]
    pub qc_value: Option<f64>,
    #[serde(default)]
    pub cumulative_completed: Option<f64>,
    #[serde(default)]
    pub completed_today: Option<f64>,
    #[serde(default)]
    pub supervisor_input: Option<f64>,
    #[serde(default)]
    pub assignee_id: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_handoff: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub handoff_activity: bool,
    #[serde(default)]
    pub boq_quantity: Option<f64>,
    #[serde(default)]
    pub boq_unit: Option<String>,
}

/// The unit of measurement the engine works on.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    pub name: String,
    pub task_id: Option<String>,
    pub sub_category_key: String,
    pub scope_value: Option<f64>,
    pub grid_config: Option<GridConfig>,
    /// Verified measurement.
    pub qc_value: f64,
    /// Unverified measurement.
    pub supervisor_input_value: f64,
    pub assignee_id: Option<String>,
    pub is_handoff: bool,
    pub boq_quantity: Option<f64>,
    pub boq_unit: Option<String>,
}

impl Activity {
    pub fn new(name: impl Into<String>, task_id: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            task_id: Some(task_id.into()),
            ..Default::default()
        }
    }

    /// Task id, treating an empty string as absent.
    pub fn task_ref(&self) -> Option<&str> {
        non_blank(self.task_id.as_deref())
    }

    /// Assignee id, treating an empty string as absent.
    pub fn assignee_ref(&self) -> Option<&str> {
        non_blank(self.assignee_id.as_deref())
    }

    /// Contractual quantity when it is positive.
    pub fn boq_scope(&self) -> Option<f64> {
        self.boq_quantity.filter(|q| *q > 0.0)
    }

    /// True when any numeric field is NaN or infinite.
    ///
    /// Negative values are not malformed: a non-positive scope closes the
    /// local track, a non-positive BOQ quantity means no contractual scope,
    /// and negative measurements accumulate and are clamped in percentages.
    pub fn is_malformed(&self) -> bool {
        let per_cell = self.grid_config.as_ref().and_then(|g| g.per_cell_value);
        [
            self.scope_value,
            Some(self.qc_value),
            Some(self.supervisor_input_value),
            self.boq_quantity,
            per_cell,
        ]
        .into_iter()
        .flatten()
        .any(|v| !v.is_finite())
    }
}

impl From<ActivityRecord> for Activity {
    fn from(record: ActivityRecord) -> Self {
        let supervisor_input_value = record
            .cumulative_completed
            .or(record.completed_today)
            .or(record.supervisor_input)
            .unwrap_or(0.0);

        Self {
            name: record.name,
            task_id: record.task_id,
            sub_category_key: record.sub_category_key,
            scope_value: record.scope_value,
            grid_config: record.grid_config,
            qc_value: record.qc_value.unwrap_or(0.0),
            supervisor_input_value,
            assignee_id: record.assignee_id,
            is_handoff: record.is_handoff || record.handoff_activity,
            boq_quantity: record.boq_quantity,
            boq_unit: record.boq_unit,
        }
    }
}

/// A potential assignee.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    #[serde(default)]
    pub external_id: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub role: String,
}
