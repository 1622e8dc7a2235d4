//! Effective local scope of an activity.
//!
//! A flat `scopeValue` wins when it is positive. Otherwise a grid layout,
//! if present, defines scope as total cells times the per-cell value.
//! Everything else resolves to zero.
//!
//! Resolve once per activity and reuse the value for every rollup level.

use crate::core::{Activity, GridConfig};

const DEFAULT_PER_CELL_VALUE: f64 = 1.0;

/// Local scope for `activity`.
///
/// ```rust
/// use siteprogress::core::{Activity, FlexibleColumn, GridConfig};
/// use siteprogress::scope::resolve_scope;
///
/// let activity = Activity {
///     grid_config: Some(GridConfig {
///         flexible_columns: vec![
///             FlexibleColumn { column: "A".into(), rows: 5 },
///             FlexibleColumn { column: "B".into(), rows: 3 },
///         ],
///         per_cell_value: Some(2.0),
///     }),
///     ..Default::default()
/// };
/// assert_eq!(resolve_scope(&activity), 16.0);
/// ```
pub fn resolve_scope(activity: &Activity) -> f64 {
    match activity.scope_value {
        Some(value) if value > 0.0 => value,
        _ => activity.grid_config.as_ref().map_or(0.0, grid_scope),
    }
}

fn grid_scope(grid: &GridConfig) -> f64 {
    if grid.flexible_columns.is_empty() {
        return 0.0;
    }
    let total_cells: u64 = grid
        .flexible_columns
        .iter()
        .map(|col| u64::from(col.rows))
        .sum();
    let per_cell = grid.per_cell_value.unwrap_or(DEFAULT_PER_CELL_VALUE);
    total_cells as f64 * per_cell
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::FlexibleColumn;

    fn grid(rows: &[u32], per_cell: Option<f64>) -> GridConfig {
        GridConfig {
            flexible_columns: rows
                .iter()
                .enumerate()
                .map(|(i, rows)| FlexibleColumn {
                    column: format!("C{}", i),
                    rows: *rows,
                })
                .collect(),
            per_cell_value: per_cell,
        }
    }

    #[test]
    fn positive_flat_scope_is_returned_unchanged() {
        let activity = Activity {
            scope_value: Some(42.5),
            grid_config: Some(grid(&[10], Some(10.0))),
            ..Default::default()
        };
        assert_eq!(resolve_scope(&activity), 42.5);
    }

    #[test]
    fn zero_flat_scope_uses_grid() {
        let activity = Activity {
            scope_value: Some(0.0),
            grid_config: Some(grid(&[5, 3], Some(2.0))),
            ..Default::default()
        };
        assert_eq!(resolve_scope(&activity), 16.0);
    }

    #[test]
    fn per_cell_value_defaults_to_one() {
        let activity = Activity {
            grid_config: Some(grid(&[4, 4, 1], None)),
            ..Default::default()
        };
        assert_eq!(resolve_scope(&activity), 9.0);
    }

    #[test]
    fn empty_grid_resolves_to_zero() {
        let activity = Activity {
            grid_config: Some(grid(&[], Some(3.0))),
            ..Default::default()
        };
        assert_eq!(resolve_scope(&activity), 0.0);
    }

    #[test]
    fn nothing_recorded_resolves_to_zero() {
        assert_eq!(resolve_scope(&Activity::default()), 0.0);
    }
}
