//! Employee → level → goal band join.
//!
//! Resolution never fails: a missing employee, level, goal row or numeric
//! field falls back to the configured floor so the dashboard can always draw
//! a band.

use futures_util::future::join;
use std::rc::Rc;

use crate::cache::SheetCache;
use crate::columns;
use crate::indexer::{first_non_empty, normalize_key};
use crate::types::{GoalBand, Row, Value};

pub const EMPLOYEES_SHEET: &str = "employees";
pub const GOALS_SHEET: &str = "goals";

pub struct GoalResolver {
    cache: Rc<SheetCache>,
    employees_key: String,
    goals_key: String,
    floor: f64,
}

impl GoalResolver {
    pub fn new(cache: Rc<SheetCache>, floor: f64) -> Self {
        Self {
            cache,
            employees_key: EMPLOYEES_SHEET.to_string(),
            goals_key: GOALS_SHEET.to_string(),
            floor,
        }
    }

    /// Use different cache keys for the employee and goal sheets.
    #[must_use]
    pub fn with_sheets(mut self, employees_key: &str, goals_key: &str) -> Self {
        self.employees_key = employees_key.to_string();
        self.goals_key = goals_key.to_string();
        self
    }

    pub fn floor(&self) -> f64 {
        self.floor
    }

    /// Goal band for an employee id.
    pub async fn resolve(&self, employee_id: &str) -> GoalBand {
        let (employees, goals) = join(
            self.cache.get(&self.employees_key, false),
            self.cache.get(&self.goals_key, false),
        )
        .await;

        let employees = match employees {
            Ok(rows) => rows,
            Err(e) => {
                log::warn!("goal band for {employee_id}: employee sheet unavailable: {e}");
                return self.floor_band("");
            }
        };
        let Some(level) = employee_level(&employees, employee_id) else {
            log::warn!("goal band for {employee_id}: no employee row or level, using floor");
            return self.floor_band("");
        };
        match goals {
            Ok(goals) => band_for_level(&goals, &level, self.floor),
            Err(e) => {
                log::warn!("goal band for {employee_id}: goal sheet unavailable: {e}");
                self.floor_band(&level)
            }
        }
    }

    /// Goal band for a level, skipping the employee join.
    pub async fn resolve_for_level(&self, level: &str) -> GoalBand {
        match self.cache.get(&self.goals_key, false).await {
            Ok(goals) => band_for_level(&goals, level, self.floor),
            Err(e) => {
                log::warn!("goal band for level {level}: goal sheet unavailable: {e}");
                self.floor_band(level)
            }
        }
    }

    fn floor_band(&self, level: &str) -> GoalBand {
        GoalBand::new(level, self.floor, self.floor)
    }
}

fn key_matches(row: &Row, aliases: &[&str], wanted: &str) -> bool {
    first_non_empty(row, aliases).is_some_and(|v| normalize_key(v) == wanted)
}

/// Level of the employee whose id matches (trimmed, case-insensitive).
pub fn employee_level(employees: &[Row], employee_id: &str) -> Option<String> {
    let wanted = normalize_key(&Value::from(employee_id));
    employees
        .iter()
        .find(|row| key_matches(row, columns::EMPLOYEE_ID, &wanted))
        .and_then(|row| first_non_empty(row, columns::LEVEL))
        .map(|v| v.as_text().trim().to_string())
}

/// Band for `level` from the goal rows. A missing max defaults to min, a
/// missing min to `floor`, and max is clamped to at least min.
pub fn band_for_level(goals: &[Row], level: &str, floor: f64) -> GoalBand {
    let wanted = normalize_key(&Value::from(level));
    let Some(row) = goals.iter().find(|row| key_matches(row, columns::LEVEL, &wanted)) else {
        log::warn!("no goal row for level {level}, using floor");
        return GoalBand::new(level, floor, floor);
    };

    let min = first_non_empty(row, columns::GOAL_MIN)
        .and_then(Value::as_number)
        .unwrap_or(floor);
    let max = first_non_empty(row, columns::GOAL_MAX)
        .and_then(Value::as_number)
        .unwrap_or(min);
    GoalBand::new(level, min, max)
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;

    fn goals() -> Vec<Row> {
        vec![
            Row::new().with("Level", "LVL1").with("Min", 4.0).with("Max", 6.0),
            Row::new().with("Level", "LVL2").with("Min", 8.0).with("Max", "n/a"),
            Row::new().with("Level", "LVL3").with("Max", 20.0),
            Row::new().with("Level", "LVL4").with("Min", 15.0).with("Max", 10.0),
        ]
    }

    #[test]
    fn test_non_numeric_max_defaults_to_min() {
        let band = band_for_level(&goals(), "lvl2 ", 1.0);
        assert_eq!((band.min, band.max), (8.0, 8.0));
    }

    #[test]
    fn test_missing_min_defaults_to_floor() {
        let band = band_for_level(&goals(), "LVL3", 2.0);
        assert_eq!((band.min, band.max), (2.0, 20.0));
    }

    #[test]
    fn test_inverted_band_is_clamped() {
        let band = band_for_level(&goals(), "LVL4", 0.0);
        assert_eq!((band.min, band.max), (15.0, 15.0));
    }

    #[test]
    fn test_unknown_level_is_floor_band() {
        let band = band_for_level(&goals(), "LVL9", 3.0);
        assert_eq!(band, GoalBand::new("LVL9", 3.0, 3.0));
    }

    #[test]
    fn test_employee_level_uses_id_aliases() {
        let employees = vec![
            Row::new().with("Position ID", " e1 ").with("Employee Level", "LVL2"),
            Row::new().with("Position ID", "E2"),
        ];
        assert_eq!(employee_level(&employees, "E1"), Some("LVL2".to_string()));
        assert_eq!(employee_level(&employees, "E2"), None);
        assert_eq!(employee_level(&employees, "E3"), None);
    }
}
