//! Column aliases for the logical fields the dashboard reads.
//!
//! Order matters: the first alias present on a row wins.

pub const EMPLOYEE_ID: &[&str] = &["Employee ID", "Position ID", "Emp ID", "ID"];
pub const EMPLOYEE_NAME: &[&str] = &["Employee Name", "Name", "Employee", "Full Name"];
pub const LEVEL: &[&str] = &["Level", "Employee Level", "Goal Level"];

pub const GOAL_MIN: &[&str] = &["Min", "Min Hours", "Minimum", "Goal Min"];
pub const GOAL_MAX: &[&str] = &["Max", "Max Hours", "Maximum", "Goal Max"];

pub const HOURS: &[&str] = &["Power Hours", "Hours", "Completed Hours"];
pub const MONTH: &[&str] = &["Month", "Period"];
pub const DATE: &[&str] = &["Date", "Activity Date", "Completed Date"];
pub const ACTIVITY: &[&str] = &["Activity", "Activity Type", "Category"];
pub const STATUS: &[&str] = &["Status", "Completion Status"];

pub const TOKENS: &[&str] = &["Tokens", "Token Amount", "Payout"];
pub const SQUAD: &[&str] = &["Squad", "Squad Name", "Team"];
pub const KPI_VALUE: &[&str] = &["KPI Value", "Value", "Actual"];

/// Status texts that count as done for percent-complete rollups.
pub const COMPLETED_STATUSES: &[&str] = &["complete", "completed", "done", "true"];
