//! Cross-page admin scope: persisted, broadcast, and applied to row sets.
//!
//! Two states, `All` and `Employee(name)`. Selecting a name moves to the
//! scoped state; clearing or selecting the `__ALL__` sentinel moves back.
//! Only admins observe a scope; everyone else always reads `All`.

use std::rc::Rc;

use crate::bus::EventBus;
use crate::error::{DashError, Result};
use crate::indexer::resolve_column;
use crate::session::{Authorizer, Session};
use crate::types::{DashEvent, Row, Scope};

pub struct AdminFilter {
    session: Rc<Session>,
    bus: Rc<EventBus>,
    authorizer: Rc<dyn Authorizer>,
}

impl AdminFilter {
    pub fn new(session: Rc<Session>, bus: Rc<EventBus>, authorizer: Rc<dyn Authorizer>) -> Self {
        Self {
            session,
            bus,
            authorizer,
        }
    }

    pub fn is_authorized(&self) -> bool {
        self.authorizer.is_admin(self.session.identity().as_ref())
    }

    /// Persist `value` and notify every subscriber before returning.
    ///
    /// The name is not checked against the employee list; an unknown name
    /// just matches no rows.
    ///
    /// # Errors
    /// `Unauthorized` for non-admin callers, `Storage` when persisting fails
    /// (no notification is sent in either case).
    pub fn set_scope(&self, value: &str) -> Result<Scope> {
        if !self.is_authorized() {
            return Err(DashError::Unauthorized(
                "admin scope can only be set by admins".to_string(),
            ));
        }
        let scope = Scope::from_stored(value);
        self.session.set_admin_scope(scope.as_stored())?;
        log::info!("admin scope set to {}", scope.as_stored());
        self.bus.publish(&DashEvent::ScopeChanged {
            scope: scope.clone(),
        });
        Ok(scope)
    }

    /// Back to `All`.
    ///
    /// # Errors
    /// As for [`AdminFilter::set_scope`].
    pub fn clear(&self) -> Result<()> {
        self.set_scope(crate::types::ALL_SCOPE).map(|_| ())
    }

    /// Current scope. Unset, unreadable, or unauthorized all read as `All`.
    pub fn scope(&self) -> Scope {
        if !self.is_authorized() {
            return Scope::All;
        }
        self.session
            .admin_scope()
            .map_or(Scope::All, |v| Scope::from_stored(&v))
    }

    /// Narrow `rows` to the current scope.
    pub fn apply(&self, rows: &[Row], candidate_columns: &[&str]) -> Vec<Row> {
        apply_scope(&self.scope(), rows, candidate_columns)
    }
}

/// Keep rows whose scope column equals the scoped name.
///
/// The scope column is the first of `candidate_columns` present on the row
/// schema. `All` and a schema with none of the candidates pass rows through.
pub fn apply_scope(scope: &Scope, rows: &[Row], candidate_columns: &[&str]) -> Vec<Row> {
    let Scope::Employee(name) = scope else {
        return rows.to_vec();
    };
    let Some(column) = resolve_column(rows, candidate_columns) else {
        return rows.to_vec();
    };
    let name = name.trim();
    rows.iter()
        .filter(|row| row.text(column).trim() == name)
        .cloned()
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::session::{Allowlist, Identity, MemoryStore};
    use std::cell::RefCell;

    fn filter(admin: bool) -> (AdminFilter, Rc<EventBus>) {
        let session = Rc::new(Session::new(Box::new(MemoryStore::new())));
        session
            .set_identity(&Identity {
                employee_id: "A1".to_string(),
                display_name: "Admin".to_string(),
            })
            .unwrap();
        let allow = if admin { vec!["A1"] } else { vec![] };
        let bus = Rc::new(EventBus::new());
        let filter = AdminFilter::new(session, Rc::clone(&bus), Rc::new(Allowlist::new(allow)));
        (filter, bus)
    }

    #[test]
    fn test_set_scope_notifies_with_new_value() {
        let (filter, bus) = filter(true);
        let seen = Rc::new(RefCell::new(Vec::new()));
        {
            let seen = Rc::clone(&seen);
            bus.subscribe_scope(move |s| seen.borrow_mut().push(s.clone()));
        }
        filter.set_scope("Jane Doe").unwrap();
        filter.clear().unwrap();
        assert_eq!(
            *seen.borrow(),
            vec![Scope::Employee("Jane Doe".to_string()), Scope::All]
        );
        assert_eq!(filter.scope(), Scope::All);
    }

    #[test]
    fn test_unauthorized_reads_all_and_cannot_write() {
        let (filter, _bus) = filter(false);
        assert!(matches!(
            filter.set_scope("Jane Doe"),
            Err(DashError::Unauthorized(_))
        ));
        filter.session.set_admin_scope("Jane Doe").unwrap();
        assert_eq!(filter.scope(), Scope::All);
    }

    #[test]
    fn test_missing_scope_column_passes_rows_through() {
        let rows = vec![Row::new().with("Squad", "Blue")];
        let out = apply_scope(
            &Scope::Employee("Jane Doe".to_string()),
            &rows,
            &["Employee Name"],
        );
        assert_eq!(out, rows);
    }
}
