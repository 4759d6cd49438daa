//! The service object a page builds once at session start.
//!
//! `Dashboard` owns the cache, event bus, session, admin filter, goal
//! resolver and writer, and is handed by reference to every view. Logout
//! clears the session keys and every cached sheet together.

use std::rc::Rc;

use crate::admin_filter::AdminFilter;
use crate::bus::{EventBus, SubscriptionId};
use crate::cache::{Rows, SheetCache};
use crate::client::{SheetSource, Sleeper};
use crate::config::DashboardConfig;
use crate::dependent_filter::DependentFilter;
use crate::error::Result;
use crate::goals::GoalResolver;
use crate::pipeline::{self, ViewQuery};
use crate::session::{Allowlist, Authorizer, Identity, Session, SessionStore};
use crate::types::{DashEvent, GoalBand, Row, Scope};
use crate::writer::{NewRecord, RowWriter, WriteOutcome};

pub struct Dashboard {
    config: DashboardConfig,
    cache: Rc<SheetCache>,
    bus: Rc<EventBus>,
    session: Rc<Session>,
    admin: AdminFilter,
    goals: GoalResolver,
    writer: RowWriter,
}

impl Dashboard {
    /// Wire the core together. Admin rights come from `config.admins`.
    ///
    /// # Errors
    /// `Config` when the configuration does not validate.
    pub fn new(
        config: DashboardConfig,
        source: Rc<dyn SheetSource>,
        store: Box<dyn SessionStore>,
        sleeper: Rc<dyn Sleeper>,
    ) -> Result<Self> {
        let authorizer = Rc::new(Allowlist::new(&config.admins));
        Self::with_authorizer(config, source, store, sleeper, authorizer)
    }

    /// Like [`Dashboard::new`] with an external admin check.
    ///
    /// # Errors
    /// `Config` when the configuration does not validate.
    pub fn with_authorizer(
        config: DashboardConfig,
        source: Rc<dyn SheetSource>,
        store: Box<dyn SessionStore>,
        sleeper: Rc<dyn Sleeper>,
        authorizer: Rc<dyn Authorizer>,
    ) -> Result<Self> {
        config.validate()?;

        let bus = Rc::new(EventBus::new());
        let cache = Rc::new(
            SheetCache::new(Rc::clone(&source))
                .with_sheet_ids(config.sheets.clone())
                .with_bus(Rc::clone(&bus)),
        );
        let session = Rc::new(Session::new(store));
        let admin = AdminFilter::new(Rc::clone(&session), Rc::clone(&bus), authorizer);
        let goals = GoalResolver::new(Rc::clone(&cache), config.goal_floor);
        let writer = RowWriter::new(
            source,
            Rc::clone(&cache),
            Rc::clone(&bus),
            sleeper,
            config.confirmation,
        );

        Ok(Self {
            config,
            cache,
            bus,
            session,
            admin,
            goals,
            writer,
        })
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    pub fn cache(&self) -> &SheetCache {
        &self.cache
    }

    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn admin(&self) -> &AdminFilter {
        &self.admin
    }

    pub fn goals(&self) -> &GoalResolver {
        &self.goals
    }

    /// Full cached row set of a sheet.
    ///
    /// # Errors
    /// `Network`/`Decode` when the sheet has to be fetched and the fetch fails.
    pub async fn rows(&self, key: &str, force: bool) -> Result<Rows> {
        self.cache.get(key, force).await
    }

    /// Rows of a sheet narrowed to the current admin scope.
    ///
    /// # Errors
    /// As for [`Dashboard::rows`].
    pub async fn scoped_rows(&self, key: &str, force: bool) -> Result<Vec<Row>> {
        let rows = self.cache.get(key, force).await?;
        Ok(self.admin.apply(&rows, &self.config.scope_columns()))
    }

    /// Rows of a sheet through scope, dependent filter, search and sort.
    ///
    /// # Errors
    /// As for [`Dashboard::rows`].
    pub async fn view_rows(
        &self,
        key: &str,
        filter: Option<&DependentFilter<Row>>,
        query: &ViewQuery,
    ) -> Result<Vec<Row>> {
        let rows = self.cache.get(key, false).await?;
        Ok(pipeline::run(
            &rows,
            &self.admin.scope(),
            &self.config.scope_columns(),
            filter,
            query,
        ))
    }

    /// Invalidate a sheet by cache key or remote id.
    pub fn clear_cache(&self, key_or_id: &str) -> usize {
        self.cache.clear_cache(key_or_id)
    }

    pub async fn goal_band(&self, employee_id: &str) -> GoalBand {
        self.goals.resolve(employee_id).await
    }

    /// Goal band of the logged-in employee. The resolved level is remembered
    /// in the session so later pages can skip the employee join.
    pub async fn own_goal_band(&self) -> Option<GoalBand> {
        let identity = self.session.identity()?;
        if let Some(level) = self.session.resolved_level() {
            return Some(self.goals.resolve_for_level(&level).await);
        }
        let band = self.goals.resolve(&identity.employee_id).await;
        if !band.level.is_empty() {
            if let Err(e) = self.session.set_resolved_level(&band.level) {
                log::warn!("could not remember resolved level: {e}");
            }
        }
        Some(band)
    }

    /// Record the precomputed identity for this session.
    ///
    /// # Errors
    /// `Storage` when the session store rejects the write.
    pub fn login(&self, identity: &Identity) -> Result<()> {
        self.session.set_identity(identity)
    }

    /// Clear session keys and every cached sheet.
    ///
    /// # Errors
    /// `Storage` when a session key cannot be removed (the cache is cleared regardless).
    pub fn logout(&self) -> Result<()> {
        self.cache.invalidate_all();
        self.session.logout()
    }

    /// # Errors
    /// See [`AdminFilter::set_scope`].
    pub fn set_scope(&self, value: &str) -> Result<Scope> {
        self.admin.set_scope(value)
    }

    pub fn scope(&self) -> Scope {
        self.admin.scope()
    }

    /// # Errors
    /// See [`RowWriter::create`].
    pub async fn add_rows(&self, record: NewRecord) -> Result<WriteOutcome> {
        self.writer.create(record).await
    }

    pub fn subscribe(&self, listener: impl Fn(&DashEvent) + 'static) -> SubscriptionId {
        self.bus.subscribe(listener)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.bus.unsubscribe(id)
    }
}
