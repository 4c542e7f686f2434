use crate::{
    error::{AlertError, ValidationError},
    models::{
        AlertCategory, AlertId, AlertPatch, AlertRecord, FieldUpdate, HitSide,
        alert::{format_price, parse_price},
    },
    services::{AlertStore, Notifier, Session},
};

#[derive(Debug, Clone, PartialEq)]
pub enum ListState {
    Loading,
    Ready(Vec<AlertRecord>),
    // terminal for the current mount
    Failed(String),
}

impl ListState {
    pub fn resolve(result: Result<Vec<AlertRecord>, AlertError>) -> Self {
        match result {
            Ok(alerts) => Self::Ready(alerts),
            Err(e) => Self::Failed(e.describe("Failed to fetch alerts", "Failed to fetch alerts")),
        }
    }

    pub fn alerts(&self) -> &[AlertRecord] {
        match self {
            Self::Ready(alerts) => alerts,
            _ => &[],
        }
    }

    pub fn find(&self, id: &AlertId) -> Option<&AlertRecord> {
        self.alerts().iter().find(|a| &a.id == id)
    }

    fn remove(&mut self, id: &AlertId) -> bool {
        match self {
            Self::Ready(alerts) => {
                let before = alerts.len();
                alerts.retain(|a| &a.id != id);
                alerts.len() != before
            }
            _ => false,
        }
    }
}

/// Row-local copy of an alert while it is edited inline.
#[derive(Debug, Clone, PartialEq)]
pub struct EditState {
    pub id: AlertId,
    pub instrument: String,
    pub category: AlertCategory,
    pub side: Option<HitSide>,
    pub comment: String,
    pub price: String,
}

impl EditState {
    pub fn from_record(record: &AlertRecord) -> Self {
        Self {
            id: record.id.clone(),
            instrument: record.instrument.clone(),
            category: record.category.unwrap_or(AlertCategory::Intraday),
            side: record.side,
            comment: record.comment.clone(),
            price: record.price.map(format_price).unwrap_or_default(),
        }
    }

    pub fn apply(&mut self, update: FieldUpdate) -> Result<(), ValidationError> {
        match update {
            FieldUpdate::Instrument(_) => return Err(ValidationError::ReadOnly("instrument")),
            FieldUpdate::Price(p) => self.price = p,
            FieldUpdate::Direction(d) => self.side = Some(d.into()),
            FieldUpdate::Side(s) => self.side = Some(s),
            FieldUpdate::Comment(c) => self.comment = c,
            FieldUpdate::Category(c) => self.category = c,
        }
        Ok(())
    }

    pub fn to_patch(&self) -> Result<AlertPatch, ValidationError> {
        Ok(AlertPatch {
            instrument: Some(self.instrument.clone()),
            category: Some(self.category),
            side: self.side,
            price: Some(parse_price(&self.price)?),
            comment: Some(self.comment.clone()),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum CommitOutcome {
    // `resynced` is false when the follow-up fetch failed
    Committed { resynced: bool },
    NotEditing,
    Failed(AlertError),
    Discarded,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RemoveOutcome {
    Removed,
    Declined,
    Failed(AlertError),
    Discarded,
}

pub struct AlertListController<S> {
    store: S,
    notifier: Notifier,
    session: Session,
    state: ListState,
    editing: Option<EditState>,
}

impl<S> Drop for AlertListController<S> {
    fn drop(&mut self) {
        self.session.end();
    }
}

impl<S: AlertStore> AlertListController<S> {
    pub fn new(store: S, notifier: Notifier) -> Self {
        Self {
            store,
            notifier,
            session: Session::new(),
            state: ListState::Loading,
            editing: None,
        }
    }

    pub fn state(&self) -> &ListState {
        &self.state
    }

    pub fn alerts(&self) -> &[AlertRecord] {
        self.state.alerts()
    }

    pub fn editing(&self) -> Option<&EditState> {
        self.editing.as_ref()
    }

    pub fn session(&self) -> Session {
        self.session.clone()
    }

    pub fn is_mounted(&self) -> bool {
        self.session.is_active()
    }

    pub fn unmount(&self) {
        self.session.end();
    }

    /// Loads the list once. Later calls return the settled state untouched.
    pub async fn mount(&mut self) -> &ListState {
        if !matches!(self.state, ListState::Loading) {
            return &self.state;
        }

        let res = self.store.fetch_all().await;
        if !self.session.is_active() {
            tracing::debug!("alert list unmounted before fetch finished");
            return &self.state;
        }

        if let Err(e) = &res {
            tracing::warn!("fetching alerts failed: {}", e);
        }
        self.state = ListState::resolve(res);
        &self.state
    }

    /// Full refetch after a mutation. Returns whether the list was replaced.
    pub async fn refresh(&mut self) -> bool {
        let res = self.store.fetch_all().await;
        if !self.session.is_active() {
            return false;
        }

        match res {
            Ok(alerts) => {
                let stale = self
                    .editing
                    .as_ref()
                    .is_some_and(|e| !alerts.iter().any(|a| a.id == e.id));
                if stale {
                    self.editing = None;
                }
                self.state = ListState::Ready(alerts);
                true
            }
            Err(e) => {
                tracing::warn!("resync failed: {}", e);
                if matches!(self.state, ListState::Loading) {
                    self.state = ListState::resolve(Err(e));
                } else {
                    self.notifier.error(e.describe(
                        "Failed to fetch updated alerts.",
                        "Failed to fetch updated alerts.",
                    ));
                }
                false
            }
        }
    }

    // ---------------- Inline edit ----------------

    /// Opens the single edit slot on `id`, replacing any other open row.
    pub fn begin_edit(&mut self, id: &AlertId) -> Option<&EditState> {
        let record = self.state.find(id)?;
        self.editing = Some(EditState::from_record(record));
        self.editing.as_ref()
    }

    pub fn cancel_edit(&mut self) {
        self.editing = None;
    }

    /// Returns `Ok(false)` when no row is open.
    pub fn edit_field(&mut self, update: FieldUpdate) -> Result<bool, ValidationError> {
        match self.editing.as_mut() {
            Some(edit) => edit.apply(update).map(|_| true),
            None => Ok(false),
        }
    }

    pub fn edit_field_raw(&mut self, name: &str, value: &str) -> Result<bool, ValidationError> {
        let update = FieldUpdate::parse(name, value)?;
        self.edit_field(update)
    }

    pub async fn commit_edit(&mut self) -> CommitOutcome {
        let Some(edit) = self.editing.as_ref() else {
            return CommitOutcome::NotEditing;
        };
        let id = edit.id.clone();

        let patch = match edit.to_patch() {
            Ok(p) => p,
            Err(e) => {
                self.notifier.error(e.to_string());
                return CommitOutcome::Failed(e.into());
            }
        };

        let res = self.store.update(&id, &patch).await;
        if !self.session.is_active() {
            return CommitOutcome::Discarded;
        }

        if let Err(e) = res {
            tracing::warn!("update alert {} failed: {}", id, e);
            self.notifier
                .error(e.describe("Failed to update alert.", "Error updating alert."));
            return CommitOutcome::Failed(e);
        }

        self.notifier.success("Alert updated successfully!");

        let resynced = self.refresh().await;
        if !self.session.is_active() {
            return CommitOutcome::Discarded;
        }

        self.editing = None;
        CommitOutcome::Committed { resynced }
    }

    // ---------------- Delete ----------------

    /// Deletes `id` once `confirm` agrees. Nothing is sent otherwise.
    pub async fn remove<F>(&mut self, id: &AlertId, confirm: F) -> RemoveOutcome
    where
        F: FnOnce(&AlertId) -> bool,
    {
        if !confirm(id) {
            tracing::debug!("delete of {} declined", id);
            return RemoveOutcome::Declined;
        }

        let res = self.store.delete(id).await;
        if !self.session.is_active() {
            return RemoveOutcome::Discarded;
        }

        match res {
            Ok(()) => {
                self.state.remove(id);
                if self.editing.as_ref().is_some_and(|e| &e.id == id) {
                    self.editing = None;
                }
                self.notifier.success("Alert deleted successfully!");
                RemoveOutcome::Removed
            }
            Err(e) => {
                tracing::warn!("delete alert {} failed: {}", id, e);
                self.notifier
                    .error(e.describe("Failed to delete alert.", "Error deleting alert."));
                RemoveOutcome::Failed(e)
            }
        }
    }
}
