use crate::{
    catalog::{Catalog, normalize_symbol},
    error::{AlertError, ValidationError},
    models::{
        AlertCategory, AlertId, AlertPatch, AlertRecord, Direction, FieldUpdate, NewAlert,
        alert::{decrement_price_text, format_price, increment_price_text, parse_price},
    },
    services::{AlertStore, Notifier, Session},
};

/// The persisted alert a form is editing.
///
/// `side` and `category` start out true only when the record carried them;
/// picking a value in the form sets them. Fields still false are left out
/// of the update so the stored record keeps them unset.
#[derive(Debug, Clone, PartialEq)]
pub struct EditTarget {
    pub id: AlertId,
    // instrument as loaded, exempt from the catalog check
    pub instrument: String,
    pub side: bool,
    pub category: bool,
}

impl EditTarget {
    fn patch(&self, draft: &NewAlert) -> AlertPatch {
        AlertPatch {
            instrument: Some(draft.instrument.clone()),
            category: self.category.then_some(draft.category),
            side: self.side.then(|| draft.direction.into()),
            price: Some(draft.price),
            comment: Some(draft.comment.clone()),
        }
    }
}

/// Draft being authored in the "Place Alert" form.
#[derive(Debug, Clone, PartialEq)]
pub struct FormState {
    pub instrument: String,
    // raw text, parsed on submit
    pub price: String,
    pub direction: Direction,
    pub comment: String,
    pub category: AlertCategory,

    // set while the form edits an already persisted alert
    pub editing_target: Option<EditTarget>,
}

impl Default for FormState {
    fn default() -> Self {
        Self {
            instrument: String::new(),
            price: "0".to_string(),
            direction: Direction::default(),
            comment: String::new(),
            category: AlertCategory::default(),
            editing_target: None,
        }
    }
}

impl FormState {
    /// Form pre-filled from a listed alert, targeting it for update.
    pub fn load(record: &AlertRecord) -> Self {
        Self {
            instrument: record.instrument.clone(),
            price: record.price.map(format_price).unwrap_or_default(),
            direction: record.side.map(Direction::from).unwrap_or_default(),
            comment: record.comment.clone(),
            category: record.category.unwrap_or(AlertCategory::Intraday),
            editing_target: Some(EditTarget {
                id: record.id.clone(),
                instrument: record.instrument.clone(),
                side: record.side.is_some(),
                category: record.category.is_some(),
            }),
        }
    }

    pub fn is_editing(&self) -> bool {
        self.editing_target.is_some()
    }

    pub fn editing_id(&self) -> Option<&AlertId> {
        self.editing_target.as_ref().map(|t| &t.id)
    }

    pub fn apply(&mut self, update: FieldUpdate) {
        match update {
            FieldUpdate::Instrument(s) => self.instrument = normalize_symbol(&s),
            FieldUpdate::Price(p) => self.price = p,
            FieldUpdate::Direction(d) => {
                self.direction = d;
                self.touch_side();
            }
            FieldUpdate::Side(s) => {
                self.direction = Direction::from(s);
                self.touch_side();
            }
            FieldUpdate::Comment(c) => self.comment = c,
            FieldUpdate::Category(c) => {
                self.category = c;
                if let Some(t) = self.editing_target.as_mut() {
                    t.category = true;
                }
            }
        }
    }

    fn touch_side(&mut self) {
        if let Some(t) = self.editing_target.as_mut() {
            t.side = true;
        }
    }

    pub fn increment_price(&mut self) {
        self.price = increment_price_text(&self.price);
    }

    pub fn decrement_price(&mut self) {
        self.price = decrement_price_text(&self.price);
    }

    pub fn validate(&self, catalog: &Catalog) -> Result<NewAlert, ValidationError> {
        let instrument = normalize_symbol(&self.instrument);
        if instrument.is_empty() {
            return Err(ValidationError::MissingInstrument);
        }

        // a listed alert may use a symbol the picker no longer offers
        let kept = self
            .editing_target
            .as_ref()
            .is_some_and(|t| t.instrument == instrument);
        if !kept && !catalog.contains(&instrument) {
            return Err(ValidationError::UnknownInstrument(instrument));
        }

        let price = parse_price(&self.price)?;

        Ok(NewAlert {
            instrument,
            price,
            direction: self.direction,
            comment: self.comment.clone(),
            category: self.category,
        })
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    Created(AlertRecord),
    Updated {
        id: AlertId,
        record: Option<AlertRecord>,
    },
    Failed(AlertError),
    // the form went away while the request was in flight
    Discarded,
}

impl SubmitOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Created(_) | Self::Updated { .. })
    }
}

pub struct AlertFormController<S> {
    store: S,
    notifier: Notifier,
    catalog: Catalog,
    session: Session,
    state: FormState,
}

impl<S: AlertStore> AlertFormController<S> {
    pub fn new(store: S, notifier: Notifier, catalog: Catalog) -> Self {
        Self {
            store,
            notifier,
            catalog,
            session: Session::new(),
            state: FormState::default(),
        }
    }

    pub fn state(&self) -> &FormState {
        &self.state
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn session(&self) -> Session {
        self.session.clone()
    }

    pub fn set_field(&mut self, update: FieldUpdate) {
        self.state.apply(update);
    }

    pub fn set_field_raw(&mut self, name: &str, value: &str) -> Result<(), ValidationError> {
        let update = FieldUpdate::parse(name, value)?;
        self.state.apply(update);
        Ok(())
    }

    pub fn increment_price(&mut self) {
        self.state.increment_price();
    }

    pub fn decrement_price(&mut self) {
        self.state.decrement_price();
    }

    pub fn begin_edit(&mut self, record: &AlertRecord) {
        tracing::debug!("form editing alert {}", record.id);
        self.state = FormState::load(record);
    }

    pub fn cancel_edit(&mut self) {
        self.state.reset();
    }

    /// Creates a new alert, or updates the targeted one, through the store.
    /// Fields are cleared only when the service accepted the change.
    pub async fn submit(&mut self) -> SubmitOutcome {
        let draft = match self.state.validate(&self.catalog) {
            Ok(d) => d,
            Err(e) => {
                tracing::info!("alert form rejected: {}", e);
                self.notifier.error(e.to_string());
                return SubmitOutcome::Failed(e.into());
            }
        };

        match self.state.editing_target.clone() {
            None => {
                let res = self.store.create(&draft).await;
                if !self.session.is_active() {
                    tracing::debug!("form closed before create finished, dropping result");
                    return SubmitOutcome::Discarded;
                }

                match res {
                    Ok(record) => {
                        self.state.reset();
                        self.notifier.success("Alert created successfully!");
                        SubmitOutcome::Created(record)
                    }
                    Err(e) => {
                        tracing::warn!("create alert failed: {}", e);
                        self.notifier.error(format!(
                            "Failed to create alert: {}",
                            e.describe("Failed to create alert", "Failed to create alert")
                        ));
                        SubmitOutcome::Failed(e)
                    }
                }
            }
            Some(target) => {
                let id = target.id.clone();
                let patch = target.patch(&draft);
                let res = self.store.update(&id, &patch).await;
                if !self.session.is_active() {
                    tracing::debug!("form closed before update finished, dropping result");
                    return SubmitOutcome::Discarded;
                }

                match res {
                    Ok(record) => {
                        self.state.reset();
                        self.notifier.success("Alert updated successfully!");
                        SubmitOutcome::Updated { id, record }
                    }
                    Err(e) => {
                        tracing::warn!("update alert {} failed: {}", id, e);
                        self.notifier.error(format!(
                            "Failed to update alert: {}",
                            e.describe("Failed to update alert", "Failed to update alert")
                        ));
                        SubmitOutcome::Failed(e)
                    }
                }
            }
        }
    }
}
