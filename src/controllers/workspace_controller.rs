use crate::{
    catalog::Catalog,
    config::Settings,
    controllers::{
        alert_form_controller::{AlertFormController, SubmitOutcome},
        alert_list_controller::{AlertListController, ListState},
    },
    models::AlertId,
    services::{AlertStore, Notifier},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    #[default]
    PlaceAlert,
    AlertList,
}

/// The two-tab alert screen: a form for placing alerts and the alert list.
///
/// The list is mounted whenever its tab is shown and unmounted when the user
/// leaves it, so every visit starts from a fresh fetch. Responses that arrive
/// for an unmounted list are dropped.
pub struct AlertWorkspace<S> {
    store: S,
    notifier: Notifier,
    form: AlertFormController<S>,
    list: Option<AlertListController<S>>,
    tab: Tab,
}

impl<S: AlertStore + Clone> AlertWorkspace<S> {
    pub fn new(store: S, notifier: Notifier, catalog: Catalog) -> Self {
        let form = AlertFormController::new(store.clone(), notifier.clone(), catalog);
        Self {
            store,
            notifier,
            form,
            list: None,
            tab: Tab::default(),
        }
    }

    pub fn from_settings(store: S, settings: &Settings) -> Self {
        Self::new(
            store,
            Notifier::new(settings.notification_ttl),
            Catalog::new(&settings.instruments),
        )
    }

    pub fn tab(&self) -> Tab {
        self.tab
    }

    pub fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    pub fn form(&self) -> &AlertFormController<S> {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut AlertFormController<S> {
        &mut self.form
    }

    pub fn list(&self) -> Option<&AlertListController<S>> {
        self.list.as_ref()
    }

    pub fn list_mut(&mut self) -> Option<&mut AlertListController<S>> {
        self.list.as_mut()
    }

    pub async fn show_list(&mut self) -> &ListState {
        self.tab = Tab::AlertList;
        let store = &self.store;
        let notifier = &self.notifier;
        let list = self
            .list
            .get_or_insert_with(|| AlertListController::new(store.clone(), notifier.clone()));
        list.mount().await
    }

    /// Shows the list and hands it back once loaded, or the message it failed with.
    pub async fn ready_list(&mut self) -> Result<&mut AlertListController<S>, String> {
        match self.show_list().await {
            ListState::Ready(_) => {}
            ListState::Failed(msg) => return Err(msg.clone()),
            ListState::Loading => return Err("Alert list closed before it loaded".to_string()),
        }
        self.list
            .as_mut()
            .ok_or_else(|| "Alert list is not open".to_string())
    }

    pub fn show_form(&mut self) {
        self.tab = Tab::PlaceAlert;
        if let Some(list) = self.list.take() {
            list.unmount();
        }
    }

    /// Loads a listed alert into the form for editing and switches to it.
    pub fn edit_from_list(&mut self, id: &AlertId) -> bool {
        let Some(record) = self
            .list
            .as_ref()
            .and_then(|l| l.state().find(id))
            .cloned()
        else {
            return false;
        };

        self.form.begin_edit(&record);
        self.show_form();
        true
    }

    pub async fn submit_form(&mut self) -> SubmitOutcome {
        let outcome = self.form.submit().await;
        if outcome.is_success() {
            // drop the cached list, the next visit refetches
            if let Some(list) = self.list.take() {
                list.unmount();
            }
        }
        outcome
    }

    pub fn shutdown(&mut self) {
        self.form.session().end();
        if let Some(list) = self.list.take() {
            list.unmount();
        }
        self.notifier.dismiss();
        tracing::debug!("alert workspace shut down");
    }
}
