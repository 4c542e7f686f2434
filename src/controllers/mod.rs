pub mod alert_form_controller;
pub mod alert_list_controller;
pub mod workspace_controller;
