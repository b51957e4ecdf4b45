use std::time::Duration;

use sgm_client_core::{
    Client, ModuleAccess, PanelState, PermissionApi, PermissionTogglePanel, ToggleOutcome,
};
use sgm_time::Timestamp;
use tracing::debug;

use crate::{
    app::wake_fn,
    ui_helpers::{ui_data_state_status, ui_error_label, ui_transient_message},
};

/// Search a worker and switch their module access
#[derive(Debug)]
pub struct UiPermissions<A = Client> {
    panel: PermissionTogglePanel<A>,
    identifier: String,
    validation_error: Option<String>,
}

impl<A: PermissionApi> UiPermissions<A> {
    pub fn new(api: A) -> Self {
        Self {
            panel: PermissionTogglePanel::new(api),
            identifier: String::new(),
            validation_error: None,
        }
    }

    /// Starts over with a fresh catalog and no selected user
    pub fn activate(&mut self, api: A) {
        *self = Self::new(api);
    }

    pub fn clear(&mut self) {
        self.panel.clear();
        self.identifier.clear();
        self.validation_error = None;
    }

    pub fn show(&mut self, ui: &mut egui::Ui) {
        self.panel.poll();
        let ctx = ui.ctx().clone();
        self.panel.load_module_catalog(wake_fn(ctx.clone()));

        ui.heading("Gestión de permisos");
        if !self.panel.modules().is_present()
            && ui_data_state_status(ui, self.panel.modules(), "Reintentar")
        {
            self.panel.retry_module_catalog();
        }
        self.ui_search(ui);
        ui.separator();

        if let Some(message) = self.panel.message() {
            ui_transient_message(ui, message);
            // Repaint when it is due to disappear
            if let Some(remaining) = message.expires_at.seconds_until(Timestamp::now()) {
                ctx.request_repaint_after(Duration::from(remaining) + Duration::from_secs(1));
            }
        }

        match self.panel.state() {
            PanelState::Idle => {
                ui.label("Ingrese el identificador del trabajador para ver sus permisos");
            }
            PanelState::Searching { .. } => {
                ui.spinner();
            }
            PanelState::NotFound(msg) => ui_error_label(ui, msg.as_str()),
            PanelState::Found(_) => {}
        }
        if self.panel.selected_user().is_some() {
            self.ui_user_permissions(ui);
        }
    }

    fn ui_search(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            let response = ui.add(
                egui::TextEdit::singleline(&mut self.identifier)
                    .hint_text("DNI del trabajador"),
            );
            let is_enter =
                response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
            if ui.button("Buscar").clicked() || is_enter {
                let notify = wake_fn(ui.ctx().clone());
                self.validation_error = self
                    .panel
                    .find_user(&self.identifier, notify)
                    .err()
                    .map(|e| e.to_string());
            }
            if ui.button("Limpiar").clicked() {
                self.clear();
            }
        });
        if let Some(e) = self.validation_error.as_deref() {
            ui_error_label(ui, e);
        }
    }

    fn ui_user_permissions(&mut self, ui: &mut egui::Ui) {
        let Some(user) = self.panel.selected_user() else {
            return;
        };
        let lookup = user.lookup();
        egui::Grid::new("user_info").num_columns(2).show(ui, |ui| {
            ui.label("Nombre:");
            ui.label(lookup.user_name.as_str());
            ui.end_row();
            ui.label("Rol:");
            ui.label(lookup.role_name.as_deref().unwrap_or("-"));
            ui.end_row();
            ui.label("Oficina:");
            ui.label(lookup.office_name.as_deref().unwrap_or("-"));
            ui.end_row();
        });
        ui.separator();

        let Some(catalog) = self.panel.modules().present() else {
            return;
        };

        let mut clicked = None;
        egui::ScrollArea::vertical().show(ui, |ui| {
            for module in catalog.modules.iter() {
                let access = user.access(&module.id);
                let (mut is_checked, is_enabled) = match access {
                    ModuleAccess::Granted => (true, true),
                    ModuleAccess::NotGranted => (false, true),
                    ModuleAccess::Pending { requested } => (requested, false),
                };
                let response = ui.add_enabled(
                    is_enabled,
                    egui::Checkbox::new(&mut is_checked, module.name.as_str()),
                );
                if response.clicked() {
                    clicked = Some(module.id.clone());
                }
            }
        });

        if let Some(module_id) = clicked {
            let outcome = self
                .panel
                .toggle_permission(&module_id, wake_fn(ui.ctx().clone()));
            debug!(?outcome, %module_id, "toggle requested");
            debug_assert_ne!(outcome, ToggleOutcome::NoUserSelected);
        }
    }
}
