use sgm_client_core::{AwaitingType, DataState};
use sgm_shared::uac::ModuleCatalog;

use crate::{app::wake_fn, ui_helpers::ui_data_state_status, DataShared};

/// Lists the modules the logged in user may use
#[derive(Debug, Default)]
pub struct UiDashboard {
    catalog: DataState<ModuleCatalog>,
}

impl UiDashboard {
    /// Forget the catalog so it is fetched again next time
    pub fn reset(&mut self) {
        self.catalog = DataState::default();
    }

    pub fn show(&mut self, ui: &mut egui::Ui, data_shared: &mut DataShared) {
        let Some(user) = data_shared.session.user() else {
            return;
        };
        ui.heading(format!("Bienvenido, {}", user.display_name));
        if let Some(role) = user.role.as_deref() {
            ui.label(format!("Rol: {role}"));
        }
        ui.separator();

        let client = &data_shared.client;
        let ctx = ui.ctx().clone();
        self.catalog
            .get(|| AwaitingType(client.list_modules(wake_fn(ctx))));
        if !self.catalog.is_present() && ui_data_state_status(ui, &self.catalog, "Reintentar") {
            self.catalog.retry();
        }
        // Names are a nicety, fall back to showing the ids
        let catalog = self.catalog.present();

        if user.assigned_module_ids.is_empty() {
            ui.label("No tiene módulos asignados");
            return;
        }
        ui.label("Módulos asignados:");
        for module_id in user.assigned_module_ids.iter() {
            let name = catalog
                .and_then(|c| c.find(module_id))
                .map(|m| m.name.clone())
                .unwrap_or_else(|| module_id.to_string());
            ui.label(format!("• {name}"));
        }
    }
}
