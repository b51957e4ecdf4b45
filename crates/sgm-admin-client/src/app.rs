use std::{path::Path, time::Duration};

use sgm_client_core::{
    Client, CredentialHandle, FileStorage, KeyValueStorage, MemoryStorage, SessionStore,
    UiCallBack,
};
use sgm_time::Timestamp;
use strum::IntoEnumIterator as _;
use tracing::{info, instrument, warn};

use crate::{
    configuration::Configuration,
    pages::{Route, RouteGuard, UiDashboard, UiLogin, UiPermissions},
};

/// What is remembered between runs (the session has its own storage)
#[derive(Debug, Default, serde::Deserialize, serde::Serialize)]
#[serde(default)] // if we add new fields, give them default values when deserializing old state
struct PersistedState {
    username: String,
    route: Route,
}

/// State every page has access to
#[derive(Debug)]
pub struct DataShared {
    /// Kept so the login form is prefilled on the next run
    pub username: String,
    pub session: SessionStore,
    pub client: Client,
}

#[derive(Debug)]
pub struct SgmApp {
    data_shared: DataShared,
    guard: RouteGuard,
    last_route: Option<Route>,
    login_page: UiLogin,
    dashboard: UiDashboard,
    permissions: UiPermissions,
}

/// Returns a callback that makes egui repaint when a response arrives
pub fn wake_fn(ctx: egui::Context) -> impl UiCallBack {
    move || ctx.request_repaint()
}

/// Falls back to memory if the folder is unusable, the session is then lost
/// on exit and not shared with other instances
fn open_session_storage(folder: &Path) -> Box<dyn KeyValueStorage> {
    match FileStorage::new(folder) {
        Ok(storage) => Box::new(storage),
        Err(e) => {
            warn!(?e, ?folder, "unable to use session folder, session will not persist");
            Box::new(MemoryStorage::new())
        }
    }
}

impl SgmApp {
    /// Called once before the first frame.
    #[instrument(skip(cc))]
    pub fn new(
        cc: &eframe::CreationContext<'_>,
        configuration: &Configuration,
    ) -> anyhow::Result<Self> {
        let persisted: PersistedState = match cc.storage {
            Some(storage) => eframe::get_value(storage, eframe::APP_KEY).unwrap_or_else(|| {
                info!("no previous app state found");
                Default::default()
            }),
            None => {
                info!("No storage found");
                Default::default()
            }
        };

        let credential = CredentialHandle::default();
        let client = Client::new(
            &configuration.client.server_address,
            configuration.client.request_timeout(),
            credential.clone(),
        )?;
        let storage = open_session_storage(&configuration.storage.folder);
        let session = SessionStore::initialize(storage, credential);
        info!(
            is_authenticated = session.is_authenticated(),
            "session restored"
        );

        Ok(Self {
            permissions: UiPermissions::new(client.clone()),
            data_shared: DataShared {
                username: persisted.username,
                session,
                client,
            },
            guard: RouteGuard::new(persisted.route),
            last_route: None,
            login_page: Default::default(),
            dashboard: Default::default(),
        })
    }

    fn on_route_entered(&mut self, route: Route) {
        info!(?route, "showing view");
        match route {
            Route::Login => {
                // Nothing of the previous user may survive
                self.permissions.clear();
                self.dashboard.reset();
            }
            Route::Dashboard => self.dashboard.reset(),
            Route::Permissions => self
                .permissions
                .activate(self.data_shared.client.clone()),
        }
    }

    fn logout(&mut self) {
        self.data_shared.session.logout();
        self.guard.logged_out();
    }

    fn top_panel(&mut self, ctx: &egui::Context, current: Route) {
        egui::TopBottomPanel::top("top_panel").show(ctx, |ui| {
            egui::menu::bar(ui, |ui| {
                egui::widgets::global_theme_preference_switch(ui);
                if !current.is_protected() {
                    return;
                }
                ui.separator();
                for route in Route::iter().filter(Route::is_protected) {
                    if ui
                        .selectable_label(route == current, route.title())
                        .clicked()
                    {
                        self.guard.navigate(route);
                    }
                }
            });
        });
    }

    fn bottom_panel(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("bottom_panel").show(ctx, |ui| {
            ui.with_layout(egui::Layout::right_to_left(egui::Align::BOTTOM), |ui| {
                ui.label(Timestamp::now().display_as_locale_datetime());
                if let Some(user) = self.data_shared.session.user() {
                    let display_name = user.display_name.to_string();
                    let expires_at = self.data_shared.session.expires_at();
                    if ui.button("Cerrar sesión").clicked() {
                        self.logout();
                    }
                    let label = ui.label(format!("Sesión de {display_name}"));
                    if let Some(expires_at) = expires_at {
                        label.on_hover_text(format!(
                            "Válida hasta {}",
                            expires_at.display_as_locale_datetime()
                        ));
                    }
                }
                egui::warn_if_debug_build(ui);
            });
        });
    }
}

impl eframe::App for SgmApp {
    /// Called by the frame work to save state before shutdown.
    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        let state = PersistedState {
            username: self.data_shared.username.clone(),
            route: self.last_route.unwrap_or_default(),
        };
        info!("Saving with key: {}", eframe::APP_KEY);
        eframe::set_value(storage, eframe::APP_KEY, &state);
    }

    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if self.data_shared.session.sync() {
            ctx.request_repaint();
        }
        let route = self
            .guard
            .resolve(self.data_shared.session.is_authenticated());
        if self.last_route != Some(route) {
            self.on_route_entered(route);
            self.last_route = Some(route);
        }

        self.top_panel(ctx, route);
        self.bottom_panel(ctx);
        egui::CentralPanel::default().show(ctx, |ui| match route {
            Route::Login => self.login_page.show(ui, &mut self.data_shared),
            Route::Dashboard => self.dashboard.show(ui, &mut self.data_shared),
            Route::Permissions => self.permissions.show(ui),
        });

        // Picks up expiry and changes from other instances without input
        ctx.request_repaint_after(Duration::from_secs(1));
    }
}
