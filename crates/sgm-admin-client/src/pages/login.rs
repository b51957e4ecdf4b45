use crate::{app::wake_fn, ui_helpers::ui_password_edit, DataShared};
use futures::channel::oneshot;
use secrecy::SecretString;
use sgm_shared::{
    errors::ClientError, internal_error, req_args::LoginReqArgs, uac::LoginResponse,
};
use std::fmt::Debug;
use tracing::{error, info};

#[derive(Debug)]
pub struct UiLogin {
    password: SecretString,
    login_attempt_status: LoginAttemptStatus,
}

type AwaitingType = oneshot::Receiver<Result<LoginResponse, ClientError>>;

#[derive(Default)]
enum LoginAttemptStatus {
    #[default]
    NotAttempted,
    AwaitingResponse(AwaitingType),
    Failed(String),
}

impl Debug for LoginAttemptStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotAttempted => write!(f, "NotAttempted"),
            Self::AwaitingResponse(_) => write!(f, "AwaitingResponse"),
            Self::Failed(e) => f.debug_tuple("Failed").field(e).finish(),
        }
    }
}

impl LoginAttemptStatus {
    fn is_allowed_to_login(&self) -> bool {
        match self {
            LoginAttemptStatus::NotAttempted | LoginAttemptStatus::Failed(_) => true,
            LoginAttemptStatus::AwaitingResponse(_) => false,
        }
    }
}

impl UiLogin {
    fn login_prompt(&mut self, ui: &mut egui::Ui, data_shared: &mut DataShared) {
        let username_widget =
            egui::TextEdit::singleline(&mut data_shared.username).hint_text("Usuario");
        let mut lost_focus = ui.add(username_widget).lost_focus();

        lost_focus =
            ui_password_edit(ui, &mut self.password, "Contraseña").lost_focus() || lost_focus;

        if lost_focus
            && self.login_attempt_status.is_allowed_to_login()
            && ui.input(|i| i.key_pressed(egui::Key::Enter))
        {
            self.send_login_attempt(ui, data_shared)
        }
    }

    fn check_login_attempt_status(&mut self, ui: &mut egui::Ui, data_shared: &mut DataShared) {
        match &mut self.login_attempt_status {
            LoginAttemptStatus::NotAttempted => {
                // No special UI needed
            }
            LoginAttemptStatus::AwaitingResponse(rx) => match rx.try_recv() {
                Ok(Some(Ok(response))) => match data_shared.session.establish(response) {
                    Ok(()) => {
                        info!("login succeeded");
                        self.password = SecretString::from("");
                        self.login_attempt_status = LoginAttemptStatus::NotAttempted;
                        ui.ctx().request_repaint(); // Repaint with new value
                    }
                    Err(e) => {
                        info!("login response rejected: {e:?}");
                        self.login_attempt_status = LoginAttemptStatus::Failed(e.to_string());
                    }
                },
                Ok(Some(Err(e))) => {
                    info!("error returned from core-client: {e:?}");
                    self.login_attempt_status = LoginAttemptStatus::Failed(e.to_string())
                }
                Ok(None) => {
                    ui.spinner();
                }
                Err(e) => {
                    error!("Error receiving on channel. Canceled: {e:?}");
                    self.login_attempt_status = LoginAttemptStatus::Failed(internal_error!(e));
                }
            },
            LoginAttemptStatus::Failed(e) => {
                ui.separator();
                ui.colored_label(ui.visuals().error_fg_color, e.as_str());
                ui.separator();
            }
        }
    }

    pub fn show(&mut self, ui: &mut egui::Ui, data_shared: &mut DataShared) {
        ui.vertical_centered(|ui| {
            ui.heading("Iniciar sesión");

            self.login_prompt(ui, data_shared);

            self.check_login_attempt_status(ui, data_shared);

            self.login_button(ui, data_shared);
        });
    }

    fn login_button(&mut self, ui: &mut egui::Ui, data_shared: &mut DataShared) {
        if ui
            .add_enabled(
                self.login_attempt_status.is_allowed_to_login(),
                egui::Button::new("Ingresar"),
            )
            .clicked()
        {
            self.send_login_attempt(ui, data_shared);
        }
    }

    fn send_login_attempt(&mut self, ui: &mut egui::Ui, data_shared: &mut DataShared) {
        let args = LoginReqArgs::new(data_shared.username.clone(), self.password.clone());
        if let Err(e) = args.validate() {
            self.login_attempt_status = LoginAttemptStatus::Failed(e.to_string());
            return;
        }
        let rx = data_shared.client.login(&args, wake_fn(ui.ctx().clone()));
        self.login_attempt_status = LoginAttemptStatus::AwaitingResponse(rx);
    }
}

impl Default for UiLogin {
    fn default() -> Self {
        Self {
            password: SecretString::from(""),
            login_attempt_status: Default::default(),
        }
    }
}
