use secrecy::{ExposeSecret as _, SecretString};
use sgm_client_core::{DataState, MessageKind, TransientMessage};

pub fn ui_password_edit(
    ui: &mut egui::Ui,
    password: &mut SecretString,
    hint_text: &str,
) -> egui::Response {
    let mut temp = password.expose_secret().to_owned();
    let result = ui.add(
        egui::TextEdit::singleline(&mut temp)
            .password(true)
            .hint_text(hint_text),
    );
    *password = SecretString::from(temp);
    result
}

pub fn ui_error_label(ui: &mut egui::Ui, text: impl Into<String>) {
    ui.colored_label(ui.visuals().error_fg_color, text.into());
}

pub fn ui_transient_message(ui: &mut egui::Ui, message: &TransientMessage) {
    match message.kind {
        MessageKind::Success => {
            ui.colored_label(egui::Color32::from_rgb(0, 150, 70), &message.text);
        }
        MessageKind::Error => ui_error_label(ui, &message.text),
    }
}

/// Shows a spinner while waiting and the error with a retry button on
/// failure
///
/// Returns true if retry was clicked
pub fn ui_data_state_status<T>(ui: &mut egui::Ui, state: &DataState<T>, retry_msg: &str) -> bool {
    match state {
        DataState::None | DataState::AwaitingResponse(_) => {
            ui.spinner();
            false
        }
        DataState::Present(_) => false,
        DataState::Failed(e) => {
            ui_error_label(ui, format!("Error en la solicitud: {e}"));
            ui.button(retry_msg).clicked()
        }
    }
}
