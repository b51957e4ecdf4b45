use futures::channel::oneshot;
use reqwest::StatusCode;
use sgm_shared::{
    const_config::{
        messages::MSG_INVALID_CREDENTIALS,
        path::{PATH_API_PERMISSION_UPDATE, PATH_API_USER, PATH_LOGIN, PATH_MODULES},
    },
    errors::ClientError,
    req_args::{api::PermissionUpdateReqArgs, LoginReqArgs},
    uac::{LoginResponse, ModuleCatalog, UserIdentifier, UserLookup},
};

use crate::{
    client::{extract_response, read_server_message, UiCallBack},
    data_state::AwaitingType,
    permission_panel::PermissionApi,
    session::Authenticator,
    Client,
};

impl Client {
    /// Sends the credentials to the authentication endpoint
    ///
    /// Fails without sending anything if either field is blank
    #[tracing::instrument(skip(ui_notify))]
    pub fn login<F: UiCallBack>(
        &self,
        args: &LoginReqArgs,
        ui_notify: F,
    ) -> oneshot::Receiver<Result<LoginResponse, ClientError>> {
        let (tx, rx) = oneshot::channel();
        let username = match args.validate() {
            Ok(username) => username,
            Err(e) => {
                let _ = tx.send(Err(e));
                ui_notify();
                return rx;
            }
        };
        let body = args.to_request_body(&username);
        let on_done = move |resp: reqwest::Result<reqwest::Response>| async {
            let msg = process_login(resp).await;
            let _ = tx.send(msg);
            ui_notify();
        };
        self.initiate_request(&PATH_LOGIN, self.path_to_url(PATH_LOGIN.path), &body, on_done);
        rx
    }

    #[tracing::instrument(skip(ui_notify))]
    pub fn list_modules<F: UiCallBack>(
        &self,
        ui_notify: F,
    ) -> oneshot::Receiver<Result<ModuleCatalog, ClientError>> {
        let url = self.path_to_url(PATH_MODULES.path);
        self.send_request_expect_json(&PATH_MODULES, url, &(), ui_notify)
    }

    #[tracing::instrument(skip(ui_notify))]
    pub fn find_user<F: UiCallBack>(
        &self,
        identifier: &UserIdentifier,
        ui_notify: F,
    ) -> oneshot::Receiver<Result<UserLookup, ClientError>> {
        let mut url = self.path_to_url(PATH_API_USER.path);
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push(identifier.as_ref());
        }
        self.send_request_expect_json(&PATH_API_USER, url, &(), ui_notify)
    }

    #[tracing::instrument(skip(ui_notify))]
    pub fn update_permission<F: UiCallBack>(
        &self,
        args: &PermissionUpdateReqArgs,
        ui_notify: F,
    ) -> oneshot::Receiver<Result<(), ClientError>> {
        let url = self.path_to_url(PATH_API_PERMISSION_UPDATE.path);
        self.send_request_expect_ack(&PATH_API_PERMISSION_UPDATE, url, args, ui_notify)
    }
}

// No `ret` as the response carries the credential
#[tracing::instrument(err(Debug))]
async fn process_login(
    response: reqwest::Result<reqwest::Response>,
) -> Result<LoginResponse, ClientError> {
    let (response, status) = extract_response(response)?;
    if status.is_success() {
        let body = response
            .text()
            .await
            .map_err(|e| ClientError::NetworkFailure(format!("failed to read body: {e}")))?;
        return parse_login_body(&body);
    }
    let server_msg = read_server_message(response).await;
    Err(match status {
        StatusCode::UNAUTHORIZED => ClientError::InvalidCredentials(
            server_msg.unwrap_or_else(|| MSG_INVALID_CREDENTIALS.to_string()),
        ),
        _ => ClientError::NetworkFailure(server_msg.unwrap_or_else(|| {
            format!("request failed with status code: {status} and no body")
        })),
    })
}

/// Accepts either JSON form of [`LoginResponse`] or a bare credential sent as
/// plain text
fn parse_login_body(body: &str) -> Result<LoginResponse, ClientError> {
    let body = body.trim();
    match serde_json::from_str::<LoginResponse>(body) {
        Ok(response) => Ok(response),
        Err(e) => {
            let looks_like_credential = body.split('.').count() == 3
                && !body.contains(|c: char| c.is_whitespace() || c == '{' || c == '"');
            if looks_like_credential {
                Ok(LoginResponse::Signed(body.to_string()))
            } else {
                Err(ClientError::MalformedCredential(format!(
                    "unrecognized login response: {e}"
                )))
            }
        }
    }
}

fn no_cb() {}

impl Authenticator for Client {
    fn authenticate(
        &self,
        args: &LoginReqArgs,
    ) -> oneshot::Receiver<Result<LoginResponse, ClientError>> {
        self.login(args, no_cb)
    }
}

impl PermissionApi for Client {
    fn list_modules<F: UiCallBack>(&self, ui_notify: F) -> AwaitingType<ModuleCatalog> {
        AwaitingType(Client::list_modules(self, ui_notify))
    }

    fn find_user<F: UiCallBack>(
        &self,
        identifier: &UserIdentifier,
        ui_notify: F,
    ) -> AwaitingType<UserLookup> {
        AwaitingType(Client::find_user(self, identifier, ui_notify))
    }

    fn set_permission<F: UiCallBack>(
        &self,
        args: PermissionUpdateReqArgs,
        ui_notify: F,
    ) -> AwaitingType<()> {
        AwaitingType(self.update_permission(&args, ui_notify))
    }
}
