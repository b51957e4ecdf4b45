use closure_traits::{ChannelCallBack, ChannelCallBackOutput};
use futures::channel::oneshot;
use reqwest::{header::AUTHORIZATION, StatusCode};
use sgm_shared::{
    const_config::{client::CLIENT_REQUEST_TIMEOUT, path::PathSpec},
    errors::ClientError,
    token::AuthToken,
};
use sgm_time::Seconds;
use std::fmt::Debug;
use std::sync::{Arc, Mutex};
use tracing::{info, warn};

pub mod api;

/// The bearer credential as seen by the transport
///
/// Shared between the session store, which decides what the credential is,
/// and the [`Client`], which attaches it and reports when the server
/// rejects it
#[derive(Debug, Clone, Default)]
pub struct CredentialHandle(Arc<Mutex<CredentialState>>);

#[derive(Debug, Default)]
struct CredentialState {
    token: Option<AuthToken>,
    is_revoked: bool,
}

impl CredentialHandle {
    /// Replaces the credential and clears any earlier revocation
    pub fn set(&self, token: Option<AuthToken>) {
        let mut guard = self.0.lock().expect("mutex poisoned");
        guard.token = token;
        guard.is_revoked = false;
    }

    pub fn token(&self) -> Option<AuthToken> {
        self.0.lock().expect("mutex poisoned").token.clone()
    }

    /// Marks the credential as rejected if it is still `rejected`
    ///
    /// A response for a credential that has since been replaced must not
    /// revoke the new one
    pub fn revoke(&self, rejected: &AuthToken) {
        let mut guard = self.0.lock().expect("mutex poisoned");
        if guard.token.as_ref() == Some(rejected) {
            guard.is_revoked = true;
        }
    }

    pub fn is_revoked(&self) -> bool {
        self.0.lock().expect("mutex poisoned").is_revoked
    }
}

#[derive(Debug, Clone)]
pub struct Client {
    api_client: reqwest::Client,
    inner: Arc<Mutex<ClientInner>>,
    credential: CredentialHandle,
}

#[derive(Debug)]
struct ClientInner {
    server_address: reqwest::Url,
}

impl Client {
    #[tracing::instrument(name = "NEW CLIENT-CORE", skip(credential))]
    pub fn new(
        server_address: &str,
        request_timeout: Seconds,
        credential: CredentialHandle,
    ) -> anyhow::Result<Self> {
        use anyhow::Context as _;
        let server_address = reqwest::Url::parse(server_address)
            .with_context(|| format!("invalid server address: {server_address:?}"))?;
        let api_client = reqwest::Client::builder()
            .timeout(request_timeout.into())
            .build()
            .context("unable to create reqwest client")?;
        Ok(Self {
            api_client,
            inner: Arc::new(Mutex::new(ClientInner { server_address })),
            credential,
        })
    }

    /// Uses the default request timeout
    pub fn with_credential(
        server_address: &str,
        credential: CredentialHandle,
    ) -> anyhow::Result<Self> {
        Self::new(server_address, CLIENT_REQUEST_TIMEOUT, credential)
    }

    pub fn credential(&self) -> &CredentialHandle {
        &self.credential
    }

    pub fn server_address(&self) -> reqwest::Url {
        self.inner
            .lock()
            .expect("mutex poisoned")
            .server_address
            .clone()
    }

    #[tracing::instrument(skip(args, on_done))]
    // WARNING: Must skip args as it my contain sensitive info and "safe" versions
    // would usually already be logged by the caller
    fn initiate_request<T, F, O>(
        &self,
        path_spec: &PathSpec,
        url: reqwest::Url,
        args: &T,
        on_done: F,
    ) where
        T: serde::Serialize + Debug,
        F: ChannelCallBack<O>,
        O: ChannelCallBackOutput,
    {
        let mut request = self.api_client.request(path_spec.method.clone(), url);
        if !path_spec.is_get() {
            request = request.json(&args);
        }
        reqwest_cross::fetch(request, on_done)
    }

    /// Sends the request with the current credential attached
    ///
    /// The credential that was sent travels with the response so that a
    /// `401` can be attributed to it
    #[tracing::instrument(skip(args, on_done))]
    fn initiate_authenticated_request<T, F, O>(
        &self,
        path_spec: &PathSpec,
        url: reqwest::Url,
        args: &T,
        on_done: F,
    ) where
        T: serde::Serialize + Debug,
        F: 'static + Send + FnOnce(reqwest::Result<reqwest::Response>, Option<AuthToken>) -> O,
        O: ChannelCallBackOutput,
    {
        let token = self.credential.token();
        let mut request = self.api_client.request(path_spec.method.clone(), url);
        if let Some(token) = token.as_ref() {
            request = request.header(AUTHORIZATION, format!("Bearer {}", token.as_str()));
        }
        if !path_spec.is_get() {
            request = request.json(&args);
        }
        reqwest_cross::fetch(request, move |resp| on_done(resp, token))
    }

    fn send_request_expect_json<F, T, U>(
        &self,
        path_spec: &PathSpec,
        url: reqwest::Url,
        args: &T,
        ui_notify: F,
    ) -> oneshot::Receiver<Result<U, ClientError>>
    where
        T: serde::Serialize + Debug,
        F: UiCallBack,
        U: Send + Debug + serde::de::DeserializeOwned + 'static,
    {
        let (tx, rx) = oneshot::channel();
        let credential = self.credential.clone();
        let on_done =
            move |resp: reqwest::Result<reqwest::Response>, sent: Option<AuthToken>| async move {
                let msg = process_json_body(resp, &credential, sent).await;
                // Receiver is dropped when the caller is no longer interested
                let _ = tx.send(msg);
                ui_notify();
            };
        self.initiate_authenticated_request(path_spec, url, args, on_done);
        rx
    }

    fn send_request_expect_ack<F, T>(
        &self,
        path_spec: &PathSpec,
        url: reqwest::Url,
        args: &T,
        ui_notify: F,
    ) -> oneshot::Receiver<Result<(), ClientError>>
    where
        T: serde::Serialize + Debug,
        F: UiCallBack,
    {
        let (tx, rx) = oneshot::channel();
        let credential = self.credential.clone();
        let on_done =
            move |resp: reqwest::Result<reqwest::Response>, sent: Option<AuthToken>| async move {
                let msg = process_ack(resp, &credential, sent).await;
                let _ = tx.send(msg);
                ui_notify();
            };
        self.initiate_authenticated_request(path_spec, url, args, on_done);
        rx
    }

    #[tracing::instrument(ret)]
    fn path_to_url(&self, path: &str) -> reqwest::Url {
        let mut result = self.server_address();
        let base = result.path().trim_end_matches('/').to_string();
        result.set_path(&format!("{base}{path}"));
        result
    }
}

#[tracing::instrument(ret, err(Debug), skip(credential))]
async fn process_ack(
    response: reqwest::Result<reqwest::Response>,
    credential: &CredentialHandle,
    sent: Option<AuthToken>,
) -> Result<(), ClientError> {
    let (response, status) = extract_response(response)?;
    if status.is_success() {
        Ok(())
    } else {
        Err(handle_error(response, credential, sent).await)
    }
}

#[tracing::instrument(ret, err(Debug), skip(credential))]
async fn process_json_body<T>(
    response: reqwest::Result<reqwest::Response>,
    credential: &CredentialHandle,
    sent: Option<AuthToken>,
) -> Result<T, ClientError>
where
    T: Debug + serde::de::DeserializeOwned,
{
    let (response, status) = extract_response(response)?;
    if status.is_success() {
        response
            .json()
            .await
            .map_err(|e| {
                ClientError::NetworkFailure(format!("failed to parse result as json: {e}"))
            })
    } else {
        Err(handle_error(response, credential, sent).await)
    }
}

/// Maps a non success response onto the error taxonomy
#[tracing::instrument(ret, skip(credential))]
async fn handle_error(
    response: reqwest::Response,
    credential: &CredentialHandle,
    sent: Option<AuthToken>,
) -> ClientError {
    let status = response.status();
    debug_assert!(
        !status.is_success(),
        "this is supposed to be an error, right? Status code is: {status}"
    );
    let server_msg = read_server_message(response).await;
    match status {
        StatusCode::UNAUTHORIZED => {
            warn!("server rejected the credential");
            if let Some(sent) = sent.as_ref() {
                credential.revoke(sent);
            }
            ClientError::Unauthorized
        }
        StatusCode::NOT_FOUND => ClientError::not_found(server_msg),
        _ => ClientError::NetworkFailure(server_msg.unwrap_or_else(|| {
            format!("request failed with status code: {status} and no body")
        })),
    }
}

/// Returns the `message` field of a JSON error body, the body as is if it is
/// not JSON, or `None` if it is empty
async fn read_server_message(response: reqwest::Response) -> Option<String> {
    let body = response.text().await.ok()?;
    extract_message(&body)
}

fn extract_message(body: &str) -> Option<String> {
    let body = body.trim();
    if body.is_empty() {
        return None;
    }
    match serde_json::from_str::<serde_json::Value>(body) {
        Ok(serde_json::Value::Object(map)) => match map.get("message") {
            Some(serde_json::Value::String(msg)) => Some(msg.clone()),
            _ => Some(body.to_string()),
        },
        Ok(serde_json::Value::String(msg)) => Some(msg),
        _ => Some(body.to_string()),
    }
}

/// Provides a way to standardize the error message
#[tracing::instrument(ret, err(Debug))]
fn extract_response(
    response: reqwest::Result<reqwest::Response>,
) -> Result<(reqwest::Response, StatusCode), ClientError> {
    if response.is_err() {
        info!("Response is err: {:#?}", response);
    }
    let response =
        response.map_err(|e| ClientError::NetworkFailure(format!("failed to send request: {e}")))?;
    let status = response.status();
    Ok((response, status))
}

pub trait UiCallBack: 'static + Send + FnOnce() {}
impl<T> UiCallBack for T where T: 'static + Send + FnOnce() {}

pub mod closure_traits {
    pub trait ChannelCallBack<O>:
        'static + Send + FnOnce(reqwest::Result<reqwest::Response>) -> O
    {
    }
    impl<T, O> ChannelCallBack<O> for T where
        T: 'static + Send + FnOnce(reqwest::Result<reqwest::Response>) -> O
    {
    }
    pub trait ChannelCallBackOutput: futures::Future<Output = ()> + Send {}
    impl<T> ChannelCallBackOutput for T where T: futures::Future<Output = ()> + Send {}
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case::json_message(r#"{"message":"No existe el DNI"}"#, Some("No existe el DNI"))]
    #[case::json_without_message(r#"{"error":"x"}"#, Some(r#"{"error":"x"}"#))]
    #[case::plain_text("Credenciales inválidas", Some("Credenciales inválidas"))]
    #[case::json_string(r#""boom""#, Some("boom"))]
    #[case::empty("", None)]
    #[case::whitespace("  \n", None)]
    fn server_message(#[case] body: &str, #[case] expected: Option<&str>) {
        assert_eq!(extract_message(body).as_deref(), expected);
    }

    #[rstest]
    #[case::no_path("http://localhost:8080", "/modules/", "http://localhost:8080/modules/")]
    #[case::trailing_slash("http://localhost:8080/", "/modules/", "http://localhost:8080/modules/")]
    #[case::prefix(
        "http://localhost:8080/admin",
        "/api/permission/update",
        "http://localhost:8080/admin/api/permission/update"
    )]
    fn url_joining(#[case] base: &str, #[case] path: &str, #[case] expected: &str) {
        let client = Client::with_credential(base, CredentialHandle::default()).unwrap();
        assert_eq!(client.path_to_url(path).as_str(), expected);
    }

    #[test]
    fn invalid_server_address() {
        assert!(Client::with_credential("not a url", CredentialHandle::default()).is_err());
    }

    #[test]
    fn revoke_ignores_replaced_credential() {
        // Arrange
        let handle = CredentialHandle::default();
        handle.set(Some("old".into()));
        handle.set(Some("new".into()));

        // Act
        handle.revoke(&"old".into());

        // Assert
        assert!(!handle.is_revoked());
        handle.revoke(&"new".into());
        assert!(handle.is_revoked());
    }

    #[test]
    fn setting_credential_clears_revocation() {
        let handle = CredentialHandle::default();
        handle.set(Some("tok".into()));
        handle.revoke(&"tok".into());
        handle.set(Some("tok".into()));
        assert!(!handle.is_revoked());
    }
}
