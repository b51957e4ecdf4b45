//! Expected format of the arguments for the requests
//!
//! The structure of the module is supposed to match the path of the endpoints.
//! For example `/api/permission/update` maps to
//! [`api::PermissionUpdateReqArgs`]

use secrecy::{ExposeSecret, SecretString};
use std::fmt::Debug;

use crate::{const_config::messages::MSG_CREDENTIALS_REQUIRED, errors::ClientError, uac::Username};

pub mod api;

#[derive(serde::Deserialize, Clone)]
pub struct LoginReqArgs {
    pub username: String,
    pub password: SecretString,
}

impl LoginReqArgs {
    pub fn new<S: Into<String>>(username: S, password: SecretString) -> Self {
        Self {
            username: username.into(),
            password,
        }
    }

    /// Checks that neither field is blank before anything is sent
    pub fn validate(&self) -> Result<Username, ClientError> {
        if self.password.expose_secret().is_empty() {
            return Err(ClientError::Validation(MSG_CREDENTIALS_REQUIRED.to_string()));
        }
        Username::try_from(self.username.as_str())
            .map_err(|_| ClientError::Validation(MSG_CREDENTIALS_REQUIRED.to_string()))
    }

    /// The body sent to the authentication endpoint
    pub fn to_request_body(&self, username: &Username) -> serde_json::Value {
        serde_json::json!({
            "userName": username,
            "password": self.password.expose_secret(),
        })
    }
}

impl Debug for LoginReqArgs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginReqArgs")
            .field("username", &self.username)
            .field("has_password", &!self.password.expose_secret().is_empty())
            .finish()
    }
}
