use sgm_time::{Seconds, Timestamp};

use crate::{
    const_config::client::CLIENT_DEFAULT_CREDENTIAL_LIFETIME,
    errors::ClientError,
    token::{AuthToken, CredentialClaims},
};

use super::UserIdentity;

/// Login response where the server spells everything out
#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub user: UserIdentity,
    pub token: AuthToken,
    #[serde(default)]
    pub expires_in: Option<Seconds>,
}

/// The two shapes the authentication endpoint is known to answer with
#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, PartialEq, Eq)]
#[serde(untagged)]
pub enum LoginResponse {
    Explicit(AuthResponse),
    /// A signed credential whose payload carries the identity and expiry
    Signed(String),
}

/// What a successful login resolves to regardless of the response shape
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginGrant {
    pub user: UserIdentity,
    pub token: AuthToken,
    pub expires_at: Timestamp,
}

impl LoginResponse {
    /// Resolves the response into the identity, credential and absolute
    /// expiry, with relative lifetimes counted from `now`
    pub fn into_grant(self, now: Timestamp) -> Result<LoginGrant, ClientError> {
        match self {
            LoginResponse::Explicit(AuthResponse {
                user,
                token,
                expires_in,
            }) => {
                if token.is_empty() {
                    return Err(ClientError::MalformedCredential(
                        "empty token".to_string(),
                    ));
                }
                Ok(LoginGrant {
                    user,
                    token,
                    expires_at: now + expires_in.unwrap_or(CLIENT_DEFAULT_CREDENTIAL_LIFETIME),
                })
            }
            LoginResponse::Signed(credential) => {
                let claims = CredentialClaims::decode(&credential)?;
                Ok(LoginGrant {
                    expires_at: claims.expires_at(),
                    user: claims.user,
                    token: credential.into(),
                })
            }
        }
    }
}
