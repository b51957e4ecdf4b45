//! The bearer credential and the claims that can be read out of it

use std::fmt::Debug;

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use sgm_time::Timestamp;

use crate::{errors::ClientError, uac::UserIdentity};

/// Opaque bearer credential handed out at login
///
/// Never printed in full to avoid leaking it into traces
#[derive(serde::Serialize, serde::Deserialize, Clone, PartialEq, Eq)]
pub struct AuthToken(String);

impl AuthToken {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<String> for AuthToken {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for AuthToken {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl Debug for AuthToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("AuthToken")
            .field(&format_args!("[REDACTED len={}]", self.0.len()))
            .finish()
    }
}

/// Claims carried in the payload of a signed credential
#[derive(Debug, serde::Deserialize, Clone, PartialEq, Eq)]
pub struct CredentialClaims {
    /// Seconds since the epoch
    pub exp: u64,
    #[serde(alias = "data")]
    pub user: UserIdentity,
}

impl CredentialClaims {
    /// Reads the claims out of a `header.payload.signature` credential
    ///
    /// The signature is not verified, that is the server's job
    pub fn decode(credential: &str) -> Result<Self, ClientError> {
        let mut segments = credential.split('.');
        let (Some(_header), Some(payload), Some(_signature), None) = (
            segments.next(),
            segments.next(),
            segments.next(),
            segments.next(),
        ) else {
            return Err(ClientError::MalformedCredential(
                "expected three dot separated segments".to_string(),
            ));
        };
        let bytes = URL_SAFE_NO_PAD
            .decode(payload.trim_end_matches('='))
            .map_err(|e| ClientError::MalformedCredential(format!("payload is not base64: {e}")))?;
        serde_json::from_slice(&bytes)
            .map_err(|e| ClientError::MalformedCredential(format!("invalid claims: {e}")))
    }

    pub fn expires_at(&self) -> Timestamp {
        Timestamp::from_secs(self.exp)
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::id::UserId;

    fn encode(json: &str) -> String {
        format!("eyJhbGciOiJIUzI1NiJ9.{}.c2ln", URL_SAFE_NO_PAD.encode(json))
    }

    #[test]
    fn decodes_claims() {
        // Arrange
        let credential = encode(r#"{"exp":1700000000,"data":{"id":7,"nombre":"Ana"}}"#);

        // Act
        let actual = CredentialClaims::decode(&credential).unwrap();

        // Assert
        assert_eq!(actual.user.id, UserId::from("7"));
        assert_eq!(actual.expires_at(), Timestamp::from_millis(1_700_000_000_000));
    }

    #[rstest]
    #[case::empty("")]
    #[case::one_segment("abc")]
    #[case::two_segments("abc.def")]
    #[case::four_segments("a.b.c.d")]
    #[case::not_base64("a.!!!.c")]
    #[case::not_json("a.bm90IGpzb24.c")]
    fn malformed(#[case] credential: &str) {
        let actual = CredentialClaims::decode(credential).unwrap_err();
        assert!(
            matches!(actual, ClientError::MalformedCredential(_)),
            "{actual:?}"
        );
    }

    #[test]
    fn missing_exp_is_malformed() {
        let credential = encode(r#"{"user":{"id":"1"}}"#);
        assert!(matches!(
            CredentialClaims::decode(&credential),
            Err(ClientError::MalformedCredential(_))
        ));
    }

    #[test]
    fn debug_does_not_leak_token() {
        let token = AuthToken::from("super-secret");
        assert!(!format!("{token:?}").contains("super-secret"));
    }
}
