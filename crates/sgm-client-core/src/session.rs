//! The authenticated session and its persistence

use futures::channel::oneshot;
use sgm_shared::{
    const_config::storage::STORAGE_SESSION_KEY,
    errors::ClientError,
    log_err_as_warn,
    req_args::LoginReqArgs,
    token::AuthToken,
    uac::{LoginGrant, LoginResponse, UserIdentity},
};
use sgm_time::Timestamp;
use tracing::{info, warn};

use crate::client::CredentialHandle;

pub mod storage;

use storage::KeyValueStorage;

/// Anything able to exchange credentials for a [`LoginResponse`]
pub trait Authenticator {
    fn authenticate(
        &self,
        args: &LoginReqArgs,
    ) -> oneshot::Receiver<Result<LoginResponse, ClientError>>;
}

/// Who is logged in, with what credential and until when
///
/// Persisted as `{"user": .., "token": .., "expiresAt": <ms>}`
#[derive(Debug, Default, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    user: Option<UserIdentity>,
    token: Option<AuthToken>,
    expires_at: Option<Timestamp>,
}

impl Session {
    pub fn user(&self) -> Option<&UserIdentity> {
        self.user.as_ref()
    }

    pub fn token(&self) -> Option<&AuthToken> {
        self.token.as_ref()
    }

    pub fn expires_at(&self) -> Option<Timestamp> {
        self.expires_at
    }

    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// A session without an expiry never expires
    pub fn is_expired_at(&self, now: Timestamp) -> bool {
        self.expires_at.is_some_and(|x| x.is_reached_at(now))
    }

    pub fn is_authenticated_at(&self, now: Timestamp) -> bool {
        self.user.is_some() && self.token.is_some() && !self.is_expired_at(now)
    }
}

impl From<LoginGrant> for Session {
    fn from(value: LoginGrant) -> Self {
        Self {
            user: Some(value.user),
            token: Some(value.token),
            expires_at: Some(value.expires_at),
        }
    }
}

/// Outcome of reading a persisted record
#[derive(Debug)]
enum Restored {
    Absent,
    Valid(Session),
    /// Present but unusable, the record must be erased
    Discard,
}

fn restore(raw: Option<&str>, now: Timestamp) -> Restored {
    let Some(raw) = raw else {
        return Restored::Absent;
    };
    match serde_json::from_str::<Session>(raw) {
        Ok(session) if session.is_expired_at(now) => {
            info!("persisted session expired");
            Restored::Discard
        }
        Ok(session) => Restored::Valid(session),
        Err(e) => {
            warn!(?e, "persisted session is malformed");
            Restored::Discard
        }
    }
}

/// Owns the session of this client and keeps it in step with storage
#[derive(Debug)]
pub struct SessionStore {
    storage: Box<dyn KeyValueStorage>,
    credential: CredentialHandle,
    session: Session,
}

impl SessionStore {
    /// Loads whatever session was persisted
    ///
    /// Never fails, an unusable record is erased and the store starts empty
    #[tracing::instrument(skip(storage, credential))]
    pub fn initialize(storage: Box<dyn KeyValueStorage>, credential: CredentialHandle) -> Self {
        let mut result = Self {
            storage,
            credential,
            session: Session::default(),
        };
        let raw = match result.storage.get_item(STORAGE_SESSION_KEY) {
            Ok(raw) => raw,
            Err(e) => {
                warn!(?e, "failed to read persisted session");
                None
            }
        };
        result.apply_restored(restore(raw.as_deref(), Timestamp::now()));
        result
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn user(&self) -> Option<&UserIdentity> {
        self.session.user()
    }

    pub fn token(&self) -> Option<&AuthToken> {
        self.session.token()
    }

    pub fn expires_at(&self) -> Option<Timestamp> {
        self.session.expires_at()
    }

    pub fn credential(&self) -> &CredentialHandle {
        &self.credential
    }

    /// True while a user and credential are held, the credential has not
    /// expired and the server has not rejected it
    pub fn is_authenticated(&self) -> bool {
        self.is_authenticated_at(Timestamp::now())
    }

    pub fn is_authenticated_at(&self, now: Timestamp) -> bool {
        self.session.is_authenticated_at(now) && !self.credential.is_revoked()
    }

    /// Validates locally, authenticates and on success replaces the session
    ///
    /// On any failure the current session is left as it was
    #[tracing::instrument(skip(self, authenticator))]
    pub async fn login<A: Authenticator>(
        &mut self,
        authenticator: &A,
        args: LoginReqArgs,
    ) -> Result<(), ClientError> {
        args.validate()?;
        let response = authenticator
            .authenticate(&args)
            .await
            .map_err(|e| ClientError::NetworkFailure(format!("login was canceled: {e}")))??;
        self.establish(response)
    }

    /// Replaces the session with the one described by a successful login
    #[tracing::instrument(skip(self, response))]
    pub fn establish(&mut self, response: LoginResponse) -> Result<(), ClientError> {
        self.establish_at(response, Timestamp::now())
    }

    pub fn establish_at(
        &mut self,
        response: LoginResponse,
        now: Timestamp,
    ) -> Result<(), ClientError> {
        let grant = response.into_grant(now)?;
        if grant.expires_at.is_reached_at(now) {
            return Err(ClientError::MalformedCredential(
                "credential has already expired".to_string(),
            ));
        }
        info!(user_id = %grant.user.id, "logged in");
        self.replace(grant.into(), now);
        Ok(())
    }

    /// Clears the session here and for every other handle on the storage
    #[tracing::instrument(skip(self))]
    pub fn logout(&mut self) {
        info!("logging out");
        self.clear();
    }

    /// Brings the session in line with the outside world
    ///
    /// Tears the session down if the server rejected the credential, adopts
    /// changes written by other handles and drops an expired session. Returns
    /// `true` if the session changed.
    pub fn sync(&mut self) -> bool {
        self.sync_at(Timestamp::now())
    }

    pub fn sync_at(&mut self, now: Timestamp) -> bool {
        let before = self.session.clone();

        if self.credential.is_revoked() && !self.session.is_empty() {
            warn!("credential rejected by server, ending session");
            self.clear();
        }

        match self.storage.take_foreign_changes(STORAGE_SESSION_KEY) {
            Ok(changes) => {
                if let Some(latest) = changes.into_iter().last() {
                    info!("session changed by another handle");
                    self.apply_restored(restore(latest.new_value.as_deref(), now));
                }
            }
            Err(e) => warn!(?e, "failed to check for session changes"),
        }

        if self.session.is_expired_at(now) {
            info!("session expired");
            self.clear();
        }

        before != self.session
    }

    fn apply_restored(&mut self, restored: Restored) {
        match restored {
            Restored::Absent => self.set_session(Session::default()),
            Restored::Valid(session) => self.set_session(session),
            Restored::Discard => self.clear(),
        }
    }

    /// Replaces the session and persists it, unless it is already expired in
    /// which case it is cleared instead
    fn replace(&mut self, session: Session, now: Timestamp) {
        if session.is_expired_at(now) {
            self.clear();
            return;
        }
        match serde_json::to_string(&session) {
            Ok(raw) => log_err_as_warn!(
                self.storage.set_item(STORAGE_SESSION_KEY, &raw),
                "failed to persist session"
            ),
            Err(e) => warn!(?e, "failed to serialize session"),
        }
        self.set_session(session);
    }

    fn clear(&mut self) {
        log_err_as_warn!(
            self.storage.remove_item(STORAGE_SESSION_KEY),
            "failed to erase persisted session"
        );
        self.set_session(Session::default());
    }

    /// Only place the in memory session is assigned so the credential
    /// handle never drifts from it
    fn set_session(&mut self, session: Session) {
        self.credential.set(session.token.clone());
        self.session = session;
    }
}
