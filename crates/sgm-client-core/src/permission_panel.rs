//! Search a user and switch their access to each module on or off
//!
//! Each toggle is applied locally straight away, then sent to the server and
//! rolled back if the server refuses it. Only one request per module may be in
//! flight. Everything belonging to a user is dropped when another user is
//! searched or the panel is cleared, so late responses land nowhere.

use std::collections::BTreeMap;

use sgm_shared::{
    const_config::{
        client::CLIENT_TRANSIENT_MESSAGE_DURATION,
        messages::{MSG_IDENTIFIER_REQUIRED, MSG_PERMISSION_GRANTED, MSG_PERMISSION_REVOKED},
    },
    errors::ClientError,
    id::ModuleId,
    req_args::api::PermissionUpdateReqArgs,
    uac::{ModuleCatalog, PermissionSet, UserIdentifier, UserLookup},
};
use sgm_time::Timestamp;
use tracing::{info, warn};

use crate::{
    client::UiCallBack,
    data_state::{AwaitingType, DataState},
};

/// The calls the panel makes
pub trait PermissionApi {
    fn list_modules<F: UiCallBack>(&self, ui_notify: F) -> AwaitingType<ModuleCatalog>;
    fn find_user<F: UiCallBack>(
        &self,
        identifier: &UserIdentifier,
        ui_notify: F,
    ) -> AwaitingType<UserLookup>;
    fn set_permission<F: UiCallBack>(
        &self,
        args: PermissionUpdateReqArgs,
        ui_notify: F,
    ) -> AwaitingType<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Success,
    Error,
}

/// Feedback that disappears on its own
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransientMessage {
    pub kind: MessageKind,
    pub text: String,
    pub expires_at: Timestamp,
}

/// What the panel shows for a module of the selected user
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModuleAccess {
    Granted,
    NotGranted,
    /// Shown with the requested value until the server answers
    Pending { requested: bool },
}

#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    Sent { requested: bool },
    /// The previous toggle of this module has not been answered yet
    AlreadyPending,
    NoUserSelected,
}

#[derive(Debug)]
struct PendingToggle {
    previous: bool,
    rx: AwaitingType<()>,
}

#[derive(Debug)]
pub struct SelectedUser {
    lookup: UserLookup,
    permissions: PermissionSet,
    pending: BTreeMap<ModuleId, PendingToggle>,
}

impl SelectedUser {
    fn new(lookup: UserLookup) -> Self {
        let permissions = lookup.granted_modules();
        Self {
            lookup,
            permissions,
            pending: BTreeMap::new(),
        }
    }

    pub fn lookup(&self) -> &UserLookup {
        &self.lookup
    }

    pub fn permissions(&self) -> &PermissionSet {
        &self.permissions
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    pub fn access(&self, module_id: &ModuleId) -> ModuleAccess {
        let is_granted = self.permissions.contains(module_id);
        if self.pending.contains_key(module_id) {
            ModuleAccess::Pending {
                requested: is_granted,
            }
        } else if is_granted {
            ModuleAccess::Granted
        } else {
            ModuleAccess::NotGranted
        }
    }
}

#[derive(Debug, Default)]
pub enum PanelState {
    #[default]
    Idle,
    Searching {
        identifier: UserIdentifier,
        rx: AwaitingType<UserLookup>,
    },
    Found(SelectedUser),
    NotFound(String),
}

#[derive(Debug)]
pub struct PermissionTogglePanel<A> {
    api: A,
    modules: DataState<ModuleCatalog>,
    state: PanelState,
    message: Option<TransientMessage>,
}

impl<A: PermissionApi> PermissionTogglePanel<A> {
    pub fn new(api: A) -> Self {
        Self {
            api,
            modules: DataState::default(),
            state: PanelState::default(),
            message: None,
        }
    }

    pub fn state(&self) -> &PanelState {
        &self.state
    }

    pub fn modules(&self) -> &DataState<ModuleCatalog> {
        &self.modules
    }

    pub fn selected_user(&self) -> Option<&SelectedUser> {
        match &self.state {
            PanelState::Found(user) => Some(user),
            _ => None,
        }
    }

    pub fn message(&self) -> Option<&TransientMessage> {
        self.message.as_ref()
    }

    /// Access of `module_id` for the selected user if there is one
    pub fn module_access(&self, module_id: &ModuleId) -> Option<ModuleAccess> {
        self.selected_user().map(|user| user.access(module_id))
    }

    /// True while any request started by the panel is unanswered
    pub fn is_busy(&self) -> bool {
        self.modules.is_awaiting_response()
            || match &self.state {
                PanelState::Searching { .. } => true,
                PanelState::Found(user) => user.has_pending(),
                PanelState::Idle | PanelState::NotFound(_) => false,
            }
    }

    /// Requests the catalog if it has not been requested yet
    #[tracing::instrument(skip(self, ui_notify))]
    pub fn load_module_catalog<F: UiCallBack>(&mut self, ui_notify: F) {
        let api = &self.api;
        self.modules.get(|| api.list_modules(ui_notify));
    }

    /// Allows the catalog to be requested again after it failed to load
    pub fn retry_module_catalog(&mut self) {
        self.modules.retry();
    }

    /// Starts looking up a user, abandoning everything about the previous one
    #[tracing::instrument(skip(self, ui_notify))]
    pub fn find_user<F: UiCallBack>(
        &mut self,
        identifier: &str,
        ui_notify: F,
    ) -> Result<(), ClientError> {
        let identifier = UserIdentifier::try_from(identifier)
            .map_err(|_| ClientError::Validation(MSG_IDENTIFIER_REQUIRED.to_string()))?;
        self.message = None;
        let rx = self.api.find_user(&identifier, ui_notify);
        self.state = PanelState::Searching { identifier, rx };
        Ok(())
    }

    /// Flips access to `module_id` locally and asks the server to do the same
    #[tracing::instrument(skip(self, ui_notify))]
    pub fn toggle_permission<F: UiCallBack>(
        &mut self,
        module_id: &ModuleId,
        ui_notify: F,
    ) -> ToggleOutcome {
        let PanelState::Found(user) = &mut self.state else {
            return ToggleOutcome::NoUserSelected;
        };
        if user.pending.contains_key(module_id) {
            info!(%module_id, "toggle ignored, previous one still pending");
            return ToggleOutcome::AlreadyPending;
        }
        let requested = !user.permissions.contains(module_id);
        let previous = user.permissions.set(module_id, requested);
        let args = PermissionUpdateReqArgs {
            user_id: user.lookup.user_id.clone(),
            module_id: module_id.clone(),
            has_permission: requested,
        };
        let rx = self.api.set_permission(args, ui_notify);
        user.pending
            .insert(module_id.clone(), PendingToggle { previous, rx });
        ToggleOutcome::Sent { requested }
    }

    /// Forgets the user, their permissions, unanswered requests and messages
    pub fn clear(&mut self) {
        self.state = PanelState::Idle;
        self.message = None;
    }

    /// Processes every response that has arrived
    pub fn poll(&mut self) {
        self.poll_at(Timestamp::now());
    }

    pub fn poll_at(&mut self, now: Timestamp) {
        self.modules.poll();

        if let PanelState::Searching { identifier, rx } = &mut self.state {
            let next = rx.try_take().map(|outcome| match outcome {
                Ok(lookup) => {
                    info!(%identifier, user_id = %lookup.user_id, "user found");
                    PanelState::Found(SelectedUser::new(lookup))
                }
                Err(e) => {
                    warn!(%identifier, ?e, "user lookup failed");
                    PanelState::NotFound(e.to_string())
                }
            });
            if let Some(next) = next {
                self.state = next;
            }
        }

        if let PanelState::Found(user) = &mut self.state {
            let answered: Vec<(ModuleId, Result<(), ClientError>)> = user
                .pending
                .iter_mut()
                .filter_map(|(id, pending)| pending.rx.try_take().map(|x| (id.clone(), x)))
                .collect();
            for (module_id, outcome) in answered {
                let Some(pending) = user.pending.remove(&module_id) else {
                    continue;
                };
                let (kind, text) = match outcome {
                    Ok(()) => {
                        let text = if pending.previous {
                            MSG_PERMISSION_REVOKED
                        } else {
                            MSG_PERMISSION_GRANTED
                        };
                        (MessageKind::Success, text.to_string())
                    }
                    Err(e) => {
                        warn!(%module_id, ?e, "permission update failed, rolling back");
                        user.permissions.set(&module_id, pending.previous);
                        (MessageKind::Error, e.to_string())
                    }
                };
                self.message = Some(TransientMessage {
                    kind,
                    text,
                    expires_at: now + CLIENT_TRANSIENT_MESSAGE_DURATION,
                });
            }
        }

        if self
            .message
            .as_ref()
            .is_some_and(|msg| msg.expires_at.is_reached_at(now))
        {
            self.message = None;
        }
    }
}
