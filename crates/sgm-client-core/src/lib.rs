//! Stores functionality that should be shared between different clients
//! NB: The assumption is made that the async runtime has already been started
//! before any functions from this library are called

#![warn(unused_crate_dependencies)]

mod client;
mod data_state;
mod permission_panel;
mod session;

pub use client::{Client, CredentialHandle, UiCallBack};
pub use data_state::{AwaitingType, DataState};
pub use permission_panel::{
    MessageKind, ModuleAccess, PanelState, PermissionApi, PermissionTogglePanel, SelectedUser,
    ToggleOutcome, TransientMessage,
};
pub use session::{
    storage::{FileStorage, KeyValueStorage, MemoryStorage, StorageEvent},
    Authenticator, Session, SessionStore,
};

#[cfg(test)] // Only used by the integration tests
mod warning_suppress {
    use actix_web as _;
    use base64 as _;
}
