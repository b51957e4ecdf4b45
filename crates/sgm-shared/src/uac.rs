//! Shared items related to user access control

mod module;
mod permissions;
mod responses;
mod user;

pub use module::{Module, ModuleCatalog};
pub use permissions::PermissionSet;
pub use responses::{AuthResponse, LoginGrant, LoginResponse};
pub use user::{DisplayName, UserIdentifier, UserIdentity, UserLookup, UserModule, Username};
