use crate::id::{ModuleId, UserId};

/// Sets whether a user may access a module
#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PermissionUpdateReqArgs {
    pub user_id: UserId,
    pub module_id: ModuleId,
    pub has_permission: bool,
}
