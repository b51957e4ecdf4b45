use std::{collections::BTreeSet, fmt::Debug};

use crate::id::ModuleId;

/// The modules a user currently has access to
#[derive(serde::Serialize, serde::Deserialize, Clone, Default, PartialEq, Eq)]
pub struct PermissionSet(BTreeSet<ModuleId>);

impl PermissionSet {
    pub fn contains(&self, module_id: &ModuleId) -> bool {
        self.0.contains(module_id)
    }

    /// Sets membership for `module_id` and returns the previous membership
    pub fn set(&mut self, module_id: &ModuleId, is_granted: bool) -> bool {
        if is_granted {
            !self.0.insert(module_id.clone())
        } else {
            self.0.remove(module_id)
        }
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ModuleId> {
        self.0.iter()
    }
}

impl From<Vec<ModuleId>> for PermissionSet {
    fn from(value: Vec<ModuleId>) -> Self {
        value.into_iter().collect()
    }
}

impl FromIterator<ModuleId> for PermissionSet {
    fn from_iter<T: IntoIterator<Item = ModuleId>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl Debug for PermissionSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let ids: Vec<&str> = self.0.iter().map(AsRef::as_ref).collect();
        f.debug_tuple("PermissionSet").field(&ids).finish()
    }
}
