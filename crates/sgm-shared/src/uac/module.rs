use crate::id::ModuleId;

/// A functional area of the system that access can be granted to
#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, PartialEq, Eq)]
pub struct Module {
    #[serde(alias = "id_modulo")]
    pub id: ModuleId,
    #[serde(alias = "nombre_modulo")]
    pub name: String,
}

/// Body returned when listing every module
#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, PartialEq, Eq, Default)]
pub struct ModuleCatalog {
    pub modules: Vec<Module>,
}

impl ModuleCatalog {
    pub fn find(&self, id: &ModuleId) -> Option<&Module> {
        self.modules.iter().find(|module| &module.id == id)
    }
}
