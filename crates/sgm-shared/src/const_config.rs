//! Stores settings that are not expected to need to change but grouped together
//! for discoverability and reuse. Each constant should be prefixed by the module
//! name to allow importing the constant only and still be readable

use sgm_time::Seconds;

pub mod client {
    use super::*;

    /// Used when no configuration overrides it
    pub const CLIENT_DEFAULT_SERVER_ADDRESS: &str = "http://localhost:8080";
    pub const CLIENT_REQUEST_TIMEOUT: Seconds = Seconds::new(5);
    /// Lifetime assumed when the login response does not say how long the
    /// credential is valid for
    pub const CLIENT_DEFAULT_CREDENTIAL_LIFETIME: Seconds = Seconds::new(3600);
    /// How long confirmations and errors stay visible on the permissions panel
    pub const CLIENT_TRANSIENT_MESSAGE_DURATION: Seconds = Seconds::new(3);
}

pub mod storage {
    /// Key under which the session record is persisted
    pub const STORAGE_SESSION_KEY: &str = "sgm_auth";
    pub const STORAGE_FILE_EXTENSION: &str = "json";
}

/// Text shown to the operator
pub mod messages {
    pub const MSG_CREDENTIALS_REQUIRED: &str = "Usuario y contraseña son requeridos";
    pub const MSG_INVALID_CREDENTIALS: &str = "Credenciales inválidas";
    pub const MSG_IDENTIFIER_REQUIRED: &str = "Ingrese el identificador del trabajador";
    pub const MSG_USER_NOT_FOUND: &str = "Usuario no encontrado";
    pub const MSG_PERMISSION_GRANTED: &str = "Permiso otorgado";
    pub const MSG_PERMISSION_REVOKED: &str = "Permiso retirado";
    pub const MSG_SESSION_EXPIRED: &str = "La sesión ha expirado, inicie sesión nuevamente";
}

pub mod path {
    mod path_spec;
    pub use path_spec::PathSpec;
    pub const PATH_LOGIN: PathSpec = PathSpec::post("/auth/login");
    pub const PATH_MODULES: PathSpec = PathSpec::get("/modules/");
    /// The user identifier is appended as the last path segment
    pub const PATH_API_USER: PathSpec = PathSpec::get("/api/user/");
    pub const PATH_API_PERMISSION_UPDATE: PathSpec = PathSpec::post("/api/permission/update");
}
