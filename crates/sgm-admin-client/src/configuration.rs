use anyhow::Context as _;
use serde_aux::field_attributes::deserialize_number_from_string;
use sgm_shared::const_config::client::{CLIENT_DEFAULT_SERVER_ADDRESS, CLIENT_REQUEST_TIMEOUT};
use sgm_time::Seconds;
use std::path::{Path, PathBuf};

#[derive(serde::Deserialize, Clone, Debug)]
pub struct Configuration {
    pub client: ClientSettings,
    pub storage: StorageSettings,
}

#[derive(serde::Deserialize, Clone, Debug)]
pub struct ClientSettings {
    pub server_address: String,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub request_timeout_secs: u64,
}

#[derive(serde::Deserialize, Clone, Debug)]
pub struct StorageSettings {
    /// Where the session is persisted, shared by every instance of the app
    pub folder: PathBuf,
}

impl ClientSettings {
    pub fn request_timeout(&self) -> Seconds {
        Seconds::new(self.request_timeout_secs)
    }
}

/// Loads `base.toml` then the file for the current environment from
/// `configuration_directory`, then `APP_` prefixed environment variables
///
/// Missing files are not an error, the built in defaults are used instead
pub fn get_configuration(configuration_directory: &Path) -> anyhow::Result<Configuration> {
    // Detect the running environment.
    // Default to `local` if unspecified.
    let environment: Environment = std::env::var("APP_ENVIRONMENT")
        .unwrap_or_else(|_| "local".into())
        .try_into()
        .map_err(|e: String| anyhow::anyhow!(e))
        .context("failed to parse APP_ENVIRONMENT")?;
    let environment_filename = format!("{}.toml", environment.as_str());
    let settings = config::Config::builder()
        .set_default("client.server_address", CLIENT_DEFAULT_SERVER_ADDRESS)?
        .set_default("client.request_timeout_secs", CLIENT_REQUEST_TIMEOUT.as_secs())?
        .set_default("storage.folder", "session")?
        .add_source(
            config::File::from(configuration_directory.join("base.toml")).required(false),
        )
        .add_source(
            config::File::from(configuration_directory.join(environment_filename))
                .required(false),
        )
        // Add in settings from environment variables (with a prefix of APP and '__' as separator)
        // E.g. `APP_CLIENT__SERVER_ADDRESS=http://10.0.0.5:8080` would set `Settings.client.server_address`
        .add_source(
            config::Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__"),
        )
        .build()
        .context("failed to build configuration")?;

    settings
        .try_deserialize::<Configuration>()
        .context("failed to deserialize configuration")
}

/// The possible runtime environment for our application.
#[derive(Debug, PartialEq, Eq)]
pub enum Environment {
    Local,
    Production,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Local => "local",
            Environment::Production => "production",
        }
    }
}

impl TryFrom<String> for Environment {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        match s.to_lowercase().as_str() {
            "local" => Ok(Self::Local),
            "production" => Ok(Self::Production),
            other => Err(format!(
                "{} is not a supported environment. Use either `local` or `production`.",
                other
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("local", Environment::Local)]
    #[case("Production", Environment::Production)]
    fn environment_names(#[case] name: &str, #[case] expected: Environment) {
        assert_eq!(Environment::try_from(name.to_string()).unwrap(), expected);
    }

    #[test]
    fn unknown_environment() {
        assert!(Environment::try_from("staging".to_string()).is_err());
    }

    #[test]
    fn shipped_configuration_loads() {
        let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("configuration");
        let actual = get_configuration(&dir).unwrap();
        assert!(actual.client.server_address.starts_with("http"));
        assert!(!actual.client.request_timeout().is_zero());
    }

    #[test]
    fn missing_directory_uses_defaults() {
        let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("does_not_exist");
        let actual = get_configuration(&dir).unwrap();
        assert!(!actual.client.server_address.is_empty());
        assert_eq!(actual.storage.folder, PathBuf::from("session"));
    }
}
