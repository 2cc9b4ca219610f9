//! `sentry.properties` loading.
//!
//! The file uses Java properties syntax without sections (`key=value` or
//! `key: value`); the `rust-ini` crate reads it as the general section.

use std::{io::ErrorKind, path::Path};

use ini::Ini;

use crate::{client::ClientContext, dsn::Dsn, error::ConfigError};

/// Conventional file name looked up by applications.
pub const DEFAULT_PROPERTIES_FILE: &str = "sentry.properties";

/// Settings read from a properties file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClientProperties {
    pub dsn: String,
    pub release: Option<String>,
    pub environment: Option<String>,
    pub server_name: Option<String>,
}

impl ClientProperties {
    /// Read the properties at `path`. `dsn` is required.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let ini = Ini::load_from_file(path).map_err(|err| match err {
            ini::Error::Io(io) if io.kind() == ErrorKind::NotFound => {
                ConfigError::InvalidConfig(format!("{} doesn't exist", path.display()))
            }
            ini::Error::Io(io) => ConfigError::Io(io),
            other => ConfigError::Properties(other),
        })?;
        Self::from_ini(&ini)
    }

    /// Parse properties from an in-memory string.
    pub fn parse(contents: &str) -> Result<Self, ConfigError> {
        let ini = Ini::load_from_str(contents)
            .map_err(|e| ConfigError::Properties(ini::Error::Parse(e)))?;
        Self::from_ini(&ini)
    }

    fn from_ini(ini: &Ini) -> Result<Self, ConfigError> {
        let section = ini.general_section();
        let get = |key: &str| {
            section
                .get(key)
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_owned)
        };
        let Some(dsn) = get("dsn") else {
            return Err(ConfigError::InvalidConfig(
                "properties do not define a dsn".into(),
            ));
        };
        Ok(Self {
            dsn,
            release: get("release"),
            environment: get("environment"),
            server_name: get("servername"),
        })
    }

    /// Parse the configured DSN.
    pub fn dsn(&self) -> Result<Dsn, ConfigError> {
        Dsn::parse(&self.dsn)
    }

    /// Overlay these properties on a context; file values win.
    pub fn apply_to(&self, context: &mut ClientContext) {
        if let Some(release) = &self.release {
            context.release = Some(release.clone());
        }
        if let Some(environment) = &self.environment {
            context.environment = Some(environment.clone());
        }
        if let Some(server_name) = &self.server_name {
            context.server_name = Some(server_name.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_equals_and_colon_separators() {
        let props = ClientProperties::parse(
            "dsn=https://pub@sentry.example.com/5\nrelease: 2.0.1\nenvironment = prod\n",
        )
        .expect("properties");
        assert_eq!(props.dsn, "https://pub@sentry.example.com/5");
        assert_eq!(props.release.as_deref(), Some("2.0.1"));
        assert_eq!(props.environment.as_deref(), Some("prod"));
        assert_eq!(props.server_name, None);
        assert_eq!(props.dsn().expect("dsn").project_id(), "5");
    }

    #[test]
    fn dsn_is_required() {
        let err = ClientProperties::parse("release=1\n").expect_err("missing dsn");
        assert!(matches!(err, ConfigError::InvalidConfig(_)));
    }

    #[test]
    fn file_values_override_context() {
        let props = ClientProperties::parse("dsn=https://pub@h/1\nservername=web-3\n")
            .expect("properties");
        let mut context = ClientContext {
            server_name: Some("from-dsn".into()),
            release: Some("keep".into()),
            ..Default::default()
        };
        props.apply_to(&mut context);
        assert_eq!(context.server_name.as_deref(), Some("web-3"));
        assert_eq!(context.release.as_deref(), Some("keep"));
    }
}
