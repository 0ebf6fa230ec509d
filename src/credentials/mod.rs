//! Portal credentials and the browser-to-HTTP session bridge.

mod session;

pub use session::SessionData;

use anyhow::{bail, Result};
use secrecy::SecretString;

use crate::config::CredentialsConfig;

/// Resolved portal login credentials.
///
/// The password is held behind [`SecretString`] so it never shows up in
/// debug output or log lines.
#[derive(Debug)]
pub struct Credentials {
    pub account: String,
    pub password: SecretString,
}

impl Credentials {
    /// Build credentials from config, rejecting empty fields up front so
    /// the browser never types a blank login.
    pub fn from_config(config: &CredentialsConfig) -> Result<Self> {
        if config.account.is_empty() {
            bail!("credentials.account is not set");
        }
        if config.password.is_empty() {
            bail!("credentials.password is not set");
        }

        Ok(Self {
            account: config.account.clone(),
            password: SecretString::from(config.password.clone()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    #[test]
    fn from_config_keeps_fields() {
        let config = CredentialsConfig {
            account: "someone@example.com".to_string(),
            password: "hunter2".to_string(),
        };

        let credentials = Credentials::from_config(&config).unwrap();
        assert_eq!(credentials.account, "someone@example.com");
        assert_eq!(credentials.password.expose_secret(), "hunter2");
    }

    #[test]
    fn from_config_rejects_missing_account() {
        let config = CredentialsConfig {
            account: String::new(),
            password: "hunter2".to_string(),
        };
        assert!(Credentials::from_config(&config).is_err());
    }

    #[test]
    fn from_config_rejects_missing_password() {
        let config = CredentialsConfig {
            account: "someone@example.com".to_string(),
            password: String::new(),
        };
        assert!(Credentials::from_config(&config).is_err());
    }

    #[test]
    fn debug_output_redacts_password() {
        let config = CredentialsConfig {
            account: "someone@example.com".to_string(),
            password: "hunter2".to_string(),
        };
        let credentials = Credentials::from_config(&config).unwrap();
        let rendered = format!("{credentials:?}");
        assert!(!rendered.contains("hunter2"));
    }
}
