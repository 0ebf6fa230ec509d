use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::duration::deserialize_duration;

fn default_login_url() -> String {
    "https://auth.alipay.com/login/index.htm".to_string()
}

fn default_transfer_url() -> String {
    "https://lab.alipay.com/consume/record/items.htm".to_string()
}

fn default_keepalive_url() -> Option<String> {
    Some("https://my.alipay.com/portal/i.htm".to_string())
}

/// CSS selectors used to drive the login page.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoginSelectors {
    /// Login-method tab clicked before the form is filled, if the portal
    /// presents one.
    pub method_tab: Option<String>,
    pub username_input: String,
    pub password_input: String,
    /// The challenge image; its on-page position decides whether a check
    /// code is required at all.
    pub captcha_image: String,
    pub captcha_input: String,
    pub submit_button: String,
}

impl Default for LoginSelectors {
    fn default() -> Self {
        Self {
            method_tab: Some("#J-loginMethod-tabs li:nth-child(2)".to_string()),
            username_input: "#J-input-user".to_string(),
            password_input: "#password_rsainput".to_string(),
            captcha_image: "#J-checkcode-img".to_string(),
            captcha_input: "#J-input-checkcode".to_string(),
            submit_button: "#J-login-btn".to_string(),
        }
    }
}

/// CSS selectors used to pick transfer records out of the history page.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RecordSelectors {
    /// One element per transfer row.
    pub row: String,
    /// Present only on rows that are incoming transfers; also holds the
    /// income amount text.
    pub income_cell: String,
    pub transaction_id: String,
    pub time: String,
    pub description: String,
    pub balance: String,
    pub sender: String,
}

impl Default for RecordSelectors {
    fn default() -> Self {
        Self {
            row: "tr.record-list".to_string(),
            income_cell: "td.amount.income".to_string(),
            transaction_id: "div.consumeBizNo".to_string(),
            time: "td.time".to_string(),
            description: "li.name.emoji-li".to_string(),
            balance: "td.balance".to_string(),
            sender: "td.from li.name".to_string(),
        }
    }
}

/// Target portal endpoints and page structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PortalConfig {
    pub login_url: String,
    pub transfer_url: String,
    /// Visited after each poll to keep the session cookies warm. Set to
    /// nothing to skip the keep-alive request.
    pub keepalive_url: Option<String>,
    pub headless: bool,
    pub login_selectors: LoginSelectors,
    pub record_selectors: RecordSelectors,
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            login_url: default_login_url(),
            transfer_url: default_transfer_url(),
            keepalive_url: default_keepalive_url(),
            headless: true,
            login_selectors: LoginSelectors::default(),
            record_selectors: RecordSelectors::default(),
        }
    }
}

/// Portal login credentials. The password stays in the config file; it is
/// wrapped in a secret type once resolved.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CredentialsConfig {
    pub account: String,
    pub password: String,
}

/// How captchas get resolved during login.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaptchaMode {
    /// Ask the operator to read the saved crop and type the code.
    Prompt,
    /// Upload the crop to a decoding service.
    Remote,
}

/// Decoding service account, required when `mode = "remote"`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptchaServiceConfig {
    /// Full URL of the service's decode endpoint.
    pub endpoint: String,
    pub account: String,
    pub password: String,
    /// Service-specific code describing the captcha variant being uploaded.
    #[serde(default = "default_type_code")]
    pub type_code: String,
}

fn default_type_code() -> String {
    "3040".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptchaConfig {
    pub mode: CaptchaMode,
    pub service: Option<CaptchaServiceConfig>,
}

impl Default for CaptchaConfig {
    fn default() -> Self {
        Self {
            mode: CaptchaMode::Prompt,
            service: None,
        }
    }
}

/// Default poll interval (60 seconds).
fn default_interval() -> Duration {
    Duration::from_secs(60)
}

/// Poll loop settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WatchConfig {
    /// Sleep between transfer-history polls.
    #[serde(
        default = "default_interval",
        deserialize_with = "deserialize_duration"
    )]
    pub interval: Duration,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            interval: default_interval(),
        }
    }
}

/// Application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory for the login screenshot and captcha crop. If relative,
    /// resolved from the config file location. Defaults to the config
    /// file's directory.
    pub artifact_dir: Option<PathBuf>,

    pub portal: PortalConfig,
    pub credentials: CredentialsConfig,
    pub captcha: CaptchaConfig,
    pub watch: WatchConfig,
}

impl Config {
    /// Load config from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Resolve the artifact directory path.
    ///
    /// If `artifact_dir` is set and relative, it's resolved relative to
    /// `config_dir`. If unset, returns `config_dir`.
    pub fn resolve_artifact_dir(&self, config_dir: &Path) -> PathBuf {
        match &self.artifact_dir {
            Some(dir) if dir.is_absolute() => dir.clone(),
            Some(dir) => config_dir.join(dir),
            None => config_dir.to_path_buf(),
        }
    }
}

/// Loaded configuration with resolved paths.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    /// Where screen_shot.png and captcha.png land, overwritten each cycle.
    pub artifact_dir: PathBuf,

    pub portal: PortalConfig,
    pub credentials: CredentialsConfig,
    pub captcha: CaptchaConfig,
    pub watch: WatchConfig,
}

/// Returns the default config file path.
///
/// Resolution order:
/// 1. `./paywatch.toml` if it exists in current directory
/// 2. `~/.local/share/paywatch/paywatch.toml` (XDG data directory)
pub fn default_config_path() -> PathBuf {
    let local_config = PathBuf::from("paywatch.toml");
    if local_config.exists() {
        return local_config;
    }

    if let Some(data_dir) = dirs::data_dir() {
        return data_dir.join("paywatch").join("paywatch.toml");
    }

    local_config
}

impl ResolvedConfig {
    /// Load and resolve config from a file path.
    ///
    /// The artifact directory is resolved relative to the config file's
    /// parent directory.
    pub fn load(config_path: &Path) -> Result<Self> {
        let config_path = config_path
            .canonicalize()
            .with_context(|| format!("Config file not found: {}", config_path.display()))?;

        let config_dir = config_path
            .parent()
            .context("Config file has no parent directory")?;

        let config = Config::load(&config_path)?;
        let artifact_dir = config.resolve_artifact_dir(config_dir);

        Ok(Self {
            artifact_dir,
            portal: config.portal,
            credentials: config.credentials,
            captcha: config.captcha,
            watch: config.watch,
        })
    }

    /// Load config, falling back to defaults if the file doesn't exist.
    ///
    /// With no config file, the file's intended parent directory becomes
    /// the artifact directory.
    pub fn load_or_default(config_path: &Path) -> Result<Self> {
        if config_path.exists() {
            Self::load(config_path)
        } else {
            let config_path = if config_path.is_relative() {
                std::env::current_dir()
                    .context("Failed to get current directory")?
                    .join(config_path)
            } else {
                config_path.to_path_buf()
            };

            let config_dir = config_path
                .parent()
                .context("Config path has no parent directory")?;

            let config = Config::default();
            Ok(Self {
                artifact_dir: config.resolve_artifact_dir(config_dir),
                portal: config.portal,
                credentials: config.credentials,
                captcha: config.captcha,
                watch: config.watch,
            })
        }
    }

    /// Path the full-page login screenshot is written to.
    pub fn screenshot_path(&self) -> PathBuf {
        self.artifact_dir.join("screen_shot.png")
    }

    /// Path the cropped captcha image is written to.
    pub fn captcha_path(&self) -> PathBuf {
        self.artifact_dir.join("captcha.png")
    }
}
