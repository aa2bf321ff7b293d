//! Config snapshot - the last-used form values
//!
//! Stored as a flat JSON object. Values are kept as entered; they are only
//! checked when turned into an [`AccountRequest`].

use std::fs;
use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{ConfigError, ParseValueError};
use crate::export::write_atomic;
use crate::records::{AccountRequest, Browser, Provider, SmsCredentials};

pub const DEFAULT_CONFIG_FILE: &str = "mailforge_config.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigSnapshot {
    pub provider: String,
    pub browser: String,
    pub headless: bool,
    pub username: String,
    pub password: String,
    pub firstname: String,
    pub lastname: String,
    pub birthdate: String,
    pub country: String,
    pub sms_service: String,
    pub getsmscode_user: String,
    pub getsmscode_token: String,
    pub smspool_token: String,
    pub fivesim_token: String,
    pub use_proxy: bool,
    pub auto_proxy: bool,
    /// One proxy per line
    pub proxies: String,
}

impl Default for ConfigSnapshot {
    fn default() -> Self {
        Self {
            provider: Provider::default().to_string(),
            browser: Browser::default().to_string(),
            headless: false,
            username: String::new(),
            password: String::new(),
            firstname: String::new(),
            lastname: String::new(),
            birthdate: String::new(),
            country: String::new(),
            sms_service: "none".to_string(),
            getsmscode_user: String::new(),
            getsmscode_token: String::new(),
            smspool_token: String::new(),
            fivesim_token: String::new(),
            use_proxy: false,
            auto_proxy: false,
            proxies: String::new(),
        }
    }
}

impl ConfigSnapshot {
    /// Build a request from the snapshot.
    ///
    /// Blank identity fields become `None`; the selected SMS service must have
    /// its credentials filled in. Proxies are only used when `use_proxy` is set.
    pub fn to_request(&self, auto_generate: bool) -> Result<AccountRequest, ConfigError> {
        let optional = |value: &str| {
            let value = value.trim();
            (!value.is_empty()).then(|| value.to_string())
        };

        let proxies = if self.use_proxy {
            let list: Vec<String> = self
                .proxies
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(str::to_string)
                .collect();
            (!list.is_empty()).then_some(list)
        } else {
            None
        };

        Ok(AccountRequest {
            provider: self.provider.parse()?,
            browser: self.browser.parse()?,
            headless: self.headless,
            username: optional(&self.username),
            password: optional(&self.password),
            first_name: optional(&self.firstname),
            last_name: optional(&self.lastname),
            birthdate: optional(&self.birthdate),
            country: optional(&self.country),
            sms: self.sms_credentials()?,
            proxies,
            auto_proxy: self.auto_proxy,
            auto_generate,
        })
    }

    /// Capture a request's values, e.g. to remember them for the next run.
    pub fn from_request(request: &AccountRequest) -> Self {
        let text = |value: &Option<String>| value.clone().unwrap_or_default();
        let mut snapshot = Self {
            provider: request.provider.to_string(),
            browser: request.browser.to_string(),
            headless: request.headless,
            username: text(&request.username),
            password: text(&request.password),
            firstname: text(&request.first_name),
            lastname: text(&request.last_name),
            birthdate: text(&request.birthdate),
            country: text(&request.country),
            use_proxy: request.proxies.is_some(),
            auto_proxy: request.auto_proxy,
            proxies: request.proxies.as_deref().unwrap_or_default().join("\n"),
            ..Self::default()
        };

        if let Some(sms) = &request.sms {
            snapshot.sms_service = sms.service().to_string();
            match sms {
                SmsCredentials::GetSmsCode { username, token } => {
                    snapshot.getsmscode_user = username.clone();
                    snapshot.getsmscode_token = token.clone();
                }
                SmsCredentials::SmsPool { token } => snapshot.smspool_token = token.clone(),
                SmsCredentials::FiveSim { token } => snapshot.fivesim_token = token.clone(),
            }
        }
        snapshot
    }

    fn sms_credentials(&self) -> Result<Option<SmsCredentials>, ConfigError> {
        let required = |service: &'static str, field: &'static str, value: &str| {
            let value = value.trim();
            if value.is_empty() {
                Err(ConfigError::MissingSmsCredential { service, field })
            } else {
                Ok(value.to_string())
            }
        };

        let credentials = match self.sms_service.trim().to_ascii_lowercase().as_str() {
            "" | "none" => return Ok(None),
            "getsmscode" => SmsCredentials::GetSmsCode {
                username: required("getsmscode", "username", &self.getsmscode_user)?,
                token: required("getsmscode", "token", &self.getsmscode_token)?,
            },
            "smspool" => SmsCredentials::SmsPool {
                token: required("smspool", "token", &self.smspool_token)?,
            },
            "5sim" => SmsCredentials::FiveSim {
                token: required("5sim", "token", &self.fivesim_token)?,
            },
            _ => {
                return Err(ParseValueError {
                    kind: "SMS service",
                    value: self.sms_service.clone(),
                }
                .into())
            }
        };
        Ok(Some(credentials))
    }
}

/// Load the snapshot at `path`. A missing file is `Ok(None)`.
pub fn load_config(path: &Path) -> Result<Option<ConfigSnapshot>, ConfigError> {
    let json = match fs::read_to_string(path) {
        Ok(json) => json,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            debug!("No config at {}", path.display());
            return Ok(None);
        }
        Err(source) => {
            return Err(ConfigError::Read {
                path: path.to_path_buf(),
                source,
            })
        }
    };
    let snapshot = serde_json::from_str(&json)?;
    info!("Loaded config from {}", path.display());
    Ok(Some(snapshot))
}

pub fn save_config(path: &Path, snapshot: &ConfigSnapshot) -> Result<(), ConfigError> {
    let json = serde_json::to_string_pretty(snapshot)?;
    write_atomic(path, &json).map_err(|source| ConfigError::Write {
        path: path.to_path_buf(),
        source,
    })?;
    info!("Saved config to {}", path.display());
    Ok(())
}
