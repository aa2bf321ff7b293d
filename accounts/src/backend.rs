//! Account-creation backends
//!
//! [`AccountCreator`](crate::creator::AccountCreator) is built with exactly one
//! backend: [`SimulatedCreator`] when no automation engine is installed, or
//! [`LiveCreator`] wrapping an [`AutomationEngine`] that drives the real
//! sign-up flow outside this crate.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;
use tracing::{debug, info};

use crate::error::BackendError;
use crate::records::{present, AccountRequest, AccountStatus, Browser, Provider, SmsCredentials};

/// Credentials a backend reports for a created account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedCredentials {
    pub username: String,
    pub password: String,
    pub status: AccountStatus,
}

/// One way of turning a filled-in request into an account.
///
/// `Ok(None)` means the attempt produced nothing; neither outcome is retried.
pub trait AccountBackend: Send + Sync {
    fn name(&self) -> &'static str;

    fn create(&self, request: &AccountRequest) -> Result<Option<CreatedCredentials>, BackendError>;
}

// ============================================================================
// Simulation
// ============================================================================

/// Echoes the request back as a `simulated` account. Never fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimulatedCreator;

impl AccountBackend for SimulatedCreator {
    fn name(&self) -> &'static str {
        "simulated"
    }

    fn create(&self, request: &AccountRequest) -> Result<Option<CreatedCredentials>, BackendError> {
        let username = request.username.clone().unwrap_or_default();
        info!(
            "[SIMULATION] Would create {} account '{}' for {} {}",
            request.provider,
            username,
            request.first_name.as_deref().unwrap_or_default(),
            request.last_name.as_deref().unwrap_or_default(),
        );
        Ok(Some(CreatedCredentials {
            username,
            password: request.password.clone().unwrap_or_default(),
            status: AccountStatus::Simulated,
        }))
    }
}

// ============================================================================
// External engine
// ============================================================================

/// SMS key in the shape the engine expects for each service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum SmsKey {
    Account { username: String, token: String },
    Token(String),
}

impl From<&SmsCredentials> for SmsKey {
    fn from(credentials: &SmsCredentials) -> Self {
        match credentials {
            SmsCredentials::GetSmsCode { username, token } => SmsKey::Account {
                username: username.clone(),
                token: token.clone(),
            },
            SmsCredentials::SmsPool { token } | SmsCredentials::FiveSim { token } => {
                SmsKey::Token(token.clone())
            }
        }
    }
}

/// Parameters handed to an [`AutomationEngine`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EngineParams {
    pub provider: Provider,
    pub browser: Browser,
    pub headless: bool,
    pub username: Option<String>,
    pub password: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    /// `MM-DD-YYYY`
    pub birthdate: Option<String>,
    /// Only outlook sign-up asks for a country.
    pub country: Option<String>,
    pub hotmail: bool,
    pub sms_keys: BTreeMap<&'static str, SmsKey>,
    pub proxies: Option<Vec<String>>,
    pub auto_proxy: bool,
    pub use_proxy: bool,
}

impl EngineParams {
    pub fn from_request(request: &AccountRequest) -> Self {
        let owned = |field: &Option<String>| present(field).map(str::to_string);

        let mut sms_keys = BTreeMap::new();
        if let Some(sms) = &request.sms {
            sms_keys.insert(sms.service(), SmsKey::from(sms));
        }

        let country = match request.provider {
            Provider::Outlook => owned(&request.country),
            Provider::Gmail | Provider::Yahoo => None,
        };

        Self {
            provider: request.provider,
            browser: request.browser,
            headless: request.headless,
            username: owned(&request.username),
            password: owned(&request.password),
            first_name: owned(&request.first_name),
            last_name: owned(&request.last_name),
            birthdate: present(&request.birthdate).map(engine_date),
            country,
            hotmail: false,
            sms_keys,
            proxies: request.proxies.clone(),
            auto_proxy: request.auto_proxy,
            use_proxy: request.use_proxy(),
        }
    }
}

/// Convert `YYYY-MM-DD` to the engine's `MM-DD-YYYY`; anything else passes through.
pub fn engine_date(birthdate: &str) -> String {
    match NaiveDate::parse_from_str(birthdate.trim(), "%Y-%m-%d") {
        Ok(date) => date.format("%m-%d-%Y").to_string(),
        Err(_) => birthdate.to_string(),
    }
}

/// What the engine hands back. Either field may be missing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EngineCredentials {
    pub username: Option<String>,
    pub password: Option<String>,
}

/// The external browser-automation capability.
///
/// Calls may block for as long as the sign-up flow takes.
pub trait AutomationEngine: Send + Sync {
    fn create_account(&self, params: &EngineParams) -> Result<Option<EngineCredentials>, BackendError>;
}

/// Backend that forwards every request to an [`AutomationEngine`].
#[derive(Debug, Clone)]
pub struct LiveCreator<E> {
    engine: E,
}

impl<E: AutomationEngine> LiveCreator<E> {
    pub fn new(engine: E) -> Self {
        Self { engine }
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }
}

impl<E: AutomationEngine> AccountBackend for LiveCreator<E> {
    fn name(&self) -> &'static str {
        "live"
    }

    fn create(&self, request: &AccountRequest) -> Result<Option<CreatedCredentials>, BackendError> {
        let params = EngineParams::from_request(request);
        debug!(
            "Dispatching {} sign-up via {} (proxy: {})",
            params.provider, params.browser, params.use_proxy
        );

        let Some(returned) = self.engine.create_account(&params)? else {
            return Ok(None);
        };

        // The provider may have altered the credentials to avoid a collision.
        let prefer = |returned: Option<String>, requested: &Option<String>| {
            returned
                .filter(|value| !value.trim().is_empty())
                .or_else(|| requested.clone())
                .unwrap_or_default()
        };

        Ok(Some(CreatedCredentials {
            username: prefer(returned.username, &request.username),
            password: prefer(returned.password, &request.password),
            status: AccountStatus::Success,
        }))
    }
}
