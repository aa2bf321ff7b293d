//! Account requests and ledger records

use std::fmt;
use std::str::FromStr;

use chrono::{Local, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::error::ParseValueError;

// ============================================================================
// Choices
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    #[default]
    Gmail,
    Outlook,
    Yahoo,
}

impl Provider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::Gmail => "gmail",
            Provider::Outlook => "outlook",
            Provider::Yahoo => "yahoo",
        }
    }
}

/// Browser flavour handed to the automation engine; not interpreted here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum Browser {
    #[default]
    Chrome,
    Firefox,
    UndetectedChrome,
}

impl Browser {
    pub fn as_str(&self) -> &'static str {
        match self {
            Browser::Chrome => "chrome",
            Browser::Firefox => "firefox",
            Browser::UndetectedChrome => "undetected-chrome",
        }
    }
}

/// SMS verification service together with the credentials it needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "service", rename_all = "lowercase")]
pub enum SmsCredentials {
    GetSmsCode { username: String, token: String },
    SmsPool { token: String },
    #[serde(rename = "5sim")]
    FiveSim { token: String },
}

impl SmsCredentials {
    pub fn service(&self) -> &'static str {
        match self {
            SmsCredentials::GetSmsCode { .. } => "getsmscode",
            SmsCredentials::SmsPool { .. } => "smspool",
            SmsCredentials::FiveSim { .. } => "5sim",
        }
    }
}

macro_rules! impl_choice_str {
    ($ty:ident, $kind:literal, [$($variant:ident),+]) => {
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $ty {
            type Err = ParseValueError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let wanted = s.trim().to_ascii_lowercase();
                [$($ty::$variant),+]
                    .into_iter()
                    .find(|v| v.as_str() == wanted)
                    .ok_or_else(|| ParseValueError {
                        kind: $kind,
                        value: s.to_string(),
                    })
            }
        }
    };
}

impl_choice_str!(Provider, "provider", [Gmail, Outlook, Yahoo]);
impl_choice_str!(Browser, "browser", [Chrome, Firefox, UndetectedChrome]);

// ============================================================================
// Request
// ============================================================================

/// Input for one creation attempt. Blank identity fields count as missing.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AccountRequest {
    pub provider: Provider,
    pub browser: Browser,
    pub headless: bool,
    pub username: Option<String>,
    pub password: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    /// `YYYY-MM-DD`
    pub birthdate: Option<String>,
    pub country: Option<String>,
    pub sms: Option<SmsCredentials>,
    pub proxies: Option<Vec<String>>,
    pub auto_proxy: bool,
    pub auto_generate: bool,
}

impl AccountRequest {
    /// A request for `provider` with every identity field left to the generator.
    pub fn generated(provider: Provider) -> Self {
        Self {
            provider,
            auto_generate: true,
            ..Self::default()
        }
    }

    /// Whether any proxy use was asked for.
    pub fn use_proxy(&self) -> bool {
        self.proxies.is_some() || self.auto_proxy
    }
}

/// The value of an optional field, with blank strings treated as absent.
pub(crate) fn present(field: &Option<String>) -> Option<&str> {
    field.as_deref().filter(|value| !value.trim().is_empty())
}

// ============================================================================
// Record
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountStatus {
    Success,
    Simulated,
    /// Reported for a failed attempt; never stored in the ledger.
    Failed,
}

impl AccountStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountStatus::Success => "success",
            AccountStatus::Simulated => "simulated",
            AccountStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for AccountStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One created (or simulated) account as kept in the ledger and exported.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountRecord {
    pub provider: Provider,
    pub username: String,
    pub password: String,
    #[serde(rename = "firstname")]
    pub first_name: String,
    #[serde(rename = "lastname")]
    pub last_name: String,
    pub birthdate: String,
    pub country: String,
    #[serde(with = "timestamp")]
    pub created_at: NaiveDateTime,
    pub status: AccountStatus,
}

/// Local wall-clock time truncated to whole seconds, the precision exports keep.
pub fn now_timestamp() -> NaiveDateTime {
    let now = Local::now().naive_local();
    now.with_nanosecond(0).unwrap_or(now)
}

/// `YYYY-MM-DD HH:MM:SS` (de)serialization for record timestamps.
pub mod timestamp {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub const FORMAT: &str = "%Y-%m-%d %H:%M:%S";

    pub fn serialize<S: Serializer>(value: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&value.format(FORMAT))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDateTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        NaiveDateTime::parse_from_str(&raw, FORMAT).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_choice_parsing() {
        assert_eq!("Outlook".parse::<Provider>().unwrap(), Provider::Outlook);
        assert_eq!(
            " undetected-chrome ".parse::<Browser>().unwrap(),
            Browser::UndetectedChrome
        );
        let err = "hotmail".parse::<Provider>().unwrap_err();
        assert_eq!(err.kind, "provider");
        assert_eq!(err.value, "hotmail");
    }

    #[test]
    fn test_present_treats_blank_as_missing() {
        assert_eq!(present(&Some("  ".into())), None);
        assert_eq!(present(&None), None);
        assert_eq!(present(&Some("jane".into())), Some("jane"));
    }

    #[test]
    fn test_record_field_names() {
        let record = AccountRecord {
            provider: Provider::Yahoo,
            username: "u".into(),
            password: "p".into(),
            first_name: "Jane".into(),
            last_name: "Doe".into(),
            birthdate: "1990-05-01".into(),
            country: "Canada".into(),
            created_at: NaiveDateTime::parse_from_str("2024-03-02 10:11:12", timestamp::FORMAT)
                .unwrap(),
            status: AccountStatus::Simulated,
        };

        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["provider"], "yahoo");
        assert_eq!(value["firstname"], "Jane");
        assert_eq!(value["lastname"], "Doe");
        assert_eq!(value["created_at"], "2024-03-02 10:11:12");
        assert_eq!(value["status"], "simulated");
    }

    #[test]
    fn test_status_names() {
        assert_eq!(serde_json::to_value(AccountStatus::Failed).unwrap(), "failed");
        assert_eq!(AccountStatus::Success.to_string(), "success");
    }

    #[test]
    fn test_use_proxy() {
        let mut request = AccountRequest::generated(Provider::Gmail);
        assert!(!request.use_proxy());
        request.auto_proxy = true;
        assert!(request.use_proxy());
    }
}
