//! Mailforge account engine
//!
//! Synthetic identity generation and the account ledger behind the mailforge
//! front-ends. The browser automation that actually registers accounts is an
//! external [`AutomationEngine`]; without one, accounts are simulated.

pub mod backend;
pub mod batch_runner;
pub mod config;
pub mod creator;
pub mod error;
pub mod export;
pub mod generator;
pub mod names;
pub mod records;

pub use backend::{
    AccountBackend, AutomationEngine, CreatedCredentials, EngineCredentials, EngineParams,
    LiveCreator, SimulatedCreator,
};
pub use batch_runner::{BatchProgress, BatchRunner};
pub use config::{load_config, save_config, ConfigSnapshot};
pub use creator::AccountCreator;
pub use error::{BackendError, ConfigError, ExportError, GeneratorError, NameSourceError};
pub use export::{read_accounts, ExportFormat};
pub use generator::{Gender, Identity, IdentityGenerator, UsernameTemplate};
pub use names::{NameFiles, NameSource};
pub use records::{AccountRecord, AccountRequest, AccountStatus, Browser, Provider, SmsCredentials};
