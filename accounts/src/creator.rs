//! Account creator - fills requests, dispatches them and owns the ledger

use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use rand::Rng;
use rayon::prelude::*;
use tracing::{info, warn};

use crate::backend::{AccountBackend, CreatedCredentials, SimulatedCreator};
use crate::error::{ExportError, GeneratorError};
use crate::export::{self, ExportFormat};
use crate::generator::{IdentityGenerator, DEFAULT_MAX_AGE, DEFAULT_MIN_AGE, DEFAULT_PASSWORD_LENGTH};
use crate::names::NameSource;
use crate::records::{now_timestamp, present, AccountRecord, AccountRequest};

pub struct AccountCreator {
    names: Arc<NameSource>,
    backend: Box<dyn AccountBackend>,
    ledger: Mutex<Vec<AccountRecord>>,
}

impl AccountCreator {
    pub fn new(names: Arc<NameSource>, backend: impl AccountBackend + 'static) -> Self {
        info!("Account creator using {} backend", backend.name());
        Self {
            names,
            backend: Box::new(backend),
            ledger: Mutex::new(Vec::new()),
        }
    }

    /// Creator that only produces `simulated` records.
    pub fn simulated(names: Arc<NameSource>) -> Self {
        Self::new(names, SimulatedCreator)
    }

    pub fn names(&self) -> &NameSource {
        &self.names
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    /// Make one creation attempt.
    ///
    /// Returns `None` when the backend fails or produces nothing; the ledger
    /// only grows on success.
    pub fn create_account(&self, request: &AccountRequest) -> Option<AccountRecord> {
        self.create_account_with_rng(request, &mut rand::thread_rng())
    }

    pub fn create_account_with_rng<R: Rng + ?Sized>(
        &self,
        request: &AccountRequest,
        rng: &mut R,
    ) -> Option<AccountRecord> {
        let mut request = request.clone();
        if request.auto_generate {
            let mut generator = IdentityGenerator::new(&self.names, rng);
            if let Err(err) = fill_missing(&mut request, &mut generator) {
                warn!("Could not generate identity: {}", err);
                return None;
            }
        }

        let created = match self.backend.create(&request) {
            Ok(Some(created)) => created,
            Ok(None) => {
                warn!("{} account creation returned no result", request.provider);
                return None;
            }
            Err(err) => {
                warn!("Error creating {} account: {}", request.provider, err);
                return None;
            }
        };

        let record = build_record(&request, created);
        self.lock_ledger().push(record.clone());
        Some(record)
    }

    /// Run `count` independent attempts with the same template.
    ///
    /// Failed attempts are skipped, so the result may be shorter than `count`.
    pub fn batch_create(&self, count: usize, template: &AccountRequest) -> Vec<AccountRecord> {
        let mut created = Vec::with_capacity(count);
        for attempt in 1..=count {
            info!("Creating account {}/{}...", attempt, count);
            match self.create_account(template) {
                Some(record) => {
                    info!("Successfully created: {}", record.username);
                    created.push(record);
                }
                None => warn!("Failed to create account {}", attempt),
            }
        }
        log_tally(count, created.len());
        created
    }

    /// Like [`batch_create`](Self::batch_create) but spreads attempts over the
    /// rayon pool. Returned records keep attempt order; ledger order follows
    /// completion order.
    pub fn batch_create_parallel(&self, count: usize, template: &AccountRequest) -> Vec<AccountRecord> {
        let created: Vec<AccountRecord> = (0..count)
            .into_par_iter()
            .filter_map(|_| self.create_account(template))
            .collect();
        log_tally(count, created.len());
        created
    }

    /// Snapshot of the ledger.
    pub fn accounts(&self) -> Vec<AccountRecord> {
        self.lock_ledger().clone()
    }

    pub fn account_count(&self) -> usize {
        self.lock_ledger().len()
    }

    pub fn clear_ledger(&self) {
        let mut ledger = self.lock_ledger();
        info!("Clearing {} accounts from ledger", ledger.len());
        ledger.clear();
    }

    /// Write the ledger to `path`; `false` if it is empty or the write fails.
    pub fn export_accounts(&self, path: impl AsRef<Path>, format: ExportFormat) -> bool {
        let path = path.as_ref();
        match self.try_export_accounts(path, format) {
            Ok(count) => {
                info!("{} accounts exported to {}", count, path.display());
                true
            }
            Err(err) => {
                warn!("Error exporting accounts: {}", err);
                false
            }
        }
    }

    /// Write the ledger to `path`, returning how many records were written.
    pub fn try_export_accounts(&self, path: &Path, format: ExportFormat) -> Result<usize, ExportError> {
        let accounts = self.accounts();
        export::write_accounts(path, &accounts, format)?;
        Ok(accounts.len())
    }

    fn lock_ledger(&self) -> MutexGuard<'_, Vec<AccountRecord>> {
        self.ledger.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Fill every blank identity field. Usernames see the final names.
fn fill_missing<R: Rng + ?Sized>(
    request: &mut AccountRequest,
    generator: &mut IdentityGenerator<'_, R>,
) -> Result<(), GeneratorError> {
    if present(&request.first_name).is_none() {
        request.first_name = Some(generator.first_name());
    }
    if present(&request.last_name).is_none() {
        request.last_name = Some(generator.last_name());
    }
    if present(&request.birthdate).is_none() {
        request.birthdate = Some(generator.birthday(DEFAULT_MIN_AGE, DEFAULT_MAX_AGE)?);
    }
    if present(&request.country).is_none() {
        request.country = Some(generator.country());
    }
    if present(&request.username).is_none() {
        request.username = Some(generator.username(
            request.first_name.as_deref(),
            request.last_name.as_deref(),
        ));
    }
    if present(&request.password).is_none() {
        request.password = Some(generator.password(DEFAULT_PASSWORD_LENGTH)?);
    }
    Ok(())
}

fn build_record(request: &AccountRequest, created: CreatedCredentials) -> AccountRecord {
    let field = |value: &Option<String>| value.clone().unwrap_or_default();
    AccountRecord {
        provider: request.provider,
        username: created.username,
        password: created.password,
        first_name: field(&request.first_name),
        last_name: field(&request.last_name),
        birthdate: field(&request.birthdate),
        country: field(&request.country),
        created_at: now_timestamp(),
        status: created.status,
    }
}

fn log_tally(requested: usize, created: usize) {
    let failed = requested - created;
    if failed == 0 {
        info!("Batch complete: {}/{} accounts created", created, requested);
    } else {
        warn!(
            "Batch complete: {}/{} accounts created, {} failed",
            created, requested, failed
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{AutomationEngine, EngineCredentials, EngineParams, LiveCreator};
    use crate::error::BackendError;
    use crate::records::{AccountStatus, Provider};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Fails the listed 1-based attempts, succeeds otherwise.
    struct FlakyEngine {
        attempts: AtomicUsize,
        fail_on: Vec<usize>,
    }

    impl AutomationEngine for FlakyEngine {
        fn create_account(&self, params: &EngineParams) -> Result<Option<EngineCredentials>, BackendError> {
            let attempt = self.attempts.fetch_add(1, Ordering::SeqCst) + 1;
            if self.fail_on.contains(&attempt) {
                return Err(BackendError::Engine(format!("attempt {attempt} blocked")));
            }
            Ok(Some(EngineCredentials {
                username: params.username.clone(),
                password: None,
            }))
        }
    }

    struct EmptyEngine;

    impl AutomationEngine for EmptyEngine {
        fn create_account(&self, _params: &EngineParams) -> Result<Option<EngineCredentials>, BackendError> {
            Ok(None)
        }
    }

    fn explicit_request() -> AccountRequest {
        AccountRequest {
            provider: Provider::Gmail,
            username: Some("u".into()),
            password: Some("p".into()),
            first_name: Some("Jane".into()),
            last_name: Some("Doe".into()),
            birthdate: Some("1990-05-01".into()),
            country: Some("Canada".into()),
            auto_generate: false,
            ..AccountRequest::default()
        }
    }

    #[test]
    fn test_simulated_explicit_fields() {
        let creator = AccountCreator::simulated(Arc::new(NameSource::builtin()));

        let record = creator.create_account(&explicit_request()).unwrap();

        assert_eq!(record.status, AccountStatus::Simulated);
        assert_eq!(record.provider, Provider::Gmail);
        assert_eq!(record.username, "u");
        assert_eq!(record.password, "p");
        assert_eq!(record.first_name, "Jane");
        assert_eq!(record.last_name, "Doe");
        assert_eq!(record.birthdate, "1990-05-01");
        assert_eq!(record.country, "Canada");
        assert_eq!(creator.account_count(), 1);
    }

    #[test]
    fn test_auto_generate_fills_only_missing() {
        let names = Arc::new(NameSource::builtin());
        let creator = AccountCreator::simulated(Arc::clone(&names));
        let mut rng = ChaCha8Rng::seed_from_u64(21);

        let mut request = AccountRequest::generated(Provider::Outlook);
        request.first_name = Some("Jane".into());
        request.country = Some("  ".into());

        let record = creator.create_account_with_rng(&request, &mut rng).unwrap();

        assert_eq!(record.first_name, "Jane");
        assert!(names.last_names().contains(&record.last_name));
        assert!(names.countries().contains(&record.country.as_str()));
        assert!(record.username.starts_with('j'));
        assert_eq!(record.password.len(), DEFAULT_PASSWORD_LENGTH);
        assert_eq!(record.birthdate.len(), 10);
    }

    #[test]
    fn test_without_auto_generate_missing_fields_stay_blank() {
        let creator = AccountCreator::simulated(Arc::new(NameSource::builtin()));

        let record = creator
            .create_account(&AccountRequest::default())
            .unwrap();

        assert_eq!(record.username, "");
        assert_eq!(record.first_name, "");
        assert_eq!(record.status, AccountStatus::Simulated);
    }

    #[test]
    fn test_batch_skips_failed_attempts() {
        let engine = FlakyEngine {
            attempts: AtomicUsize::new(0),
            fail_on: vec![2, 4],
        };
        let creator = AccountCreator::new(Arc::new(NameSource::builtin()), LiveCreator::new(engine));
        let before = creator.account_count();

        let created = creator.batch_create(5, &AccountRequest::generated(Provider::Gmail));

        assert_eq!(created.len(), 3);
        assert_eq!(creator.account_count(), before + 3);
        assert!(created.iter().all(|r| r.status == AccountStatus::Success));
    }

    #[test]
    fn test_empty_result_leaves_ledger_alone() {
        let creator = AccountCreator::new(Arc::new(NameSource::builtin()), LiveCreator::new(EmptyEngine));

        assert!(creator.create_account(&explicit_request()).is_none());
        assert!(creator.batch_create(3, &explicit_request()).is_empty());
        assert_eq!(creator.account_count(), 0);
    }

    #[test]
    fn test_batch_generates_distinct_identities() {
        let creator = AccountCreator::simulated(Arc::new(NameSource::builtin()));

        let created = creator.batch_create(10, &AccountRequest::generated(Provider::Yahoo));

        assert_eq!(created.len(), 10);
        let mut passwords: Vec<&str> = created.iter().map(|r| r.password.as_str()).collect();
        passwords.sort_unstable();
        passwords.dedup();
        assert_eq!(passwords.len(), 10);
    }

    #[test]
    fn test_parallel_batch_appends_every_success() {
        let engine = FlakyEngine {
            attempts: AtomicUsize::new(0),
            fail_on: vec![1, 7, 13],
        };
        let creator = AccountCreator::new(Arc::new(NameSource::builtin()), LiveCreator::new(engine));

        let created = creator.batch_create_parallel(20, &AccountRequest::generated(Provider::Gmail));

        assert_eq!(created.len(), 17);
        assert_eq!(creator.account_count(), 17);
    }

    #[test]
    fn test_export_ledger() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("accounts.json");
        let creator = AccountCreator::simulated(Arc::new(NameSource::builtin()));

        assert!(!creator.export_accounts(&path, ExportFormat::Structured));
        assert!(!path.exists());

        creator.batch_create(3, &AccountRequest::generated(Provider::Gmail));
        assert!(creator.export_accounts(&path, ExportFormat::Structured));
        assert_eq!(crate::export::read_accounts(&path).unwrap(), creator.accounts());
    }

    #[test]
    fn test_clear_ledger() {
        let creator = AccountCreator::simulated(Arc::new(NameSource::builtin()));
        creator.batch_create(2, &explicit_request());
        assert_eq!(creator.accounts().len(), 2);

        creator.clear_ledger();
        assert_eq!(creator.account_count(), 0);
    }
}
