//! Wiring: settings, credential store, session guard and backend services

use anyhow::{bail, Context, Result};
use catalyst_api::{ActivityKind, LoginRedirect};
use catalyst_client::{
    ApiClient, AuthService, CustomerService, Notification, Notifier, Severity, TicketService,
    UserService,
};
use catalyst_config::{load_config_or_default, Settings};
use catalyst_core::{lock_guard, RestoreOutcome, SessionEvent, SessionGuard, SharedGuard};
use catalyst_store::{SqliteStore, Store};
use catalyst_util::DATABASE_FILENAME;
use chrono::{DateTime, Local};
use std::sync::Arc;
use tracing::info;

use crate::cli::Args;

/// Prints toasts to stderr so they never mix with table output
#[derive(Debug, Default)]
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, notification: Notification) {
        match notification.severity {
            Severity::Success => eprintln!("✓ {}", notification.message),
            Severity::Error => eprintln!("✗ {}", notification.message),
        }
    }
}

pub struct Console {
    pub settings: Settings,
    pub store: Arc<dyn Store>,
    pub guard: SharedGuard,
    pub auth: AuthService,
    pub users: UserService,
    pub customers: CustomerService,
    pub tickets: TicketService,
}

impl Console {
    pub fn open(args: &Args) -> Result<Self> {
        let mut settings = load_config_or_default(&args.config)
            .with_context(|| format!("Failed to load config from {:?}", args.config))?;

        if let Some(url) = &args.api_url {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                bail!("API URL must start with http:// or https://, got {:?}", url);
            }
            settings.api.base_url = url.clone();
        }
        if let Some(dir) = &args.data_dir {
            settings.storage.data_dir = dir.clone();
        }

        info!(
            config_path = %args.config.display(),
            base_url = %settings.api.base_url,
            "Configuration loaded"
        );

        let data_dir = settings.storage.data_dir.clone();
        std::fs::create_dir_all(&data_dir)
            .with_context(|| format!("Failed to create data directory {:?}", data_dir))?;

        let db_path = data_dir.join(DATABASE_FILENAME);
        let store: Arc<dyn Store> = Arc::new(
            SqliteStore::open(&db_path)
                .with_context(|| format!("Failed to open database {:?}", db_path))?,
        );

        info!(db_path = %db_path.display(), "Store initialized");

        let guard = SessionGuard::new(settings.session, store.clone()).into_shared();
        let client = ApiClient::from_settings(&settings.api, guard.clone())
            .context("Failed to build HTTP client")?
            .with_notifier(Arc::new(ConsoleNotifier));

        Ok(Self::with_client(settings, store, client))
    }

    pub fn with_client(settings: Settings, store: Arc<dyn Store>, client: ApiClient) -> Self {
        Self {
            settings,
            store,
            guard: client.guard().clone(),
            auth: AuthService::new(client.clone()),
            users: UserService::new(client.clone()),
            customers: CustomerService::new(client.clone()),
            tickets: TicketService::new(client),
        }
    }

    /// Pick up the persisted session and count the invocation as a key press
    pub fn begin(&self) -> Result<RestoreOutcome> {
        let now = catalyst_util::now();
        let mut guard = lock_guard(&self.guard)?;
        let outcome = guard.restore(now);
        guard.record_activity(ActivityKind::KeyPress, now);
        Ok(outcome)
    }

    pub fn record_activity(&self, kind: ActivityKind) -> Result<Option<SessionEvent>> {
        Ok(lock_guard(&self.guard)?.record_activity(kind, catalyst_util::now()))
    }

    pub fn tick(&self) -> Result<Vec<SessionEvent>> {
        Ok(lock_guard(&self.guard)?.tick(catalyst_util::now()))
    }

    pub fn next_deadline(&self) -> Result<Option<DateTime<Local>>> {
        Ok(lock_guard(&self.guard)?.next_deadline())
    }

    pub fn is_logged_in(&self) -> bool {
        self.auth.is_logged_in()
    }

    pub fn take_redirect(&self) -> Result<Option<LoginRedirect>> {
        Ok(lock_guard(&self.guard)?.take_redirect())
    }

    /// Tell the user the session ended and where they are being sent.
    /// Returns whether there was anything to report.
    pub fn report_redirect(&self) -> Result<bool> {
        let Some(redirect) = self.take_redirect()? else {
            return Ok(false);
        };

        if let Some(reason) = redirect.reason {
            eprintln!("{}", reason.message());
        }
        eprintln!("Redirecting to {}", redirect);
        Ok(true)
    }
}
