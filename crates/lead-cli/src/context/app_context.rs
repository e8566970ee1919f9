use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use lead_auth::{AuthClient, AuthSession};
use lead_config::{LeadsConfig, PROJECT_DIR};
use lead_core::identity::AuthIdentity;
use lead_db::LeadStore;
use lead_engine::{HistoryBook, Processor, SignedIn};
use lead_remote::RemoteClients;

/// Shared application resources initialized once at startup.
pub struct AppContext {
    pub config: LeadsConfig,
    pub store: LeadStore,
    pub services: RemoteClients,
    pub auth: Option<AuthClient>,
    pub identity: Option<AuthIdentity>,
    pub book: HistoryBook,
}

/// Borrowed view of the context for commands that run lookups and record
/// history in the same breath.
pub struct Workbench<'a> {
    pub processor: Processor<'a>,
    pub owner: Option<SignedIn<'a>>,
    pub book: &'a mut HistoryBook,
}

impl AppContext {
    /// Open the store, restore the signed-in session and load its history.
    ///
    /// Auth and history problems are logged and leave the context signed
    /// out; only a store that cannot be opened is fatal.
    pub async fn init(project_root: &Path, config: LeadsConfig) -> anyhow::Result<Self> {
        let store = open_store(&config, project_root).await?;
        let services =
            RemoteClients::from_config(&config).context("failed to build lookup clients")?;

        let auth = if config.auth.is_configured() {
            match AuthClient::new(&config.auth) {
                Ok(client) => Some(client),
                Err(error) => {
                    tracing::warn!(%error, "auth client unavailable; running signed out");
                    None
                }
            }
        } else {
            None
        };

        let session = match &auth {
            Some(client) => lead_auth::resolve_session(client)
                .await
                .unwrap_or_else(|error| {
                    tracing::warn!(%error, "could not restore session; running signed out");
                    None
                }),
            None => None,
        };
        let identity = session.as_ref().map(AuthSession::to_identity);
        if let Some(identity) = &identity {
            tracing::debug!(user_id = %identity.user_id, "signed in");
        }

        let mut book = HistoryBook::from_config(&config.general);
        if let Some(identity) = &identity {
            let owner = SignedIn {
                store: &store,
                user_id: &identity.user_id,
            };
            if let Err(error) = book.load(owner, config.general.history_fetch_limit).await {
                tracing::warn!(%error, "failed to load history");
            }
        }

        Ok(Self {
            config,
            store,
            services,
            auth,
            identity,
            book,
        })
    }

    /// The store, only when someone is signed in.
    #[must_use]
    pub fn signed_in_store(&self) -> Option<&LeadStore> {
        self.identity.as_ref().map(|_| &self.store)
    }

    pub fn workbench(&mut self) -> Workbench<'_> {
        let Self {
            config,
            store,
            services,
            identity,
            book,
            ..
        } = self;
        let owner = identity.as_ref().map(|identity| SignedIn {
            store: &*store,
            user_id: &identity.user_id,
        });
        let processor = Processor::new(&*services)
            .with_store(owner.map(|o| o.store))
            .with_row_delay(Duration::from_millis(config.general.row_delay_ms));
        Workbench {
            processor,
            owner,
            book,
        }
    }

    /// Sign out: revoke and clear the stored session, then forget the
    /// in-memory identity and history.
    pub async fn teardown(&mut self) -> anyhow::Result<()> {
        lead_auth::logout(self.auth.as_ref())
            .await
            .context("failed to clear stored session")?;
        self.identity = None;
        self.book.clear();
        Ok(())
    }
}

/// Open the configured store: remote when a URL is set, else the project's
/// local database file.
pub async fn open_store(config: &LeadsConfig, project_root: &Path) -> anyhow::Result<LeadStore> {
    let store = if config.store.is_remote() {
        LeadStore::open_remote(&config.store.url, &config.store.auth_token)
            .await
            .context("failed to open remote lead store")?
    } else {
        let path = config.local_store_path(project_root);
        if let Some(parent) = path.parent()
            && parent.ends_with(PROJECT_DIR)
        {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        LeadStore::open_local(&path.to_string_lossy())
            .await
            .with_context(|| format!("failed to open lead store at {}", path.display()))?
    };
    Ok(store.with_cache_scan_limit(config.general.cache_scan_limit))
}
