//! Command execution.

use std::path::Path;
use std::sync::Arc;

use anyhow::Context as _;

use oidcache_auth::storage::SqliteStore;
use oidcache_auth::{BridgeConfig, CacheRegistry, CacheSessionBackend, UserResolver};
use oidcache_core::auth::ClaimSet;
use oidcache_core::session::{RsaKeyMaterial, SessionBackend, SessionValue};
use oidcache_core::storage::SessionBinding;

use crate::cli::session::SessionAction;
use crate::cli::user::UserAction;
use crate::cli::{Commands, OutputFormat};
use crate::output::{
    format_output, pretty, AccountView, Presence, SessionList, SessionView,
};

/// Everything a command needs: configuration, live cache slots, and the
/// SQLite store for accounts and the session index.
#[derive(Debug, Clone)]
pub struct Context {
    pub config: BridgeConfig,
    pub caches: CacheRegistry,
    pub store: SqliteStore,
}

impl Context {
    pub fn new(config: BridgeConfig, caches: CacheRegistry, store: SqliteStore) -> Self {
        Self {
            config,
            caches,
            store,
        }
    }

    /// Loads configuration from the environment, connects every cache slot
    /// and opens the SQLite database, creating its tables if missing.
    pub async fn open(sqlite_path: &Path) -> anyhow::Result<Self> {
        let config = BridgeConfig::from_env().context("failed to load configuration")?;
        let caches = CacheRegistry::from_config(&config)
            .await
            .context("failed to connect cache slots")?;
        let store = SqliteStore::connect(sqlite_path)
            .await
            .with_context(|| format!("failed to open {}", sqlite_path.display()))?;
        store
            .migrate()
            .await
            .with_context(|| format!("failed to migrate {}", sqlite_path.display()))?;

        tracing::debug!(
            providers = config.providers.len(),
            slots = caches.len(),
            "Context ready"
        );

        Ok(Self::new(config, caches, store))
    }

    fn session_backend(&self, provider: &str) -> anyhow::Result<CacheSessionBackend> {
        let backend = CacheSessionBackend::new(
            provider,
            &self.config,
            &self.caches,
            Arc::new(self.store.clone()),
        )?;
        Ok(backend)
    }
}

/// Runs one command and returns what should be printed.
pub async fn execute(
    ctx: &Context,
    provider: &str,
    command: Commands,
    format: OutputFormat,
) -> anyhow::Result<String> {
    match command {
        Commands::Session(cmd) => execute_session(ctx, provider, cmd.action, format).await,
        Commands::User(cmd) => execute_user(ctx, cmd.action, format).await,
        Commands::Migrate => {
            ctx.store.migrate().await?;
            tracing::info!("Database migrated");
            Ok("Database migrated".to_string())
        }
    }
}

async fn execute_session(
    ctx: &Context,
    provider: &str,
    action: SessionAction,
    format: OutputFormat,
) -> anyhow::Result<String> {
    match action {
        SessionAction::Set {
            sid,
            texts,
            flags,
            rsa_key_pem,
        } => {
            let mut value = SessionValue::new();
            for (name, text) in texts {
                value.insert(name, text);
            }
            for (name, flag) in flags {
                value.insert(name, flag);
            }
            if let Some(path) = rsa_key_pem {
                let pem = tokio::fs::read_to_string(&path)
                    .await
                    .with_context(|| format!("failed to read {}", path.display()))?;
                value.rsa_key = Some(RsaKeyMaterial::from_pem(&pem)?);
            }

            ctx.session_backend(provider)?.set(&sid, &value).await?;
            Ok(format!("Stored session {sid}"))
        }
        SessionAction::Get { sid } => {
            let value = ctx.session_backend(provider)?.get(&sid).await?;
            let view = SessionView::new(sid, &value);
            Ok(match format {
                OutputFormat::Json => format_output(&view, format),
                OutputFormat::Pretty => pretty::format_session(&view),
            })
        }
        SessionAction::Delete { sid } => {
            ctx.session_backend(provider)?.delete(&sid).await?;
            Ok(format!("Deleted session {sid}"))
        }
        SessionAction::Contains { sid } => {
            let present = ctx.session_backend(provider)?.contains(&sid).await?;
            let presence = Presence { sid, present };
            Ok(match format {
                OutputFormat::Json => format_output(&presence, format),
                OutputFormat::Pretty => pretty::format_presence(&presence),
            })
        }
        SessionAction::ByUid { uid } => {
            let sids = ctx.session_backend(provider)?.get_by_uid(&uid).await?;
            Ok(render_sessions(SessionList { sids }, format))
        }
        SessionAction::BySub { sub } => {
            let sids = ctx.session_backend(provider)?.get_by_sub(&sub).await?;
            Ok(render_sessions(SessionList { sids }, format))
        }
        SessionAction::Bind { sid, uid, sub } => {
            ctx.store
                .bind_session(&SessionBinding::new(&sid, uid, sub))
                .await?;
            Ok(format!("Bound session {sid}"))
        }
    }
}

async fn execute_user(
    ctx: &Context,
    action: UserAction,
    format: OutputFormat,
) -> anyhow::Result<String> {
    match action {
        UserAction::Resolve { email } => {
            let resolver = UserResolver::new(Arc::new(ctx.store.clone()));
            let resolved = resolver
                .resolve(&ClaimSet::new().with("email", email))
                .await?;
            let view = AccountView::from(&resolved);
            Ok(match format {
                OutputFormat::Json => format_output(&view, format),
                OutputFormat::Pretty => pretty::format_account(&view),
            })
        }
    }
}

fn render_sessions(list: SessionList, format: OutputFormat) -> String {
    match format {
        OutputFormat::Json => format_output(&list, format),
        OutputFormat::Pretty => pretty::format_sessions(&list),
    }
}
