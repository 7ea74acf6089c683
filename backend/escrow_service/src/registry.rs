//! Single-writer host for the escrow registry.
//!
//! Every mutation goes through [`RegistryState::execute`], which holds the
//! registry lock across apply-and-persist so the in-memory registry and the
//! SQLite command log never diverge.

use ops_escrow::{Address, Command, EscrowRegistry, Receipt, RegistryConfig};
use sqlx::SqlitePool;
use tokio::sync::Mutex;
use tracing::{debug, error, info};

use crate::db;
use crate::errors::{Result, ServiceError};
use crate::events::NewEvent;

pub struct RegistryState {
    pub pool: SqlitePool,
    registry: Mutex<EscrowRegistry>,
}

impl RegistryState {
    /// Build a fresh registry and replay the command log on top of it.
    ///
    /// The config is pinned in the database on first start. Later starts
    /// must supply the same config, since replaying the log under different
    /// royalty or custody settings would rewrite past payouts.
    pub async fn restore(config: RegistryConfig, pool: SqlitePool) -> Result<Self> {
        match db::load_registry_config(&pool).await? {
            Some(stored) if stored != config => {
                return Err(ServiceError::ConfigMismatch {
                    stored: serde_json::to_string(&stored)?,
                    configured: serde_json::to_string(&config)?,
                });
            }
            Some(_) => {}
            None => db::save_registry_config(&pool, &config).await?,
        }
        let mut registry = EscrowRegistry::new(config)?;

        let log = db::load_commands(&pool).await?;
        for record in &log {
            let command: Command = serde_json::from_str(&record.payload)?;
            let caller = Address::new(record.caller.clone());
            registry
                .apply(&caller, &command)
                .map_err(|source| ServiceError::Replay {
                    seq: record.seq,
                    source,
                })?;
        }
        info!(
            commands = log.len(),
            projects = registry.total_supply(),
            "Registry restored from command log"
        );

        Ok(RegistryState {
            pool,
            registry: Mutex::new(registry),
        })
    }

    /// Apply `command` for `caller` and log it. A command the registry
    /// rejects is not logged.
    pub async fn execute(&self, caller: &Address, command: Command) -> Result<Receipt> {
        let mut registry = self.registry.lock().await;
        let snapshot = registry.clone();

        let receipt = match registry.apply(caller, &command) {
            Ok(receipt) => receipt,
            Err(e) => {
                debug!(command = command.name(), %caller, error = %e, "command rejected");
                return Err(e.into());
            }
        };

        let persisted = async {
            let rows = receipt
                .events
                .iter()
                .map(NewEvent::from_event)
                .collect::<Result<Vec<_>>>()?;
            db::append_command(&self.pool, caller, &command, &rows).await
        }
        .await;

        match persisted {
            Ok(seq) => {
                info!(seq, command = command.name(), %caller, "command applied");
                Ok(receipt)
            }
            Err(e) => {
                error!("Failed to persist {}: {e}; rolling back", command.name());
                *registry = snapshot;
                Err(e)
            }
        }
    }

    /// Run a read-only query against the current registry state.
    pub async fn read<T>(&self, query: impl FnOnce(&EscrowRegistry) -> T) -> T {
        let registry = self.registry.lock().await;
        query(&registry)
    }
}
