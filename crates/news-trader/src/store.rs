//! Portfolio Store
//!
//! Durable JSON ledger with atomic replace semantics. There is no
//! in-process cache: every cycle re-reads from disk, so sequential
//! executor invocations observe each other's committed effects.
//!
//! Single-writer discipline: cycles within one process run sequentially;
//! concurrent multi-process use of the same portfolio file requires
//! external locking.

use std::path::{Path, PathBuf};

use rust_decimal::Decimal;

use crate::error::{Result, TraderError};
use crate::model::Portfolio;

/// File-backed portfolio store
pub struct PortfolioStore {
    path: PathBuf,
    initial_cash: Decimal,
}

impl PortfolioStore {
    pub fn new(path: impl Into<PathBuf>, initial_cash: Decimal) -> Self {
        Self {
            path: path.into(),
            initial_cash,
        }
    }

    /// Path of the persisted ledger
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The cash endowment used when no persisted state exists
    pub fn initial_cash(&self) -> Decimal {
        self.initial_cash
    }

    /// Read the persisted portfolio. On first use (file absent) the
    /// store initializes `{cash: initial_cash, holdings: {}}` and
    /// persists it before returning, so a second load observes the same
    /// state. Any other read or parse failure is a storage error.
    pub async fn load(&self) -> Result<Portfolio> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => serde_json::from_slice(&bytes).map_err(|e| {
                TraderError::Storage(format!(
                    "corrupt portfolio file {}: {e}",
                    self.path.display()
                ))
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let portfolio = Portfolio::with_cash(self.initial_cash);
                self.save(&portfolio).await?;
                tracing::info!(
                    path = %self.path.display(),
                    cash = %self.initial_cash,
                    "initialized fresh paper portfolio"
                );
                Ok(portfolio)
            }
            Err(e) => Err(TraderError::Storage(format!(
                "cannot read {}: {e}",
                self.path.display()
            ))),
        }
    }

    /// Overwrite the persisted state wholesale. Writes to a sibling
    /// `.tmp` file and renames it into place so a concurrent reader
    /// never observes a partial document.
    pub async fn save(&self, portfolio: &Portfolio) -> Result<()> {
        if portfolio.cash < Decimal::ZERO {
            return Err(TraderError::Storage(format!(
                "refusing to persist negative cash balance {}",
                portfolio.cash
            )));
        }

        let json = serde_json::to_string_pretty(portfolio)?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await.map_err(|e| {
                    TraderError::Storage(format!("cannot create {}: {e}", parent.display()))
                })?;
            }
        }

        let tmp = self.path.with_extension("tmp");
        tokio::fs::write(&tmp, &json)
            .await
            .map_err(|e| TraderError::Storage(format!("cannot write {}: {e}", tmp.display())))?;
        tokio::fs::rename(&tmp, &self.path).await.map_err(|e| {
            TraderError::Storage(format!(
                "cannot replace {}: {e}",
                self.path.display()
            ))
        })?;

        Ok(())
    }
}
