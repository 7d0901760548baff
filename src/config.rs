use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{AllocError, Result};

// ---------------------------------------------------------------------------
// Classification thresholds
// ---------------------------------------------------------------------------

/// Ratio thresholds (kg/CBM) used by the cargo classifier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    /// Exact ratio that counts as "Perfect Cargo".
    pub perfect: f64,
    /// Below this the cargo is very volumetric.
    pub very_volumetric: f64,
    /// Above this the cargo is very dense.
    pub very_dense: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            perfect: 266.0,
            very_volumetric: 70.0,
            very_dense: 750.0,
        }
    }
}

impl Thresholds {
    /// The classifier's branch order only partitions the ratio axis when
    /// `very_volumetric < perfect < very_dense`.
    pub fn is_ordered(&self) -> bool {
        self.very_volumetric < self.perfect && self.perfect < self.very_dense
    }

    pub fn validate(&self) -> Result<()> {
        if !self.is_ordered() {
            return Err(AllocError::InvalidConfig(format!(
                "thresholds must satisfy very_volumetric < perfect < very_dense, got {} / {} / {}",
                self.very_volumetric, self.perfect, self.very_dense
            )));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Ledger slots
// ---------------------------------------------------------------------------

/// A named CFS ledger position in the two-ledger run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerSlot {
    /// Label used in allocation statements, e.g. "TRIWAY CFS".
    pub label: String,
    /// Lower-case stem for the exported file: `updated_<slug>_cfs.xlsx`.
    pub slug: String,
}

impl LedgerSlot {
    pub fn new(label: &str, slug: &str) -> Self {
        Self {
            label: label.to_string(),
            slug: slug.to_string(),
        }
    }

    pub fn export_file_name(&self) -> String {
        format!("updated_{}_cfs.xlsx", self.slug)
    }
}

// ---------------------------------------------------------------------------
// AllocationConfig
// ---------------------------------------------------------------------------

/// Everything a run needs besides the three input tables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AllocationConfig {
    pub thresholds: Thresholds,
    /// Ceiling a ledger's weight/CBM ratio must not exceed after a group joins.
    pub max_ratio: f64,
    /// How many statements the boundary layer shows.
    pub statement_preview: usize,
    /// Ledger A is allocated first, then ledger B.
    pub ledgers: [LedgerSlot; 2],
}

impl Default for AllocationConfig {
    fn default() -> Self {
        Self {
            thresholds: Thresholds::default(),
            max_ratio: 350.0,
            statement_preview: 5,
            ledgers: [
                LedgerSlot::new("TRIWAY CFS", "triway"),
                LedgerSlot::new("THIRURANI CFS", "thirurani"),
            ],
        }
    }
}

impl AllocationConfig {
    /// Read a JSON settings file. Absent keys keep their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let config: AllocationConfig = serde_json::from_str(&text)
            .map_err(|e| AllocError::InvalidConfig(format!("{}: {e}", path.display())))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.thresholds.validate()?;
        if !(self.max_ratio.is_finite() && self.max_ratio > 0.0) {
            return Err(AllocError::InvalidConfig(format!(
                "max_ratio must be a positive number, got {}",
                self.max_ratio
            )));
        }
        for slot in &self.ledgers {
            if slot.slug.trim().is_empty() {
                return Err(AllocError::InvalidConfig(format!(
                    "ledger '{}' has an empty file slug",
                    slot.label
                )));
            }
        }
        Ok(())
    }
}
