use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use cfs_allocator::cargo::ledger::Aggregate;
use cfs_allocator::data::loader::load_table_from_path;
use cfs_allocator::data::model::Table;
use cfs_allocator::pipeline::{open_ledger, run_allocation, AllocationRun, ExportedLedger};
use cfs_allocator::AllocationConfig;

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// A sheet picked by the user.
pub struct LoadedFile {
    pub path: PathBuf,
    pub table: Table,
}

impl LoadedFile {
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// The full UI state, independent of rendering.
pub struct AppState {
    /// Thresholds, ceiling and ledger labels.
    pub config: AllocationConfig,

    /// The two CFS ledger uploads (A, B).
    pub ledgers: [Option<LoadedFile>; 2],

    /// Density of each uploaded ledger.
    pub summaries: [Option<Aggregate>; 2],

    /// Cargo tracking sheet upload.
    pub tracking: Option<LoadedFile>,

    /// Result of the last allocation (None until the user runs one).
    pub run: Option<AllocationRun>,

    /// Updated ledgers serialized for download, in ledger order.
    pub exports: Vec<ExportedLedger>,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            config: AllocationConfig::default(),
            ledgers: [None, None],
            summaries: [None, None],
            tracking: None,
            run: None,
            exports: Vec::new(),
            status_message: None,
        }
    }
}

impl AppState {
    /// Load ledger `slot` (0 = A, 1 = B) and compute its density.
    pub fn load_ledger(&mut self, slot: usize, path: &Path) -> Result<()> {
        let table = load_table_from_path(path)
            .with_context(|| format!("loading {}", path.display()))?;
        let label = &self.config.ledgers[slot];
        let (ledger, summary) = open_ledger(label, table.clone(), &self.config)
            .with_context(|| format!("reading {} from {}", label.label, path.display()))?;
        log::info!("{} loaded: {} records", label.label, ledger.len());

        self.ledgers[slot] = Some(LoadedFile {
            path: path.to_path_buf(),
            table,
        });
        self.summaries[slot] = Some(summary);
        self.invalidate();
        Ok(())
    }

    pub fn load_tracking(&mut self, path: &Path) -> Result<()> {
        let table = load_table_from_path(path)
            .with_context(|| format!("loading {}", path.display()))?;
        log::info!("Tracking sheet loaded: {} rows", table.len());
        self.tracking = Some(LoadedFile {
            path: path.to_path_buf(),
            table,
        });
        self.invalidate();
        Ok(())
    }

    /// Swap in a settings file. Nothing changes unless every loaded ledger
    /// re-classifies under the new settings.
    pub fn load_settings(&mut self, path: &Path) -> Result<()> {
        let config = AllocationConfig::load(path)
            .with_context(|| format!("loading settings from {}", path.display()))?;
        let summaries = self.summaries_under(&config)?;
        self.config = config;
        self.summaries = summaries;
        self.invalidate();
        Ok(())
    }

    /// Classify the loaded ledgers under `config`.
    fn summaries_under(&self, config: &AllocationConfig) -> Result<[Option<Aggregate>; 2]> {
        let mut summaries = [None, None];
        for (slot, file) in self.ledgers.iter().enumerate() {
            if let Some(file) = file {
                let (_, summary) = open_ledger(&config.ledgers[slot], file.table.clone(), config)
                    .with_context(|| format!("re-reading {}", file.file_name()))?;
                summaries[slot] = Some(summary);
            }
        }
        Ok(summaries)
    }

    /// Whether all three uploads are present.
    pub fn can_allocate(&self) -> bool {
        self.ledgers.iter().all(Option::is_some) && self.tracking.is_some()
    }

    /// Run the allocation over the loaded sheets.
    pub fn allocate(&mut self) -> Result<()> {
        let (Some(a), Some(b), Some(tracking)) =
            (&self.ledgers[0], &self.ledgers[1], &self.tracking)
        else {
            anyhow::bail!("load both CFS files and the tracking sheet first");
        };

        let run = run_allocation(
            &self.config,
            a.table.clone(),
            b.table.clone(),
            tracking.table.clone(),
        )
        .context("allocation failed")?;

        let exports = run.exports().context("exporting updated ledgers")?;

        log::info!("Allocation produced {} statement(s)", run.statements.len());
        self.run = Some(run);
        self.exports = exports;
        self.status_message = None;
        Ok(())
    }

    /// Drop the previous result; inputs or settings changed.
    pub fn invalidate(&mut self) {
        self.run = None;
        self.exports.clear();
        self.status_message = None;
    }

    /// Record a failure for the status line.
    pub fn report(&mut self, err: anyhow::Error) {
        log::error!("{err:#}");
        self.status_message = Some(format!("Error: {err:#}"));
    }
}
