use std::fmt;

use crate::config::Thresholds;
use crate::error::{AllocError, Result};

/// Density class of a consignment or a whole ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CargoCategory {
    Perfect,
    VeryVolumetric,
    Volumetric,
    VeryDense,
    Dense,
    /// Terminal fallback. Only a NaN ratio (or misordered thresholds) gets here.
    Undefined,
}

impl CargoCategory {
    pub fn label(&self) -> &'static str {
        match self {
            CargoCategory::Perfect => "Perfect Cargo",
            CargoCategory::VeryVolumetric => "Very Volumetric Cargo",
            CargoCategory::Volumetric => "Volumetric Cargo",
            CargoCategory::VeryDense => "Very Dense Cargo",
            CargoCategory::Dense => "Dense Cargo",
            CargoCategory::Undefined => "Undefined",
        }
    }
}

impl fmt::Display for CargoCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// weight / volume, refusing a zero volume.
pub fn ratio(weight: f64, volume: f64, context: &str) -> Result<f64> {
    if volume == 0.0 {
        return Err(AllocError::DivisionByZero {
            context: context.to_string(),
        });
    }
    Ok(weight / volume)
}

/// Classify a kg/CBM ratio.
///
/// Checks run in this order: exact perfect, very volumetric, volumetric,
/// very dense, dense. With `very_volumetric < perfect < very_dense` every
/// non-NaN ratio lands in exactly one of the first five.
pub fn classify_ratio(ratio: f64, thresholds: &Thresholds) -> CargoCategory {
    debug_assert!(
        thresholds.is_ordered(),
        "classification thresholds out of order: {thresholds:?}"
    );

    if ratio == thresholds.perfect {
        CargoCategory::Perfect
    } else if ratio < thresholds.very_volumetric {
        CargoCategory::VeryVolumetric
    } else if ratio < thresholds.perfect {
        CargoCategory::Volumetric
    } else if ratio > thresholds.very_dense {
        CargoCategory::VeryDense
    } else if ratio > thresholds.perfect {
        CargoCategory::Dense
    } else {
        CargoCategory::Undefined
    }
}

/// Classify a (weight, volume) pair.
pub fn classify(weight: f64, volume: f64, thresholds: &Thresholds) -> Result<CargoCategory> {
    let r = ratio(weight, volume, "classify")?;
    Ok(classify_ratio(r, thresholds))
}
