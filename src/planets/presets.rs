//! Named accuracy levels
//!
//! Which terms a level keeps depends on the planet, the quantity and the tables
//! in use, so levels are data: a registry keyed by (planet, quantity, level) and
//! loaded from JSON.

use super::Planet;
use crate::data::EARTH_PRESETS_JSON;
use crate::errors::{invalid_arg, Result, VsopError};
use crate::series::{Quantity, TruncationVector};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Named accuracy level of a planet's series
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Accuracy {
    Low,
    #[default]
    Normal,
    High,
    Fine,
    /// Every term of every series
    Complete,
    /// Truncations set directly or derived from an error budget
    Custom,
}

impl Accuracy {
    pub fn name(&self) -> &'static str {
        match self {
            Accuracy::Low => "low",
            Accuracy::Normal => "normal",
            Accuracy::High => "high",
            Accuracy::Fine => "fine",
            Accuracy::Complete => "complete",
            Accuracy::Custom => "custom",
        }
    }
}

impl fmt::Display for Accuracy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Accuracy {
    type Err = VsopError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "low" => Ok(Accuracy::Low),
            "normal" => Ok(Accuracy::Normal),
            "high" => Ok(Accuracy::High),
            "fine" => Ok(Accuracy::Fine),
            "complete" => Ok(Accuracy::Complete),
            "custom" => Ok(Accuracy::Custom),
            _ => Err(invalid_arg(format!(
                "Accuracy level should be low, normal, high, fine or complete, got {:?}",
                s
            ))),
        }
    }
}

#[derive(Debug, Deserialize)]
struct PresetFile {
    presets: Vec<PresetEntry>,
}

#[derive(Debug, Deserialize)]
struct PresetEntry {
    planet: Planet,
    quantity: Quantity,
    accuracy: Accuracy,
    truncation: TruncationVector,
}

/// Registry of truncation vectors per (planet, quantity, accuracy level)
#[derive(Debug, Clone, Default)]
pub struct AccuracyPresets {
    entries: HashMap<(Planet, Quantity, Accuracy), TruncationVector>,
}

impl AccuracyPresets {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Presets for the tables bundled with the crate
    pub fn builtin() -> Result<Self> {
        Self::from_json(EARTH_PRESETS_JSON)
    }

    /// Load presets from JSON of the form
    /// `{"presets": [{"planet", "quantity", "accuracy", "truncation"}]}`
    pub fn from_json(json: &str) -> Result<Self> {
        let file: PresetFile = serde_json::from_str(json)
            .map_err(|e| VsopError::DataError(format!("Invalid preset data: {}", e)))?;

        let mut presets = Self::new();
        for entry in file.presets {
            presets.insert(entry.planet, entry.quantity, entry.accuracy, entry.truncation)?;
        }
        Ok(presets)
    }

    /// Register a preset, replacing any previous one for the same key
    ///
    /// `Complete` and `Custom` are not table-driven and cannot be registered.
    pub fn insert(
        &mut self,
        planet: Planet,
        quantity: Quantity,
        accuracy: Accuracy,
        truncation: TruncationVector,
    ) -> Result<()> {
        if matches!(accuracy, Accuracy::Complete | Accuracy::Custom) {
            return Err(invalid_arg(format!(
                "Accuracy level {} cannot be registered as a preset",
                accuracy
            )));
        }
        self.entries.insert((planet, quantity, accuracy), truncation);
        Ok(())
    }

    /// Look up the preset for a key
    pub fn get(&self, planet: Planet, quantity: Quantity, accuracy: Accuracy) -> Result<&TruncationVector> {
        self.entries.get(&(planet, quantity, accuracy)).ok_or_else(|| {
            invalid_arg(format!(
                "No {} accuracy preset for {} {}",
                accuracy,
                planet.name(),
                quantity
            ))
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
