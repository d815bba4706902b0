//! Hall-Petch material constants.

use std::collections::BTreeMap;

use crate::error::AnalysisError;

/// Hall-Petch constants for one material.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct MaterialProperties {
    /// Display name, also the lookup key.
    pub name: String,
    /// Lattice friction stress σ0 in MPa.
    pub friction_stress_mpa: f64,
    /// Grain-boundary locking parameter k in MPa·mm^1/2.
    pub locking_parameter: f64,
}

/// Named material table, read-only during analysis but extensible between
/// runs.
///
/// Ships with five common alloys. Iteration order is alphabetical by name.
#[derive(Debug, Clone)]
pub struct MaterialTable {
    materials: BTreeMap<String, MaterialProperties>,
}

impl MaterialTable {
    /// Table holding the five built-in entries.
    pub fn builtin() -> Self {
        let mut table = Self::empty();
        for (name, friction_stress_mpa, locking_parameter) in [
            ("Steel (Low Carbon)", 70.0, 23.0),
            ("Aluminum (1100-O Pure)", 15.0, 2.2),
            ("Titanium (CP Grade 2)", 170.0, 12.0),
            ("Inconel 718 (Sol. Ann.)", 350.0, 24.0),
            ("Brass (70/30 Cartridge)", 70.0, 12.0),
        ] {
            table.insert(MaterialProperties {
                name: name.to_string(),
                friction_stress_mpa,
                locking_parameter,
            });
        }
        table
    }

    /// Empty table, for fully custom material sets.
    pub fn empty() -> Self {
        Self {
            materials: BTreeMap::new(),
        }
    }

    /// Add or replace an entry, keyed by its name.
    pub fn insert(&mut self, material: MaterialProperties) {
        self.materials.insert(material.name.clone(), material);
    }

    /// Look up a material by its exact name.
    pub fn get(&self, name: &str) -> Result<&MaterialProperties, AnalysisError> {
        self.materials
            .get(name)
            .ok_or_else(|| AnalysisError::UnknownMaterial {
                name: name.to_string(),
            })
    }

    /// Entries in alphabetical order.
    pub fn iter(&self) -> impl Iterator<Item = &MaterialProperties> {
        self.materials.values()
    }

    pub fn len(&self) -> usize {
        self.materials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }
}

impl Default for MaterialTable {
    fn default() -> Self {
        Self::builtin()
    }
}
