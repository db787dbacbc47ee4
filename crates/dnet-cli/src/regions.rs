//! Named service-area cases loaded from the configuration file.
//!
//! Each region carries its admittance matrix, bus loads in kW/kVAR, the
//! starting voltages, and the measured loss figures. Regions are data, so the
//! catalog is keyed by name and looked up at runtime.

use std::collections::BTreeMap;

use dnet_core::{
    AdmittanceMatrix, Complex64, DnetError, DnetResult, LoadScaling, LoadVector, LossRecord,
    NetworkCase, VoltageState,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Region {
    pub ybus: AdmittanceMatrix,
    pub p_load_kw: Vec<f64>,
    pub q_load_kvar: Vec<f64>,
    pub v_initial: Vec<Complex64>,
    pub losses: LossRecord,
}

impl Region {
    /// Build solver inputs, converting kW/kVAR loads with `scaling`.
    pub fn to_case(&self, name: &str, scaling: LoadScaling) -> DnetResult<NetworkCase> {
        let loads = LoadVector::from_kw_kvar(&self.p_load_kw, &self.q_load_kvar, scaling)?;
        let initial = VoltageState::new(self.v_initial.clone());
        NetworkCase::new(name, self.ybus.clone(), loads, initial)
    }

    /// Loss figures re-checked for sign and finiteness.
    pub fn loss_record(&self) -> DnetResult<LossRecord> {
        LossRecord::new(self.losses.initial.value(), self.losses.current.value())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RegionCatalog {
    regions: BTreeMap<String, Region>,
}

impl RegionCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, region: Region) {
        self.regions.insert(name.into(), region);
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    /// Region names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.regions.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Region)> {
        self.regions.iter().map(|(name, region)| (name.as_str(), region))
    }

    /// Look up a region by exact name.
    pub fn get(&self, name: &str) -> DnetResult<&Region> {
        self.regions.get(name).ok_or_else(|| {
            let available = self.names().collect::<Vec<_>>().join(", ");
            if available.is_empty() {
                DnetError::invalid(format!("unknown region '{name}': the catalog is empty"))
            } else {
                DnetError::invalid(format!(
                    "unknown region '{name}' (available: {available})"
                ))
            }
        })
    }

    /// Solver inputs for every region, in name order.
    pub fn cases(&self, scaling: LoadScaling) -> DnetResult<Vec<NetworkCase>> {
        self.iter()
            .map(|(name, region)| region.to_case(name, scaling))
            .collect()
    }
}
