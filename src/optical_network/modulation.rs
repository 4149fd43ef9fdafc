use serde::{Deserialize, Serialize};

use super::config::{ConfigError, SimConfig};
use super::{DistanceKM, Gbps};

// spectral efficiency is in bit/s/Hz, so one slot carries slot_width*efficiency Gbps
#[derive(Clone,Debug,PartialEq,Serialize,Deserialize)]
pub struct ModulationFormat {
    pub name:String,
    pub max_reach_km:DistanceKM,
    pub spectral_efficiency:f64
}

impl ModulationFormat {
    pub fn new(name:&str,max_reach_km:DistanceKM,spectral_efficiency:f64) -> Self {
        Self {name:name.to_string(),max_reach_km,spectral_efficiency}
    }
    pub fn reaches(&self,distance_km:DistanceKM) -> bool {
        distance_km <= self.max_reach_km
    }
    pub(crate) fn validate(&self) -> Result<(),ConfigError> {
        let valid = self.max_reach_km.is_finite() && self.max_reach_km > 0.0
            && self.spectral_efficiency.is_finite() && self.spectral_efficiency > 0.0;
        if !valid {
            return Err(ConfigError::InvalidModulation {
                name:self.name.clone(),
                max_reach_km:self.max_reach_km,
                spectral_efficiency:self.spectral_efficiency
            });
        }
        Ok(())
    }
}

#[derive(Clone,Debug)]
pub struct ModulationTable {
    // sorted by descending spectral efficiency
    formats:Vec<ModulationFormat>,
    slot_width_ghz:f64,
    guard_band_slots:usize
}

impl ModulationTable {
    pub fn new(formats:Vec<ModulationFormat>,slot_width_ghz:f64,guard_band_slots:usize) -> Result<Self,ConfigError> {
        if formats.is_empty() {
            return Err(ConfigError::EmptyModulationTable);
        }
        if !(slot_width_ghz.is_finite() && slot_width_ghz > 0.0) {
            return Err(ConfigError::InvalidSlotWidth(slot_width_ghz));
        }
        for format in formats.iter() {
            format.validate()?;
        }
        let mut formats = formats;
        // stable, equal efficiencies keep the configured order
        formats.sort_by(|a,b| b.spectral_efficiency.total_cmp(&a.spectral_efficiency));
        Ok(Self {formats,slot_width_ghz,guard_band_slots})
    }
    pub fn from_config(config:&SimConfig) -> Result<Self,ConfigError> {
        Self::new(config.modulation_table.clone(), config.slot_width_ghz, config.guard_band_slots)
    }
    pub fn formats(&self) -> &[ModulationFormat] {
        &self.formats
    }
    pub fn longest_reach_km(&self) -> DistanceKM {
        self.formats.iter().map(|f| f.max_reach_km).fold(0.0, f64::max)
    }
    // ceil(bandwidth/(slot width*efficiency)) data slots plus the guard band
    pub fn slot_count(&self,format:&ModulationFormat,bandwidth_gbps:Gbps) -> usize {
        let per_slot = self.slot_width_ghz*format.spectral_efficiency;
        let data_slots = (bandwidth_gbps/per_slot).ceil().max(0.0) as usize;
        data_slots + self.guard_band_slots
    }
    // the most efficient format that still reaches, None when the path is too long for all of them
    pub fn select_modulation(&self,distance_km:DistanceKM,bandwidth_gbps:Gbps) -> Option<(&ModulationFormat,usize)> {
        let format = self.formats.iter().find(|f| f.reaches(distance_km))?;
        Some((format,self.slot_count(format, bandwidth_gbps)))
    }
}
