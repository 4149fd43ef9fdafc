use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::demand::{DemandGenerator, DemandOrder};
use super::modulation::ModulationFormat;
use super::{DistanceKM, Gbps};

#[derive(Error,Debug)]
pub enum ConfigError {
    #[error("k_paths must be at least 1")]
    ZeroPaths,
    #[error("max_slots must be at least 1")]
    ZeroSlots,
    #[error("runs_per_load must be at least 1")]
    ZeroRuns,
    #[error("slot width must be a positive number of GHz, got {0}")]
    InvalidSlotWidth(f64),
    #[error("bandwidth range ({min},{max}) Gbps must satisfy 0 < min <= max")]
    InvalidBandwidthRange{min:Gbps,max:Gbps},
    #[error("modulation table is empty")]
    EmptyModulationTable,
    #[error("modulation format {name} needs positive reach and spectral efficiency, got {max_reach_km} km and {spectral_efficiency}")]
    InvalidModulation{name:String,max_reach_km:DistanceKM,spectral_efficiency:f64},
    #[error("could not parse configuration: {0}")]
    Parse(#[from] serde_json::Error)
}

lazy_static! {
    // most spectrally efficient first
    pub static ref DEFAULT_MODULATION_TABLE:Vec<ModulationFormat> = vec![
        ModulationFormat::new("16-QAM", 500.0, 4.0),
        ModulationFormat::new("8-QAM", 1000.0, 3.0),
        ModulationFormat::new("QPSK", 2000.0, 2.0),
        ModulationFormat::new("BPSK", 4000.0, 1.0),
    ];
}

// immutable parameter set for one study, shared by reference with the runner and the strategies
#[derive(Clone,Debug,PartialEq,Serialize,Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub demand_loads:Vec<usize>,
    pub runs_per_load:usize,
    pub k_paths:usize,
    pub max_slots:usize,
    pub slot_width_ghz:f64,
    pub guard_band_slots:usize,
    pub bandwidth_range_gbps:(Gbps,Gbps),
    pub modulation_table:Vec<ModulationFormat>,
    // trial i of every load uses base_seed + i
    pub base_seed:u64,
    pub demand_order:DemandOrder,
    pub parallel:bool
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            demand_loads:vec![50,100,150,200],
            runs_per_load:5,
            k_paths:3,
            max_slots:320,
            slot_width_ghz:12.5,
            guard_band_slots:1,
            bandwidth_range_gbps:(50.0,400.0),
            modulation_table:DEFAULT_MODULATION_TABLE.clone(),
            base_seed:0,
            demand_order:DemandOrder::Generation,
            parallel:true
        }
    }
}

impl SimConfig {
    pub fn from_json(json:&str) -> Result<Self,ConfigError> {
        let config:Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }
    pub fn validate(&self) -> Result<(),ConfigError> {
        if self.k_paths == 0 {
            return Err(ConfigError::ZeroPaths);
        }
        if self.max_slots == 0 {
            return Err(ConfigError::ZeroSlots);
        }
        if self.runs_per_load == 0 {
            return Err(ConfigError::ZeroRuns);
        }
        if !(self.slot_width_ghz.is_finite() && self.slot_width_ghz > 0.0) {
            return Err(ConfigError::InvalidSlotWidth(self.slot_width_ghz));
        }
        DemandGenerator::new(self.bandwidth_range_gbps)?;
        if self.modulation_table.is_empty() {
            return Err(ConfigError::EmptyModulationTable);
        }
        for format in self.modulation_table.iter() {
            format.validate()?;
        }
        Ok(())
    }
}
