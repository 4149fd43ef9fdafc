// runs SPFF and k-SP-MW on the same demand sequence and aggregates what they leave behind

/* a trial is a pure function of (load,seed) and the config:
it owns its rng and one empty NetworkState per strategy,
so trials run on the rayon pool with nothing shared but read only data */

use rayon::prelude::*;
use serde::Serialize;
use thiserror::Error;

use crate::optical_network::assignment::{assign_all, AssignmentOutcome, AssignmentStrategy, BlockCounts, KspMw, Spff};
use crate::optical_network::config::{ConfigError, SimConfig};
use crate::optical_network::demand::{Demand, DemandGenerator};
use crate::optical_network::modulation::ModulationTable;
use crate::optical_network::routing::PathFinder;
use crate::optical_network::spectrum::{NetworkState, SpectrumError};
use crate::optical_network::topology::{Topology, TopologyError};
use crate::scientific_computing::statistics::Summary;

// fatal, a blocked demand is never an error
#[derive(Error,Debug)]
pub enum SimError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("invalid topology: {0}")]
    Topology(#[from] TopologyError),
    #[error("spectrum invariant violated: {0}")]
    Spectrum(#[from] SpectrumError)
}

#[derive(Clone,Debug,PartialEq,Serialize)]
pub struct Metrics {
    pub watermark:usize,
    // blocked/load, 0 for an empty load
    pub blocking_probability:f64,
    pub utilization:f64,
    pub allocated:usize,
    pub blocked:BlockCounts
}

impl Metrics {
    fn new(outcome:AssignmentOutcome,state:&NetworkState) -> Self {
        let blocking_probability = match outcome.demands() {
            0 => 0.0,
            n => outcome.blocked.total() as f64/n as f64
        };
        Self {
            watermark:state.watermark(),
            blocking_probability,
            utilization:state.utilization(),
            allocated:outcome.allocated,
            blocked:outcome.blocked
        }
    }
    pub fn demands(&self) -> usize {
        self.allocated + self.blocked.total()
    }
    pub fn success_rate(&self) -> f64 {
        match self.demands() {
            0 => 0.0,
            n => self.allocated as f64/n as f64
        }
    }
    // allocated demands per slot below the watermark
    pub fn spectrum_efficiency(&self) -> f64 {
        match self.watermark {
            0 => 0.0,
            w => self.allocated as f64/w as f64
        }
    }
}

#[derive(Clone,Debug,PartialEq,Serialize)]
pub struct ExperimentResult {
    pub load:usize,
    pub seed:u64,
    pub spff:Metrics,
    pub kspmw:Metrics
}

impl ExperimentResult {
    // positive when k-SP-MW packs tighter
    pub fn watermark_improvement(&self) -> f64 {
        self.spff.watermark as f64 - self.kspmw.watermark as f64
    }
    pub fn blocking_improvement(&self) -> f64 {
        self.spff.blocking_probability - self.kspmw.blocking_probability
    }
}

#[derive(Clone,Debug,PartialEq,Serialize)]
pub struct StrategySummary {
    pub watermark:Summary,
    pub blocking_probability:Summary,
    pub utilization:Summary
}

impl StrategySummary {
    fn of<'a,I:Iterator<Item = &'a Metrics> + Clone>(metrics:I) -> Self {
        Self {
            watermark:metrics.clone().map(|m| m.watermark as f64).collect(),
            blocking_probability:metrics.clone().map(|m| m.blocking_probability).collect(),
            utilization:metrics.map(|m| m.utilization).collect()
        }
    }
}

#[derive(Clone,Debug,PartialEq,Serialize)]
pub struct LoadSummary {
    pub load:usize,
    pub runs:usize,
    pub spff:StrategySummary,
    pub kspmw:StrategySummary
}

impl LoadSummary {
    fn new(load:usize,trials:&[ExperimentResult]) -> Self {
        Self {
            load,
            runs:trials.len(),
            spff:StrategySummary::of(trials.iter().map(|t| &t.spff)),
            kspmw:StrategySummary::of(trials.iter().map(|t| &t.kspmw))
        }
    }
    pub fn watermark_improvement(&self) -> f64 {
        self.spff.watermark.mean - self.kspmw.watermark.mean
    }
    pub fn blocking_improvement(&self) -> f64 {
        self.spff.blocking_probability.mean - self.kspmw.blocking_probability.mean
    }
}

pub struct Experiment<'a> {
    config:&'a SimConfig,
    topology:&'a Topology,
    modulations:ModulationTable,
    generator:DemandGenerator,
    kspmw:KspMw
}

impl<'a> Experiment<'a> {
    // every config error surfaces here, before any trial runs
    pub fn new(config:&'a SimConfig,topology:&'a Topology) -> Result<Self,SimError> {
        config.validate()?;
        Ok(Self {
            config,
            topology,
            modulations:ModulationTable::from_config(config)?,
            generator:DemandGenerator::new(config.bandwidth_range_gbps)?,
            kspmw:KspMw::new(config.k_paths)
        })
    }
    pub fn config(&self) -> &SimConfig {
        self.config
    }
    pub fn demands(&self,load:usize,seed:u64) -> Result<Vec<Demand>,SimError> {
        let mut demands = self.generator.generate(self.topology, load, seed)?;
        self.config.demand_order.apply(&mut demands, &PathFinder::new(self.topology));
        Ok(demands)
    }
    fn run_strategy<S:AssignmentStrategy>(&self,strategy:&S,demands:&[Demand]) -> Result<Metrics,SimError> {
        let paths = PathFinder::new(self.topology);
        let mut state = NetworkState::new(self.topology, self.config.max_slots);
        let outcome = assign_all(strategy, demands, &paths, &self.modulations, &mut state)?;
        Ok(Metrics::new(outcome, &state))
    }
    // one demand sequence replayed on two independent empty networks
    pub fn run_single_experiment(&self,load:usize,seed:u64) -> Result<ExperimentResult,SimError> {
        let demands = self.demands(load, seed)?;
        let spff = self.run_strategy(&Spff, &demands)?;
        let kspmw = self.run_strategy(&self.kspmw, &demands)?;
        log::debug!("load {load} seed {seed}: {} watermark {} blocked {}, {} watermark {} blocked {}",
            Spff.name(), spff.watermark, spff.blocked.total(),
            self.kspmw.name(), kspmw.watermark, kspmw.blocked.total());
        Ok(ExperimentResult {load,seed,spff,kspmw})
    }
    // run i of every load uses seed base_seed + i, summaries come back in the order of loads
    pub fn run_all_loads(&self,loads:&[usize],runs_per_load:usize) -> Result<Vec<LoadSummary>,SimError> {
        if runs_per_load == 0 {
            return Err(ConfigError::ZeroRuns.into());
        }
        let base_seed = self.config.base_seed;
        let trials:Vec<(usize,u64)> = loads.iter()
            .flat_map(|&load| (0..runs_per_load as u64).map(move |run| (load,base_seed.wrapping_add(run))))
            .collect();

        // collect keeps input order on the rayon pool too
        let results:Vec<ExperimentResult> = if self.config.parallel {
            trials.par_iter().map(|&(load,seed)| self.run_single_experiment(load, seed)).collect::<Result<_,_>>()?
        } else {
            trials.iter().map(|&(load,seed)| self.run_single_experiment(load, seed)).collect::<Result<_,_>>()?
        };

        let summaries:Vec<LoadSummary> = loads.iter()
            .zip(results.chunks(runs_per_load))
            .map(|(&load,trials)| LoadSummary::new(load, trials))
            .collect();

        for summary in summaries.iter() {
            log::info!("load {}: SPFF watermark {:.2} blocking {:.3}, k-SP-MW watermark {:.2} blocking {:.3}",
                summary.load,
                summary.spff.watermark.mean, summary.spff.blocking_probability.mean,
                summary.kspmw.watermark.mean, summary.kspmw.blocking_probability.mean);
            if summary.load > 0 && summary.spff.blocking_probability.min >= 1.0
                && summary.kspmw.blocking_probability.min >= 1.0 {
                log::warn!("load {}: every demand was blocked in every run", summary.load);
            }
        }
        Ok(summaries)
    }
    pub fn run(&self) -> Result<Vec<LoadSummary>,SimError> {
        self.run_all_loads(&self.config.demand_loads, self.config.runs_per_load)
    }
}
