use serde::Serialize;
use thiserror::Error;

use super::demand::Demand;
use super::modulation::{ModulationFormat, ModulationTable};
use super::routing::{Path, PathFinder};
use super::spectrum::{NetworkState, SpectrumError};
use super::{AllocationId, DistanceKM, NodeId};

// per demand failures, a blocked demand never aborts a trial
#[derive(Error,Debug,Clone,PartialEq)]
pub enum BlockReason {
    #[error("no path between {from} and {to}")]
    NoPath{from:NodeId,to:NodeId},
    #[error("a {distance_km} km path is beyond the reach of every modulation format")]
    NoFeasibleModulation{distance_km:DistanceKM},
    #[error("no {slot_count} contiguous slots are free on every link of the path")]
    NoSpectrumAvailable{slot_count:usize}
}

#[derive(Clone,Debug,PartialEq)]
pub enum Assignment {
    Allocated(AllocationId),
    Blocked(BlockReason)
}

// Err is reserved for spectrum invariant violations, which must abort the run
pub trait AssignmentStrategy: Sync {
    fn name(&self) -> &'static str;
    fn attempt_assignment(&self,demand:&Demand,paths:&PathFinder,modulations:&ModulationTable,
        state:&mut NetworkState) -> Result<Assignment,SpectrumError>;
}

// shortest path, first fit
#[derive(Clone,Copy,Debug,Default)]
pub struct Spff;

impl AssignmentStrategy for Spff {
    fn name(&self) -> &'static str {
        "SPFF"
    }
    fn attempt_assignment(&self,demand:&Demand,paths:&PathFinder,modulations:&ModulationTable,
        state:&mut NetworkState) -> Result<Assignment,SpectrumError> {
        let Some(path) = paths.shortest_path(demand.source, demand.destination) else {
            return Ok(Assignment::Blocked(BlockReason::NoPath {from:demand.source,to:demand.destination}));
        };
        let Some((format,slot_count)) = modulations.select_modulation(path.length_km(), demand.bandwidth_gbps) else {
            return Ok(Assignment::Blocked(BlockReason::NoFeasibleModulation {distance_km:path.length_km()}));
        };
        let Some(slot_start) = state.find_first_fit(&path, slot_count) else {
            return Ok(Assignment::Blocked(BlockReason::NoSpectrumAvailable {slot_count}));
        };
        let id = state.allocate(&path, slot_start, slot_count, format, demand.id)?;
        Ok(Assignment::Allocated(id))
    }
}

// k shortest paths, minimum watermark
#[derive(Clone,Copy,Debug)]
pub struct KspMw {
    k:usize
}

impl KspMw {
    pub fn new(k:usize) -> Self {
        Self {k}
    }
    pub fn k(&self) -> usize {
        self.k
    }
}

struct Candidate<'a> {
    path:&'a Path,
    format:&'a ModulationFormat,
    slot_start:usize,
    slot_count:usize,
    watermark:usize,
    distance_km:DistanceKM
}

impl AssignmentStrategy for KspMw {
    fn name(&self) -> &'static str {
        "k-SP-MW"
    }
    // lowest hypothetical watermark wins, then shorter path, then lower start slot
    // a longer path is taken whenever it keeps the watermark lower
    fn attempt_assignment(&self,demand:&Demand,paths:&PathFinder,modulations:&ModulationTable,
        state:&mut NetworkState) -> Result<Assignment,SpectrumError> {
        let candidates = paths.k_shortest_paths(demand.source, demand.destination, self.k);
        let Some(shortest) = candidates.first() else {
            return Ok(Assignment::Blocked(BlockReason::NoPath {from:demand.source,to:demand.destination}));
        };
        let mut blocked = BlockReason::NoFeasibleModulation {distance_km:shortest.length_km()};
        let mut best:Option<Candidate> = None;

        for path in candidates.iter() {
            let Some((format,slot_count)) = modulations.select_modulation(path.length_km(), demand.bandwidth_gbps)
                else {continue};
            let Some(slot_start) = state.find_first_fit(path, slot_count) else {
                if matches!(blocked,BlockReason::NoFeasibleModulation{..}) {
                    blocked = BlockReason::NoSpectrumAvailable {slot_count};
                }
                continue;
            };
            let candidate = Candidate {
                path,
                format,
                slot_start,
                slot_count,
                watermark:state.hypothetical_watermark(slot_start, slot_count),
                distance_km:path.length_km()
            };
            let is_better = match best.as_ref() {
                None => true,
                Some(current) => candidate.watermark.cmp(&current.watermark)
                    .then(candidate.distance_km.total_cmp(&current.distance_km))
                    .then(candidate.slot_start.cmp(&current.slot_start))
                    .is_lt()
            };
            if is_better {
                best = Some(candidate);
            }
        }

        let Some(best) = best else {
            return Ok(Assignment::Blocked(blocked));
        };
        let id = state.allocate(best.path, best.slot_start, best.slot_count, best.format, demand.id)?;
        Ok(Assignment::Allocated(id))
    }
}

#[derive(Clone,Copy,Debug,Default,PartialEq,Eq,Serialize)]
pub struct BlockCounts {
    pub no_path:usize,
    pub no_modulation:usize,
    pub no_spectrum:usize
}

impl BlockCounts {
    pub fn record(&mut self,reason:&BlockReason) {
        match reason {
            BlockReason::NoPath{..} => self.no_path += 1,
            BlockReason::NoFeasibleModulation{..} => self.no_modulation += 1,
            BlockReason::NoSpectrumAvailable{..} => self.no_spectrum += 1
        }
    }
    pub fn total(&self) -> usize {
        self.no_path + self.no_modulation + self.no_spectrum
    }
}

#[derive(Clone,Copy,Debug,Default,PartialEq,Eq)]
pub struct AssignmentOutcome {
    pub allocated:usize,
    pub blocked:BlockCounts
}

impl AssignmentOutcome {
    pub fn demands(&self) -> usize {
        self.allocated + self.blocked.total()
    }
}

// feeds demands to the strategy in the given order, strictly one after another
pub fn assign_all<S:AssignmentStrategy + ?Sized>(strategy:&S,demands:&[Demand],paths:&PathFinder,
    modulations:&ModulationTable,state:&mut NetworkState) -> Result<AssignmentOutcome,SpectrumError> {
    let mut outcome = AssignmentOutcome::default();
    for demand in demands {
        match strategy.attempt_assignment(demand, paths, modulations, state)? {
            Assignment::Allocated(id) => {
                outcome.allocated += 1;
                log::debug!("{}: demand {} -> allocation {id}", strategy.name(), demand.id);
            },
            Assignment::Blocked(reason) => {
                log::trace!("{}: demand {} blocked, {reason}", strategy.name(), demand.id);
                outcome.blocked.record(&reason);
            }
        }
    }
    debug_assert_eq!(outcome.demands(),demands.len());
    Ok(outcome)
}
