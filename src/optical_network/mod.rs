// static RMLSA on an elastic optical network:
// route every demand, pick a modulation format and reserve a slot range
// while keeping the highest used slot (the watermark) low

/* spectrum is modelled per link, each link has the same slot range 0..S
rule, suppose a demand takes 5 slots and goes through links A->B->C->D
then slots [s,s+5) must be free and get occupied on A-B, B-C and C-D alike
the same slot range must be used on every link of the path,
this is the spectrum continuity constraint */

pub mod assignment;
pub mod config;
pub mod demand;
pub mod modulation;
pub mod routing;
pub mod spectrum;
pub mod topology;

pub type NodeId = usize;
pub type LinkId = usize;
pub type DemandId = usize;
pub type AllocationId = usize;
pub type SlotIndex = usize;
pub type DistanceKM = f64;
pub type Gbps = f64;

pub use assignment::{Assignment, AssignmentStrategy, BlockReason, KspMw, Spff};
pub use config::{ConfigError, SimConfig};
pub use demand::{Demand, DemandGenerator, DemandOrder};
pub use modulation::{ModulationFormat, ModulationTable};
pub use routing::{Path, PathFinder};
pub use spectrum::{Allocation, NetworkState, SpectrumError};
pub use topology::{Link, Topology, TopologyError};
