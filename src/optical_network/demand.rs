use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use super::config::ConfigError;
use super::routing::PathFinder;
use super::topology::{Topology, TopologyError};
use super::{DemandId, Gbps, NodeId};

#[derive(Clone,Debug,PartialEq,Serialize)]
pub struct Demand {
    pub id:DemandId,
    pub source:NodeId,
    pub destination:NodeId,
    pub bandwidth_gbps:Gbps
}

// order in which a trial hands demands to the strategies
#[derive(Clone,Copy,Debug,Default,PartialEq,Eq,Serialize,Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DemandOrder {
    #[default]
    Generation,
    // largest first, equal bandwidths keep generation order
    BandwidthDescending,
    // bandwidth*100 + shortest path km*0.01, largest first
    // unroutable demands score infinity and go first
    Smart
}

impl DemandOrder {
    pub fn apply(&self,demands:&mut [Demand],paths:&PathFinder) {
        match self {
            Self::Generation => demands.sort_by_key(|demand| demand.id),
            Self::BandwidthDescending => demands.sort_by(|a,b| {
                b.bandwidth_gbps.total_cmp(&a.bandwidth_gbps).then(a.id.cmp(&b.id))
            }),
            Self::Smart => {
                let mut scored:Vec<(f64,Demand)> = demands.iter()
                    .map(|demand| (Self::smart_score(demand, paths),demand.clone()))
                    .collect();
                scored.sort_by(|(a,x),(b,y)| b.total_cmp(a).then(x.id.cmp(&y.id)));
                for (slot,(_,demand)) in demands.iter_mut().zip(scored) {
                    *slot = demand;
                }
            }
        }
    }
    fn smart_score(demand:&Demand,paths:&PathFinder) -> f64 {
        let length_km = paths.shortest_path(demand.source, demand.destination)
            .map_or(f64::INFINITY, |path| path.length_km());
        demand.bandwidth_gbps*100.0 + length_km*0.01
    }
}

#[derive(Clone,Copy,Debug,PartialEq)]
pub struct DemandGenerator {
    min_gbps:Gbps,
    max_gbps:Gbps
}

impl DemandGenerator {
    // 0 < min <= max, both finite
    pub fn new(bandwidth_range_gbps:(Gbps,Gbps)) -> Result<Self,ConfigError> {
        let (min_gbps,max_gbps) = bandwidth_range_gbps;
        if !(min_gbps.is_finite() && max_gbps.is_finite() && min_gbps > 0.0 && min_gbps <= max_gbps) {
            return Err(ConfigError::InvalidBandwidthRange {min:min_gbps,max:max_gbps});
        }
        Ok(Self {min_gbps,max_gbps})
    }
    // same topology, count and seed always give the same sequence
    pub fn generate(&self,topology:&Topology,count:usize,seed:u64) -> Result<Vec<Demand>,TopologyError> {
        let mut rng = StdRng::seed_from_u64(seed);
        self.generate_with_rng(topology, count, &mut rng)
    }
    pub fn generate_with_rng<R:Rng>(&self,topology:&Topology,count:usize,rng:&mut R) -> Result<Vec<Demand>,TopologyError> {
        let nodes = topology.nodes();
        if count > 0 && nodes.len() < 2 {
            return Err(TopologyError::TooFewNodes(nodes.len()));
        }
        let mut demands = Vec::with_capacity(count);
        for id in 0..count {
            let source = rng.random_range(0..nodes.len());
            // draw from the remaining n-1 nodes, shifting past the source
            let mut destination = rng.random_range(0..nodes.len() - 1);
            if destination >= source {
                destination += 1;
            }
            let bandwidth_gbps = rng.random_range(self.min_gbps..=self.max_gbps);
            demands.push(Demand {
                id,
                source:nodes[source],
                destination:nodes[destination],
                bandwidth_gbps
            });
        }
        Ok(demands)
    }
}

#[cfg(test)]
mod tests {
    use super::{Demand, DemandGenerator, DemandOrder};
    use crate::optical_network::config::ConfigError;
    use crate::optical_network::routing::PathFinder;
    use crate::optical_network::topology::{Topology, TopologyError};

    #[test]
    fn test_reproducible() {
        let topology = Topology::nsfnet().unwrap();
        let generator = DemandGenerator::new((50.0,400.0)).unwrap();
        let first = generator.generate(&topology, 200, 42).unwrap();
        let second = generator.generate(&topology, 200, 42).unwrap();
        assert_eq!(first,second);
        let other = generator.generate(&topology, 200, 43).unwrap();
        assert_ne!(first,other);
    }
    #[test]
    fn test_demands_are_well_formed() {
        let topology = Topology::nsfnet().unwrap();
        let generator = DemandGenerator::new((50.0,400.0)).unwrap();
        let demands = generator.generate(&topology, 1000, 7).unwrap();
        assert_eq!(demands.len(),1000);
        for (index,demand) in demands.iter().enumerate() {
            assert_eq!(demand.id,index);
            assert_ne!(demand.source,demand.destination);
            assert!(topology.contains_node(demand.source));
            assert!(topology.contains_node(demand.destination));
            assert!((50.0..=400.0).contains(&demand.bandwidth_gbps));
        }
        // every node shows up on both ends over a long enough sequence
        for node in topology.nodes() {
            assert!(demands.iter().any(|d| d.source == *node));
            assert!(demands.iter().any(|d| d.destination == *node));
        }
    }
    #[test]
    fn test_prefix_is_stable() {
        let topology = Topology::nsfnet().unwrap();
        let generator = DemandGenerator::new((50.0,400.0)).unwrap();
        let short = generator.generate(&topology, 10, 3).unwrap();
        let long = generator.generate(&topology, 50, 3).unwrap();
        assert_eq!(short[..],long[..10]);
    }
    #[test]
    fn test_too_few_nodes() {
        let topology = Topology::new(0..1, &[]).unwrap();
        let generator = DemandGenerator::new((50.0,400.0)).unwrap();
        assert!(generator.generate(&topology, 0, 0).unwrap().is_empty());
        assert_eq!(generator.generate(&topology, 1, 0).unwrap_err(),TopologyError::TooFewNodes(1));
    }
    #[test]
    fn test_ordering() {
        let topology = Topology::nsfnet().unwrap();
        let generator = DemandGenerator::new((50.0,400.0)).unwrap();
        let paths = PathFinder::new(&topology);
        let mut demands = generator.generate(&topology, 30, 11).unwrap();
        DemandOrder::BandwidthDescending.apply(&mut demands, &paths);
        for pair in demands.windows(2) {
            assert!(pair[0].bandwidth_gbps >= pair[1].bandwidth_gbps);
        }
        DemandOrder::Generation.apply(&mut demands, &paths);
        let ids:Vec<usize> = demands.iter().map(|d| d.id).collect();
        assert_eq!(ids,(0..30).collect::<Vec<_>>());
    }
    #[test]
    fn test_smart_ordering() {
        // 0 - 1 - 2, node 3 is unreachable
        let topology = Topology::new(0..4, &[(0,1,100.0),(1,2,100.0)]).unwrap();
        let paths = PathFinder::new(&topology);
        let mut demands = vec![
            Demand {id:0,source:0,destination:1,bandwidth_gbps:100.0},
            Demand {id:1,source:0,destination:2,bandwidth_gbps:100.0},
            Demand {id:2,source:0,destination:3,bandwidth_gbps:50.0},
            Demand {id:3,source:1,destination:2,bandwidth_gbps:200.0},
            Demand {id:4,source:1,destination:0,bandwidth_gbps:100.0},
        ];
        DemandOrder::Smart.apply(&mut demands, &paths);
        let ids:Vec<usize> = demands.iter().map(|d| d.id).collect();
        // equal bandwidth sorts the longer path first, equal scores keep generation order
        assert_eq!(ids,vec![2,3,1,0,4]);
    }
    #[test]
    fn test_rejects_bad_range() {
        for range in [(400.0,50.0),(0.0,10.0),(f64::NAN,10.0),(10.0,f64::INFINITY)] {
            assert!(matches!(DemandGenerator::new(range),Err(ConfigError::InvalidBandwidthRange{..})));
        }
        assert!(DemandGenerator::new((100.0,100.0)).is_ok());
    }
}
