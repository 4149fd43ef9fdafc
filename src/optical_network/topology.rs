use serde::Serialize;
use thiserror::Error;

use crate::dsa::graph::UnDirectedGraph;
use super::{DistanceKM, LinkId, NodeId};

#[derive(Error,Debug,Clone,PartialEq)]
pub enum TopologyError {
    #[error("link {link:?} refers to node {node}, which is not part of the topology")]
    UnknownNode{link:(NodeId,NodeId),node:NodeId},
    #[error("link from node {0} to itself")]
    SelfLoop(NodeId),
    #[error("link between {0} and {1} is defined twice")]
    DuplicateLink(NodeId,NodeId),
    #[error("link between {a} and {b} has distance {distance_km} km, expected a positive finite number")]
    InvalidDistance{a:NodeId,b:NodeId,distance_km:DistanceKM},
    #[error("demands need two distinct nodes, the topology has {0}")]
    TooFewNodes(usize)
}

// reference NSFNET, 14 nodes and 21 links, distances in km
pub const NSFNET_NODES:usize = 14;
pub const NSFNET_LINKS:[(NodeId,NodeId,DistanceKM);21] = [
    (0,1,2100.0),(0,2,3000.0),(0,7,4800.0),
    (1,2,1200.0),(1,3,1500.0),
    (2,5,3600.0),
    (3,4,1200.0),(3,10,3900.0),
    (4,5,2400.0),(4,6,1200.0),
    (5,9,2100.0),(5,12,3600.0),
    (6,7,1500.0),
    (7,8,1500.0),
    (8,9,1500.0),(8,11,600.0),(8,13,600.0),
    (10,11,1200.0),(10,13,1500.0),
    (11,12,600.0),
    (12,13,300.0),
];

#[derive(Clone,Copy,Debug,PartialEq,Serialize)]
pub struct Link {
    pub id:LinkId,
    pub endpoints:(NodeId,NodeId),
    pub distance_km:DistanceKM
}

impl Link {
    pub fn connects(&self,node:NodeId) -> bool {
        self.endpoints.0 == node || self.endpoints.1 == node
    }
    pub fn other_end(&self,node:NodeId) -> Option<NodeId> {
        match self.endpoints {
            (a,b) if a == node => Some(b),
            (a,b) if b == node => Some(a),
            _ => None
        }
    }
}

#[derive(Clone,Debug,PartialEq,Serialize)]
pub struct TopologyStats {
    pub nodes:usize,
    pub links:usize,
    pub density:f64,
    pub is_connected:bool,
    pub average_degree:f64,
    pub min_distance_km:DistanceKM,
    pub max_distance_km:DistanceKM,
    pub total_distance_km:DistanceKM
}

// immutable once built, link ids are positions in the link enumeration
#[derive(Clone,Debug)]
pub struct Topology {
    nodes:Vec<NodeId>,
    links:Vec<Link>,
    graph:UnDirectedGraph
}

impl Topology {
    pub fn new<I:IntoIterator<Item = NodeId>>(nodes:I,links:&[(NodeId,NodeId,DistanceKM)]) -> Result<Self,TopologyError> {
        let mut nodes:Vec<NodeId> = nodes.into_iter().collect();
        nodes.sort_unstable();
        nodes.dedup();

        let mut graph = UnDirectedGraph::with_capacity(nodes.len());
        for node in nodes.iter() {
            graph.push_node(node);
        }
        let mut built = Vec::with_capacity(links.len());
        for &(a,b,distance_km) in links {
            for node in [a,b] {
                if !graph.contains_node(node) {
                    return Err(TopologyError::UnknownNode {link:(a,b),node});
                }
            }
            if a == b {
                return Err(TopologyError::SelfLoop(a));
            }
            if !(distance_km.is_finite() && distance_km > 0.0) {
                return Err(TopologyError::InvalidDistance {a,b,distance_km});
            }
            let Some(id) = graph.push_edge(a, b, distance_km) else {
                return Err(TopologyError::DuplicateLink(a,b));
            };
            debug_assert_eq!(id,built.len());
            built.push(Link {id,endpoints:(a,b),distance_km});
        }
        graph.shrink_to_fit();
        Ok(Self {nodes,links:built,graph})
    }
    pub fn nsfnet() -> Result<Self,TopologyError> {
        Self::new(0..NSFNET_NODES, &NSFNET_LINKS)
    }
    pub fn nodes(&self) -> &[NodeId] {
        &self.nodes
    }
    pub fn links(&self) -> &[Link] {
        &self.links
    }
    pub fn nodes_len(&self) -> usize {
        self.nodes.len()
    }
    pub fn links_len(&self) -> usize {
        self.links.len()
    }
    pub fn contains_node(&self,node:NodeId) -> bool {
        self.graph.contains_node(node)
    }
    pub fn link(&self,id:LinkId) -> Option<&Link> {
        self.links.get(id)
    }
    pub fn link_between(&self,a:NodeId,b:NodeId) -> Option<&Link> {
        self.links.get(self.graph.edge_between(a, b)?)
    }
    pub fn distance(&self,id:LinkId) -> Option<DistanceKM> {
        self.link(id).map(|link| link.distance_km)
    }
    // links incident to node, in link enumeration order
    pub fn neighbors(&self,node:NodeId) -> Option<impl Iterator<Item = &Link>> {
        let adjacent = self.graph.neighbours(node)?;
        Some(adjacent.iter().filter_map(|adj| self.links.get(adj.edge)))
    }
    pub(crate) fn graph(&self) -> &UnDirectedGraph {
        &self.graph
    }
    pub fn statistics(&self) -> TopologyStats {
        let n = self.nodes_len() as f64;
        let e = self.links_len() as f64;
        let distances = self.links.iter().map(|link| link.distance_km);
        TopologyStats {
            nodes:self.nodes_len(),
            links:self.links_len(),
            density:if self.nodes_len() > 1 {2.0*e/(n*(n - 1.0))} else {0.0},
            is_connected:self.graph.is_connected(),
            average_degree:if self.nodes_len() > 0 {2.0*e/n} else {0.0},
            min_distance_km:distances.clone().reduce(f64::min).unwrap_or(0.0),
            max_distance_km:distances.clone().reduce(f64::max).unwrap_or(0.0),
            total_distance_km:distances.sum()
        }
    }
}
