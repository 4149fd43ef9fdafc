use serde::Serialize;

use crate::dsa::graph::GraphPath;
use super::topology::Topology;
use super::{DistanceKM, LinkId, NodeId};

#[derive(Clone,Debug,PartialEq,Serialize)]
pub struct Path {
    nodes:Vec<NodeId>,
    links:Vec<LinkId>,
    length_km:DistanceKM
}

impl From<GraphPath> for Path {
    fn from(value: GraphPath) -> Self {
        Self {nodes:value.nodes,links:value.edges,length_km:value.weight}
    }
}

impl Path {
    // None if consecutive nodes are not linked
    pub fn from_nodes(topology:&Topology,nodes:&[NodeId]) -> Option<Self> {
        let mut links = Vec::with_capacity(nodes.len().saturating_sub(1));
        let mut length_km = 0.0;
        for pair in nodes.windows(2) {
            let link = topology.link_between(pair[0], pair[1])?;
            links.push(link.id);
            length_km += link.distance_km;
        }
        if nodes.is_empty() {
            return None;
        }
        Some(Self {nodes:nodes.to_vec(),links,length_km})
    }
    pub fn nodes(&self) -> &[NodeId] {
        &self.nodes
    }
    pub fn links(&self) -> &[LinkId] {
        &self.links
    }
    pub fn length_km(&self) -> DistanceKM {
        self.length_km
    }
    pub fn hops(&self) -> usize {
        self.links.len()
    }
    pub fn source(&self) -> Option<NodeId> {
        self.nodes.first().copied()
    }
    pub fn destination(&self) -> Option<NodeId> {
        self.nodes.last().copied()
    }
}

// routes over a topology, distance is the path weight
#[derive(Clone,Copy,Debug)]
pub struct PathFinder<'a> {
    topology:&'a Topology
}

impl<'a> PathFinder<'a> {
    pub fn new(topology:&'a Topology) -> Self {
        Self {topology}
    }
    pub fn topology(&self) -> &'a Topology {
        self.topology
    }
    pub fn shortest_path(&self,source:NodeId,destination:NodeId) -> Option<Path> {
        self.topology.graph().shortest_path(source, destination).map(Path::from)
    }
    // loopless, ascending length, fewer than k when fewer simple paths exist
    pub fn k_shortest_paths(&self,source:NodeId,destination:NodeId,k:usize) -> Vec<Path> {
        self.topology.graph()
            .k_shortest_paths(source, destination, k)
            .into_iter()
            .map(Path::from)
            .collect()
    }
}
