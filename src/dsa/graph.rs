use std::borrow::Borrow;
use std::cmp::Ordering;
use std::collections::BinaryHeap;

type HashMap<K,V> = std::collections::hash_map::HashMap<K,V,nohash::BuildNoHashHasher<usize>>;
pub(crate) type HashSet<K> = std::collections::hash_set::HashSet<K,nohash::BuildNoHashHasher<usize>>;

// one entry in a node's adjacency list
// edge is the index of the edge in insertion order
#[derive(Clone,Copy,Debug,PartialEq)]
pub struct Adjacent {
    pub node:usize,
    pub edge:usize,
    pub weight:f64
}

// a loopless walk through the graph, edges[i] joins nodes[i] and nodes[i+1]
#[derive(Clone,Debug,PartialEq)]
pub struct GraphPath {
    pub nodes:Vec<usize>,
    pub edges:Vec<usize>,
    pub weight:f64
}

impl GraphPath {
    fn trivial(node:usize) -> Self {
        Self {nodes:vec![node],edges:vec![],weight:0.0}
    }
    // same nodes visited, in any order
    fn same_node_set(&self,other:&Self) -> bool {
        if self.nodes.len() != other.nodes.len() {
            return false;
        }
        let mut mine = self.nodes.clone();
        let mut theirs = other.nodes.clone();
        mine.sort_unstable();
        theirs.sort_unstable();
        mine == theirs
    }
    // distance first, then hop count, then node sequence
    fn rank(&self,other:&Self) -> Ordering {
        self.weight.total_cmp(&other.weight)
            .then(self.nodes.len().cmp(&other.nodes.len()))
            .then_with(|| self.nodes.cmp(&other.nodes))
    }
}

// sequence counts pushes, adjacency lists are in edge order
#[derive(Clone,Copy,PartialEq)]
struct Frontier {
    distance:f64,
    sequence:usize,
    node:usize
}

impl Eq for Frontier {}

// reversed so BinaryHeap pops the closest node, equal distances pop the earliest push
impl Ord for Frontier {
    fn cmp(&self, other: &Self) -> Ordering {
        other.distance.total_cmp(&self.distance)
            .then_with(|| other.sequence.cmp(&self.sequence))
    }
}

impl PartialOrd for Frontier {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

// undirected weighted graph, no self loops and no parallel edges
// adjacency lists keep edge insertion order so every traversal is deterministic
#[derive(Clone,Debug)]
pub struct UnDirectedGraph {
    edges:Vec<(usize,usize,f64)>,
    adjacency_list:HashMap<usize,Vec<Adjacent>>
}

impl Default for UnDirectedGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl UnDirectedGraph {
    pub fn edges_len(&self) -> usize {
        self.edges.len()
    }
    pub fn nodes_len(&self) -> usize {
        self.adjacency_list.len()
    }
    pub fn is_empty(&self) -> bool {
        if self.nodes_len() == 0 {
            debug_assert!(self.edges_len() == 0);
            return true;
        }
        false
    }
    pub fn new() -> Self {
        Self {
            edges:vec![],
            adjacency_list:HashMap::with_hasher(
                nohash::BuildNoHashHasher::default()
            )
        }
    }
    pub fn with_capacity(capacity:usize) -> Self {
        Self {
            edges:Vec::with_capacity(capacity),
            adjacency_list:HashMap::with_capacity_and_hasher(
                capacity,
                nohash::BuildNoHashHasher::default())
        }
    }
    pub fn contains_node(&self,node:usize) -> bool {
        self.adjacency_list.contains_key(&node)
    }
    // only push node, not adding edges
    pub fn push_node<B:Borrow<usize>>(&mut self,node:B) {
        let node = node.borrow();
        if self.adjacency_list.contains_key(node) {
            return;
        }
        self.adjacency_list.insert(*node,vec![]);
    }
    pub fn contains_edge(&self,node1:usize,node2:usize) -> bool {
        self.edge_between(node1, node2).is_some()
    }
    pub fn edge_between(&self,node1:usize,node2:usize) -> Option<usize> {
        self.adjacency_list.get(&node1)?
            .iter()
            .find(|adj| adj.node == node2)
            .map(|adj| adj.edge)
    }
    // returns the new edge index
    // None for a self loop or an edge that is already present
    pub fn push_edge(&mut self,node1:usize,node2:usize,weight:f64) -> Option<usize> {
        if node1 == node2 || self.contains_edge(node1, node2) {
            return None;
        }
        let edge = self.edges.len();
        self.edges.push((node1,node2,weight));
        self.adjacency_list.entry(node1).or_default().push(Adjacent {node:node2,edge,weight});
        self.adjacency_list.entry(node2).or_default().push(Adjacent {node:node1,edge,weight});
        Some(edge)
    }
    pub fn edge(&self,edge:usize) -> Option<(usize,usize,f64)> {
        self.edges.get(edge).copied()
    }
    pub fn neighbours(&self,node:usize) -> Option<&[Adjacent]> {
        self.adjacency_list.get(&node).map(|adj| adj.as_slice())
    }
    pub fn degree(&self,node:usize) -> Option<usize> {
        self.neighbours(node).map(|adj| adj.len())
    }
    pub fn shrink_to_fit(&mut self) {
        self.edges.shrink_to_fit();
        self.adjacency_list.shrink_to_fit();
        for v in self.adjacency_list.values_mut() {
            v.shrink_to_fit();
        }
    }
    // visiting order of a depth first search, None if start_node is not in the graph
    pub fn dfs(&self,start_node:usize) -> Option<Vec<usize>> {
        if !self.contains_node(start_node) {
            return None;
        }
        let mut visited:HashSet<usize> = HashSet::with_capacity_and_hasher(
            self.nodes_len(), nohash::BuildNoHashHasher::default()
        );
        let mut stack = Vec::with_capacity(self.nodes_len());
        let mut order = Vec::with_capacity(self.nodes_len());
        stack.push(start_node);
        while let Some(current) = stack.pop() {
            if !visited.insert(current) {
                continue;
            }
            order.push(current);
            // pushed in reverse so the lowest edge is explored first
            for next in self.neighbours(current)?.iter().rev() {
                if !visited.contains(&next.node) {
                    stack.push(next.node);
                }
            }
        }
        Some(order)
    }
    pub fn is_connected(&self) -> bool {
        let Some(start) = self.adjacency_list.keys().min() else {return true};
        self.dfs(*start).is_some_and(|order| order.len() == self.nodes_len())
    }
    pub fn path_weight(&self,edges:&[usize]) -> Option<f64> {
        edges.iter().map(|edge| self.edge(*edge).map(|(_,_,weight)| weight)).sum()
    }
    pub fn shortest_path(&self,start:usize,end:usize) -> Option<GraphPath> {
        let no_nodes = HashSet::with_hasher(nohash::BuildNoHashHasher::default());
        let no_edges = HashSet::with_hasher(nohash::BuildNoHashHasher::default());
        self.shortest_path_excluding(start, end, &no_nodes, &no_edges)
    }
    // dijkstra, ignoring the given nodes and edges
    // a node is only relaxed on a strictly shorter distance and equal distances
    // leave the heap in push order, so among equal paths the one found first
    // through the lowest indexed edges is kept
    pub(crate) fn shortest_path_excluding(&self,start:usize,end:usize,
        excluded_nodes:&HashSet<usize>,excluded_edges:&HashSet<usize>) -> Option<GraphPath> {
        if !self.contains_node(start) || !self.contains_node(end) {
            return None;
        }
        if start == end {
            return Some(GraphPath::trivial(start));
        }
        let mut distances:HashMap<usize,f64> = HashMap::with_capacity_and_hasher(
            self.nodes_len(), nohash::BuildNoHashHasher::default()
        );
        //记录前驱节点和经过的边
        let mut previous:HashMap<usize,(usize,usize)> = HashMap::with_capacity_and_hasher(
            self.nodes_len(), nohash::BuildNoHashHasher::default()
        );
        let mut heap = BinaryHeap::with_capacity(self.nodes_len());
        distances.insert(start, 0.0);
        let mut sequence = 0;
        heap.push(Frontier {distance:0.0,sequence,node:start});

        while let Some(Frontier {distance,node,..}) = heap.pop() {
            if node == end {
                break;
            }
            if distances.get(&node).is_some_and(|best| distance > *best) {
                continue;
            }
            for adj in self.neighbours(node)? {
                if excluded_nodes.contains(&adj.node) || excluded_edges.contains(&adj.edge) {
                    continue;
                }
                let next_distance = distance + adj.weight;
                if distances.get(&adj.node).is_none_or(|best| next_distance < *best) {
                    distances.insert(adj.node, next_distance);
                    previous.insert(adj.node, (node,adj.edge));
                    sequence += 1;
                    heap.push(Frontier {distance:next_distance,sequence,node:adj.node});
                }
            }
        }

        let weight = *distances.get(&end)?;
        let mut nodes = vec![end];
        let mut edges = vec![];
        let mut current = end;
        while current != start {
            let (prev,edge) = *previous.get(&current)?;
            nodes.push(prev);
            edges.push(edge);
            current = prev;
        }
        nodes.reverse();
        edges.reverse();
        Some(GraphPath {nodes,edges,weight})
    }
    // yen's algorithm, up to k loopless paths in ascending weight
    pub fn k_shortest_paths(&self,start:usize,end:usize,k:usize) -> Vec<GraphPath> {
        if k == 0 {
            return vec![];
        }
        let Some(first) = self.shortest_path(start, end) else {return vec![]};
        let mut accepted = vec![first];
        let mut candidates:Vec<GraphPath> = vec![];

        while accepted.len() < k {
            let Some(last) = accepted.last() else {break};
            for i in 0..last.nodes.len().saturating_sub(1) {
                let spur = last.nodes[i];
                let root_nodes = &last.nodes[..=i];
                let root_edges = &last.edges[..i];

                // cut the edge every accepted path sharing this root leaves the spur by
                let mut excluded_edges:HashSet<usize> = HashSet::with_hasher(nohash::BuildNoHashHasher::default());
                for path in accepted.iter() {
                    if path.nodes.len() > i && path.nodes[..=i] == *root_nodes {
                        if let Some(edge) = path.edges.get(i) {
                            excluded_edges.insert(*edge);
                        }
                    }
                }
                let excluded_nodes:HashSet<usize> = root_nodes[..i].iter().copied().collect();

                let Some(spur_path) = self.shortest_path_excluding(spur, end, &excluded_nodes, &excluded_edges)
                    else {continue};

                let mut nodes = root_nodes[..i].to_vec();
                nodes.extend(spur_path.nodes);
                let mut edges = root_edges.to_vec();
                edges.extend(spur_path.edges);
                let Some(weight) = self.path_weight(&edges) else {continue};
                let candidate = GraphPath {nodes,edges,weight};

                let is_known = accepted.iter().chain(candidates.iter())
                    .any(|path| path.same_node_set(&candidate));
                if !is_known {
                    candidates.push(candidate);
                }
            }

            let best = candidates.iter().enumerate()
                .min_by(|(_,a),(_,b)| a.rank(b))
                .map(|(index,_)| index);
            let Some(best) = best else {break};
            accepted.push(candidates.swap_remove(best));
        }
        accepted
    }
}

impl<B:Borrow<(usize,usize,f64)>> FromIterator<B> for UnDirectedGraph {
    fn from_iter<T: IntoIterator<Item = B>>(iter: T) -> Self {
        let iter = iter.into_iter();
        let size_estimation = match iter.size_hint() {
            (_,Some(n)) => {n},
            (n,None) => {n}
        };
        let mut new_graph = Self::with_capacity(size_estimation);
        for b in iter {
            let (node1,node2,weight) = b.borrow();
            new_graph.push_edge(*node1, *node2, *weight);
        }
        new_graph.shrink_to_fit();
        new_graph
    }
}

impl<T:AsRef<[(usize,usize,f64)]>> From<T> for UnDirectedGraph {
    fn from(value: T) -> Self {
        value.as_ref().iter().collect()
    }
}
