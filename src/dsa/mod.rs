pub(crate) mod bitset;
pub mod graph;
