use std::ops::Range;

use thiserror::Error;

use crate::dsa::bitset::BitSet;
use super::modulation::ModulationFormat;
use super::routing::Path;
use super::topology::Topology;
use super::{AllocationId, DemandId, LinkId, SlotIndex};

type HashMap<K,V> = std::collections::hash_map::HashMap<K,V,nohash::BuildNoHashHasher<usize>>;

#[derive(Error,Debug,Clone,PartialEq)]
pub enum SpectrumError {
    #[error("slot {slot} on link {link} is already occupied")]
    Overlap{link:LinkId,slot:SlotIndex},
    #[error("slots {start}..{end} do not fit in a spectrum of {max_slots} slots")]
    OutOfRange{start:SlotIndex,end:SlotIndex,max_slots:usize},
    #[error("link {0} is not part of this network")]
    UnknownLink(LinkId),
    #[error("allocation {0} does not exist")]
    UnknownAllocation(AllocationId),
    #[error("an allocation needs at least one slot and one link")]
    EmptyAllocation
}

#[derive(Clone,Debug,PartialEq)]
pub struct Allocation {
    pub id:AllocationId,
    pub demand_id:DemandId,
    pub path:Path,
    pub slot_start:SlotIndex,
    pub slot_count:usize,
    pub modulation:ModulationFormat
}

impl Allocation {
    pub fn slots(&self) -> Range<SlotIndex> {
        self.slot_start..self.slot_start + self.slot_count
    }
}

/* one spectrum vector per link, spectrum[link][slot] set means occupied
an allocation occupies the same slot range on every link of its path
(spectrum continuity), so it takes up a whole column
across the links it crosses */
#[derive(Clone,Debug)]
pub struct NetworkState {
    max_slots:usize,
    spectrum:Vec<BitSet>,
    allocations:HashMap<AllocationId,Allocation>,
    next_allocation:AllocationId,
    // 1 + highest occupied slot, 0 when empty
    watermark:usize
}

impl NetworkState {
    pub fn new(topology:&Topology,max_slots:usize) -> Self {
        Self::with_links(topology.links_len(), max_slots)
    }
    pub fn with_links(links_len:usize,max_slots:usize) -> Self {
        Self {
            max_slots,
            spectrum:vec![BitSet::with_len(max_slots);links_len],
            allocations:HashMap::with_hasher(nohash::BuildNoHashHasher::default()),
            next_allocation:0,
            watermark:0
        }
    }
    pub fn max_slots(&self) -> usize {
        self.max_slots
    }
    pub fn links_len(&self) -> usize {
        self.spectrum.len()
    }
    pub fn is_free(&self,link:LinkId,slot:SlotIndex) -> Option<bool> {
        self.spectrum.get(link)?.get_at(slot).map(|occupied| !occupied)
    }
    fn path_spectra(&self,path:&Path,slot_count:usize) -> Option<Vec<&BitSet>> {
        if slot_count == 0 || slot_count > self.max_slots || path.links().is_empty() {
            return None;
        }
        path.links().iter().map(|link| self.spectrum.get(*link)).collect()
    }
    // lowest start >= from whose window is free on every given link
    fn next_free(&self,spectra:&[&BitSet],from:SlotIndex,slot_count:usize) -> Option<SlotIndex> {
        let mut start = from;
        while start + slot_count <= self.max_slots {
            let window = start..start + slot_count;
            // every start up to the highest occupied slot in the window would still cover it
            let blocking = spectra.iter()
                .filter_map(|link_slots| link_slots.last_set_in(window.clone()))
                .max();
            match blocking {
                None => return Some(start),
                Some(slot) => start = slot + 1
            }
        }
        None
    }
    // lowest start whose window is free on every link of the path
    pub fn find_first_fit(&self,path:&Path,slot_count:usize) -> Option<SlotIndex> {
        let spectra = self.path_spectra(path, slot_count)?;
        self.next_free(&spectra, 0, slot_count)
    }
    /* every feasible start, best first, at most max_positions of them
    windows that stay under the path's own watermark come first,
    then the ones raising it the least, lower start on ties */
    pub fn find_best_fit_positions(&self,path:&Path,slot_count:usize,max_positions:usize) -> Vec<SlotIndex> {
        let Some(spectra) = self.path_spectra(path, slot_count) else {
            return vec![];
        };
        let path_watermark = spectra.iter()
            .filter_map(|link_slots| link_slots.last_set())
            .map(|slot| slot + 1)
            .max()
            .unwrap_or(0);
        let mut positions = vec![];
        let mut from = 0;
        while let Some(start) = self.next_free(&spectra, from, slot_count) {
            positions.push(start);
            from = start + 1;
        }
        positions.sort_by_key(|start| {
            let end = start + slot_count;
            (end > path_watermark,end.max(path_watermark),*start)
        });
        positions.truncate(max_positions);
        positions
    }
    pub fn allocate(&mut self,path:&Path,slot_start:SlotIndex,slot_count:usize,
        modulation:&ModulationFormat,demand_id:DemandId) -> Result<AllocationId,SpectrumError> {
        if slot_count == 0 || path.links().is_empty() {
            return Err(SpectrumError::EmptyAllocation);
        }
        let slots = slot_start..slot_start + slot_count;
        if slots.end > self.max_slots {
            return Err(SpectrumError::OutOfRange {start:slots.start,end:slots.end,max_slots:self.max_slots});
        }
        // check everything before touching anything
        for link in path.links() {
            let link_slots = self.spectrum.get(*link).ok_or(SpectrumError::UnknownLink(*link))?;
            if let Some(slot) = link_slots.first_set_in(slots.clone()) {
                return Err(SpectrumError::Overlap {link:*link,slot});
            }
        }
        for link in path.links() {
            self.spectrum[*link].store_range(slots.clone(), true)
                .ok_or(SpectrumError::OutOfRange {start:slots.start,end:slots.end,max_slots:self.max_slots})?;
        }
        self.watermark = self.watermark.max(slots.end);

        let id = self.next_allocation;
        self.next_allocation += 1;
        self.allocations.insert(id, Allocation {
            id,
            demand_id,
            path:path.clone(),
            slot_start,
            slot_count,
            modulation:modulation.clone()
        });
        Ok(id)
    }
    pub fn release(&mut self,id:AllocationId) -> Result<Allocation,SpectrumError> {
        let allocation = self.allocations.remove(&id).ok_or(SpectrumError::UnknownAllocation(id))?;
        for link in allocation.path.links() {
            if let Some(link_slots) = self.spectrum.get_mut(*link) {
                link_slots.store_range(allocation.slots(), false);
            }
        }
        if allocation.slots().end >= self.watermark {
            self.recalculate_watermark();
        }
        Ok(allocation)
    }
    fn recalculate_watermark(&mut self) {
        self.watermark = self.spectrum.iter()
            .filter_map(|link_slots| link_slots.last_set())
            .map(|slot| slot + 1)
            .max()
            .unwrap_or(0);
    }
    pub fn watermark(&self) -> usize {
        self.watermark
    }
    // watermark the network would have with slot_start..slot_start+slot_count committed
    pub fn hypothetical_watermark(&self,slot_start:SlotIndex,slot_count:usize) -> usize {
        if slot_count == 0 {
            return self.watermark;
        }
        self.watermark.max(slot_start + slot_count)
    }
    pub fn link_watermark(&self,link:LinkId) -> Option<usize> {
        let link_slots = self.spectrum.get(link)?;
        Some(link_slots.last_set().map_or(0, |slot| slot + 1))
    }
    pub fn occupied_slots(&self) -> usize {
        self.spectrum.iter().map(|link_slots| link_slots.count_ones()).sum()
    }
    // occupied fraction over every slot of every link
    pub fn utilization(&self) -> f64 {
        let total = self.links_len()*self.max_slots;
        if total == 0 {
            return 0.0;
        }
        self.occupied_slots() as f64/total as f64
    }
    pub fn link_utilization(&self,link:LinkId) -> Option<f64> {
        let link_slots = self.spectrum.get(link)?;
        if self.max_slots == 0 {
            return Some(0.0);
        }
        Some(link_slots.count_ones() as f64/self.max_slots as f64)
    }
    pub fn allocation(&self,id:AllocationId) -> Option<&Allocation> {
        self.allocations.get(&id)
    }
    // in creation order
    pub fn allocations(&self) -> Vec<&Allocation> {
        let mut allocations:Vec<&Allocation> = self.allocations.values().collect();
        allocations.sort_by_key(|allocation| allocation.id);
        allocations
    }
    pub fn allocations_len(&self) -> usize {
        self.allocations.len()
    }
}

#[cfg(test)]
mod tests {
    use rand::Rng;

    use super::{NetworkState, SpectrumError};
    use crate::optical_network::config::DEFAULT_MODULATION_TABLE;
    use crate::optical_network::modulation::ModulationFormat;
    use crate::optical_network::routing::{Path, PathFinder};
    use crate::optical_network::topology::Topology;

    fn bpsk() -> ModulationFormat {
        DEFAULT_MODULATION_TABLE[3].clone()
    }

    fn line() -> Topology {
        Topology::new(0..4, &[(0,1,100.0),(1,2,100.0),(2,3,100.0)]).unwrap()
    }

    #[test]
    fn test_empty_state() {
        let topology = Topology::nsfnet().unwrap();
        let state = NetworkState::new(&topology, 320);
        assert_eq!(state.links_len(),21);
        assert_eq!(state.watermark(),0);
        assert_eq!(state.utilization(),0.0);
        assert_eq!(state.link_watermark(0),Some(0));
        let path = PathFinder::new(&topology).shortest_path(0, 2).unwrap();
        assert_eq!(state.find_first_fit(&path, 5),Some(0));
    }
    #[test]
    fn test_first_fit_skips_occupied() {
        let topology = line();
        let mut state = NetworkState::new(&topology, 20);
        let first = Path::from_nodes(&topology, &[0,1]).unwrap();
        let second = Path::from_nodes(&topology, &[1,2]).unwrap();
        state.allocate(&first, 0, 4, &bpsk(), 0).unwrap();
        state.allocate(&second, 3, 4, &bpsk(), 1).unwrap();
        let both = Path::from_nodes(&topology, &[0,1,2]).unwrap();
        assert_eq!(state.find_first_fit(&both, 3),Some(7));
        // a single slot still fits nowhere below 7
        assert_eq!(state.find_first_fit(&both, 1),Some(7));
        assert_eq!(state.find_first_fit(&first, 4),Some(4));
        assert_eq!(state.find_first_fit(&both, 14),None);
        assert_eq!(state.find_first_fit(&both, 13),Some(7));
        assert_eq!(state.find_first_fit(&both, 0),None);
    }
    #[test]
    fn test_best_fit_positions() {
        let topology = line();
        let mut state = NetworkState::new(&topology, 20);
        let first = Path::from_nodes(&topology, &[0,1]).unwrap();
        let second = Path::from_nodes(&topology, &[1,2]).unwrap();
        let third = Path::from_nodes(&topology, &[2,3]).unwrap();
        state.allocate(&first, 0, 2, &bpsk(), 0).unwrap();
        state.allocate(&second, 6, 4, &bpsk(), 1).unwrap();
        // off the path, must not count towards its watermark
        state.allocate(&third, 15, 4, &bpsk(), 2).unwrap();
        let both = Path::from_nodes(&topology, &[0,1,2]).unwrap();
        // 2..6 sits under the path watermark of 10, 10..20 raises it
        assert_eq!(state.find_best_fit_positions(&both, 2, 5),vec![2,3,4,10,11]);
        assert_eq!(state.find_best_fit_positions(&both, 2, 100).len(),3 + 9);
        assert_eq!(state.find_best_fit_positions(&both, 5, 3),vec![10,11,12]);
        assert_eq!(state.find_best_fit_positions(&both, 2, 1)[0],state.find_first_fit(&both, 2).unwrap());
        assert!(state.find_best_fit_positions(&both, 2, 0).is_empty());
        assert!(state.find_best_fit_positions(&both, 0, 5).is_empty());
        assert!(state.find_best_fit_positions(&both, 21, 5).is_empty());
    }
    #[test]
    fn test_first_fit_matches_brute_force() {
        let topology = line();
        let path = Path::from_nodes(&topology, &[0,1,2,3]).unwrap();
        let mut rng = rand::rng();
        for _ in 0..200 {
            let max_slots = rng.random_range(1..40);
            let mut state = NetworkState::new(&topology, max_slots);
            for demand in 0..rng.random_range(0..10) {
                let link = rng.random_range(0..3);
                let single = Path::from_nodes(&topology, &[link,link + 1]).unwrap();
                let start = rng.random_range(0..max_slots);
                let count = rng.random_range(1..=max_slots - start);
                let _ = state.allocate(&single, start, count, &bpsk(), demand);
            }
            let count = rng.random_range(1..=max_slots);
            let expected = (0..=max_slots - count).find(|start| {
                path.links().iter().all(|link| {
                    (*start..*start + count).all(|slot| state.is_free(*link, slot).unwrap())
                })
            });
            assert_eq!(state.find_first_fit(&path, count),expected);
        }
    }
    #[test]
    fn test_overlap_is_rejected_without_side_effects() {
        let topology = line();
        let mut state = NetworkState::new(&topology, 10);
        let long = Path::from_nodes(&topology, &[0,1,2,3]).unwrap();
        let last = Path::from_nodes(&topology, &[2,3]).unwrap();
        state.allocate(&last, 2, 2, &bpsk(), 0).unwrap();
        let err = state.allocate(&long, 0, 3, &bpsk(), 1).unwrap_err();
        assert_eq!(err,SpectrumError::Overlap {link:2,slot:2});
        assert_eq!(state.occupied_slots(),2);
        assert_eq!(state.allocations_len(),1);
        assert!(matches!(state.allocate(&long, 8, 3, &bpsk(), 2),Err(SpectrumError::OutOfRange{..})));
        assert_eq!(state.allocate(&long, 0, 0, &bpsk(), 3),Err(SpectrumError::EmptyAllocation));
    }
    #[test]
    fn test_continuity_and_release() {
        let topology = line();
        let mut state = NetworkState::new(&topology, 10);
        let long = Path::from_nodes(&topology, &[0,1,2,3]).unwrap();
        let id = state.allocate(&long, 1, 3, &bpsk(), 7).unwrap();
        for link in 0..3 {
            assert_eq!(state.link_watermark(link),Some(4));
            assert_eq!(state.is_free(link, 0),Some(true));
            for slot in 1..4 {
                assert_eq!(state.is_free(link, slot),Some(false));
            }
        }
        assert_eq!(state.watermark(),4);
        assert_eq!(state.utilization(),9.0/30.0);
        assert_eq!(state.link_utilization(0),Some(0.3));
        assert_eq!(state.allocation(id).unwrap().demand_id,7);

        let released = state.release(id).unwrap();
        assert_eq!(released.slots(),1..4);
        assert_eq!(state.watermark(),0);
        assert_eq!(state.occupied_slots(),0);
        assert_eq!(state.release(id),Err(SpectrumError::UnknownAllocation(id)));
    }
    #[test]
    fn test_release_recomputes_watermark() {
        let topology = line();
        let mut state = NetworkState::new(&topology, 10);
        let first = Path::from_nodes(&topology, &[0,1]).unwrap();
        let last = Path::from_nodes(&topology, &[2,3]).unwrap();
        state.allocate(&first, 0, 2, &bpsk(), 0).unwrap();
        let high = state.allocate(&last, 5, 3, &bpsk(), 1).unwrap();
        assert_eq!(state.watermark(),8);
        assert_eq!(state.hypothetical_watermark(2, 2),8);
        assert_eq!(state.hypothetical_watermark(7, 2),9);
        state.release(high).unwrap();
        assert_eq!(state.watermark(),2);
    }
    #[test]
    fn test_unknown_link() {
        let topology = line();
        let other = Topology::nsfnet().unwrap();
        let mut state = NetworkState::new(&topology, 10);
        let foreign = Path::from_nodes(&other, &[12,13]).unwrap();
        assert_eq!(state.find_first_fit(&foreign, 1),None);
        assert!(matches!(state.allocate(&foreign, 0, 1, &bpsk(), 0),Err(SpectrumError::UnknownLink(_))));
    }
}
