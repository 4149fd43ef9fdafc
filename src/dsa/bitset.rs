use std::ops::Range;

// fixed length bitset, bit i lives in bytes[i/8] at position i%8
// bits past size in the last byte are always 0
#[derive(Clone,Debug,PartialEq,Eq)]
pub(crate) struct BitSet {
    size:usize,
    bytes:Vec<u8>
}

impl BitSet {
    pub(crate) fn new() -> Self {
        Self {size:0,bytes:vec![]}
    }
    // all bits cleared
    pub(crate) fn with_len(len:usize) -> Self {
        if len == 0 {return Self::new()}
        Self {
            size:len,
            bytes:vec![0u8;len.div_ceil(8)]
        }
    }
    pub(crate) fn get_at(&self,index:usize) -> Option<bool> {
        if index >= self.size {return None}
        let byte_pos = index / 8;
        let pos_in_byte = index % 8;
        let byte = self.bytes.get(byte_pos)?;
        let mask = 1u8 << pos_in_byte;
        Some(*byte & mask > 0)
    }
    pub(crate) fn store_at(&mut self,index:usize,bit:bool) -> Option<()> {
        if index >= self.size {return None}
        let byte_pos = index / 8;
        let pos_in_byte = index % 8;
        let byte = self.bytes.get_mut(byte_pos)?;
        let mask = 1u8 << pos_in_byte;
        if bit {
            *byte |= mask;
        }else{
            *byte &= !mask;
        }
        Some(())
    }
    // first set bit inside range, if any
    pub(crate) fn first_set_in(&self,range:Range<usize>) -> Option<usize> {
        let end = range.end.min(self.size);
        (range.start..end).find(|index| self.get_at(*index).unwrap_or(false))
    }
    pub(crate) fn last_set_in(&self,range:Range<usize>) -> Option<usize> {
        let end = range.end.min(self.size);
        (range.start..end).rev().find(|index| self.get_at(*index).unwrap_or(false))
    }
    pub(crate) fn store_range(&mut self,range:Range<usize>,bit:bool) -> Option<()> {
        if range.end > self.size {return None}
        for index in range {
            self.store_at(index, bit)?;
        }
        Some(())
    }
    pub(crate) fn count_ones(&self) -> usize {
        self.bytes.iter().map(|byte| byte.count_ones() as usize).sum()
    }
    pub(crate) fn last_set(&self) -> Option<usize> {
        //从最后一个非零字节往回找
        let (byte_pos,byte) = self.bytes.iter().enumerate().rev().find(|(_,byte)| **byte != 0)?;
        let pos_in_byte = 7 - byte.leading_zeros() as usize;
        Some(byte_pos*8 + pos_in_byte)
    }
}

impl Default for BitSet {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests{
    use super::BitSet;
    use rand::Rng;

    #[test]
    fn test_create() {
        let empty = BitSet::new();
        assert_eq!(empty.last_set(),None);
        let mut set = BitSet::with_len(320);
        assert_eq!(set.count_ones(),0);
        set.store_at(319, true).unwrap();
        assert_eq!(set.store_at(1145, true),None);
        assert!(set.get_at(319).unwrap());
        assert!(!set.get_at(318).unwrap());
        assert_eq!(set.get_at(320),None);
    }
    #[test]
    fn test_ranges() {
        let mut set = BitSet::with_len(20);
        set.store_range(5..9, true).unwrap();
        assert_eq!(set.count_ones(),4);
        assert_eq!(set.first_set_in(0..20),Some(5));
        assert_eq!(set.first_set_in(9..20),None);
        assert_eq!(set.last_set_in(0..7),Some(6));
        assert_eq!(set.last_set_in(0..5),None);
        assert_eq!(set.last_set(),Some(8));
        set.store_range(5..9, false).unwrap();
        assert_eq!(set.count_ones(),0);
        assert_eq!(set.store_range(18..21, true),None);
    }
    #[test]
    fn test_last_set_random() {
        let mut rng = rand::rng();
        for _ in 0..64 {
            let len = rng.random_range(1..1000);
            let mut set = BitSet::with_len(len);
            let mut highest = None;
            for _ in 0..rng.random_range(0..16) {
                let index = rng.random_range(0..len);
                set.store_at(index, true).unwrap();
                highest = highest.max(Some(index));
            }
            assert_eq!(set.last_set(),highest);
        }
    }
}
