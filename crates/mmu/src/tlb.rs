use crate::page::PageTableEntry;
use crate::set_index::SetIndexer;
use crate::typedef::{FrameId, Vpn};
use crate::Result;
use log::{debug, trace};
use std::collections::VecDeque;
use vmsim_error::errinput;

/// Outcome of a TLB probe. A miss is an ordinary result that sends the caller to the page table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TlbLookup {
    Hit(FrameId),
    Miss,
    ProtectionFault,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct TlbEntry {
    tag: u64,
    frame: FrameId,
    protected: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TlbStats {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
}

#[derive(Debug, Clone)]
struct TlbSet {
    // None marks an empty slot
    slots: Vec<Option<TlbEntry>>,
    // occupied slot indices, oldest fill first
    fill_order: VecDeque<usize>,
}

impl TlbSet {
    fn new(ways: usize) -> Self {
        Self {
            slots: vec![None; ways],
            fill_order: VecDeque::with_capacity(ways),
        }
    }

    fn find(&self, tag: u64) -> Option<usize> {
        self.slots
            .iter()
            .position(|slot| matches!(slot, Some(entry) if entry.tag == tag))
    }

    /// Places `entry` in the set, returning the tag it displaced, if any.
    fn place(&mut self, entry: TlbEntry) -> Option<u64> {
        // a refresh keeps the slot's place in the fill order
        if let Some(i) = self.find(entry.tag) {
            self.slots[i] = Some(entry);
            return None;
        }
        if let Some(i) = self.slots.iter().position(Option::is_none) {
            self.slots[i] = Some(entry);
            self.fill_order.push_back(i);
            return None;
        }

        let victim = self.fill_order.pop_front()?;
        self.fill_order.push_back(victim);
        self.slots[victim].replace(entry).map(|old| old.tag)
    }

    fn remove(&mut self, i: usize) {
        self.slots[i] = None;
        self.fill_order.retain(|&slot| slot != i);
    }

    fn clear(&mut self) {
        self.slots.fill(None);
        self.fill_order.clear();
    }
}

/// A k-set associative translation cache. A full set evicts the slot filled longest ago,
/// independently of physical frame replacement.
#[derive(Debug, Clone)]
pub struct Tlb {
    indexer: SetIndexer,
    sets: Vec<TlbSet>,
    stats: TlbStats,
}

impl Tlb {
    pub fn new(sets: usize, ways: usize) -> Result<Self> {
        if ways == 0 {
            return errinput!("a TLB set needs at least one way");
        }
        let indexer = SetIndexer::new(sets as u64)?;
        Ok(Self {
            indexer,
            sets: vec![TlbSet::new(ways); sets],
            stats: TlbStats::default(),
        })
    }

    pub fn indexer(&self) -> &SetIndexer {
        &self.indexer
    }

    pub fn lookup(&mut self, vpn: Vpn) -> TlbLookup {
        let (index, tag) = self.indexer.split_vpn(vpn);
        let set = &self.sets[index as usize];

        match set.find(tag).and_then(|i| set.slots[i]) {
            Some(entry) if entry.protected => {
                debug!("tlb protection fault: vpn {vpn:#x} set {index}");
                TlbLookup::ProtectionFault
            }
            Some(entry) => {
                self.stats.hits += 1;
                trace!("tlb hit: vpn {vpn:#x} -> frame {:#x}", entry.frame);
                TlbLookup::Hit(entry.frame)
            }
            None => {
                self.stats.misses += 1;
                debug!("tlb miss: vpn {vpn:#x} set {index} tag {tag:#x}");
                TlbLookup::Miss
            }
        }
    }

    /// Caches a copy of `entry` for `vpn`. Returns the VPN evicted from the set, if any.
    pub fn insert(&mut self, vpn: Vpn, entry: &PageTableEntry) -> Option<Vpn> {
        let (index, tag) = self.indexer.split_vpn(vpn);
        let cached = TlbEntry {
            tag,
            frame: entry.frame,
            protected: entry.protected,
        };

        let evicted = self.sets[index as usize]
            .place(cached)
            .map(|old_tag| self.indexer.join(index, old_tag));
        if let Some(old) = evicted {
            self.stats.evictions += 1;
            debug!("tlb set {index} full: evicted vpn {old:#x} for vpn {vpn:#x}");
        }
        evicted
    }

    /// Drops the cached translation for `vpn`. Returns whether one was present.
    pub fn invalidate(&mut self, vpn: Vpn) -> bool {
        let (index, tag) = self.indexer.split_vpn(vpn);
        let set = &mut self.sets[index as usize];
        match set.find(tag) {
            Some(i) => {
                set.remove(i);
                true
            }
            None => false,
        }
    }

    /// Updates the protection bit of a cached translation in place.
    pub fn set_protected(&mut self, vpn: Vpn, protected: bool) -> bool {
        let (index, tag) = self.indexer.split_vpn(vpn);
        let set = &mut self.sets[index as usize];
        match set.find(tag).and_then(|i| set.slots[i].as_mut()) {
            Some(entry) => {
                entry.protected = protected;
                true
            }
            None => false,
        }
    }

    pub fn flush(&mut self) {
        for set in &mut self.sets {
            set.clear();
        }
    }

    pub fn stats(&self) -> TlbStats {
        self.stats
    }

    /// Number of occupied slots across all sets.
    pub fn len(&self) -> usize {
        self.sets
            .iter()
            .map(|set| set.slots.iter().filter(|slot| slot.is_some()).count())
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
