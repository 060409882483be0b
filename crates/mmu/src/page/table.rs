use super::entry::{PageTableEntry, RawEntry, RAW_ENTRY_SIZE};
use crate::typedef::{FrameId, Vpn};
use crate::Result;
use bytes::{BufMut, Bytes, BytesMut};
use std::collections::HashMap;
use vmsim_error::errdata;

/// Authoritative VPN -> entry mapping. Holds no fault policy; callers decide what an absent or
/// non-resident entry means.
#[derive(Debug, Default, Clone)]
pub struct PageTable {
    entries: HashMap<Vpn, PageTableEntry>,
}

impl PageTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lookup(&self, vpn: Vpn) -> Option<&PageTableEntry> {
        self.entries.get(&vpn)
    }

    /// Installs `entry` for `vpn`, returning the entry it replaced.
    pub fn map(&mut self, vpn: Vpn, entry: PageTableEntry) -> Option<PageTableEntry> {
        self.entries.insert(vpn, entry)
    }

    pub fn unmap(&mut self, vpn: Vpn) -> Option<PageTableEntry> {
        self.entries.remove(&vpn)
    }

    /// Marks a mapped page resident in `frame`, or not resident when `present` is false.
    /// Returns false if `vpn` is not mapped.
    pub fn set_present(&mut self, vpn: Vpn, present: bool, frame: FrameId) -> bool {
        match self.entries.get_mut(&vpn) {
            Some(entry) => {
                entry.present = present;
                entry.frame = frame;
                true
            }
            None => false,
        }
    }

    pub fn set_protected(&mut self, vpn: Vpn, protected: bool) -> bool {
        match self.entries.get_mut(&vpn) {
            Some(entry) => {
                entry.protected = protected;
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Vpn, &PageTableEntry)> {
        self.entries.iter().map(|(vpn, entry)| (*vpn, entry))
    }

    /// Loads a table from a packed image of fixed-size records. The image is a convenience for
    /// loaders and test fixtures, not a backing-store format.
    pub fn from_image(image: Bytes) -> Result<Self> {
        if image.len() % RAW_ENTRY_SIZE != 0 {
            return errdata!(
                "page table image of {} bytes is not a multiple of {RAW_ENTRY_SIZE}",
                image.len()
            );
        }

        let mut table = Self::new();
        for chunk in image.chunks_exact(RAW_ENTRY_SIZE) {
            // Bytes gives no alignment guarantee
            let raw: RawEntry = bytemuck::pod_read_unaligned(chunk);
            let (vpn, entry) = raw.decode()?;
            if table.map(vpn, entry).is_some() {
                return errdata!("duplicate page table entry for vpn {vpn:#x}");
            }
        }
        Ok(table)
    }

    /// Serializes the table into the image format read by [`PageTable::from_image`], ordered by
    /// VPN.
    pub fn to_image(&self) -> Bytes {
        let mut vpns: Vec<Vpn> = self.entries.keys().copied().collect();
        vpns.sort_unstable();

        let mut buf = BytesMut::with_capacity(vpns.len() * RAW_ENTRY_SIZE);
        for vpn in vpns {
            let raw = RawEntry::encode(vpn, &self.entries[&vpn]);
            buf.put_slice(bytemuck::bytes_of(&raw));
        }
        buf.freeze()
    }
}
