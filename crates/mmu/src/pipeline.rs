use crate::address::AddressCodec;
use crate::page::{PageTable, PageTableEntry};
use crate::tlb::{Tlb, TlbLookup};
use crate::typedef::{FrameId, PhysicalAddress, VirtualAddress, Vpn};
use crate::Result;
use log::debug;
use vmsim_error::Error;

/// Everything that happened while translating one address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Translation {
    pub virtual_address: VirtualAddress,
    pub vpn: Vpn,
    pub offset: u64,
    pub tlb_index: u64,
    pub tlb_tag: u64,
    pub tlb_hit: bool,
    pub frame: FrameId,
    pub physical_address: PhysicalAddress,
}

impl std::fmt::Display for Translation {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        //  vaddr    vpn  offset  tag  idx  tlb   frame  paddr
        write!(
            f,
            "{:08x} {:6x} {:4x} {:6x} {:3x} {:4} {:6x} {:08x}",
            self.virtual_address,
            self.vpn,
            self.offset,
            self.tlb_tag,
            self.tlb_index,
            if self.tlb_hit { "hit" } else { "miss" },
            self.frame,
            self.physical_address,
        )
    }
}

/// Translates virtual addresses through the TLB, falling back to the page table on a miss.
#[derive(Debug, Clone)]
pub struct TranslationPipeline {
    codec: AddressCodec,
    tlb: Tlb,
    page_table: PageTable,
}

impl TranslationPipeline {
    pub fn new(codec: AddressCodec, tlb: Tlb, page_table: PageTable) -> Self {
        Self {
            codec,
            tlb,
            page_table,
        }
    }

    pub fn translate(&mut self, virtual_address: VirtualAddress) -> Result<PhysicalAddress> {
        self.translate_detailed(virtual_address)
            .map(|translation| translation.physical_address)
    }

    pub fn translate_detailed(&mut self, virtual_address: VirtualAddress) -> Result<Translation> {
        let (vpn, offset) = self.codec.split(virtual_address);
        let (tlb_index, tlb_tag) = self.tlb.indexer().split_vpn(vpn);

        let (frame, tlb_hit) = match self.tlb.lookup(vpn) {
            TlbLookup::Hit(frame) => (frame, true),
            TlbLookup::ProtectionFault => return Err(Error::ProtectionFault { vpn }),
            TlbLookup::Miss => (self.walk(vpn)?, false),
        };

        Ok(Translation {
            virtual_address,
            vpn,
            offset,
            tlb_index,
            tlb_tag,
            tlb_hit,
            frame,
            physical_address: self.codec.join(frame, offset)?,
        })
    }

    /// Resolves `vpn` from the page table and refills the TLB on success.
    fn walk(&mut self, vpn: Vpn) -> Result<FrameId> {
        let entry = match Self::check_entry(vpn, self.page_table.lookup(vpn)) {
            Ok(entry) => *entry,
            Err(fault) => {
                debug!("{fault}");
                return Err(fault);
            }
        };
        self.tlb.insert(vpn, &entry);
        debug!("tlb refill: vpn {vpn:#x} -> frame {:#x}", entry.frame);
        Ok(entry.frame)
    }

    /// Applies the fault order: missing or invalid, then protected, then not resident.
    fn check_entry(vpn: Vpn, entry: Option<&PageTableEntry>) -> Result<&PageTableEntry> {
        match entry {
            None => Err(Error::SegmentationFault { vpn }),
            Some(entry) if !entry.valid => Err(Error::SegmentationFault { vpn }),
            Some(entry) if entry.protected => Err(Error::ProtectionFault { vpn }),
            Some(entry) if !entry.present => Err(Error::PageFault { vpn }),
            Some(entry) => Ok(entry),
        }
    }

    /// Makes a mapped page resident in `frame`, e.g. after handling a page fault.
    pub fn page_in(&mut self, vpn: Vpn, frame: FrameId) -> bool {
        self.tlb.invalidate(vpn);
        self.page_table.set_present(vpn, true, frame)
    }

    /// Marks a page as no longer resident and drops any cached translation for it.
    pub fn page_out(&mut self, vpn: Vpn) -> bool {
        self.tlb.invalidate(vpn);
        self.page_table
            .lookup(vpn)
            .map(|entry| entry.frame)
            .is_some_and(|frame| self.page_table.set_present(vpn, false, frame))
    }

    pub fn unmap(&mut self, vpn: Vpn) -> Option<PageTableEntry> {
        self.tlb.invalidate(vpn);
        self.page_table.unmap(vpn)
    }

    /// Changes protection in the page table and in any cached copy of the mapping.
    pub fn set_protected(&mut self, vpn: Vpn, protected: bool) -> bool {
        self.tlb.set_protected(vpn, protected);
        self.page_table.set_protected(vpn, protected)
    }

    pub fn codec(&self) -> &AddressCodec {
        &self.codec
    }

    pub fn tlb(&self) -> &Tlb {
        &self.tlb
    }

    pub fn tlb_mut(&mut self) -> &mut Tlb {
        &mut self.tlb
    }

    pub fn page_table(&self) -> &PageTable {
        &self.page_table
    }

    /// Direct access for loaders. Changes made here are not reflected in the TLB.
    pub fn page_table_mut(&mut self) -> &mut PageTable {
        &mut self.page_table
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> TranslationPipeline {
        let mut table = PageTable::new();
        table.map(0x1, PageTableEntry::resident(0x5));
        table.map(0x2, PageTableEntry::resident(0x6).with_protection(true));
        table.map(0x3, PageTableEntry::resident(0x7).with_valid(false));
        table.map(0x7, PageTableEntry::swapped_out());
        TranslationPipeline::new(
            AddressCodec::new(4096).unwrap(),
            Tlb::new(4, 2).unwrap(),
            table,
        )
    }

    #[test]
    fn test_translate() {
        let mut pipeline = setup();
        assert_eq!(pipeline.translate(0x1234).unwrap(), 0x5234);
    }

    #[test]
    fn test_miss_warms_tlb() {
        let mut pipeline = setup();
        let first = pipeline.translate_detailed(0x1234).unwrap();
        assert!(!first.tlb_hit);
        assert_eq!(pipeline.tlb().stats().misses, 1);

        let second = pipeline.translate_detailed(0x1ff0).unwrap();
        assert!(second.tlb_hit);
        assert_eq!(second.physical_address, 0x5ff0);
        assert_eq!(pipeline.tlb().stats().hits, 1);
        assert_eq!(pipeline.tlb().stats().misses, 1);
    }

    #[test]
    fn test_fault_per_kind() {
        let mut pipeline = setup();
        assert_eq!(
            pipeline.translate(0x2000),
            Err(Error::ProtectionFault { vpn: 0x2 })
        );
        assert_eq!(
            pipeline.translate(0x3000),
            Err(Error::SegmentationFault { vpn: 0x3 })
        );
        assert_eq!(
            pipeline.translate(0x9000),
            Err(Error::SegmentationFault { vpn: 0x9 })
        );
        assert_eq!(pipeline.translate(0x7abc), Err(Error::PageFault { vpn: 0x7 }));
        // failed walks never populate the TLB
        assert!(pipeline.tlb().is_empty());
    }

    #[test]
    fn test_protection_checked_before_presence() {
        let mut pipeline = setup();
        pipeline
            .page_table_mut()
            .map(0x8, PageTableEntry::swapped_out().with_protection(true));
        assert_eq!(
            pipeline.translate(0x8000),
            Err(Error::ProtectionFault { vpn: 0x8 })
        );
    }

    #[test]
    fn test_validity_checked_before_protection() {
        let mut pipeline = setup();
        pipeline.page_table_mut().map(
            0x8,
            PageTableEntry::resident(1)
                .with_protection(true)
                .with_valid(false),
        );
        assert_eq!(
            pipeline.translate(0x8000),
            Err(Error::SegmentationFault { vpn: 0x8 })
        );
    }

    #[test]
    fn test_cached_protection_fault() {
        let mut pipeline = setup();
        pipeline.translate(0x1000).unwrap();
        assert!(pipeline.set_protected(0x1, true));

        let misses = pipeline.tlb().stats().misses;
        assert_eq!(
            pipeline.translate(0x1000),
            Err(Error::ProtectionFault { vpn: 0x1 })
        );
        // raised from the TLB without a walk
        assert_eq!(pipeline.tlb().stats().misses, misses);
    }

    #[test]
    fn test_page_in_then_retry() {
        let mut pipeline = setup();
        assert_eq!(pipeline.translate(0x7010), Err(Error::PageFault { vpn: 0x7 }));
        assert!(pipeline.page_in(0x7, 0x20));
        assert_eq!(pipeline.translate(0x7010).unwrap(), 0x20010);
    }

    #[test]
    fn test_page_out_invalidates_tlb() {
        let mut pipeline = setup();
        pipeline.translate(0x1000).unwrap();
        assert!(pipeline.page_out(0x1));
        assert_eq!(pipeline.translate(0x1000), Err(Error::PageFault { vpn: 0x1 }));
        assert!(!pipeline.page_out(0x42));
    }

    #[test]
    fn test_unmap_invalidates_tlb() {
        let mut pipeline = setup();
        pipeline.translate(0x1000).unwrap();
        assert!(pipeline.unmap(0x1).is_some());
        assert_eq!(
            pipeline.translate(0x1000),
            Err(Error::SegmentationFault { vpn: 0x1 })
        );
    }

    #[test]
    fn test_translation_display() {
        let mut pipeline = setup();
        let translation = pipeline.translate_detailed(0x1234).unwrap();
        assert_eq!(
            translation.to_string(),
            "00001234      1  234      0   1 miss      5 00005234"
        );
    }
}
