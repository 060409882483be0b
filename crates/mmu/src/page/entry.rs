use crate::typedef::{FrameId, Vpn};
use crate::Result;
use bytemuck::{Pod, Zeroable};
use std::mem;
use vmsim_error::errdata;

const FLAG_VALID: u32 = 1 << 0;
const FLAG_PRESENT: u32 = 1 << 1;
const FLAG_PROTECTED: u32 = 1 << 2;
const KNOWN_FLAGS: u32 = FLAG_VALID | FLAG_PRESENT | FLAG_PROTECTED;

/// The authoritative description of one virtual page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PageTableEntry {
    pub frame: FrameId,
    pub valid: bool,
    pub present: bool,
    pub protected: bool,
}

impl PageTableEntry {
    /// A valid, resident, unprotected mapping to `frame`.
    pub fn resident(frame: FrameId) -> Self {
        Self {
            frame,
            valid: true,
            present: true,
            protected: false,
        }
    }

    /// A valid mapping whose page currently lives in backing store.
    pub fn swapped_out() -> Self {
        Self {
            frame: 0,
            valid: true,
            present: false,
            protected: false,
        }
    }

    pub fn with_protection(mut self, protected: bool) -> Self {
        self.protected = protected;
        self
    }

    pub fn with_valid(mut self, valid: bool) -> Self {
        self.valid = valid;
        self
    }

    /// Whether the TLB may cache this entry.
    pub fn is_cacheable(&self) -> bool {
        self.valid && self.present && !self.protected
    }

    fn flags(&self) -> u32 {
        let mut flags = 0;
        if self.valid {
            flags |= FLAG_VALID;
        }
        if self.present {
            flags |= FLAG_PRESENT;
        }
        if self.protected {
            flags |= FLAG_PROTECTED;
        }
        flags
    }
}

/// On-image layout of a page table record, little-endian. Only used by the table snapshot
/// helpers.
#[repr(C)]
#[derive(Pod, Zeroable, Copy, Clone)]
pub(crate) struct RawEntry {
    vpn: u64,
    frame: u64,
    flags: u32,
    _padding: [u8; 4],
}

pub(crate) const RAW_ENTRY_SIZE: usize = mem::size_of::<RawEntry>();

impl RawEntry {
    pub(crate) fn encode(vpn: Vpn, entry: &PageTableEntry) -> Self {
        Self {
            vpn: vpn.to_le(),
            frame: entry.frame.to_le(),
            flags: entry.flags().to_le(),
            _padding: [0; 4],
        }
    }

    pub(crate) fn decode(&self) -> Result<(Vpn, PageTableEntry)> {
        let vpn = u64::from_le(self.vpn);
        let flags = u32::from_le(self.flags);
        if flags & !KNOWN_FLAGS != 0 {
            return errdata!("unknown flag bits {:#x} on vpn {vpn:#x}", flags & !KNOWN_FLAGS);
        }
        let entry = PageTableEntry {
            frame: u64::from_le(self.frame),
            valid: flags & FLAG_VALID != 0,
            present: flags & FLAG_PRESENT != 0,
            protected: flags & FLAG_PROTECTED != 0,
        };
        Ok((vpn, entry))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_entry_size() {
        assert_eq!(RAW_ENTRY_SIZE, 24);
    }

    #[test]
    fn test_cacheable() {
        assert!(PageTableEntry::resident(3).is_cacheable());
        assert!(!PageTableEntry::resident(3).with_protection(true).is_cacheable());
        assert!(!PageTableEntry::swapped_out().is_cacheable());
        assert!(!PageTableEntry::resident(3).with_valid(false).is_cacheable());
    }

    #[test]
    fn test_decode_keeps_flags() {
        let entry = PageTableEntry::resident(9).with_protection(true);
        let (vpn, decoded) = RawEntry::encode(4, &entry).decode().unwrap();
        assert_eq!(vpn, 4);
        assert_eq!(decoded, entry);
    }

    #[test]
    fn test_decode_rejects_unknown_flags() {
        let mut raw = RawEntry::encode(1, &PageTableEntry::resident(1));
        raw.flags = 0x80u32.to_le();
        assert!(raw.decode().is_err());
    }
}
