use crate::typedef::{FrameId, PhysicalAddress, VirtualAddress, Vpn};
use crate::Result;
use vmsim_error::{errinput, Error};

/// Splits virtual addresses into (page number, offset) and reassembles physical addresses for a
/// fixed page size. The page size is checked once, here, so the bit math below never has to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddressCodec {
    page_size: u64,
    offset_bits: u32,
}

impl AddressCodec {
    pub fn new(page_size: u64) -> Result<Self> {
        if !page_size.is_power_of_two() {
            return errinput!("page size {page_size} is not a power of two");
        }
        Ok(Self {
            page_size,
            offset_bits: page_size.trailing_zeros(),
        })
    }

    pub fn page_size(&self) -> u64 {
        self.page_size
    }

    /// Number of low address bits used for the page offset, i.e. log2(page_size).
    pub fn offset_bits(&self) -> u32 {
        self.offset_bits
    }

    pub fn split(&self, virtual_address: VirtualAddress) -> (Vpn, u64) {
        let offset = virtual_address & (self.page_size - 1);
        let vpn = virtual_address >> self.offset_bits;
        (vpn, offset)
    }

    pub fn join(&self, frame: FrameId, offset: u64) -> Result<PhysicalAddress> {
        if offset >= self.page_size {
            return errinput!("offset {offset:#x} exceeds page size {:#x}", self.page_size);
        }
        // a plain shift would silently drop the high bits of a large frame number
        let base = frame
            .checked_mul(self.page_size)
            .ok_or(Error::ArithmeticOverflow)?;
        Ok(base | offset)
    }
}

/// Splits `virtual_address` into (vpn, offset) without keeping a codec around.
pub fn split_virtual_address(virtual_address: VirtualAddress, page_size: u64) -> Result<(Vpn, u64)> {
    Ok(AddressCodec::new(page_size)?.split(virtual_address))
}

/// Builds the physical address of `offset` within `frame`.
pub fn physical_address(frame: FrameId, offset: u64, page_size: u64) -> Result<PhysicalAddress> {
    AddressCodec::new(page_size)?.join(frame, offset)
}
