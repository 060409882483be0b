//! Address translation through a set-associative TLB backed by a page table, plus frame
//! replacement policies. `PageTable::from_image`/`to_image` are a fixture and loader
//! convenience; populating tables from backing store is left to the host.

mod address;
mod config;
mod frame;
mod page;
mod pipeline;
mod replacer;
mod set_index;
mod tlb;
mod typedef;

pub use address::{physical_address, split_virtual_address, AddressCodec};
pub use config::{Config, TlbConfig};
pub use frame::{Frame, ResidentFrames};
pub use page::{PageTable, PageTableEntry};
pub use pipeline::{Translation, TranslationPipeline};
pub use replacer::{Policy, ReplacementEngine, Replacer, Victim};
pub use set_index::{split_vpn, SetIndexer};
pub use tlb::{Tlb, TlbLookup, TlbStats};
pub use typedef::{FrameId, PhysicalAddress, VirtualAddress, Vpn};
pub use vmsim_error::Error;

pub type Result<T> = std::result::Result<T, vmsim_error::Error>;
