//! Address-translation simulator: a set-associative TLB in front of a page table, and
//! interchangeable frame replacement policies for the allocator that sits beside it.

pub use vmsim_error::{errdata, errinput, Error, Result};
pub use vmsim_mmu::*;
