mod entry;
mod table;

pub use entry::PageTableEntry;
pub use table::PageTable;
