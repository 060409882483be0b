/// A raw virtual address.
pub type VirtualAddress = u64;
/// A raw physical address.
pub type PhysicalAddress = u64;
/// Virtual page number: the upper bits of a virtual address.
pub type Vpn = u64;
/// Physical frame number: the upper bits of a physical address.
pub type FrameId = u64;
