use crate::typedef::Vpn;
use crate::Result;
use vmsim_error::errinput;

/// Maps virtual page numbers onto the sets of a k-set associative TLB. Pages with the same index
/// always compete for the same set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SetIndexer {
    sets: u64,
}

impl SetIndexer {
    pub fn new(sets: u64) -> Result<Self> {
        if sets == 0 {
            return errinput!("a TLB needs at least one set");
        }
        Ok(Self { sets })
    }

    pub fn sets(&self) -> u64 {
        self.sets
    }

    /// Returns `(index, tag)` for `vpn`.
    pub fn split_vpn(&self, vpn: Vpn) -> (u64, u64) {
        (vpn % self.sets, vpn / self.sets)
    }

    /// Inverse of [`SetIndexer::split_vpn`].
    pub fn join(&self, index: u64, tag: u64) -> Vpn {
        tag * self.sets + index
    }
}

pub fn split_vpn(vpn: Vpn, sets: u64) -> Result<(u64, u64)> {
    Ok(SetIndexer::new(sets)?.split_vpn(vpn))
}
