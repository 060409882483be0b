use crate::address::AddressCodec;
use crate::page::PageTable;
use crate::pipeline::TranslationPipeline;
use crate::replacer::{Policy, ReplacementEngine};
use crate::tlb::Tlb;
use crate::Result;
use log::info;
use serde::{Deserialize, Serialize};
use std::path::Path;
use vmsim_error::errinput;

const DEFAULT_PAGE_SIZE: u64 = 4096;
const DEFAULT_TLB_SETS: usize = 4;
const DEFAULT_TLB_WAYS: usize = 4;
const MAX_TLB_SETS: usize = 256;
const MAX_TLB_WAYS: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TlbConfig {
    /// Number of sets, the associativity k used for indexing.
    pub sets: usize,
    /// Slots per set.
    pub ways: usize,
}

impl Default for TlbConfig {
    fn default() -> Self {
        Self {
            sets: DEFAULT_TLB_SETS,
            ways: DEFAULT_TLB_WAYS,
        }
    }
}

/// Geometry and policy of the simulated memory manager.
///
/// ```toml
/// page_size = 4096
/// policy = "clock"
///
/// [tlb]
/// sets = 4
/// ways = 2
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub page_size: u64,
    pub policy: Policy,
    pub tlb: TlbConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            policy: Policy::default(),
            tlb: TlbConfig::default(),
        }
    }
}

impl Config {
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let config: Config = match toml::from_str(s) {
            Ok(config) => config,
            Err(err) => return errinput!("invalid configuration: {}", err.message()),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let config = Self::from_toml_str(&std::fs::read_to_string(path)?)?;
        info!(
            "loaded {}: page size {}, tlb {}x{}, {} replacement",
            path.display(),
            config.page_size,
            config.tlb.sets,
            config.tlb.ways,
            config.policy
        );
        Ok(config)
    }

    /// Rejects geometry the address math cannot work with.
    pub fn validate(&self) -> Result<()> {
        if !self.page_size.is_power_of_two() {
            return errinput!("page size {} is not a power of two", self.page_size);
        }
        if self.tlb.sets == 0 || self.tlb.sets > MAX_TLB_SETS {
            return errinput!(
                "{} TLB sets specified but must be between 1 and {MAX_TLB_SETS}",
                self.tlb.sets
            );
        }
        if self.tlb.ways == 0 || self.tlb.ways > MAX_TLB_WAYS {
            return errinput!(
                "{} TLB ways specified but must be between 1 and {MAX_TLB_WAYS}",
                self.tlb.ways
            );
        }
        Ok(())
    }

    pub fn build_pipeline(&self, page_table: PageTable) -> Result<TranslationPipeline> {
        self.validate()?;
        let codec = AddressCodec::new(self.page_size)?;
        let tlb = Tlb::new(self.tlb.sets, self.tlb.ways)?;
        Ok(TranslationPipeline::new(codec, tlb, page_table))
    }

    pub fn build_engine(&self) -> ReplacementEngine {
        ReplacementEngine::new(self.policy)
    }
}

impl std::fmt::Display for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "TLB contains {} sets.", self.tlb.sets)?;
        writeln!(f, "Each set contains {} entries.", self.tlb.ways)?;
        writeln!(f, "Each page contains {} bytes.", self.page_size)?;
        writeln!(
            f,
            "Number of bits used for the page offset is {}.",
            self.page_size.trailing_zeros()
        )?;
        write!(f, "Frames are replaced using {}.", self.policy)
    }
}
