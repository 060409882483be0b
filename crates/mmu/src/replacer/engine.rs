use super::clock_replacer::ClockReplacer;
use super::fifo_replacer::FifoReplacer;
use super::lru_replacer::LruReplacer;
use super::replacer::{Replacer, Victim};
use crate::frame::ResidentFrames;
use crate::typedef::FrameId;
use crate::Result;
use log::debug;
use serde::{Deserialize, Serialize};
use vmsim_error::{errinput, Error};

/// Page replacement policy, chosen when the engine is configured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Policy {
    #[default]
    Fifo,
    Lru,
    Clock,
}

impl Policy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Policy::Fifo => "fifo",
            Policy::Lru => "lru",
            Policy::Clock => "clock",
        }
    }
}

impl std::fmt::Display for Policy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Policy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "fifo" => Ok(Policy::Fifo),
            "lru" => Ok(Policy::Lru),
            "clock" => Ok(Policy::Clock),
            _ => errinput!("unknown replacement policy {s:?}"),
        }
    }
}

/// Picks eviction victims among resident frames for an external frame allocator.
pub struct ReplacementEngine {
    replacer: Box<dyn Replacer>,
}

impl ReplacementEngine {
    pub fn new(policy: Policy) -> Self {
        let replacer: Box<dyn Replacer> = match policy {
            Policy::Fifo => Box::new(FifoReplacer::new()),
            Policy::Lru => Box::new(LruReplacer::new()),
            Policy::Clock => Box::new(ClockReplacer::new()),
        };
        Self { replacer }
    }

    pub fn policy(&self) -> Policy {
        self.replacer.policy()
    }

    pub fn select_victim(&mut self, frames: &mut ResidentFrames) -> Victim {
        let victim = self.replacer.select_victim(frames);
        debug!(
            "{} selected victim {:?} after {} frames",
            self.policy(),
            victim.frame,
            victim.frames_accessed
        );
        victim
    }

    pub fn record_access(&mut self, frames: &mut ResidentFrames, frame_number: FrameId) {
        self.replacer.record_access(frames, frame_number);
    }
}

impl std::fmt::Debug for ReplacementEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReplacementEngine")
            .field("policy", &self.policy())
            .finish()
    }
}
