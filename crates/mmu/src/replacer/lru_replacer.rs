use crate::frame::ResidentFrames;
use crate::replacer::{Policy, Replacer, Victim};
use crate::typedef::FrameId;

/// Evicts the least recently used frame by scanning every resident frame.
pub(crate) struct LruReplacer;

impl LruReplacer {
    pub(crate) fn new() -> Self {
        LruReplacer
    }
}

impl Replacer for LruReplacer {
    fn select_victim(&mut self, frames: &mut ResidentFrames) -> Victim {
        let mut frames_accessed = 0;
        let mut lru: Option<(FrameId, u64)> = None;

        for frame in frames.iter() {
            frames_accessed += 1;
            // strict comparison keeps the first frame on ties
            if lru.map_or(true, |(_, min)| frame.recency() < min) {
                lru = Some((frame.frame_number(), frame.recency()));
            }
        }

        Victim {
            frame: lru.map(|(frame_number, _)| frame_number),
            frames_accessed,
        }
    }

    /// Stamps the frame with the current timestamp.
    fn record_access(&mut self, frames: &mut ResidentFrames, frame_number: FrameId) {
        let timestamp = frames.next_tick();
        if let Some(frame) = frames.get_mut(frame_number) {
            frame.set_recency(timestamp);
        }
    }

    fn policy(&self) -> Policy {
        Policy::Lru
    }
}
