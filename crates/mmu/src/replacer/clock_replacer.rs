use crate::frame::ResidentFrames;
use crate::replacer::{Policy, Replacer, Victim};
use crate::typedef::FrameId;

/// Second-chance replacement. The hand sweeps the resident frames in order, clearing reference
/// bits as it goes, and stops at the first frame whose bit is already clear.
pub(crate) struct ClockReplacer {
    hand: usize,
}

impl ClockReplacer {
    pub(crate) fn new() -> Self {
        ClockReplacer { hand: 0 }
    }
}

impl Replacer for ClockReplacer {
    fn select_victim(&mut self, frames: &mut ResidentFrames) -> Victim {
        let len = frames.len();
        if len == 0 {
            self.hand = 0;
            return Victim::none();
        }

        // frames may have been removed since the last sweep
        let mut hand = self.hand % len;
        let mut frames_accessed = 0;

        // terminates within two passes: the first pass clears every bit it skips
        loop {
            frames_accessed += 1;
            let frame = frames.at_mut(hand);
            if !frame.is_referenced() {
                // once the victim is removed its successor slides into this slot and is
                // examined first next time
                self.hand = hand;
                return Victim {
                    frame: Some(frame.frame_number()),
                    frames_accessed,
                };
            }
            frame.set_referenced(false);
            hand = (hand + 1) % len;
        }
    }

    fn record_access(&mut self, frames: &mut ResidentFrames, frame_number: FrameId) {
        if let Some(frame) = frames.get_mut(frame_number) {
            frame.set_referenced(true);
        }
    }

    fn policy(&self) -> Policy {
        Policy::Clock
    }
}
