use crate::frame::ResidentFrames;
use crate::replacer::{Policy, Replacer, Victim};
use crate::typedef::FrameId;

/// Evicts the frame that became resident first.
pub(crate) struct FifoReplacer;

impl FifoReplacer {
    pub(crate) fn new() -> Self {
        FifoReplacer
    }
}

impl Replacer for FifoReplacer {
    fn select_victim(&mut self, frames: &mut ResidentFrames) -> Victim {
        match frames.iter().next() {
            Some(oldest) => Victim {
                frame: Some(oldest.frame_number()),
                frames_accessed: 1,
            },
            None => Victim::none(),
        }
    }

    /// Access order does not matter to FIFO.
    fn record_access(&mut self, _frames: &mut ResidentFrames, _frame_number: FrameId) {}

    fn policy(&self) -> Policy {
        Policy::Fifo
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_evict_oldest() {
        let mut frames = ResidentFrames::new();
        frames.admit(0, 10);
        frames.admit(1, 11);
        frames.admit(2, 12);

        let mut fifo = FifoReplacer::new();
        assert_eq!(
            fifo.select_victim(&mut frames),
            Victim {
                frame: Some(0),
                frames_accessed: 1
            }
        );
    }

    #[test]
    fn test_ignores_accesses() {
        let mut frames = ResidentFrames::new();
        frames.admit(0, 10);
        frames.admit(1, 11);

        let mut fifo = FifoReplacer::new();
        fifo.record_access(&mut frames, 0);
        fifo.record_access(&mut frames, 0);
        assert_eq!(fifo.select_victim(&mut frames).frame, Some(0));

        frames.remove(0);
        assert_eq!(fifo.select_victim(&mut frames).frame, Some(1));
    }

    #[test]
    fn test_empty() {
        let mut fifo = FifoReplacer::new();
        assert_eq!(fifo.select_victim(&mut ResidentFrames::new()), Victim::none());
    }
}
