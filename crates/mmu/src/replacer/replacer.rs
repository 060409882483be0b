use crate::frame::ResidentFrames;
use crate::replacer::Policy;
use crate::typedef::FrameId;

/// The result of one eviction decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Victim {
    /// The frame to evict, or `None` when nothing is resident.
    pub frame: Option<FrameId>,
    /// How many frames the policy stepped through before deciding.
    pub frames_accessed: usize,
}

impl Victim {
    pub(crate) fn none() -> Self {
        Victim {
            frame: None,
            frames_accessed: 0,
        }
    }
}

pub trait Replacer {
    /// Chooses a frame to evict from `frames`. The frame stays resident; removing it is up to
    /// the caller. Policies may update access markers of the frames they pass over.
    fn select_victim(&mut self, frames: &mut ResidentFrames) -> Victim;

    /// Record the event that the given frame was accessed.
    fn record_access(&mut self, frames: &mut ResidentFrames, frame_number: FrameId);

    fn policy(&self) -> Policy;
}
