use crate::typedef::{FrameId, Vpn};
use log::warn;

/// A physical frame currently holding a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frame {
    frame_number: FrameId,
    resident_page: Vpn,
    recency: u64,
    referenced: bool,
}

impl Frame {
    pub fn new(frame_number: FrameId, resident_page: Vpn) -> Self {
        Self {
            frame_number,
            resident_page,
            recency: 0,
            referenced: false,
        }
    }

    pub fn with_recency(mut self, recency: u64) -> Self {
        self.recency = recency;
        self
    }

    pub fn with_referenced(mut self, referenced: bool) -> Self {
        self.referenced = referenced;
        self
    }

    pub fn frame_number(&self) -> FrameId {
        self.frame_number
    }

    pub fn resident_page(&self) -> Vpn {
        self.resident_page
    }

    /// Higher means more recently used.
    pub fn recency(&self) -> u64 {
        self.recency
    }

    pub fn is_referenced(&self) -> bool {
        self.referenced
    }

    pub(crate) fn set_recency(&mut self, recency: u64) {
        self.recency = recency;
    }

    pub(crate) fn set_referenced(&mut self, referenced: bool) {
        self.referenced = referenced;
    }
}

/// The frames currently resident, oldest first. Admission and removal belong to the frame
/// allocator; replacement policies only read the collection and update the access markers.
#[derive(Debug, Default, Clone)]
pub struct ResidentFrames {
    frames: Vec<Frame>,
    tick: u64,
}

impl ResidentFrames {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks `frame_number` resident with `vpn`, as the newest and just-referenced frame.
    /// Returns false, leaving the collection untouched, if the frame is already resident.
    pub fn admit(&mut self, frame_number: FrameId, vpn: Vpn) -> bool {
        if self.position(frame_number).is_some() {
            return false;
        }
        let recency = self.next_tick();
        self.push(
            Frame::new(frame_number, vpn)
                .with_recency(recency)
                .with_referenced(true),
        )
    }

    /// Appends a frame with caller-chosen markers. Returns false if the frame is already
    /// resident.
    pub fn push(&mut self, frame: Frame) -> bool {
        if self.position(frame.frame_number).is_some() {
            warn!("frame {} is already resident", frame.frame_number);
            return false;
        }
        self.tick = self.tick.max(frame.recency.saturating_add(1));
        self.frames.push(frame);
        true
    }

    pub fn remove(&mut self, frame_number: FrameId) -> Option<Frame> {
        self.position(frame_number).map(|i| self.frames.remove(i))
    }

    pub fn position(&self, frame_number: FrameId) -> Option<usize> {
        self.frames
            .iter()
            .position(|frame| frame.frame_number == frame_number)
    }

    pub fn get(&self, frame_number: FrameId) -> Option<&Frame> {
        self.frames
            .iter()
            .find(|frame| frame.frame_number == frame_number)
    }

    pub(crate) fn get_mut(&mut self, frame_number: FrameId) -> Option<&mut Frame> {
        self.frames
            .iter_mut()
            .find(|frame| frame.frame_number == frame_number)
    }

    pub(crate) fn at_mut(&mut self, index: usize) -> &mut Frame {
        &mut self.frames[index]
    }

    pub fn iter(&self) -> impl Iterator<Item = &Frame> {
        self.frames.iter()
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub(crate) fn next_tick(&mut self) -> u64 {
        // saturates: once the clock tops out, later accesses tie and LRU falls back to
        // traversal order
        let tick = self.tick;
        self.tick = self.tick.saturating_add(1);
        tick
    }
}
