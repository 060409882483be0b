use vmsim_mmu::{
    AddressCodec, Error, FrameId, PageTable, PageTableEntry, Policy, ReplacementEngine,
    ResidentFrames, Tlb, TranslationPipeline, Vpn,
};

/// A minimal host: a fixed pool of frames, a pipeline, and an engine picking victims when the
/// pool runs dry.
struct Host {
    pipeline: TranslationPipeline,
    frames: ResidentFrames,
    engine: ReplacementEngine,
    free: Vec<FrameId>,
    page_faults: usize,
    evictions: usize,
    frames_accessed: usize,
}

impl Host {
    fn new(policy: Policy, frame_count: u64, pages: u64) -> Self {
        let mut table = PageTable::new();
        for vpn in 0..pages {
            table.map(vpn, PageTableEntry::swapped_out());
        }
        let pipeline = TranslationPipeline::new(
            AddressCodec::new(4096).unwrap(),
            Tlb::new(2, 2).unwrap(),
            table,
        );
        Host {
            pipeline,
            frames: ResidentFrames::new(),
            engine: ReplacementEngine::new(policy),
            free: (0..frame_count).rev().collect(),
            page_faults: 0,
            evictions: 0,
            frames_accessed: 0,
        }
    }

    fn access(&mut self, vpn: Vpn) -> u64 {
        let address = vpn * 4096;
        loop {
            match self.pipeline.translate(address) {
                Ok(physical) => {
                    let frame = physical / 4096;
                    self.engine.record_access(&mut self.frames, frame);
                    return frame;
                }
                Err(Error::PageFault { vpn }) => {
                    self.page_faults += 1;
                    let frame = self.allocate();
                    self.pipeline.page_in(vpn, frame);
                    self.frames.admit(frame, vpn);
                }
                Err(err) => panic!("unexpected error {err}"),
            }
        }
    }

    fn allocate(&mut self) -> FrameId {
        if let Some(frame) = self.free.pop() {
            return frame;
        }
        let victim = self.engine.select_victim(&mut self.frames);
        self.frames_accessed += victim.frames_accessed;
        let frame = victim.frame.expect("resident set is not empty");
        let evicted = self.frames.remove(frame).unwrap();
        self.pipeline.page_out(evicted.resident_page());
        self.evictions += 1;
        frame
    }

    fn resident_pages(&self) -> Vec<Vpn> {
        let mut pages: Vec<Vpn> = self.frames.iter().map(|f| f.resident_page()).collect();
        pages.sort_unstable();
        pages
    }
}

#[test]
fn test_fifo_evicts_first_loaded_page() {
    let mut host = Host::new(Policy::Fifo, 3, 8);
    for vpn in [0, 1, 2, 0, 0, 3] {
        host.access(vpn);
    }
    // page 0 is hot but was loaded first
    assert_eq!(host.resident_pages(), vec![1, 2, 3]);
    assert_eq!(host.page_faults, 4);
    assert_eq!(host.frames_accessed, 1);
}

#[test]
fn test_lru_keeps_recently_used_page() {
    let mut host = Host::new(Policy::Lru, 3, 8);
    for vpn in [0, 1, 2, 0, 3] {
        host.access(vpn);
    }
    assert_eq!(host.resident_pages(), vec![0, 2, 3]);
    assert_eq!(host.frames_accessed, 3);
}

#[test]
fn test_clock_gives_second_chance() {
    let mut host = Host::new(Policy::Clock, 3, 8);
    for vpn in [0, 1, 2] {
        host.access(vpn);
    }
    // every bit set: one sweep clears them, frame of page 0 goes on the second pass
    host.access(3);
    assert_eq!(host.resident_pages(), vec![1, 2, 3]);
    assert_eq!(host.frames_accessed, 4);

    // page 1 is referenced again, so the hand passes it and takes page 2
    host.access(1);
    host.access(4);
    assert_eq!(host.resident_pages(), vec![1, 3, 4]);
}

#[test]
fn test_evicted_page_faults_again() {
    let mut host = Host::new(Policy::Fifo, 1, 4);
    let first = host.access(0);
    host.access(1);
    assert_eq!(host.pipeline.translate(0), Err(Error::PageFault { vpn: 0 }));
    assert_eq!(host.access(0), first);
    assert_eq!(host.evictions, 2);
}
