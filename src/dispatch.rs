//! Tile dispatcher: a fixed pool of worker threads, a shared output
//! buffer written in disjoint row bands, and an atomic generation
//! counter that lets stale in-flight frames be discarded without locks.

use std::cell::UnsafeCell;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use crate::render::{render_band, BandOutcome, RenderJob};
use crate::snapshot::SceneSnapshot;

/// Shared RGBA output, written once per frame by disjoint worker bands
/// and read by the presentation side after the frame completes.
pub struct FrameBuffer {
    width: u32,
    height: u32,
    data: UnsafeCell<Box<[u8]>>,
}

// Workers write strictly disjoint row ranges (see `band_mut`), so
// concurrent band writes never alias. A band of a superseded frame may
// still be finishing while a newer frame's reader copies the buffer out;
// that cross-frame overlap is confined to whole bands and accepted, the
// same way the freshness guard accepts it.
unsafe impl Sync for FrameBuffer {}

impl FrameBuffer {
    pub fn new(width: u32, height: u32) -> Arc<Self> {
        let mut data = vec![0u8; (width * height * 4) as usize];
        // Opaque black until the first frame lands
        for pixel in data.chunks_exact_mut(4) {
            pixel[3] = 0xff;
        }

        Arc::new(Self {
            width,
            height,
            data: UnsafeCell::new(data.into_boxed_slice()),
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Mutable view of the rows `[row_start, row_end)`.
    ///
    /// SAFETY: the caller must hold the only live writer for this row
    /// range; the dispatcher guarantees that by giving every worker a
    /// distinct band.
    #[allow(clippy::mut_from_ref)]
    pub(crate) unsafe fn band_mut(&self, row_start: u32, row_end: u32) -> &mut [u8] {
        let stride = self.width as usize * 4;
        let data = &mut *self.data.get();
        &mut data[row_start as usize * stride..row_end as usize * stride]
    }

    /// Copy the buffer out for presentation.
    pub fn pixels(&self) -> Vec<u8> {
        // SAFETY: shared reads of the frozen frame; see the Sync note
        // above for the accepted overlap with superseded bands.
        unsafe { (*self.data.get()).to_vec() }
    }
}

/// Per-band completion report flowing back from the workers.
struct BandReport {
    frame_id: u64,
    rendered: bool,
}

struct PendingFrame {
    id: u64,
    remaining: usize,
    all_rendered: bool,
}

/// Fixed pool of render workers, one job channel each. A dispatch
/// partitions the image into contiguous row bands, stamps them with a
/// fresh frame id and hands every worker exactly one band; it never
/// blocks on workers finishing.
pub struct RenderPool {
    senders: Vec<Sender<RenderJob>>,
    handles: Vec<thread::JoinHandle<()>>,
    frame_counter: Arc<AtomicU64>,
    reports: Receiver<BandReport>,
    pending: Option<PendingFrame>,
}

impl RenderPool {
    /// Pool sized to the machine's available parallelism.
    pub fn with_default_workers() -> Self {
        let workers = thread::available_parallelism().map(|n| n.get()).unwrap_or(1);
        Self::new(workers)
    }

    pub fn new(workers: usize) -> Self {
        assert!(workers > 0, "render pool needs at least one worker");

        let frame_counter = Arc::new(AtomicU64::new(0));
        let (report_sender, reports) = mpsc::channel();

        let mut senders = Vec::with_capacity(workers);
        let mut handles = Vec::with_capacity(workers);
        for index in 0..workers {
            let (sender, receiver) = mpsc::channel::<RenderJob>();
            let report_sender = report_sender.clone();

            let handle = thread::Builder::new()
                .name(format!("render-{index}"))
                .spawn(move || {
                    while let Ok(job) = receiver.recv() {
                        let frame_id = job.frame_id;
                        let rendered = match render_band(&job) {
                            Ok(BandOutcome::Rendered) => true,
                            Ok(BandOutcome::Stale) => false,
                            Err(err) => {
                                log::error!("render job aborted: {err}");
                                false
                            }
                        };
                        if report_sender.send(BandReport { frame_id, rendered }).is_err() {
                            break;
                        }
                    }
                })
                .expect("failed to spawn render worker");

            senders.push(sender);
            handles.push(handle);
        }

        log::info!("render pool started with {workers} workers");

        Self {
            senders,
            handles,
            frame_counter,
            reports,
            pending: None,
        }
    }

    pub fn worker_count(&self) -> usize {
        self.senders.len()
    }

    /// Id of the most recently dispatched frame.
    pub fn current_frame(&self) -> u64 {
        self.frame_counter.load(Ordering::Acquire)
    }

    /// Dispatch one frame: advance the generation counter (anything still
    /// in flight becomes stale) and fan the row bands out across the
    /// pool. The final band absorbs the remainder rows.
    pub fn dispatch(
        &mut self,
        snapshot: Arc<SceneSnapshot>,
        output: &Arc<FrameBuffer>,
        projection_distance: f32,
    ) -> u64 {
        let frame_id = self.frame_counter.fetch_add(1, Ordering::AcqRel) + 1;

        let workers = self.senders.len();
        let height = output.height();
        let rows_per_band = height / workers as u32;

        for (index, sender) in self.senders.iter().enumerate() {
            let row_start = index as u32 * rows_per_band;
            let row_end = if index == workers - 1 {
                height
            } else {
                row_start + rows_per_band
            };

            let job = RenderJob {
                row_start,
                row_end,
                width: output.width(),
                height,
                projection_distance,
                snapshot: Arc::clone(&snapshot),
                frame_id,
                frame_counter: Arc::clone(&self.frame_counter),
                output: Arc::clone(output),
            };
            if sender.send(job).is_err() {
                log::error!("render worker {index} is gone; band dropped");
            }
        }

        self.pending = Some(PendingFrame {
            id: frame_id,
            remaining: workers,
            all_rendered: true,
        });
        frame_id
    }

    fn note(&mut self, report: BandReport) -> Option<u64> {
        let pending = self.pending.as_mut()?;
        // Reports from superseded frames are dropped
        if report.frame_id != pending.id {
            return None;
        }

        pending.remaining -= 1;
        pending.all_rendered &= report.rendered;

        if pending.remaining == 0 {
            let done = self.pending.take().unwrap();
            if done.all_rendered {
                return Some(done.id);
            }
        }
        None
    }

    /// Drain band reports without blocking; returns the frame id once the
    /// newest dispatched frame has every band rendered.
    pub fn poll_complete(&mut self) -> Option<u64> {
        while let Ok(report) = self.reports.try_recv() {
            if let Some(frame_id) = self.note(report) {
                return Some(frame_id);
            }
        }
        None
    }

    /// Block up to `timeout` for the newest dispatched frame to complete.
    pub fn wait_complete(&mut self, timeout: Duration) -> Option<u64> {
        let deadline = Instant::now() + timeout;
        loop {
            let remaining = deadline.checked_duration_since(Instant::now())?;
            match self.reports.recv_timeout(remaining) {
                Ok(report) => {
                    if let Some(frame_id) = self.note(report) {
                        return Some(frame_id);
                    }
                }
                Err(RecvTimeoutError::Timeout) => return None,
                Err(RecvTimeoutError::Disconnected) => return None,
            }
        }
    }
}

impl Drop for RenderPool {
    fn drop(&mut self) {
        // Closing the job channels lets every worker finish its queue and
        // exit
        self.senders.clear();
        for handle in self.handles.drain(..) {
            let _ = handle.join();
        }
    }
}
