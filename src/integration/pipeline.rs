//! TrackerPipeline: per-frame orchestration of detection, tracking,
//! rendering and consumer notification.

use std::thread::{self, JoinHandle};

use crossbeam_channel::{Receiver, Sender, TrySendError};
use image::RgbImage;
use serde::Deserialize;
use tracing::{debug, info, warn};

use super::{CandidateBuilder, FrameSource, RawShape, ShapeDetector};
use crate::error::{Error, Result};
use crate::render::{RenderConfig, Renderer};
use crate::tracker::{DetectionCandidate, ShapeTracker, Track, TrackerConfig};

/// Configuration for the TrackerPipeline.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub tracker: TrackerConfig,
    pub render: RenderConfig,
    /// Circles with a smaller area (square pixels) are dropped before tracking
    pub min_circle_area: f64,
    /// Rectangles with a smaller area (square pixels) are dropped before tracking
    pub min_rectangle_area: u64,
    /// Capacity of the notification channel. When full, snapshots are
    /// dropped instead of blocking; the final `Finished` event waits for
    /// room. `None` uses an unbounded channel.
    pub notify_capacity: Option<usize>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            tracker: TrackerConfig::default(),
            render: RenderConfig::default(),
            min_circle_area: 1000.0,
            min_rectangle_area: 1200,
            notify_capacity: Some(8),
        }
    }
}

/// Owned copy of the pipeline state after one frame.
#[derive(Debug, Clone)]
pub struct FrameSnapshot {
    pub frame_index: u64,
    /// Active tracks in creation order
    pub tracks: Vec<Track>,
    /// The frame with this frame's annotations
    pub frame: RgbImage,
    /// The cumulative trajectory canvas
    pub trajectory: RgbImage,
}

/// Message sent from the pipeline to its consumer.
#[derive(Debug, Clone)]
pub enum PipelineEvent {
    Frame(Box<FrameSnapshot>),
    /// The frame source is exhausted.
    Finished { frames: u64 },
}

/// Handle to a pipeline running on its own thread.
pub struct PipelineHandle {
    events: Receiver<PipelineEvent>,
    worker: JoinHandle<Result<u64>>,
}

impl PipelineHandle {
    pub fn events(&self) -> &Receiver<PipelineEvent> {
        &self.events
    }

    /// Wait for the worker and return the number of processed frames.
    pub fn join(self) -> Result<u64> {
        self.worker.join().map_err(|_| Error::WorkerPanicked)?
    }
}

/// Drives a frame source and a shape detector through the tracker.
///
/// Each frame is detected, filtered, associated, rendered and then handed
/// to the subscribed consumer as an owned [`FrameSnapshot`].
pub struct TrackerPipeline<S: FrameSource, D: ShapeDetector> {
    source: S,
    detector: D,
    tracker: ShapeTracker,
    renderer: Renderer,
    config: PipelineConfig,
    trajectory: Option<RgbImage>,
    next_frame: u64,
    events: Option<Sender<PipelineEvent>>,
}

impl<S: FrameSource, D: ShapeDetector> TrackerPipeline<S, D> {
    pub fn new(source: S, detector: D, config: PipelineConfig) -> Self {
        Self {
            source,
            detector,
            tracker: ShapeTracker::new(config.tracker.clone()),
            renderer: Renderer::new(config.render.clone()),
            config,
            trajectory: None,
            next_frame: 0,
            events: None,
        }
    }

    /// Create a new pipeline with default configuration.
    pub fn with_default_config(source: S, detector: D) -> Self {
        Self::new(source, detector, PipelineConfig::default())
    }

    /// Replace the renderer, e.g. with one that has a label font.
    pub fn with_renderer(mut self, renderer: Renderer) -> Self {
        self.renderer = renderer;
        self
    }

    /// Open a notification channel. A later call replaces the previous
    /// subscriber.
    pub fn subscribe(&mut self) -> Receiver<PipelineEvent> {
        let (tx, rx) = match self.config.notify_capacity {
            Some(capacity) => crossbeam_channel::bounded(capacity),
            None => crossbeam_channel::unbounded(),
        };
        self.events = Some(tx);
        rx
    }

    pub fn tracker(&self) -> &ShapeTracker {
        &self.tracker
    }

    pub fn renderer(&self) -> &Renderer {
        &self.renderer
    }

    /// The trajectory canvas, allocated on the first frame.
    pub fn trajectory(&self) -> Option<&RgbImage> {
        self.trajectory.as_ref()
    }

    /// Number of frames processed so far.
    pub fn frames_processed(&self) -> u64 {
        self.next_frame
    }

    /// Process a single frame. Returns `false` once the source is exhausted.
    pub fn step(&mut self) -> Result<bool> {
        let Some(mut frame) = self
            .source
            .next_frame()
            .map_err(|e| Error::FrameSource(e.into()))?
        else {
            return Ok(false);
        };

        let frame_index = self.next_frame;
        let (width, height) = frame.dimensions();
        if let Some(trajectory) = &self.trajectory {
            if trajectory.dimensions() != (width, height) {
                return Err(Error::FrameSizeMismatch {
                    frame_index,
                    expected: trajectory.dimensions(),
                    got: (width, height),
                });
            }
        }

        let candidates = self.candidates(frame_index, &frame)?;
        self.tracker.new_frame(frame_index, &candidates);

        let trajectory = self
            .trajectory
            .get_or_insert_with(|| RgbImage::new(width, height));
        self.renderer
            .render_frame(&self.tracker, &mut frame, trajectory);

        self.notify(frame_index, frame);
        self.next_frame += 1;
        Ok(true)
    }

    /// Process frames until the source is exhausted and return how many
    /// were processed.
    ///
    /// The closing `Finished` event blocks until the subscriber has room
    /// for it; drain a bounded subscriber from another thread when the
    /// stream may outgrow its capacity.
    pub fn run(&mut self) -> Result<u64> {
        let first = self.next_frame;
        info!(from_frame = first, "pipeline started");

        while self.step()? {}

        let frames = self.next_frame - first;
        info!(
            frames,
            tracks = self.tracker.tracks().len(),
            archived = self.tracker.archived().len(),
            "pipeline finished"
        );

        if let Some(tx) = self.events.take() {
            if tx.send(PipelineEvent::Finished { frames }).is_err() {
                debug!("consumer disconnected before finish notification");
            }
        }
        Ok(frames)
    }

    /// Run the pipeline on a worker thread.
    pub fn spawn(mut self) -> PipelineHandle
    where
        S: Send + 'static,
        D: Send + 'static,
    {
        let events = self.subscribe();
        let worker = thread::spawn(move || self.run());
        PipelineHandle { events, worker }
    }

    /// Detect shapes and turn the ones that pass filtering into candidates.
    fn candidates(
        &mut self,
        frame_index: u64,
        frame: &RgbImage,
    ) -> Result<Vec<DetectionCandidate>> {
        let shapes = self
            .detector
            .detect(frame)
            .map_err(|e| Error::Detector {
                frame_index,
                source: e.into(),
            })?;

        let mut candidates = Vec::with_capacity(shapes.len());
        for shape in shapes {
            if !self.large_enough(&shape) {
                debug!(frame_index, ?shape, "dropping undersized shape");
                continue;
            }
            match CandidateBuilder::from_raw(shape).sample_color(frame).build() {
                Some(candidate) => candidates.push(candidate),
                None => debug!(frame_index, ?shape, "dropping shape centered outside the frame"),
            }
        }
        Ok(candidates)
    }

    fn large_enough(&self, shape: &RawShape) -> bool {
        match shape {
            RawShape::Circle { .. } => shape.area() >= self.config.min_circle_area,
            RawShape::Rectangle { .. } => shape.area() >= self.config.min_rectangle_area as f64,
        }
    }

    fn notify(&mut self, frame_index: u64, frame: RgbImage) {
        let (Some(tx), Some(trajectory)) = (&self.events, &self.trajectory) else {
            return;
        };

        let snapshot = FrameSnapshot {
            frame_index,
            tracks: self.tracker.tracks().to_vec(),
            frame,
            trajectory: trajectory.clone(),
        };

        match tx.try_send(PipelineEvent::Frame(Box::new(snapshot))) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => {
                warn!(frame_index, "consumer is lagging, dropping frame snapshot");
            }
            Err(TrySendError::Disconnected(_)) => {
                debug!(frame_index, "consumer disconnected, notifications stopped");
                self.events = None;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::integration::VecFrameSource;
    use image::Rgb;
    use std::convert::Infallible;

    struct MockDetector {
        shapes: Vec<RawShape>,
    }

    impl ShapeDetector for MockDetector {
        type Error = Infallible;

        fn detect(&mut self, _frame: &RgbImage) -> std::result::Result<Vec<RawShape>, Self::Error> {
            Ok(self.shapes.clone())
        }
    }

    fn frames(n: usize) -> VecFrameSource {
        let mut frame = RgbImage::new(200, 200);
        for pixel in frame.pixels_mut() {
            *pixel = Rgb([30, 60, 90]);
        }
        VecFrameSource::new(std::iter::repeat_n(frame, n))
    }

    #[test]
    fn test_tracker_pipeline() {
        let detector = MockDetector {
            shapes: vec![RawShape::Circle { x: 100, y: 100, radius: 30 }],
        };

        let mut pipeline = TrackerPipeline::with_default_config(frames(3), detector);
        let events = pipeline.subscribe();
        assert_eq!(pipeline.run().unwrap(), 3);

        let tracks = pipeline.tracker().tracks();
        assert_eq!(tracks.len(), 1);
        assert_eq!(tracks[0].id(), 1);
        assert_eq!(tracks[0].color(), Rgb([30, 60, 90]));
        assert_eq!(tracks[0].history().len(), 3);

        let received: Vec<PipelineEvent> = events.iter().collect();
        assert_eq!(received.len(), 4);
        assert!(matches!(received[3], PipelineEvent::Finished { frames: 3 }));
    }

    #[test]
    fn test_undersized_shapes_are_filtered() {
        let detector = MockDetector {
            shapes: vec![
                RawShape::Circle { x: 50, y: 50, radius: 17 },
                RawShape::Rectangle { x1: 0, y1: 0, x2: 39, y2: 30 },
                RawShape::Rectangle { x1: 100, y1: 100, x2: 140, y2: 130 },
            ],
        };

        let mut pipeline = TrackerPipeline::with_default_config(frames(1), detector);
        pipeline.run().unwrap();

        let tracks = pipeline.tracker().tracks();
        assert_eq!(tracks.len(), 1);
        assert_eq!(tracks[0].shape_type(), crate::tracker::ShapeType::Rectangle);
    }

    #[test]
    fn test_full_channel_drops_snapshots_but_delivers_finish() {
        let (calls_tx, calls) = crossbeam_channel::unbounded();
        let detector = move |_: &RgbImage| -> std::result::Result<Vec<RawShape>, Infallible> {
            let _ = calls_tx.send(());
            Ok(vec![])
        };
        let config = PipelineConfig {
            notify_capacity: Some(2),
            ..PipelineConfig::default()
        };

        let handle = TrackerPipeline::new(frames(5), detector, config).spawn();
        // Hold off reading until the last frame has been detected, so the
        // snapshots of frames 2 and 3 found the channel full.
        for _ in 0..5 {
            calls.recv().unwrap();
        }

        let received: Vec<PipelineEvent> = handle.events().iter().collect();
        assert_eq!(handle.join().unwrap(), 5);

        let indices: Vec<u64> = received
            .iter()
            .filter_map(|e| match e {
                PipelineEvent::Frame(s) => Some(s.frame_index),
                PipelineEvent::Finished { .. } => None,
            })
            .collect();
        assert_eq!(&indices[..2], &[0, 1]);
        assert!(!indices.contains(&2) && !indices.contains(&3));
        assert!(matches!(received.last(), Some(PipelineEvent::Finished { frames: 5 })));
    }

    #[test]
    fn test_finish_with_disconnected_consumer() {
        let detector = MockDetector { shapes: vec![] };
        let config = PipelineConfig {
            notify_capacity: Some(1),
            ..PipelineConfig::default()
        };

        let mut pipeline = TrackerPipeline::new(frames(3), detector, config);
        drop(pipeline.subscribe());
        assert_eq!(pipeline.run().unwrap(), 3);
    }

    #[test]
    fn test_detector_error_is_reported() {
        let detector = |_: &RgbImage| -> std::result::Result<Vec<RawShape>, std::io::Error> {
            Err(std::io::Error::other("detector offline"))
        };
        let mut pipeline = TrackerPipeline::with_default_config(frames(1), detector);
        assert!(matches!(
            pipeline.run(),
            Err(Error::Detector { frame_index: 0, .. })
        ));
    }

    #[test]
    fn test_frame_size_mismatch() {
        let source = VecFrameSource::new([RgbImage::new(10, 10), RgbImage::new(12, 10)]);
        let detector = MockDetector { shapes: vec![] };
        let mut pipeline = TrackerPipeline::with_default_config(source, detector);
        assert!(matches!(
            pipeline.run(),
            Err(Error::FrameSizeMismatch { frame_index: 1, .. })
        ));
    }
}
