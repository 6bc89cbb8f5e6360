//! Trait for external frame sources.

use std::collections::VecDeque;
use std::convert::Infallible;

use image::RgbImage;

/// Sequential stream of decoded RGB frames of constant size.
///
/// `Ok(None)` signals the end of the stream. Sources are read strictly in
/// order; no seeking is required.
pub trait FrameSource {
    /// Error type for decoding failures.
    type Error: std::error::Error + Send + Sync + 'static;

    fn next_frame(&mut self) -> Result<Option<RgbImage>, Self::Error>;
}

/// In-memory frame source, mostly useful for tests and replays.
#[derive(Debug, Clone, Default)]
pub struct VecFrameSource {
    frames: VecDeque<RgbImage>,
}

impl VecFrameSource {
    pub fn new(frames: impl IntoIterator<Item = RgbImage>) -> Self {
        Self {
            frames: frames.into_iter().collect(),
        }
    }

    pub fn remaining(&self) -> usize {
        self.frames.len()
    }
}

impl FrameSource for VecFrameSource {
    type Error = Infallible;

    fn next_frame(&mut self) -> Result<Option<RgbImage>, Self::Error> {
        Ok(self.frames.pop_front())
    }
}

/// Adapts an iterator of decode results into a frame source.
#[derive(Debug)]
pub struct IterFrameSource<I> {
    frames: I,
}

impl<I> IterFrameSource<I> {
    pub fn new(frames: I) -> Self {
        Self { frames }
    }
}

impl<I, E> FrameSource for IterFrameSource<I>
where
    I: Iterator<Item = Result<RgbImage, E>>,
    E: std::error::Error + Send + Sync + 'static,
{
    type Error = E;

    fn next_frame(&mut self) -> Result<Option<RgbImage>, Self::Error> {
        self.frames.next().transpose()
    }
}
