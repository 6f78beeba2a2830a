use std::{
    sync::mpsc::{self, Receiver, Sender},
    thread,
};

use super::types::FingerSample;

/// Anything that yields finger samples one at a time.
///
/// `None` means the source is exhausted.
pub trait SampleSource {
    fn next_sample(&mut self) -> Option<FingerSample>;
}

/// Blocks until a sample arrives or every sender has hung up.
impl SampleSource for Receiver<FingerSample> {
    fn next_sample(&mut self) -> Option<FingerSample> {
        self.recv().ok()
    }
}

/// Adapts any iterator of samples.
pub struct IterSource<I> {
    inner: I,
}

impl<I> IterSource<I>
where
    I: Iterator<Item = FingerSample>,
{
    pub fn new(inner: impl IntoIterator<IntoIter = I>) -> Self {
        Self {
            inner: inner.into_iter(),
        }
    }
}

impl<I> SampleSource for IterSource<I>
where
    I: Iterator<Item = FingerSample>,
{
    fn next_sample(&mut self) -> Option<FingerSample> {
        self.inner.next()
    }
}

/// Runs `producer` on its own thread and returns the receiving end.
///
/// The channel closes when the producer returns, which ends a
/// [`GestureEngine::pump`](super::GestureEngine::pump) loop reading from it.
pub fn spawn_source<F>(producer: F) -> Receiver<FingerSample>
where
    F: FnOnce(Sender<FingerSample>) + Send + 'static,
{
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || producer(tx));
    rx
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::touch::types::{FingerState, Vec2};

    #[test]
    fn iter_source_yields_in_order_then_ends() {
        let samples = [1u64, 2, 3]
            .map(|frame| FingerSample::new(0, frame, 0.0, FingerState::Hover, Vec2::ZERO));
        let mut source = IterSource::new(samples);
        assert_eq!(source.next_sample().map(|s| s.frame), Some(1));
        assert_eq!(source.next_sample().map(|s| s.frame), Some(2));
        assert_eq!(source.next_sample().map(|s| s.frame), Some(3));
        assert_eq!(source.next_sample(), None);
    }

    #[test]
    fn spawned_source_closes_when_producer_returns() {
        let mut rx = spawn_source(|tx| {
            for frame in 0..4 {
                let sample = FingerSample::new(1, frame, 0.0, FingerState::Pressed, Vec2::ZERO);
                if tx.send(sample).is_err() {
                    return;
                }
            }
        });
        let mut frames = Vec::new();
        while let Some(sample) = rx.next_sample() {
            frames.push(sample.frame);
        }
        assert_eq!(frames, vec![0, 1, 2, 3]);
    }
}
