//! Ordered accumulation of documents into fixed-size batches

use placeload_common::types::PlaceDocument;

/// A batch ready to be committed, in input order
pub type Batch = Vec<PlaceDocument>;

/// Buffers items and hands out a full batch once `threshold` is reached.
///
/// Items leave in the order they were pushed; the final partial batch is
/// returned by [`Batcher::finish`].
#[derive(Debug)]
pub struct Batcher<T> {
    threshold: usize,
    buffer: Vec<T>,
}

impl<T> Batcher<T> {
    /// A threshold of zero is treated as one
    pub fn new(threshold: usize) -> Self {
        let threshold = threshold.max(1);
        Self {
            threshold,
            buffer: Vec::with_capacity(threshold),
        }
    }

    pub fn threshold(&self) -> usize {
        self.threshold
    }

    /// Add an item; returns the full batch when the threshold is hit
    pub fn push(&mut self, item: T) -> Option<Vec<T>> {
        self.buffer.push(item);
        if self.buffer.len() >= self.threshold {
            let full = std::mem::replace(&mut self.buffer, Vec::with_capacity(self.threshold));
            Some(full)
        } else {
            None
        }
    }

    /// Drain whatever is left; `None` when the buffer is empty
    pub fn finish(&mut self) -> Option<Vec<T>> {
        if self.buffer.is_empty() {
            None
        } else {
            Some(std::mem::take(&mut self.buffer))
        }
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }
}
