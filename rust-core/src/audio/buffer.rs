//! Lock-free ring buffer for audio data
//!
//! Single-producer / single-consumer hand-off between the audio callback
//! and the analysis thread. The consumer side assembles fixed-size blocks
//! for `SpectralAnalyzer::set_data`.

use ringbuf::{HeapConsumer, HeapProducer, HeapRb};

/// Thread-safe sample ring buffer
pub struct SampleRingBuffer {
    producer: HeapProducer<f32>,
    consumer: HeapConsumer<f32>,
    capacity: usize,
}

impl SampleRingBuffer {
    /// Create new ring buffer with given capacity
    ///
    /// # Arguments
    /// * `capacity` - Buffer capacity in samples
    pub fn new(capacity: usize) -> Self {
        let rb = HeapRb::<f32>::new(capacity);
        let (producer, consumer) = rb.split();

        Self {
            producer,
            consumer,
            capacity,
        }
    }

    /// Split into producer and consumer ends
    pub fn split(self) -> (SampleProducer, SampleConsumer) {
        (
            SampleProducer {
                producer: self.producer,
                capacity: self.capacity,
            },
            SampleConsumer {
                consumer: self.consumer,
                capacity: self.capacity,
            },
        )
    }

    /// Get buffer capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

/// Producer end (audio callback side)
pub struct SampleProducer {
    producer: HeapProducer<f32>,
    capacity: usize,
}

impl SampleProducer {
    /// Write mono samples
    ///
    /// # Returns
    /// Number of samples actually written (may be less if buffer is full)
    pub fn write(&mut self, samples: &[f32]) -> usize {
        self.producer.push_slice(samples)
    }

    /// Write one channel of an interleaved buffer
    ///
    /// # Arguments
    /// * `samples` - Interleaved frames
    /// * `channels` - Number of channels per frame
    /// * `channel` - Channel to keep (0-based)
    ///
    /// # Returns
    /// Number of samples actually written
    pub fn write_interleaved(&mut self, samples: &[f32], channels: usize, channel: usize) -> usize {
        if channels == 0 || channel >= channels {
            return 0;
        }

        let mut written = 0;
        for &sample in samples.iter().skip(channel).step_by(channels) {
            if self.producer.push(sample).is_err() {
                break;
            }
            written += 1;
        }
        written
    }

    /// Get number of free slots
    pub fn free_len(&self) -> usize {
        self.producer.free_len()
    }

    /// Get buffer capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

/// Consumer end (analysis side)
pub struct SampleConsumer {
    consumer: HeapConsumer<f32>,
    capacity: usize,
}

impl SampleConsumer {
    /// Read whatever is available into `buffer`
    ///
    /// # Returns
    /// Number of samples actually read
    pub fn read(&mut self, buffer: &mut [f32]) -> usize {
        self.consumer.pop_slice(buffer)
    }

    /// Fill `block` completely, or leave the buffer untouched
    ///
    /// # Returns
    /// `true` if a full block was read
    pub fn read_block(&mut self, block: &mut [f32]) -> bool {
        if self.consumer.len() < block.len() {
            return false;
        }
        self.consumer.pop_slice(block) == block.len()
    }

    /// Get number of available samples
    pub fn len(&self) -> usize {
        self.consumer.len()
    }

    /// Check if buffer is empty
    pub fn is_empty(&self) -> bool {
        self.consumer.is_empty()
    }

    /// Get buffer capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
