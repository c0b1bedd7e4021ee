//! Background spectral processor
//!
//! Keeps the analyzer on its own thread: the audio callback only writes to
//! the ring-buffer producer, and the render side only reads published
//! frames. The analyzer itself is never shared, so it needs no locking.

use crate::audio::buffer::{SampleConsumer, SampleProducer, SampleRingBuffer};
use crate::error::SpectrumError;
use crate::spectrum::{
    AnalyzerConfig, BandFilter, FftBackend, FilterKind, RealFftEngine, SpectralAnalyzer, StopHandle,
};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::Duration;

/// Processor configuration
#[derive(Debug, Clone)]
pub struct ProcessorConfig {
    /// Analyzer settings (block size, window, initial filter)
    pub analyzer: AnalyzerConfig,

    /// Ring buffer capacity in samples
    pub ring_capacity: usize,

    /// Sleep when no full block is available
    pub idle_sleep: Duration,
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        Self {
            analyzer: AnalyzerConfig::default(),
            ring_capacity: 96000,
            idle_sleep: Duration::from_micros(100),
        }
    }
}

/// Analysis results for one block
#[derive(Debug, Clone)]
pub struct SpectralFrame {
    /// Normalized amplitude per bin
    pub amplitude: Vec<f32>,

    /// Phase per bin
    pub phase: Vec<f32>,

    /// Filtered block reconstructed in the time domain
    pub filtered: Vec<f32>,

    /// Sequence number of the block, starting at 0
    pub frame_index: u64,
}

/// Runs a [`SpectralAnalyzer`] on a background thread
pub struct SpectralProcessor {
    config: ProcessorConfig,

    /// Pending filter change, picked up before the next block
    filter_command: Arc<Mutex<Option<BandFilter>>>,

    /// Latest published frame
    latest: Arc<Mutex<Option<SpectralFrame>>>,

    /// Blocks analyzed since start
    frames_processed: Arc<AtomicU64>,

    /// Processing loop flag
    running: Arc<AtomicBool>,

    /// Stops the analyzer mid-transform on shutdown
    analyzer_stop: Option<StopHandle>,

    /// Processing thread handle
    process_thread: Option<JoinHandle<()>>,
}

impl SpectralProcessor {
    pub fn new(config: ProcessorConfig) -> Self {
        Self {
            config,
            filter_command: Arc::new(Mutex::new(None)),
            latest: Arc::new(Mutex::new(None)),
            frames_processed: Arc::new(AtomicU64::new(0)),
            running: Arc::new(AtomicBool::new(false)),
            analyzer_stop: None,
            process_thread: None,
        }
    }

    /// Start the processing thread
    ///
    /// # Returns
    /// Producer end of the sample ring buffer, to be fed by the audio source
    pub fn start(&mut self) -> Result<SampleProducer, SpectrumError> {
        if self.process_thread.is_some() {
            return Err(SpectrumError::ProcessorRunning);
        }

        let analyzer = SpectralAnalyzer::with_config(self.config.analyzer.clone())?;
        if self.config.ring_capacity < self.config.analyzer.data_size {
            return Err(SpectrumError::RingTooSmall {
                capacity: self.config.ring_capacity,
                block: self.config.analyzer.data_size,
            });
        }
        let (producer, consumer) = SampleRingBuffer::new(self.config.ring_capacity).split();

        self.analyzer_stop = Some(analyzer.stop_handle());
        self.frames_processed.store(0, Ordering::SeqCst);
        self.running.store(true, Ordering::SeqCst);

        let worker = Worker {
            analyzer,
            consumer,
            filter_command: Arc::clone(&self.filter_command),
            latest: Arc::clone(&self.latest),
            frames_processed: Arc::clone(&self.frames_processed),
            running: Arc::clone(&self.running),
            idle_sleep: self.config.idle_sleep,
            frame_index: 0,
        };

        self.process_thread = Some(std::thread::spawn(move || worker.run()));

        log::info!(
            "Spectral processor started ({} samples per block)",
            self.config.analyzer.data_size
        );
        Ok(producer)
    }

    /// Stop the processing thread and wait for it to finish
    pub fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);

        if let Some(stop) = self.analyzer_stop.take() {
            stop.stop();
        }

        if let Some(handle) = self.process_thread.take() {
            if handle.join().is_err() {
                log::error!("Spectral processor thread panicked");
            }
            log::info!("Spectral processor stopped");
        }
    }

    /// Set the pass-band for subsequent blocks
    pub fn set_filter(&self, low: f32, high: f32) {
        if let Ok(mut command) = self.filter_command.lock() {
            *command = Some(BandFilter::new(low, high));
        }
    }

    /// Set a preset pass-band for subsequent blocks
    pub fn set_filter_kind(&self, frequency: f32, kind: FilterKind) {
        if let Ok(mut command) = self.filter_command.lock() {
            *command = Some(BandFilter::from_kind(frequency, kind));
        }
    }

    /// Take the latest frame, if a new one was published
    pub fn latest_frame(&self) -> Option<SpectralFrame> {
        self.latest.lock().ok().and_then(|mut frame| frame.take())
    }

    pub fn frames_processed(&self) -> u64 {
        self.frames_processed.load(Ordering::SeqCst)
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    pub fn config(&self) -> &ProcessorConfig {
        &self.config
    }
}

impl Drop for SpectralProcessor {
    fn drop(&mut self) {
        self.stop();
    }
}

/// State moved onto the processing thread
struct Worker<B: FftBackend = RealFftEngine> {
    analyzer: SpectralAnalyzer<B>,
    consumer: SampleConsumer,
    filter_command: Arc<Mutex<Option<BandFilter>>>,
    latest: Arc<Mutex<Option<SpectralFrame>>>,
    frames_processed: Arc<AtomicU64>,
    running: Arc<AtomicBool>,
    idle_sleep: Duration,
    frame_index: u64,
}

impl<B: FftBackend> Worker<B> {
    fn run(mut self) {
        let mut block = vec![0.0; self.analyzer.data_size()];

        while self.running.load(Ordering::SeqCst) {
            if !self.consumer.read_block(&mut block) {
                std::thread::sleep(self.idle_sleep);
                continue;
            }

            if !self.process_block(&block) {
                break;
            }
        }
    }

    /// Analyze one block and publish its frame
    ///
    /// Returns `false` once the analyzer has been stopped; a block cut short
    /// by the stop is dropped.
    fn process_block(&mut self, block: &[f32]) -> bool {
        let pending = self
            .filter_command
            .lock()
            .ok()
            .and_then(|mut command| command.take());
        if let Some(filter) = pending {
            self.analyzer.set_filter(filter.low, filter.high);
        }

        self.analyzer.set_data(block);
        let frame = SpectralFrame {
            amplitude: self.analyzer.amplitude().to_vec(),
            phase: self.analyzer.phase().to_vec(),
            filtered: self.analyzer.data().to_vec(),
            frame_index: self.frame_index,
        };

        if !self.analyzer.is_running() {
            return false;
        }

        if let Ok(mut latest) = self.latest.lock() {
            *latest = Some(frame);
        }
        self.frame_index += 1;
        self.frames_processed.fetch_add(1, Ordering::SeqCst);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::SineOscillator;
    use num_complex::Complex32;
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::time::Instant;

    /// Fires the analyzer's stop handle from inside the forward transform
    struct StopOnForward {
        inner: RealFftEngine,
        stop: Rc<RefCell<Option<StopHandle>>>,
    }

    impl FftBackend for StopOnForward {
        fn resize(&mut self, size: usize) {
            self.inner.resize(size);
        }

        fn forward(&mut self, input: &mut [f32], output: &mut [Complex32]) -> Result<(), SpectrumError> {
            if let Some(handle) = self.stop.borrow().as_ref() {
                handle.stop();
            }
            self.inner.forward(input, output)
        }

        fn inverse(&mut self, input: &mut [Complex32], output: &mut [f32]) -> Result<(), SpectrumError> {
            self.inner.inverse(input, output)
        }

        fn size(&self) -> usize {
            self.inner.size()
        }
    }

    fn worker<B: FftBackend>(analyzer: SpectralAnalyzer<B>) -> Worker<B> {
        let (_, consumer) = SampleRingBuffer::new(64).split();
        Worker {
            analyzer,
            consumer,
            filter_command: Arc::new(Mutex::new(None)),
            latest: Arc::new(Mutex::new(None)),
            frames_processed: Arc::new(AtomicU64::new(0)),
            running: Arc::new(AtomicBool::new(true)),
            idle_sleep: Duration::from_micros(50),
            frame_index: 0,
        }
    }

    fn small_config() -> ProcessorConfig {
        ProcessorConfig {
            analyzer: AnalyzerConfig {
                data_size: 256,
                ..AnalyzerConfig::default()
            },
            ring_capacity: 4096,
            idle_sleep: Duration::from_micros(50),
        }
    }

    fn wait_for_frames(processor: &SpectralProcessor, count: u64) -> bool {
        let deadline = Instant::now() + Duration::from_secs(5);
        while processor.frames_processed() < count {
            if Instant::now() > deadline {
                return false;
            }
            std::thread::sleep(Duration::from_millis(1));
        }
        true
    }

    fn peak_bin(amplitude: &[f32]) -> usize {
        amplitude
            .iter()
            .enumerate()
            .max_by(|(_, a), (_, b)| a.partial_cmp(b).unwrap())
            .map(|(i, _)| i)
            .unwrap()
    }

    #[test]
    fn test_processes_blocks_from_producer() {
        let mut processor = SpectralProcessor::new(small_config());
        let mut producer = processor.start().unwrap();
        assert!(processor.is_running());

        // 48 kHz, 256-point block: 3000 Hz sits on bin 16
        let mut osc = SineOscillator::new(48000.0, 3000.0, 0.8);
        let mut block = vec![0.0; 256];
        for _ in 0..4 {
            osc.fill(&mut block);
            assert_eq!(producer.write(&block), 256);
        }

        assert!(wait_for_frames(&processor, 4));
        let frame = processor.latest_frame().unwrap();
        assert_eq!(frame.amplitude.len(), 129);
        assert_eq!(frame.phase.len(), 129);
        assert_eq!(frame.filtered.len(), 256);
        assert_eq!(peak_bin(&frame.amplitude), 16);
        assert!((frame.amplitude[16] - 0.8).abs() < 0.05);

        // Taken frames are not returned twice
        assert!(processor.latest_frame().is_none());

        processor.stop();
        assert!(!processor.is_running());
    }

    #[test]
    fn test_filter_applies_to_next_block() {
        let mut processor = SpectralProcessor::new(small_config());
        let mut producer = processor.start().unwrap();
        processor.set_filter_kind(0.05, FilterKind::LowPass);

        let mut osc = SineOscillator::new(48000.0, 3000.0, 0.8);
        let mut block = vec![0.0; 256];
        osc.fill(&mut block);
        producer.write(&block);

        assert!(wait_for_frames(&processor, 1));
        let frame = processor.latest_frame().unwrap();
        assert!(frame.amplitude[7..].iter().all(|&a| a == 0.0));
    }

    #[test]
    fn test_double_start_is_rejected() {
        let mut processor = SpectralProcessor::new(small_config());
        let _producer = processor.start().unwrap();
        assert!(matches!(processor.start(), Err(SpectrumError::ProcessorRunning)));

        processor.stop();
        assert!(processor.start().is_ok());
    }

    #[test]
    fn test_invalid_block_size() {
        let mut config = small_config();
        config.analyzer.data_size = 1;
        let mut processor = SpectralProcessor::new(config);
        assert_eq!(processor.start().err(), Some(SpectrumError::InvalidDataSize(1)));
        assert!(!processor.is_running());
    }

    #[test]
    fn test_ring_smaller_than_block_is_rejected() {
        let mut config = small_config();
        config.ring_capacity = 128;
        let mut processor = SpectralProcessor::new(config);
        assert_eq!(
            processor.start().err(),
            Some(SpectrumError::RingTooSmall {
                capacity: 128,
                block: 256
            })
        );
        assert!(!processor.is_running());
    }

    #[test]
    fn test_worker_publishes_frames_in_order() {
        let analyzer = SpectralAnalyzer::new(32).unwrap();
        let mut worker = worker(analyzer);
        let block = vec![0.25; 32];

        assert!(worker.process_block(&block));
        assert!(worker.process_block(&block));

        let frame = worker.latest.lock().unwrap().take().unwrap();
        assert_eq!(frame.frame_index, 1);
        assert_eq!(frame.amplitude.len(), 17);
        assert_eq!(worker.frames_processed.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_block_cut_short_by_stop_is_not_published() {
        let stop = Rc::new(RefCell::new(None));
        let backend = StopOnForward {
            inner: RealFftEngine::new(32),
            stop: Rc::clone(&stop),
        };
        let config = AnalyzerConfig {
            data_size: 32,
            ..AnalyzerConfig::default()
        };
        let analyzer = SpectralAnalyzer::with_backend(config, backend).unwrap();
        *stop.borrow_mut() = Some(analyzer.stop_handle());

        let mut worker = worker(analyzer);
        assert!(!worker.process_block(&[0.5; 32]));

        assert!(worker.latest.lock().unwrap().is_none());
        assert_eq!(worker.frames_processed.load(Ordering::SeqCst), 0);
        assert_eq!(worker.frame_index, 0);
    }
}
