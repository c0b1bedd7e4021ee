//! Feeds a synthetic beat through the processor and prints the tempo.
//!
//! Run with `RUST_LOG=debug cargo run --example tempo` to see analyzer logs.

use spectral_lens::audio::ProcessorConfig;
use spectral_lens::spectrum::AnalyzerConfig;
use spectral_lens::{FilterKind, SineOscillator, SpectralProcessor, TempoDetector};
use std::time::{Duration, Instant};

const SAMPLE_RATE: f32 = 8000.0;
const BLOCK_SIZE: usize = 1024;
const BLOCKS: usize = 32;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    let config = ProcessorConfig {
        analyzer: AnalyzerConfig {
            data_size: BLOCK_SIZE,
            ..AnalyzerConfig::default()
        },
        ..ProcessorConfig::default()
    };
    let mut processor = SpectralProcessor::new(config);
    let mut producer = processor.start()?;
    processor.set_filter_kind(0.2, FilterKind::LowPass);

    // A click in the middle of every other block over a high tone
    let mut tone = SineOscillator::new(SAMPLE_RATE, 3700.0, 0.3);
    let mut block = vec![0.0; BLOCK_SIZE];
    let mut detector = TempoDetector::with_params(SAMPLE_RATE, 0.05, 32);

    for n in 0..BLOCKS {
        tone.fill(&mut block);
        if n % 2 == 0 {
            block[BLOCK_SIZE / 2] += 1.0;
        }
        producer.write(&block);

        let deadline = Instant::now() + Duration::from_secs(1);
        let frame = loop {
            if let Some(frame) = processor.latest_frame() {
                break Some(frame);
            }
            if Instant::now() > deadline {
                break None;
            }
            std::thread::sleep(Duration::from_millis(1));
        };

        let Some(frame) = frame else {
            log::warn!("No frame for block {}", n);
            continue;
        };

        let mut filtered = frame.filtered;
        filtered[..64].fill(0.0);
        filtered[BLOCK_SIZE - 64..].fill(0.0);
        if let Some(bpm) = detector.process(&filtered) {
            println!("block {:2}: {:.1} BPM", n, bpm);
        }
    }

    processor.stop();
    Ok(())
}
