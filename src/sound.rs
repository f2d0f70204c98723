//! Synthesized sound effects
//!
//! Effects are rendered once at startup into sample buffers and replayed
//! through a detached sink, so a frame never waits on audio.

use fundsp::prelude32::*;
use rodio::{OutputStream, OutputStreamHandle, Sink, buffer::SamplesBuffer};

const SAMPLE_RATE: u32 = 44_100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    Bounce,
    Death,
}

pub struct Sfx {
    _stream: OutputStream,
    handle: OutputStreamHandle,
    bounce: Vec<f32>,
    death: Vec<f32>,
}

impl Sfx {
    /// Open the default output device. `None` when there is no audio,
    /// in which case the game just runs silent.
    pub fn new() -> Option<Self> {
        let (stream, handle) = match OutputStream::try_default() {
            Ok(pair) => pair,
            Err(e) => {
                log::warn!("no audio output, running silent: {e}");
                return None;
            }
        };
        Some(Self {
            _stream: stream,
            handle,
            bounce: bounce_samples(),
            death: death_samples(),
        })
    }

    pub fn play(&self, effect: Effect) {
        let samples = match effect {
            Effect::Bounce => &self.bounce,
            Effect::Death => &self.death,
        };
        let sink = match Sink::try_new(&self.handle) {
            Ok(sink) => sink,
            Err(e) => {
                log::warn!("failed to play {effect:?}: {e}");
                return;
            }
        };
        sink.append(SamplesBuffer::new(1, SAMPLE_RATE, samples.clone()));
        sink.detach(); // Play in background
    }
}

/// Short rising square blip
pub fn bounce_samples() -> Vec<f32> {
    let freq = lfo(|t: f32| 220.0 + 660.0 * (t / 0.08).min(1.0));
    let gain = lfo(|t: f32| 0.12 * (1.0 - t / 0.12).max(0.0));
    render(Box::new((freq >> square()) * gain), 0.12)
}

/// Sawtooth sweep 400Hz → 80Hz over 0.4s, fading out over 0.5s
pub fn death_samples() -> Vec<f32> {
    let freq = lfo(|t: f32| 400.0 + (80.0 - 400.0) * (t / 0.4).min(1.0));
    let gain = lfo(|t: f32| 0.15 * (1.0 - (t / 0.5).min(1.0)));
    render(Box::new((freq >> saw()) * gain), 0.5)
}

fn render(mut unit: Box<dyn AudioUnit>, seconds: f32) -> Vec<f32> {
    unit.set_sample_rate(SAMPLE_RATE as f64);
    let n = (SAMPLE_RATE as f32 * seconds) as usize;
    (0..n).map(|_| unit.get_mono()).collect()
}
