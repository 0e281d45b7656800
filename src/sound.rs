//! Sound cues. Each cue is synthesized once with fundsp and replayed
//! through rodio, fire and forget.

use fundsp::prelude::*;
use rodio::buffer::SamplesBuffer;
use rodio::{OutputStream, OutputStreamBuilder, Sink};

const SAMPLE_RATE: u32 = 44_100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cue {
    Jump,
    Score,
    Hit,
}

pub trait SoundPlayer {
    fn play(&mut self, cue: Cue);
}

#[derive(Clone, Copy)]
enum Wave {
    Sine,
    Saw,
}

/// Oscillator plus exponential frequency and gain ramps.
struct Shape {
    wave: Wave,
    freq: (f32, f32),
    gain: (f32, f32),
    seconds: f32,
}

impl Shape {
    fn of(cue: Cue) -> Self {
        match cue {
            Cue::Jump => Shape {
                wave: Wave::Sine,
                freq: (350.0, 500.0),
                gain: (0.3, 0.01),
                seconds: 0.1,
            },
            Cue::Score => Shape {
                wave: Wave::Sine,
                freq: (800.0, 800.0),
                gain: (0.1, 0.01),
                seconds: 0.1,
            },
            Cue::Hit => Shape {
                wave: Wave::Saw,
                freq: (150.0, 50.0),
                gain: (0.3, 0.01),
                seconds: 0.3,
            },
        }
    }
}

fn ramp((from, to): (f32, f32), t: f32) -> f32 {
    from * (to / from).powf(t.clamp(0.0, 1.0))
}

fn render(cue: Cue) -> Vec<f32> {
    let shape = Shape::of(cue);
    let mut osc: Box<dyn AudioUnit> = match shape.wave {
        Wave::Sine => Box::new(sine::<f32>()),
        Wave::Saw => Box::new(saw()),
    };
    osc.set_sample_rate(SAMPLE_RATE as f64);

    let len = (SAMPLE_RATE as f32 * shape.seconds) as usize;
    (0..len)
        .map(|i| {
            let t = i as f32 / len as f32;
            osc.filter_mono(ramp(shape.freq, t)) * ramp(shape.gain, t)
        })
        .collect()
}

/// Plays the pre-rendered cues on the default output device.
pub struct Synth {
    stream: OutputStream,
    jump: Vec<f32>,
    score: Vec<f32>,
    hit: Vec<f32>,
}

impl Synth {
    pub fn open() -> Result<Self, rodio::StreamError> {
        let mut stream = OutputStreamBuilder::open_default_stream()?;
        stream.log_on_drop(false);
        Ok(Self {
            stream,
            jump: render(Cue::Jump),
            score: render(Cue::Score),
            hit: render(Cue::Hit),
        })
    }

    fn samples(&self, cue: Cue) -> &[f32] {
        match cue {
            Cue::Jump => &self.jump,
            Cue::Score => &self.score,
            Cue::Hit => &self.hit,
        }
    }
}

impl SoundPlayer for Synth {
    fn play(&mut self, cue: Cue) {
        let sink = Sink::connect_new(self.stream.mixer());
        sink.append(SamplesBuffer::new(1, SAMPLE_RATE, self.samples(cue).to_vec()));
        sink.detach();
    }
}

/// Real output when a device is available, silence otherwise.
pub enum Audio {
    Synth(Synth),
    Mute,
}

impl Audio {
    pub fn open() -> Self {
        match Synth::open() {
            Ok(synth) => Audio::Synth(synth),
            Err(e) => {
                log::warn!("no audio output, playing silently: {e}");
                Audio::Mute
            }
        }
    }
}

impl SoundPlayer for Audio {
    fn play(&mut self, cue: Cue) {
        match self {
            Audio::Synth(synth) => synth.play(cue),
            Audio::Mute => log::trace!("muted cue {cue:?}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn peak(samples: &[f32]) -> f32 {
        samples.iter().fold(0.0, |m, s| m.max(s.abs()))
    }

    #[test]
    fn test_cue_lengths() {
        assert_eq!(render(Cue::Jump).len(), 4410);
        assert_eq!(render(Cue::Score).len(), 4410);
        assert_eq!(render(Cue::Hit).len(), 13230);
    }

    #[test]
    fn test_cues_are_audible_and_bounded() {
        for cue in [Cue::Jump, Cue::Score, Cue::Hit] {
            let samples = render(cue);
            let p = peak(&samples);
            assert!(p > 0.001, "{cue:?} is silent");
            // Oscillators are unit amplitude; a little slack for saw overshoot.
            assert!(p <= Shape::of(cue).gain.0 * 1.2, "{cue:?} peaks at {p}");
            assert!(samples.iter().all(|s| s.is_finite()));
        }
    }

    #[test]
    fn test_cues_fade_out() {
        let samples = render(Cue::Hit);
        let head = peak(&samples[..2000]);
        let tail = peak(&samples[samples.len() - 2000..]);
        assert!(tail < head);
    }

    #[test]
    fn test_ramp_endpoints() {
        assert!((ramp((350.0, 500.0), 0.0) - 350.0).abs() < 1e-3);
        assert!((ramp((350.0, 500.0), 1.0) - 500.0).abs() < 1e-3);
        assert!((ramp((0.3, 0.01), 2.0) - 0.01).abs() < 1e-6);
    }

    #[test]
    fn test_mute_accepts_every_cue() {
        let mut audio = Audio::Mute;
        audio.play(Cue::Jump);
        audio.play(Cue::Score);
        audio.play(Cue::Hit);
    }
}
