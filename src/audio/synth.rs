//! Signal synthesizer
//!
//! Builds voice descriptions (oscillators with parameter automation, or
//! pre-rendered sample buffers) for every cue and for background music.
//! Nothing here touches a live graph; the engine submits what these return.

use std::f64::consts::TAU;

use super::Cue;
use crate::semitones_to_hz;

/// Oscillator shape
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Waveform {
    Sine,
    Triangle,
    Square,
    Sawtooth,
}

/// One scheduled change to an audio parameter, in graph time (seconds)
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParamEvent {
    /// Jump to `value` at `at`
    Set { value: f32, at: f64 },
    /// Ramp linearly from the previous event to `value`, reaching it at `until`
    LinearRamp { value: f32, until: f64 },
    /// Pin whatever value the parameter has right now at `at`
    HoldCurrent { at: f64 },
}

/// An oscillator feeding its own gain envelope
#[derive(Debug, Clone, PartialEq)]
pub struct OscillatorVoice {
    pub waveform: Waveform,
    pub frequency: f32,
    /// Gain before any automation runs
    pub gain: f32,
    pub gain_events: Vec<ParamEvent>,
    pub frequency_events: Vec<ParamEvent>,
    pub start: f64,
    /// `None` runs until released
    pub stop: Option<f64>,
}

/// A pre-rendered mono buffer played once at a fixed gain
#[derive(Debug, Clone, PartialEq)]
pub struct BufferVoice {
    pub samples: Vec<f32>,
    pub sample_rate: f32,
    pub gain: f32,
    pub start: f64,
}

impl BufferVoice {
    pub fn duration(&self) -> f64 {
        self.samples.len() as f64 / f64::from(self.sample_rate.max(1.0))
    }

    pub fn end(&self) -> f64 {
        self.start + self.duration()
    }
}

/// A voice produced for a one-shot cue
#[derive(Debug, Clone, PartialEq)]
pub enum CueVoice {
    Oscillator(OscillatorVoice),
    Buffer(BufferVoice),
}

impl CueVoice {
    /// Graph time after which the voice is silent and can be released
    pub fn end(&self) -> f64 {
        match self {
            CueVoice::Oscillator(osc) => osc.stop.unwrap_or(osc.start),
            CueVoice::Buffer(buf) => buf.end(),
        }
    }
}

// === Cue parameters ===

const EAT_DURATION: f32 = 0.3;
const EAT_SWEEP: (f32, f32) = (800.0, 200.0);
const EAT_DECAY: f32 = 8.0;

const CLICK_DURATION: f32 = 0.1;
const CLICK_HZ: f32 = 1200.0;
const CLICK_DECAY: f32 = 30.0;
const CLICK_LEVEL: f32 = 0.5;

const GAME_OVER_BASE_HZ: f32 = 220.0;
/// Minor triad
const GAME_OVER_CHORD: [i32; 3] = [0, 3, 7];
const GAME_OVER_DURATION: f64 = 2.0;
const GAME_OVER_ATTACK: f64 = 0.1;
const GAME_OVER_LEVEL: f32 = 0.2;

const LEVEL_UP_BASE_HZ: f32 = 440.0;
/// Major triad plus octave
const LEVEL_UP_ARPEGGIO: [i32; 4] = [0, 4, 7, 12];
const LEVEL_UP_NOTE: f64 = 0.15;
const LEVEL_UP_LEVEL: f32 = 0.3;

// === Background music parameters ===

pub const BGM_BASE_HZ: f32 = 220.0;
/// Chord tones of the background pad
pub const BGM_CHORD: [i32; 4] = [0, 4, 7, 12];
/// Notes a pattern change may glide to
pub const BGM_SCALE: [i32; 10] = [0, 2, 4, 5, 7, 9, 11, 12, 14, 16];
pub const BGM_TONE_LEVEL: f32 = 0.1;
pub const BGM_FADE_IN: f64 = 1.0;
pub const BGM_FADE_OUT: f64 = 0.5;
pub const BGM_GLIDE: f64 = 2.0;
pub const BGM_PATTERN_PERIOD: f64 = 8.0;
pub const BGM_LFO_HZ: f32 = 0.1;
/// Modulator depth in Hz applied to the first chord tone
pub const BGM_LFO_DEPTH: f32 = 5.0;

/// Frequencies of a chord built on `base`
pub fn chord(base: f32, semitones: &[i32]) -> Vec<f32> {
    semitones.iter().map(|&s| semitones_to_hz(base, s)).collect()
}

/// Sine tone with a linear attack to `peak` then a linear release to silence
/// at `start + duration`
pub fn tone(frequency: f32, start: f64, duration: f64, peak: f32, attack: f64) -> OscillatorVoice {
    OscillatorVoice {
        waveform: Waveform::Sine,
        frequency,
        gain: 0.0,
        gain_events: vec![
            ParamEvent::Set {
                value: 0.0,
                at: start,
            },
            ParamEvent::LinearRamp {
                value: peak,
                until: start + attack,
            },
            ParamEvent::LinearRamp {
                value: 0.0,
                until: start + duration,
            },
        ],
        frequency_events: Vec::new(),
        start,
        stop: Some(start + duration),
    }
}

/// Render a sine whose instantaneous frequency moves linearly from `from_hz`
/// to `to_hz`, shaped by `exp(-decay * t)`
pub fn decaying_tone(
    sample_rate: f32,
    duration: f32,
    from_hz: f32,
    to_hz: f32,
    decay: f32,
) -> Vec<f32> {
    let len = (sample_rate * duration) as usize;
    let sr = f64::from(sample_rate);
    let mut phase = 0.0f64;
    (0..len)
        .map(|i| {
            let t = i as f32 / sample_rate;
            let freq = from_hz + (to_hz - from_hz) * (t / duration);
            let sample = (phase.sin() as f32) * (-decay * t).exp();
            phase = (phase + TAU * f64::from(freq) / sr) % TAU;
            sample
        })
        .collect()
}

/// Build the voices for a one-shot cue starting at graph time `now`
pub fn cue_voices(cue: Cue, now: f64, sample_rate: f32, sfx_volume: f32) -> Vec<CueVoice> {
    match cue {
        Cue::Eat => vec![CueVoice::Buffer(BufferVoice {
            samples: decaying_tone(sample_rate, EAT_DURATION, EAT_SWEEP.0, EAT_SWEEP.1, EAT_DECAY),
            sample_rate,
            gain: sfx_volume,
            start: now,
        })],
        Cue::Click => vec![CueVoice::Buffer(BufferVoice {
            samples: decaying_tone(sample_rate, CLICK_DURATION, CLICK_HZ, CLICK_HZ, CLICK_DECAY),
            sample_rate,
            gain: sfx_volume * CLICK_LEVEL,
            start: now,
        })],
        Cue::GameOver => chord(GAME_OVER_BASE_HZ, &GAME_OVER_CHORD)
            .into_iter()
            .map(|freq| {
                let mut voice = tone(
                    freq,
                    now,
                    GAME_OVER_DURATION,
                    sfx_volume * GAME_OVER_LEVEL,
                    GAME_OVER_ATTACK,
                );
                // Sag to half pitch over the whole note
                voice.frequency_events = vec![
                    ParamEvent::Set {
                        value: freq,
                        at: now,
                    },
                    ParamEvent::LinearRamp {
                        value: freq * 0.5,
                        until: now + GAME_OVER_DURATION,
                    },
                ];
                CueVoice::Oscillator(voice)
            })
            .collect(),
        Cue::LevelUp => chord(LEVEL_UP_BASE_HZ, &LEVEL_UP_ARPEGGIO)
            .into_iter()
            .enumerate()
            .map(|(i, freq)| {
                let start = now + i as f64 * LEVEL_UP_NOTE;
                CueVoice::Oscillator(tone(
                    freq,
                    start,
                    LEVEL_UP_NOTE,
                    sfx_volume * LEVEL_UP_LEVEL,
                    LEVEL_UP_NOTE * 0.1,
                ))
            })
            .collect(),
    }
}

/// A sustained chord tone for background music, fading in from silence
pub fn music_tone(frequency: f32, now: f64) -> OscillatorVoice {
    OscillatorVoice {
        waveform: Waveform::Sine,
        frequency,
        gain: 0.0,
        gain_events: vec![
            ParamEvent::Set { value: 0.0, at: now },
            ParamEvent::LinearRamp {
                value: BGM_TONE_LEVEL,
                until: now + BGM_FADE_IN,
            },
        ],
        frequency_events: Vec::new(),
        start: now,
        stop: None,
    }
}

/// Slow sine whose gain is the modulation depth in Hz
pub fn music_modulator(now: f64) -> OscillatorVoice {
    OscillatorVoice {
        waveform: Waveform::Sine,
        frequency: BGM_LFO_HZ,
        gain: BGM_LFO_DEPTH,
        gain_events: Vec::new(),
        frequency_events: Vec::new(),
        start: now,
        stop: None,
    }
}

/// Hold the current value then ramp linearly to `target` over `duration`
pub fn glide(now: f64, target: f32, duration: f64) -> [ParamEvent; 2] {
    [
        ParamEvent::HoldCurrent { at: now },
        ParamEvent::LinearRamp {
            value: target,
            until: now + duration,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    const SR: f32 = 44_100.0;

    /// Estimate frequency from sign changes inside `[from, to)` seconds
    fn estimate_hz(samples: &[f32], from: f32, to: f32) -> f32 {
        let a = (from * SR) as usize;
        let b = (to * SR) as usize;
        let crossings = samples[a..b]
            .windows(2)
            .filter(|w| (w[0] < 0.0) != (w[1] < 0.0))
            .count();
        crossings as f32 / (2.0 * (to - from))
    }

    #[test]
    fn test_chord_frequencies() {
        let freqs = chord(220.0, &[0, 3, 7, 12]);
        assert_eq!(freqs[0], 220.0);
        assert!((freqs[1] - 261.6256).abs() < 0.01);
        assert!((freqs[2] - 329.6276).abs() < 0.01);
        assert!((freqs[3] - 440.0).abs() < 0.001);
    }

    #[test]
    fn test_eat_buffer_shape() {
        let voices = cue_voices(Cue::Eat, 1.0, SR, 0.5);
        let CueVoice::Buffer(buf) = &voices[0] else {
            panic!("eat should be a buffer voice");
        };
        assert_eq!(voices.len(), 1);
        assert_eq!(buf.samples.len(), (SR * 0.3) as usize);
        assert_eq!(buf.gain, 0.5);
        assert_eq!(buf.samples[0], 0.0);
        assert!((buf.end() - 1.3).abs() < 1e-3);

        // Sweep runs 800 Hz down to 200 Hz
        let early = estimate_hz(&buf.samples, 0.0, 0.02);
        let late = estimate_hz(&buf.samples, 0.26, 0.299);
        assert!((early - 780.0).abs() < 60.0, "early {early}");
        assert!((late - 230.0).abs() < 40.0, "late {late}");

        // exp(-8t) envelope bounds every sample
        for (i, s) in buf.samples.iter().enumerate() {
            let t = i as f32 / SR;
            assert!(s.abs() <= (-8.0 * t).exp() + 1e-6);
        }
    }

    #[test]
    fn test_click_buffer_shape() {
        let voices = cue_voices(Cue::Click, 0.0, SR, 0.8);
        let CueVoice::Buffer(buf) = &voices[0] else {
            panic!("click should be a buffer voice");
        };
        assert_eq!(buf.samples.len(), (SR * 0.1) as usize);
        assert!((buf.gain - 0.4).abs() < 1e-6);
        let hz = estimate_hz(&buf.samples, 0.0, 0.05);
        assert!((hz - 1200.0).abs() < 60.0, "hz {hz}");
        let tail = buf.samples[buf.samples.len() - 10..]
            .iter()
            .fold(0.0f32, |m, s| m.max(s.abs()));
        assert!(tail < (-30.0f32 * 0.099).exp() + 1e-6);
    }

    #[test]
    fn test_game_over_voices() {
        let voices = cue_voices(Cue::GameOver, 10.0, SR, 0.5);
        assert_eq!(voices.len(), 3);
        let expected = chord(220.0, &[0, 3, 7]);
        for (voice, freq) in voices.iter().zip(expected) {
            let CueVoice::Oscillator(osc) = voice else {
                panic!("game over uses oscillators");
            };
            assert_eq!(osc.frequency, freq);
            assert_eq!(osc.start, 10.0);
            assert_eq!(osc.stop, Some(12.0));
            assert_eq!(
                osc.gain_events,
                vec![
                    ParamEvent::Set { value: 0.0, at: 10.0 },
                    ParamEvent::LinearRamp {
                        value: 0.1,
                        until: 10.1
                    },
                    ParamEvent::LinearRamp {
                        value: 0.0,
                        until: 12.0
                    },
                ]
            );
            assert_eq!(
                osc.frequency_events[1],
                ParamEvent::LinearRamp {
                    value: freq * 0.5,
                    until: 12.0
                }
            );
        }
    }

    #[test]
    fn test_level_up_arpeggio() {
        let voices = cue_voices(Cue::LevelUp, 0.0, SR, 1.0);
        assert_eq!(voices.len(), 4);
        let mut previous_start = -1.0;
        for (i, voice) in voices.iter().enumerate() {
            let CueVoice::Oscillator(osc) = voice else {
                panic!("level up uses oscillators");
            };
            let start = i as f64 * 0.15;
            assert!((osc.start - start).abs() < 1e-9);
            assert!(osc.start > previous_start);
            previous_start = osc.start;
            assert!((osc.stop.unwrap() - (start + 0.15)).abs() < 1e-9);
            let ParamEvent::LinearRamp { value, until } = osc.gain_events[1] else {
                panic!("attack should be a ramp");
            };
            assert!((value - 0.3).abs() < 1e-6);
            assert!((until - (start + 0.015)).abs() < 1e-9);
        }
        let CueVoice::Oscillator(last) = &voices[3] else {
            unreachable!()
        };
        assert!((last.frequency - 880.0).abs() < 0.01);
    }

    #[test]
    fn test_cue_end_times() {
        for cue in Cue::ALL {
            let voices = cue_voices(cue, 5.0, SR, 1.0);
            assert!(!voices.is_empty());
            assert!(voices.iter().all(|v| v.end() > 5.0));
        }
    }

    #[test]
    fn test_music_voices() {
        let tone = music_tone(220.0, 3.0);
        assert_eq!(tone.stop, None);
        assert_eq!(
            tone.gain_events[1],
            ParamEvent::LinearRamp {
                value: BGM_TONE_LEVEL,
                until: 4.0
            }
        );
        let lfo = music_modulator(3.0);
        assert_eq!(lfo.frequency, BGM_LFO_HZ);
        assert_eq!(lfo.gain, BGM_LFO_DEPTH);
    }
}
