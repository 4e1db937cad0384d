//! Procedural audio
//!
//! Every sound is synthesized at runtime, no sample files. Cues and music are
//! described by [`synth`], scheduled onto a [`graph::SynthGraph`] by
//! [`AudioEngine`], and the browser build supplies a Web Audio graph.

pub mod engine;
pub mod graph;
pub mod synth;
pub mod timer;
#[cfg(target_arch = "wasm32")]
pub mod web;

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

pub use engine::{AudioEngine, MusicState};
pub use graph::{Bus, Param, Route, SynthGraph, VoiceId};
#[cfg(target_arch = "wasm32")]
pub use web::WebAudioGraph;

/// One-shot sound cues
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cue {
    /// Player ate a rival: short downward chirp
    Eat,
    /// Player was eaten: sagging minor chord
    GameOver,
    /// Rising major arpeggio
    LevelUp,
    /// UI button press
    Click,
}

impl Cue {
    pub const ALL: [Cue; 4] = [Cue::Eat, Cue::GameOver, Cue::LevelUp, Cue::Click];

    pub fn name(self) -> &'static str {
        match self {
            Cue::Eat => "eat",
            Cue::GameOver => "gameOver",
            Cue::LevelUp => "levelUp",
            Cue::Click => "click",
        }
    }
}

impl fmt::Display for Cue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Cue {
    type Err = AudioError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Cue::ALL
            .into_iter()
            .find(|cue| cue.name() == s)
            .ok_or_else(|| AudioError::UnknownCue(s.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AudioError {
    #[error("audio output unavailable: {0}")]
    Unavailable(String),
    #[error("unknown sound cue {0:?}")]
    UnknownCue(String),
    #[error("no live voice {0:?}")]
    UnknownVoice(VoiceId),
    #[error("voice {0:?} has no such parameter")]
    UnsupportedParam(VoiceId),
    #[error("synthesis graph error: {0}")]
    Graph(String),
}

/// What the game loop needs from the sound system
pub trait SoundSink {
    fn play_cue(&mut self, cue: Cue);
    /// Session started; background music should play if allowed
    fn start_music(&mut self);
    /// Session ended; background music fades out
    fn stop_music(&mut self);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cue_names_round_trip() {
        for cue in Cue::ALL {
            assert_eq!(cue.name().parse::<Cue>(), Ok(cue));
            assert_eq!(cue.to_string(), cue.name());
        }
    }

    #[test]
    fn test_unknown_cue() {
        assert_eq!(
            "splash".parse::<Cue>(),
            Err(AudioError::UnknownCue("splash".to_string()))
        );
        // Names are case sensitive
        assert!("EAT".parse::<Cue>().is_err());
    }
}
