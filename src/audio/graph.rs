//! Synthesis graph abstraction
//!
//! The engine never talks to a concrete audio API. It drives a [`SynthGraph`]
//! which owns the real nodes; the browser build backs it with Web Audio and
//! tests back it with a recorder.

use super::AudioError;
use super::synth::{BufferVoice, OscillatorVoice, ParamEvent};

/// Handle to one live voice in a graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VoiceId(pub u64);

/// Mix buses. Music feeds Master, Master feeds the output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Bus {
    Master,
    Music,
}

/// Where a voice's gain stage is connected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Bus(Bus),
    /// Added to the frequency of another oscillator voice
    Modulate(VoiceId),
}

/// Automatable parameter of a voice
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Param {
    Gain,
    /// Oscillator voices only
    Frequency,
}

pub trait SynthGraph {
    /// Graph clock in seconds
    fn current_time(&self) -> f64;

    fn sample_rate(&self) -> f32;

    /// Resume a suspended output; called from a user gesture
    fn resume(&mut self) {}

    fn set_bus_gain(&mut self, bus: Bus, gain: f32);

    fn start_oscillator(
        &mut self,
        id: VoiceId,
        voice: &OscillatorVoice,
        route: Route,
    ) -> Result<(), AudioError>;

    fn start_buffer(
        &mut self,
        id: VoiceId,
        voice: &BufferVoice,
        route: Route,
    ) -> Result<(), AudioError>;

    fn automate(
        &mut self,
        id: VoiceId,
        param: Param,
        events: &[ParamEvent],
    ) -> Result<(), AudioError>;

    /// Stop and disconnect a voice. Unknown ids are ignored.
    fn release(&mut self, id: VoiceId);
}
