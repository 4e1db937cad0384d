//! Web Audio backend

use std::collections::HashMap;

use wasm_bindgen::JsValue;
use web_sys::{
    AudioBufferSourceNode, AudioContext, AudioContextState, AudioParam, GainNode, OscillatorNode,
    OscillatorType,
};

use super::AudioError;
use super::graph::{Bus, Param, Route, SynthGraph, VoiceId};
use super::synth::{BufferVoice, OscillatorVoice, ParamEvent, Waveform};

fn js_err(e: JsValue) -> AudioError {
    AudioError::Graph(format!("{e:?}"))
}

enum Source {
    Oscillator(OscillatorNode),
    Buffer(AudioBufferSourceNode),
}

struct WebVoice {
    source: Source,
    gain: GainNode,
}

/// Synthesis graph backed by an `AudioContext`
pub struct WebAudioGraph {
    ctx: AudioContext,
    master: GainNode,
    music: GainNode,
    voices: HashMap<VoiceId, WebVoice>,
}

impl WebAudioGraph {
    /// Fails when the browser has no Web Audio or refuses a context
    pub fn new() -> Result<Self, AudioError> {
        let ctx = AudioContext::new().map_err(|e| AudioError::Unavailable(format!("{e:?}")))?;
        let master = ctx.create_gain().map_err(js_err)?;
        let music = ctx.create_gain().map_err(js_err)?;
        master
            .connect_with_audio_node(&ctx.destination())
            .map_err(js_err)?;
        music.connect_with_audio_node(&master).map_err(js_err)?;
        Ok(Self {
            ctx,
            master,
            music,
            voices: HashMap::new(),
        })
    }

    fn bus(&self, bus: Bus) -> &GainNode {
        match bus {
            Bus::Master => &self.master,
            Bus::Music => &self.music,
        }
    }

    fn connect(&self, gain: &GainNode, route: Route) -> Result<(), AudioError> {
        match route {
            Route::Bus(bus) => {
                gain.connect_with_audio_node(self.bus(bus))
                    .map_err(js_err)?;
            }
            Route::Modulate(target) => {
                let Some(WebVoice {
                    source: Source::Oscillator(osc),
                    ..
                }) = self.voices.get(&target)
                else {
                    return Err(AudioError::UnknownVoice(target));
                };
                gain.connect_with_audio_param(&osc.frequency())
                    .map_err(js_err)?;
            }
        }
        Ok(())
    }
}

fn oscillator_type(waveform: Waveform) -> OscillatorType {
    match waveform {
        Waveform::Sine => OscillatorType::Sine,
        Waveform::Triangle => OscillatorType::Triangle,
        Waveform::Square => OscillatorType::Square,
        Waveform::Sawtooth => OscillatorType::Sawtooth,
    }
}

fn apply_events(param: &AudioParam, events: &[ParamEvent]) -> Result<(), AudioError> {
    for event in events {
        match *event {
            ParamEvent::Set { value, at } => {
                param.set_value_at_time(value, at).map_err(js_err)?;
            }
            ParamEvent::LinearRamp { value, until } => {
                param
                    .linear_ramp_to_value_at_time(value, until)
                    .map_err(js_err)?;
            }
            ParamEvent::HoldCurrent { at } => {
                param.cancel_scheduled_values(at).map_err(js_err)?;
                param.set_value_at_time(param.value(), at).map_err(js_err)?;
            }
        }
    }
    Ok(())
}

impl SynthGraph for WebAudioGraph {
    fn current_time(&self) -> f64 {
        self.ctx.current_time()
    }

    fn sample_rate(&self) -> f32 {
        self.ctx.sample_rate()
    }

    fn resume(&mut self) {
        if self.ctx.state() == AudioContextState::Suspended {
            let _ = self.ctx.resume();
        }
    }

    fn set_bus_gain(&mut self, bus: Bus, gain: f32) {
        self.bus(bus).gain().set_value(gain);
    }

    fn start_oscillator(
        &mut self,
        id: VoiceId,
        voice: &OscillatorVoice,
        route: Route,
    ) -> Result<(), AudioError> {
        let osc = self.ctx.create_oscillator().map_err(js_err)?;
        let gain = self.ctx.create_gain().map_err(js_err)?;

        osc.set_type(oscillator_type(voice.waveform));
        osc.frequency().set_value(voice.frequency);
        gain.gain().set_value(voice.gain);
        apply_events(&osc.frequency(), &voice.frequency_events)?;
        apply_events(&gain.gain(), &voice.gain_events)?;

        osc.connect_with_audio_node(&gain).map_err(js_err)?;
        self.connect(&gain, route)?;

        osc.start_with_when(voice.start).map_err(js_err)?;
        if let Some(stop) = voice.stop {
            osc.stop_with_when(stop).map_err(js_err)?;
        }

        self.voices.insert(
            id,
            WebVoice {
                source: Source::Oscillator(osc),
                gain,
            },
        );
        Ok(())
    }

    fn start_buffer(
        &mut self,
        id: VoiceId,
        voice: &BufferVoice,
        route: Route,
    ) -> Result<(), AudioError> {
        let buffer = self
            .ctx
            .create_buffer(1, voice.samples.len() as u32, voice.sample_rate)
            .map_err(js_err)?;
        let mut samples = voice.samples.clone();
        buffer.copy_to_channel(&mut samples, 0).map_err(js_err)?;

        let source = self.ctx.create_buffer_source().map_err(js_err)?;
        let gain = self.ctx.create_gain().map_err(js_err)?;
        source.set_buffer(Some(&buffer));
        gain.gain().set_value(voice.gain);

        source.connect_with_audio_node(&gain).map_err(js_err)?;
        self.connect(&gain, route)?;
        source.start_with_when(voice.start).map_err(js_err)?;

        self.voices.insert(
            id,
            WebVoice {
                source: Source::Buffer(source),
                gain,
            },
        );
        Ok(())
    }

    fn automate(
        &mut self,
        id: VoiceId,
        param: Param,
        events: &[ParamEvent],
    ) -> Result<(), AudioError> {
        let voice = self.voices.get(&id).ok_or(AudioError::UnknownVoice(id))?;
        let target = match (param, &voice.source) {
            (Param::Gain, _) => voice.gain.gain(),
            (Param::Frequency, Source::Oscillator(osc)) => osc.frequency(),
            (Param::Frequency, Source::Buffer(_)) => {
                return Err(AudioError::UnsupportedParam(id));
            }
        };
        apply_events(&target, events)
    }

    fn release(&mut self, id: VoiceId) {
        let Some(voice) = self.voices.remove(&id) else {
            return;
        };
        // Already-stopped sources throw; nothing to do about it
        match &voice.source {
            Source::Oscillator(osc) => {
                osc.stop().ok();
                osc.disconnect().ok();
            }
            Source::Buffer(src) => {
                src.stop().ok();
                src.disconnect().ok();
            }
        }
        voice.gain.disconnect().ok();
    }
}
