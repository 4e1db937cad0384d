//! Audio engine: owns the synthesis graph, the live voice pool and the
//! background-music state machine.
//!
//! Timers (pattern changes, fade-out releases) live in an engine-owned queue
//! keyed on the graph clock and are fired by [`AudioEngine::service`]. They
//! only ever touch engine state.

use std::collections::BTreeMap;

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::graph::{Bus, Param, Route, SynthGraph, VoiceId};
use super::synth::{self, CueVoice};
use super::timer::{TimerId, TimerQueue};
use super::{AudioError, Cue, SoundSink};
use crate::semitones_to_hz;
use crate::settings::{Settings, clamp_volume};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Role {
    Effect,
    MusicTone,
    Modulator,
    FadingOut,
}

#[derive(Debug, Clone)]
struct Voice {
    role: Role,
    frequency: f32,
    /// One-shot voices are released once the graph clock passes this
    ends_at: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AudioTimer {
    PatternChange,
    Release(VoiceId),
}

/// Background music lifecycle
#[derive(Debug, Clone, PartialEq)]
pub enum MusicState {
    Stopped,
    Playing {
        tones: Vec<VoiceId>,
        modulator: VoiceId,
        pattern_timer: TimerId,
    },
}

pub struct AudioEngine {
    /// `None` once construction failed; every operation is then a no-op
    graph: Option<Box<dyn SynthGraph>>,
    settings: Settings,
    music: MusicState,
    /// A session is running and asked for music
    music_wanted: bool,
    voices: BTreeMap<VoiceId, Voice>,
    timers: TimerQueue<AudioTimer>,
    next_voice: u64,
    rng: Pcg32,
}

impl std::fmt::Debug for AudioEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AudioEngine")
            .field("enabled", &self.graph.is_some())
            .field("settings", &self.settings)
            .field("music", &self.music)
            .field("voices", &self.voices.len())
            .finish()
    }
}

fn next_id(counter: &mut u64) -> VoiceId {
    let id = VoiceId(*counter);
    *counter += 1;
    id
}

impl AudioEngine {
    /// Engine driving `graph`; `seed` feeds pattern-change note choices
    pub fn new(graph: Box<dyn SynthGraph>, seed: u64) -> Self {
        let mut engine = Self {
            graph: Some(graph),
            rng: Pcg32::seed_from_u64(seed),
            ..Self::disabled()
        };
        if let Some(graph) = engine.graph.as_deref_mut() {
            graph.set_bus_gain(Bus::Music, engine.settings.bgm_volume);
            graph.set_bus_gain(Bus::Master, 1.0);
            log::info!("Audio engine ready at {} Hz", graph.sample_rate());
        }
        engine
    }

    /// Silent engine for hosts without audio output
    pub fn disabled() -> Self {
        Self {
            graph: None,
            settings: Settings::default(),
            music: MusicState::Stopped,
            music_wanted: false,
            voices: BTreeMap::new(),
            timers: TimerQueue::new(),
            next_voice: 1,
            rng: Pcg32::seed_from_u64(0),
        }
    }

    /// Build from a backend constructor, degrading to [`AudioEngine::disabled`]
    pub fn from_backend(backend: Result<Box<dyn SynthGraph>, AudioError>, seed: u64) -> Self {
        match backend {
            Ok(graph) => Self::new(graph, seed),
            Err(e) => {
                log::warn!("Audio disabled: {e}");
                Self::disabled()
            }
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.graph.is_some()
    }

    pub fn settings(&self) -> Settings {
        self.settings
    }

    pub fn is_muted(&self) -> bool {
        self.settings.muted
    }

    pub fn bgm_volume(&self) -> f32 {
        self.settings.bgm_volume
    }

    pub fn sfx_volume(&self) -> f32 {
        self.settings.sfx_volume
    }

    pub fn music_state(&self) -> &MusicState {
        &self.music
    }

    pub fn is_music_playing(&self) -> bool {
        matches!(self.music, MusicState::Playing { .. })
    }

    /// Voices currently held in the graph, fading ones included
    pub fn active_voices(&self) -> usize {
        self.voices.len()
    }

    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    /// Resume output after a user gesture
    pub fn resume(&mut self) {
        if let Some(graph) = self.graph.as_deref_mut() {
            graph.resume();
        }
    }

    /// Apply stored preferences in one go
    pub fn apply_settings(&mut self, settings: Settings) {
        if self.graph.is_none() {
            return;
        }
        let settings = settings.sanitized();
        self.set_bgm_volume(settings.bgm_volume);
        self.set_sfx_volume(settings.sfx_volume);
        self.set_muted(settings.muted);
    }

    // === Cues ===

    /// Play a one-shot cue. Silent while muted.
    pub fn play_cue(&mut self, cue: Cue) {
        let Some(graph) = self.graph.as_deref_mut() else {
            return;
        };
        if self.settings.muted {
            log::debug!("Muted, skipping {cue}");
            return;
        }

        let now = graph.current_time();
        for voice in synth::cue_voices(cue, now, graph.sample_rate(), self.settings.sfx_volume) {
            let id = next_id(&mut self.next_voice);
            let started = match &voice {
                CueVoice::Oscillator(osc) => {
                    graph.start_oscillator(id, osc, Route::Bus(Bus::Master))
                }
                CueVoice::Buffer(buf) => graph.start_buffer(id, buf, Route::Bus(Bus::Master)),
            };
            match started {
                Ok(()) => {
                    let frequency = match &voice {
                        CueVoice::Oscillator(osc) => osc.frequency,
                        CueVoice::Buffer(_) => 0.0,
                    };
                    self.voices.insert(
                        id,
                        Voice {
                            role: Role::Effect,
                            frequency,
                            ends_at: Some(voice.end()),
                        },
                    );
                }
                Err(e) => log::error!("Failed to start {cue} voice: {e}"),
            }
        }
    }

    /// Play a cue by its wire name; unknown names are logged and ignored
    pub fn play_cue_named(&mut self, name: &str) {
        match name.parse::<Cue>() {
            Ok(cue) => self.play_cue(cue),
            Err(e) => log::error!("{e}"),
        }
    }

    // === Background music ===

    /// Stopped -> Playing. No-op while muted or already playing.
    pub fn play_bgm(&mut self) {
        if self.settings.muted || self.is_music_playing() {
            return;
        }
        let Some(graph) = self.graph.as_deref_mut() else {
            return;
        };

        let now = graph.current_time();
        let mut tones = Vec::new();
        let mut failure = None;
        for freq in synth::chord(synth::BGM_BASE_HZ, &synth::BGM_CHORD) {
            let id = next_id(&mut self.next_voice);
            match graph.start_oscillator(id, &synth::music_tone(freq, now), Route::Bus(Bus::Music)) {
                Ok(()) => {
                    tones.push(id);
                    self.voices.insert(
                        id,
                        Voice {
                            role: Role::MusicTone,
                            frequency: freq,
                            ends_at: None,
                        },
                    );
                }
                Err(e) => {
                    failure = Some(e);
                    break;
                }
            }
        }

        let modulator = next_id(&mut self.next_voice);
        if failure.is_none() {
            let route = match tones.first() {
                Some(&first) => Route::Modulate(first),
                None => Route::Bus(Bus::Music),
            };
            match graph.start_oscillator(modulator, &synth::music_modulator(now), route) {
                Ok(()) => {
                    self.voices.insert(
                        modulator,
                        Voice {
                            role: Role::Modulator,
                            frequency: synth::BGM_LFO_HZ,
                            ends_at: None,
                        },
                    );
                }
                Err(e) => failure = Some(e),
            }
        }

        if let Some(e) = failure {
            log::error!("Background music failed to start: {e}");
            for id in tones {
                graph.release(id);
                self.voices.remove(&id);
            }
            return;
        }

        let pattern_timer = self
            .timers
            .schedule(now + synth::BGM_PATTERN_PERIOD, AudioTimer::PatternChange);
        log::info!("Background music playing ({} tones)", tones.len());
        self.music = MusicState::Playing {
            tones,
            modulator,
            pattern_timer,
        };
    }

    /// Playing -> Stopped: fade every music voice out, then release it
    pub fn stop_bgm(&mut self) {
        let MusicState::Playing {
            tones,
            modulator,
            pattern_timer,
        } = std::mem::replace(&mut self.music, MusicState::Stopped)
        else {
            return;
        };
        self.timers.cancel(pattern_timer);

        let Some(graph) = self.graph.as_deref_mut() else {
            return;
        };
        let now = graph.current_time();
        let fade = synth::glide(now, 0.0, synth::BGM_FADE_OUT);
        for id in tones.into_iter().chain(std::iter::once(modulator)) {
            if let Err(e) = graph.automate(id, Param::Gain, &fade) {
                log::warn!("Fade-out failed, releasing now: {e}");
                graph.release(id);
                self.voices.remove(&id);
                continue;
            }
            if let Some(voice) = self.voices.get_mut(&id) {
                voice.role = Role::FadingOut;
            }
            self.timers
                .schedule(now + synth::BGM_FADE_OUT, AudioTimer::Release(id));
        }
        log::info!("Background music stopping");
    }

    /// Glide one chord tone to a new scale note
    fn change_pattern(&mut self) {
        let MusicState::Playing { tones, .. } = &self.music else {
            return;
        };
        if tones.is_empty() {
            return;
        }
        let Some(graph) = self.graph.as_deref_mut() else {
            return;
        };

        let id = tones[self.rng.random_range(0..tones.len())];
        let note = synth::BGM_SCALE[self.rng.random_range(0..synth::BGM_SCALE.len())];
        let target = semitones_to_hz(synth::BGM_BASE_HZ, note);
        let now = graph.current_time();

        match graph.automate(id, Param::Frequency, &synth::glide(now, target, synth::BGM_GLIDE)) {
            Ok(()) => {
                if let Some(voice) = self.voices.get_mut(&id) {
                    voice.frequency = target;
                }
                log::trace!("Pattern change: {id:?} -> {target:.1} Hz");
            }
            Err(e) => log::warn!("Pattern change failed: {e}"),
        }
    }

    /// Fire due timers and release finished one-shot voices. Call regularly
    /// from the host (every frame is fine).
    pub fn service(&mut self) {
        let Some(now) = self.graph.as_deref().map(|g| g.current_time()) else {
            return;
        };

        while let Some((_, timer)) = self.timers.pop_due(now) {
            match timer {
                AudioTimer::PatternChange => {
                    self.change_pattern();
                    if let MusicState::Playing { pattern_timer, .. } = &mut self.music {
                        *pattern_timer = self
                            .timers
                            .schedule(now + synth::BGM_PATTERN_PERIOD, AudioTimer::PatternChange);
                    }
                }
                AudioTimer::Release(id) => self.release(id),
            }
        }

        let finished: Vec<VoiceId> = self
            .voices
            .iter()
            .filter(|(_, v)| v.role == Role::Effect && v.ends_at.is_some_and(|end| end <= now))
            .map(|(&id, _)| id)
            .collect();
        for id in finished {
            self.release(id);
        }
    }

    fn release(&mut self, id: VoiceId) {
        if let Some(graph) = self.graph.as_deref_mut() {
            graph.release(id);
        }
        self.voices.remove(&id);
        log::debug!("Released {id:?}");
    }

    /// Current frequency of a music voice, after any pattern changes
    pub fn voice_frequency(&self, id: VoiceId) -> Option<f32> {
        self.voices.get(&id).map(|v| v.frequency)
    }

    // === Mix ===

    /// Silence the master bus. Voices keep running and volumes are kept, so
    /// un-muting restores the exact mix.
    pub fn set_muted(&mut self, muted: bool) {
        let Some(graph) = self.graph.as_deref_mut() else {
            return;
        };
        self.settings.muted = muted;
        if muted {
            graph.set_bus_gain(Bus::Master, 0.0);
            log::info!("Audio muted");
        } else {
            graph.set_bus_gain(Bus::Master, 1.0);
            graph.set_bus_gain(Bus::Music, self.settings.bgm_volume);
            log::info!("Audio unmuted");
            // Music requested while muted never started
            if self.music_wanted && !self.is_music_playing() {
                self.play_bgm();
            }
        }
    }

    /// Flip mute, returning the new state
    pub fn toggle_mute(&mut self) -> bool {
        self.set_muted(!self.settings.muted);
        self.settings.muted
    }

    /// Clamped to [0, 1]; applied to the music bus right away unless muted
    pub fn set_bgm_volume(&mut self, volume: f32) {
        let Some(graph) = self.graph.as_deref_mut() else {
            return;
        };
        self.settings.bgm_volume = clamp_volume(volume);
        if !self.settings.muted {
            graph.set_bus_gain(Bus::Music, self.settings.bgm_volume);
        }
    }

    /// Clamped to [0, 1]; affects cues played from now on
    pub fn set_sfx_volume(&mut self, volume: f32) {
        if self.graph.is_none() {
            return;
        }
        self.settings.sfx_volume = clamp_volume(volume);
    }
}

impl SoundSink for AudioEngine {
    fn play_cue(&mut self, cue: Cue) {
        AudioEngine::play_cue(self, cue);
    }

    fn start_music(&mut self) {
        if self.graph.is_none() {
            return;
        }
        self.music_wanted = true;
        self.play_bgm();
    }

    fn stop_music(&mut self) {
        self.music_wanted = false;
        self.stop_bgm();
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::cell::RefCell;
    use std::collections::HashMap;
    use std::rc::Rc;

    use super::*;
    use crate::audio::synth::{BufferVoice, OscillatorVoice, ParamEvent};

    /// Everything a [`RecordingGraph`] saw, shared with the test
    #[derive(Debug, Default)]
    pub(crate) struct GraphLog {
        pub now: f64,
        pub bus_gains: HashMap<Bus, f32>,
        pub oscillators: Vec<(VoiceId, OscillatorVoice, Route)>,
        pub buffers: Vec<(VoiceId, BufferVoice, Route)>,
        pub automation: Vec<(VoiceId, Param, Vec<ParamEvent>)>,
        pub released: Vec<VoiceId>,
        pub resumed: usize,
        /// Fail every oscillator start after this many
        pub fail_after: Option<usize>,
    }

    pub(crate) struct RecordingGraph(pub Rc<RefCell<GraphLog>>);

    impl SynthGraph for RecordingGraph {
        fn current_time(&self) -> f64 {
            self.0.borrow().now
        }

        fn sample_rate(&self) -> f32 {
            8000.0
        }

        fn resume(&mut self) {
            self.0.borrow_mut().resumed += 1;
        }

        fn set_bus_gain(&mut self, bus: Bus, gain: f32) {
            self.0.borrow_mut().bus_gains.insert(bus, gain);
        }

        fn start_oscillator(
            &mut self,
            id: VoiceId,
            voice: &OscillatorVoice,
            route: Route,
        ) -> Result<(), AudioError> {
            let mut log = self.0.borrow_mut();
            if log.fail_after.is_some_and(|n| log.oscillators.len() >= n) {
                return Err(AudioError::Graph("oscillator refused".into()));
            }
            log.oscillators.push((id, voice.clone(), route));
            Ok(())
        }

        fn start_buffer(
            &mut self,
            id: VoiceId,
            voice: &BufferVoice,
            route: Route,
        ) -> Result<(), AudioError> {
            self.0.borrow_mut().buffers.push((id, voice.clone(), route));
            Ok(())
        }

        fn automate(
            &mut self,
            id: VoiceId,
            param: Param,
            events: &[ParamEvent],
        ) -> Result<(), AudioError> {
            self.0
                .borrow_mut()
                .automation
                .push((id, param, events.to_vec()));
            Ok(())
        }

        fn release(&mut self, id: VoiceId) {
            self.0.borrow_mut().released.push(id);
        }
    }

    pub(crate) fn engine() -> (AudioEngine, Rc<RefCell<GraphLog>>) {
        let log = Rc::new(RefCell::new(GraphLog::default()));
        let engine = AudioEngine::new(Box::new(RecordingGraph(log.clone())), 9);
        (engine, log)
    }

    fn advance(engine: &mut AudioEngine, log: &Rc<RefCell<GraphLog>>, to: f64) {
        log.borrow_mut().now = to;
        engine.service();
    }

    #[test]
    fn test_initial_mix() {
        let (engine, log) = engine();
        let log = log.borrow();
        assert_eq!(log.bus_gains[&Bus::Master], 1.0);
        assert_eq!(log.bus_gains[&Bus::Music], 0.3);
        assert!(engine.is_enabled());
        assert_eq!(engine.settings(), Settings::default());
    }

    #[test]
    fn test_play_cue_routes_to_master() {
        let (mut engine, log) = engine();
        engine.play_cue(Cue::Eat);
        engine.play_cue(Cue::LevelUp);
        let log = log.borrow();
        assert_eq!(log.buffers.len(), 1);
        assert_eq!(log.buffers[0].2, Route::Bus(Bus::Master));
        assert_eq!(log.buffers[0].1.gain, 0.5);
        assert_eq!(log.oscillators.len(), 4);
        assert!(log
            .oscillators
            .iter()
            .all(|(_, _, r)| *r == Route::Bus(Bus::Master)));
        assert_eq!(engine.active_voices(), 5);
    }

    #[test]
    fn test_cues_released_after_they_end() {
        let (mut engine, log) = engine();
        engine.play_cue(Cue::GameOver);
        engine.play_cue(Cue::Click);
        assert_eq!(engine.active_voices(), 4);
        advance(&mut engine, &log, 0.5);
        // Click ended at 0.1s, game over runs to 2s
        assert_eq!(engine.active_voices(), 3);
        advance(&mut engine, &log, 2.0);
        assert_eq!(engine.active_voices(), 0);
        assert_eq!(log.borrow().released.len(), 4);
    }

    #[test]
    fn test_unknown_cue_name_is_ignored() {
        let (mut engine, log) = engine();
        engine.play_cue_named("splash");
        engine.play_cue_named("click");
        let log = log.borrow();
        assert_eq!(log.buffers.len(), 1);
        assert!(log.oscillators.is_empty());
    }

    #[test]
    fn test_bgm_starts_chord_and_modulator() {
        let (mut engine, log) = engine();
        engine.play_bgm();
        let MusicState::Playing {
            tones, modulator, ..
        } = engine.music_state().clone()
        else {
            panic!("music should be playing");
        };
        assert_eq!(tones.len(), 4);

        let log = log.borrow();
        assert_eq!(log.oscillators.len(), 5);
        for (i, (id, voice, route)) in log.oscillators[..4].iter().enumerate() {
            assert_eq!(*id, tones[i]);
            assert_eq!(*route, Route::Bus(Bus::Music));
            assert_eq!(voice.stop, None);
            assert_eq!(
                voice.gain_events.last(),
                Some(&ParamEvent::LinearRamp {
                    value: synth::BGM_TONE_LEVEL,
                    until: 1.0
                })
            );
        }
        let (id, lfo, route) = &log.oscillators[4];
        assert_eq!(*id, modulator);
        assert_eq!(*route, Route::Modulate(tones[0]));
        assert_eq!(lfo.frequency, synth::BGM_LFO_HZ);
        assert_eq!(engine.pending_timers(), 1);
    }

    #[test]
    fn test_bgm_idempotent_while_playing() {
        let (mut engine, log) = engine();
        engine.play_bgm();
        engine.play_bgm();
        assert_eq!(log.borrow().oscillators.len(), 5);
        assert_eq!(engine.pending_timers(), 1);
    }

    #[test]
    fn test_pattern_change_every_eight_seconds() {
        let (mut engine, log) = engine();
        engine.play_bgm();
        let MusicState::Playing { tones, .. } = engine.music_state().clone() else {
            panic!("music should be playing");
        };

        advance(&mut engine, &log, 7.9);
        assert!(log.borrow().automation.is_empty());

        advance(&mut engine, &log, 8.0);
        {
            let log = log.borrow();
            assert_eq!(log.automation.len(), 1);
            let (id, param, events) = &log.automation[0];
            assert!(tones.contains(id));
            assert_eq!(*param, Param::Frequency);
            assert_eq!(events[0], ParamEvent::HoldCurrent { at: 8.0 });
            let ParamEvent::LinearRamp { value, until } = events[1] else {
                panic!("glide should ramp");
            };
            assert_eq!(until, 10.0);
            let scale: Vec<f32> = synth::chord(synth::BGM_BASE_HZ, &synth::BGM_SCALE);
            assert!(scale.contains(&value));
            assert_eq!(engine.voice_frequency(*id), Some(value));
        }

        advance(&mut engine, &log, 16.0);
        assert_eq!(log.borrow().automation.len(), 2);
        assert_eq!(engine.pending_timers(), 1);
    }

    #[test]
    fn test_stop_bgm_fades_then_releases() {
        let (mut engine, log) = engine();
        log.borrow_mut().now = 3.0;
        engine.play_bgm();
        engine.stop_bgm();
        assert_eq!(*engine.music_state(), MusicState::Stopped);

        {
            let log = log.borrow();
            assert_eq!(log.automation.len(), 5);
            for (_, param, events) in &log.automation {
                assert_eq!(*param, Param::Gain);
                assert_eq!(
                    events,
                    &vec![
                        ParamEvent::HoldCurrent { at: 3.0 },
                        ParamEvent::LinearRamp {
                            value: 0.0,
                            until: 3.5
                        }
                    ]
                );
            }
            assert!(log.released.is_empty());
        }
        // Pattern timer cancelled, five releases pending
        assert_eq!(engine.pending_timers(), 5);

        advance(&mut engine, &log, 3.4);
        assert!(log.borrow().released.is_empty());
        advance(&mut engine, &log, 3.5);
        assert_eq!(log.borrow().released.len(), 5);
        assert_eq!(engine.active_voices(), 0);
        assert_eq!(engine.pending_timers(), 0);

        // Well past the old pattern-change time nothing touches released voices
        advance(&mut engine, &log, 20.0);
        assert_eq!(log.borrow().automation.len(), 5);
    }

    #[test]
    fn test_stop_then_restart() {
        let (mut engine, log) = engine();
        engine.play_bgm();
        engine.stop_bgm();
        engine.play_bgm();
        assert!(engine.is_music_playing());
        assert_eq!(log.borrow().oscillators.len(), 10);
        // Old voices still fading alongside the new pool
        assert_eq!(engine.active_voices(), 10);
        advance(&mut engine, &log, 0.5);
        assert_eq!(engine.active_voices(), 5);
    }

    #[test]
    fn test_stop_when_stopped_is_noop() {
        let (mut engine, log) = engine();
        engine.stop_bgm();
        assert!(log.borrow().automation.is_empty());
        assert_eq!(engine.pending_timers(), 0);
    }

    #[test]
    fn test_failed_start_leaves_music_stopped() {
        let (mut engine, log) = engine();
        log.borrow_mut().fail_after = Some(2);
        engine.play_bgm();
        assert_eq!(*engine.music_state(), MusicState::Stopped);
        assert_eq!(engine.active_voices(), 0);
        assert_eq!(log.borrow().released.len(), 2);
        assert_eq!(engine.pending_timers(), 0);
    }

    #[test]
    fn test_mute_round_trip_keeps_mix() {
        let (mut engine, log) = engine();
        engine.set_bgm_volume(0.6);
        engine.set_sfx_volume(0.8);
        engine.play_bgm();
        let voices = engine.active_voices();

        engine.set_muted(true);
        assert_eq!(log.borrow().bus_gains[&Bus::Master], 0.0);
        assert_eq!(engine.active_voices(), voices);
        assert!(engine.is_music_playing());

        engine.set_muted(false);
        let log = log.borrow();
        assert_eq!(log.bus_gains[&Bus::Master], 1.0);
        assert_eq!(log.bus_gains[&Bus::Music], 0.6);
        assert_eq!(engine.bgm_volume(), 0.6);
        assert_eq!(engine.sfx_volume(), 0.8);
        // Nothing was replayed
        assert_eq!(log.oscillators.len(), 5);
    }

    #[test]
    fn test_muted_cues_are_silent() {
        let (mut engine, log) = engine();
        engine.set_muted(true);
        engine.play_cue(Cue::Eat);
        engine.play_bgm();
        let log = log.borrow();
        assert!(log.buffers.is_empty());
        assert!(log.oscillators.is_empty());
    }

    #[test]
    fn test_unmute_starts_wanted_music() {
        let (mut engine, log) = engine();
        engine.set_muted(true);
        engine.start_music();
        assert!(!engine.is_music_playing());
        engine.toggle_mute();
        assert!(engine.is_music_playing());
        assert_eq!(log.borrow().oscillators.len(), 5);

        // After the session ends un-muting does not bring music back
        engine.stop_music();
        engine.toggle_mute();
        engine.toggle_mute();
        assert!(!engine.is_music_playing());
    }

    #[test]
    fn test_volume_clamping() {
        let (mut engine, log) = engine();
        engine.set_bgm_volume(1.7);
        assert_eq!(engine.bgm_volume(), 1.0);
        engine.set_sfx_volume(-3.0);
        assert_eq!(engine.sfx_volume(), 0.0);
        engine.set_bgm_volume(f32::NAN);
        assert_eq!(engine.bgm_volume(), 0.0);
        assert_eq!(log.borrow().bus_gains[&Bus::Music], 0.0);
    }

    #[test]
    fn test_bgm_volume_deferred_while_muted() {
        let (mut engine, log) = engine();
        engine.set_muted(true);
        engine.set_bgm_volume(0.9);
        assert_eq!(log.borrow().bus_gains[&Bus::Music], 0.3);
        engine.set_muted(false);
        assert_eq!(log.borrow().bus_gains[&Bus::Music], 0.9);
    }

    #[test]
    fn test_apply_settings() {
        let (mut engine, log) = engine();
        engine.apply_settings(Settings {
            muted: true,
            bgm_volume: 0.2,
            sfx_volume: 3.0,
        });
        assert_eq!(
            engine.settings(),
            Settings {
                muted: true,
                bgm_volume: 0.2,
                sfx_volume: 1.0
            }
        );
        assert_eq!(log.borrow().bus_gains[&Bus::Master], 0.0);
    }

    #[test]
    fn test_resume_forwards() {
        let (mut engine, log) = engine();
        engine.resume();
        assert_eq!(log.borrow().resumed, 1);
    }

    #[test]
    fn test_disabled_engine_is_inert() {
        let mut engine =
            AudioEngine::from_backend(Err(AudioError::Unavailable("no output".into())), 1);
        assert!(!engine.is_enabled());
        engine.play_cue(Cue::Eat);
        engine.play_cue_named("nope");
        engine.start_music();
        engine.play_bgm();
        engine.set_muted(true);
        engine.set_bgm_volume(0.9);
        engine.set_sfx_volume(0.9);
        engine.resume();
        engine.service();
        engine.stop_music();
        assert!(!engine.is_music_playing());
        assert_eq!(engine.active_voices(), 0);
        assert_eq!(engine.settings(), Settings::default());
    }
}
