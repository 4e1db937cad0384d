//! Frame loop orchestration
//!
//! [`Game`] owns the session and ties one simulation step to the host ports,
//! the sound sink and the drawing surface. Hosts call [`Game::advance_frame`]
//! from their display-refresh callback; the game asks for the next frame only
//! while the session is running.

use crate::audio::{Cue, SoundSink};
use crate::platform::{BoundsProvider, FrameScheduler, Host};
use crate::renderer::{Surface, draw_idle_frame, draw_session};
use crate::sim::{FrameInput, GameEvent, SessionState, SpawnDirector, tick};
use crate::tuning::Tuning;

struct Session {
    state: SessionState,
    director: SpawnDirector,
}

pub struct Game<S: SoundSink> {
    tuning: Tuning,
    sound: S,
    seed: u64,
    sessions_started: u64,
    session: Option<Session>,
}

impl<S: SoundSink> Game<S> {
    /// Session `n` is seeded with `seed + n`
    pub fn new(sound: S, tuning: Tuning, seed: u64) -> Self {
        Self {
            tuning,
            sound,
            seed,
            sessions_started: 0,
            session: None,
        }
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    pub fn sound(&self) -> &S {
        &self.sound
    }

    pub fn sound_mut(&mut self) -> &mut S {
        &mut self.sound
    }

    pub fn session(&self) -> Option<&SessionState> {
        self.session.as_ref().map(|s| &s.state)
    }

    pub fn session_mut(&mut self) -> Option<&mut SessionState> {
        self.session.as_mut().map(|s| &mut s.state)
    }

    pub fn is_running(&self) -> bool {
        self.session().is_some_and(|s| s.running)
    }

    pub fn score(&self) -> u64 {
        self.session().map_or(0, |s| s.score)
    }

    pub fn level(&self) -> u32 {
        self.session().map_or(1, |s| s.level)
    }

    /// Begin a fresh session, replacing any previous one, and request its
    /// first frame
    pub fn start_session<H: Host + ?Sized>(&mut self, now: f64, host: &mut H) {
        let seed = self.seed.wrapping_add(self.sessions_started);
        self.sessions_started += 1;

        let mut director = SpawnDirector::new(seed);
        let state = SessionState::new(host.bounds(), now, &self.tuning, &mut director);
        host.on_score_changed(state.score);
        host.on_level_changed(state.level);
        self.session = Some(Session { state, director });

        self.sound.start_music();
        log::info!("Session {} started (seed {seed})", self.sessions_started);
        host.request_frame();
    }

    /// Run one frame: simulate, dispatch events, draw, reschedule.
    /// A failing frame body is logged and skipped; scheduling carries on.
    pub fn advance_frame<H, D>(&mut self, now: f64, host: &mut H, surface: &mut D)
    where
        H: Host + ?Sized,
        D: Surface + ?Sized,
    {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        if !session.state.running {
            return;
        }

        let bounds = host.bounds();
        let input = FrameInput {
            now,
            target: host.target(),
            bounds,
        };
        match tick(&mut session.state, &mut session.director, &input, &self.tuning) {
            Ok(events) => {
                for event in events {
                    dispatch(&mut self.sound, host, event);
                }
                draw_session(surface, &session.state, bounds);
            }
            Err(e) => log::error!("Frame skipped: {e}"),
        }

        if session.state.running {
            host.request_frame();
        }
    }

    /// Start-screen frame; keeps itself scheduled until a session runs
    pub fn advance_idle_frame<H, D>(&self, now: f64, host: &mut H, surface: &mut D)
    where
        H: BoundsProvider + FrameScheduler + ?Sized,
        D: Surface + ?Sized,
    {
        if self.is_running() {
            return;
        }
        let bounds = host.bounds();
        if bounds.is_usable() {
            draw_idle_frame(surface, bounds, now / 1000.0);
        }
        host.request_frame();
    }
}

fn dispatch<S, H>(sound: &mut S, host: &mut H, event: GameEvent)
where
    S: SoundSink + ?Sized,
    H: Host + ?Sized,
{
    match event {
        GameEvent::RivalEaten { score, .. } => {
            sound.play_cue(Cue::Eat);
            host.on_score_changed(score);
        }
        GameEvent::LevelUp { level, spawn_rate } => {
            log::info!("Level {level} (spawn rate x{spawn_rate:.1})");
            host.on_level_changed(level);
            sound.play_cue(Cue::LevelUp);
        }
        GameEvent::PlayerEaten { final_score } => {
            log::info!("Game over with score {final_score}");
            sound.stop_music();
            sound.play_cue(Cue::GameOver);
            host.on_game_over(final_score);
        }
    }
}
