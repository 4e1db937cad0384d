//! Fish Frenzy entry point
//!
//! Handles platform-specific initialization and runs the game loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;

    use glam::Vec2;
    use wasm_bindgen::prelude::*;
    use web_sys::{
        CanvasRenderingContext2d, Document, Element, HtmlCanvasElement, HtmlInputElement,
        MouseEvent,
    };

    use fish_frenzy::audio::{AudioEngine, Cue, SynthGraph, WebAudioGraph};
    use fish_frenzy::leaderboard::{self, Leaderboard};
    use fish_frenzy::platform::{
        BoundsProvider, FrameScheduler, PointerSource, ScoreSink, SessionEndSink,
    };
    use fish_frenzy::renderer::CanvasSurface;
    use fish_frenzy::sim::Bounds;
    use fish_frenzy::{Game, Settings, Tuning};

    /// How often audio timers are serviced (ms)
    const AUDIO_SERVICE_MS: i32 = 50;

    fn document() -> Option<Document> {
        web_sys::window()?.document()
    }

    fn by_id(id: &str) -> Option<Element> {
        document()?.get_element_by_id(id)
    }

    fn set_text(id: &str, text: &str) {
        if let Some(el) = by_id(id) {
            el.set_text_content(Some(text));
        }
    }

    fn set_visible(id: &str, visible: bool) {
        if let Some(el) = by_id(id) {
            let classes = el.class_list();
            let _ = if visible {
                classes.remove_1("hidden")
            } else {
                classes.add_1("hidden")
            };
        }
    }

    fn input(id: &str) -> Option<HtmlInputElement> {
        by_id(id)?.dyn_into().ok()
    }

    fn now_ms() -> f64 {
        web_sys::window()
            .and_then(|w| w.performance())
            .map_or(0.0, |p| p.now())
    }

    /// DOM-backed implementation of the game's host ports
    struct DomHost {
        canvas: HtmlCanvasElement,
        pointer: Option<Vec2>,
        frame_requested: bool,
        /// An animation frame callback is already queued
        raf_pending: bool,
        /// Start screen visible; drives the idle animation
        idle_screen: bool,
    }

    impl PointerSource for DomHost {
        fn target(&self) -> Option<Vec2> {
            self.pointer
        }
    }

    impl BoundsProvider for DomHost {
        fn bounds(&self) -> Bounds {
            Bounds::new(self.canvas.width() as f32, self.canvas.height() as f32)
        }
    }

    impl ScoreSink for DomHost {
        fn on_score_changed(&mut self, score: u64) {
            set_text("score", &score.to_string());
        }

        fn on_level_changed(&mut self, level: u32) {
            set_text("level", &level.to_string());
        }
    }

    impl SessionEndSink for DomHost {
        fn on_game_over(&mut self, final_score: u64) {
            set_text("finalScore", &final_score.to_string());
            if let Some(name) = input("playerName") {
                name.set_value("");
            }
            set_visible("gameOver", true);
        }
    }

    impl FrameScheduler for DomHost {
        fn request_frame(&mut self) {
            self.frame_requested = true;
        }
    }

    struct App {
        game: Game<AudioEngine>,
        host: DomHost,
        surface: CanvasSurface,
        leaderboard: Leaderboard,
        /// Entry id of the most recent submission, highlighted in the table
        current_player: Option<String>,
    }

    impl App {
        fn start_session(&mut self) {
            self.host.idle_screen = false;
            set_visible("gameStart", false);
            set_visible("gameOver", false);
            set_visible("leaderboard", false);
            let now = now_ms();
            self.game.start_session(now, &mut self.host);
        }

        fn save_settings(&self) {
            self.game.sound().settings().save();
        }

        fn sync_audio_controls(&self) {
            let engine = self.game.sound();
            if let Some(btn) = by_id("muteButton") {
                btn.set_text_content(Some(if engine.is_muted() { "🔇" } else { "🔊" }));
            }
            for (id, label, volume) in [
                ("bgmVolume", "bgmVolumeValue", engine.bgm_volume()),
                ("sfxVolume", "sfxVolumeValue", engine.sfx_volume()),
            ] {
                let percent = (volume * 100.0).round();
                if let Some(slider) = input(id) {
                    slider.set_value(&percent.to_string());
                }
                set_text(label, &format!("{percent}%"));
            }
        }

        fn render_leaderboard(&self) {
            let Some(body) = by_id("leaderboardBody") else {
                log::error!("Leaderboard table missing");
                return;
            };
            let rows: String = self
                .leaderboard
                .entries
                .iter()
                .enumerate()
                .map(|(i, e)| {
                    let class = if self.current_player.as_deref() == Some(e.id.as_str()) {
                        " class=\"current-player\""
                    } else {
                        ""
                    };
                    format!(
                        "<tr{class}><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
                        i + 1,
                        escape_html(&e.name),
                        e.score,
                        escape_html(&e.date)
                    )
                })
                .collect();
            body.set_inner_html(&rows);
        }
    }

    fn escape_html(text: &str) -> String {
        text.chars()
            .map(|c| match c {
                '<' => "&lt;".to_string(),
                '>' => "&gt;".to_string(),
                '&' => "&amp;".to_string(),
                '"' => "&quot;".to_string(),
                c => c.to_string(),
            })
            .collect()
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        if console_log::init_with_level(log::Level::Info).is_err() {
            web_sys::console::warn_1(&"Logger already initialized".into());
        }

        log::info!("Fish Frenzy starting...");

        let Some(canvas) = by_id("gameCanvas").and_then(|el| el.dyn_into::<HtmlCanvasElement>().ok())
        else {
            log::error!("Game canvas not found");
            return;
        };
        let Some(ctx) = canvas
            .get_context("2d")
            .ok()
            .flatten()
            .and_then(|c| c.dyn_into::<CanvasRenderingContext2d>().ok())
        else {
            log::error!("2D canvas context unavailable");
            return;
        };
        resize_canvas(&canvas);

        let seed = js_sys::Date::now() as u64;
        let backend = WebAudioGraph::new().map(|g| Box::new(g) as Box<dyn SynthGraph>);
        let mut engine = AudioEngine::from_backend(backend, seed);
        engine.apply_settings(Settings::load());

        let app = Rc::new(RefCell::new(App {
            game: Game::new(engine, Tuning::default(), seed),
            host: DomHost {
                canvas: canvas.clone(),
                pointer: None,
                frame_requested: true,
                raf_pending: false,
                idle_screen: true,
            },
            surface: CanvasSurface::new(ctx),
            leaderboard: Leaderboard::load(),
            current_player: None,
        }));
        app.borrow().sync_audio_controls();

        log::info!("Game initialized with seed: {}", seed);

        setup_canvas_handlers(&canvas, app.clone());
        setup_buttons(app.clone());
        setup_volume_sliders(app.clone());
        setup_audio_service(app.clone());

        // Idle animation until the player presses start
        schedule_frame(&app);

        log::info!("Fish Frenzy running!");
    }

    fn resize_canvas(canvas: &HtmlCanvasElement) {
        if let Some(parent) = canvas.parent_element() {
            canvas.set_width(parent.client_width().max(1) as u32);
            canvas.set_height(parent.client_height().max(1) as u32);
        }
    }

    fn setup_canvas_handlers(canvas: &HtmlCanvasElement, app: Rc<RefCell<App>>) {
        // Pointer position in canvas pixels
        {
            let app = app.clone();
            let target = canvas.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                let rect = target.get_bounding_client_rect();
                if rect.width() <= 0.0 || rect.height() <= 0.0 {
                    return;
                }
                let scale_x = f64::from(target.width()) / rect.width();
                let scale_y = f64::from(target.height()) / rect.height();
                let x = (f64::from(event.client_x()) - rect.left()) * scale_x;
                let y = (f64::from(event.client_y()) - rect.top()) * scale_y;
                app.borrow_mut().host.pointer = Some(Vec2::new(x as f32, y as f32));
            });
            let _ = canvas
                .add_event_listener_with_callback("mousemove", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Canvas follows its container
        if let Some(window) = web_sys::window() {
            let target = canvas.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                resize_canvas(&target);
            });
            let _ = window.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn on_click(id: &str, app: Rc<RefCell<App>>, handler: impl Fn(&mut App) + 'static) {
        let Some(el) = by_id(id) else {
            log::warn!("Button #{id} not found");
            return;
        };
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            handler(&mut app.borrow_mut());
            schedule_frame(&app);
        });
        let _ = el.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    /// Button press: wake the audio output, then the click cue
    fn click(app: &mut App) {
        let engine = app.game.sound_mut();
        engine.resume();
        engine.play_cue(Cue::Click);
    }

    fn setup_buttons(app: Rc<RefCell<App>>) {
        for id in ["startButton", "restartButton"] {
            on_click(id, app.clone(), |app| {
                click(app);
                app.start_session();
            });
        }

        for id in ["showLeaderboardButton", "viewLeaderboardButton"] {
            on_click(id, app.clone(), |app| {
                click(app);
                app.render_leaderboard();
                set_visible("gameStart", false);
                set_visible("gameOver", false);
                set_visible("leaderboard", true);
            });
        }

        on_click("backButton", app.clone(), |app| {
            click(app);
            set_visible("leaderboard", false);
            set_visible("gameStart", true);
            app.host.idle_screen = true;
            app.host.request_frame();
        });

        on_click("saveScoreButton", app.clone(), |app| {
            click(app);
            let name = input("playerName").map(|i| i.value()).unwrap_or_default();
            let id = (js_sys::Date::now() as u64).to_string();
            let score = app.game.score();
            app.leaderboard
                .submit(&name, score, id.clone(), leaderboard::local_date_now());
            app.leaderboard.save();
            app.current_player = Some(id);
            app.render_leaderboard();
            set_visible("gameOver", false);
            set_visible("leaderboard", true);
        });

        on_click("clearLeaderboardButton", app.clone(), |app| {
            click(app);
            let confirmed = web_sys::window()
                .and_then(|w| w.confirm_with_message("Clear all leaderboard entries?").ok())
                .unwrap_or(false);
            if confirmed {
                app.leaderboard.clear();
                app.leaderboard.save();
                app.current_player = None;
                app.render_leaderboard();
            }
        });

        on_click("muteButton", app, |app| {
            let engine = app.game.sound_mut();
            engine.resume();
            engine.toggle_mute();
            app.save_settings();
            app.sync_audio_controls();
        });
    }

    fn setup_volume_sliders(app: Rc<RefCell<App>>) {
        for id in ["bgmVolume", "sfxVolume"] {
            let Some(slider) = input(id) else {
                continue;
            };
            let app = app.clone();
            let source = slider.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                let volume = source.value().parse::<f32>().unwrap_or(0.0) / 100.0;
                let mut app = app.borrow_mut();
                let engine = app.game.sound_mut();
                if id == "bgmVolume" {
                    engine.set_bgm_volume(volume);
                } else {
                    engine.set_sfx_volume(volume);
                }
                app.save_settings();
                app.sync_audio_controls();
            });
            let _ = slider.add_event_listener_with_callback("input", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    /// Pattern changes and fade-out releases run off this interval, never
    /// from inside a frame
    fn setup_audio_service(app: Rc<RefCell<App>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::<dyn FnMut()>::new(move || {
            app.borrow_mut().game.sound_mut().service();
        });
        let _ = window.set_interval_with_callback_and_timeout_and_arguments_0(
            closure.as_ref().unchecked_ref(),
            AUDIO_SERVICE_MS,
        );
        closure.forget();
    }

    fn schedule_frame(app: &Rc<RefCell<App>>) {
        {
            let mut a = app.borrow_mut();
            if !a.host.frame_requested || a.host.raf_pending {
                return;
            }
            a.host.frame_requested = false;
            a.host.raf_pending = true;
        }
        let Some(window) = web_sys::window() else {
            return;
        };
        let app = app.clone();
        let closure = Closure::once(move |time: f64| {
            game_loop(app, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(app: Rc<RefCell<App>>, time: f64) {
        {
            let mut a = app.borrow_mut();
            let App {
                game,
                host,
                surface,
                ..
            } = &mut *a;
            host.raf_pending = false;
            if game.is_running() {
                game.advance_frame(time, host, surface);
            } else if host.idle_screen {
                game.advance_idle_frame(time, host, surface);
            }
        }

        schedule_frame(&app);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    wasm_game::run();
}

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use glam::Vec2;

    use fish_frenzy::audio::AudioEngine;
    use fish_frenzy::platform::{
        BoundsProvider, FrameScheduler, PointerSource, ScoreSink, SessionEndSink,
    };
    use fish_frenzy::renderer::{Color, Surface};
    use fish_frenzy::sim::{Bounds, SessionState};
    use fish_frenzy::{Game, Tuning};

    const FRAME_MS: f64 = 1000.0 / 60.0;
    const MAX_FRAMES: u32 = 60 * 180;

    /// Ports backed by plain fields
    struct ScriptedHost {
        bounds: Bounds,
        pointer: Option<Vec2>,
        frame_requested: bool,
        game_over: Option<u64>,
    }

    impl PointerSource for ScriptedHost {
        fn target(&self) -> Option<Vec2> {
            self.pointer
        }
    }

    impl BoundsProvider for ScriptedHost {
        fn bounds(&self) -> Bounds {
            self.bounds
        }
    }

    impl ScoreSink for ScriptedHost {
        fn on_score_changed(&mut self, score: u64) {
            log::debug!("score {score}");
        }

        fn on_level_changed(&mut self, level: u32) {
            log::info!("Reached level {level}");
        }
    }

    impl SessionEndSink for ScriptedHost {
        fn on_game_over(&mut self, final_score: u64) {
            self.game_over = Some(final_score);
        }
    }

    impl FrameScheduler for ScriptedHost {
        fn request_frame(&mut self) {
            self.frame_requested = true;
        }
    }

    /// Discards all drawing
    struct NullSurface;

    impl Surface for NullSurface {
        fn clear(&mut self, _bounds: Bounds) {}
        fn fill_vertical_gradient(&mut self, _bounds: Bounds, _top: Color, _bottom: Color) {}
        fn fill_ellipse(&mut self, _c: Vec2, _r: Vec2, _rot: f32, _color: Color) {}
        fn fill_circle(&mut self, _c: Vec2, _r: f32, _color: Color) {}
        fn fill_polygon(&mut self, _points: &[Vec2], _color: Color) {}
        fn stroke_polyline(&mut self, _points: &[Vec2], _width: f32, _color: Color) {}
    }

    /// Chase the nearest edible rival, otherwise drift back to the centre
    fn autopilot(state: &SessionState, bounds: Bounds, eat_ratio: f32) -> Vec2 {
        let player = &state.player;
        state
            .rivals
            .iter()
            .filter(|r| player.size > r.size * eat_ratio)
            .min_by(|a, b| {
                a.pos
                    .distance_squared(player.pos)
                    .total_cmp(&b.pos.distance_squared(player.pos))
            })
            .map_or(bounds.center(), |r| r.pos)
    }

    pub fn run(tuning: Tuning, seed: u64) {
        let mut game = Game::new(AudioEngine::disabled(), tuning, seed);
        let mut host = ScriptedHost {
            bounds: Bounds::new(800.0, 600.0),
            pointer: None,
            frame_requested: false,
            game_over: None,
        };
        let mut surface = NullSurface;

        game.start_session(0.0, &mut host);
        let mut frames = 0;
        let mut now = 0.0;
        while host.frame_requested && frames < MAX_FRAMES {
            host.frame_requested = false;
            now += FRAME_MS;
            frames += 1;
            host.pointer = game
                .session()
                .map(|s| autopilot(s, host.bounds, game.tuning().eat_ratio));
            game.advance_frame(now, &mut host, &mut surface);
        }

        let size = game.session().map_or(0.0, |s| s.player.size);
        match host.game_over {
            Some(score) => println!("Eaten after {frames} frames: score {score}, level {}", game.level()),
            None => println!(
                "Survived {frames} frames: score {}, level {}, size {size:.1}",
                game.score(),
                game.level()
            ),
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Fish Frenzy (native) starting...");
    log::info!("Native mode runs a headless autopilot session - use the wasm build to play");

    let mut args = std::env::args().skip(1);
    let tuning = match args.next() {
        Some(path) => match std::fs::read_to_string(&path)
            .map_err(|e| e.to_string())
            .and_then(|json| fish_frenzy::Tuning::from_json(&json).map_err(|e| e.to_string()))
        {
            Ok(tuning) => tuning,
            Err(e) => {
                log::error!("Could not load tuning from {path}: {e}");
                fish_frenzy::Tuning::default()
            }
        },
        None => fish_frenzy::Tuning::default(),
    };
    let seed = args.next().and_then(|s| s.parse().ok()).unwrap_or(42);

    headless::run(tuning, seed);
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}
