//! Trashfall entry point
//!
//! The wasm build runs the full game against a 2D canvas plus a handful of
//! DOM overlays; the native build runs a headless autopilot demo of the
//! simulation.
//!
//! Expected DOM (see index.html): a `#canvas` play area, `#hud` with
//! `#hud-score`/`#hud-fps` values, a `#home-screen` overlay with
//! `#start-btn`, a `#failure-prompt` overlay with `#resume-btn`/`#exit-btn`,
//! and a `#complete-prompt` overlay with `#final-score` and
//! `#complete-ok-btn`.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{
        CanvasRenderingContext2d, Document, HtmlCanvasElement, MouseEvent, TouchEvent,
    };

    use trashfall::app::{App, FailureChoice};
    use trashfall::audio::web::WebMusicPlayer;
    use trashfall::consts::*;
    use trashfall::pointer_to_catcher_x;
    use trashfall::settings::Settings;
    use trashfall::sim::TickInput;

    /// The run's single background track, bundled next to index.html
    const MUSIC_SRC: &str = "assets/track.mp3";

    /// Game instance holding all state
    struct Game {
        app: App,
        music_player: Option<WebMusicPlayer>,
        input: TickInput,
        accumulator: f32,
        last_time: f64,
        field: (f32, f32),
        // FPS tracking
        frame_times: [f64; 60],
        frame_index: usize,
        fps: u32,
    }

    impl Game {
        fn new(settings: Settings) -> Self {
            Self {
                app: App::new(settings),
                music_player: None,
                input: TickInput::default(),
                accumulator: 0.0,
                last_time: 0.0,
                field: (DEFAULT_FIELD_WIDTH, DEFAULT_FIELD_HEIGHT),
                frame_times: [0.0; 60],
                frame_index: 0,
                fps: 0,
            }
        }

        /// Execute a music command against the backend, if any
        fn apply_music(&mut self, cmd: Option<trashfall::audio::MusicCommand>) {
            if let (Some(cmd), Some(player)) = (cmd, self.music_player.as_mut()) {
                player.apply(cmd);
            }
        }

        /// Run fixed simulation ticks out of the frame-time accumulator.
        /// Returns true if this frame's ticks triggered the failure prompt.
        fn update(&mut self, dt: f32, time: f64) -> bool {
            let dt = dt.min(0.25);
            self.accumulator += dt;

            let mut failed = false;
            while self.accumulator >= TICK_DT {
                let input = self.input;
                let (events, cmd) = self.app.tick(&input);
                self.apply_music(cmd);
                if events.contains(&trashfall::sim::GameEvent::Failed) {
                    failed = true;
                }
                self.accumulator -= TICK_DT;
            }

            // Track frame times for the FPS readout
            self.frame_times[self.frame_index] = time;
            self.frame_index = (self.frame_index + 1) % 60;
            let oldest = self.frame_times[self.frame_index];
            if oldest > 0.0 {
                let elapsed = time - oldest;
                if elapsed > 0.0 {
                    self.fps = (60000.0 / elapsed).round() as u32;
                }
            }

            failed
        }

        /// Draw the field, catcher, and falling objects
        fn render(&self, ctx: &CanvasRenderingContext2d) {
            let (w, h) = self.field;
            ctx.set_fill_style_str("#000000");
            ctx.fill_rect(0.0, 0.0, w as f64, h as f64);

            let Some(session) = self.app.session() else {
                return;
            };

            ctx.set_fill_style_str("#006b80");
            let c = session.state.catcher.pos;
            ctx.fill_rect(
                c.x as f64,
                c.y as f64,
                CATCHER_SIZE as f64,
                CATCHER_SIZE as f64,
            );

            ctx.set_fill_style_str("#6a2aa5");
            for obj in &session.state.objects {
                ctx.fill_rect(
                    obj.pos.x as f64,
                    obj.pos.y as f64,
                    OBJECT_SIZE as f64,
                    OBJECT_SIZE as f64,
                );
            }
        }

        /// Update HUD elements in the DOM
        fn update_hud(&self, document: &Document) {
            if let Some(el) = document.get_element_by_id("hud-score") {
                let score = self.app.session().map(|s| s.state.score).unwrap_or(0);
                el.set_text_content(Some(&score.to_string()));
            }

            if let Some(el) = document.get_element_by_id("hud-fps") {
                if self.app.settings.show_fps {
                    el.set_text_content(Some(&self.fps.to_string()));
                } else {
                    el.set_text_content(Some(""));
                }
            }
        }
    }

    fn show(document: &Document, id: &str) {
        if let Some(el) = document.get_element_by_id(id) {
            let _ = el.set_attribute("class", "");
        }
    }

    fn hide(document: &Document, id: &str) {
        if let Some(el) = document.get_element_by_id(id) {
            let _ = el.set_attribute("class", "hidden");
        }
    }

    fn document() -> Document {
        web_sys::window()
            .expect("no window")
            .document()
            .expect("no document")
    }

    /// Leave the Game screen: release audio, hide game chrome, show the menu
    fn go_home(game: &mut Game, cmd: Option<trashfall::audio::MusicCommand>) {
        game.apply_music(cmd);
        game.music_player = None;
        game.input = TickInput::default();

        let document = document();
        hide(&document, "failure-prompt");
        hide(&document, "complete-prompt");
        hide(&document, "hud");
        show(&document, "home-screen");
    }

    /// Enter the Game screen: fresh run, fresh track
    fn start_run(game_rc: &Rc<RefCell<Game>>) {
        let document = document();
        let seed = js_sys::Date::now() as u64;

        let volume = {
            let mut game = game_rc.borrow_mut();
            let (w, h) = game.field;
            game.app.start_game(seed, w, h);
            game.app.settings.effective_music_volume()
        };

        // Attach listeners while no borrow is held: a failed element
        // creation reports back into the app immediately
        let player = WebMusicPlayer::new(MUSIC_SRC, volume);
        attach_track_listeners(&player, game_rc);
        game_rc.borrow_mut().music_player = Some(player);

        hide(&document, "home-screen");
        hide(&document, "failure-prompt");
        hide(&document, "complete-prompt");
        show(&document, "hud");
    }

    /// Wire loadability, natural end, and load failure of the track back
    /// into the app state machine
    fn attach_track_listeners(player: &WebMusicPlayer, game_rc: &Rc<RefCell<Game>>) {
        let Some(el) = player.element() else {
            // No element was created; the run plays silently
            game_rc.borrow_mut().app.music_load_failed();
            return;
        };

        {
            let game = game_rc.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                let mut g = game.borrow_mut();
                let cmd = g.app.music_loaded();
                g.apply_music(cmd);
            });
            let _ = el.add_event_listener_with_callback(
                "canplaythrough",
                closure.as_ref().unchecked_ref(),
            );
            closure.forget();
        }

        {
            let game = game_rc.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                let mut g = game.borrow_mut();
                if g.app.track_ended() {
                    let document = document();
                    let score = g.app.session().map(|s| s.state.score).unwrap_or(0);
                    if let Some(el) = document.get_element_by_id("final-score") {
                        el.set_text_content(Some(&score.to_string()));
                    }
                    show(&document, "complete-prompt");
                }
            });
            let _ = el.add_event_listener_with_callback("ended", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        {
            let game = game_rc.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                game.borrow_mut().app.music_load_failed();
            });
            let _ = el.add_event_listener_with_callback("error", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        log::info!("Trashfall starting...");

        let document = document();
        let canvas: HtmlCanvasElement = document
            .get_element_by_id("canvas")
            .expect("no canvas")
            .dyn_into()
            .expect("not a canvas");

        // Size the backing store to the layout size; the client rect is the
        // playing field
        let width = canvas.client_width().max(1) as u32;
        let height = canvas.client_height().max(1) as u32;
        canvas.set_width(width);
        canvas.set_height(height);

        let ctx: CanvasRenderingContext2d = canvas
            .get_context("2d")
            .ok()
            .flatten()
            .expect("no 2d context")
            .dyn_into()
            .expect("not a 2d context");

        let settings = Settings::load();
        let game = Rc::new(RefCell::new(Game::new(settings)));
        game.borrow_mut().field = (width as f32, height as f32);

        setup_input_handlers(&canvas, game.clone());
        setup_buttons(game.clone());
        setup_auto_pause(game.clone());

        show(&document, "home-screen");
        hide(&document, "hud");

        request_animation_frame(game, Rc::new(ctx));

        log::info!("Trashfall running!");
    }

    fn setup_input_handlers(canvas: &HtmlCanvasElement, game: Rc<RefCell<Game>>) {
        // Mouse drag
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                let mut g = game.borrow_mut();
                g.input.target_x = Some(pointer_to_catcher_x(event.offset_x() as f32));
            });
            let _ = canvas
                .add_event_listener_with_callback("mousemove", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Touch drag - only the horizontal coordinate is consumed
        {
            let game = game.clone();
            let canvas_clone = canvas.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                event.prevent_default();
                if let Some(touch) = event.touches().get(0) {
                    let rect = canvas_clone.get_bounding_client_rect();
                    let x = touch.client_x() as f32 - rect.left() as f32;
                    game.borrow_mut().input.target_x = Some(pointer_to_catcher_x(x));
                }
            });
            let _ = canvas
                .add_event_listener_with_callback("touchmove", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Keyboard: debug toggles
        {
            let window = web_sys::window().unwrap();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::KeyboardEvent| {
                let mut g = game.borrow_mut();
                match event.key().as_str() {
                    "i" | "I" => {
                        g.input.autopilot = !g.input.autopilot;
                        log::info!("Autopilot: {}", g.input.autopilot);
                    }
                    "f" | "F" => {
                        g.app.settings.show_fps = !g.app.settings.show_fps;
                        g.app.settings.save();
                    }
                    "m" | "M" => {
                        g.app.settings.muted = !g.app.settings.muted;
                        g.app.settings.save();
                        let volume = g.app.settings.effective_music_volume();
                        if let Some(player) = g.music_player.as_ref() {
                            player.set_volume(volume);
                        }
                    }
                    _ => {}
                }
            });
            let _ = window
                .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_buttons(game: Rc<RefCell<Game>>) {
        let doc = document();

        // Home screen: start a run
        if let Some(btn) = doc.get_element_by_id("start-btn") {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                start_run(&game);
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Failure prompt: continue
        if let Some(btn) = doc.get_element_by_id("resume-btn") {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                let mut g = game.borrow_mut();
                let cmd = g.app.failure_choice(FailureChoice::Resume);
                g.apply_music(cmd);
                hide(&document(), "failure-prompt");
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Failure prompt: back to the menu
        if let Some(btn) = doc.get_element_by_id("exit-btn") {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                let mut g = game.borrow_mut();
                let cmd = g.app.failure_choice(FailureChoice::Exit);
                go_home(&mut g, cmd);
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Completion prompt: acknowledge and return to the menu
        if let Some(btn) = doc.get_element_by_id("complete-ok-btn") {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                let mut g = game.borrow_mut();
                let cmd = g.app.completion_ack();
                go_home(&mut g, cmd);
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_auto_pause(game: Rc<RefCell<Game>>) {
        let window = web_sys::window().unwrap();
        let document = document();

        // Visibility change (tab switch, minimize)
        {
            let game = game.clone();
            let document_clone = document.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                let mut g = game.borrow_mut();
                let cmd = if document_clone.visibility_state() == web_sys::VisibilityState::Hidden
                {
                    g.app.blur()
                } else {
                    g.app.focus()
                };
                g.apply_music(cmd);
            });
            let _ = document.add_event_listener_with_callback(
                "visibilitychange",
                closure.as_ref().unchecked_ref(),
            );
            closure.forget();
        }

        // Window blur/focus (click outside)
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::FocusEvent| {
                let mut g = game.borrow_mut();
                let cmd = g.app.blur();
                g.apply_music(cmd);
            });
            let _ =
                window.add_event_listener_with_callback("blur", closure.as_ref().unchecked_ref());
            closure.forget();
        }
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::FocusEvent| {
                let mut g = game.borrow_mut();
                let cmd = g.app.focus();
                g.apply_music(cmd);
            });
            let _ =
                window.add_event_listener_with_callback("focus", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>, ctx: Rc<CanvasRenderingContext2d>) {
        let window = web_sys::window().unwrap();
        let closure = Closure::once(move |time: f64| {
            game_loop(game, ctx, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Game>>, ctx: Rc<CanvasRenderingContext2d>, time: f64) {
        {
            let mut g = game.borrow_mut();

            let dt = if g.last_time > 0.0 {
                ((time - g.last_time) / 1000.0) as f32
            } else {
                TICK_DT
            };
            g.last_time = time;

            if g.update(dt, time) {
                show(&document(), "failure-prompt");
            }
            g.render(&ctx);
            g.update_hud(&document());
        }

        request_animation_frame(game, ctx);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    wasm_game::run();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

/// Headless autopilot demo: runs the sim at full speed and reports the score.
#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use std::time::{SystemTime, UNIX_EPOCH};

    use trashfall::app::{App, FailureChoice};
    use trashfall::consts::*;
    use trashfall::settings::Settings;
    use trashfall::sim::{GameEvent, TickInput};

    env_logger::init();
    log::info!("Trashfall (native) starting headless demo...");

    let seed = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0);

    let mut app = App::new(Settings::load());
    app.start_game(seed, DEFAULT_FIELD_WIDTH, DEFAULT_FIELD_HEIGHT);

    let input = TickInput {
        autopilot: true,
        ..Default::default()
    };

    // Two simulated minutes, continuing through the first failure
    let mut resumed = false;
    for _ in 0..(2 * 60 * 1000 / TICK_MS) {
        let (events, _) = app.tick(&input);
        if events.contains(&GameEvent::Failed) {
            if resumed {
                log::info!("Second failure, exiting demo");
                break;
            }
            log::info!("Failure prompt: choosing to continue");
            app.failure_choice(FailureChoice::Resume);
            resumed = true;
        }
    }

    let score = app.session().map(|s| s.state.score).unwrap_or(0);
    println!("Demo over - score {score}");
    app.exit_to_home();
}
