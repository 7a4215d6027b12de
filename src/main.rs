//! Duck Hunt entry point
//!
//! In the browser this wires the game to the DOM and runs the frame loop.
//! Natively it plays a short headless session for smoke testing.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;

    use wasm_bindgen::prelude::*;
    use web_sys::{Document, HtmlCanvasElement};

    use duck_hunt::commentary::{Commentary, CommentaryBackend, FetchBackend};
    use duck_hunt::game::CommentaryJob;
    use duck_hunt::platform::{BrowserTimer, SystemClock, speech};
    use duck_hunt::renderer::CanvasRenderer;
    use duck_hunt::{Difficulty, Game, HudSnapshot, Settings};

    /// How often expired rate-limit windows are dropped
    const SWEEP_INTERVAL_MS: i32 = 60_000;

    /// Game plus everything browser-specific
    pub(crate) struct App {
        game: Game,
        renderer: CanvasRenderer,
        document: Document,
        last_hud: Option<HudSnapshot>,
        last_fps: u32,
        /// #commentary is showing a line
        commentary_shown: bool,
        /// A frame callback is scheduled
        loop_active: bool,
    }

    thread_local! {
        static APP: RefCell<Option<Rc<RefCell<App>>>> = const { RefCell::new(None) };
    }

    /// Run `f` against the live app, if there is one
    pub(crate) fn with_app<R>(f: impl FnOnce(&mut App) -> R) -> Option<R> {
        let app = APP.with(|slot| slot.borrow().clone())?;
        let mut app = app.borrow_mut();
        Some(f(&mut app))
    }

    impl App {
        pub(crate) fn game(&mut self) -> &mut Game {
            &mut self.game
        }

        /// Update HUD elements in DOM (only when something changed)
        fn update_hud(&mut self) {
            let hud = self.game.hud();
            if self.last_hud != Some(hud) {
                self.set_text("#hud-score .hud-value", &hud.score.to_string());
                self.set_text(
                    "#hud-round .hud-value",
                    &format!("{}/{}", hud.round, hud.max_rounds),
                );
                self.set_text("#hud-misses .hud-value", &hud.misses.to_string());

                if let Some(el) = self.document.get_element_by_id("game-over") {
                    let _ = el.set_attribute("class", if hud.ended { "" } else { "hidden" });
                }
                if hud.ended {
                    self.set_text("#final-score", &hud.score.to_string());
                }
                self.last_hud = Some(hud);
            }

            if self.commentary_shown && self.game.visible_commentary().is_none() {
                self.hide_commentary();
            }

            if self.game.settings().show_fps && self.game.fps() != self.last_fps {
                self.last_fps = self.game.fps();
                self.set_text("#hud-fps .hud-value", &self.last_fps.to_string());
            }
        }

        fn show_commentary(&mut self, line: &Commentary) {
            self.set_text("#commentary", &line.text);
            if let Some(el) = self.document.get_element_by_id("commentary") {
                let _ = el.set_attribute("lang", line.lang.code());
                let _ = el.set_attribute("class", "");
            }
            self.commentary_shown = true;
        }

        fn hide_commentary(&mut self) {
            if let Some(el) = self.document.get_element_by_id("commentary") {
                let _ = el.set_attribute("class", "hidden");
            }
            self.commentary_shown = false;
        }

        fn set_text(&self, selector: &str, text: &str) {
            if let Some(el) = self.document.query_selector(selector).ok().flatten() {
                el.set_text_content(Some(text));
            }
        }
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        log::info!("Duck Hunt starting...");

        let window = web_sys::window().expect("no window");
        let document = window.document().expect("no document");

        if let Some(loading) = document.get_element_by_id("loading") {
            let _ = loading.set_attribute("class", "hidden");
        }

        let canvas: HtmlCanvasElement = document
            .get_element_by_id("canvas")
            .expect("no canvas")
            .dyn_into()
            .expect("not a canvas");

        // Host passes settings as JSON in a data attribute
        let settings = canvas
            .get_attribute("data-settings")
            .map(|json| Settings::from_json(&json))
            .unwrap_or_default();

        let backend = settings
            .commentary_endpoint
            .as_deref()
            .map(|endpoint| Rc::new(FetchBackend::new(endpoint)) as Rc<dyn CommentaryBackend>);
        if backend.is_none() {
            log::info!("No commentary endpoint configured, using canned lines");
        }

        let seed = js_sys::Date::now() as u64;
        let game = Game::new(
            seed,
            settings,
            Rc::new(SystemClock),
            Rc::new(BrowserTimer),
            backend,
        );

        let mut renderer = CanvasRenderer::new(canvas).expect("Failed to create canvas renderer");
        renderer.resize(window.device_pixel_ratio());

        let app = Rc::new(RefCell::new(App {
            game,
            renderer,
            document: document.clone(),
            last_hud: None,
            last_fps: 0,
            commentary_shown: false,
            loop_active: true,
        }));
        APP.with(|slot| *slot.borrow_mut() = Some(app.clone()));

        setup_keyboard();
        setup_visibility(&document);
        setup_sweep(app.clone());

        if let Some(hud) = document.get_element_by_id("hud") {
            let _ = hud.set_attribute("class", "");
        }

        request_animation_frame(app);
        log::info!("Duck Hunt running!");
    }

    fn setup_keyboard() {
        let window = web_sys::window().expect("no window");
        let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::KeyboardEvent| {
            match event.key().as_str() {
                "r" | "R" => restart(None),
                "Escape" => teardown(),
                _ => {}
            }
        });
        let _ = window.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    /// Stop talking when the tab is hidden
    fn setup_visibility(document: &Document) {
        let document_clone = document.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            if document_clone.visibility_state() == web_sys::VisibilityState::Hidden {
                speech::cancel();
            }
        });
        let _ = document.add_event_listener_with_callback("visibilitychange", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn setup_sweep(app: Rc<RefCell<App>>) {
        let window = web_sys::window().expect("no window");
        let closure = Closure::<dyn FnMut()>::new(move || {
            let dropped = app.borrow_mut().game.sweep();
            if dropped > 0 {
                log::debug!("Swept {} rate-limit windows", dropped);
            }
        });
        let _ = window.set_interval_with_callback_and_timeout_and_arguments_0(
            closure.as_ref().unchecked_ref(),
            SWEEP_INTERVAL_MS,
        );
        closure.forget();
    }

    fn request_animation_frame(app: Rc<RefCell<App>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::once(move |time: f64| {
            game_loop(app, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(app: Rc<RefCell<App>>, time: f64) {
        let (jobs, running) = {
            let mut a = app.borrow_mut();
            if let Some(window) = web_sys::window() {
                a.renderer.resize(window.device_pixel_ratio());
            }

            let jobs = a.game.frame(time);
            let list = a.game.draw_list();
            a.renderer.draw(&list);
            a.update_hud();
            a.loop_active = a.game.is_running();
            (jobs, a.loop_active)
        };

        for job in jobs {
            spawn_commentary(app.clone(), job);
        }

        if running {
            request_animation_frame(app);
        } else {
            log::info!("Frame loop stopped");
        }
    }

    /// Await a commentary job off the frame loop and show its result
    fn spawn_commentary(app: Rc<RefCell<App>>, job: CommentaryJob) {
        let CommentaryJob { ticket, task } = job;
        wasm_bindgen_futures::spawn_local(async move {
            let result = task.await;
            let mut a = app.borrow_mut();
            let Some(line) = a.game.finish_commentary(ticket, result).cloned() else {
                return;
            };
            a.show_commentary(&line);
            if a.game.settings().speech {
                speech::speak(&line.text, line.lang);
            }
        });
    }

    /// Stop the loop, cancel commentary and speech
    pub fn teardown() {
        with_app(|app| app.game().shutdown());
        speech::cancel();
    }

    pub fn restart(difficulty: Option<String>) {
        let difficulty = difficulty.as_deref().and_then(|d| {
            let parsed = Difficulty::from_str(d);
            if parsed.is_none() {
                log::warn!("Unknown difficulty {:?}, keeping current", d);
            }
            parsed
        });
        let needs_loop = with_app(|app| {
            if let Some(difficulty) = difficulty {
                app.game.set_difficulty(difficulty);
            }
            app.game.restart(js_sys::Date::now() as u64);
            app.last_hud = None;
            app.hide_commentary();
            !std::mem::replace(&mut app.loop_active, true)
        });
        // The loop exits after teardown; start it again
        if needs_loop == Some(true)
            && let Some(app) = APP.with(|slot| slot.borrow().clone())
        {
            request_animation_frame(app);
        }
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    wasm_game::run();
}

/// Feed one hand from the tracker as a flat `[x, y, z, ...]` array
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub fn push_landmarks(landmarks: &[f32]) -> bool {
    wasm_game::with_app(|app| app.game().push_landmarks(landmarks).is_ok()).unwrap_or(false)
}

/// Feed an aim point and pinch distance already extracted by the host
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub fn push_aim(x: f32, y: f32, pinch_distance: f32) -> bool {
    wasm_game::with_app(|app| app.game().push_aim(x, y, pinch_distance).is_ok()).unwrap_or(false)
}

/// Pull the trigger from host-side gesture detection
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub fn shoot() -> bool {
    wasm_game::with_app(|app| app.game().shoot()).unwrap_or(false)
}

/// Current HUD as JSON
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub fn hud() -> Option<String> {
    wasm_game::with_app(|app| serde_json::to_string(&app.game().hud()).ok()).flatten()
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub fn restart(difficulty: Option<String>) {
    wasm_game::restart(difficulty);
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub fn teardown() {
    wasm_game::teardown();
}

/// Clock that advances with simulated frames rather than wall time
#[cfg(not(target_arch = "wasm32"))]
#[derive(Default)]
struct FrameClock(std::cell::Cell<f64>);

#[cfg(not(target_arch = "wasm32"))]
impl duck_hunt::platform::Clock for FrameClock {
    fn now_ms(&self) -> f64 {
        self.0.get()
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use std::rc::Rc;

    use duck_hunt::platform::ThreadTimer;
    use duck_hunt::{Difficulty, Game, Settings};

    env_logger::init();
    log::info!("Duck Hunt (native) starting...");
    log::info!("Native mode is headless - serve the wasm build for the real game");

    let difficulty = std::env::args()
        .nth(1)
        .and_then(|arg| Difficulty::from_str(&arg))
        .unwrap_or_default();
    let clock = Rc::new(FrameClock::default());
    let mut game = Game::new(
        7,
        Settings::with_difficulty(difficulty),
        clock.clone(),
        Rc::new(ThreadTimer),
        None,
    );

    // Aim-bot: track the live target and fire every 20 frames
    let frame_ms = 1000.0 / 60.0;
    for frame in 0..20_000u32 {
        if game.hud().ended {
            break;
        }
        let now = f64::from(frame) * frame_ms;
        clock.0.set(now);
        if let Some(target) = game.world.targets.first() {
            game.input.aim = target.pos;
        }
        if frame % 20 == 19 {
            game.shoot();
        }
        for job in game.frame(now) {
            let result = futures::executor::block_on(job.task);
            if let Some(line) = game.finish_commentary(job.ticket, result) {
                println!("[{}] {}", line.lang.code(), line.text);
            }
        }
    }

    let hud = game.hud();
    println!(
        "Final score {} after {} rounds ({} misses, taunt level {})",
        hud.score,
        hud.max_rounds,
        hud.misses,
        hud.taunt_level.as_str()
    );
    game.shutdown();
}
