//! Lane Runner entry point
//!
//! On the web: wires DOM input to the session, runs the frame loop, keeps
//! the HUD in sync and hands a snapshot to the page's renderer each frame.
//! Natively: runs a headless demo game with the autopilot.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{Document, HtmlInputElement, KeyboardEvent, TouchEvent};

    use lane_runner::persistence::{KeyValueStore, LocalStorageStore, MemoryStore};
    use lane_runner::platform::{FrameClock, KeyCommand, SwipeTracker, command_for_key};
    use lane_runner::session::{Action, Session};
    use lane_runner::sim::{GameEvent, GamePhase};
    use lane_runner::snapshot::FrameSnapshot;
    use lane_runner::{HighScoreLedger, Settings};

    type Store = Box<dyn KeyValueStore>;

    /// LocalStorage, or a throwaway memory store if the browser refuses
    fn open_store() -> Store {
        match LocalStorageStore::open() {
            Ok(store) => Box::new(store),
            Err(e) => {
                log::warn!("{}; scores will not persist", e);
                Box::new(MemoryStore::default())
            }
        }
    }

    fn document() -> Option<Document> {
        web_sys::window()?.document()
    }

    fn set_hidden(document: &Document, id: &str, hidden: bool) {
        if let Some(el) = document.get_element_by_id(id) {
            let _ = el.set_attribute("class", if hidden { "hidden" } else { "" });
        }
    }

    fn set_text(document: &Document, id: &str, text: &str) {
        if let Some(el) = document.get_element_by_id(id) {
            el.set_text_content(Some(text));
        }
    }

    /// Game instance holding all state
    struct Game {
        session: Session<Store>,
        settings: Settings,
        settings_store: Store,
        clock: FrameClock,
        swipe: SwipeTracker,
    }

    impl Game {
        fn new(seed: u64) -> Self {
            let settings_store = open_store();
            let settings = Settings::load(&settings_store);
            let ledger = HighScoreLedger::load(open_store());
            Self {
                session: Session::new(seed, settings.tuning(), ledger),
                settings,
                settings_store,
                clock: FrameClock::default(),
                swipe: SwipeTracker::default(),
            }
        }

        /// Run simulation ticks and react to what happened
        fn update(&mut self, time: f64) {
            let dt = self.clock.frame(time);
            for event in self.session.advance_frame(dt) {
                self.on_event(event);
            }
        }

        fn on_event(&mut self, event: GameEvent) {
            let Some(document) = document() else {
                return;
            };
            match event {
                GameEvent::ScoreChanged { score } => set_text(&document, "hud-score", &score.to_string()),
                GameEvent::GameOver { final_score } => {
                    set_text(&document, "final-score", &final_score.to_string());
                    set_hidden(&document, "game-over", false);
                }
                GameEvent::HighScoreQualified { final_score, rank } => {
                    log::info!("New high score {} (rank {})", final_score, rank);
                    set_text(&document, "qualified-rank", &rank.to_string());
                    if let Some(input) = document
                        .get_element_by_id("name-input")
                        .and_then(|el| el.dyn_into::<HtmlInputElement>().ok())
                    {
                        input.set_value(&self.settings.last_name);
                    }
                    set_hidden(&document, "name-entry", false);
                }
                _ => {}
            }
        }

        /// Hand the frame to the page's renderer, if it registered one
        fn render(&self) {
            let Some(window) = web_sys::window() else {
                return;
            };
            let Ok(hook) = js_sys::Reflect::get(&window, &JsValue::from_str("renderRunnerFrame")) else {
                return;
            };
            let Ok(hook) = hook.dyn_into::<js_sys::Function>() else {
                return;
            };
            match FrameSnapshot::capture(self.session.state()).to_json() {
                Ok(json) => {
                    if let Err(e) = hook.call1(&JsValue::NULL, &JsValue::from_str(&json)) {
                        log::warn!("Renderer hook failed: {:?}", e);
                    }
                }
                Err(e) => log::warn!("Snapshot encode failed: {}", e),
            }
        }

        /// Show/hide overlays for the current phase
        fn update_hud(&self) {
            let Some(document) = document() else {
                return;
            };
            let phase = self.session.state().phase;
            set_hidden(&document, "ready-prompt", phase != GamePhase::Ready);
            set_hidden(&document, "pause-menu", phase != GamePhase::Paused);
            if phase != GamePhase::GameOver {
                set_hidden(&document, "game-over", true);
                set_hidden(&document, "name-entry", true);
            }
        }

        fn update_leaderboard(&self) {
            let Some(document) = document() else {
                return;
            };
            let Some(list) = document.get_element_by_id("leaderboard") else {
                return;
            };
            list.set_inner_html("");
            for entry in &self.session.ledger().scores().entries {
                if let Ok(li) = document.create_element("li") {
                    li.set_text_content(Some(&format!("{} {}", entry.name, entry.score)));
                    let _ = list.append_child(&li);
                }
            }
        }

        fn submit_name(&mut self, name: &str) {
            match self.session.submit_name(name) {
                Ok(Some(rank)) => log::info!("Recorded at rank {}", rank),
                Ok(None) => {}
                Err(e) => log::warn!("Could not save high scores: {}", e),
            }
            self.settings.remember_name(name);
            if let Err(e) = self.settings.save(&mut self.settings_store) {
                log::warn!("Could not save settings: {}", e);
            }
            if let Some(document) = document() {
                set_hidden(&document, "name-entry", true);
            }
            self.update_leaderboard();
        }

        /// Reset game state for restart
        fn restart(&mut self) {
            let seed = js_sys::Date::now() as u64;
            self.session.restart_with(seed, self.settings.tuning());
            self.clock.reset();
            if let Some(document) = document() {
                set_text(&document, "hud-score", "0");
            }
            log::info!("Game restarted with seed: {}", seed);
        }
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        if console_log::init_with_level(log::Level::Info).is_err() {
            web_sys::console::warn_1(&"logger already initialised".into());
        }

        log::info!("Lane Runner starting...");

        let Some(document) = document() else {
            log::error!("No document; nothing to drive");
            return;
        };

        // Hide loading indicator
        set_hidden(&document, "loading", true);

        let seed = js_sys::Date::now() as u64;
        let game = Rc::new(RefCell::new(Game::new(seed)));
        log::info!("Game initialized with seed: {}", seed);

        game.borrow().update_leaderboard();
        setup_input_handlers(game.clone());
        setup_buttons(game.clone());
        setup_auto_pause(game.clone());

        set_hidden(&document, "hud", false);
        request_animation_frame(game);

        log::info!("Lane Runner running!");
    }

    /// Attach a handler for the lifetime of the page
    fn listen<T>(target: &web_sys::EventTarget, name: &str, closure: Closure<T>)
    where
        T: ?Sized + wasm_bindgen::closure::WasmClosure,
    {
        let _ = target.add_event_listener_with_callback(name, closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn setup_input_handlers(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };

        // Keyboard
        {
            let game = game.clone();
            listen(&window, "keydown", Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                if event.repeat() {
                    return;
                }
                let Some(command) = command_for_key(&event.key()) else {
                    return;
                };
                let mut g = game.borrow_mut();
                // Typing a name must not steer the runner
                if g.session.awaiting_name().is_some() {
                    return;
                }
                match command {
                    KeyCommand::Game(action) => g.session.queue(action),
                    KeyCommand::Restart => g.restart(),
                    KeyCommand::ToggleIdle => {
                        let on = !g.session.idle_mode();
                        g.session.set_idle_mode(on);
                        log::info!("Idle mode: {}", on);
                    }
                }
            }));
        }

        // Touch start
        {
            let game = game.clone();
            listen(&window, "touchstart", Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                if let Some(touch) = event.touches().get(0) {
                    game.borrow_mut()
                        .swipe
                        .begin(touch.client_x() as f32, touch.client_y() as f32);
                }
            }));
        }

        // Touch end - classify the swipe
        {
            listen(&window, "touchend", Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                let Some(touch) = event.changed_touches().get(0) else {
                    return;
                };
                let mut g = game.borrow_mut();
                let now = js_sys::Date::now();
                if let Some(action) =
                    g.swipe
                        .end(touch.client_x() as f32, touch.client_y() as f32, now)
                {
                    if g.session.state().phase == GamePhase::Ready {
                        g.session.queue(Action::Start);
                    }
                    g.session.queue(action);
                }
            }));
        }
    }

    fn setup_buttons(game: Rc<RefCell<Game>>) {
        let Some(doc) = document() else {
            return;
        };

        if let Some(btn) = doc.get_element_by_id("restart-btn") {
            let game = game.clone();
            listen(&btn, "click", Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| {
                game.borrow_mut().restart();
            }));
        }

        if let Some(btn) = doc.get_element_by_id("resume-btn") {
            let game = game.clone();
            listen(&btn, "click", Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| {
                game.borrow_mut().session.queue(Action::Pause);
            }));
        }

        if let Some(btn) = doc.get_element_by_id("name-submit") {
            listen(&btn, "click", Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| {
                let name = document()
                    .and_then(|d| d.get_element_by_id("name-input"))
                    .and_then(|el| el.dyn_into::<HtmlInputElement>().ok())
                    .map(|input| input.value())
                    .unwrap_or_default();
                game.borrow_mut().submit_name(&name);
            }));
        }
    }

    fn setup_auto_pause(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let Some(document) = window.document() else {
            return;
        };

        // Visibility change (tab switch, minimize)
        {
            let game = game.clone();
            let document_clone = document.clone();
            listen(&document, "visibilitychange", Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                let mut g = game.borrow_mut();
                if document_clone.visibility_state() == web_sys::VisibilityState::Hidden {
                    if g.session.state().phase == GamePhase::Playing {
                        g.session.queue(Action::Pause);
                        log::info!("Auto-paused (tab hidden)");
                    }
                } else {
                    g.clock.reset();
                }
            }));
        }

        // Window blur (click outside)
        listen(&window, "blur", Closure::<dyn FnMut(_)>::new(move |_event: web_sys::FocusEvent| {
            let mut g = game.borrow_mut();
            if g.session.state().phase == GamePhase::Playing {
                g.session.queue(Action::Pause);
                log::info!("Auto-paused (window blur)");
            }
        }));
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::once(move |time: f64| {
            game_loop(game, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Game>>, time: f64) {
        {
            let mut g = game.borrow_mut();
            g.update(time);
            g.render();
            g.update_hud();
        }

        request_animation_frame(game);
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

#[cfg(not(target_arch = "wasm32"))]
fn main() -> Result<(), Box<dyn std::error::Error>> {
    use std::env;
    use std::path::PathBuf;
    use std::time::{SystemTime, UNIX_EPOCH};

    use lane_runner::consts::SIM_DT;
    use lane_runner::persistence::FileStore;
    use lane_runner::sim::GameEvent;
    use lane_runner::{HighScoreLedger, Session, Settings};

    env_logger::init();
    log::info!("Lane Runner (native) starting headless demo...");

    let data_dir = env::var("LANE_RUNNER_DATA_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| env::temp_dir().join("lane-runner"));
    let seed = match env::var("LANE_RUNNER_SEED") {
        Ok(s) => s.parse()?,
        Err(_) => SystemTime::now().duration_since(UNIX_EPOCH)?.as_millis() as u64,
    };
    let seconds: f32 = match env::var("LANE_RUNNER_SECONDS") {
        Ok(s) => s.parse()?,
        Err(_) => 120.0,
    };

    let mut settings_store = FileStore::open(&data_dir)?;
    let mut settings = Settings::load(&settings_store);
    let ledger = HighScoreLedger::load(FileStore::open(&data_dir)?);
    let mut session = Session::new(seed, settings.tuning(), ledger);
    session.set_idle_mode(true);

    log::info!(
        "Seed {}, difficulty {}, data in {}",
        seed,
        settings.difficulty.as_str(),
        data_dir.display()
    );

    let frames = (seconds / SIM_DT).ceil() as u64;
    let mut mounts = 0u32;
    for _ in 0..frames {
        for event in session.advance_frame(SIM_DT) {
            match event {
                GameEvent::Mounted { .. } => mounts += 1,
                GameEvent::HighScoreQualified { final_score, rank } => {
                    println!("High score {} qualifies for rank {}", final_score, rank);
                    session.submit_name("BOT")?;
                    settings.remember_name("BOT");
                }
                _ => {}
            }
        }
        if session.state().is_over() {
            break;
        }
    }

    let state = session.state();
    println!(
        "{} after {:.1}s: score {}, {} coins, {} train rides",
        if state.is_over() { "Crashed" } else { "Survived" },
        state.elapsed_ticks as f32 * SIM_DT,
        state.display_score(),
        state.coins_collected,
        mounts
    );
    println!("High scores:");
    for (i, entry) in session.ledger().scores().entries.iter().enumerate() {
        println!("  {}. {:<6} {}", i + 1, entry.name, entry.score);
    }

    settings.save(&mut settings_store)?;
    Ok(())
}
