//! Stack Tower entry point
//!
//! In the browser this wires the session to the page: loading gate, name
//! screen, leaderboard sign-in, frame loop, input and overlays. Natively it
//! runs a headless autopilot soak and logs what happened.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{Element, HtmlInputElement, KeyboardEvent, MouseEvent, TouchEvent};

    use stack_tower::Settings;
    use stack_tower::audio::{AudioManager, Cue};
    use stack_tower::leaderboard::{
        self, Board, Identity, Leaderboard, LocalLeaderboard, RemoteConfig, RemoteLeaderboard,
        TOP_N,
    };
    use stack_tower::platform::BallisticWorld;
    use stack_tower::platform::web::{self, JsScene};
    use stack_tower::player::PlayerName;
    use stack_tower::proxy::World;
    use stack_tower::sim::{GameEvent, GameMode, Session};

    /// Loading screen stays up at least this long
    const MIN_LOADING_MS: i32 = 2000;

    /// Game instance holding all state
    struct Game {
        session: Session<JsScene, BallisticWorld>,
        audio: AudioManager,
        settings: Settings,
        board: Rc<Board>,
        identity: Identity,
        /// Input is swallowed while an overlay owns the screen
        ignore_input: bool,
        music_initialized: bool,
    }

    impl Game {
        fn new(settings: &Settings, board: Rc<Board>, identity: Identity) -> Self {
            let seed = js_sys::Date::now() as u64;
            let world = World::new(JsScene::new(), BallisticWorld::new());
            let mut session = Session::new(world, settings, seed);
            session.start(GameMode::Autopilot);
            log::info!("Session initialized with seed: {}", seed);
            Self {
                session,
                audio: AudioManager::new(settings),
                settings: settings.clone(),
                board,
                identity,
                ignore_input: false,
                music_initialized: false,
            }
        }

        /// Click, tap or space
        fn primary_action(&mut self) {
            if !self.music_initialized {
                self.music_initialized = true;
                self.audio.start_music();
            }
            self.session.on_primary_action();
            self.handle_events();
        }

        fn toggle_mute(&mut self) {
            self.settings.muted = !self.settings.muted;
            self.settings.save();
            self.audio.apply_settings(&self.settings);
            self.session.apply_settings(&self.settings);
            log::info!("Muted: {}", self.settings.muted);
        }

        fn frame(&mut self, time: f64) {
            self.session.on_tick(time);
            self.handle_events();
            let camera = self.session.camera();
            self.session.world_mut().scene.present(camera);
        }

        fn handle_events(&mut self) {
            for event in self.session.drain_events() {
                match event {
                    GameEvent::Started { mode } => {
                        if mode == GameMode::Manual {
                            if self.music_initialized && !self.audio.is_music_playing() {
                                self.audio.start_music();
                            }
                            web::set_opacity("titleScreen", 0.0);
                            web::set_opacity("gameOver", 0.0);
                            web::set_opacity("gameScreen", 1.0);
                            web::set_text("score", "0");
                        }
                    }
                    GameEvent::Placed { score, perfect } => {
                        if self.session.mode() == GameMode::Manual {
                            web::set_text("score", &score.to_string());
                            self.audio.play(if perfect { Cue::Perfect } else { Cue::Place });
                        }
                    }
                    GameEvent::Missed { score, mode } => {
                        log::info!("Missed at score {} ({:?})", score, mode);
                        if mode == GameMode::Manual {
                            self.audio.play(Cue::Miss);
                            web::set_text("scoreResult", &score.to_string());
                            web::set_opacity("gameOver", 1.0);
                            web::set_opacity("gameScreen", 0.0);
                        }
                    }
                    GameEvent::StopAudio => self.audio.stop_music(),
                    GameEvent::SubmitScore { score } => {
                        let board = self.board.clone();
                        let identity = self.identity.clone();
                        leaderboard::spawn_detached(async move {
                            leaderboard::submit_logged(board.as_ref(), &identity, score).await;
                            update_leaderboard(board.clone(), identity.clone()).await;
                            show_highscore(board, identity).await;
                        });
                    }
                    // Demo restarts keep whatever screen is showing
                    GameEvent::Restarted { from } => {
                        if from == GameMode::Manual {
                            web::set_opacity("gameOver", 0.0);
                            web::set_opacity("titleScreen", 1.0);
                            web::set_opacity("gameScreen", 0.0);
                        }
                    }
                }
            }
        }

        fn leaderboard_visible(&self) -> bool {
            web::opacity("leaderboard") >= 1.0
        }

        fn show_leaderboard(&mut self) {
            web::set_opacity("leaderboard", 1.0);
            web::set_opacity("titleScreen", 0.0);
            self.ignore_input = true;
            leaderboard::spawn_detached(update_leaderboard(
                self.board.clone(),
                self.identity.clone(),
            ));
        }

        fn hide_leaderboard(&mut self) {
            web::set_opacity("leaderboard", 0.0);
            web::set_opacity("titleScreen", 1.0);
            self.ignore_input = false;
        }
    }

    /// Rebuild the leaderboard overlay list
    async fn update_leaderboard(board: Rc<Board>, identity: Identity) {
        let top = match board.fetch_top(TOP_N).await {
            Ok(top) => top,
            Err(e) => {
                log::warn!("Leaderboard fetch failed: {}", e);
                return;
            }
        };

        let listed = top.iter().any(|entry| entry.uid == identity.uid);
        let personal = if top.is_empty() || listed {
            None
        } else {
            match board.fetch_personal(&identity).await {
                Ok(personal) => Some(personal),
                Err(e) => {
                    log::warn!("Personal score fetch failed: {}", e);
                    None
                }
            }
        };

        let Some(document) = web::document() else { return };
        let Some(list) = document.get_element_by_id("leaderboard-list") else {
            return;
        };
        list.set_inner_html("");

        if top.is_empty() {
            if let Ok(item) = document.create_element("li") {
                item.set_text_content(Some("No scores yet. Be the first to play!"));
                let _ = item.set_attribute("style", "font-size: initial");
                let _ = list.append_child(&item);
            }
            return;
        }

        for row in leaderboard::standings(&top, &identity, personal) {
            let Ok(item) = document.create_element("li") else {
                continue;
            };
            item.set_text_content(Some(&row.text));
            let _ = item.set_attribute("style", &format!("color: {}", row.color));
            if row.own {
                let _ = item.class_list().add_1("sparkle");
            }
            let _ = list.append_child(&item);
        }
    }

    /// Personal best on the title screen
    async fn show_highscore(board: Rc<Board>, identity: Identity) {
        match board.fetch_personal(&identity).await {
            Ok(personal) => web::set_text("highscoreValue", &personal.score.to_string()),
            Err(e) => log::warn!("Highscore fetch failed: {}", e),
        }
    }

    /// Reach the hosted leaderboard if configured, else keep scores locally
    async fn connect(name: PlayerName) -> (Board, Identity) {
        if let Some(config) = RemoteConfig::from_build_env() {
            let remote = RemoteLeaderboard::new(config);
            match remote.sign_in(name.clone()).await {
                Ok(identity) => return (Board::Remote(remote), identity),
                Err(e) => log::warn!("Sign-in failed, using local leaderboard: {}", e),
            }
        } else {
            log::info!("No leaderboard service configured, using local leaderboard");
        }
        (
            Board::Local(LocalLeaderboard::load()),
            LocalLeaderboard::identity(name),
        )
    }

    async fn start_with_name(name: PlayerName, settings: Settings, register: bool) {
        let (board, identity) = connect(name).await;
        let board = Rc::new(board);
        if register {
            leaderboard::submit_detached(board.clone(), identity.clone(), 0);
        }

        web::set_style("nameScreen", "display", "none");
        show_highscore(board.clone(), identity.clone()).await;
        web::set_opacity("loadingScreen", 0.0);

        let game = Rc::new(RefCell::new(Game::new(&settings, board, identity)));
        setup_input_handlers(game.clone());
        request_animation_frame(game);
        log::info!("Stack Tower running!");
    }

    fn setup_name_screen(settings: Settings) {
        let Some(document) = web::document() else { return };
        let Some(button) = document.get_element_by_id("startButton") else {
            log::error!("Name screen has no start button");
            return;
        };

        let submitted = Rc::new(Cell::new(false));
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
            if submitted.get() {
                return;
            }
            let raw = web::document()
                .and_then(|d| d.get_element_by_id("playerNameInput"))
                .and_then(|el| el.dyn_into::<HtmlInputElement>().ok())
                .map(|input| input.value())
                .unwrap_or_default();

            match PlayerName::parse(&raw) {
                Ok(name) => {
                    submitted.set(true);
                    web::set_text("errorMessage", "");
                    name.save();
                    wasm_bindgen_futures::spawn_local(start_with_name(
                        name,
                        settings.clone(),
                        true,
                    ));
                }
                Err(e) => web::set_text("errorMessage", &e.to_string()),
            }
        });
        let _ = button.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    pub async fn run() {
        console_error_panic_hook::set_once();
        if console_log::init_with_level(log::Level::Info).is_err() {
            return;
        }

        log::info!("Stack Tower starting...");

        if !web::host_available() {
            log::error!("Page did not provide a stackHost renderer");
            return;
        }

        let settings = Settings::load();
        web::set_opacity("loadingScreen", 1.0);
        web::sleep_ms(MIN_LOADING_MS).await;

        match PlayerName::load() {
            Some(name) => {
                log::info!("Welcome back, {}", name);
                start_with_name(name, settings, false).await;
            }
            None => {
                web::set_opacity("loadingScreen", 0.0);
                web::set_style("nameScreen", "visibility", "visible");
                setup_name_screen(settings);
            }
        }
    }

    fn targets_leaderboard(event: &web_sys::Event) -> bool {
        event
            .target()
            .and_then(|t| t.dyn_into::<Element>().ok())
            .is_some_and(|el| el.class_list().contains("leaderboard"))
    }

    fn setup_input_handlers(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else { return };

        // Mouse
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                let mut g = game.borrow_mut();
                if event.button() == 0 && targets_leaderboard(&event) {
                    g.show_leaderboard();
                } else if g.leaderboard_visible() && g.ignore_input {
                    g.hide_leaderboard();
                } else if g.ignore_input || event.button() == 2 {
                    // Overlay transition or context menu
                } else {
                    event.prevent_default();
                    g.primary_action();
                }
            });
            let _ = window
                .add_event_listener_with_callback("mousedown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Touch
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                let mut g = game.borrow_mut();
                if g.leaderboard_visible() && g.ignore_input {
                    g.hide_leaderboard();
                } else if g.ignore_input {
                    // Overlay transition
                } else if targets_leaderboard(&event) {
                    g.show_leaderboard();
                } else {
                    event.prevent_default();
                    g.primary_action();
                }
            });
            let _ = window
                .add_event_listener_with_callback("touchstart", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Keyboard
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                let mut g = game.borrow_mut();
                if event.key() == " " && !g.ignore_input {
                    event.prevent_default();
                    g.primary_action();
                } else if event.key().eq_ignore_ascii_case("m") {
                    g.toggle_mute();
                } else if g.leaderboard_visible() && g.ignore_input {
                    g.hide_leaderboard();
                }
            });
            let _ = window
                .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else { return };
        let closure = Closure::once(move |time: f64| {
            game.borrow_mut().frame(time);
            request_animation_frame(game);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() {
    wasm_game::run().await;
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Stack Tower (native) starting...");
    log::info!("The game itself runs in the browser; running a headless autopilot soak");

    soak::run(std::env::args().skip(1).collect());
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

/// Headless autopilot soak: `stack-tower [frames] [random|soak|<precision>]`
#[cfg(not(target_arch = "wasm32"))]
mod soak {
    use stack_tower::platform::{BallisticWorld, HeadlessScene};
    use stack_tower::proxy::World;
    use stack_tower::sim::{GameEvent, GameMode, Session};
    use stack_tower::{PrecisionMode, Settings};

    const DEFAULT_FRAMES: u64 = 60 * 60 * 5;
    const FRAME_MS: f64 = 1000.0 / 60.0;

    #[derive(Debug, Default)]
    struct Stats {
        placements: u64,
        perfects: u64,
        misses: u64,
        best_score: u32,
    }

    pub fn run(args: Vec<String>) {
        let frames = args
            .first()
            .and_then(|a| a.parse().ok())
            .unwrap_or(DEFAULT_FRAMES);

        let mut settings = Settings::default();
        if let Some(raw) = args.get(1) {
            match PrecisionMode::from_str(raw) {
                Some(mode) => settings.autopilot_precision = mode,
                None => log::warn!("Unknown precision '{}', using random", raw),
            }
        }

        let world = World::new(HeadlessScene::new(), BallisticWorld::new());
        let mut session = Session::new(world, &settings, 0x5eed);
        session.start(GameMode::Autopilot);

        let mut stats = Stats::default();
        for frame in 0..frames {
            session.on_tick(frame as f64 * FRAME_MS);
            for event in session.drain_events() {
                match event {
                    GameEvent::Placed { score, perfect } => {
                        stats.placements += 1;
                        stats.perfects += u64::from(perfect);
                        stats.best_score = stats.best_score.max(score);
                    }
                    GameEvent::Missed { score, .. } => {
                        stats.misses += 1;
                        log::info!("Autopilot missed at score {} (frame {})", score, frame);
                    }
                    _ => {}
                }
            }
        }

        let world = session.world();
        log::info!(
            "Soak finished after {} frames ({:?}): {:?}",
            frames,
            settings.autopilot_precision,
            stats
        );
        log::info!(
            "Final tower: {} layers, {} overhangs, {} visuals, {} bodies",
            session.stack().len(),
            session.stack().overhangs().len(),
            world.scene.len(),
            world.physics.len()
        );
    }
}
