//! Escape The Program entry point
//!
//! Handles platform-specific initialization and runs the game loop. In the
//! browser the room is drawn as positioned DOM nodes; natively a line-driven
//! driver reads commands from stdin and prints snapshots.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::fmt::Write as _;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{Document, HtmlInputElement, KeyboardEvent, MouseEvent};

    use escape_the_program::Settings;
    use escape_the_program::platform::{Clock, map_key};
    use escape_the_program::sim::{
        Command, GamePhase, GameSnapshot, GameState, PowerUpKind, PromptView, Rect,
        handle_command, take_snapshot,
    };

    /// Game instance holding all state
    struct Game {
        state: GameState,
        clock: Clock,
        settings: Settings,
        last_time: f64,
        /// Prompt shown last frame, so the input box is only reset on change
        shown_prompt: Option<PromptView>,
    }

    impl Game {
        fn new(seed: u64, settings: Settings) -> Self {
            Self {
                state: GameState::new(seed),
                clock: Clock::new(),
                settings,
                last_time: 0.0,
                shown_prompt: None,
            }
        }

        fn command(&mut self, command: Command) {
            handle_command(&mut self.state, &command);
        }

        /// Advance timers by real elapsed time
        fn update(&mut self, time: f64) {
            let dt = if self.last_time > 0.0 {
                ((time - self.last_time) / 1000.0) as f32
            } else {
                0.0
            };
            self.last_time = time;
            self.clock.advance(&mut self.state, dt);
        }

        /// Submit whatever is typed in the prompt box
        fn submit_prompt(&mut self, text: String) {
            let command = match self.state.prompt {
                Some(escape_the_program::sim::Prompt::AwaitingCode) => Command::SubmitCode(text),
                Some(_) => Command::SubmitAnswer(text),
                None => return,
            };
            self.command(command);
        }
    }

    fn document() -> Option<Document> {
        web_sys::window()?.document()
    }

    fn prompt_input(document: &Document) -> Option<HtmlInputElement> {
        document
            .get_element_by_id("prompt-input")?
            .dyn_into::<HtmlInputElement>()
            .ok()
    }

    fn set_text(document: &Document, id: &str, text: &str) {
        if let Some(el) = document.get_element_by_id(id) {
            el.set_text_content(Some(text));
        }
    }

    fn set_visible(document: &Document, id: &str, visible: bool) {
        if let Some(el) = document.get_element_by_id(id) {
            let _ = el.set_attribute("class", if visible { "" } else { "hidden" });
        }
    }

    fn push_box(html: &mut String, class: &str, r: &Rect, content: &str) {
        let _ = write!(
            html,
            r#"<div class="{}" style="left:{}px;top:{}px;width:{}px;height:{}px">{}</div>"#,
            class, r.x, r.y, r.w, r.h, content
        );
    }

    /// Draw the snapshot into the DOM
    fn render(game: &mut Game, snap: &GameSnapshot) {
        let Some(document) = document() else {
            return;
        };

        set_text(&document, "hud-lives", &snap.lives.to_string());
        set_text(&document, "hud-time", &format!("{}s", snap.time_left));
        set_text(&document, "hud-level", &snap.level.to_string());

        let mut html = String::new();
        for o in &snap.obstacles {
            push_box(&mut html, "obstacle", o, "");
        }
        for m in &snap.moving {
            push_box(&mut html, "moving", m, "");
        }
        for e in &snap.enemies {
            push_box(&mut html, "enemy", e, "");
        }
        for p in &snap.powerups {
            let class = match p.kind {
                PowerUpKind::Time => "powerup time",
                PowerUpKind::Life => "powerup life",
            };
            push_box(&mut html, class, &p.rect, "");
        }
        push_box(&mut html, "player", &snap.player, "");
        let (class, icon) = if snap.exit.locked {
            ("exit locked", "&#128274;")
        } else {
            ("exit unlocked", "&#128682;")
        };
        push_box(&mut html, class, &snap.exit.rect, icon);
        if let Some(room) = document.get_element_by_id("room") {
            room.set_inner_html(&html);
        }

        if snap.prompt != game.shown_prompt {
            match &snap.prompt {
                Some(PromptView::Question { text }) | Some(PromptView::Code { text }) => {
                    set_text(&document, "prompt-text", text);
                    set_visible(&document, "prompt", true);
                    if let Some(input) = prompt_input(&document) {
                        input.set_value("");
                        let _ = input.focus();
                    }
                }
                None => {
                    set_visible(&document, "prompt", false);
                    if let Some(input) = prompt_input(&document) {
                        input.set_value("");
                    }
                }
            }
            game.shown_prompt = snap.prompt.clone();
        }

        let ending = match snap.phase {
            GamePhase::GameOver => Some(("GAME OVER", "You ran out of lives.")),
            GamePhase::Complete => Some(("YOU ESCAPED", "You finished all levels!")),
            GamePhase::Playing => None,
        };
        if let Some((title, text)) = ending {
            set_text(&document, "end-title", title);
            set_text(&document, "end-text", text);
        }
        set_visible(&document, "game-over", ending.is_some());
    }

    fn show_notices(snap: &GameSnapshot) {
        let Some(window) = web_sys::window() else {
            return;
        };
        for notice in &snap.notices {
            log::info!("{}", notice.message);
            let _ = window.alert_with_message(&notice.message);
        }
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        let settings = Settings::load();
        if console_log::init_with_level(settings.log_level()).is_err() {
            web_sys::console::warn_1(&"Logger already initialized".into());
        }

        log::info!("Escape The Program starting...");

        let seed = settings.seed_or(js_sys::Date::now() as u64);
        let game = Rc::new(RefCell::new(Game::new(seed, settings)));
        log::info!("Game initialized with seed: {}", seed);

        setup_input_handlers(game.clone());
        setup_prompt_buttons(game.clone());
        setup_restart_button(game.clone());
        setup_layout_button(game.clone());

        request_animation_frame(game);
    }

    fn setup_input_handlers(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            log::warn!("No window; keyboard input disabled");
            return;
        };
        let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
            if event.repeat() {
                return;
            }
            let mut g = game.borrow_mut();
            if g.state.prompt.is_some() {
                match event.key().as_str() {
                    "Enter" => {
                        let text = document()
                            .and_then(|d| prompt_input(&d))
                            .map(|i| i.value())
                            .unwrap_or_default();
                        g.submit_prompt(text);
                    }
                    "Escape" => g.command(Command::CancelPrompt),
                    _ => {}
                }
                return;
            }
            let layout = g.settings.key_layout;
            if let Some(command) = map_key(&event.key(), layout) {
                event.prevent_default();
                g.command(command);
            }
        });
        let _ = window.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn setup_prompt_buttons(game: Rc<RefCell<Game>>) {
        let Some(document) = document() else {
            return;
        };

        if let Some(btn) = document.get_element_by_id("prompt-submit") {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                let text = document()
                    .and_then(|d| prompt_input(&d))
                    .map(|i| i.value())
                    .unwrap_or_default();
                game.borrow_mut().submit_prompt(text);
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        } else {
            log::warn!("Missing #prompt-submit button");
        }

        if let Some(btn) = document.get_element_by_id("prompt-cancel") {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                game.borrow_mut().command(Command::CancelPrompt);
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        } else {
            log::warn!("Missing #prompt-cancel button");
        }
    }

    fn setup_restart_button(game: Rc<RefCell<Game>>) {
        let Some(document) = document() else {
            return;
        };

        if let Some(btn) = document.get_element_by_id("restart-btn") {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                let mut g = game.borrow_mut();
                g.command(Command::Restart);
                g.clock.reset();
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_layout_button(game: Rc<RefCell<Game>>) {
        let Some(document) = document() else {
            return;
        };
        let Some(btn) = document.get_element_by_id("layout-btn") else {
            return;
        };
        btn.set_text_content(Some(&format!(
            "Keys: {}",
            game.borrow().settings.key_layout.label()
        )));

        let btn_clone = btn.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
            let mut g = game.borrow_mut();
            let next = g.settings.key_layout.next();
            g.settings.set_key_layout(next);
            btn_clone.set_text_content(Some(&format!("Keys: {}", next.label())));
        });
        let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
        closure.forget();
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
        let snap = {
            let mut g = game.borrow_mut();
            g.update(time);
            let snap = take_snapshot(&mut g.state);
            render(&mut g, &snap);
            snap
        };
        // Alerts block, so show them with the game unborrowed
        show_notices(&snap);

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
mod native {
    use std::io::{self, BufRead, Write};

    use escape_the_program::consts::{COUNTDOWN_DT, MOVER_DT};
    use escape_the_program::platform::{Clock, map_key};
    use escape_the_program::sim::{
        Command, Direction, GameState, handle_command, take_snapshot, tick_countdown, tick_movers,
    };
    use escape_the_program::{KeyLayout, Settings};

    /// Seconds of game time simulated per step of a `wait`
    const WAIT_STEP: f32 = 0.05;
    /// Longest `wait` accepted, in seconds
    const MAX_WAIT_SECS: f32 = 3600.0;
    /// Most countdown ticks a single `tick` may run
    const MAX_TICKS: u32 = 3600;

    /// One parsed line of driver input
    #[derive(Debug, Clone, PartialEq)]
    pub enum Line {
        Command(Command),
        Wait(f32),
        /// Countdown ticks, each with a second's worth of mover ticks
        Tick(u32),
        /// Switch key layout; `None` cycles to the next one
        Layout(Option<KeyLayout>),
        Show,
        Help,
        Quit,
    }

    pub const USAGE: &str = "commands: w/a/s/d | up/down/left/right | answer <text> | \
                             code <text> | cancel | restart | wait <secs> | tick [n] | \
                             layout [both|arrows|wasd] | show | help | quit";

    /// Parse a driver line; `None` means unrecognized
    pub fn parse_line(line: &str, settings: &Settings) -> Option<Line> {
        let line = line.trim();
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((w, r)) => (w, r.trim_start()),
            None => (line, ""),
        };

        let dir = match word.to_lowercase().as_str() {
            "up" => Some(Direction::Up),
            "down" => Some(Direction::Down),
            "left" => Some(Direction::Left),
            "right" => Some(Direction::Right),
            _ => None,
        };
        if let Some(dir) = dir {
            return Some(Line::Command(Command::Move(dir)));
        }
        if rest.is_empty() {
            if let Some(cmd) = map_key(word, settings.key_layout) {
                return Some(Line::Command(cmd));
            }
        }

        match word.to_lowercase().as_str() {
            "answer" => Some(Line::Command(Command::SubmitAnswer(rest.to_string()))),
            "code" => Some(Line::Command(Command::SubmitCode(rest.to_string()))),
            "cancel" => Some(Line::Command(Command::CancelPrompt)),
            "restart" => Some(Line::Command(Command::Restart)),
            "wait" => rest
                .parse::<f32>()
                .ok()
                .filter(|s| s.is_finite() && *s >= 0.0 && *s <= MAX_WAIT_SECS)
                .map(Line::Wait),
            "tick" if rest.is_empty() => Some(Line::Tick(1)),
            "tick" => rest
                .parse::<u32>()
                .ok()
                .filter(|n| *n <= MAX_TICKS)
                .map(Line::Tick),
            "layout" if rest.is_empty() => Some(Line::Layout(None)),
            "layout" => KeyLayout::parse(rest).map(|k| Line::Layout(Some(k))),
            "show" => Some(Line::Show),
            "help" => Some(Line::Help),
            "quit" | "exit" => Some(Line::Quit),
            _ => None,
        }
    }

    /// Run `n` countdown ticks directly, bypassing the clock
    pub fn run_ticks(state: &mut GameState, n: u32) {
        let movers_per_tick = (COUNTDOWN_DT / MOVER_DT).round() as u32;
        for _ in 0..n {
            for _ in 0..movers_per_tick {
                tick_movers(state);
            }
            tick_countdown(state);
        }
    }

    pub fn run(mut settings: Settings) -> io::Result<()> {
        let seed = settings.seed_or(
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .map(|d| d.as_millis() as u64)
                .unwrap_or_default(),
        );
        let mut state = GameState::new(seed);
        let mut clock = Clock::new();
        log::info!("Game initialized with seed: {}", seed);

        let stdin = io::stdin();
        let mut out = io::stdout().lock();
        writeln!(out, "{}", USAGE)?;

        for line in stdin.lock().lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            match parse_line(&line, &settings) {
                Some(Line::Command(cmd)) => {
                    handle_command(&mut state, &cmd);
                    if cmd == Command::Restart {
                        clock.reset();
                    }
                }
                Some(Line::Wait(secs)) => {
                    let steps = (secs / WAIT_STEP).round() as u32;
                    for _ in 0..steps {
                        clock.advance(&mut state, WAIT_STEP);
                    }
                }
                Some(Line::Tick(n)) => run_ticks(&mut state, n),
                Some(Line::Layout(layout)) => {
                    let layout = layout.unwrap_or_else(|| settings.key_layout.next());
                    settings.set_key_layout(layout);
                    writeln!(out, "keys: {}", layout.label())?;
                    continue;
                }
                Some(Line::Show) => {}
                Some(Line::Help) => {
                    writeln!(out, "{}", USAGE)?;
                    continue;
                }
                Some(Line::Quit) => break,
                None => {
                    writeln!(out, "unrecognized: {}\n{}", line.trim(), USAGE)?;
                    continue;
                }
            }

            let snap = take_snapshot(&mut state);
            for notice in &snap.notices {
                writeln!(out, "> {}", notice.message)?;
            }
            writeln!(out, "{}", snap.to_json())?;
        }
        Ok(())
    }

}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    let settings = escape_the_program::Settings::load();
    env_logger::Builder::new()
        .filter_level(settings.log_level().to_level_filter())
        .parse_default_env()
        .init();
    log::info!("Escape The Program (native) starting...");

    if let Err(e) = native::run(settings) {
        log::error!("Input error: {}", e);
        std::process::exit(1);
    }
}
