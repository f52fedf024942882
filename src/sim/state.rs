//! Game state and core simulation types
//!
//! A `GameState` owns everything a session mutates: the level set with its
//! progress flags, the player, the countdown and any open prompt.

use glam::IVec2;
use serde::{Deserialize, Serialize};

use super::level::{ExitPlacer, Level, RandomExitPlacer, build_levels};
use crate::consts::*;

/// Current phase of the run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Active gameplay
    Playing,
    /// Out of lives; only a restart leaves this state
    GameOver,
    /// Last level's exit reached
    Complete,
}

/// A modal prompt waiting for text from the player
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Prompt {
    /// Trivia question for the power-up with this id
    AwaitingAnswer { powerup_id: String },
    /// Door unlock code request
    AwaitingCode,
}

/// User-facing outcome of a command or tick, drained by the front-end
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GameEvent {
    DoorLocked { remaining: usize },
    WrongCode,
    DoorUnlocked,
    CorrectAnswer,
    WrongAnswer,
    /// Advanced past a level (1-based number of the level just left)
    LevelComplete { level: usize },
    GameFinished,
    Died { lives_left: u32 },
    GameOver,
}

impl GameEvent {
    /// Text shown to the player
    pub fn message(&self) -> String {
        match self {
            GameEvent::DoorLocked { remaining } => format!(
                "Door is locked. Collect all power-ups first ({} left).",
                remaining
            ),
            GameEvent::WrongCode => "Wrong code.".to_string(),
            GameEvent::DoorUnlocked => "Door unlocked!".to_string(),
            GameEvent::CorrectAnswer => "Correct! Power-up applied.".to_string(),
            GameEvent::WrongAnswer => "Wrong answer.".to_string(),
            GameEvent::LevelComplete { level } => format!("Level {} complete!", level),
            GameEvent::GameFinished => "You finished all levels!".to_string(),
            GameEvent::Died { lives_left } => format!("You died! {} lives left.", lives_left),
            GameEvent::GameOver => "GAME OVER. You ran out of lives.".to_string(),
        }
    }
}

/// Complete game state (deterministic, serializable)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    /// Run seed used to place the exits
    pub seed: u64,
    /// Current level index (0-based)
    pub level_index: usize,
    /// Level set with live progress flags
    pub levels: Vec<Level>,
    /// Player top-left corner
    pub player: IVec2,
    /// Player lives
    pub lives: u32,
    /// Countdown seconds remaining
    pub time_left: u32,
    /// Current phase
    pub phase: GamePhase,
    /// Open prompt, if any
    pub prompt: Option<Prompt>,
    /// Notices produced since the last drain
    #[serde(skip)]
    pub events: Vec<GameEvent>,
    /// Levels as generated, used for restarts
    pristine: Vec<Level>,
}

impl GameState {
    /// Create a new game state with the given seed
    pub fn new(seed: u64) -> Self {
        let mut placer = RandomExitPlacer::from_seed(seed);
        let mut state = Self::with_placer(&mut placer);
        state.seed = seed;
        state
    }

    /// Create a game state whose exits come from `placer`
    pub fn with_placer(placer: &mut dyn ExitPlacer) -> Self {
        Self::with_levels(build_levels(placer))
    }

    /// Create a game state over an explicit level set
    pub fn with_levels(levels: Vec<Level>) -> Self {
        Self {
            seed: 0,
            level_index: 0,
            pristine: levels.clone(),
            levels,
            player: origin(),
            lives: START_LIVES,
            time_left: LEVEL_TIME_SECS,
            phase: GamePhase::Playing,
            prompt: None,
            events: Vec::new(),
        }
    }

    /// Reset the whole run. Exits stay where they were generated.
    pub fn restart(&mut self) {
        self.levels = self.pristine.clone();
        self.level_index = 0;
        self.player = origin();
        self.lives = START_LIVES;
        self.time_left = LEVEL_TIME_SECS;
        self.phase = GamePhase::Playing;
        self.prompt = None;
        self.events.clear();
    }

    /// Level the player is in
    pub fn current_level(&self) -> &Level {
        &self.levels[self.level_index]
    }

    /// Mutable access to the level the player is in
    pub fn current_level_mut(&mut self) -> &mut Level {
        &mut self.levels[self.level_index]
    }

    /// Whether this is the last level of the set
    pub fn on_last_level(&self) -> bool {
        self.level_index + 1 >= self.levels.len()
    }

    /// Ended runs accept nothing but a restart
    pub fn is_over(&self) -> bool {
        self.phase != GamePhase::Playing
    }

    /// Timers and movement run only while playing with no prompt open
    pub fn is_active(&self) -> bool {
        !self.is_over() && self.prompt.is_none()
    }

    /// Put the player back at the spawn point with a fresh countdown
    pub fn respawn(&mut self) {
        self.player = origin();
        self.time_left = LEVEL_TIME_SECS;
    }

    /// Queue a notice for the front-end
    pub fn push_event(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Take all notices produced since the last call
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}

/// Spawn point
pub fn origin() -> IVec2 {
    IVec2::splat(PLAYER_ORIGIN)
}
