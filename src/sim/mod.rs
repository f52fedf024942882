//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Discrete commands and fixed-interval ticks only
//! - Seeded RNG only
//! - No rendering or platform dependencies

pub mod geometry;
pub mod level;
pub mod snapshot;
pub mod state;
pub mod tick;

pub use geometry::{Rect, overlaps};
pub use level::{
    Exit, ExitPlacer, FixedExitPlacer, LEVEL_COUNT, Level, MovingObstacle, PowerUp, PowerUpKind,
    RandomExitPlacer, build_levels,
};
pub use snapshot::{GameSnapshot, Notice, PromptView, snapshot, take_snapshot};
pub use state::{GameEvent, GamePhase, GameState, Prompt};
pub use tick::{
    Command, Direction, MoveOutcome, handle_command, on_death, tick_countdown, tick_movers,
    try_move,
};
