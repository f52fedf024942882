//! Renderer-facing view of the game state
//!
//! The front-end never reads `GameState` directly; it draws whatever the
//! latest snapshot says and shows the drained notices.

use serde::Serialize;

use super::geometry::Rect;
use super::level::PowerUpKind;
use super::state::{GameEvent, GamePhase, GameState, Prompt};

/// An uncollected power-up as drawn
#[derive(Debug, Clone, Serialize)]
pub struct PowerUpView {
    pub id: String,
    pub kind: PowerUpKind,
    pub rect: Rect,
}

/// The exit door as drawn
#[derive(Debug, Clone, Serialize)]
pub struct ExitView {
    pub rect: Rect,
    pub locked: bool,
}

/// Text the open prompt should display
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PromptView {
    Question { text: String },
    Code { text: String },
}

/// A notice paired with its display text
#[derive(Debug, Clone, Serialize)]
pub struct Notice {
    pub event: GameEvent,
    pub message: String,
}

/// Everything needed to draw one frame
#[derive(Debug, Clone, Serialize)]
pub struct GameSnapshot {
    pub player: Rect,
    pub lives: u32,
    pub time_left: u32,
    /// 1-based level number for display
    pub level: usize,
    pub obstacles: Vec<Rect>,
    pub moving: Vec<Rect>,
    pub enemies: Vec<Rect>,
    pub powerups: Vec<PowerUpView>,
    pub exit: ExitView,
    pub prompt: Option<PromptView>,
    pub phase: GamePhase,
    pub notices: Vec<Notice>,
}

/// Build a snapshot and drain pending notices into it
pub fn take_snapshot(state: &mut GameState) -> GameSnapshot {
    let notices = state
        .drain_events()
        .into_iter()
        .map(|event| Notice {
            message: event.message(),
            event,
        })
        .collect();
    let mut snapshot = snapshot(state);
    snapshot.notices = notices;
    snapshot
}

/// Build a snapshot without touching pending notices
pub fn snapshot(state: &GameState) -> GameSnapshot {
    let level = state.current_level();
    let prompt = state.prompt.as_ref().map(|p| match p {
        Prompt::AwaitingAnswer { powerup_id } => PromptView::Question {
            text: level
                .powerup(powerup_id)
                .map(|pu| pu.question.clone())
                .unwrap_or_default(),
        },
        Prompt::AwaitingCode => PromptView::Code {
            text: "Enter code to unlock door:".to_string(),
        },
    });

    GameSnapshot {
        player: Rect::player_at(state.player),
        lives: state.lives,
        time_left: state.time_left,
        level: state.level_index + 1,
        obstacles: level.obstacles.clone(),
        moving: level.moving.iter().map(|m| m.rect).collect(),
        enemies: level.enemies.clone(),
        powerups: level
            .powerups
            .iter()
            .filter(|p| !p.collected)
            .map(|p| PowerUpView {
                id: p.id.clone(),
                kind: p.kind,
                rect: p.rect,
            })
            .collect(),
        exit: ExitView {
            rect: level.exit.rect,
            locked: level.exit.locked,
        },
        prompt,
        phase: state.phase,
        notices: Vec::new(),
    }
}

impl GameSnapshot {
    /// JSON form handed to the DOM layer / printed by the native driver
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|e| {
            log::warn!("Snapshot serialization failed: {}", e);
            "{}".to_string()
        })
    }
}
