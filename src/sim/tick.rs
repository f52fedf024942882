//! Command and timer handling
//!
//! Every external event (a key press, an answer, a timer firing) runs to
//! completion against `GameState` before the next one is admitted.

use glam::IVec2;
use serde::{Deserialize, Serialize};

use super::geometry::{Rect, overlaps};
use super::level::PowerUpKind;
use super::state::{GameEvent, GamePhase, GameState, Prompt, origin};
use crate::clamp_to_room;
use crate::consts::*;

/// One of the four movement directions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// Unit offset in room coordinates (y grows downward)
    pub fn offset(self) -> IVec2 {
        match self {
            Direction::Up => IVec2::new(0, -1),
            Direction::Down => IVec2::new(0, 1),
            Direction::Left => IVec2::new(-1, 0),
            Direction::Right => IVec2::new(1, 0),
        }
    }
}

/// Discrete player commands
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Command {
    Move(Direction),
    SubmitAnswer(String),
    SubmitCode(String),
    CancelPrompt,
    Restart,
}

/// What a single move attempt resolved to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    Moved,
    Blocked,
    Died,
    QuestionOpened,
    ExitLocked,
    CodeRequested,
    LevelAdvanced,
    Finished,
    Ignored,
}

/// Apply one command to the state
pub fn handle_command(state: &mut GameState, command: &Command) {
    match command {
        Command::Restart => {
            state.restart();
            log::info!("Game restarted");
        }
        Command::Move(dir) => {
            let outcome = try_move(state, *dir);
            log::debug!("Move {:?}: {:?}", dir, outcome);
        }
        Command::SubmitAnswer(text) => submit_answer(state, text),
        Command::SubmitCode(text) => submit_code(state, text),
        Command::CancelPrompt => cancel_prompt(state),
    }
}

/// Attempt one step in `dir`, applying the collision rules in priority order
pub fn try_move(state: &mut GameState, dir: Direction) -> MoveOutcome {
    if !state.is_active() {
        return MoveOutcome::Ignored;
    }

    let step = state.player + dir.offset() * STEP;
    let candidate = IVec2::new(clamp_to_room(step.x), clamp_to_room(step.y));
    let hitbox = Rect::player_at(candidate);
    let level = state.current_level();

    if level.enemies.iter().any(|e| overlaps(&hitbox, e)) {
        on_death(state);
        return MoveOutcome::Died;
    }

    let blocked = level.obstacles.iter().any(|o| overlaps(&hitbox, o))
        || level.moving.iter().any(|m| overlaps(&hitbox, &m.rect));
    if blocked {
        return MoveOutcome::Blocked;
    }

    // Movement onto a power-up waits until its question is resolved
    if let Some(pu) = level
        .powerups
        .iter()
        .find(|p| !p.collected && overlaps(&hitbox, &p.rect))
    {
        let powerup_id = pu.id.clone();
        state.prompt = Some(Prompt::AwaitingAnswer { powerup_id });
        return MoveOutcome::QuestionOpened;
    }

    if overlaps(&hitbox, &level.exit.rect) {
        return enter_exit(state);
    }

    state.player = candidate;
    MoveOutcome::Moved
}

fn enter_exit(state: &mut GameState) -> MoveOutcome {
    let level = state.current_level();
    if level.exit.locked {
        let remaining = level.remaining_powerups();
        if remaining > 0 {
            state.push_event(GameEvent::DoorLocked { remaining });
            return MoveOutcome::ExitLocked;
        }
        // Rarely reached: answering the last power-up already unlocks the door
        state.prompt = Some(Prompt::AwaitingCode);
        return MoveOutcome::CodeRequested;
    }

    let finished_level = state.level_index + 1;
    if state.on_last_level() {
        state.phase = GamePhase::Complete;
        state.push_event(GameEvent::GameFinished);
        log::info!("All {} levels finished", state.levels.len());
        return MoveOutcome::Finished;
    }

    state.level_index += 1;
    state.player = origin();
    state.time_left = LEVEL_TIME_SECS;
    state.push_event(GameEvent::LevelComplete {
        level: finished_level,
    });
    log::info!("Advanced to level {}", state.level_index + 1);
    MoveOutcome::LevelAdvanced
}

/// Resolve the open trivia prompt
pub fn submit_answer(state: &mut GameState, text: &str) {
    if state.is_over() {
        return;
    }
    let powerup_id = match &state.prompt {
        Some(Prompt::AwaitingAnswer { powerup_id }) => powerup_id.clone(),
        _ => {
            log::debug!("Answer submitted with no question open");
            return;
        }
    };
    state.prompt = None;

    let level = state.current_level_mut();
    let Some(pu) = level.powerup_mut(&powerup_id) else {
        log::warn!("Question open for unknown power-up {}", powerup_id);
        return;
    };

    if pu.collected || !pu.accepts(text) {
        state.push_event(GameEvent::WrongAnswer);
        return;
    }

    pu.collected = true;
    let kind = pu.kind;
    let unlocked_now = level.exit.locked && level.remaining_powerups() == 0;
    if unlocked_now {
        level.exit.unlock();
    }

    match kind {
        PowerUpKind::Time => state.time_left += TIME_BONUS_SECS,
        PowerUpKind::Life => state.lives += 1,
    }
    state.push_event(GameEvent::CorrectAnswer);
    log::info!("Power-up {} collected ({:?})", powerup_id, kind);

    if unlocked_now {
        state.push_event(GameEvent::DoorUnlocked);
        log::info!("Level {} exit unlocked automatically", state.level_index + 1);
    }
}

/// Resolve the open unlock-code prompt
pub fn submit_code(state: &mut GameState, text: &str) {
    if state.is_over() || state.prompt != Some(Prompt::AwaitingCode) {
        log::debug!("Code submitted with no code prompt open");
        return;
    }
    state.prompt = None;

    let level = state.current_level_mut();
    if level.remaining_powerups() == 0 && level.exit.code_matches(text) {
        level.exit.unlock();
        state.push_event(GameEvent::DoorUnlocked);
        log::info!("Level {} exit unlocked by code", state.level_index + 1);
    } else {
        state.push_event(GameEvent::WrongCode);
    }
}

/// Close any open prompt without effect
pub fn cancel_prompt(state: &mut GameState) {
    if state.is_over() {
        return;
    }
    state.prompt = None;
}

/// Lose a life; out of lives ends the run
pub fn on_death(state: &mut GameState) {
    state.lives = state.lives.saturating_sub(1);
    state.prompt = None;
    if state.lives == 0 {
        state.phase = GamePhase::GameOver;
        state.push_event(GameEvent::GameOver);
        log::info!("Game over on level {}", state.level_index + 1);
        return;
    }
    state.respawn();
    state.push_event(GameEvent::Died {
        lives_left: state.lives,
    });
    log::info!("Player died, {} lives left", state.lives);
}

/// One countdown second
pub fn tick_countdown(state: &mut GameState) {
    if !state.is_active() {
        return;
    }
    if state.time_left <= 1 {
        on_death(state);
        state.time_left = LEVEL_TIME_SECS;
    } else {
        state.time_left -= 1;
    }
}

/// One moving-obstacle step
pub fn tick_movers(state: &mut GameState) {
    if !state.is_active() {
        return;
    }
    for mover in &mut state.current_level_mut().moving {
        mover.step();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::level::FixedExitPlacer;

    /// Level 1 exit at (250, 250), level 2 exit at (240, 40)
    fn fixed_state() -> GameState {
        let mut placer = FixedExitPlacer::new(vec![IVec2::new(250, 250), IVec2::new(240, 40)]);
        GameState::with_placer(&mut placer)
    }

    fn collect(state: &mut GameState, id: &str, answer: &str) {
        state.prompt = Some(Prompt::AwaitingAnswer {
            powerup_id: id.to_string(),
        });
        submit_answer(state, answer);
    }

    #[test]
    fn test_free_move() {
        let mut state = fixed_state();
        assert_eq!(try_move(&mut state, Direction::Right), MoveOutcome::Moved);
        assert_eq!(state.player, IVec2::new(30, 10));
        assert_eq!(try_move(&mut state, Direction::Down), MoveOutcome::Moved);
        assert_eq!(state.player, IVec2::new(30, 30));
    }

    #[test]
    fn test_move_clamps_to_room() {
        let mut state = fixed_state();
        try_move(&mut state, Direction::Up);
        assert_eq!(state.player, IVec2::new(10, 0));
        try_move(&mut state, Direction::Left);
        assert_eq!(state.player, IVec2::new(0, 0));
    }

    #[test]
    fn test_obstacle_blocks_move() {
        let mut state = fixed_state();
        // Obstacle (90, 100, 60, 18); standing just above it
        state.player = IVec2::new(100, 60);
        assert_eq!(try_move(&mut state, Direction::Down), MoveOutcome::Blocked);
        assert_eq!(state.player, IVec2::new(100, 60));
    }

    #[test]
    fn test_enemy_kills() {
        let mut state = fixed_state();
        // Enemy (200, 80, 28, 28)
        state.player = IVec2::new(170, 80);
        assert_eq!(try_move(&mut state, Direction::Right), MoveOutcome::Died);
        assert_eq!(state.lives, 2);
        assert_eq!(state.player, origin());
        assert_eq!(state.time_left, LEVEL_TIME_SECS);
        assert_eq!(state.drain_events(), vec![GameEvent::Died { lives_left: 2 }]);
    }

    #[test]
    fn test_powerup_opens_question_without_moving() {
        let mut state = fixed_state();
        // l1p1 at (40, 220, 26, 26)
        state.player = IVec2::new(40, 180);
        assert_eq!(try_move(&mut state, Direction::Down), MoveOutcome::QuestionOpened);
        assert_eq!(state.player, IVec2::new(40, 180));
        assert_eq!(
            state.prompt,
            Some(Prompt::AwaitingAnswer {
                powerup_id: "l1p1".to_string()
            })
        );

        // Input is ignored while the question is open
        assert_eq!(try_move(&mut state, Direction::Up), MoveOutcome::Ignored);
        assert_eq!(state.player, IVec2::new(40, 180));
    }

    #[test]
    fn test_locked_exit_reports_remaining() {
        let mut state = fixed_state();
        state.player = IVec2::new(230, 230);
        assert_eq!(try_move(&mut state, Direction::Right), MoveOutcome::ExitLocked);
        assert_eq!(state.player, IVec2::new(230, 230));
        assert_eq!(
            state.drain_events(),
            vec![GameEvent::DoorLocked { remaining: 2 }]
        );
        assert!(state.prompt.is_none());
    }

    #[test]
    fn test_correct_answer_grants_time() {
        let mut state = fixed_state();
        collect(&mut state, "l1p1", "  5 ");
        assert_eq!(state.time_left, 40);
        assert!(state.current_level().powerups[0].collected);
        assert!(state.prompt.is_none());
        assert_eq!(state.drain_events(), vec![GameEvent::CorrectAnswer]);
    }

    #[test]
    fn test_wrong_answer_changes_nothing() {
        let mut state = fixed_state();
        collect(&mut state, "l1p1", "six");
        assert_eq!(state.time_left, 30);
        assert_eq!(state.lives, 3);
        assert!(!state.current_level().powerups[0].collected);
        assert!(state.prompt.is_none());
        assert_eq!(state.drain_events(), vec![GameEvent::WrongAnswer]);
    }

    #[test]
    fn test_life_powerup() {
        let mut state = fixed_state();
        collect(&mut state, "l1p2", "LET");
        assert_eq!(state.lives, 4);
    }

    #[test]
    fn test_last_powerup_auto_unlocks() {
        let mut state = fixed_state();
        collect(&mut state, "l1p1", "5");
        assert!(state.current_level().exit.locked);
        collect(&mut state, "l1p2", "let");
        assert!(!state.current_level().exit.locked);
        assert_eq!(
            state.drain_events(),
            vec![
                GameEvent::CorrectAnswer,
                GameEvent::CorrectAnswer,
                GameEvent::DoorUnlocked
            ]
        );
    }

    #[test]
    fn test_reanswering_collected_has_no_effect() {
        let mut state = fixed_state();
        collect(&mut state, "l1p1", "5");
        collect(&mut state, "l1p1", "5");
        assert_eq!(state.time_left, 40);
        assert!(state.current_level().powerups[0].collected);
    }

    #[test]
    fn test_cancel_closes_prompt() {
        let mut state = fixed_state();
        state.prompt = Some(Prompt::AwaitingAnswer {
            powerup_id: "l1p1".to_string(),
        });
        handle_command(&mut state, &Command::CancelPrompt);
        assert!(state.prompt.is_none());
        assert!(!state.current_level().powerups[0].collected);
        assert!(state.drain_events().is_empty());
    }

    #[test]
    fn test_code_path_unlocks() {
        let mut state = fixed_state();
        for p in &mut state.current_level_mut().powerups {
            p.collected = true;
        }
        state.player = IVec2::new(230, 230);
        assert_eq!(try_move(&mut state, Direction::Right), MoveOutcome::CodeRequested);
        assert_eq!(state.prompt, Some(Prompt::AwaitingCode));

        handle_command(&mut state, &Command::SubmitCode("nope".to_string()));
        assert!(state.current_level().exit.locked);
        assert!(state.prompt.is_none());

        try_move(&mut state, Direction::Right);
        handle_command(&mut state, &Command::SubmitCode("unlockDoor()".to_string()));
        assert!(!state.current_level().exit.locked);
        assert_eq!(state.player, IVec2::new(230, 230));
        assert_eq!(
            state.drain_events(),
            vec![GameEvent::WrongCode, GameEvent::DoorUnlocked]
        );
    }

    #[test]
    fn test_unlocked_exit_advances_level() {
        let mut state = fixed_state();
        collect(&mut state, "l1p1", "5");
        collect(&mut state, "l1p2", "let");
        state.drain_events();
        state.player = IVec2::new(230, 230);
        state.time_left = 12;

        assert_eq!(try_move(&mut state, Direction::Right), MoveOutcome::LevelAdvanced);
        assert_eq!(state.level_index, 1);
        assert_eq!(state.player, origin());
        assert_eq!(state.time_left, LEVEL_TIME_SECS);
        assert_eq!(
            state.drain_events(),
            vec![GameEvent::LevelComplete { level: 1 }]
        );
    }

    #[test]
    fn test_last_exit_finishes_game() {
        let mut state = fixed_state();
        state.level_index = 1;
        state.current_level_mut().exit.unlock();
        // Level 2 exit at (240, 40)
        state.player = IVec2::new(200, 40);
        assert_eq!(try_move(&mut state, Direction::Right), MoveOutcome::Finished);
        assert_eq!(state.phase, GamePhase::Complete);
        assert_eq!(state.drain_events(), vec![GameEvent::GameFinished]);

        assert_eq!(try_move(&mut state, Direction::Left), MoveOutcome::Ignored);
        let time = state.time_left;
        tick_countdown(&mut state);
        assert_eq!(state.time_left, time);

        handle_command(&mut state, &Command::Restart);
        assert_eq!(state.phase, GamePhase::Playing);
        assert_eq!(state.level_index, 0);
        assert!(state.is_active());
    }

    #[test]
    fn test_countdown_death_and_game_over() {
        let mut state = fixed_state();
        state.lives = 1;
        state.time_left = 1;
        tick_countdown(&mut state);
        assert_eq!(state.phase, GamePhase::GameOver);
        assert_eq!(state.lives, 0);
        assert_eq!(state.drain_events(), vec![GameEvent::GameOver]);

        // Timers and input are halted
        tick_countdown(&mut state);
        assert_eq!(state.time_left, LEVEL_TIME_SECS);
        assert_eq!(try_move(&mut state, Direction::Right), MoveOutcome::Ignored);
        handle_command(&mut state, &Command::SubmitAnswer("5".to_string()));
        assert!(state.drain_events().is_empty());

        handle_command(&mut state, &Command::Restart);
        assert_eq!(state.phase, GamePhase::Playing);
        assert_eq!(state.lives, START_LIVES);
    }

    #[test]
    fn test_countdown_decrements() {
        let mut state = fixed_state();
        tick_countdown(&mut state);
        assert_eq!(state.time_left, 29);
        state.time_left = 1;
        tick_countdown(&mut state);
        assert_eq!(state.lives, 2);
        assert_eq!(state.time_left, LEVEL_TIME_SECS);
    }

    #[test]
    fn test_death_keeps_level_progress() {
        let mut state = fixed_state();
        collect(&mut state, "l1p1", "5");
        on_death(&mut state);
        assert!(state.current_level().powerups[0].collected);
        assert_eq!(state.current_level().remaining_powerups(), 1);
    }

    #[test]
    fn test_timers_pause_during_prompt() {
        let mut state = fixed_state();
        state.level_index = 1;
        state.prompt = Some(Prompt::AwaitingAnswer {
            powerup_id: "l2p1".to_string(),
        });
        let x = state.current_level().moving[0].rect.x;
        tick_movers(&mut state);
        tick_countdown(&mut state);
        assert_eq!(state.current_level().moving[0].rect.x, x);
        assert_eq!(state.time_left, LEVEL_TIME_SECS);
    }

    #[test]
    fn test_moving_obstacle_blocks() {
        let mut state = fixed_state();
        state.level_index = 1;
        // Mover (150, 100, 40, 16); stand above it
        state.player = IVec2::new(160, 60);
        assert_eq!(try_move(&mut state, Direction::Down), MoveOutcome::Blocked);
        tick_movers(&mut state);
        assert_eq!(state.current_level().moving[0].rect.x, 152);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        fn direction() -> impl Strategy<Value = Direction> {
            prop_oneof![
                Just(Direction::Up),
                Just(Direction::Down),
                Just(Direction::Left),
                Just(Direction::Right),
            ]
        }

        fn command() -> impl Strategy<Value = Command> {
            prop_oneof![
                4 => direction().prop_map(Command::Move),
                1 => prop_oneof![Just("5"), Just("let"), Just("six"), Just("")]
                    .prop_map(|s| Command::SubmitAnswer(s.to_string())),
                1 => prop_oneof![Just("unlockDoor()"), Just("x")]
                    .prop_map(|s| Command::SubmitCode(s.to_string())),
                1 => Just(Command::CancelPrompt),
            ]
        }

        proptest! {
            #[test]
            fn rejected_moves_never_move_player(
                x in 0i32..=270,
                y in 0i32..=270,
                dir in direction(),
            ) {
                let mut state = fixed_state();
                state.player = IVec2::new(x, y);
                let before = state.player;
                let outcome = try_move(&mut state, dir);
                match outcome {
                    MoveOutcome::Blocked
                    | MoveOutcome::QuestionOpened
                    | MoveOutcome::ExitLocked
                    | MoveOutcome::CodeRequested => prop_assert_eq!(state.player, before),
                    _ => {}
                }
            }

            #[test]
            fn player_stays_in_room(
                seed in 0u64..50,
                commands in proptest::collection::vec(command(), 1..120),
            ) {
                let mut state = GameState::new(seed);
                for cmd in &commands {
                    handle_command(&mut state, cmd);
                    tick_movers(&mut state);
                    prop_assert!(state.player.x >= 0 && state.player.x <= ROOM_SIZE - PLAYER_SIZE);
                    prop_assert!(state.player.y >= 0 && state.player.y <= ROOM_SIZE - PLAYER_SIZE);
                }
            }

            #[test]
            fn collected_and_unlocked_are_sticky(
                seed in 0u64..50,
                commands in proptest::collection::vec(command(), 1..200),
            ) {
                let mut state = GameState::new(seed);
                let mut level = state.level_index;
                let mut collected: Vec<bool> = state.current_level().powerups.iter().map(|p| p.collected).collect();
                let mut unlocked = !state.current_level().exit.locked;

                for cmd in &commands {
                    handle_command(&mut state, cmd);
                    tick_countdown(&mut state);
                    if state.level_index != level {
                        level = state.level_index;
                        collected = state.current_level().powerups.iter().map(|p| p.collected).collect();
                        unlocked = !state.current_level().exit.locked;
                        continue;
                    }
                    for (was, pu) in collected.iter_mut().zip(&state.current_level().powerups) {
                        prop_assert!(!*was || pu.collected);
                        *was = pu.collected;
                    }
                    prop_assert!(!unlocked || !state.current_level().exit.locked);
                    unlocked = !state.current_level().exit.locked;
                }
            }
        }
    }
}
