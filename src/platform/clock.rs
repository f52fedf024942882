//! Fixed-interval timers driven by frame deltas
//!
//! The countdown (1 Hz) and the moving obstacles (20 Hz) each keep their own
//! accumulator. Both are cleared whenever the game is not accepting ticks, so
//! closing a prompt never releases a burst of stored-up ticks.

use crate::consts::*;
use crate::sim::{GameState, tick_countdown, tick_movers};

/// Longest frame delta accepted, to ride out tab switches and hitches
const MAX_FRAME_DT: f32 = 0.1;

/// How many ticks of each kind ran during one `advance`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickCounts {
    pub countdown: u32,
    pub movers: u32,
}

/// Accumulates real time and converts it into game ticks
#[derive(Debug, Clone, Default)]
pub struct Clock {
    countdown_acc: f32,
    mover_acc: f32,
    level_index: usize,
}

impl Clock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop any partially accumulated time
    pub fn reset(&mut self) {
        self.countdown_acc = 0.0;
        self.mover_acc = 0.0;
    }

    /// Feed `dt` seconds of real time, running whatever ticks fall due
    pub fn advance(&mut self, state: &mut GameState, dt: f32) -> TickCounts {
        let mut counts = TickCounts::default();

        if state.level_index != self.level_index {
            self.level_index = state.level_index;
            self.reset();
        }
        if !state.is_active() {
            self.reset();
            return counts;
        }

        let dt = dt.clamp(0.0, MAX_FRAME_DT);
        self.mover_acc += dt;
        self.countdown_acc += dt;

        while self.mover_acc >= MOVER_DT && counts.movers < MAX_SUBSTEPS {
            tick_movers(state);
            self.mover_acc -= MOVER_DT;
            counts.movers += 1;
        }

        while self.countdown_acc >= COUNTDOWN_DT && counts.countdown < MAX_SUBSTEPS {
            tick_countdown(state);
            self.countdown_acc -= COUNTDOWN_DT;
            counts.countdown += 1;
            if !state.is_active() {
                self.reset();
                break;
            }
        }

        counts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{GamePhase, Prompt};

    fn run(clock: &mut Clock, state: &mut GameState, seconds: u32, fps: u32) -> TickCounts {
        let dt = 1.0 / fps as f32;
        let mut total = TickCounts::default();
        for _ in 0..seconds * fps {
            let c = clock.advance(state, dt);
            total.countdown += c.countdown;
            total.movers += c.movers;
        }
        total
    }

    #[test]
    fn test_countdown_rate() {
        let mut state = GameState::new(3);
        let mut clock = Clock::new();
        // Slightly over five seconds to absorb float drift
        let mut total = run(&mut clock, &mut state, 5, 60);
        total.countdown += clock.advance(&mut state, 0.05).countdown;
        assert_eq!(total.countdown, 5);
        assert_eq!(state.time_left, 25);
    }

    #[test]
    fn test_mover_rate() {
        let mut state = GameState::new(3);
        state.level_index = 1;
        let mut clock = Clock::new();
        let total = run(&mut clock, &mut state, 2, 40);
        // 20 Hz for two seconds, give or take one tick of float drift
        assert!((39..=40).contains(&total.movers));
    }

    #[test]
    fn test_paused_while_prompt_open() {
        let mut state = GameState::new(3);
        let mut clock = Clock::new();
        clock.advance(&mut state, 0.09);
        state.prompt = Some(Prompt::AwaitingCode);
        let total = run(&mut clock, &mut state, 3, 60);
        assert_eq!(total, TickCounts::default());
        assert_eq!(state.time_left, LEVEL_TIME_SECS);
    }

    #[test]
    fn test_stops_after_game_over() {
        let mut state = GameState::new(3);
        state.lives = 1;
        state.time_left = 2;
        let mut clock = Clock::new();
        run(&mut clock, &mut state, 4, 30);
        assert_eq!(state.phase, GamePhase::GameOver);
        assert_eq!(state.lives, 0);
    }

    #[test]
    fn test_large_delta_is_clamped() {
        let mut state = GameState::new(3);
        let mut clock = Clock::new();
        let counts = clock.advance(&mut state, 10.0);
        assert_eq!(counts.countdown, 0);
        assert_eq!(state.time_left, LEVEL_TIME_SECS);
    }
}
