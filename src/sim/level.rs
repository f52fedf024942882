//! Level layouts
//!
//! Levels are hand-authored. The only randomized piece is where each level's
//! exit door sits, chosen once when the level set is built.

use glam::IVec2;
use rand::Rng;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::geometry::Rect;
use crate::consts::*;

/// What a power-up grants when its question is answered correctly
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PowerUpKind {
    /// Adds TIME_BONUS_SECS to the countdown
    Time,
    /// Adds one life
    Life,
}

/// A trivia collectible
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PowerUp {
    pub id: String,
    pub kind: PowerUpKind,
    pub rect: Rect,
    pub question: String,
    pub answer: String,
    /// Sticky: once set it is never cleared for the life of the level
    pub collected: bool,
}

impl PowerUp {
    fn new(id: &str, kind: PowerUpKind, x: i32, y: i32, question: &str, answer: &str) -> Self {
        Self {
            id: id.to_string(),
            kind,
            rect: Rect::new(x, y, POWERUP_SIZE, POWERUP_SIZE),
            question: question.to_string(),
            answer: answer.to_string(),
            collected: false,
        }
    }

    /// Case-insensitive comparison with surrounding whitespace ignored
    pub fn accepts(&self, submitted: &str) -> bool {
        submitted.trim().to_lowercase() == self.answer.trim().to_lowercase()
    }
}

/// An obstacle sliding horizontally between the room walls
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MovingObstacle {
    pub rect: Rect,
    /// Horizontal velocity in units per mover tick
    pub dx: i32,
}

impl MovingObstacle {
    pub fn new(rect: Rect, dx: i32) -> Self {
        Self { rect, dx }
    }

    /// Advance one mover tick, bouncing off either wall
    pub fn step(&mut self) {
        self.rect.x += self.dx;
        if self.rect.x <= 0 || self.rect.right() >= ROOM_SIZE {
            self.dx = -self.dx;
        }
    }
}

/// The level's exit door
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Exit {
    pub rect: Rect,
    pub locked: bool,
    pub code: String,
}

impl Exit {
    pub fn new(pos: IVec2) -> Self {
        Self {
            rect: Rect::new(pos.x, pos.y, EXIT_SIZE, EXIT_SIZE),
            locked: true,
            code: UNLOCK_CODE.to_string(),
        }
    }

    /// Unlock the door. There is no way to lock it again.
    pub fn unlock(&mut self) {
        self.locked = false;
    }

    /// Exact comparison, no trimming or case folding
    pub fn code_matches(&self, submitted: &str) -> bool {
        submitted == self.code
    }
}

/// One room's worth of layout plus its mutable progress flags
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Level {
    pub obstacles: Vec<Rect>,
    pub moving: Vec<MovingObstacle>,
    pub enemies: Vec<Rect>,
    pub powerups: Vec<PowerUp>,
    pub exit: Exit,
}

impl Level {
    /// Number of power-ups still waiting to be answered
    pub fn remaining_powerups(&self) -> usize {
        self.powerups.iter().filter(|p| !p.collected).count()
    }

    pub fn powerup(&self, id: &str) -> Option<&PowerUp> {
        self.powerups.iter().find(|p| p.id == id)
    }

    pub fn powerup_mut(&mut self, id: &str) -> Option<&mut PowerUp> {
        self.powerups.iter_mut().find(|p| p.id == id)
    }
}

/// Source of exit door coordinates.
///
/// Kept behind a trait so tests can pin exits to known spots.
pub trait ExitPlacer {
    /// Top-left corner for the next level's exit
    fn place_exit(&mut self) -> IVec2;
}

/// Places exits uniformly inside the room, EXIT_MARGIN away from the walls
#[derive(Debug, Clone)]
pub struct RandomExitPlacer<R: Rng> {
    rng: R,
}

impl<R: Rng> RandomExitPlacer<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl RandomExitPlacer<Pcg32> {
    /// Deterministic placer for a run seed
    pub fn from_seed(seed: u64) -> Self {
        Self::new(Pcg32::seed_from_u64(seed))
    }
}

impl<R: Rng> ExitPlacer for RandomExitPlacer<R> {
    fn place_exit(&mut self) -> IVec2 {
        let max = ROOM_SIZE - EXIT_MARGIN;
        IVec2::new(
            self.rng.random_range(EXIT_MARGIN..max),
            self.rng.random_range(EXIT_MARGIN..max),
        )
    }
}

/// Hands out a fixed list of exit positions, cycling when exhausted
#[derive(Debug, Clone)]
pub struct FixedExitPlacer {
    positions: Vec<IVec2>,
    next: usize,
}

impl FixedExitPlacer {
    pub fn new(positions: Vec<IVec2>) -> Self {
        Self { positions, next: 0 }
    }
}

impl ExitPlacer for FixedExitPlacer {
    fn place_exit(&mut self) -> IVec2 {
        if self.positions.is_empty() {
            return IVec2::splat(ROOM_SIZE - EXIT_MARGIN);
        }
        let pos = self.positions[self.next % self.positions.len()];
        self.next += 1;
        pos
    }
}

/// Number of hand-authored levels
pub const LEVEL_COUNT: usize = 2;

/// Build the full level set, asking the placer for one exit per level
pub fn build_levels(placer: &mut dyn ExitPlacer) -> Vec<Level> {
    let levels = vec![level_one(placer.place_exit()), level_two(placer.place_exit())];
    for (i, level) in levels.iter().enumerate() {
        log::debug!(
            "Level {} exit at ({}, {})",
            i + 1,
            level.exit.rect.x,
            level.exit.rect.y
        );
    }
    levels
}

fn level_one(exit: IVec2) -> Level {
    Level {
        obstacles: vec![Rect::new(90, 100, 60, 18), Rect::new(160, 200, 18, 60)],
        moving: Vec::new(),
        enemies: vec![Rect::new(200, 80, 28, 28)],
        powerups: vec![
            PowerUp::new(
                "l1p1",
                PowerUpKind::Time,
                40,
                220,
                "What is 2 + 3 in JavaScript?",
                "5",
            ),
            PowerUp::new(
                "l1p2",
                PowerUpKind::Life,
                220,
                30,
                "Which keyword declares a variable in JS?",
                "let",
            ),
        ],
        exit: Exit::new(exit),
    }
}

fn level_two(exit: IVec2) -> Level {
    Level {
        obstacles: vec![Rect::new(50, 50, 140, 18)],
        moving: vec![MovingObstacle::new(Rect::new(150, 100, 40, 16), 2)],
        enemies: vec![Rect::new(200, 150, 28, 28)],
        powerups: vec![
            PowerUp::new(
                "l2p1",
                PowerUpKind::Time,
                120,
                200,
                "Which operator is strict equality in JS?",
                "===",
            ),
            PowerUp::new("l2p2", PowerUpKind::Life, 60, 180, "What is 1 + 1?", "2"),
        ],
        exit: Exit::new(exit),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_answer_matching() {
        let p = PowerUp::new("t", PowerUpKind::Time, 0, 0, "q", "let");
        assert!(p.accepts("let"));
        assert!(p.accepts("  LeT \n"));
        assert!(!p.accepts("var"));
        assert!(!p.accepts(""));
    }

    #[test]
    fn test_code_is_exact() {
        let exit = Exit::new(IVec2::new(100, 100));
        assert!(exit.code_matches("unlockDoor()"));
        assert!(!exit.code_matches("unlockdoor()"));
        assert!(!exit.code_matches(" unlockDoor()"));
    }

    #[test]
    fn test_seeded_exits_are_deterministic() {
        let a = build_levels(&mut RandomExitPlacer::from_seed(42));
        let b = build_levels(&mut RandomExitPlacer::from_seed(42));
        for (la, lb) in a.iter().zip(b.iter()) {
            assert_eq!(la.exit.rect, lb.exit.rect);
        }
    }

    #[test]
    fn test_random_exits_respect_margin() {
        for seed in 0..200 {
            for level in build_levels(&mut RandomExitPlacer::from_seed(seed)) {
                let r = level.exit.rect;
                assert!(r.x >= EXIT_MARGIN && r.x < ROOM_SIZE - EXIT_MARGIN);
                assert!(r.y >= EXIT_MARGIN && r.y < ROOM_SIZE - EXIT_MARGIN);
            }
        }
    }

    #[test]
    fn test_level_layouts() {
        let mut placer = FixedExitPlacer::new(vec![IVec2::new(250, 250), IVec2::new(240, 40)]);
        let levels = build_levels(&mut placer);
        assert_eq!(levels.len(), LEVEL_COUNT);
        assert_eq!(levels[0].exit.rect, Rect::new(250, 250, EXIT_SIZE, EXIT_SIZE));
        assert_eq!(levels[1].exit.rect, Rect::new(240, 40, EXIT_SIZE, EXIT_SIZE));
        assert!(levels.iter().all(|l| l.exit.locked));
        assert_eq!(levels[0].remaining_powerups(), 2);
        assert!(levels[0].moving.is_empty());
        assert_eq!(levels[1].moving.len(), 1);
    }

    #[test]
    fn test_mover_bounces_at_walls() {
        let mut m = MovingObstacle::new(Rect::new(150, 100, 40, 16), 2);
        let mut ticks = 0;
        while m.dx > 0 {
            m.step();
            ticks += 1;
            if m.dx > 0 {
                assert!(m.rect.right() < ROOM_SIZE);
            }
        }
        // 150 -> 260 takes 55 ticks, at which point x + w == 300
        assert_eq!(ticks, 55);
        assert_eq!(m.rect.right(), ROOM_SIZE);

        while m.dx < 0 {
            m.step();
            if m.dx < 0 {
                assert!(m.rect.x > 0);
            }
        }
        assert_eq!(m.rect.x, 0);
    }
}
