//! Axis-aligned rectangle geometry
//!
//! Every interaction in the room (walls, enemies, power-ups, the exit) is a
//! plain overlap test between two rectangles. A hit either blocks a move
//! outright or triggers an effect; there is no sliding or push-out.

use glam::IVec2;
use serde::{Deserialize, Serialize};

use crate::consts::PLAYER_SIZE;

/// An axis-aligned rectangle in room coordinates (top-left origin)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self { x, y, w, h }
    }

    /// The player's hitbox when standing at `pos`
    pub fn player_at(pos: IVec2) -> Self {
        Self::new(pos.x, pos.y, PLAYER_SIZE, PLAYER_SIZE)
    }

    #[inline]
    pub fn right(&self) -> i32 {
        self.x + self.w
    }

    #[inline]
    pub fn bottom(&self) -> i32 {
        self.y + self.h
    }
}

/// True iff the two rectangles intersect.
///
/// Edges are half-open: rectangles that merely touch do not overlap.
#[inline]
pub fn overlaps(a: &Rect, b: &Rect) -> bool {
    a.x < b.right() && a.right() > b.x && a.y < b.bottom() && a.bottom() > b.y
}
