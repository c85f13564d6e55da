//! Grid coordinates and projection constants for the staggered isometric map.
#![forbid(unsafe_code)]

use core::fmt;
use core::ops::{Add, AddAssign, Sub};

/// Screen depth of a block sprite in pixels (top edge to the middle border).
pub const VIEW_DEPTH: i32 = 100;
pub const VIEW_DEPTH2: i32 = VIEW_DEPTH / 2;
pub const VIEW_DEPTH4: i32 = VIEW_DEPTH / 4;

/// Width of a block sprite in pixels.
pub const VIEW_WIDTH: i32 = 200;
pub const VIEW_WIDTH2: i32 = VIEW_WIDTH / 2;
pub const VIEW_WIDTH4: i32 = VIEW_WIDTH / 4;

/// Height of the vertical face of a block sprite in pixels.
pub const VIEW_HEIGHT: i32 = 122;
pub const VIEW_HEIGHT2: i32 = VIEW_HEIGHT / 2;
pub const VIEW_HEIGHT4: i32 = VIEW_HEIGHT / 4;

/// Game space length of a tile diagonal. Equal to `VIEW_WIDTH` because x is not shortened.
pub const GAME_DIAGLENGTH: i32 = VIEW_WIDTH;
pub const GAME_DIAGLENGTH2: i32 = VIEW_WIDTH2;

/// Game space edge length of one block: `GAME_DIAGLENGTH / sqrt(2)`.
pub const GAME_EDGELENGTH: i32 = 141;
pub const GAME_EDGELENGTH2: i32 = GAME_EDGELENGTH / 2;

/// Factor by which the z axis is shortened by the projection angle.
pub const ZAXIS_SHORTENING: f32 = VIEW_HEIGHT as f32 / GAME_EDGELENGTH as f32;

/// One of the eight horizontal neighbours on the staggered grid, numbered
/// clockwise starting at the tile straight behind.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Neighbor {
    Back = 0,
    BackRight = 1,
    Right = 2,
    FrontRight = 3,
    Front = 4,
    FrontLeft = 5,
    Left = 6,
    BackLeft = 7,
}

impl Neighbor {
    pub const ALL: [Neighbor; 8] = [
        Neighbor::Back,
        Neighbor::BackRight,
        Neighbor::Right,
        Neighbor::FrontRight,
        Neighbor::Front,
        Neighbor::FrontLeft,
        Neighbor::Left,
        Neighbor::BackLeft,
    ];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    #[inline]
    pub fn from_index(i: usize) -> Option<Neighbor> {
        Self::ALL.get(i).copied()
    }

    #[inline]
    pub fn opposite(self) -> Neighbor {
        Self::ALL[(self.index() + 4) % 8]
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Coord {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl Coord {
    #[inline]
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    #[inline]
    pub fn offset(self, dx: i32, dy: i32, dz: i32) -> Self {
        Self::new(self.x + dx, self.y + dy, self.z + dz)
    }

    #[inline]
    pub fn below(self) -> Self {
        self.offset(0, 0, -1)
    }

    #[inline]
    pub fn above(self) -> Self {
        self.offset(0, 0, 1)
    }

    #[inline]
    fn odd_row(self) -> bool {
        self.y.rem_euclid(2) == 1
    }

    /// Step to a horizontal neighbour. Odd rows sit half a tile to the right,
    /// so diagonal steps only move along x on one row parity.
    pub fn neighbor(self, dir: Neighbor) -> Self {
        let odd = self.odd_row() as i32;
        let even = 1 - odd;
        match dir {
            Neighbor::Back => self.offset(0, -2, 0),
            Neighbor::BackRight => self.offset(odd, -1, 0),
            Neighbor::Right => self.offset(1, 0, 0),
            Neighbor::FrontRight => self.offset(odd, 1, 0),
            Neighbor::Front => self.offset(0, 2, 0),
            Neighbor::FrontLeft => self.offset(-even, 1, 0),
            Neighbor::Left => self.offset(-1, 0, 0),
            Neighbor::BackLeft => self.offset(-even, -1, 0),
        }
    }

    /// Centre of the tile in game space.
    pub fn to_point(self) -> Point {
        let shift = if self.odd_row() { GAME_DIAGLENGTH2 } else { 0 };
        Point::new(
            (self.x * GAME_DIAGLENGTH + shift) as f32,
            (self.y * GAME_DIAGLENGTH2) as f32,
            (self.z * GAME_EDGELENGTH) as f32,
        )
    }

    #[inline]
    pub fn view_x(self) -> i32 {
        self.to_point().view_x()
    }

    #[inline]
    pub fn view_y(self) -> i32 {
        self.to_point().view_y()
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

impl From<(i32, i32, i32)> for Coord {
    fn from(value: (i32, i32, i32)) -> Self {
        Self::new(value.0, value.1, value.2)
    }
}

impl From<Coord> for (i32, i32, i32) {
    fn from(value: Coord) -> Self {
        (value.x, value.y, value.z)
    }
}

/// Position in game space.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Point {
    #[inline]
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Scalar key for back-to-front sorting. Larger values are closer to the viewer.
    #[inline]
    pub fn depth(self) -> f32 {
        (self.y + self.z) * core::f32::consts::FRAC_1_SQRT_2
    }

    #[inline]
    pub fn view_x(self) -> i32 {
        self.x as i32
    }

    #[inline]
    pub fn view_y(self) -> i32 {
        (-self.y / 2.0 + self.z * ZAXIS_SHORTENING) as i32
    }
}

impl Add for Point {
    type Output = Point;
    #[inline]
    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl AddAssign for Point {
    #[inline]
    fn add_assign(&mut self, rhs: Point) {
        self.x += rhs.x;
        self.y += rhs.y;
        self.z += rhs.z;
    }
}

impl Sub for Point {
    type Output = Point;
    #[inline]
    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn back_and_front_skip_a_row() {
        let c = Coord::new(3, 4, 0);
        assert_eq!(c.neighbor(Neighbor::Back), Coord::new(3, 2, 0));
        assert_eq!(c.neighbor(Neighbor::Front), Coord::new(3, 6, 0));
    }

    #[test]
    fn diagonals_depend_on_row_parity() {
        let even = Coord::new(3, 4, 0);
        assert_eq!(even.neighbor(Neighbor::BackRight), Coord::new(3, 3, 0));
        assert_eq!(even.neighbor(Neighbor::BackLeft), Coord::new(2, 3, 0));
        let odd = Coord::new(3, 5, 0);
        assert_eq!(odd.neighbor(Neighbor::BackRight), Coord::new(4, 4, 0));
        assert_eq!(odd.neighbor(Neighbor::BackLeft), Coord::new(3, 4, 0));
    }

    #[test]
    fn negative_rows_use_euclidean_parity() {
        let c = Coord::new(0, -1, 0);
        assert_eq!(c.neighbor(Neighbor::BackRight), Coord::new(1, -2, 0));
    }

    #[test]
    fn odd_rows_are_shifted_half_a_tile() {
        let a = Coord::new(1, 0, 0).to_point();
        let b = Coord::new(1, 1, 0).to_point();
        assert_eq!(b.x - a.x, GAME_DIAGLENGTH2 as f32);
    }
}
