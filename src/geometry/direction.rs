use std::f64::consts::{FRAC_PI_4, SQRT_2};
use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use super::Vector2;
use crate::error::ParseError;

/// One of the eight compass octants a track may run in, clockwise from north.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[repr(u8)]
pub enum Direction {
    N = 0,
    NE = 1,
    E = 2,
    SE = 3,
    S = 4,
    SW = 5,
    W = 6,
    NW = 7,
}

const TOKENS: [(&str, Direction); 8] = [
    ("N", Direction::N),
    ("NE", Direction::NE),
    ("E", Direction::E),
    ("SE", Direction::SE),
    ("S", Direction::S),
    ("SW", Direction::SW),
    ("W", Direction::W),
    ("NW", Direction::NW),
];

/// `(1, 1)` scaled by `1 / |(1, 1)|`. One ulp below `FRAC_1_SQRT_2`, which
/// keeps bend intersections on a corner at exactly zero.
const DIAGONAL: f64 = 1.0 / SQRT_2;

const VECTORS: [Vector2; 8] = [
    Vector2::new(0.0, -1.0),
    Vector2::new(DIAGONAL, -DIAGONAL),
    Vector2::new(1.0, 0.0),
    Vector2::new(DIAGONAL, DIAGONAL),
    Vector2::new(0.0, 1.0),
    Vector2::new(-DIAGONAL, DIAGONAL),
    Vector2::new(-1.0, 0.0),
    Vector2::new(-DIAGONAL, -DIAGONAL),
];

impl Direction {
    pub const ALL: [Direction; 8] = [
        Direction::N,
        Direction::NE,
        Direction::E,
        Direction::SE,
        Direction::S,
        Direction::SW,
        Direction::W,
        Direction::NW,
    ];

    pub fn from_index(index: i32) -> Self {
        Self::ALL[index.rem_euclid(8) as usize]
    }

    pub fn index(self) -> i32 {
        self as i32
    }

    /// Unit vector pointing along this heading.
    pub fn vector(self) -> Vector2 {
        VECTORS[self as usize]
    }

    /// One octant anticlockwise.
    pub fn left(self) -> Self {
        Self::from_index(self.index() - 1)
    }

    /// One octant clockwise.
    pub fn right(self) -> Self {
        Self::from_index(self.index() + 1)
    }

    pub fn reverse(self) -> Self {
        Self::from_index(self.index() + 4)
    }

    /// Collapses opposite headings into `N`, `NE`, `E` or `SE`.
    pub fn normalized(self) -> Self {
        Self::from_index(self.index() % 4)
    }

    /// Heading in radians, zero at north.
    pub fn angle(self) -> f64 {
        f64::from(self.index()) * FRAC_PI_4
    }

    /// Signed number of octants to rotate from `self` to `other`, positive
    /// meaning clockwise. Always within `-4..=4`.
    pub fn delta(self, other: Self) -> i32 {
        let delta = other.index() - self.index();
        if delta > 4 {
            delta - 8
        } else if delta < -4 {
            delta + 8
        } else {
            delta
        }
    }

    pub fn token(self) -> &'static str {
        TOKENS[self as usize].0
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

impl FromStr for Direction {
    type Err = ParseError;

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        TOKENS
            .iter()
            .find(|(name, _)| *name == token)
            .map(|(_, direction)| *direction)
            .ok_or_else(|| ParseError::UnknownDirection(token.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn left_and_right_are_inverse() {
        for d in Direction::ALL {
            assert_eq!(d.left().right(), d);
            assert_eq!(d.right().left(), d);
        }
        assert_eq!(Direction::N.left(), Direction::NW);
        assert_eq!(Direction::NW.right(), Direction::N);
    }

    #[test]
    fn delta_is_signed_and_antisymmetric() {
        for d in Direction::ALL {
            assert_eq!(d.delta(d), 0);
            assert_eq!(d.delta(d.right()), 1);
            assert_eq!(d.delta(d.left()), -1);
            for e in Direction::ALL {
                let delta = d.delta(e);
                assert!((-4..=4).contains(&delta));
                assert_eq!(delta, -e.delta(d), "{d} -> {e}");
            }
        }
        assert_eq!(Direction::NW.delta(Direction::NE), 2);
        assert_eq!(Direction::NE.delta(Direction::NW), -2);
    }

    #[test]
    fn vectors_are_unit_length() {
        assert!(Direction::N.vector().approx_eq(Vector2::new(0.0, -1.0), 1e-12));
        assert!(Direction::E.vector().approx_eq(Vector2::new(1.0, 0.0), 1e-12));
        for d in Direction::ALL {
            assert!((d.vector().length() - 1.0).abs() < 1e-12, "{d}");
        }
    }

    #[test]
    fn normalized_collapses_opposites() {
        for d in Direction::ALL {
            assert_eq!(d.normalized(), d.reverse().normalized());
            assert!(d.normalized().index() < 4);
        }
        assert_eq!(Direction::SW.normalized(), Direction::NE);
    }

    #[test]
    fn parses_tokens_through_table() {
        assert_eq!("SE".parse::<Direction>(), Ok(Direction::SE));
        assert_eq!(
            "north".parse::<Direction>(),
            Err(ParseError::UnknownDirection("north".to_string()))
        );
        for d in Direction::ALL {
            assert_eq!(d.token().parse::<Direction>(), Ok(d));
        }
    }
}
