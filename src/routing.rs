use serde::Serialize;

use crate::geometry::{Direction, Vector2};

// ── Router limits ───────────────────────────────────────────────────
/// Path entries (start anchor included) after which the router gives up
/// once no routing pattern applies.
pub const MAX_CORNERS: usize = 10;
/// Hard cap on routing steps, reached only when patterns keep matching.
pub const MAX_ROUTE_STEPS: usize = 64;
/// Bend intersections closer than this to the current point count as
/// behind it.
const BEND_EPSILON: f64 = 1e-9;
/// Default shortest straight run between two corners.
pub const DEFAULT_MIN_LENGTH: f64 = 15.0;

/// Which way a route bends next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnSide {
    Left,
    Right,
}

impl TurnSide {
    /// Rotates `direction` one octant towards this side.
    pub fn bend(self, direction: Direction) -> Direction {
        match self {
            TurnSide::Left => direction.left(),
            TurnSide::Right => direction.right(),
        }
    }

    fn bend_times(self, direction: Direction, times: usize) -> Direction {
        (0..times).fold(direction, |dir, _| self.bend(dir))
    }
}

/// A path vertex and the heading of the run that arrives at it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RoutedPoint {
    pub point: Vector2,
    pub incoming: Option<Direction>,
}

impl RoutedPoint {
    fn anchor(point: Vector2) -> Self {
        Self {
            point,
            incoming: None,
        }
    }

    fn reached(point: Vector2, incoming: Direction) -> Self {
        Self {
            point,
            incoming: Some(incoming),
        }
    }
}

/// A routed path. Always holds at least two points.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Path {
    points: Vec<RoutedPoint>,
    truncated: bool,
}

impl Path {
    /// Builds a complete path from routed points; `None` for fewer than two.
    pub fn from_points(points: Vec<RoutedPoint>) -> Option<Self> {
        (points.len() >= 2).then_some(Self {
            points,
            truncated: false,
        })
    }

    pub fn points(&self) -> &[RoutedPoint] {
        &self.points
    }

    /// Set when routing gave up before reaching the end point.
    pub fn is_truncated(&self) -> bool {
        self.truncated
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn start(&self) -> Vector2 {
        self.points[0].point
    }

    pub fn end(&self) -> Vector2 {
        self.points[self.points.len() - 1].point
    }

    /// Interior vertices, each paired with the heading leaving it.
    pub fn corners(&self) -> impl Iterator<Item = (Vector2, Direction, Direction)> + '_ {
        self.points
            .windows(2)
            .skip(1)
            .filter_map(|pair| match (pair[0].incoming, pair[1].incoming) {
                (Some(incoming), Some(outgoing)) => Some((pair[0].point, incoming, outgoing)),
                _ => None,
            })
    }
}

/// Connects two platform ends with straight runs in octant headings.
#[derive(Debug, Clone, Copy)]
pub struct Router {
    pub min_length: f64,
}

impl Default for Router {
    fn default() -> Self {
        Self {
            min_length: DEFAULT_MIN_LENGTH,
        }
    }
}

impl Router {
    pub fn new(min_length: f64) -> Self {
        Self { min_length }
    }

    pub fn route(
        &self,
        start_point: Vector2,
        start_dir: Direction,
        end_point: Vector2,
        end_dir: Direction,
    ) -> Path {
        let mut points = vec![RoutedPoint::anchor(start_point)];
        let mut point = start_point;
        let mut dir = start_dir;
        let mut truncated = false;
        let mut steps = 0;

        if point == end_point {
            points.push(RoutedPoint::reached(end_point, dir));
        }

        while point != end_point {
            steps += 1;
            if steps > MAX_ROUTE_STEPS {
                truncated = true;
                break;
            }

            let toend = end_point - point;
            if round1(toend.proj_onto(dir.vector())) == round1(toend.length()) {
                points.push(RoutedPoint::reached(end_point, dir));
                break;
            }

            // Left only wins when strictly ahead; ties go right.
            let left_proj = toend.proj_onto(dir.left().vector());
            let right_proj = toend.proj_onto(dir.right().vector());
            let (side, proj_value) = if left_proj > right_proj {
                (TurnSide::Left, left_proj)
            } else {
                (TurnSide::Right, right_proj)
            };
            let bent = side.bend(dir);

            let corner = if proj_value > 0.0 && end_dir == bent {
                match bend_intersection(point, dir, side, 1, end_point) {
                    Some(h) if h > BEND_EPSILON => {
                        points.push(RoutedPoint::reached(point + dir.vector() * h, dir));
                        points.push(RoutedPoint::reached(end_point, bent));
                        break;
                    }
                    _ => self.min_run(point, dir),
                }
            } else if proj_value > 0.0 && end_dir == side.bend_times(dir, 2) {
                match bend_intersection(point, dir, side, 2, end_point) {
                    Some(h) if h > BEND_EPSILON => {
                        let first = dir.vector();
                        let second = side.bend_times(dir, 2).vector();
                        let intersects = point + first * h;
                        // Stop short so both halves of the turn have room.
                        let offset = (end_point - intersects)
                            .proj_onto(second)
                            .abs()
                            .min((start_point - intersects).proj_onto(first).abs());
                        intersects - first * (offset - self.min_length)
                    }
                    _ => self.min_run(point, dir),
                }
            } else if proj_value > 0.0 && end_dir == dir {
                let mid = (start_point + end_point) / 2.0;
                match bend_intersection(point, dir, side, 1, mid) {
                    Some(h) => point + dir.vector() * h,
                    None => self.min_run(point, dir),
                }
            } else if points.len() > MAX_CORNERS {
                truncated = true;
                break;
            } else {
                self.min_run(point, dir)
            };

            points.push(RoutedPoint::reached(corner, dir));
            point = corner;
            dir = bent;
        }

        if truncated {
            log::warn!(
                "gave up routing {start_point} {start_dir} -> {end_point} {end_dir} after {} corners",
                points.len() - 1
            );
        }

        Path { points, truncated }
    }

    fn min_run(&self, point: Vector2, dir: Direction) -> Vector2 {
        point + dir.vector() * self.min_length
    }
}

/// Routes with the default minimum run length.
pub fn route(
    start_point: Vector2,
    start_dir: Direction,
    end_point: Vector2,
    end_dir: Direction,
) -> Path {
    Router::default().route(start_point, start_dir, end_point, end_dir)
}

/// Signed distance along `dir` from `point` to the line through `anchor`
/// running `turns` octants towards `side`. `None` when the two are parallel.
fn bend_intersection(
    point: Vector2,
    dir: Direction,
    side: TurnSide,
    turns: usize,
    anchor: Vector2,
) -> Option<f64> {
    let first = dir.vector();
    let second = side.bend_times(dir, turns).vector();
    let perpendicular = Vector2::new(second.y, -second.x);
    let h = (anchor - point).dot(perpendicular) / first.dot(perpendicular);
    h.is_finite().then_some(h)
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
