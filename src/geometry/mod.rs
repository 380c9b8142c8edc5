mod direction;
mod vector;

pub use direction::Direction;
pub use vector::Vector2;
