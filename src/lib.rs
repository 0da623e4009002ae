pub mod board;
pub mod boxpath;
pub mod direction;
pub mod distance;
pub mod history;
pub mod levels;
pub mod pathfinder;

pub use board::{Board, Marker, MoveOutcome, NO_POSITION};
pub use boxpath::{box_path, reachable_box_positions, BoxPath, Metric};
pub use direction::{Direction, Move, ALL_DIRECTIONS};
pub use distance::{DistanceMap, UNREACHABLE};
pub use history::MoveHistory;
pub use levels::{LevelError, Levels};
pub use pathfinder::{player_path, reachable_positions};
