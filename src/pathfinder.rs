use crate::board::{Board, NO_POSITION};
use crate::direction::ALL_DIRECTIONS;
use std::collections::VecDeque;

/// Shortest walking path for the player alone; boxes are obstacles, never
/// moved. Returns the position sequence from (but excluding) `start` up to
/// and including `target`, an empty sequence when `start == target`, or
/// `None` when the target is unreachable.
pub fn player_path(board: &Board, start: usize, target: usize) -> Option<Vec<usize>> {
    if start == target {
        return Some(Vec::new());
    }

    let mut parents = vec![NO_POSITION; board.size()];
    let mut queue = VecDeque::new();
    parents[start] = start;
    queue.push_back(start);

    while let Some(pos) = queue.pop_front() {
        for dir in ALL_DIRECTIONS {
            if let Some(next) = board.neighbor(pos, dir) {
                if board.is_accessible(next) && parents[next] == NO_POSITION {
                    parents[next] = pos;
                    if next == target {
                        return Some(collect_path(&parents, start, target));
                    }
                    queue.push_back(next);
                }
            }
        }
    }

    None
}

/// Every position the player can walk to from `start` with the boxes where
/// they are. Drives UI highlighting, not solving. Sorted, includes `start`.
pub fn reachable_positions(board: &Board, start: usize) -> Vec<usize> {
    let mut visited = vec![false; board.size()];
    let mut queue = VecDeque::new();
    visited[start] = true;
    queue.push_back(start);

    while let Some(pos) = queue.pop_front() {
        for dir in ALL_DIRECTIONS {
            if let Some(next) = board.neighbor(pos, dir) {
                if board.is_accessible(next) && !visited[next] {
                    visited[next] = true;
                    queue.push_back(next);
                }
            }
        }
    }

    (0..board.size()).filter(|&pos| visited[pos]).collect()
}

fn collect_path(parents: &[usize], start: usize, target: usize) -> Vec<usize> {
    let mut path = Vec::new();
    let mut pos = target;
    while pos != start {
        path.push(pos);
        pos = parents[pos];
    }
    path.reverse();
    path
}
