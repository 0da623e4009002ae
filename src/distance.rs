use crate::board::Board;
use crate::direction::ALL_DIRECTIONS;
use std::collections::VecDeque;

pub const UNREACHABLE: u32 = u32::MAX;

/// Walking-distance field for the player from a single start cell. Boxes act
/// as walls. Recomputed from scratch on every `update`; the box search calls
/// it once per expanded node.
#[derive(Debug)]
pub struct DistanceMap {
    distances: Vec<u32>,
}

impl DistanceMap {
    pub fn new(board: &Board) -> Self {
        DistanceMap {
            distances: vec![UNREACHABLE; board.size()],
        }
    }

    /// BFS from `start` over accessible cells.
    pub fn update(&mut self, board: &Board, start: usize) {
        debug_assert_eq!(self.distances.len(), board.size());
        self.distances.fill(UNREACHABLE);
        self.distances[start] = 0;

        let mut queue = VecDeque::new();
        queue.push_back(start);

        while let Some(pos) = queue.pop_front() {
            let next_distance = self.distances[pos] + 1;
            for dir in ALL_DIRECTIONS {
                if let Some(next) = board.neighbor(pos, dir) {
                    if board.is_accessible(next) && self.distances[next] == UNREACHABLE {
                        self.distances[next] = next_distance;
                        queue.push_back(next);
                    }
                }
            }
        }
    }

    pub fn distance(&self, pos: usize) -> u32 {
        self.distances[pos]
    }

    pub fn is_reachable(&self, pos: usize) -> bool {
        self.distances[pos] != UNREACHABLE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distances_simple_corridor() {
        let b = Board::from_text("#######\n#@  $.#\n#######").unwrap();
        let mut map = DistanceMap::new(&b);
        map.update(&b, b.player_position());

        assert_eq!(map.distance(b.index(1, 1)), 0);
        assert_eq!(map.distance(b.index(2, 1)), 1);
        assert_eq!(map.distance(b.index(3, 1)), 2);
        // Box blocks the corridor
        assert!(!map.is_reachable(b.index(4, 1)));
        assert!(!map.is_reachable(b.index(5, 1)));
        // Walls are unreachable
        assert!(!map.is_reachable(b.index(0, 0)));
    }

    #[test]
    fn test_distances_around_obstacle() {
        let input = "######\n\
                     #@$ .#\n\
                     #    #\n\
                     ######";
        let b = Board::from_text(input).unwrap();
        let mut map = DistanceMap::new(&b);
        map.update(&b, b.player_position());

        // Straight through is blocked; the player detours below the box
        assert_eq!(map.distance(b.index(3, 1)), 4);
        assert_eq!(map.distance(b.index(4, 1)), 5);
    }

    #[test]
    fn test_update_overwrites_previous_field() {
        let input = "######\n\
                     #@$ .#\n\
                     #    #\n\
                     ######";
        let b = Board::from_text(input).unwrap();
        let mut map = DistanceMap::new(&b);
        map.update(&b, b.player_position());
        map.update(&b, b.index(4, 1));

        assert_eq!(map.distance(b.index(4, 1)), 0);
        assert_eq!(map.distance(b.index(3, 1)), 1);
        assert_eq!(map.distance(b.index(1, 1)), 5);
    }
}
