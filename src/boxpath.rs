use crate::board::{Board, NO_POSITION};
use crate::direction::ALL_DIRECTIONS;
use crate::distance::DistanceMap;
use ahash::AHashMap;
use arrayvec::ArrayVec;
use log::debug;
use std::cmp::Reverse;
use std::collections::BinaryHeap;

const NO_NODE: usize = usize::MAX;

/// Primary optimization target for the box search. The other quantity is
/// always the secondary tie-break, so the ordering is lexicographic:
/// `(moves, pushes)` or `(pushes, moves)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    Moves,
    Pushes,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Cost {
    moves: u32,
    pushes: u32,
}

impl Cost {
    fn key(&self, metric: Metric) -> (u32, u32) {
        match metric {
            Metric::Moves => (self.moves, self.pushes),
            Metric::Pushes => (self.pushes, self.moves),
        }
    }
}

/// One settled search state. States are identified by their
/// `(box_pos, player_pos)` tuple; parent links form a tree rooted at the
/// search start.
#[derive(Debug, Clone, Copy)]
struct Node {
    box_pos: usize,
    player_pos: usize,
    cost: Cost,
    parent: usize,
}

/// An optimal push sequence for one box, as the list of cells the box
/// occupies after each push (the start cell excluded), with the accumulated
/// player-move and push counts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoxPath {
    pub positions: Vec<usize>,
    pub moves: u32,
    pub pushes: u32,
}

/// Scoped box-flag mutation. Restores the opposite flag state on drop so the
/// board is untouched on every exit path out of the search.
struct BoxFlag<'a> {
    board: &'a mut Board,
    pos: usize,
    present_on_drop: bool,
}

impl<'a> BoxFlag<'a> {
    fn lift(board: &'a mut Board, pos: usize) -> Self {
        board.set_box_flag(pos, false);
        BoxFlag {
            board,
            pos,
            present_on_drop: true,
        }
    }

    fn place(board: &'a mut Board, pos: usize) -> Self {
        board.set_box_flag(pos, true);
        BoxFlag {
            board,
            pos,
            present_on_drop: false,
        }
    }
}

impl Drop for BoxFlag<'_> {
    fn drop(&mut self) {
        self.board.set_box_flag(self.pos, self.present_on_drop);
    }
}

/// Find an optimal push sequence moving the box at `start` to `target`
/// without disturbing any other box. Uniform-cost search over the joint
/// `(box, player)` state space: a push costs one push and
/// `walking distance + 1` player moves, so edge weights differ and plain BFS
/// would not be optimal.
///
/// `start == target` short-circuits to an empty path with zero cost. Returns
/// `None` when `start` holds no box or no push chain reaches the target.
/// The board is restored to its pre-call state on every exit path.
pub fn box_path(board: &mut Board, start: usize, target: usize, metric: Metric) -> Option<BoxPath> {
    if !board.is_box(start) {
        debug!("box_path: no box at start position {}", start);
        return None;
    }
    if start == target {
        return Some(BoxPath {
            positions: Vec::new(),
            moves: 0,
            pushes: 0,
        });
    }

    let (nodes, _settled, goal) = search(board, start, target, metric);
    let goal = goal?;

    let mut positions = Vec::new();
    let mut idx = goal;
    while nodes[idx].parent != NO_NODE {
        positions.push(nodes[idx].box_pos);
        idx = nodes[idx].parent;
    }
    positions.reverse();

    Some(BoxPath {
        positions,
        moves: nodes[goal].cost.moves,
        pushes: nodes[goal].cost.pushes,
    })
}

/// Every cell the box at `box_pos` could ever occupy along some legal push
/// chain, the start cell included. Runs the search with an unreachable
/// target so it explores exhaustively, then scans the settled states. Used
/// for UI highlighting, not solving. Sorted ascending.
pub fn reachable_box_positions(board: &mut Board, box_pos: usize) -> Vec<usize> {
    if !board.is_box(box_pos) {
        debug!("reachable_box_positions: no box at position {}", box_pos);
        return Vec::new();
    }

    let (_nodes, settled, _goal) = search(board, box_pos, NO_POSITION, Metric::Pushes);

    let mut positions: Vec<usize> = settled.keys().map(|&(box_pos, _)| box_pos).collect();
    positions.sort_unstable();
    positions.dedup();
    positions
}

type Settled = AHashMap<(usize, usize), usize>;

fn search(
    board: &mut Board,
    start: usize,
    target: usize,
    metric: Metric,
) -> (Vec<Node>, Settled, Option<usize>) {
    let player = board.player_position();
    // The searched box is conceptually at the current node's box position,
    // never at its resting cell, so lift it for the duration of the search.
    let mut lifted = BoxFlag::lift(board, start);

    let mut nodes = Vec::new();
    let mut settled = Settled::default();
    let mut open = BinaryHeap::new();
    let mut distances = DistanceMap::new(&*lifted.board);

    nodes.push(Node {
        box_pos: start,
        player_pos: player,
        cost: Cost { moves: 0, pushes: 0 },
        parent: NO_NODE,
    });
    settled.insert((start, player), 0);
    open.push(Reverse((nodes[0].cost.key(metric), 0)));

    let mut goal = None;
    let mut expanded = 0usize;

    while let Some(Reverse((_, idx))) = open.pop() {
        let node = nodes[idx];
        // Superseded by a better state for the same tuple
        if settled[&(node.box_pos, node.player_pos)] != idx {
            continue;
        }
        if node.box_pos == target {
            goal = Some(idx);
            break;
        }
        expanded += 1;

        let mut successors: ArrayVec<(usize, u32), 4> = ArrayVec::new();
        {
            let placed = BoxFlag::place(&mut *lifted.board, node.box_pos);
            distances.update(&*placed.board, node.player_pos);

            for dir in ALL_DIRECTIONS {
                let stand = match placed.board.neighbor(node.box_pos, dir.opposite()) {
                    Some(stand) => stand,
                    None => continue,
                };
                let dest = match placed.board.neighbor(node.box_pos, dir) {
                    Some(dest) => dest,
                    None => continue,
                };
                if distances.is_reachable(stand) && placed.board.is_accessible_box(dest) {
                    // The +1 is the push step itself, one player move
                    successors.push((dest, distances.distance(stand) + 1));
                }
            }
        }

        for (dest, walk) in successors {
            let cost = Cost {
                moves: node.cost.moves + walk,
                pushes: node.cost.pushes + 1,
            };
            // The player ends up where the box was
            let key = (dest, node.box_pos);
            let better = match settled.get(&key) {
                Some(&existing) => cost.key(metric) < nodes[existing].cost.key(metric),
                None => true,
            };
            if better {
                let new_idx = nodes.len();
                nodes.push(Node {
                    box_pos: dest,
                    player_pos: node.box_pos,
                    cost,
                    parent: idx,
                });
                settled.insert(key, new_idx);
                open.push(Reverse((cost.key(metric), new_idx)));
            }
        }
    }

    debug!(
        "box search expanded {} states, settled {}",
        expanded,
        settled.len()
    );
    (nodes, settled, goal)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board(text: &str) -> Board {
        Board::from_text(text).unwrap()
    }

    #[test]
    fn test_corridor_push() {
        let mut b = board("#######\n#@$  .#\n#######");
        let before = b.to_string();

        let start = b.index(2, 1);
        let target = b.index(5, 1);
        let path = box_path(&mut b, start, target, Metric::Moves).unwrap();
        assert_eq!(
            path.positions,
            vec![b.index(3, 1), b.index(4, 1), b.index(5, 1)]
        );
        assert_eq!(path.pushes, 3);
        assert_eq!(path.moves, 3);

        assert_eq!(b.to_string(), before);
    }

    #[test]
    fn test_walk_before_push_counts_as_moves() {
        let mut b = board("######\n#@ $.#\n######");
        let start = b.index(3, 1);
        let target = b.index(4, 1);
        let path = box_path(&mut b, start, target, Metric::Moves).unwrap();
        assert_eq!(path.positions, vec![b.index(4, 1)]);
        // One cell of walking to get behind the box, plus the push step
        assert_eq!(path.moves, 2);
        assert_eq!(path.pushes, 1);
    }

    #[test]
    fn test_l_shaped_route_costs() {
        let input = "######\n\
                     #  . #\n\
                     # $  #\n\
                     #@   #\n\
                     ######";
        let mut b = board(input);
        let start = b.index(2, 2);
        let target = b.index(3, 1);

        for metric in [Metric::Moves, Metric::Pushes] {
            let path = box_path(&mut b, start, target, metric).unwrap();
            assert_eq!(path.pushes, 2);
            assert_eq!(path.moves, 5);
            assert_eq!(*path.positions.last().unwrap(), target);
        }
    }

    #[test]
    fn test_deterministic_costs() {
        let input = "########\n\
                     #      #\n\
                     # $  . #\n\
                     # #    #\n\
                     #@     #\n\
                     ########";
        let mut b = board(input);
        let start = b.index(2, 2);
        let target = b.index(5, 2);

        let first = box_path(&mut b, start, target, Metric::Pushes).unwrap();
        for _ in 0..3 {
            let again = box_path(&mut b, start, target, Metric::Pushes).unwrap();
            assert_eq!((again.moves, again.pushes), (first.moves, first.pushes));
        }
    }

    #[test]
    fn test_start_equals_target() {
        let mut b = board("#######\n#@$  .#\n#######");
        let pos = b.index(2, 1);
        let path = box_path(&mut b, pos, pos, Metric::Moves).unwrap();
        assert!(path.positions.is_empty());
        assert_eq!(path.moves, 0);
        assert_eq!(path.pushes, 0);
    }

    #[test]
    fn test_no_box_at_start() {
        let mut b = board("#######\n#@$  .#\n#######");
        let start = b.index(3, 1);
        let target = b.index(5, 1);
        assert_eq!(box_path(&mut b, start, target, Metric::Moves), None);
    }

    #[test]
    fn test_unreachable_target_restores_board() {
        // Second box blocks the corridor and may not be disturbed
        let mut b = board("########\n#@$$  .#\n# .    #\n########");
        let before = b.to_string();

        let start = b.index(2, 1);
        let target = b.index(6, 1);
        let result = box_path(&mut b, start, target, Metric::Moves);
        assert_eq!(result, None);
        assert_eq!(b.to_string(), before);
    }

    #[test]
    fn test_other_boxes_block_but_never_move() {
        let input = "########\n\
                     #      #\n\
                     #@$ * .#\n\
                     #      #\n\
                     #      #\n\
                     ########";
        let mut b = board(input);
        let before = b.to_string();

        // Straight right is blocked by the second box; the finder must
        // detour around it without ever pushing it.
        let start = b.index(2, 2);
        let target = b.index(6, 2);
        let path = box_path(&mut b, start, target, Metric::Pushes).unwrap();
        assert_eq!(*path.positions.last().unwrap(), b.index(6, 2));
        assert!(!path.positions.contains(&b.index(4, 2)));
        assert!(b.is_box_on_goal(b.index(4, 2)));
        assert_eq!(b.to_string(), before);
    }

    #[test]
    fn test_dead_square_pruning() {
        // The only way into the corner would be a push onto a dead square
        let input = "######\n\
                     #@   #\n\
                     # $. #\n\
                     #    #\n\
                     ######";
        let mut b = board(input);
        let corner = b.index(1, 1);
        assert!(b.is_dead_square(corner));
        let start = b.index(2, 2);
        assert_eq!(box_path(&mut b, start, corner, Metric::Moves), None);
    }

    #[test]
    fn test_reachable_box_positions_corridor() {
        let mut b = board("#######\n#@$  .#\n#######");
        let before = b.to_string();

        let start = b.index(2, 1);
        let reachable = reachable_box_positions(&mut b, start);
        // The player cannot get to the right side of the box, so it only
        // ever travels rightward; the start cell itself is included.
        assert_eq!(
            reachable,
            vec![b.index(2, 1), b.index(3, 1), b.index(4, 1), b.index(5, 1)]
        );
        assert_eq!(b.to_string(), before);
    }

    #[test]
    fn test_reachable_box_positions_excludes_dead_corners() {
        let input = "######\n\
                     #@   #\n\
                     # $. #\n\
                     #    #\n\
                     ######";
        let mut b = board(input);
        let start = b.index(2, 2);
        let reachable = reachable_box_positions(&mut b, start);

        for corner in [
            b.index(1, 1),
            b.index(4, 1),
            b.index(1, 3),
            b.index(4, 3),
        ] {
            assert!(!reachable.contains(&corner));
        }
        assert!(reachable.contains(&b.index(2, 2)));
        assert!(reachable.contains(&b.index(3, 2)));
    }

    #[test]
    fn test_replaying_path_reaches_target() {
        use crate::board::MoveOutcome;
        use crate::pathfinder::player_path;

        let input = "########\n\
                     #      #\n\
                     # $  . #\n\
                     #      #\n\
                     #@     #\n\
                     ########";
        let mut b = board(input);
        let start = b.index(2, 2);
        let target = b.index(5, 2);
        let path = box_path(&mut b, start, target, Metric::Moves).unwrap();

        // Walk the implied player routes and perform each push for real
        let mut box_pos = start;
        for &next in &path.positions {
            let dir = b.direction_of_move(box_pos, next);
            let stand = b.neighbor(box_pos, dir.opposite()).unwrap();
            let walk = player_path(&b, b.player_position(), stand).unwrap();
            for step in walk {
                assert_eq!(
                    b.apply_move(b.direction_of_move(b.player_position(), step)),
                    MoveOutcome::Moved
                );
            }
            let outcome = b.apply_move(dir);
            assert!(matches!(
                outcome,
                MoveOutcome::Pushed | MoveOutcome::PushedOntoGoal
            ));
            box_pos = next;
        }
        assert_eq!(box_pos, target);
        assert!(b.is_box(target));
    }
}
