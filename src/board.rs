use crate::direction::{Direction, Move, ALL_DIRECTIONS};
use log::debug;
use std::fmt;

const WALL: u8 = 1 << 0;
const BOX: u8 = 1 << 1;
const GOAL: u8 = 1 << 2;
const ACTIVE: u8 = 1 << 3;
const BACKGROUND: u8 = 1 << 4;
const DEAD_SQUARE: u8 = 1 << 5;

/// Sentinel for "no such position" (off-board neighbors, unreachable search
/// targets).
pub const NO_POSITION: usize = usize::MAX;

const BOARD_CHARS: &str = "# -_$*.@+\r";

/// Result of applying one direction of player travel to the board.
/// `Blocked` performs no mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    Moved,
    Pushed,
    PushedOntoGoal,
    Blocked,
}

impl MoveOutcome {
    /// The LURD character this outcome produces for the given travel
    /// direction, or `None` for `Blocked`.
    pub fn to_move(&self, direction: Direction) -> Option<Move> {
        match self {
            MoveOutcome::Moved => Some(Move::new(direction, false)),
            MoveOutcome::Pushed | MoveOutcome::PushedOntoGoal => Some(Move::new(direction, true)),
            MoveOutcome::Blocked => None,
        }
    }
}

/// Transient per-cell highlight hint for the embedding UI. Never consulted by
/// the search code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker {
    None,
    PlayerReachable,
    BoxReachable,
}

#[derive(Debug, PartialEq, Eq)]
pub struct Board {
    width: usize,
    height: usize,
    cells: Vec<u8>,
    player: usize,
    box_count: usize,
    goal_count: usize,
    boxes_on_goal: usize,
    // Sorted positions reachable by the player when no boxes exist; the only
    // cells whose content ever changes during play.
    active_positions: Vec<usize>,
    // neighbors[pos][dir.index()] = adjacent position, NO_POSITION at edges
    neighbors: Vec<[usize; 4]>,
    markers: Vec<Marker>,
}

impl Board {
    /// Parse a board from text format.
    ///
    /// Characters:
    /// - `#` = Wall
    /// - ` `, `-`, `_` = Floor or background (outside the active area)
    /// - `.` = Goal (target location for boxes)
    /// - `$` = Box
    /// - `@` = Player
    /// - `*` = Box on goal
    /// - `+` = Player on goal
    ///
    /// Rows that contain characters outside this set, or none of `#`, `-`,
    /// `_`, are skipped (level titles, separators). Rows are padded with
    /// spaces to the widest row before parsing.
    pub fn from_text(text: &str) -> Result<Self, String> {
        let rows: Vec<&str> = text
            .lines()
            .map(|line| line.trim_end_matches('\r'))
            .filter(|line| Self::is_board_row(line))
            .collect();

        let height = rows.len();
        let width = rows.iter().map(|row| row.chars().count()).max().unwrap_or(0);

        if height < 3 {
            return Err(format!("Board must have at least 3 rows, found {}", height));
        }
        if width < 3 {
            return Err(format!(
                "Board must have at least 3 columns, found {}",
                width
            ));
        }

        let size = width * height;
        let mut cells = vec![0u8; size];
        let mut player = None;
        let mut box_count = 0;
        let mut goal_count = 0;
        let mut boxes_on_goal = 0;

        for (y, row) in rows.iter().enumerate() {
            for (x, ch) in row.chars().enumerate() {
                let pos = y * width + x;
                match ch {
                    '#' => cells[pos] = WALL,
                    ' ' | '-' | '_' => {}
                    '$' => {
                        cells[pos] = BOX;
                        box_count += 1;
                    }
                    '*' => {
                        cells[pos] = BOX | GOAL;
                        box_count += 1;
                        goal_count += 1;
                        boxes_on_goal += 1;
                    }
                    '.' => {
                        cells[pos] = GOAL;
                        goal_count += 1;
                    }
                    '@' => {
                        if player.is_some() {
                            return Err("More than one player found".to_string());
                        }
                        player = Some(pos);
                    }
                    '+' => {
                        if player.is_some() {
                            return Err("More than one player found".to_string());
                        }
                        player = Some(pos);
                        cells[pos] = GOAL;
                        goal_count += 1;
                    }
                    _ => unreachable!("row filter admits only board characters"),
                }
            }
        }

        let player = player.ok_or("No player found on board")?;

        let mut board = Board {
            width,
            height,
            cells,
            player,
            box_count,
            goal_count,
            boxes_on_goal,
            active_positions: Vec::new(),
            neighbors: Vec::new(),
            markers: vec![Marker::None; size],
        };

        board.compute_neighbors();
        board.compute_active_positions()?;

        if box_count != goal_count {
            return Err(format!(
                "Goal count ({}) does not match box count ({})",
                goal_count, box_count
            ));
        }
        if box_count == 0 {
            return Err("Board contains no boxes".to_string());
        }

        board.compute_dead_squares();

        Ok(board)
    }

    /// A row belongs to the board proper if it contains at least one of `#`,
    /// `-`, `_` and nothing outside the board character set.
    fn is_board_row(row: &str) -> bool {
        row.chars().any(|ch| matches!(ch, '#' | '-' | '_'))
            && row.chars().all(|ch| BOARD_CHARS.contains(ch))
    }

    fn compute_neighbors(&mut self) {
        self.neighbors = (0..self.size())
            .map(|pos| {
                let (x, y) = self.coords(pos);
                let mut row = [NO_POSITION; 4];
                for dir in ALL_DIRECTIONS {
                    let (dx, dy) = dir.delta();
                    let nx = x as isize + dx as isize;
                    let ny = y as isize + dy as isize;
                    if nx >= 0 && ny >= 0 && nx < self.width as isize && ny < self.height as isize {
                        row[dir.index()] = ny as usize * self.width + nx as usize;
                    }
                }
                row
            })
            .collect();
    }

    /// Flood fill from the player ignoring boxes. Cells reached become
    /// ACTIVE; non-wall cells never reached become BACKGROUND. Fails if the
    /// fill escapes to the outer border (the layout is not closed).
    fn compute_active_positions(&mut self) -> Result<(), String> {
        let mut stack = vec![self.player];
        self.cells[self.player] |= ACTIVE;

        while let Some(pos) = stack.pop() {
            if self.is_border(pos) {
                return Err("Board is not closed: player can reach the border".to_string());
            }
            for dir in ALL_DIRECTIONS {
                let next = self.neighbors[pos][dir.index()];
                if next != NO_POSITION && self.cells[next] & (WALL | ACTIVE) == 0 {
                    self.cells[next] |= ACTIVE;
                    stack.push(next);
                }
            }
        }

        for pos in 0..self.size() {
            if self.cells[pos] & (WALL | ACTIVE) == 0 {
                self.cells[pos] |= BACKGROUND;
            }
        }

        self.active_positions = (0..self.size())
            .filter(|&pos| self.cells[pos] & ACTIVE != 0)
            .collect();
        Ok(())
    }

    /// Mark corner pockets: a non-goal active cell walled on the vertical
    /// axis and on the horizontal axis can never pass a box on to a goal.
    /// Conservative on purpose; freeze and closed-area deadlocks are not
    /// detected.
    fn compute_dead_squares(&mut self) {
        for i in 0..self.active_positions.len() {
            let pos = self.active_positions[i];
            if self.cells[pos] & GOAL != 0 {
                continue;
            }
            // Active cells never sit on the border, so all four neighbors exist.
            let row = self.neighbors[pos];
            let walled = |dir: Direction| self.cells[row[dir.index()]] & WALL != 0;
            if (walled(Direction::Up) || walled(Direction::Down))
                && (walled(Direction::Left) || walled(Direction::Right))
            {
                self.cells[pos] |= DEAD_SQUARE;
            }
        }
    }

    fn is_border(&self, pos: usize) -> bool {
        let (x, y) = self.coords(pos);
        x == 0 || y == 0 || x == self.width - 1 || y == self.height - 1
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn size(&self) -> usize {
        self.width * self.height
    }

    pub fn index(&self, x: usize, y: usize) -> usize {
        debug_assert!(x < self.width && y < self.height);
        y * self.width + x
    }

    pub fn coords(&self, pos: usize) -> (usize, usize) {
        (pos % self.width, pos / self.width)
    }

    pub fn player_position(&self) -> usize {
        self.player
    }

    pub fn set_player_position(&mut self, pos: usize) {
        debug_assert!(pos < self.size());
        self.player = pos;
    }

    pub fn box_count(&self) -> usize {
        self.box_count
    }

    pub fn goal_count(&self) -> usize {
        self.goal_count
    }

    pub fn boxes_on_goal(&self) -> usize {
        self.boxes_on_goal
    }

    pub fn active_positions(&self) -> &[usize] {
        &self.active_positions
    }

    pub fn is_wall(&self, pos: usize) -> bool {
        self.cells[pos] & WALL != 0
    }

    pub fn is_box(&self, pos: usize) -> bool {
        self.cells[pos] & BOX != 0
    }

    pub fn is_goal(&self, pos: usize) -> bool {
        self.cells[pos] & GOAL != 0
    }

    pub fn is_box_on_goal(&self, pos: usize) -> bool {
        self.cells[pos] & (BOX | GOAL) == BOX | GOAL
    }

    pub fn is_active(&self, pos: usize) -> bool {
        self.cells[pos] & ACTIVE != 0
    }

    pub fn is_background(&self, pos: usize) -> bool {
        self.cells[pos] & BACKGROUND != 0
    }

    pub fn is_dead_square(&self, pos: usize) -> bool {
        self.cells[pos] & DEAD_SQUARE != 0
    }

    /// True iff the player or a box may occupy this cell next: active,
    /// not a wall, not occupied by a box.
    pub fn is_accessible(&self, pos: usize) -> bool {
        self.cells[pos] & (ACTIVE | WALL | BOX) == ACTIVE
    }

    /// Like `is_accessible`, but additionally rejects dead squares. A box is
    /// never pushed onto a dead square.
    pub fn is_accessible_box(&self, pos: usize) -> bool {
        self.cells[pos] & (ACTIVE | WALL | BOX | DEAD_SQUARE) == ACTIVE
    }

    pub fn is_solved(&self) -> bool {
        self.boxes_on_goal == self.box_count
    }

    /// O(1) adjacency lookup; `None` past the board edge.
    pub fn neighbor(&self, pos: usize, direction: Direction) -> Option<usize> {
        match self.neighbors[pos][direction.index()] {
            NO_POSITION => None,
            next => Some(next),
        }
    }

    /// Direction of travel from `a` to `b`. Panics if the positions are not
    /// 4-neighbors; that can only happen when a path-finder result is
    /// misused.
    pub fn direction_of_move(&self, a: usize, b: usize) -> Direction {
        for dir in ALL_DIRECTIONS {
            if self.neighbors[a][dir.index()] == b {
                return dir;
            }
        }
        panic!("positions {} and {} are not neighbors", a, b);
    }

    /// Move the box at `from` to `to`. Returns false (and mutates nothing)
    /// if `from` holds no box, `from == to`, or `to` is not accessible.
    /// This is the only box-mutating primitive.
    pub fn push_box(&mut self, from: usize, to: usize) -> bool {
        if !self.is_box(from) {
            debug!("push_box: no box at position {}", from);
            return false;
        }
        if from == to {
            debug!("push_box: source and destination are both {}", from);
            return false;
        }
        if !self.is_accessible(to) {
            debug!("push_box: destination {} is not accessible", to);
            return false;
        }

        self.cells[from] &= !BOX;
        self.cells[to] |= BOX;
        if self.is_goal(from) {
            self.boxes_on_goal -= 1;
        }
        if self.is_goal(to) {
            self.boxes_on_goal += 1;
        }
        true
    }

    /// Place or clear a box flag without touching the goal bookkeeping.
    /// Reserved for the box search's transient probing, which always
    /// restores the flag before returning to the caller.
    pub(crate) fn set_box_flag(&mut self, pos: usize, present: bool) {
        if present {
            self.cells[pos] |= BOX;
        } else {
            self.cells[pos] &= !BOX;
        }
    }

    /// Apply one direction of player travel. Exactly one of the four
    /// outcomes results; `Blocked` leaves the board untouched.
    pub fn apply_move(&mut self, direction: Direction) -> MoveOutcome {
        let target = match self.neighbor(self.player, direction) {
            Some(target) => target,
            None => return MoveOutcome::Blocked,
        };

        if self.is_box(target) {
            let dest = match self.neighbor(target, direction) {
                Some(dest) => dest,
                None => return MoveOutcome::Blocked,
            };
            if !self.push_box(target, dest) {
                return MoveOutcome::Blocked;
            }
            self.player = target;
            if self.is_goal(dest) {
                MoveOutcome::PushedOntoGoal
            } else {
                MoveOutcome::Pushed
            }
        } else if self.is_accessible(target) {
            self.player = target;
            MoveOutcome::Moved
        } else {
            MoveOutcome::Blocked
        }
    }

    /// Undo one previously applied move. The move must be the most recent
    /// one applied; feeding anything else desynchronizes the board and the
    /// history, which is a caller bug.
    pub fn revert_move(&mut self, mv: Move) {
        let back = self
            .neighbor(self.player, mv.direction.opposite())
            .expect("revert_move: no cell behind the player");
        if mv.push {
            let box_pos = self
                .neighbor(self.player, mv.direction)
                .expect("revert_move: no box cell ahead of the player");
            let pulled = self.push_box(box_pos, self.player);
            assert!(pulled, "revert_move: cannot pull box back");
        }
        self.player = back;
    }

    pub fn marker(&self, pos: usize) -> Marker {
        self.markers[pos]
    }

    pub fn set_marker(&mut self, pos: usize, marker: Marker) {
        self.markers[pos] = marker;
    }

    pub fn clear_markers(&mut self) {
        self.markers.fill(Marker::None);
    }
}

impl fmt::Display for Board {
    /// Canonical text form: `_` for background so that every emitted row
    /// stays structurally valid and parse/serialize round-trips exactly.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for y in 0..self.height {
            for x in 0..self.width {
                let pos = self.index(x, y);
                let ch = if pos == self.player {
                    if self.is_goal(pos) {
                        '+'
                    } else {
                        '@'
                    }
                } else if self.is_box(pos) {
                    if self.is_goal(pos) {
                        '*'
                    } else {
                        '$'
                    }
                } else if self.is_goal(pos) {
                    '.'
                } else if self.is_wall(pos) {
                    '#'
                } else if self.is_active(pos) {
                    ' '
                } else {
                    '_'
                };
                write!(f, "{}", ch)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

impl Clone for Board {
    /// Reconstructs the board from its serialized form so every derived
    /// field is computed fresh. The shape was validated at construction, so
    /// the reparse cannot fail.
    fn clone(&self) -> Self {
        Board::from_text(&self.to_string()).expect("serialized board must reparse")
    }
}
