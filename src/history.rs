use crate::direction::Move;

/// Linear record of the moves played so far, with undo/redo. The buffer
/// keeps undone moves past the cursor until a different move overwrites
/// them, so a redo simply replays what is already there.
///
/// Invariant: moves at indices `< played` are applied to the board; moves at
/// indices `>= played` are undone but retained.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MoveHistory {
    moves: Vec<Move>,
    played: usize,
}

impl MoveHistory {
    pub fn new() -> Self {
        MoveHistory::default()
    }

    /// Append one move. If it equals the next undone move, the cursor just
    /// advances (redo by replay); any other move discards the undone branch
    /// before being appended.
    pub fn add_move(&mut self, mv: Move) {
        if self.moves.get(self.played) == Some(&mv) {
            self.played += 1;
            return;
        }
        self.moves.truncate(self.played);
        self.moves.push(mv);
        self.played += 1;
    }

    /// Step the cursor back and return the move being undone, or `None` at
    /// the start of the history.
    pub fn undo_move(&mut self) -> Option<Move> {
        if self.played == 0 {
            return None;
        }
        self.played -= 1;
        Some(self.moves[self.played])
    }

    /// Return the move at the cursor and advance it, or `None` when there is
    /// nothing to redo.
    pub fn redo_move(&mut self) -> Option<Move> {
        let mv = *self.moves.get(self.played)?;
        self.played += 1;
        Some(mv)
    }

    pub fn has_undo(&self) -> bool {
        self.played > 0
    }

    pub fn has_redo(&self) -> bool {
        self.played < self.moves.len()
    }

    pub fn played_count(&self) -> usize {
        self.played
    }

    pub fn len(&self) -> usize {
        self.moves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }

    /// The applied prefix as a LURD string.
    pub fn lurd(&self) -> String {
        self.moves[..self.played].iter().map(Move::to_char).collect()
    }

    /// The whole buffer as a LURD string, undone moves included.
    pub fn total_lurd(&self) -> String {
        self.moves.iter().map(Move::to_char).collect()
    }

    /// Savegame form: the full buffer with a single `*` at the cursor when
    /// undone moves exist, otherwise just the applied prefix.
    pub fn save_game_lurd(&self) -> String {
        if self.played == self.moves.len() {
            return self.lurd();
        }
        let mut out = self.lurd();
        out.push('*');
        out.extend(self.moves[self.played..].iter().map(Move::to_char));
        out
    }

    /// Replace the buffer wholesale from a persisted LURD string. An
    /// embedded `*` marks the cursor; `played` overrides it when given and
    /// defaults to the full length (everything applied).
    pub fn set_history(&mut self, lurd: &str, played: Option<usize>) -> Result<(), String> {
        let mut moves = Vec::with_capacity(lurd.len());
        let mut marker = None;
        for ch in lurd.chars() {
            if ch == '*' {
                if marker.is_some() {
                    return Err("More than one '*' marker in move string".to_string());
                }
                marker = Some(moves.len());
                continue;
            }
            let mv = Move::from_char(ch)
                .ok_or_else(|| format!("Invalid move character '{}'", ch))?;
            moves.push(mv);
        }

        let played = played.or(marker).unwrap_or(moves.len());
        if played > moves.len() {
            return Err(format!(
                "Cursor {} exceeds move count {}",
                played,
                moves.len()
            ));
        }

        self.moves = moves;
        self.played = played;
        Ok(())
    }
}
