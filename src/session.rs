//! Interactive game session
//!
//! Wraps a level with everything a front end needs: which snake is being
//! steered, undo/redo history, restart and the blink feedback shown after a
//! refused move. Rendering and key handling live elsewhere; they translate
//! key presses into [`Command`]s.

use std::rc::Rc;

use crate::sim::{Direction, Level, MoveInput, can_move};

/// One player action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Move(Direction),
    /// Steer the next snake in entity order, wrapping around
    CycleActiveSnake,
    Undo,
    Redo,
    /// Back to the level as loaded; undoable
    Restart,
}

/// Where the session stands after a command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Playing,
    /// All food eaten
    Won,
    /// Food remains but no snake can move
    Stuck,
}

/// Visual feedback for the renderer, cleared once taken
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Feedback {
    /// Flash the active snake (refused move, or snake switch)
    pub blink_snake: bool,
    /// The refused move was blocked by something standing on the snake
    pub blink_encumbered: bool,
}

/// Where `Command::Restart` returns to
#[derive(Debug, Clone, PartialEq, Eq)]
struct Start {
    level: Level,
    active_snake: Option<String>,
}

/// Undo/redo entry; covers everything `replace_level` changes
#[derive(Debug, Clone, PartialEq, Eq)]
struct Snapshot {
    level: Level,
    active_snake: Option<String>,
    level_id: Option<String>,
    initial: Rc<Start>,
    history: Vec<MoveInput>,
}

#[derive(Debug, Clone)]
pub struct GameSession {
    level: Level,
    /// Snake being steered, by ID since entity indices shift as snakes stack
    active_snake: Option<String>,
    level_id: Option<String>,
    initial: Rc<Start>,
    undos: Vec<Snapshot>,
    redos: Vec<Snapshot>,
    feedback: Feedback,
    /// Inputs that produced the current state from `initial`
    history: Vec<MoveInput>,
}

impl GameSession {
    pub fn new(level: Level) -> Self {
        let active_snake = default_active_snake(&level);
        let initial = Rc::new(Start {
            level: level.clone(),
            active_snake: active_snake.clone(),
        });
        Self {
            level,
            active_snake,
            level_id: None,
            initial,
            undos: Vec::new(),
            redos: Vec::new(),
            feedback: Feedback::default(),
            history: Vec::new(),
        }
    }

    pub fn with_level_id(mut self, level_id: impl Into<String>) -> Self {
        self.level_id = Some(level_id.into());
        self
    }

    pub fn level(&self) -> &Level {
        &self.level
    }

    pub fn level_id(&self) -> Option<&str> {
        self.level_id.as_deref()
    }

    pub fn active_snake(&self) -> Option<&str> {
        self.active_snake.as_deref()
    }

    /// Entity index of the active snake in the current level
    pub fn active_snake_index(&self) -> Option<usize> {
        self.level.snake_index(self.active_snake.as_deref()?)
    }

    /// Moves played since the level was loaded or restarted
    pub fn history(&self) -> &[MoveInput] {
        &self.history
    }

    pub fn can_undo(&self) -> bool {
        !self.undos.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redos.is_empty()
    }

    pub fn phase(&self) -> SessionPhase {
        if self.level.is_won() {
            SessionPhase::Won
        } else if self.level.snake_indices().into_iter().any(|s| can_move(&self.level, s)) {
            SessionPhase::Playing
        } else {
            SessionPhase::Stuck
        }
    }

    /// Return and clear pending feedback
    pub fn take_feedback(&mut self) -> Feedback {
        std::mem::take(&mut self.feedback)
    }

    pub fn apply(&mut self, command: Command) -> SessionPhase {
        log::debug!("Session command: {command:?}");
        match command {
            Command::Move(direction) => self.try_move(direction),
            Command::CycleActiveSnake => {
                self.cycle_active_snake();
                self.feedback.blink_snake = true;
            }
            Command::Undo => self.undo(),
            Command::Redo => self.redo(),
            Command::Restart => {
                self.push_undo();
                self.level = self.initial.level.clone();
                self.active_snake = self.initial.active_snake.clone();
                self.history.clear();
            }
        }
        self.phase()
    }

    /// Swap in a different level (e.g. a freshly generated one); undoable
    pub fn replace_level(&mut self, level: Level, level_id: Option<String>) {
        self.push_undo();
        self.active_snake = default_active_snake(&level);
        self.initial = Rc::new(Start {
            level: level.clone(),
            active_snake: self.active_snake.clone(),
        });
        self.level = level;
        self.level_id = level_id;
        self.history.clear();
    }

    fn try_move(&mut self, direction: Direction) {
        let Some(snake_id) = self.active_snake.clone() else {
            return;
        };
        let input = MoveInput::new(direction, snake_id);
        let Some(mv) = input.analyze(&self.level) else {
            log::warn!("Active snake '{}' is not in the level", input.snake_id);
            return;
        };
        if mv.valid {
            self.push_undo();
            crate::sim::take_move(&mv, &mut self.level);
            self.history.push(input);
        } else {
            self.feedback.blink_snake = true;
            self.feedback.blink_encumbered = mv.encumbered;
        }
    }

    fn cycle_active_snake(&mut self) {
        let ids: Vec<&str> = self.level.snakes().map(|(_, s)| s.id.as_str()).collect();
        let Some(current) = self.active_snake.as_deref() else {
            return;
        };
        if let Some(pos) = ids.iter().position(|&id| id == current) {
            self.active_snake = Some(ids[(pos + 1) % ids.len()].to_string());
        }
    }

    fn snapshot(&self) -> Snapshot {
        Snapshot {
            level: self.level.clone(),
            active_snake: self.active_snake.clone(),
            level_id: self.level_id.clone(),
            initial: Rc::clone(&self.initial),
            history: self.history.clone(),
        }
    }

    fn restore(&mut self, snapshot: Snapshot) {
        self.level = snapshot.level;
        self.active_snake = snapshot.active_snake;
        self.level_id = snapshot.level_id;
        self.initial = snapshot.initial;
        self.history = snapshot.history;
    }

    /// Record the current state before an undoable change; clears redo
    fn push_undo(&mut self) {
        self.redos.clear();
        self.undos.push(self.snapshot());
    }

    fn undo(&mut self) {
        let Some(snapshot) = self.undos.pop() else {
            return;
        };
        self.redos.push(self.snapshot());
        self.restore(snapshot);
    }

    fn redo(&mut self) {
        let Some(snapshot) = self.redos.pop() else {
            return;
        };
        self.undos.push(self.snapshot());
        self.restore(snapshot);
    }
}

/// First snake that can move, else the first snake
fn default_active_snake(level: &Level) -> Option<String> {
    let snakes = level.snake_indices();
    let index = snakes
        .iter()
        .copied()
        .find(|&s| can_move(level, s))
        .or_else(|| snakes.first().copied())?;
    Some(level.snake(index).id.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::Direction::{Left, Right, Up};
    use crate::sim::fixtures::{food, level, snake};
    use crate::sim::layer::CollisionLayer::{Black, White};

    fn two_snakes() -> Level {
        let mut lvl = level(&["...#", "...."]);
        // Snake "a" is boxed in by the wall, so "b" starts active.
        lvl.push(snake("a", Black, &[(3, 0)]));
        lvl.push(snake("b", White, &[(0, 0)]));
        lvl.push(food(2, 0, White));
        lvl
    }

    #[test]
    fn test_default_active_snake_can_move() {
        let session = GameSession::new(two_snakes());
        assert_eq!(session.active_snake(), Some("b"));
        assert_eq!(session.phase(), SessionPhase::Playing);
    }

    #[test]
    fn test_default_falls_back_to_first_snake() {
        let mut lvl = level(&["#"]);
        lvl.push(snake("only", Black, &[(0, 0)]));
        lvl.push(food(0, 0, White));
        let session = GameSession::new(lvl);
        assert_eq!(session.active_snake(), Some("only"));
        assert_eq!(session.phase(), SessionPhase::Stuck);
    }

    #[test]
    fn test_move_undo_redo() {
        let mut session = GameSession::new(two_snakes());
        let start = session.level().clone();
        session.apply(Command::Move(Right));
        let moved = session.level().clone();
        assert_ne!(moved, start);
        assert_eq!(session.history().len(), 1);

        session.apply(Command::Undo);
        assert_eq!(session.level(), &start);
        assert!(session.history().is_empty());
        assert!(session.can_redo());

        session.apply(Command::Redo);
        assert_eq!(session.level(), &moved);
        assert_eq!(session.history().len(), 1);
    }

    #[test]
    fn test_new_action_clears_redo() {
        let mut session = GameSession::new(two_snakes());
        session.apply(Command::Move(Right));
        session.apply(Command::Undo);
        assert!(session.can_redo());
        session.apply(Command::Move(Right));
        assert!(!session.can_redo());
    }

    #[test]
    fn test_refused_move_blinks() {
        let mut session = GameSession::new(two_snakes());
        let start = session.level().clone();
        session.apply(Command::Move(Up));
        assert_eq!(session.level(), &start);
        assert!(!session.can_undo());
        let feedback = session.take_feedback();
        assert!(feedback.blink_snake);
        assert!(!feedback.blink_encumbered);
        assert_eq!(session.take_feedback(), Feedback::default());
    }

    #[test]
    fn test_encumbered_feedback() {
        let mut lvl = level(&["...."]);
        lvl.push(snake("low", White, &[(1, 0), (0, 0)]));
        lvl.push(snake("high", Black, &[(1, 0)]));
        let mut session = GameSession::new(lvl);
        // "high" can move, so it starts active; switch to the buried one.
        assert_eq!(session.active_snake(), Some("high"));
        session.apply(Command::CycleActiveSnake);
        assert_eq!(session.active_snake(), Some("low"));
        session.take_feedback();
        session.apply(Command::Move(Right));
        let feedback = session.take_feedback();
        assert!(feedback.blink_snake);
        assert!(feedback.blink_encumbered);
    }

    #[test]
    fn test_cycle_wraps() {
        let mut session = GameSession::new(two_snakes());
        session.apply(Command::CycleActiveSnake);
        assert_eq!(session.active_snake(), Some("a"));
        session.apply(Command::CycleActiveSnake);
        assert_eq!(session.active_snake(), Some("b"));
    }

    #[test]
    fn test_win_and_restart() {
        let mut session = GameSession::new(two_snakes());
        session.apply(Command::Move(Right));
        assert_eq!(session.apply(Command::Move(Right)), SessionPhase::Won);
        assert_eq!(session.history().len(), 2);

        assert_eq!(session.apply(Command::Restart), SessionPhase::Playing);
        assert_eq!(session.level(), &two_snakes());
        assert!(session.history().is_empty());

        // Restart itself can be undone.
        session.apply(Command::Undo);
        assert!(session.level().is_won());
        assert_eq!(session.history().len(), 2);
    }

    #[test]
    fn test_replace_level_is_undoable() {
        let mut session = GameSession::new(two_snakes()).with_level_id("first");
        session.apply(Command::Move(Right));
        let moved = session.level().clone();
        let mut other = level(&[".."]);
        other.push(snake("z", White, &[(0, 0)]));
        other.push(food(1, 0, White));
        session.replace_level(other.clone(), Some("second".into()));
        assert_eq!(session.level(), &other);
        assert_eq!(session.active_snake(), Some("z"));
        assert_eq!(session.level_id(), Some("second"));

        session.apply(Command::Restart);
        assert_eq!(session.level(), &other);

        assert!(session.history().is_empty());

        session.apply(Command::Undo);
        session.apply(Command::Undo);
        assert_eq!(session.level(), &moved);
        assert_eq!(session.active_snake(), Some("b"));
        assert_eq!(session.level_id(), Some("first"));
        assert_eq!(session.history().len(), 1);

        // Restart goes back to the first level, not the replacement.
        session.apply(Command::Restart);
        assert_eq!(session.level(), &two_snakes());
        assert_eq!(session.level_id(), Some("first"));
        assert!(session.history().is_empty());
        session.apply(Command::Move(Left));
        assert!(session.take_feedback().blink_snake);

        session.apply(Command::Undo);
        assert_eq!(session.level(), &moved);
        session.apply(Command::Redo);
        session.apply(Command::Redo);
        assert_eq!(session.level(), &two_snakes());
        assert!(!session.can_redo());
    }
}
