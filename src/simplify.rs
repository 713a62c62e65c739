//! Playthrough simplifier
//!
//! Best effort, not an optimal solver. The playthrough is replayed into a state
//! trace, detours that return to an earlier exact state are cut out, then at
//! each trace index a bounded breadth-first search looks for a shorter move
//! sequence reaching a later trace state (or a win, if the playthrough wins).
//! The result never gets longer and always replays without invalid moves.

use std::collections::{HashMap, HashSet, VecDeque};

use crate::error::ReplayError;
use crate::settings::SimplifierSettings;
use crate::sim::{Level, MoveInput, available_moves, replay, take_move};

/// What the visitor wants done with a newly reached state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visit {
    /// Keep searching beyond this state
    Continue,
    /// Don't expand this state
    Prune,
}

/// Breadth-first walk over states reachable from `start` in at most `max_depth` moves
///
/// The visitor sees each distinct state once, with the inputs that first
/// reached it. The start state itself is not visited.
pub fn visit_puzzle_states<F>(start: &Level, max_depth: usize, mut visitor: F)
where
    F: FnMut(&Level, &[MoveInput]) -> Visit,
{
    let mut queue: VecDeque<(Level, Vec<MoveInput>)> = VecDeque::new();
    let mut visited: HashSet<Level> = HashSet::new();

    visited.insert(start.clone());
    queue.push_back((start.clone(), Vec::new()));

    while let Some((state, path)) = queue.pop_front() {
        if path.len() >= max_depth {
            continue;
        }
        for mv in available_moves(&state) {
            let Some(input) = MoveInput::from_move(&mv, &state) else {
                continue;
            };
            let mut next = state.clone();
            take_move(&mv, &mut next);
            if !visited.insert(next.clone()) {
                continue;
            }
            let mut next_path = path.clone();
            next_path.push(input);
            if visitor(&next, &next_path) == Visit::Continue {
                queue.push_back((next, next_path));
            }
        }
    }
}

/// Simplify with the default search depth
pub fn simplify_playthrough(
    inputs: &[MoveInput],
    level: &Level,
) -> Result<Vec<MoveInput>, ReplayError> {
    simplify_playthrough_with(inputs, level, &SimplifierSettings::default())
}

/// Simplify a valid playthrough of `level`
///
/// Errors if `inputs` does not replay; nothing is simplified in that case.
pub fn simplify_playthrough_with(
    inputs: &[MoveInput],
    level: &Level,
    settings: &SimplifierSettings,
) -> Result<Vec<MoveInput>, ReplayError> {
    let mut states = replay(level, inputs)?;
    let mut inputs = inputs.to_vec();
    let original_len = inputs.len();

    remove_cycles(&mut states, &mut inputs);
    truncate_at_first_win(&mut states, &mut inputs);

    let mut i = 0;
    while i + 1 < states.len() {
        match find_best_patch(&states, i, settings.max_depth) {
            Some(patch) => {
                log::debug!(
                    "Patch at {}: {} moves replace {}",
                    i,
                    patch.inputs.len(),
                    patch.end - i
                );
                let patched = replay(&states[i], &patch.inputs)?;
                states.splice(i + 1..=patch.end, patched.into_iter().skip(1));
                inputs.splice(i..patch.end, patch.inputs);
                // Same index again: the shorter trace may allow a further shortcut.
            }
            None => i += 1,
        }
    }

    log::info!("Simplified playthrough from {} to {} moves", original_len, inputs.len());
    Ok(inputs)
}

/// Cut out every detour that comes back to an exact earlier state
///
/// For each index, everything up to the last later occurrence of the same
/// state is dropped, so the trace ends up with no repeated states.
pub fn remove_cycles(states: &mut Vec<Level>, inputs: &mut Vec<MoveInput>) {
    debug_assert_eq!(states.len(), inputs.len() + 1);
    let mut i = 0;
    while i < states.len() {
        if let Some(j) = (i + 1..states.len()).rev().find(|&j| states[j] == states[i]) {
            states.drain(i..j);
            inputs.drain(i..j);
        }
        i += 1;
    }
}

/// Drop moves played after the level was already won
fn truncate_at_first_win(states: &mut Vec<Level>, inputs: &mut Vec<MoveInput>) {
    let Some(last) = states.last() else {
        return;
    };
    if !last.is_won() {
        return;
    }
    if let Some(first) = states.iter().position(Level::is_won) {
        states.truncate(first + 1);
        inputs.truncate(first);
    }
}

/// A shorter route from one trace index to a later one
#[derive(Debug, Clone)]
struct Patch {
    inputs: Vec<MoveInput>,
    /// Trace index the route ends at
    end: usize,
}

/// Search from `states[i]` for the replacement saving the most moves
fn find_best_patch(states: &[Level], i: usize, max_depth: usize) -> Option<Patch> {
    let last = states.len() - 1;
    let finishes_won = states[last].is_won();
    let trace_index: HashMap<&Level, usize> =
        states.iter().enumerate().map(|(index, s)| (s, index)).collect();

    let mut best: Option<Patch> = None;
    let mut best_saving = 0;
    let mut consider = |end: usize, path: &[MoveInput]| {
        let deleted = end - i;
        if deleted > path.len() && deleted - path.len() > best_saving {
            best_saving = deleted - path.len();
            best = Some(Patch {
                inputs: path.to_vec(),
                end,
            });
        }
    };

    visit_puzzle_states(&states[i], max_depth, |state, path| {
        if let Some(&j) = trace_index.get(state) {
            // Earlier states only lead back into detours.
            if j > i {
                consider(j, path);
            }
            return Visit::Prune;
        }
        if finishes_won && state.is_won() {
            consider(last, path);
            return Visit::Prune;
        }
        Visit::Continue
    });

    best
}
