//! Chain-reaction resolution.

use std::collections::HashSet;

use chainforge_protocol::{ExplosionEvent, PlayerId};
use tracing::trace;

use crate::board::{Board, Position};

/// Runs explosions until no cell that has not yet burst in this run is
/// eligible to explode, returning every event in order.
///
/// A position is visited at most once per run. If later captures push an
/// already-visited cell back to capacity it stays overfull until the next
/// run, so one run produces at most `rows * cols` explosions.
///
/// Each pass records the owner of every candidate when the pass is
/// collected. A candidate captured by an earlier explosion in the same
/// pass no longer belongs to that owner, so it does not go off: it counts
/// as visited and keeps its tokens for the next run.
pub fn resolve_chain(board: &mut Board) -> Vec<ExplosionEvent> {
    let mut visited: HashSet<Position> = HashSet::new();
    let mut events = Vec::new();

    loop {
        let batch: Vec<(Position, PlayerId)> = board
            .explosion_candidates()
            .into_iter()
            .filter(|pos| !visited.contains(pos))
            .filter_map(|pos| Some((pos, board.cell(pos)?.owner()?)))
            .collect();
        if batch.is_empty() {
            break;
        }

        for (pos, owner) in batch {
            visited.insert(pos);
            match board.explode(pos, owner) {
                Ok(burst) => {
                    trace!(row = pos.row, col = pos.col, %owner, captured = burst.len() - 1, "cell exploded");
                    events.extend(burst);
                }
                Err(e) => trace!(%owner, error = %e, "captured before its turn, skipped"),
            }
        }
    }

    events
}
