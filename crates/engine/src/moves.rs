use crate::core::{find_matches, get_cluster, Grid, MatchSet};
use crate::types::{Direction, GameMode, InputEvent, Position, MIN_CLUSTER};

/// A swap that produces at least one run, with how many balloons its first wave pops
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RankedSwap {
    pub from: Position,
    pub direction: Direction,
    pub first_wave: usize,
}

impl RankedSwap {
    pub fn input(&self) -> InputEvent {
        InputEvent::Swap {
            from: self.from,
            direction: self.direction,
        }
    }
}

/// Every matching swap, each pair listed once (as a Right or Down swipe).
pub fn legal_swaps(grid: &Grid) -> Vec<(Position, Direction)> {
    rank_swaps(grid)
        .into_iter()
        .map(|s| (s.from, s.direction))
        .collect()
}

/// Matching swaps with the size of their first wave, row-major order.
pub fn rank_swaps(grid: &Grid) -> Vec<RankedSwap> {
    let mut out = Vec::new();
    let mut trial = grid.clone();
    for from in grid.positions() {
        for direction in [Direction::Right, Direction::Down] {
            let Some(target) = grid.neighbor(from, direction) else {
                continue;
            };
            trial.swap(from, target);
            let first_wave = find_matches(&trial).len();
            trial.swap(from, target);
            if first_wave > 0 {
                out.push(RankedSwap {
                    from,
                    direction,
                    first_wave,
                });
            }
        }
    }
    out
}

/// Distinct tappable clusters, ordered by their top-left member.
pub fn tap_targets(grid: &Grid) -> Vec<MatchSet> {
    let mut seen = MatchSet::new();
    let mut out = Vec::new();
    for pos in grid.positions() {
        if seen.contains(pos) || grid.color(pos).is_none() {
            continue;
        }
        let cluster = get_cluster(grid, pos);
        seen.extend(&cluster);
        if cluster.len() >= MIN_CLUSTER {
            out.push(cluster);
        }
    }
    out
}

/// Suggest the move that pops the most balloons right away.
///
/// Ties go to the earliest candidate in row-major order. Cascades are not
/// looked ahead since refill colors are unknown.
pub fn hint(grid: &Grid, mode: GameMode) -> Option<InputEvent> {
    match mode {
        GameMode::Swap => rank_swaps(grid)
            .into_iter()
            .fold(None::<RankedSwap>, |best, s| match best {
                Some(b) if b.first_wave >= s.first_wave => Some(b),
                _ => Some(s),
            })
            .map(|s| s.input()),
        GameMode::Tap => tap_targets(grid)
            .into_iter()
            .fold(None::<MatchSet>, |best, c| match best {
                Some(b) if b.len() >= c.len() => Some(b),
                _ => Some(c),
            })
            .and_then(|c| c.iter().next())
            .map(|at| InputEvent::Tap { at }),
    }
}
