use crate::leaderboard::{LeaderboardEntry, position_of};

pub const DEFAULT_WINDOW_SIZE: usize = 7;
pub const DEFAULT_SPREAD: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowParams {
    pub window_size: usize,
    pub spread: usize,
}

impl Default for WindowParams {
    fn default() -> Self {
        Self {
            window_size: DEFAULT_WINDOW_SIZE,
            spread: DEFAULT_SPREAD,
        }
    }
}

impl WindowParams {
    /// Odd-sized window centred on the focal row.
    pub fn centered(window_size: usize) -> Self {
        let window_size = window_size.max(1);
        Self {
            window_size,
            spread: (window_size - 1) / 2,
        }
    }
}

/// Index range of the rows to display.
///
/// Without a focal participant (or when it is not ranked) this is the top
/// `window_size` rows. Otherwise it is `spread` rows either side of the
/// focal row, clipped at both ends of the table rather than shifted.
/// A focal row at rank 1 therefore gets `spread + 1` rows, not a padded
/// full window. A zero-sized window is always empty.
pub fn window_range(
    ranked: &[LeaderboardEntry],
    focal_id: Option<&str>,
    params: WindowParams,
) -> (usize, usize) {
    let total = ranked.len();
    let focal = focal_id.and_then(|id| position_of(ranked, id));
    let Some(pos) = focal else {
        return (0, params.window_size.min(total));
    };
    if params.window_size == 0 {
        return (pos, pos);
    }

    // A spread wider than the window would overflow it.
    let spread = params.spread.min(params.window_size.saturating_sub(1) / 2);
    let start = pos.saturating_sub(spread);
    let end = (pos + spread + 1).min(total);
    (start, end)
}

pub fn select<'a>(
    ranked: &'a [LeaderboardEntry],
    focal_id: Option<&str>,
    params: WindowParams,
) -> &'a [LeaderboardEntry] {
    let (start, end) = window_range(ranked, focal_id, params);
    &ranked[start..end]
}
