//! Rate limiting of landmark scans.

/// World time in ticks.
pub type GameTick = u64;

/// Whether a render pass at `now` may also scan for landmarks.
///
/// The caller records `now` as the new `last_search_tick` only when it goes
/// ahead with the scan.
pub fn should_search(now: GameTick, last_search_tick: Option<GameTick>, cooldown_ticks: u64) -> bool {
    match last_search_tick {
        None => true,
        Some(last) => now.saturating_sub(last) >= cooldown_ticks,
    }
}
