//! Core engine for a blackjack card-counting trainer: shoe and hand
//! mechanics, four counting systems, basic strategy with index-play
//! deviations, a composition-aware probability/edge engine, a sealed-state
//! game session, training-drill oracles, and session statistics.
//!
//! The crate is deterministic given a seed and has no I/O of its own;
//! `engine-cli` is one possible driver.

pub mod card;
pub mod composition;
pub mod counting;
pub mod deviations;
pub mod error;
pub mod game;
pub mod hand;
pub mod money;
pub mod probability;
pub mod rules;
pub mod shoe;
pub mod stats;
pub mod strategy;
pub mod training;

pub use card::{Card, Rank, Suit};
pub use counting::{CountingState, System as CountingSystem};
pub use error::{EngineError, EngineResult};
pub use game::{
    ActionKind, Command, CountingView, DealerHandView, Event, GameState, HandOutcome, HandView,
    Session, ShoeView, StateSnapshot, StepReport,
};
pub use hand::Hand;
pub use money::Cents;
pub use rules::RuleSet;
pub use shoe::Shoe;
pub use stats::SessionStats;
pub use strategy::Action;

use serde::{Deserialize, Serialize};

/// A point-in-time record of a session, suitable for persistence between
/// driver invocations. Round-trips through `serde` so `engine-cli` can
/// write it to disk between runs without the engine knowing anything about
/// files. Distinct from [`game::StateSnapshot`], the live query view a
/// driver polls mid-session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistedState {
    pub format_version: u32,
    pub rules: RuleSet,
    pub counting_system: CountingSystem,
    pub running_count: i64,
    pub cards_seen: u32,
    pub bankroll_cents: i64,
    pub stats: SnapshotStats,
}

/// The subset of [`SessionStats`] worth persisting; bankroll history is
/// capped by the driver before snapshotting, not here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotStats {
    pub hands_played: u32,
    pub wins: u32,
    pub losses: u32,
    pub pushes: u32,
    pub blackjacks: u32,
    pub surrenders: u32,
    pub net_result_cents: i64,
}

pub const SNAPSHOT_FORMAT_VERSION: u32 = 1;

impl PersistedState {
    pub fn capture(session: &Session, stats: &SessionStats) -> Self {
        PersistedState {
            format_version: SNAPSHOT_FORMAT_VERSION,
            rules: session.rules,
            counting_system: session.counting().system,
            running_count: session.counting().running_count,
            cards_seen: session.counting().cards_seen,
            bankroll_cents: session.bankroll().0,
            stats: SnapshotStats {
                hands_played: stats.hands_played,
                wins: stats.wins,
                losses: stats.losses,
                pushes: stats.pushes,
                blackjacks: stats.blackjacks,
                surrenders: stats.surrenders,
                net_result_cents: stats.net_result.0,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_captures_session_and_stats() {
        let session = Session::new(
            RuleSet::default(),
            CountingSystem::HiLo,
            Some(1),
            Cents::from_dollars(1_000.0),
        )
        .unwrap();
        let stats = SessionStats::new();
        let snapshot = PersistedState::capture(&session, &stats);
        assert_eq!(snapshot.format_version, SNAPSHOT_FORMAT_VERSION);
        assert_eq!(snapshot.counting_system, CountingSystem::HiLo);
        assert_eq!(snapshot.stats.hands_played, 0);
    }
}
