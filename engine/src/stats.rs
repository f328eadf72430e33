//! C9: Session & Stats Aggregator. Updated only from [`crate::game::Event`]s
//! and training-oracle results — never written to directly by a driver —
//! so the running totals can't drift out of step with what actually
//! happened at the table.

use crate::game::{Event, HandOutcome};
use crate::money::Cents;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DrillAccuracy {
    pub attempts: u32,
    pub correct: u32,
}

impl DrillAccuracy {
    pub fn record(&mut self, correct: bool) {
        self.attempts += 1;
        if correct {
            self.correct += 1;
        }
    }

    pub fn accuracy(&self) -> f64 {
        if self.attempts == 0 {
            0.0
        } else {
            self.correct as f64 / self.attempts as f64
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SessionStats {
    pub hands_played: u32,
    pub wins: u32,
    pub losses: u32,
    pub pushes: u32,
    pub blackjacks: u32,
    pub surrenders: u32,
    /// Signed, in cents; positive means the player is ahead overall.
    pub net_result: Cents,
    pub bankroll_history: Vec<Cents>,
    pub counting_accuracy: DrillAccuracy,
    pub strategy_accuracy: DrillAccuracy,
    pub deviation_accuracy: DrillAccuracy,
    pub speed_best_score: Option<f64>,
}

impl Default for SessionStats {
    fn default() -> Self {
        SessionStats {
            hands_played: 0,
            wins: 0,
            losses: 0,
            pushes: 0,
            blackjacks: 0,
            surrenders: 0,
            net_result: Cents::ZERO,
            bankroll_history: vec![Cents::ZERO],
            counting_accuracy: DrillAccuracy::default(),
            strategy_accuracy: DrillAccuracy::default(),
            deviation_accuracy: DrillAccuracy::default(),
            speed_best_score: None,
        }
    }
}

impl SessionStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Folds in every settlement event from one `Session::step` call. Other
    /// event kinds (cards dealt, splits, reshuffles) don't move the
    /// aggregate and are ignored here.
    pub fn apply_events(&mut self, events: &[Event]) {
        for event in events {
            if let Event::HandSettled { outcome, payout, .. } = event {
                self.hands_played += 1;
                self.net_result += *payout;
                self.bankroll_history.push(self.net_result);
                match outcome {
                    HandOutcome::Win => self.wins += 1,
                    HandOutcome::BlackjackWin => {
                        self.wins += 1;
                        self.blackjacks += 1;
                    }
                    HandOutcome::Loss => self.losses += 1,
                    HandOutcome::Push => self.pushes += 1,
                    HandOutcome::Surrender => self.surrenders += 1,
                }
            }
        }
    }

    pub fn record_counting_drill(&mut self, correct: bool) {
        self.counting_accuracy.record(correct);
    }

    pub fn record_strategy_drill(&mut self, correct: bool) {
        self.strategy_accuracy.record(correct);
    }

    pub fn record_deviation_drill(&mut self, correct: bool) {
        self.deviation_accuracy.record(correct);
    }

    /// `score` is a [`crate::training::speed_drill_score`] result; higher is
    /// better, so this tracks the maximum rather than the fastest time.
    pub fn record_speed_drill(&mut self, score: f64) {
        self.speed_best_score = Some(match self.speed_best_score {
            Some(best) => best.max(score),
            None => score,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hand_settlements_accumulate_net_result() {
        let mut stats = SessionStats::new();
        stats.apply_events(&[
            Event::HandSettled { hand_index: 0, outcome: HandOutcome::Win, payout: Cents(1000) },
            Event::HandSettled { hand_index: 0, outcome: HandOutcome::Loss, payout: Cents(-500) },
        ]);
        assert_eq!(stats.hands_played, 2);
        assert_eq!(stats.wins, 1);
        assert_eq!(stats.losses, 1);
        assert_eq!(stats.net_result, Cents(500));
        assert_eq!(stats.bankroll_history, vec![Cents::ZERO, Cents(1000), Cents(500)]);
    }

    #[test]
    fn blackjack_win_counts_toward_both_wins_and_blackjacks() {
        let mut stats = SessionStats::new();
        stats.apply_events(&[Event::HandSettled {
            hand_index: 0,
            outcome: HandOutcome::BlackjackWin,
            payout: Cents(1500),
        }]);
        assert_eq!(stats.wins, 1);
        assert_eq!(stats.blackjacks, 1);
    }

    #[test]
    fn non_settlement_events_do_not_move_the_aggregate() {
        let mut stats = SessionStats::new();
        stats.apply_events(&[Event::ShoeReshuffled]);
        assert_eq!(stats.hands_played, 0);
    }

    #[test]
    fn drill_accuracy_tracks_ratio() {
        let mut stats = SessionStats::new();
        stats.record_strategy_drill(true);
        stats.record_strategy_drill(false);
        assert_eq!(stats.strategy_accuracy.accuracy(), 0.5);
    }

    #[test]
    fn speed_drill_keeps_the_best_score() {
        let mut stats = SessionStats::new();
        stats.record_speed_drill(60.0);
        stats.record_speed_drill(90.0);
        stats.record_speed_drill(75.0);
        assert_eq!(stats.speed_best_score, Some(90.0));
    }
}
