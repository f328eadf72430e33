//! C8: Training Oracles. Each drill is a pure generator/grading function
//! pair over the domain types already built (counting, strategy,
//! deviations) plus an opaque-handle registry so a driver can issue a
//! counting or speed drill, let time pass, and verify exactly one
//! submission against it. Strategy and deviation drills carry no hidden
//! state between issue and grade — the scenario already names everything
//! needed to check an answer — so they skip the registry entirely.

use std::collections::HashMap;

use rand::rngs::StdRng;
use rand::Rng;
use rand::SeedableRng;

use crate::card::{Card, Rank, Suit};
use crate::counting::{CountingState, System};
use crate::deviations::{self, DeviationRule, Trigger, INDEX_PLAYS};
use crate::error::{EngineError, EngineResult};
use crate::hand::Hand;
use crate::money::Cents;
use crate::rules::RuleSet;
use crate::strategy::{self, Action};

fn rng_from_seed(seed: Option<u64>) -> StdRng {
    match seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_entropy(),
    }
}

fn random_rank(rng: &mut StdRng) -> Rank {
    Rank::ALL[rng.gen_range(0..Rank::ALL.len())]
}

#[derive(Debug, Clone, PartialEq)]
pub struct CountingDrill {
    pub cards: Vec<Rank>,
    pub expected_count: i64,
}

/// Draws `num_cards` random ranks and reports the running count a player
/// tracking `system` over `num_decks` should reach after seeing them.
pub fn counting_drill(num_cards: u32, system: System, num_decks: u32, seed: Option<u64>) -> CountingDrill {
    let mut rng = rng_from_seed(seed);
    let mut state = CountingState::new(system, num_decks);
    let mut cards = Vec::with_capacity(num_cards as usize);
    for _ in 0..num_cards {
        let rank = random_rank(&mut rng);
        state.observe(rank);
        cards.push(rank);
    }
    CountingDrill { cards, expected_count: state.running_count }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VerifyCountResult {
    pub correct: bool,
    pub expected: i64,
    /// Present only when the drill that issued this handle carried a
    /// wall-clock component (a speed drill).
    pub score: Option<f64>,
}

/// What a registry entry remembers between issuing a drill and verifying
/// the one submission it allows.
#[derive(Debug, Clone, Copy)]
struct DrillPayload {
    expected_running_count: i64,
    num_cards: u32,
}

/// Issues opaque handles for in-flight counting/speed drills and ensures
/// each is verified at most once. Any reference to an unknown or
/// already-verified handle is a protocol error, not a silent no-op.
#[derive(Debug, Default)]
pub struct DrillRegistry {
    next_id: u64,
    open: HashMap<u64, DrillPayload>,
}

impl DrillRegistry {
    pub fn new() -> Self {
        DrillRegistry { next_id: 1, open: HashMap::new() }
    }

    fn issue(&mut self, payload: DrillPayload) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.open.insert(id, payload);
        id
    }

    /// Issues a counting drill; the matching `verify_count` call should
    /// pass `elapsed_ms: None`.
    pub fn issue_counting_drill(
        &mut self,
        num_cards: u32,
        system: System,
        num_decks: u32,
        seed: Option<u64>,
    ) -> (u64, CountingDrill) {
        let drill = counting_drill(num_cards, system, num_decks, seed);
        let id = self.issue(DrillPayload { expected_running_count: drill.expected_count, num_cards });
        (id, drill)
    }

    /// Issues a speed drill. The payload is identical to a counting
    /// drill's; only the `verify_count` call differs, supplying
    /// `elapsed_ms` so a score is computed.
    pub fn issue_speed_drill(
        &mut self,
        num_cards: u32,
        system: System,
        num_decks: u32,
        seed: Option<u64>,
    ) -> (u64, CountingDrill) {
        self.issue_counting_drill(num_cards, system, num_decks, seed)
    }

    pub fn is_open(&self, id: u64) -> bool {
        self.open.contains_key(&id)
    }

    /// Verifies `user_count` against the drill issued as `id`, discarding
    /// the handle regardless of the outcome. `elapsed_ms` turns this into
    /// a speed-drill grade with a non-`None` score.
    pub fn verify_count(
        &mut self,
        id: u64,
        user_count: i64,
        elapsed_ms: Option<u64>,
    ) -> EngineResult<VerifyCountResult> {
        let payload = self.open.remove(&id).ok_or_else(|| {
            EngineError::DrillProtocol(format!("drill {id} is not open (unknown or already completed)"))
        })?;
        let correct = user_count == payload.expected_running_count;
        let score = elapsed_ms.map(|ms| speed_drill_score(payload.num_cards, ms, correct));
        Ok(VerifyCountResult { correct, expected: payload.expected_running_count, score })
    }
}

/// Time-bonus schedule for a speed drill, fastest bucket first:
/// `(elapsed_ms_ceiling, bonus)`. A submission slower than the last
/// bucket earns no bonus at all.
const TIME_BONUS_SCHEDULE: &[(u64, f64)] = &[
    (750, 50.0),
    (1500, 30.0),
    (2500, 15.0),
    (4000, 5.0),
];

/// `score = base + time_bonus - accuracy_penalty`. `base` is proportional
/// to the number of cards counted; an incorrect submission applies an
/// infinite accuracy penalty, i.e. scores zero outright rather than just
/// losing the time bonus.
pub fn speed_drill_score(num_cards: u32, elapsed_ms: u64, correct: bool) -> f64 {
    if !correct {
        return 0.0;
    }
    let base = num_cards as f64 * 10.0;
    let time_bonus = TIME_BONUS_SCHEDULE
        .iter()
        .find(|&&(ceiling, _)| elapsed_ms <= ceiling)
        .map(|&(_, bonus)| bonus)
        .unwrap_or(0.0);
    base + time_bonus
}

#[derive(Debug, Clone)]
pub struct StrategyDrillScenario {
    pub hand: Hand,
    pub dealer_up: Rank,
    pub expected: Action,
}

/// Deals a random two-card hand and dealer upcard and resolves the basic
/// strategy action for it up front, so a driver doesn't need a second
/// round trip before grading.
pub fn generate_strategy_drill(rules: &RuleSet, seed: Option<u64>) -> StrategyDrillScenario {
    let mut rng = rng_from_seed(seed);
    let mut hand = Hand::new(Cents::ZERO);
    hand.push(Card { rank: random_rank(&mut rng), suit: Suit::Spade });
    hand.push(Card { rank: random_rank(&mut rng), suit: Suit::Heart });
    let dealer_up = random_rank(&mut rng);
    let expected = strategy::recommend(&hand, dealer_up, rules);
    StrategyDrillScenario { hand, dealer_up, expected }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeviationDrillScenario {
    pub rule: &'static DeviationRule,
    pub hand_total: u16,
    pub dealer_up: Rank,
    pub true_count: f64,
    pub basic_action: Action,
    pub expected: Action,
}

/// Builds a plausible two-card hard hand totaling `total`, avoiding an
/// accidental pair so the synthetic hand doesn't get routed through the
/// split chart instead of the hard-total chart it's meant to represent.
fn synth_hard_hand(total: u16) -> Hand {
    let mut a = total.saturating_sub(2).min(10).max(2);
    let mut b = total - a;
    if b < 2 {
        b = 2;
        a = total - b;
    }
    if a == b {
        if a > 2 {
            a -= 1;
            b += 1;
        } else {
            a += 1;
            b -= 1;
        }
    }
    let mut hand = Hand::new(Cents::ZERO);
    hand.push(Card { rank: Rank::from_blackjack_value(a as u8), suit: Suit::Spade });
    hand.push(Card { rank: Rank::from_blackjack_value(b as u8), suit: Suit::Heart });
    hand
}

/// Samples an index play from the Illustrious 18 + Fab 4 table and a true
/// count inside `true_count_range`, biased toward rules whose own
/// threshold actually lies in that range so the sampled count crosses a
/// real decision boundary rather than landing in a dead zone where no
/// rule in the table fires.
pub fn generate_deviation_drill(
    rules: &RuleSet,
    true_count_range: (f64, f64),
    seed: Option<u64>,
) -> DeviationDrillScenario {
    let mut rng = rng_from_seed(seed);
    let (lo, hi) = true_count_range;

    let in_range: Vec<&'static DeviationRule> =
        INDEX_PLAYS.iter().filter(|r| (lo..=hi).contains(&r.index)).collect();
    let rule: &'static DeviationRule = if in_range.is_empty() {
        &INDEX_PLAYS[rng.gen_range(0..INDEX_PLAYS.len())]
    } else {
        in_range[rng.gen_range(0..in_range.len())]
    };

    let true_count = if lo < hi { rng.gen_range(lo..hi) } else { lo };

    let Trigger::PlayerTotal { total, dealer_up, .. } = rule.trigger else {
        unreachable!("the index-play table only contains player-total triggers today")
    };
    let hand = synth_hard_hand(total);
    let basic_action = strategy::recommend(&hand, dealer_up, rules);
    let expected = deviations::resolve(rule.trigger, true_count, basic_action);

    DeviationDrillScenario { rule, hand_total: total, dealer_up, true_count, basic_action, expected }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StrategyDrillResult {
    pub expected: Action,
    pub submitted: Action,
    pub correct: bool,
}

pub fn grade_strategy_drill(
    hand: &Hand,
    dealer_up: Rank,
    rules: &RuleSet,
    submitted: Action,
) -> StrategyDrillResult {
    let expected = strategy::recommend(hand, dealer_up, rules);
    StrategyDrillResult {
        expected,
        submitted,
        correct: expected == submitted,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviationDrillResult {
    pub expected: Action,
    pub submitted: Action,
    pub correct: bool,
    /// Whether a deviation actually fired; a drill scenario with no active
    /// deviation just tests that the player doesn't deviate needlessly.
    pub deviation_applies: bool,
}

pub fn grade_deviation_drill(
    trigger: Trigger,
    true_count: f64,
    basic_action: Action,
    submitted: Action,
) -> DeviationDrillResult {
    let expected = deviations::resolve(trigger, true_count, basic_action);
    DeviationDrillResult {
        expected,
        submitted,
        correct: expected == submitted,
        deviation_applies: expected != basic_action,
    }
}
