//! C7: Game State Machine. Design Note §9 ("Runtime phase guards") replaces
//! the teacher's `#[allowed_phase(...)]` proc-macro attribute (a string-typed
//! runtime check on every method) with a sealed `GameState` enum and a single
//! exhaustive `match (state, command)` in [`Session::step`]. An illegal
//! transition is a compile-time-checked match arm, not a runtime string
//! comparison, and always returns `EngineError::Validation` rather than
//! panicking.

use std::collections::HashSet;

use crate::card::Card;
use crate::counting::CountingState;
use crate::error::{EngineError, EngineResult};
use crate::hand::Hand;
use crate::money::Cents;
use crate::rules::{RuleSet, SurrenderPolicy};
use crate::shoe::Shoe;
use crate::strategy::Action;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameState {
    AwaitingBet,
    DealingInitial,
    AwaitingInsurance,
    PlayerTurn { hand_index: usize },
    DealerTurn,
    RoundSettled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    PlaceBet(Cents),
    DealInitial,
    TakeInsurance,
    DeclineInsurance,
    Hit,
    Stand,
    Double,
    Split,
    Surrender,
    PlayDealer,
    StartNewRound,
    ResetGame,
}

/// The command kinds [`Session::available_actions`] can report as legal
/// right now, one per [`Command`] variant modulo payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
    PlaceBet,
    DealInitial,
    TakeInsurance,
    DeclineInsurance,
    Hit,
    Stand,
    Double,
    Split,
    Surrender,
    PlayDealer,
    StartNewRound,
    ResetGame,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandOutcome {
    Win,
    BlackjackWin,
    Loss,
    Push,
    Surrender,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    BetPlaced(Cents),
    CardDealtToPlayer { hand_index: usize, card: Card },
    CardDealtToDealer(Card),
    PlayerNatural { hand_index: usize },
    DealerNatural,
    InsuranceOffered,
    InsuranceResolved { won: bool },
    HandBusted { hand_index: usize },
    HandDoubled { hand_index: usize },
    HandSplit { from: usize, into: usize },
    HandSurrendered { hand_index: usize },
    DealerHit(Card),
    DealerStood(u16),
    DealerBusted,
    HandSettled { hand_index: usize, outcome: HandOutcome, payout: Cents },
    ShoeReshuffled,
    /// The shoe ran out mid-deal; the round is voided as a push rather than
    /// propagating the failure with partial state already mutated.
    RoundVoided(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct StepReport {
    pub state: GameState,
    pub events: Vec<Event>,
}

/// A single player hand as reported by [`Session::snapshot`].
#[derive(Debug, Clone, PartialEq)]
pub struct HandView {
    pub cards: Vec<Card>,
    pub total: u16,
    pub is_soft: bool,
    pub is_pair: bool,
    pub is_busted: bool,
    pub is_blackjack: bool,
    pub bet: Cents,
    pub from_split: bool,
}

/// The dealer's hand as reported by [`Session::snapshot`]; the hole card is
/// hidden (along with the total it would reveal) while the player still has
/// a decision to make.
#[derive(Debug, Clone, PartialEq)]
pub struct DealerHandView {
    pub cards: Vec<Card>,
    pub hole_card_hidden: bool,
    pub visible_total: Option<u16>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShoeView {
    pub cards_remaining: usize,
    pub decks_remaining: f64,
    pub needs_shuffle: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CountingView {
    pub system: crate::counting::System,
    pub running_count: i64,
    pub true_count: f64,
    pub ace_side_count: Option<i64>,
}

/// A live, query-shaped view of a [`Session`] fit for rendering a UI or
/// driving a bot: every field a caller needs to decide its next command,
/// recomputed fresh each call rather than cached. Distinct from the
/// point-in-time record [`crate::PersistedState`] captures for storage
/// between runs.
#[derive(Debug, Clone, PartialEq)]
pub struct StateSnapshot {
    pub state: GameState,
    pub player_hands: Vec<HandView>,
    pub current_hand_index: Option<usize>,
    pub dealer_hand: DealerHandView,
    pub bankroll: Cents,
    pub shoe: ShoeView,
    pub counting: CountingView,
    pub can_hit: bool,
    pub can_stand: bool,
    pub can_double: bool,
    pub can_split: bool,
    pub can_surrender: bool,
    pub can_insure: bool,
    pub last_result: Option<HandOutcome>,
}

/// One round of blackjack: the dealer plus however many hands the player
/// has split into, all sharing one shoe and one running count.
pub struct Session {
    pub rules: RuleSet,
    shoe: Shoe,
    counting: CountingState,
    counting_system: crate::counting::System,
    seed: Option<u64>,
    state: GameState,
    player_hands: Vec<Hand>,
    dealer_hand: Hand,
    insurance_bet: Cents,
    current_bet: Cents,
    bankroll: Cents,
    starting_bankroll: Cents,
    last_outcome: Option<HandOutcome>,
}

impl Session {
    pub fn new(
        rules: RuleSet,
        system: crate::counting::System,
        seed: Option<u64>,
        starting_bankroll: Cents,
    ) -> EngineResult<Self> {
        rules.validate()?;
        let shoe = Shoe::new(rules.num_decks, rules.penetration, seed)?;
        let counting = CountingState::new(system, rules.num_decks);
        Ok(Session {
            rules,
            shoe,
            counting,
            counting_system: system,
            seed,
            state: GameState::AwaitingBet,
            player_hands: Vec::new(),
            dealer_hand: Hand::new(Cents::ZERO),
            insurance_bet: Cents::ZERO,
            current_bet: Cents::ZERO,
            bankroll: starting_bankroll,
            starting_bankroll,
            last_outcome: None,
        })
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn player_hands(&self) -> &[Hand] {
        &self.player_hands
    }

    pub fn dealer_hand(&self) -> &Hand {
        &self.dealer_hand
    }

    pub fn counting(&self) -> &CountingState {
        &self.counting
    }

    pub fn shoe(&self) -> &Shoe {
        &self.shoe
    }

    pub fn bankroll(&self) -> Cents {
        self.bankroll
    }

    fn active_hand_index(&self) -> EngineResult<usize> {
        match self.state {
            GameState::PlayerTurn { hand_index } => Ok(hand_index),
            _ => Err(EngineError::validation("no hand is currently active")),
        }
    }

    fn advance_to_next_hand_or_dealer(&mut self, from: usize) -> GameState {
        let next = (from + 1..self.player_hands.len())
            .find(|&i| !self.player_hands[i].is_bust() && !self.player_hands[i].surrendered);
        match next {
            Some(i) => GameState::PlayerTurn { hand_index: i },
            None => GameState::DealerTurn,
        }
    }

    /// Draws one card, observing it into the count. `None` means the shoe
    /// is exhausted; the caller is responsible for voiding the round.
    fn try_deal(&mut self) -> Option<Card> {
        match self.shoe.deal() {
            Ok(card) => {
                self.counting.observe(card.rank);
                Some(card)
            }
            Err(EngineError::ShoeExhausted(_)) => None,
            Err(other) => unreachable!("Shoe::deal only fails with ShoeExhausted, got {other:?}"),
        }
    }

    /// Ends the round as a push on every hand and the insurance side bet
    /// (if any), used when a deal mid-round can't be completed.
    fn void_round_as_push(&mut self) -> Vec<Event> {
        let mut events = Vec::with_capacity(self.player_hands.len() + 1);
        for i in 0..self.player_hands.len() {
            events.push(Event::HandSettled { hand_index: i, outcome: HandOutcome::Push, payout: Cents::ZERO });
        }
        if self.insurance_bet != Cents::ZERO {
            events.push(Event::HandSettled { hand_index: 0, outcome: HandOutcome::Push, payout: Cents::ZERO });
        }
        self.state = GameState::RoundSettled;
        events
    }

    /// Deals one card into `player_hands[hand_index]`. Returns `false`
    /// (after voiding the round) if the shoe is exhausted.
    fn deal_into_player(&mut self, hand_index: usize, events: &mut Vec<Event>) -> bool {
        match self.try_deal() {
            Some(card) => {
                self.player_hands[hand_index].push(card);
                events.push(Event::CardDealtToPlayer { hand_index, card });
                true
            }
            None => {
                events.push(Event::RoundVoided("shoe exhausted while dealing to the player".to_string()));
                events.extend(self.void_round_as_push());
                false
            }
        }
    }

    /// Deals one card into the dealer's hand as part of the initial deal.
    fn deal_into_dealer(&mut self, events: &mut Vec<Event>) -> bool {
        match self.try_deal() {
            Some(card) => {
                self.dealer_hand.push(card);
                events.push(Event::CardDealtToDealer(card));
                true
            }
            None => {
                events.push(Event::RoundVoided("shoe exhausted while dealing to the dealer".to_string()));
                events.extend(self.void_round_as_push());
                false
            }
        }
    }

    /// Deals one card into the dealer's hand as a hit during `PlayDealer`.
    fn deal_dealer_hit(&mut self, events: &mut Vec<Event>) -> bool {
        match self.try_deal() {
            Some(card) => {
                self.dealer_hand.push(card);
                events.push(Event::DealerHit(card));
                true
            }
            None => {
                events.push(Event::RoundVoided("shoe exhausted during the dealer's hand".to_string()));
                events.extend(self.void_round_as_push());
                false
            }
        }
    }

    fn hand_can_double(&self, hand: &Hand) -> bool {
        hand.len() == 2
            && (!hand.from_split || self.rules.double_after_split)
            && self.rules.double_allowed_on_total(hand.total(), hand.is_soft())
    }

    fn hand_can_split(&self, hand_index: usize) -> bool {
        let hand = &self.player_hands[hand_index];
        let splits_so_far = self.player_hands.len() as u8 - 1;
        let is_aces = hand.cards()[0].blackjack_value() == 1;
        hand.is_pair()
            && splits_so_far < self.rules.max_splits
            && (!is_aces || self.rules.resplit_aces || splits_so_far == 0)
    }

    fn hand_can_surrender(&self, hand: &Hand) -> bool {
        self.rules.surrender_allowed != SurrenderPolicy::None && hand.len() == 2 && !hand.from_split
    }

    /// The set of commands that would not return `EngineError::Validation`
    /// if issued against this session right now (`ResetGame` is always
    /// legal, from any state).
    pub fn available_actions(&self) -> HashSet<ActionKind> {
        let mut actions = HashSet::new();
        actions.insert(ActionKind::ResetGame);
        match self.state {
            GameState::AwaitingBet => {
                actions.insert(ActionKind::PlaceBet);
            }
            GameState::DealingInitial => {
                actions.insert(ActionKind::DealInitial);
            }
            GameState::AwaitingInsurance => {
                actions.insert(ActionKind::TakeInsurance);
                actions.insert(ActionKind::DeclineInsurance);
            }
            GameState::PlayerTurn { hand_index } => {
                actions.insert(ActionKind::Hit);
                actions.insert(ActionKind::Stand);
                let hand = &self.player_hands[hand_index];
                if self.hand_can_double(hand) {
                    actions.insert(ActionKind::Double);
                }
                if self.hand_can_split(hand_index) {
                    actions.insert(ActionKind::Split);
                }
                if self.hand_can_surrender(hand) {
                    actions.insert(ActionKind::Surrender);
                }
            }
            GameState::DealerTurn => {
                actions.insert(ActionKind::PlayDealer);
            }
            GameState::RoundSettled => {
                actions.insert(ActionKind::StartNewRound);
            }
        }
        actions
    }

    /// A live, recomputed-each-call view of this session's state, suitable
    /// for rendering a UI.
    pub fn snapshot(&self) -> StateSnapshot {
        let player_hands = self
            .player_hands
            .iter()
            .map(|h| HandView {
                cards: h.cards().to_vec(),
                total: h.total(),
                is_soft: h.is_soft(),
                is_pair: h.is_pair(),
                is_busted: h.is_bust(),
                is_blackjack: h.is_natural(),
                bet: h.bet,
                from_split: h.from_split,
            })
            .collect();

        let current_hand_index = match self.state {
            GameState::PlayerTurn { hand_index } => Some(hand_index),
            _ => None,
        };

        let hole_card_hidden = matches!(self.state, GameState::PlayerTurn { .. } | GameState::AwaitingInsurance);
        let dealer_hand = DealerHandView {
            cards: self.dealer_hand.cards().to_vec(),
            hole_card_hidden,
            visible_total: if hole_card_hidden {
                self.dealer_hand.cards().first().map(|c| c.blackjack_value() as u16)
            } else if self.dealer_hand.is_empty() {
                None
            } else {
                Some(self.dealer_hand.total())
            },
        };

        let decks_remaining = self.shoe.decks_remaining();
        let shoe = ShoeView {
            cards_remaining: self.shoe.cards_remaining(),
            decks_remaining,
            needs_shuffle: self.shoe.needs_shuffle(),
        };

        let counting = CountingView {
            system: self.counting.system,
            running_count: self.counting.running_count,
            true_count: self.counting.true_count(decks_remaining),
            ace_side_count: if self.counting.system == crate::counting::System::OmegaTwo {
                Some(self.counting.ace_side_count)
            } else {
                None
            },
        };

        let actions = self.available_actions();
        StateSnapshot {
            state: self.state,
            player_hands,
            current_hand_index,
            dealer_hand,
            bankroll: self.bankroll,
            shoe,
            counting,
            can_hit: actions.contains(&ActionKind::Hit),
            can_stand: actions.contains(&ActionKind::Stand),
            can_double: actions.contains(&ActionKind::Double),
            can_split: actions.contains(&ActionKind::Split),
            can_surrender: actions.contains(&ActionKind::Surrender),
            can_insure: actions.contains(&ActionKind::TakeInsurance),
            last_result: self.last_outcome,
        }
    }

    /// The single dispatch point for every legal transition. Every
    /// `(state, command)` pair not covered here falls to the final
    /// catch-all arm and returns `EngineError::Validation` — no panics, no
    /// string-typed phase check.
    pub fn step(&mut self, command: Command) -> EngineResult<StepReport> {
        let mut events = Vec::new();

        match (self.state, command) {
            (GameState::AwaitingBet, Command::PlaceBet(bet)) => {
                if bet.is_negative() || bet == Cents::ZERO {
                    return Err(EngineError::validation("bet must be positive"));
                }
                if bet > self.bankroll {
                    return Err(EngineError::validation("bet exceeds the available bankroll"));
                }
                self.current_bet = bet;
                events.push(Event::BetPlaced(bet));
                self.state = GameState::DealingInitial;
            }

            (GameState::DealingInitial, Command::DealInitial) => {
                if self.shoe.needs_shuffle() {
                    self.shoe.reshuffle();
                    self.counting.reset(self.rules.num_decks);
                    events.push(Event::ShoeReshuffled);
                }

                self.player_hands = vec![Hand::new(self.current_bet)];
                self.dealer_hand = Hand::new(Cents::ZERO);

                if !self.deal_into_player(0, &mut events) {
                    return Ok(StepReport { state: self.state, events });
                }
                if !self.deal_into_dealer(&mut events) {
                    return Ok(StepReport { state: self.state, events });
                }
                if !self.deal_into_player(0, &mut events) {
                    return Ok(StepReport { state: self.state, events });
                }
                if !self.deal_into_dealer(&mut events) {
                    return Ok(StepReport { state: self.state, events });
                }

                let dealer_card_1 = self.dealer_hand.cards()[0];

                let dealer_shows_ace = dealer_card_1.rank == crate::card::Rank::Ace;
                let dealer_peek_card = dealer_card_1.blackjack_value() == 10 || dealer_shows_ace;

                if self.player_hands[0].is_natural() {
                    events.push(Event::PlayerNatural { hand_index: 0 });
                }

                if self.rules.dealer_peeks_on_ten_or_ace && dealer_peek_card && self.dealer_hand.is_natural() {
                    events.push(Event::DealerNatural);
                    self.state = GameState::RoundSettled;
                    events.extend(self.settle_naturals());
                } else if dealer_shows_ace {
                    events.push(Event::InsuranceOffered);
                    self.state = GameState::AwaitingInsurance;
                } else if self.player_hands[0].is_natural() {
                    self.state = GameState::RoundSettled;
                    events.extend(self.settle_naturals());
                } else {
                    self.state = GameState::PlayerTurn { hand_index: 0 };
                }
            }

            (GameState::AwaitingInsurance, Command::TakeInsurance) => {
                self.insurance_bet = self.current_bet.checked_mul_ratio(1, 2).unwrap_or(Cents::ZERO);
                let won = self.dealer_hand.is_natural();
                events.push(Event::InsuranceResolved { won });
                if won {
                    events.push(Event::DealerNatural);
                    self.state = GameState::RoundSettled;
                    events.extend(self.settle_naturals());
                } else if self.player_hands[0].is_natural() {
                    self.state = GameState::RoundSettled;
                    events.extend(self.settle_naturals());
                } else {
                    self.state = GameState::PlayerTurn { hand_index: 0 };
                }
            }

            (GameState::AwaitingInsurance, Command::DeclineInsurance) => {
                self.insurance_bet = Cents::ZERO;
                if self.dealer_hand.is_natural() {
                    events.push(Event::DealerNatural);
                    self.state = GameState::RoundSettled;
                    events.extend(self.settle_naturals());
                } else if self.player_hands[0].is_natural() {
                    self.state = GameState::RoundSettled;
                    events.extend(self.settle_naturals());
                } else {
                    self.state = GameState::PlayerTurn { hand_index: 0 };
                }
            }

            (GameState::PlayerTurn { hand_index }, Command::Hit) => {
                if !self.deal_into_player(hand_index, &mut events) {
                    return Ok(StepReport { state: self.state, events });
                }
                if self.player_hands[hand_index].is_bust() {
                    events.push(Event::HandBusted { hand_index });
                    self.state = self.advance_to_next_hand_or_dealer(hand_index);
                } else {
                    self.state = GameState::PlayerTurn { hand_index };
                }
            }

            (GameState::PlayerTurn { hand_index }, Command::Stand) => {
                self.state = self.advance_to_next_hand_or_dealer(hand_index);
            }

            (GameState::PlayerTurn { hand_index }, Command::Double) => {
                if !self.hand_can_double(&self.player_hands[hand_index]) {
                    return Err(EngineError::validation("double is not allowed on this hand"));
                }
                if !self.deal_into_player(hand_index, &mut events) {
                    return Ok(StepReport { state: self.state, events });
                }
                let hand = &mut self.player_hands[hand_index];
                hand.doubled = true;
                hand.bet += hand.bet;
                events.push(Event::HandDoubled { hand_index });
                if self.player_hands[hand_index].is_bust() {
                    events.push(Event::HandBusted { hand_index });
                }
                self.state = self.advance_to_next_hand_or_dealer(hand_index);
            }

            (GameState::PlayerTurn { hand_index }, Command::Split) => {
                if !self.hand_can_split(hand_index) {
                    return Err(EngineError::validation("split is not allowed on this hand"));
                }
                let is_aces = self.player_hands[hand_index].cards()[0].blackjack_value() == 1;
                let sibling = self.player_hands[hand_index].split_off();
                let new_index = self.player_hands.len();
                self.player_hands.insert(hand_index + 1, sibling);
                events.push(Event::HandSplit { from: hand_index, into: new_index });

                if !self.deal_into_player(hand_index, &mut events) {
                    return Ok(StepReport { state: self.state, events });
                }
                if !self.deal_into_player(hand_index + 1, &mut events) {
                    return Ok(StepReport { state: self.state, events });
                }

                if is_aces && !self.rules.hit_split_aces {
                    self.state = self.advance_to_next_hand_or_dealer(hand_index + 1);
                } else {
                    self.state = GameState::PlayerTurn { hand_index };
                }
            }

            (GameState::PlayerTurn { hand_index }, Command::Surrender) => {
                if !self.hand_can_surrender(&self.player_hands[hand_index]) {
                    return Err(EngineError::validation("surrender is not allowed on this hand"));
                }
                self.player_hands[hand_index].surrendered = true;
                events.push(Event::HandSurrendered { hand_index });
                self.state = self.advance_to_next_hand_or_dealer(hand_index);
            }

            (GameState::DealerTurn, Command::PlayDealer) => {
                let all_resolved = self
                    .player_hands
                    .iter()
                    .all(|h| h.is_bust() || h.surrendered);
                if !all_resolved {
                    let mut voided = false;
                    while self.dealer_hand.total() < 17
                        || (self.dealer_hand.total() == 17 && self.dealer_hand.is_soft() && self.rules.dealer_hits_soft_17)
                    {
                        if !self.deal_dealer_hit(&mut events) {
                            voided = true;
                            break;
                        }
                    }
                    if voided {
                        return Ok(StepReport { state: self.state, events });
                    }
                    if self.dealer_hand.is_bust() {
                        events.push(Event::DealerBusted);
                    } else {
                        events.push(Event::DealerStood(self.dealer_hand.total()));
                    }
                }
                self.state = GameState::RoundSettled;
                events.extend(self.settle_round());
            }

            (GameState::RoundSettled, Command::StartNewRound) => {
                self.player_hands.clear();
                self.dealer_hand = Hand::new(Cents::ZERO);
                self.insurance_bet = Cents::ZERO;
                self.current_bet = Cents::ZERO;
                self.state = GameState::AwaitingBet;
            }

            (_, Command::ResetGame) => {
                self.shoe = Shoe::new(self.rules.num_decks, self.rules.penetration, self.seed)?;
                self.counting = CountingState::new(self.counting_system, self.rules.num_decks);
                self.player_hands.clear();
                self.dealer_hand = Hand::new(Cents::ZERO);
                self.insurance_bet = Cents::ZERO;
                self.current_bet = Cents::ZERO;
                self.bankroll = self.starting_bankroll;
                self.last_outcome = None;
                self.state = GameState::AwaitingBet;
            }

            _ => {
                return Err(EngineError::validation(format!(
                    "{command:?} is not legal in state {:?}",
                    self.state
                )));
            }
        }

        for event in &events {
            if let Event::HandSettled { payout, .. } = event {
                self.bankroll += *payout;
            }
        }
        if let Some(outcome) = events.iter().rev().find_map(|e| match e {
            Event::HandSettled { hand_index: 0, outcome, .. } => Some(*outcome),
            _ => None,
        }) {
            self.last_outcome = Some(outcome);
        }

        Ok(StepReport { state: self.state, events })
    }

    fn settle_naturals(&mut self) -> Vec<Event> {
        let mut events = Vec::new();
        let dealer_natural = self.dealer_hand.is_natural();
        let hand = self.player_hands[0].clone();

        if self.insurance_bet != Cents::ZERO {
            // Insurance pays 2:1; `payout` is net profit/loss, not the
            // amount returned, matching every other settlement below.
            let payout = if dealer_natural {
                self.insurance_bet + self.insurance_bet
            } else {
                -self.insurance_bet
            };
            events.push(Event::HandSettled {
                hand_index: 0,
                outcome: if dealer_natural { HandOutcome::Win } else { HandOutcome::Loss },
                payout,
            });
        }

        let (outcome, payout) = if hand.is_natural() && dealer_natural {
            (HandOutcome::Push, Cents::ZERO)
        } else if dealer_natural {
            (HandOutcome::Loss, -hand.bet)
        } else {
            let (num, den) = self.rules.blackjack_payout.ratio();
            (HandOutcome::BlackjackWin, hand.bet.checked_mul_ratio(num, den).unwrap_or(Cents::ZERO))
        };
        events.push(Event::HandSettled { hand_index: 0, outcome, payout });
        events
    }

    fn settle_round(&mut self) -> Vec<Event> {
        let dealer_total = self.dealer_hand.total();
        let dealer_bust = self.dealer_hand.is_bust();
        let mut events = Vec::with_capacity(self.player_hands.len());

        for (i, hand) in self.player_hands.iter().enumerate() {
            let (outcome, payout) = if hand.surrendered {
                (HandOutcome::Surrender, hand.bet.checked_mul_ratio(-1, 2).unwrap_or(Cents::ZERO))
            } else if hand.is_bust() {
                (HandOutcome::Loss, -hand.bet)
            } else if dealer_bust {
                (HandOutcome::Win, hand.bet)
            } else if hand.total() > dealer_total {
                (HandOutcome::Win, hand.bet)
            } else if hand.total() < dealer_total {
                (HandOutcome::Loss, -hand.bet)
            } else {
                (HandOutcome::Push, Cents::ZERO)
            };
            events.push(Event::HandSettled { hand_index: i, outcome, payout });
        }
        events
    }

    /// Basic-strategy-with-deviation recommendation for the currently
    /// active hand, honoring this session's rule set and true count.
    pub fn recommend_action(&self) -> EngineResult<Action> {
        let hand_index = self.active_hand_index()?;
        let hand = &self.player_hands[hand_index];
        let dealer_up = self.dealer_hand.cards()[0].rank;
        let basic = crate::strategy::recommend(hand, dealer_up, &self.rules);
        let decks_remaining = self.shoe.decks_remaining();
        let tc = self.counting.true_count(decks_remaining);
        let trigger = if hand.is_pair() {
            crate::deviations::Trigger::Pair { rank_value: hand.cards()[0].blackjack_value(), dealer_up }
        } else {
            crate::deviations::Trigger::PlayerTotal { total: hand.total(), is_soft: hand.is_soft(), dealer_up }
        };
        Ok(crate::deviations::resolve(trigger, tc, basic))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::counting::System;

    fn new_session(seed: u64) -> Session {
        Session::new(RuleSet::default(), System::HiLo, Some(seed), Cents::from_dollars(1_000.0)).unwrap()
    }

    #[test]
    fn full_round_runs_start_to_finish() {
        let mut session = new_session(42);
        session.step(Command::PlaceBet(Cents(1000))).unwrap();
        let report = session.step(Command::DealInitial).unwrap();

        match report.state {
            GameState::PlayerTurn { .. } => {
                session.step(Command::Stand).unwrap();
                let report = session.step(Command::PlayDealer).unwrap();
                assert_eq!(report.state, GameState::RoundSettled);
                session.step(Command::StartNewRound).unwrap();
                assert_eq!(session.state(), GameState::AwaitingBet);
            }
            GameState::RoundSettled => {
                session.step(Command::StartNewRound).unwrap();
                assert_eq!(session.state(), GameState::AwaitingBet);
            }
            GameState::AwaitingInsurance => {
                session.step(Command::DeclineInsurance).unwrap();
            }
            _ => panic!("unexpected state after dealing: {:?}", report.state),
        }
    }

    #[test]
    fn illegal_command_is_a_validation_error_not_a_panic() {
        let mut session = new_session(7);
        let result = session.step(Command::Hit);
        assert!(matches!(result, Err(EngineError::Validation(_))));
    }

    #[test]
    fn bust_ends_the_hand_with_a_loss() {
        let mut session = new_session(99);
        session.step(Command::PlaceBet(Cents(1000))).unwrap();
        session.step(Command::DealInitial).unwrap();
        // Drive the hand to whatever state dealing left us in, then make
        // sure hitting to a bust settles as a loss without panicking.
        loop {
            match session.state() {
                GameState::AwaitingInsurance => {
                    session.step(Command::DeclineInsurance).unwrap();
                }
                GameState::PlayerTurn { .. } => break,
                GameState::RoundSettled => return,
                _ => unreachable!(),
            }
        }
        while matches!(session.state(), GameState::PlayerTurn { .. })
            && !session.player_hands()[0].is_bust()
        {
            session.step(Command::Hit).unwrap();
        }
    }
}
