//! End-to-end scenarios exercising the engine's public surface the way a
//! driver would: build a `Session`, feed it commands, and check the
//! domain-level outcome rather than internal state.

use engine::card::{Card, Rank, Suit};
use engine::counting::{CountingState, System};
use engine::deviations::{self, Trigger};
use engine::game::{Command, GameState};
use engine::hand::Hand;
use engine::money::Cents;
use engine::probability;
use engine::rules::{BlackjackPayout, RuleSet};
use engine::strategy::{self, Action};
use engine::Session;

fn card(rank: Rank) -> Card {
    Card { rank, suit: Suit::Spade }
}

#[test]
fn hi_lo_count_over_a_full_deck_returns_to_zero() {
    let mut state = CountingState::new(System::HiLo, 1);
    for rank in Rank::ALL {
        for _ in 0..4 {
            state.observe(rank);
        }
    }
    assert_eq!(state.running_count, 0);
}

#[test]
fn ko_initial_running_count_for_six_decks() {
    let state = CountingState::new(System::Ko, 6);
    assert_eq!(state.running_count, 4 - 4 * 6);
}

#[test]
fn basic_strategy_surrenders_hard_sixteen_against_ten() {
    let mut hand = Hand::new(Cents(1000));
    hand.push(card(Rank::King));
    hand.push(card(Rank::Six));
    let rules = RuleSet::default();
    assert_eq!(strategy::recommend(&hand, Rank::Ten, &rules), Action::Surrender);
}

#[test]
fn illustrious_eighteen_flips_sixteen_vs_ten_around_true_count_zero() {
    let trigger = Trigger::PlayerTotal { total: 16, is_soft: false, dealer_up: Rank::Ten };
    assert_eq!(deviations::resolve(trigger, 1.0, Action::Surrender), Action::Stand);
    assert_eq!(deviations::resolve(trigger, -1.0, Action::Surrender), Action::Surrender);
}

#[test]
fn insurance_crosses_over_at_exactly_plus_three() {
    assert!(deviations::insurance_correct(System::HiLo, 3.0));
    assert!(!deviations::insurance_correct(System::HiLo, 2.9));
}

#[test]
fn three_to_two_pays_more_than_six_to_five() {
    let bet = Cents(10_000);
    let three_two = bet.checked_mul_ratio(3, 2).unwrap();
    let six_five = bet.checked_mul_ratio(6, 5).unwrap();
    assert!(three_two > six_five);
    assert_eq!(BlackjackPayout::ThreeToTwo.ratio(), (3, 2));
    assert_eq!(BlackjackPayout::SixToFive.ratio(), (6, 5));
}

#[test]
fn split_aces_deal_one_card_each_and_cannot_be_hit() {
    let mut rules = RuleSet::default();
    rules.hit_split_aces = false;
    let mut session = Session::new(rules, System::HiLo, Some(123), Cents::from_dollars(1_000.0)).unwrap();

    session.step(Command::PlaceBet(Cents(1000))).unwrap();
    let mut report = session.step(Command::DealInitial).unwrap();

    // Insurance may or may not be offered depending on the shuffled shoe;
    // decline it so we reach a player-actionable state either way.
    if report.state == GameState::AwaitingInsurance {
        report = session.step(Command::DeclineInsurance).unwrap();
    }

    if let GameState::PlayerTurn { hand_index } = report.state {
        if session.player_hands()[hand_index].is_pair()
            && session.player_hands()[hand_index].cards()[0].blackjack_value() == 1
        {
            let report = session.step(Command::Split).unwrap();
            assert_eq!(session.player_hands().len(), 2);
            for hand in session.player_hands() {
                assert_eq!(hand.len(), 2);
            }
            // Both split-ace hands got exactly one extra card and we moved
            // on without offering another hit.
            assert_ne!(report.state, GameState::PlayerTurn { hand_index: 0 });
        }
    }
}

#[test]
fn kelly_stake_at_one_percent_edge_half_kelly_on_ten_thousand_dollars() {
    let bankroll = Cents::from_dollars(10_000.0);
    let stake = probability::kelly(0.01, bankroll, 0.5);
    assert_eq!(stake, Cents(3781)); // $37.81
}

#[test]
fn house_edge_of_the_default_rule_set_is_within_the_expected_band() {
    let rules = RuleSet::default();
    let edge = probability::house_edge(&rules);
    assert!((-0.02..=0.05).contains(&edge), "house edge out of band: {edge}");
}
