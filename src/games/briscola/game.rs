/*
Game: Briscola (2-player)
Traditional Italian trick-taking game played with a 40-card deck.
No obligation to follow suit; trump beats everything, otherwise the led
suit wins. 120 card points in the deck, more than 60 wins.
*/

use log::trace;
use rand::{rngs::StdRng, seq::SliceRandom, Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use super::cards::{deck, Card, Seat, Suit, ACTION_SIZE, HAND_SIZE, TOTAL_POINTS};
use super::features::{encode_observation, Observation};
use crate::error::{BriscolaError, Result};

pub type ActionMask = [bool; ACTION_SIZE];

const WINNING_POINTS: u32 = TOTAL_POINTS / 2;

/// A trick after both cards have been played and the winner credited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletedTrick {
    pub index: usize,
    pub leader: Seat,
    // [leader's card, follower's card]
    pub cards: [Card; 2],
    pub winner: Seat,
    pub points: u32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BriscolaGame {
    // Cards each player is holding
    pub hands: [Vec<Card>; 2],
    // Draw pile, cards are drawn from the end so the trump card (index 0) comes last
    pub deck: Vec<Card>,
    // Face up card that names the trump suit
    pub trump_card: Option<Card>,
    // Cards on the table for the trick in progress, indexed by seat
    pub current_trick: [Option<Card>; 2],
    // Player who led the trick in progress
    pub lead_player: Seat,
    // Which player is making a move now
    pub current_player: Seat,
    // Card points won so far
    pub points: [u32; 2],
    // Cards won in completed tricks by either player
    pub captured: Vec<Card>,
    // Completed tricks
    pub trick_count: usize,
    pub terminal: bool,
}

impl BriscolaGame {
    /// An empty table; nothing can be played until `reset` deals.
    pub fn new() -> Self {
        Self {
            terminal: true,
            ..Default::default()
        }
    }

    pub fn with_seed(seed: u64) -> Self {
        let mut game = Self::new();
        game.reset(seed);
        game
    }

    pub fn reset(&mut self, seed: u64) {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut cards = deck();
        cards.shuffle(&mut rng);
        let leader = Seat::from_index(rng.gen_range(0..2));

        self.hands = [
            Vec::with_capacity(HAND_SIZE),
            Vec::with_capacity(HAND_SIZE),
        ];
        for _ in 0..HAND_SIZE {
            for seat in [leader, leader.opponent()] {
                let card = cards.pop().expect("the deck should have enough cards");
                self.hands[seat.index()].push(card);
            }
        }
        self.trump_card = cards.first().copied();
        self.deck = cards;
        self.current_trick = [None; 2];
        self.lead_player = leader;
        self.current_player = leader;
        self.points = [0, 0];
        self.captured = Vec::with_capacity(ACTION_SIZE);
        self.trick_count = 0;
        self.terminal = false;
    }

    pub fn trump_suit(&self) -> Option<Suit> {
        self.trump_card.map(|c| c.suit)
    }

    /// The seat expected to play next, `None` once the game is over.
    pub fn current_actor(&self) -> Option<Seat> {
        if self.terminal {
            None
        } else {
            Some(self.current_player)
        }
    }

    fn check_turn(&self, player: Seat) -> Result<()> {
        if self.current_actor() != Some(player) {
            return Err(BriscolaError::OffTurnQuery {
                player,
                current: self.current_actor(),
            });
        }
        Ok(())
    }

    pub fn legal_actions(&self, player: Seat) -> Result<ActionMask> {
        self.check_turn(player)?;
        let mut mask = [false; ACTION_SIZE];
        for card in &self.hands[player.index()] {
            mask[card.id] = true;
        }
        Ok(mask)
    }

    pub fn observe(&self, player: Seat) -> Result<Observation> {
        self.check_turn(player)?;
        Ok(encode_observation(self, player))
    }

    /// Card ids the current player may play (any card in hand).
    pub fn get_moves(&self) -> Vec<usize> {
        if self.terminal {
            return vec![];
        }
        self.hands[self.current_player.index()]
            .iter()
            .map(|c| c.id)
            .collect()
    }

    /// Plays `action` (a card id) for the current player. Returns the trick
    /// when this card completed it.
    pub fn step(&mut self, action: usize) -> Result<Option<CompletedTrick>> {
        if self.terminal {
            return Err(BriscolaError::TerminalStep);
        }
        let player = self.current_player;
        let hand = &mut self.hands[player.index()];
        let pos = hand
            .iter()
            .position(|c| c.id == action)
            .ok_or(BriscolaError::IllegalAction { action, player })?;
        let card = hand.remove(pos);
        self.current_trick[player.index()] = Some(card);

        if player == self.lead_player {
            self.current_player = player.opponent();
            return Ok(None);
        }

        // End trick
        let lead_card =
            self.current_trick[self.lead_player.index()].expect("the leader should have played");
        let trump_suit = self
            .trump_suit()
            .expect("a dealt game should have a trump card");
        let winner = if get_winner(lead_card, card, trump_suit) == 0 {
            self.lead_player
        } else {
            player
        };
        let points = lead_card.points() + card.points();
        let trick = CompletedTrick {
            index: self.trick_count,
            leader: self.lead_player,
            cards: [lead_card, card],
            winner,
            points,
        };
        self.points[winner.index()] += points;
        self.captured.extend([lead_card, card]);
        self.current_trick = [None; 2];
        self.trick_count += 1;
        // winner of the trick leads
        self.lead_player = winner;
        self.current_player = winner;

        // winner draws first, the loser picks up the trump card on the last draw
        if !self.deck.is_empty() {
            for seat in [winner, winner.opponent()] {
                let drawn = self
                    .deck
                    .pop()
                    .expect("the pile should hold an even number of cards");
                self.hands[seat.index()].push(drawn);
            }
        }

        if self.deck.is_empty() && self.hands.iter().all(|h| h.is_empty()) {
            self.terminal = true;
        }

        trace!(
            "trick {} {} {} -> {} ({} points)",
            trick.index,
            lead_card,
            card,
            winner,
            points
        );
        Ok(Some(trick))
    }

    /// Points still held in hands, the draw pile or on the table.
    pub fn points_remaining(&self) -> u32 {
        self.hands
            .iter()
            .flatten()
            .chain(self.deck.iter())
            .chain(self.current_trick.iter().flatten())
            .map(|c| c.points())
            .sum()
    }

    /// 1.0 for a win (more than 60 points), 0.5 for a 60-60 draw, 0.0 for a loss.
    pub fn get_game_outcome(&self, player: Seat) -> Result<f64> {
        if !self.terminal || self.trump_card.is_none() {
            return Err(BriscolaError::NotTerminal);
        }
        let points = self.points[player.index()];
        Ok(match points.cmp(&WINNING_POINTS) {
            std::cmp::Ordering::Greater => 1.0,
            std::cmp::Ordering::Equal => 0.5,
            std::cmp::Ordering::Less => 0.0,
        })
    }

    pub fn winner(&self) -> Option<Seat> {
        if !self.terminal || self.trump_card.is_none() {
            return None;
        }
        match self.points[0].cmp(&self.points[1]) {
            std::cmp::Ordering::Greater => Some(Seat::Player0),
            std::cmp::Ordering::Less => Some(Seat::Player1),
            std::cmp::Ordering::Equal => None,
        }
    }
}

/// Returns 0 when the lead card takes the trick, 1 when the follower does.
pub fn get_winner(lead_card: Card, follow_card: Card, trump_suit: Suit) -> usize {
    let lead_suit = lead_card.suit;
    if value_for_card(lead_suit, trump_suit, &lead_card)
        > value_for_card(lead_suit, trump_suit, &follow_card)
    {
        0
    } else {
        1
    }
}

pub fn value_for_card(lead_suit: Suit, trump_suit: Suit, c: &Card) -> i32 {
    if c.suit == trump_suit {
        return c.rank.strength() + 200;
    }
    if c.suit == lead_suit {
        return c.rank.strength() + 100;
    }
    c.rank.strength()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::briscola::cards::{card_from_id, Rank, DECK_SIZE, TRICKS_PER_GAME};
    use std::collections::HashSet;

    fn card(suit: Suit, rank: Rank) -> Card {
        *deck()
            .iter()
            .find(|c| c.suit == suit && c.rank == rank)
            .unwrap()
    }

    fn play_first_legal(game: &mut BriscolaGame) -> Option<CompletedTrick> {
        let action = game.get_moves()[0];
        game.step(action).unwrap()
    }

    fn play_tricks(game: &mut BriscolaGame, tricks: usize) -> Vec<CompletedTrick> {
        let mut completed = vec![];
        while completed.len() < tricks {
            if let Some(trick) = play_first_legal(game) {
                completed.push(trick);
            }
        }
        completed
    }

    #[test]
    fn test_new_game() {
        let game = BriscolaGame::with_seed(7);
        assert!(game.hands.iter().all(|hand| hand.len() == HAND_SIZE));
        assert_eq!(game.deck.len(), DECK_SIZE - 2 * HAND_SIZE);
        assert_eq!(game.trump_card, game.deck.first().copied());
        assert_eq!(game.current_player, game.lead_player);
        assert_eq!(game.trick_count, 0);
        assert_eq!(game.points, [0, 0]);
        assert!(!game.terminal);
        assert_eq!(game.points_remaining(), TOTAL_POINTS);
    }

    #[test]
    fn test_unreset_game_is_not_playable() {
        let mut game = BriscolaGame::new();
        assert!(matches!(game.step(0), Err(BriscolaError::TerminalStep)));
        assert!(matches!(
            game.get_game_outcome(Seat::Player0),
            Err(BriscolaError::NotTerminal)
        ));
    }

    #[derive(Debug)]
    struct TrickWinnerTestCase {
        description: String,
        lead_card: Card,
        follow_card: Card,
        trump: Suit,
        expected_winner: usize,
    }

    #[test]
    fn test_trick_winner() {
        let test_cases = [
            TrickWinnerTestCase {
                description: "Low trump beats led ace".to_string(),
                lead_card: card(Suit::Cups, Rank::Ace),
                follow_card: card(Suit::Swords, Rank::Two),
                trump: Suit::Swords,
                expected_winner: 1,
            },
            TrickWinnerTestCase {
                description: "Higher card of led suit wins".to_string(),
                lead_card: card(Suit::Coins, Rank::King),
                follow_card: card(Suit::Coins, Rank::Three),
                trump: Suit::Clubs,
                expected_winner: 1,
            },
            TrickWinnerTestCase {
                description: "Three outranks king".to_string(),
                lead_card: card(Suit::Coins, Rank::Three),
                follow_card: card(Suit::Coins, Rank::King),
                trump: Suit::Clubs,
                expected_winner: 0,
            },
            TrickWinnerTestCase {
                description: "Off suit non-trump loses to led card".to_string(),
                lead_card: card(Suit::Cups, Rank::Two),
                follow_card: card(Suit::Coins, Rank::Ace),
                trump: Suit::Clubs,
                expected_winner: 0,
            },
            TrickWinnerTestCase {
                description: "Led trump beats off suit ace".to_string(),
                lead_card: card(Suit::Clubs, Rank::Four),
                follow_card: card(Suit::Coins, Rank::Ace),
                trump: Suit::Clubs,
                expected_winner: 0,
            },
            TrickWinnerTestCase {
                description: "Higher trump wins when both are trump".to_string(),
                lead_card: card(Suit::Clubs, Rank::Jack),
                follow_card: card(Suit::Clubs, Rank::Knight),
                trump: Suit::Clubs,
                expected_winner: 1,
            },
        ];
        for test_case in test_cases {
            assert_eq!(
                get_winner(test_case.lead_card, test_case.follow_card, test_case.trump),
                test_case.expected_winner,
                "{} {:?}",
                test_case.description,
                test_case
            );
        }
    }

    /// Sets up a one-trick position with an empty pile.
    fn last_trick_game(leader_card: Card, follower_card: Card, trump_card: Card) -> BriscolaGame {
        let mut game = BriscolaGame::with_seed(1);
        game.hands = [vec![leader_card], vec![follower_card]];
        game.deck = vec![];
        game.trump_card = Some(trump_card);
        game.lead_player = Seat::Player0;
        game.current_player = Seat::Player0;
        game.trick_count = TRICKS_PER_GAME - 1;
        game
    }

    #[test]
    fn test_trump_follow_wins_and_collects_points() {
        let lead = card(Suit::Cups, Rank::Ace);
        let follow = card(Suit::Swords, Rank::Jack);
        let mut game = last_trick_game(lead, follow, card(Suit::Swords, Rank::Two));
        assert_eq!(game.step(lead.id).unwrap(), None);
        assert_eq!(game.current_player, Seat::Player1);
        let trick = game.step(follow.id).unwrap().unwrap();
        assert_eq!(trick.winner, Seat::Player1);
        assert_eq!(trick.points, 11 + 2);
        assert_eq!(trick.cards, [lead, follow]);
        assert_eq!(game.points, [0, 13]);
        assert_eq!(game.current_player, Seat::Player1);
        assert!(game.terminal);
    }

    #[test]
    fn test_same_suit_higher_rank_wins() {
        let lead = card(Suit::Coins, Rank::Knight);
        let follow = card(Suit::Coins, Rank::Seven);
        let mut game = last_trick_game(lead, follow, card(Suit::Clubs, Rank::Two));
        game.step(lead.id).unwrap();
        let trick = game.step(follow.id).unwrap().unwrap();
        assert_eq!(trick.winner, Seat::Player0);
        assert_eq!(trick.points, 3);
        assert_eq!(game.points[0], 3);
    }

    #[test]
    fn test_winner_draws_first_and_loser_gets_trump() {
        let trump = card(Suit::Clubs, Rank::Two);
        let hidden = card(Suit::Cups, Rank::Five);
        let lead = card(Suit::Coins, Rank::Four);
        let follow = card(Suit::Coins, Rank::Ace);
        let mut game = last_trick_game(lead, follow, trump);
        game.deck = vec![trump, hidden];
        game.trick_count = 0;
        game.step(lead.id).unwrap();
        let trick = game.step(follow.id).unwrap().unwrap();
        assert_eq!(trick.winner, Seat::Player1);
        assert_eq!(game.hands[1], vec![hidden]);
        assert_eq!(game.hands[0], vec![trump]);
        assert!(game.deck.is_empty());
        assert!(!game.terminal);
        assert_eq!(game.current_player, Seat::Player1);
    }

    #[test]
    fn test_illegal_action_is_rejected() {
        let mut game = BriscolaGame::with_seed(3);
        let held: HashSet<usize> = game.get_moves().into_iter().collect();
        let not_held = (0..DECK_SIZE).find(|id| !held.contains(id)).unwrap();
        let before = game.clone();
        let result = game.step(not_held);
        assert!(matches!(
            result,
            Err(BriscolaError::IllegalAction { action, .. }) if action == not_held
        ));
        assert_eq!(game.hands, before.hands);
        assert_eq!(game.current_player, before.current_player);
        assert!(matches!(
            game.step(DECK_SIZE + 5),
            Err(BriscolaError::IllegalAction { .. })
        ));
    }

    #[test]
    fn test_off_turn_query() {
        let game = BriscolaGame::with_seed(11);
        let waiting = game.current_player.opponent();
        assert!(matches!(
            game.legal_actions(waiting),
            Err(BriscolaError::OffTurnQuery { player, current })
                if player == waiting && current == Some(game.current_player)
        ));
        assert!(matches!(
            game.observe(waiting),
            Err(BriscolaError::OffTurnQuery { .. })
        ));
    }

    #[test]
    fn test_legal_actions_match_hand() {
        let mut game = BriscolaGame::with_seed(5);
        while !game.terminal {
            let player = game.current_player;
            let mask = game.legal_actions(player).unwrap();
            assert!(mask.iter().any(|&legal| legal));
            for (id, &legal) in mask.iter().enumerate() {
                let in_hand = game.hands[player.index()].iter().any(|c| c.id == id);
                assert_eq!(legal, in_hand, "card {}", id);
            }
            assert_eq!(
                game.points[0] + game.points[1] + game.points_remaining(),
                TOTAL_POINTS
            );
            play_first_legal(&mut game);
        }
    }

    #[test]
    fn test_nineteen_tricks_not_terminal_twenty_terminal() {
        for seed in 0..20 {
            let mut game = BriscolaGame::with_seed(seed);
            let tricks = play_tricks(&mut game, TRICKS_PER_GAME - 1);
            assert_eq!(tricks.len(), TRICKS_PER_GAME - 1);
            assert!(!game.terminal, "seed {}", seed);
            play_tricks(&mut game, 1);
            assert!(game.terminal, "seed {}", seed);
            assert_eq!(game.trick_count, TRICKS_PER_GAME);
        }
    }

    #[test]
    fn test_completed_game_conserves_cards_and_points() {
        let mut game = BriscolaGame::with_seed(42);
        let tricks = play_tricks(&mut game, TRICKS_PER_GAME);
        assert_eq!(game.points[0] + game.points[1], TOTAL_POINTS);
        let played: HashSet<usize> = tricks
            .iter()
            .flat_map(|t| t.cards.iter().map(|c| c.id))
            .collect();
        assert_eq!(played.len(), DECK_SIZE);
        assert_eq!(game.captured.len(), DECK_SIZE);
        let points: u32 = tricks.iter().map(|t| t.points).sum();
        assert_eq!(points, TOTAL_POINTS);
        assert!(matches!(game.step(0), Err(BriscolaError::TerminalStep)));
        assert!(matches!(
            game.legal_actions(game.current_player),
            Err(BriscolaError::OffTurnQuery { current: None, .. })
        ));
    }

    #[test]
    fn test_reset_is_deterministic() {
        let mut a = BriscolaGame::with_seed(99);
        let mut b = BriscolaGame::with_seed(99);
        assert_eq!(a.hands, b.hands);
        assert_eq!(a.deck, b.deck);
        let tricks_a = play_tricks(&mut a, TRICKS_PER_GAME);
        let tricks_b = play_tricks(&mut b, TRICKS_PER_GAME);
        assert_eq!(tricks_a, tricks_b);
        assert_eq!(a.points, b.points);

        let c = BriscolaGame::with_seed(100);
        assert_ne!(a.trump_card, None);
        assert!(c.deck != BriscolaGame::with_seed(99).deck);
    }

    #[test]
    fn test_game_outcome() {
        let mut game = BriscolaGame::with_seed(2);
        play_tricks(&mut game, TRICKS_PER_GAME);
        for (points, expected) in [([61, 59], 1.0), ([60, 60], 0.5), ([0, 120], 0.0)] {
            game.points = points;
            assert_eq!(game.get_game_outcome(Seat::Player0).unwrap(), expected);
            assert_eq!(
                game.get_game_outcome(Seat::Player1).unwrap(),
                1.0 - expected
            );
        }
        game.points = [60, 60];
        assert_eq!(game.winner(), None);
        game.points = [50, 70];
        assert_eq!(game.winner(), Some(Seat::Player1));
    }

    #[test]
    fn test_card_lookup_matches_trick_cards() {
        let mut game = BriscolaGame::with_seed(8);
        for trick in play_tricks(&mut game, 3) {
            for c in trick.cards {
                assert_eq!(card_from_id(c.id), Some(c));
            }
        }
    }
}
