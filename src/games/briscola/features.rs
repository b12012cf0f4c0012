use super::cards::{card_from_id, Card, Seat, Suit, DECK_SIZE, PILE_SIZE_AFTER_DEAL};
use super::game::BriscolaGame;

pub const HAND_OFFSET: usize = 0;
pub const CAPTURED_OFFSET: usize = HAND_OFFSET + DECK_SIZE;
pub const TABLE_OFFSET: usize = CAPTURED_OFFSET + DECK_SIZE;
pub const TRUMP_OFFSET: usize = TABLE_OFFSET + DECK_SIZE;
pub const PILE_SIZE_INDEX: usize = TRUMP_OFFSET + DECK_SIZE;
pub const LEADING_INDEX: usize = PILE_SIZE_INDEX + 1;
pub const OBSERVATION_SIZE: usize = LEADING_INDEX + 1;

pub type Observation = [f32; OBSERVATION_SIZE];

/// Encodes what `player` can see: own hand, captured cards, the card on
/// the table, the trump card, pile size and whether `player` leads.
/// Never reads the opponent's hand.
pub fn encode_observation(game: &BriscolaGame, player: Seat) -> Observation {
    let mut observation = [0.0; OBSERVATION_SIZE];
    for card in &game.hands[player.index()] {
        observation[HAND_OFFSET + card.id] = 1.0;
    }
    for card in &game.captured {
        observation[CAPTURED_OFFSET + card.id] = 1.0;
    }
    if let Some(card) = game.current_trick[player.opponent().index()] {
        observation[TABLE_OFFSET + card.id] = 1.0;
    }
    if let Some(card) = game.trump_card {
        observation[TRUMP_OFFSET + card.id] = 1.0;
    }
    observation[PILE_SIZE_INDEX] = game.deck.len() as f32 / PILE_SIZE_AFTER_DEAL as f32;
    let table_empty = game.current_trick.iter().all(|c| c.is_none());
    observation[LEADING_INDEX] = if table_empty { 1.0 } else { 0.0 };
    observation
}

/// Read-only decoding of an encoded observation, for policies that only
/// see the feature vector.
pub struct ObservationView<'a> {
    observation: &'a [f32],
}

impl<'a> ObservationView<'a> {
    pub fn new(observation: &'a [f32]) -> Self {
        Self { observation }
    }

    fn cards_in(&self, offset: usize) -> Vec<Card> {
        self.observation[offset..offset + DECK_SIZE]
            .iter()
            .enumerate()
            .filter(|&(_, &v)| v > 0.5)
            .filter_map(|(id, _)| card_from_id(id))
            .collect()
    }

    pub fn hand(&self) -> Vec<Card> {
        self.cards_in(HAND_OFFSET)
    }

    pub fn table_card(&self) -> Option<Card> {
        self.cards_in(TABLE_OFFSET).first().copied()
    }

    pub fn trump_card(&self) -> Option<Card> {
        self.cards_in(TRUMP_OFFSET).first().copied()
    }

    pub fn trump_suit(&self) -> Option<Suit> {
        self.trump_card().map(|c| c.suit)
    }

    pub fn is_leading(&self) -> bool {
        self.observation[LEADING_INDEX] > 0.5
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::briscola::cards::HAND_SIZE;

    #[test]
    fn test_observation_size() {
        assert_eq!(OBSERVATION_SIZE, 162);
    }

    #[test]
    fn test_fresh_deal_observation() {
        let game = BriscolaGame::with_seed(21);
        let player = game.current_player;
        let observation = game.observe(player).unwrap();
        let view = ObservationView::new(&observation);
        let mut hand = view.hand();
        let mut expected = game.hands[player.index()].clone();
        hand.sort_by_key(|c| c.id);
        expected.sort_by_key(|c| c.id);
        assert_eq!(hand, expected);
        assert_eq!(hand.len(), HAND_SIZE);
        assert!(observation[CAPTURED_OFFSET..TABLE_OFFSET].iter().all(|&v| v == 0.0));
        assert_eq!(view.table_card(), None);
        assert_eq!(view.trump_card(), game.trump_card);
        assert_eq!(observation[PILE_SIZE_INDEX], 1.0);
        assert!(view.is_leading());
    }

    #[test]
    fn test_follower_sees_table_card_not_opponent_hand() {
        let mut game = BriscolaGame::with_seed(4);
        let leader = game.current_player;
        let lead_id = game.get_moves()[0];
        game.step(lead_id).unwrap();

        let follower = leader.opponent();
        let observation = game.observe(follower).unwrap();
        let view = ObservationView::new(&observation);
        assert_eq!(view.table_card().map(|c| c.id), Some(lead_id));
        assert!(!view.is_leading());
        for card in &game.hands[leader.index()] {
            assert_eq!(observation[HAND_OFFSET + card.id], 0.0);
            assert_eq!(observation[TABLE_OFFSET + card.id], 0.0);
        }
    }

    #[test]
    fn test_observation_is_pure() {
        let mut game = BriscolaGame::with_seed(17);
        for _ in 0..9 {
            let action = game.get_moves()[0];
            game.step(action).unwrap();
        }
        let player = game.current_player;
        let first = encode_observation(&game, player);
        let second = encode_observation(&game.clone(), player);
        assert_eq!(first, second);
        let captured = first[CAPTURED_OFFSET..TABLE_OFFSET]
            .iter()
            .filter(|&&v| v == 1.0)
            .count();
        assert_eq!(captured, game.captured.len());
        let pile = first[PILE_SIZE_INDEX] * PILE_SIZE_AFTER_DEAL as f32;
        assert_eq!(pile.round() as usize, game.deck.len());
    }
}
