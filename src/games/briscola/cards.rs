/*
Static card data for two-player Briscola: the 40-card Italian deck,
point values and trick strength.
*/

use std::fmt;
use std::str::FromStr;

use enum_iterator::{all, Sequence};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::error::BriscolaError;

pub const DECK_SIZE: usize = 40;
pub const ACTION_SIZE: usize = DECK_SIZE;
pub const HAND_SIZE: usize = 3;
pub const TOTAL_POINTS: u32 = 120;
pub const TRICKS_PER_GAME: usize = DECK_SIZE / 2;
// cards left in the pile right after the deal (trump card included)
pub const PILE_SIZE_AFTER_DEAL: usize = DECK_SIZE - 2 * HAND_SIZE;

#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Sequence,
    Serialize,
    Deserialize,
)]
pub enum Seat {
    #[default]
    #[serde(rename = "player_0")]
    Player0,
    #[serde(rename = "player_1")]
    Player1,
}

impl Seat {
    pub fn index(self) -> usize {
        match self {
            Seat::Player0 => 0,
            Seat::Player1 => 1,
        }
    }

    pub fn from_index(index: usize) -> Seat {
        if index % 2 == 0 {
            Seat::Player0
        } else {
            Seat::Player1
        }
    }

    pub fn opponent(self) -> Seat {
        match self {
            Seat::Player0 => Seat::Player1,
            Seat::Player1 => Seat::Player0,
        }
    }
}

impl fmt::Display for Seat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "player_{}", self.index())
    }
}

impl FromStr for Seat {
    type Err = BriscolaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "player_0" | "0" => Ok(Seat::Player0),
            "player_1" | "1" => Ok(Seat::Player1),
            _ => Err(BriscolaError::InvalidSeat(s.to_string())),
        }
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Sequence, Serialize, Deserialize,
)]
#[serde(rename_all = "camelCase")]
pub enum Suit {
    Coins,
    Cups,
    Swords,
    Clubs,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Sequence, Serialize, Deserialize,
)]
#[serde(rename_all = "camelCase")]
pub enum Rank {
    Ace,
    Two,
    Three,
    Four,
    Five,
    Six,
    Seven,
    Jack,
    Knight,
    King,
}

impl Rank {
    pub fn points(self) -> u32 {
        match self {
            Rank::Ace => 11,
            Rank::Three => 10,
            Rank::King => 4,
            Rank::Knight => 3,
            Rank::Jack => 2,
            _ => 0,
        }
    }

    /// Position in the trick order, Two lowest and Ace highest.
    pub fn strength(self) -> i32 {
        match self {
            Rank::Two => 0,
            Rank::Four => 1,
            Rank::Five => 2,
            Rank::Six => 3,
            Rank::Seven => 4,
            Rank::Jack => 5,
            Rank::Knight => 6,
            Rank::King => 7,
            Rank::Three => 8,
            Rank::Ace => 9,
        }
    }

    fn short_name(self) -> &'static str {
        match self {
            Rank::Ace => "A",
            Rank::Two => "2",
            Rank::Three => "3",
            Rank::Four => "4",
            Rank::Five => "5",
            Rank::Six => "6",
            Rank::Seven => "7",
            Rank::Jack => "J",
            Rank::Knight => "N",
            Rank::King => "K",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Card {
    pub id: usize,
    pub suit: Suit,
    pub rank: Rank,
}

impl Card {
    pub fn points(&self) -> u32 {
        self.rank.points()
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let suit = match self.suit {
            Suit::Coins => "c",
            Suit::Cups => "u",
            Suit::Swords => "s",
            Suit::Clubs => "b",
        };
        write!(f, "{}{}", self.rank.short_name(), suit)
    }
}

// ids run suit by suit in declaration order: Coins 0-9, Cups 10-19, ...
static DECK: Lazy<Vec<Card>> = Lazy::new(|| {
    let mut deck = Vec::with_capacity(DECK_SIZE);
    for suit in all::<Suit>() {
        for rank in all::<Rank>() {
            deck.push(Card {
                id: deck.len(),
                suit,
                rank,
            });
        }
    }
    deck
});

/// The unshuffled deck, ordered by card id.
pub fn deck() -> Vec<Card> {
    DECK.clone()
}

pub fn card_from_id(id: usize) -> Option<Card> {
    DECK.get(id).copied()
}
