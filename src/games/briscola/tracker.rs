use serde::Serialize;

use super::cards::{Card, Seat};
use super::features::Observation;
use super::game::{ActionMask, BriscolaGame, CompletedTrick};
use crate::error::Result;
use crate::vectorized::Environment;

/// One row per completed trick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrickRecord {
    pub game_id: u64,
    pub trick: usize,
    pub leader: Seat,
    pub leader_card: Card,
    pub follower_card: Card,
    pub winner: Seat,
    pub points: u32,
}

/// One row per game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameSummary {
    pub game_id: u64,
    pub finished: bool,
    pub tricks: usize,
    pub points: [u32; 2],
    pub winner: Option<Seat>,
}

/// Wraps a game and keeps every trick it plays. The seed a game was dealt
/// from doubles as its id.
#[derive(Debug, Clone, Default)]
pub struct GameTracker {
    pub game: BriscolaGame,
    pub game_id: u64,
    pub tricks: Vec<TrickRecord>,
}

impl GameTracker {
    pub fn new() -> Self {
        Self {
            game: BriscolaGame::new(),
            ..Default::default()
        }
    }

    fn record(&mut self, trick: &CompletedTrick) {
        self.tricks.push(TrickRecord {
            game_id: self.game_id,
            trick: trick.index,
            leader: trick.leader,
            leader_card: trick.cards[0],
            follower_card: trick.cards[1],
            winner: trick.winner,
            points: trick.points,
        });
    }

    pub fn summary(&self) -> GameSummary {
        GameSummary {
            game_id: self.game_id,
            finished: self.game.terminal,
            tricks: self.tricks.len(),
            points: self.game.points,
            winner: self.game.winner(),
        }
    }
}

impl Environment for GameTracker {
    fn reset(&mut self, seed: u64) {
        self.game.reset(seed);
        self.game_id = seed;
        self.tricks.clear();
    }

    fn current_actor(&self) -> Option<Seat> {
        self.game.current_actor()
    }

    fn legal_actions(&self, player: Seat) -> Result<ActionMask> {
        self.game.legal_actions(player)
    }

    fn observe(&self, player: Seat) -> Result<Observation> {
        self.game.observe(player)
    }

    fn step(&mut self, action: usize) -> Result<Option<CompletedTrick>> {
        let trick = self.game.step(action)?;
        if let Some(trick) = &trick {
            self.record(trick);
        }
        Ok(trick)
    }

    fn get_game_outcome(&self, player: Seat) -> Result<f64> {
        self.game.get_game_outcome(player)
    }
}
