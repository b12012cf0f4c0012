//! A fixed population of independent games advanced through one batched
//! interface. Each slot moves at its own pace; the only thing batched is
//! the bookkeeping.

use rayon::prelude::*;

use crate::error::{BriscolaError, Result};
use crate::games::briscola::cards::Seat;
use crate::games::briscola::features::Observation;
use crate::games::briscola::game::{ActionMask, BriscolaGame, CompletedTrick};

/// The per-instance contract the population is built from.
pub trait Environment: Send + Sync {
    fn reset(&mut self, seed: u64);
    /// The seat to play next, `None` once the game is over.
    fn current_actor(&self) -> Option<Seat>;
    fn legal_actions(&self, player: Seat) -> Result<ActionMask>;
    fn observe(&self, player: Seat) -> Result<Observation>;
    fn step(&mut self, action: usize) -> Result<Option<CompletedTrick>>;
    fn get_game_outcome(&self, player: Seat) -> Result<f64>;

    fn is_terminal(&self) -> bool {
        self.current_actor().is_none()
    }
}

impl Environment for BriscolaGame {
    fn reset(&mut self, seed: u64) {
        BriscolaGame::reset(self, seed)
    }

    fn current_actor(&self) -> Option<Seat> {
        BriscolaGame::current_actor(self)
    }

    fn legal_actions(&self, player: Seat) -> Result<ActionMask> {
        BriscolaGame::legal_actions(self, player)
    }

    fn observe(&self, player: Seat) -> Result<Observation> {
        BriscolaGame::observe(self, player)
    }

    fn step(&mut self, action: usize) -> Result<Option<CompletedTrick>> {
        BriscolaGame::step(self, action)
    }

    fn get_game_outcome(&self, player: Seat) -> Result<f64> {
        BriscolaGame::get_game_outcome(self, player)
    }
}

/// One applied action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub index: usize,
    pub seat: Seat,
    pub action: usize,
    pub trick: Option<CompletedTrick>,
}

pub struct VectorizedEnv<G: Environment = BriscolaGame> {
    envs: Vec<G>,
    base_seed: u64,
    episode: u64,
}

impl<G: Environment> VectorizedEnv<G> {
    pub fn new(n_games: usize, env_fn: impl Fn() -> G, base_seed: u64) -> Self {
        Self {
            envs: (0..n_games).map(|_| env_fn()).collect(),
            base_seed,
            episode: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.envs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.envs.is_empty()
    }

    /// Seed for slot `index` in the current episode. Distinct for every
    /// (episode, slot) pair under the same base seed.
    pub fn instance_seed(&self, index: usize) -> u64 {
        let n_games = self.envs.len() as u64;
        self.base_seed
            .wrapping_add(self.episode.wrapping_mul(n_games))
            .wrapping_add(index as u64)
    }

    /// Deals a fresh game in every slot.
    pub fn reset(&mut self) {
        let seeds: Vec<u64> = (0..self.envs.len())
            .map(|index| self.instance_seed(index))
            .collect();
        self.envs
            .par_iter_mut()
            .zip(seeds.par_iter())
            .for_each(|(env, &seed)| env.reset(seed));
        self.episode += 1;
    }

    fn env(&self, index: usize) -> Result<&G> {
        self.envs.get(index).ok_or(BriscolaError::SlotOutOfRange {
            index,
            n_games: self.envs.len(),
        })
    }

    pub fn get_envs(&self) -> &[G] {
        &self.envs
    }

    pub fn into_envs(self) -> Vec<G> {
        self.envs
    }

    /// Slots, ascending, of unfinished games waiting on `seat`.
    pub fn awaiting(&self, seat: Seat) -> Vec<usize> {
        self.envs
            .iter()
            .enumerate()
            .filter(|(_, env)| env.current_actor() == Some(seat))
            .map(|(index, _)| index)
            .collect()
    }

    pub fn all_terminal(&self) -> bool {
        self.envs.iter().all(|env| env.is_terminal())
    }

    /// Observations and masks for `seat` in the given slots, in the order
    /// of `indices`. Every slot must currently be waiting on `seat`.
    pub fn observe_batch(
        &self,
        indices: &[usize],
        seat: Seat,
    ) -> Result<(Vec<Observation>, Vec<ActionMask>)> {
        let rows = indices
            .par_iter()
            .map(|&index| {
                let env = self.env(index)?;
                let observation = env.observe(seat).map_err(|e| e.in_instance(index))?;
                let mask = env
                    .legal_actions(seat)
                    .map_err(|e| e.in_instance(index))?;
                Ok((observation, mask))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(rows.into_iter().unzip())
    }

    pub fn legal_actions_batch(&self, indices: &[usize], seat: Seat) -> Result<Vec<ActionMask>> {
        indices
            .par_iter()
            .map(|&index| {
                self.env(index)?
                    .legal_actions(seat)
                    .map_err(|e| e.in_instance(index))
            })
            .collect()
    }

    /// Applies `actions[i]` to slot `indices[i]`. Every slot must be in
    /// range and listed once; nothing is stepped otherwise. Transitions come
    /// back in the order of `indices`.
    pub fn step_batch(&mut self, indices: &[usize], actions: &[usize]) -> Result<Vec<Transition>> {
        if indices.len() != actions.len() {
            return Err(BriscolaError::PopulationSizeMismatch {
                expected: indices.len(),
                actual: actions.len(),
            });
        }
        let n_games = self.envs.len();
        // (position in `indices`, action) per slot
        let mut pending: Vec<Option<(usize, usize)>> = vec![None; n_games];
        for (position, (&index, &action)) in indices.iter().zip(actions).enumerate() {
            let slot = pending
                .get_mut(index)
                .ok_or(BriscolaError::SlotOutOfRange { index, n_games })?;
            if slot.is_some() {
                return Err(BriscolaError::DuplicateSlot(index));
            }
            *slot = Some((position, action));
        }
        let mut transitions = self
            .envs
            .par_iter_mut()
            .zip(pending.par_iter())
            .enumerate()
            .filter_map(|(index, (env, &slot))| {
                slot.map(|(position, action)| (index, env, position, action))
            })
            .map(|(index, env, position, action)| {
                let seat = env
                    .current_actor()
                    .ok_or_else(|| BriscolaError::TerminalStep.in_instance(index))?;
                let trick = env.step(action).map_err(|e| e.in_instance(index))?;
                Ok((
                    position,
                    Transition {
                        index,
                        seat,
                        action,
                        trick,
                    },
                ))
            })
            .collect::<Result<Vec<_>>>()?;
        transitions.sort_unstable_by_key(|&(position, _)| position);
        Ok(transitions.into_iter().map(|(_, t)| t).collect())
    }

    pub fn get_game_outcomes(&self, seat: Seat) -> Result<Vec<f64>> {
        self.envs
            .iter()
            .enumerate()
            .map(|(index, env)| {
                env.get_game_outcome(seat)
                    .map_err(|e| e.in_instance(index))
            })
            .collect()
    }
}
