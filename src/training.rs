use log::{debug, info};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;

use crate::error::{BriscolaError, Result};
use crate::games::briscola::cards::{Seat, TRICKS_PER_GAME};
use crate::policy::Policy;
use crate::utils::mean_and_standard_error;
use crate::vectorized::{Environment, VectorizedEnv};

/// Plays every pending move of `seat` across the population until no game
/// is waiting on it. The awaiting games are split into contiguous chunks,
/// one per policy. Returns the number of moves applied.
pub fn play_all_moves_of_players<G: Environment>(
    vec_env: &mut VectorizedEnv<G>,
    policies: &[&dyn Policy],
    seat: Seat,
    rng: &mut StdRng,
) -> Result<usize> {
    if policies.is_empty() {
        return Err(BriscolaError::NoPolicies(seat));
    }
    let mut moves = 0;
    let mut round = 0;
    loop {
        let indices = vec_env.awaiting(seat);
        if indices.is_empty() {
            break;
        }
        let (observations, masks) = vec_env.observe_batch(&indices, seat)?;

        let chunk_size = indices.len().div_ceil(policies.len());
        let mut actions = Vec::with_capacity(indices.len());
        for ((chunk, masks), policy) in observations
            .chunks(chunk_size)
            .zip(masks.chunks(chunk_size))
            .zip(policies)
        {
            let chosen = policy.act(chunk, masks, rng);
            if chosen.len() != chunk.len() {
                return Err(BriscolaError::PopulationSizeMismatch {
                    expected: chunk.len(),
                    actual: chosen.len(),
                });
            }
            actions.extend(chosen);
        }

        let transitions = vec_env.step_batch(&indices, &actions)?;
        let tricks = transitions.iter().filter(|t| t.trick.is_some()).count();
        debug!(
            "{} round {}: {} moves, {} tricks completed",
            seat,
            round,
            transitions.len(),
            tricks
        );
        moves += transitions.len();
        round += 1;
    }
    Ok(moves)
}

#[derive(Debug, Clone)]
pub struct EvaluationSettings {
    pub n_games: usize,
    pub n_hands: usize,
    pub base_seed: u64,
    pub current_player: Seat,
    pub other_player: Seat,
}

impl Default for EvaluationSettings {
    fn default() -> Self {
        Self {
            n_games: 2048,
            n_hands: TRICKS_PER_GAME,
            base_seed: 0,
            current_player: Seat::Player0,
            other_player: Seat::Player1,
        }
    }
}

/// Mean outcome of the current policy's seat and its standard error.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Evaluation {
    pub n_games: usize,
    pub mean: f64,
    pub standard_error: f64,
}

/// Plays `n_games` games of `current_policy` against `other_policy` and
/// scores them from the current policy's seat. Each of the `n_hands + 1`
/// rounds lets the other seat move first, then the current seat.
pub fn track_games<G: Environment>(
    current_policy: &dyn Policy,
    other_policy: &dyn Policy,
    env_fn: impl Fn() -> G,
    settings: &EvaluationSettings,
) -> Result<(VectorizedEnv<G>, Evaluation)> {
    let mut vec_env = VectorizedEnv::new(settings.n_games, env_fn, settings.base_seed);
    vec_env.reset();
    let mut rng = StdRng::seed_from_u64(settings.base_seed);

    for _ in 0..=settings.n_hands {
        play_all_moves_of_players(&mut vec_env, &[other_policy], settings.other_player, &mut rng)?;
        play_all_moves_of_players(
            &mut vec_env,
            &[current_policy],
            settings.current_player,
            &mut rng,
        )?;
    }

    let outcomes = vec_env.get_game_outcomes(settings.current_player)?;
    let (mean, standard_error) = mean_and_standard_error(&outcomes);
    info!(
        "{} ({}) vs {} ({}): {:.4} +- {:.4} over {} games",
        current_policy.name(),
        settings.current_player,
        other_policy.name(),
        settings.other_player,
        mean,
        standard_error,
        outcomes.len()
    );
    Ok((
        vec_env,
        Evaluation {
            n_games: outcomes.len(),
            mean,
            standard_error,
        },
    ))
}
