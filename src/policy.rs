use std::path::Path;

use clap::ValueEnum;
use log::warn;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::games::briscola::cards::{Card, ACTION_SIZE};
use crate::games::briscola::features::{Observation, ObservationView, OBSERVATION_SIZE};
use crate::games::briscola::game::{get_winner, ActionMask};
use crate::games::briscola::policy_model::PolicyNetwork;

/// Maps a batch of observations and their legal-action masks to one card
/// id per row. Every mask handed to a policy has at least one legal entry.
pub trait Policy {
    fn act(
        &self,
        observations: &[Observation],
        action_masks: &[ActionMask],
        rng: &mut StdRng,
    ) -> Vec<usize>;

    fn name(&self) -> &str;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "camelCase")]
pub enum PolicyKind {
    Random,
    Scripted,
    Neural,
}

pub fn legal_action_ids(mask: &ActionMask) -> Vec<usize> {
    mask.iter()
        .enumerate()
        .filter(|&(_, &legal)| legal)
        .map(|(id, _)| id)
        .collect()
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RandomPolicy;

impl Policy for RandomPolicy {
    fn act(
        &self,
        _observations: &[Observation],
        action_masks: &[ActionMask],
        rng: &mut StdRng,
    ) -> Vec<usize> {
        action_masks
            .iter()
            .map(|mask| {
                // an empty mask yields an out of range action that the game rejects
                *legal_action_ids(mask).choose(rng).unwrap_or(&ACTION_SIZE)
            })
            .collect()
    }

    fn name(&self) -> &str {
        "random"
    }
}

/// Plays from the observation alone: take tricks that carry points as
/// cheaply as possible, otherwise throw away the least valuable card.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScriptedPolicy;

impl ScriptedPolicy {
    fn choose(observation: &[f32], mask: &ActionMask) -> usize {
        let view = ObservationView::new(observation);
        let hand: Vec<Card> = view.hand().into_iter().filter(|c| mask[c.id]).collect();
        let trump_suit = view.trump_suit();
        let is_trump = |c: &Card| Some(c.suit) == trump_suit;
        let discard_cost = |c: &&Card| (c.points(), is_trump(*c), c.rank.strength());
        let lead_cost = |c: &&Card| (is_trump(*c), c.points(), c.rank.strength());

        let choice = match (view.is_leading(), view.table_card(), trump_suit) {
            (false, Some(table_card), Some(trump_suit)) => {
                let cheapest_winner = hand
                    .iter()
                    .filter(|c| get_winner(table_card, **c, trump_suit) == 1)
                    .min_by_key(discard_cost);
                match cheapest_winner {
                    Some(card) if table_card.points() > 0 || card.points() > 0 => Some(card),
                    _ => hand.iter().min_by_key(discard_cost),
                }
            }
            _ => hand.iter().min_by_key(lead_cost),
        };
        choice.map(|c| c.id).unwrap_or(ACTION_SIZE)
    }
}

impl Policy for ScriptedPolicy {
    fn act(
        &self,
        observations: &[Observation],
        action_masks: &[ActionMask],
        _rng: &mut StdRng,
    ) -> Vec<usize> {
        observations
            .iter()
            .zip(action_masks)
            .map(|(observation, mask)| Self::choose(observation, mask))
            .collect()
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

/// Builds the policy for one seat. A neural policy without a model file
/// starts from freshly initialised weights.
pub fn build_policy(
    kind: PolicyKind,
    model_path: Option<&Path>,
    hidden_size: usize,
    seed: u64,
) -> Result<Box<dyn Policy>> {
    Ok(match kind {
        PolicyKind::Random => Box::new(RandomPolicy),
        PolicyKind::Scripted => Box::new(ScriptedPolicy),
        PolicyKind::Neural => match model_path {
            Some(path) => Box::new(PolicyNetwork::from_file(path)?),
            None => {
                warn!("no model file given, using an untrained network");
                Box::new(PolicyNetwork::new(
                    OBSERVATION_SIZE,
                    ACTION_SIZE,
                    hidden_size,
                    seed,
                ))
            }
        },
    })
}
