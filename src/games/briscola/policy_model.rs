use std::path::Path;

use rand::distributions::{Distribution, WeightedIndex};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use super::cards::ACTION_SIZE;
use super::features::{Observation, OBSERVATION_SIZE};
use super::game::ActionMask;
use crate::error::{BriscolaError, Result};
use crate::policy::Policy;

// Fully connected layer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DenseLayer {
    pub weights: Vec<Vec<f32>>, // [input_size][output_size]
    pub bias: Vec<f32>,         // [output_size]
}

impl DenseLayer {
    fn new(input_size: usize, output_size: usize, rng: &mut StdRng) -> Self {
        let bound = 1.0 / (input_size as f32).sqrt();
        let weights: Vec<Vec<f32>> = (0..input_size)
            .map(|_| {
                (0..output_size)
                    .map(|_| rng.gen_range(-bound..bound))
                    .collect()
            })
            .collect();
        let bias = (0..output_size).map(|_| rng.gen_range(-bound..bound)).collect();
        Self { weights, bias }
    }

    fn input_size(&self) -> usize {
        self.weights.len()
    }

    fn output_size(&self) -> usize {
        self.bias.len()
    }

    fn forward(&self, inputs: &[f32], relu: bool) -> Vec<f32> {
        let mut outputs = self.bias.clone();
        for (i, &input) in inputs.iter().enumerate() {
            if input == 0.0 {
                continue;
            }
            for (output, &weight) in outputs.iter_mut().zip(&self.weights[i]) {
                *output += input * weight;
            }
        }
        if relu {
            for output in outputs.iter_mut() {
                *output = output.max(0.0);
            }
        }
        outputs
    }
}

/// Actor-critic network: two ReLU hidden layers per head, the actor ends
/// in one logit per card and the critic in a single value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicyNetwork {
    pub observation_size: usize,
    pub action_size: usize,
    pub hidden_size: usize,
    pub actor: Vec<DenseLayer>,
    pub critic: Vec<DenseLayer>,
}

impl PolicyNetwork {
    pub fn new(observation_size: usize, action_size: usize, hidden_size: usize, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut head = |output_size: usize| {
            vec![
                DenseLayer::new(observation_size, hidden_size, &mut rng),
                DenseLayer::new(hidden_size, hidden_size, &mut rng),
                DenseLayer::new(hidden_size, output_size, &mut rng),
            ]
        };
        let actor = head(action_size);
        let critic = head(1);
        Self {
            observation_size,
            action_size,
            hidden_size,
            actor,
            critic,
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        let network: PolicyNetwork = serde_json::from_str(&json)?;
        network.validate()?;
        Ok(network)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        std::fs::write(path, serde_json::to_string(self)?)?;
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if self.observation_size != OBSERVATION_SIZE || self.action_size != ACTION_SIZE {
            return Err(BriscolaError::InvalidConfig(format!(
                "model expects {} observations and {} actions, the game uses {} and {}",
                self.observation_size, self.action_size, OBSERVATION_SIZE, ACTION_SIZE
            )));
        }
        for head in [&self.actor, &self.critic] {
            let mut input_size = self.observation_size;
            for layer in head.iter() {
                if layer.input_size() != input_size
                    || layer.weights.iter().any(|row| row.len() != layer.output_size())
                {
                    return Err(BriscolaError::InvalidConfig(
                        "model layer shapes do not line up".to_string(),
                    ));
                }
                input_size = layer.output_size();
            }
        }
        let output_of = |head: &[DenseLayer]| head.last().map(|l| l.output_size());
        if output_of(&self.actor) != Some(self.action_size) || output_of(&self.critic) != Some(1) {
            return Err(BriscolaError::InvalidConfig(
                "model output sizes do not match".to_string(),
            ));
        }
        Ok(())
    }

    fn run(head: &[DenseLayer], observation: &[f32]) -> Vec<f32> {
        let last = head.len().saturating_sub(1);
        head.iter()
            .enumerate()
            .fold(observation.to_vec(), |inputs, (i, layer)| {
                layer.forward(&inputs, i != last)
            })
    }

    pub fn logits(&self, observation: &[f32]) -> Vec<f32> {
        Self::run(&self.actor, observation)
    }

    pub fn value(&self, observation: &[f32]) -> f32 {
        Self::run(&self.critic, observation)
            .first()
            .copied()
            .unwrap_or(0.0)
    }

    /// Critic output for every row of a batch.
    pub fn values(&self, observations: &[Observation]) -> Vec<f32> {
        observations.iter().map(|o| self.value(o)).collect()
    }

    /// Softmax over the legal actions; illegal actions get probability 0.
    pub fn action_distribution(&self, observation: &[f32], mask: &ActionMask) -> Vec<f32> {
        let logits = self.logits(observation);
        let max_logit = logits
            .iter()
            .zip(mask.iter())
            .filter(|&(_, &legal)| legal)
            .map(|(&logit, _)| logit)
            .fold(f32::NEG_INFINITY, f32::max);
        let exp_logits: Vec<f32> = logits
            .iter()
            .zip(mask.iter())
            .map(|(&logit, &legal)| if legal { (logit - max_logit).exp() } else { 0.0 })
            .collect();
        let sum_exp: f32 = exp_logits.iter().sum();
        if sum_exp <= 0.0 || !sum_exp.is_finite() {
            return exp_logits;
        }
        exp_logits.iter().map(|&x| x / sum_exp).collect()
    }

    /// Most likely legal action.
    pub fn greedy_action(&self, observation: &[f32], mask: &ActionMask) -> usize {
        self.action_distribution(observation, mask)
            .iter()
            .enumerate()
            .filter(|&(id, _)| mask[id])
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(id, _)| id)
            .unwrap_or(ACTION_SIZE)
    }

    fn sample(probabilities: &[f32], rng: &mut StdRng) -> Option<usize> {
        WeightedIndex::new(probabilities)
            .ok()
            .map(|distribution| distribution.sample(rng))
    }

    fn sample_action(&self, observation: &Observation, mask: &ActionMask, rng: &mut StdRng) -> usize {
        let probabilities = self.action_distribution(observation, mask);
        Self::sample(&probabilities, rng).unwrap_or_else(|| self.greedy_action(observation, mask))
    }

    /// Samples an action (or scores `action` when given) and returns it with
    /// its log-probability, the entropy of the masked distribution and the
    /// critic's value.
    pub fn get_action_and_value(
        &self,
        observation: &Observation,
        mask: &ActionMask,
        action: Option<usize>,
        rng: &mut StdRng,
    ) -> ActionAndValue {
        let probabilities = self.action_distribution(observation, mask);
        let action = action
            .or_else(|| Self::sample(&probabilities, rng))
            .unwrap_or_else(|| self.greedy_action(observation, mask));
        let log_prob = match probabilities.get(action) {
            Some(&p) if p > 0.0 => p.ln(),
            _ => f32::NEG_INFINITY,
        };
        let entropy = -probabilities
            .iter()
            .filter(|&&p| p > 0.0)
            .map(|&p| p * p.ln())
            .sum::<f32>();
        ActionAndValue {
            action,
            log_prob,
            entropy,
            value: self.value(observation),
        }
    }

    pub fn get_actions_and_values(
        &self,
        observations: &[Observation],
        action_masks: &[ActionMask],
        rng: &mut StdRng,
    ) -> Vec<ActionAndValue> {
        observations
            .iter()
            .zip(action_masks)
            .map(|(observation, mask)| self.get_action_and_value(observation, mask, None, rng))
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActionAndValue {
    pub action: usize,
    pub log_prob: f32,
    pub entropy: f32,
    pub value: f32,
}

impl Policy for PolicyNetwork {
    fn act(
        &self,
        observations: &[Observation],
        action_masks: &[ActionMask],
        rng: &mut StdRng,
    ) -> Vec<usize> {
        observations
            .iter()
            .zip(action_masks)
            .map(|(observation, mask)| self.sample_action(observation, mask, rng))
            .collect()
    }

    fn name(&self) -> &str {
        "neural"
    }
}
