pub mod cards;
pub mod features;
pub mod game;
pub mod policy_model;
pub mod tracker;

// Re-export the main types
pub use cards::{Card, Rank, Seat, Suit};
pub use features::Observation;
pub use game::{ActionMask, BriscolaGame, CompletedTrick};
pub use policy_model::{ActionAndValue, PolicyNetwork};
pub use tracker::{GameSummary, GameTracker, TrickRecord};
