use thiserror::Error;

use crate::games::briscola::cards::Seat;

#[derive(Error, Debug)]
pub enum BriscolaError {
    #[error("illegal action {action} for {player}: card is not in hand")]
    IllegalAction { action: usize, player: Seat },
    #[error("{player} queried out of turn (current actor: {current:?})")]
    OffTurnQuery { player: Seat, current: Option<Seat> },
    #[error("step called on a finished game")]
    TerminalStep,
    #[error("policy returned {actual} actions for {expected} awaiting games")]
    PopulationSizeMismatch { expected: usize, actual: usize },
    #[error("slot {index} is outside a population of {n_games} games")]
    SlotOutOfRange { index: usize, n_games: usize },
    #[error("slot {0} appears more than once in one batch")]
    DuplicateSlot(usize),
    #[error("invalid seed: {0}")]
    InvalidSeed(String),
    #[error("game outcome requested before the game is over")]
    NotTerminal,
    #[error("invalid seat: {0}")]
    InvalidSeat(String),
    #[error("no policy given for {0}")]
    NoPolicies(Seat),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("game {index}: {source}")]
    Instance {
        index: usize,
        #[source]
        source: Box<BriscolaError>,
    },
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl BriscolaError {
    /// Tags an error with the population slot it came from.
    pub fn in_instance(self, index: usize) -> Self {
        BriscolaError::Instance {
            index,
            source: Box::new(self),
        }
    }
}

pub type Result<T> = std::result::Result<T, BriscolaError>;
