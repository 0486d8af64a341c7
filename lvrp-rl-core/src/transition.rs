//! Transition records stored in replay memory

use serde::{Deserialize, Serialize};

use crate::{DiscreteAction, Reward, RouteObservation};

/// Successor state of a transition.
///
/// Terminal transitions carry no successor; the variant makes that
/// explicit instead of a nullable observation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum NextState {
    /// The episode ended on this transition
    Terminal,
    /// The episode continued into the given state
    Continuing(RouteObservation),
}

impl NextState {
    /// Whether this transition ended the episode
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Terminal)
    }

    /// The successor observation, if the episode continued
    #[must_use]
    pub fn as_continuing(&self) -> Option<&RouteObservation> {
        match self {
            Self::Terminal => None,
            Self::Continuing(obs) => Some(obs),
        }
    }
}

/// One step's experience: state, action taken, successor and reward.
///
/// Constructed and destructured by field name; the field set is the
/// schema shared by the replay memory and the optimizer step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transition {
    /// Observation the action was selected in
    pub state: RouteObservation,
    /// Action taken
    pub action: DiscreteAction,
    /// Successor state, or `Terminal` when the episode ended
    pub next_state: NextState,
    /// Reward received
    pub reward: Reward,
}
