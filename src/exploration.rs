use rand::Rng;

use crate::decay::Decay;

/// Exploration policy result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Choice {
    Explore,
    Exploit,
}

/// Epsilon greedy exploration policy with a time-decaying epsilon threshold
///
/// The threshold starts at the configured initial rate and is recomputed
/// from the decay schedule once per finished episode, so the schedule
/// value for episode `e` applies to episode `e + 1`.
#[derive(Debug, Clone)]
pub struct EpsilonGreedy<D: Decay> {
    epsilon: f64,
    schedule: D,
}

impl<D: Decay> EpsilonGreedy<D> {
    /// Initialize the policy with an initial rate and a decay schedule
    pub fn new(epsilon: f64, schedule: D) -> Self {
        Self { epsilon, schedule }
    }

    /// The exploration rate currently in effect
    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    /// Invoke the policy for one action selection
    pub fn choose<R: Rng>(&self, rng: &mut R) -> Choice {
        if rng.gen::<f64>() > self.epsilon {
            Choice::Exploit
        } else {
            Choice::Explore
        }
    }

    /// Recompute epsilon after finishing episode `episode`
    pub fn decay(&mut self, episode: usize) {
        self.epsilon = self.schedule.evaluate(episode as f64);
    }

    /// Restore the threshold to `epsilon`, discarding any decay so far
    pub fn reset(&mut self, epsilon: f64) {
        self.epsilon = epsilon;
    }
}
