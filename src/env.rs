use rand::{seq::SliceRandom, Rng};

/// Outcome of a single environment step
///
/// **Returns** the successor state, the reward for the transition, and
/// whether the successor state is terminal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Step {
    pub state: usize,
    pub reward: f64,
    pub done: bool,
}

/// Represents a Markov decision process, defining the dynamics of an
/// environment in which an agent can operate.
///
/// This trait covers the discrete-time MDP case with one agent and finite
/// state and action spaces: states and actions are plain indices into
/// `[0, state_space_size)` and `[0, action_space_size)` and carry no other
/// structure. Which actions are valid may vary per state.
pub trait Environment {
    /// Number of distinct states
    fn state_space_size(&self) -> usize;

    /// Number of distinct actions
    fn action_space_size(&self) -> usize;

    /// Reset the environment to an initial state
    ///
    /// **Returns** the state
    fn reset(&mut self) -> usize;

    /// Update the environment in response to an action taken by an agent
    fn step(&mut self, action: usize) -> Step;

    /// Get the valid actions for `state`
    ///
    /// Must never be empty for a non-terminal state; specify an action that
    /// represents doing nothing if necessary.
    fn valid_actions(&self, state: usize) -> Vec<usize>;

    /// Sample uniformly from the valid actions for `state`
    fn random_valid_action<R: Rng>(&self, state: usize, rng: &mut R) -> usize
    where
        Self: Sized,
    {
        *self
            .valid_actions(state)
            .choose(rng)
            .expect("there is always at least one valid action")
    }
}
