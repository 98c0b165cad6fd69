use log::{debug, info};
use rand::{rngs::StdRng, SeedableRng};

use crate::{
    algo::{Algorithm, Estimator, Transition},
    decay,
    env::Environment,
    error::{Error, Result},
    exploration::{Choice, EpsilonGreedy},
    record::Recorder,
};

/// Default number of episodes per reporting block
pub const DEFAULT_BLOCK_SIZE: usize = 100;

/// Hyperparameters for one training run
///
/// Immutable for the duration of a run; only the current exploration rate
/// evolves, recomputed once per episode from the decay schedule.
#[derive(Debug, Clone, PartialEq)]
pub struct Hyperparameters {
    pub num_episodes: usize,
    pub max_steps_per_episode: usize,
    /// Alpha
    pub learning_rate: f64,
    /// Gamma
    pub discount_rate: f64,
    /// Epsilon, in effect for the first episode
    pub exploration_rate: f64,
    pub max_exploration_rate: f64,
    pub min_exploration_rate: f64,
    pub exploration_decay_rate: f64,
    /// Episodes per reporting block; must evenly divide `num_episodes`
    pub block_size: usize,
}

impl Default for Hyperparameters {
    fn default() -> Self {
        Self {
            num_episodes: 1000,
            max_steps_per_episode: 100,
            learning_rate: 0.1,
            discount_rate: 0.99,
            exploration_rate: 1.0,
            max_exploration_rate: 1.0,
            min_exploration_rate: 0.01,
            exploration_decay_rate: 0.01,
            block_size: DEFAULT_BLOCK_SIZE,
        }
    }
}

impl Hyperparameters {
    fn check_interval(name: &'static str, value: f64) -> Result<()> {
        if !(0.0..=1.0).contains(&value) {
            return Err(Error::InvalidHyperparameter {
                name,
                value,
                expected: "[0, 1]",
            });
        }
        Ok(())
    }

    /// Validate every field before a run is attempted
    pub fn validate(&self) -> Result<()> {
        if !(self.learning_rate > 0.0 && self.learning_rate <= 1.0) {
            return Err(Error::InvalidHyperparameter {
                name: "learning_rate",
                value: self.learning_rate,
                expected: "(0, 1]",
            });
        }
        Self::check_interval("discount_rate", self.discount_rate)?;
        Self::check_interval("exploration_rate", self.exploration_rate)?;
        Self::check_interval("max_exploration_rate", self.max_exploration_rate)?;
        Self::check_interval("min_exploration_rate", self.min_exploration_rate)?;
        if self.min_exploration_rate > self.max_exploration_rate {
            return Err(Error::InvalidHyperparameter {
                name: "min_exploration_rate",
                value: self.min_exploration_rate,
                expected: "<= max_exploration_rate",
            });
        }
        if self.exploration_decay_rate < 0.0 {
            return Err(Error::InvalidHyperparameter {
                name: "exploration_decay_rate",
                value: self.exploration_decay_rate,
                expected: ">= 0",
            });
        }
        if self.num_episodes == 0 {
            return Err(Error::ZeroBudget {
                name: "num_episodes",
            });
        }
        if self.max_steps_per_episode == 0 {
            return Err(Error::ZeroBudget {
                name: "max_steps_per_episode",
            });
        }
        if self.block_size == 0 {
            return Err(Error::ZeroBudget { name: "block_size" });
        }
        if self.num_episodes % self.block_size != 0 {
            return Err(Error::BlockSizeMismatch {
                num_episodes: self.num_episodes,
                block_size: self.block_size,
            });
        }
        Ok(())
    }
}

/// One finished episode
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EpisodeRecord {
    pub episode: usize,
    pub total_reward: f64,
    pub steps: usize,
    /// True when the environment signalled `done`, false on step-budget
    /// truncation
    pub terminal: bool,
}

/// Aggregate results of a completed run
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub records: Vec<EpisodeRecord>,
    /// Mean reward per contiguous block of `block_size` episodes
    pub block_averages: Vec<f64>,
    /// Mean reward over the whole run
    pub average_reward: f64,
    pub final_exploration_rate: f64,
}

/// Episodic training loop for one estimator in one environment
///
/// Owns the value table(s), the exploration policy, and a seedable random
/// source; the environment and the recorder are passed into [`run`](Self::run).
#[derive(Debug)]
pub struct Trainer {
    estimator: Estimator,
    hyper: Hyperparameters,
    exploration: EpsilonGreedy<decay::Exponential>,
    rng: StdRng,
    records: Vec<EpisodeRecord>,
}

fn build_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

impl Trainer {
    /// Set up a run of `algorithm` in `env`, sizing the value table(s) from
    /// the environment's declared spaces
    ///
    /// Fails if any hyperparameter is missing its valid range or the episode
    /// count does not divide into reporting blocks.
    pub fn new<E: Environment>(
        algorithm: Algorithm,
        env: &E,
        hyper: Hyperparameters,
    ) -> Result<Self> {
        hyper.validate()?;
        let schedule = decay::Exponential::new(
            hyper.exploration_decay_rate,
            hyper.max_exploration_rate,
            hyper.min_exploration_rate,
        )?;
        Ok(Self {
            estimator: Estimator::new(
                algorithm,
                env.state_space_size(),
                env.action_space_size(),
            ),
            exploration: EpsilonGreedy::new(hyper.exploration_rate, schedule),
            hyper,
            rng: build_rng(None),
            records: vec![],
        })
    }

    /// Seed the random source for a reproducible run
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = build_rng(Some(seed));
        self
    }

    pub fn estimator(&self) -> &Estimator {
        &self.estimator
    }

    #[cfg(test)]
    pub(crate) fn estimator_mut(&mut self) -> &mut Estimator {
        &mut self.estimator
    }

    /// Run all configured episodes, emitting per-episode and per-block
    /// results to `recorder`
    pub fn run<E: Environment, C: Recorder>(
        &mut self,
        env: &mut E,
        recorder: &mut C,
    ) -> Result<RunSummary> {
        self.records.clear();
        // A rerun starts the exploration schedule over: episode 0 always
        // uses the configured initial rate
        self.exploration.reset(self.hyper.exploration_rate);
        for episode in 0..self.hyper.num_episodes {
            let record = self.run_episode(env, episode)?;
            debug!(
                "episode {episode}: reward {} after {} steps ({})",
                record.total_reward,
                record.steps,
                if record.terminal { "terminal" } else { "truncated" },
            );
            recorder.on_episode(episode, record.total_reward)?;
            self.records.push(record);
            // The schedule value at this episode index applies from the
            // next episode on
            self.exploration.decay(episode);
        }

        let block_size = self.hyper.block_size;
        let mut block_averages = Vec::with_capacity(self.records.len() / block_size);
        for (i, chunk) in self.records.chunks(block_size).enumerate() {
            let rewards: Vec<f64> = chunk.iter().map(|r| r.total_reward).collect();
            recorder.on_block((i + 1) * block_size, &rewards)?;
            block_averages.push(rewards.iter().sum::<f64>() / block_size as f64);
        }
        recorder.close()?;

        let average_reward = self
            .records
            .iter()
            .map(|r| r.total_reward)
            .sum::<f64>()
            / self.hyper.num_episodes as f64;
        let final_exploration_rate = self.exploration.epsilon();
        info!(
            "run finished: average reward {average_reward}, exploration rate {final_exploration_rate}"
        );

        Ok(RunSummary {
            records: self.records.clone(),
            block_averages,
            average_reward,
            final_exploration_rate,
        })
    }

    fn run_episode<E: Environment>(
        &mut self,
        env: &mut E,
        episode: usize,
    ) -> Result<EpisodeRecord> {
        let mut state = env.reset();
        self.check_state(state, episode, 0)?;

        let mut total_reward = 0.0;
        let mut steps = 0;
        let mut terminal = false;

        let sarsa = self.estimator.algorithm() == Algorithm::Sarsa;
        // SARSA commits to its first action up front; each update then picks
        // the successor action, which is carried forward as the action
        // executed on the following step
        let mut carried = if sarsa {
            Some(self.select_action(env, state, episode, 0)?)
        } else {
            None
        };

        for step in 0..self.hyper.max_steps_per_episode {
            let action = match carried {
                Some(action) => action,
                None => self.select_action(env, state, episode, step)?,
            };
            let outcome = env.step(action);
            self.check_state(outcome.state, episode, step)?;

            let next_action = if sarsa {
                self.select_next_action(env, outcome.state, outcome.done, episode, step)?
            } else {
                None
            };

            self.estimator.update(
                Transition {
                    state,
                    action,
                    reward: outcome.reward,
                    next_state: outcome.state,
                },
                next_action,
                self.hyper.learning_rate,
                self.hyper.discount_rate,
                &mut self.rng,
            );

            total_reward += outcome.reward;
            state = outcome.state;
            carried = next_action;
            steps = step + 1;

            if outcome.done {
                terminal = true;
                break;
            }
        }

        Ok(EpisodeRecord {
            episode,
            total_reward,
            steps,
            terminal,
        })
    }

    /// Epsilon-greedy selection over the valid actions for `state`
    fn select_action<E: Environment>(
        &mut self,
        env: &E,
        state: usize,
        episode: usize,
        step: usize,
    ) -> Result<usize> {
        let valid = self.checked_valid_actions(env, state, episode, step)?;
        if valid.is_empty() {
            return Err(Error::NoValidActions {
                state,
                episode,
                step,
            });
        }
        let action = match self.exploration.choose(&mut self.rng) {
            Choice::Explore => env.random_valid_action(state, &mut self.rng),
            Choice::Exploit => self
                .estimator
                .greedy_action(state, &valid)
                .expect("valid action set checked non-empty"),
        };
        Ok(action)
    }

    /// Successor-action selection for the SARSA bootstrap
    ///
    /// A terminal state is allowed an empty valid set, in which case the
    /// bootstrap term is zero.
    fn select_next_action<E: Environment>(
        &mut self,
        env: &E,
        state: usize,
        done: bool,
        episode: usize,
        step: usize,
    ) -> Result<Option<usize>> {
        if done && env.valid_actions(state).is_empty() {
            return Ok(None);
        }
        self.select_action(env, state, episode, step).map(Some)
    }

    fn checked_valid_actions<E: Environment>(
        &self,
        env: &E,
        state: usize,
        episode: usize,
        step: usize,
    ) -> Result<Vec<usize>> {
        let valid = env.valid_actions(state);
        let action_space_size = self.estimator.table().num_actions();
        for &action in &valid {
            if action >= action_space_size {
                return Err(Error::ActionOutOfDomain {
                    action,
                    action_space_size,
                    episode,
                    step,
                });
            }
        }
        Ok(valid)
    }

    fn check_state(&self, state: usize, episode: usize, step: usize) -> Result<()> {
        let state_space_size = self.estimator.table().num_states();
        if state >= state_space_size {
            return Err(Error::StateOutOfDomain {
                state,
                state_space_size,
                episode,
                step,
            });
        }
        Ok(())
    }
}
