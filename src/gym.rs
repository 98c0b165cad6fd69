use crate::env::{Environment, Step};

/// Move up one row
pub const UP: usize = 0;
/// Move down one row
pub const DOWN: usize = 1;
/// Move left one column
pub const LEFT: usize = 2;
/// Move right one column
pub const RIGHT: usize = 3;

const WIDTH: usize = 12;
const HEIGHT: usize = 4;
const START: usize = (HEIGHT - 1) * WIDTH;
const GOAL: usize = HEIGHT * WIDTH - 1;

/// The cliff walking gridworld
///
/// A 4x12 grid; the agent starts at the bottom-left corner and must reach
/// the bottom-right corner. Every move costs -1. The cells between start
/// and goal on the bottom row are a cliff: stepping onto one costs -100 and
/// sends the agent back to the start without ending the episode. Moves that
/// would leave the grid are not offered as valid actions.
///
/// The optimal path runs along the cliff edge, which separates on-policy
/// from off-policy learners under exploration.
pub struct CliffWalk {
    pos: usize,
}

impl CliffWalk {
    pub fn new() -> Self {
        Self { pos: START }
    }

    fn is_cliff(pos: usize) -> bool {
        pos > START && pos < GOAL
    }
}

impl Default for CliffWalk {
    fn default() -> Self {
        Self::new()
    }
}

impl Environment for CliffWalk {
    fn state_space_size(&self) -> usize {
        WIDTH * HEIGHT
    }

    fn action_space_size(&self) -> usize {
        4
    }

    fn reset(&mut self) -> usize {
        self.pos = START;
        self.pos
    }

    fn step(&mut self, action: usize) -> Step {
        assert!(
            self.valid_actions(self.pos).contains(&action),
            "action {action} is not valid at position {}",
            self.pos
        );
        self.pos = match action {
            UP => self.pos - WIDTH,
            DOWN => self.pos + WIDTH,
            LEFT => self.pos - 1,
            RIGHT => self.pos + 1,
            _ => panic!("unknown action {action}"),
        };

        if Self::is_cliff(self.pos) {
            self.pos = START;
            return Step {
                state: self.pos,
                reward: -100.0,
                done: false,
            };
        }

        Step {
            state: self.pos,
            reward: -1.0,
            done: self.pos == GOAL,
        }
    }

    fn valid_actions(&self, state: usize) -> Vec<usize> {
        let mut actions = Vec::with_capacity(4);

        if state >= WIDTH {
            actions.push(UP);
        }
        if state < (HEIGHT - 1) * WIDTH {
            actions.push(DOWN);
        }
        if state % WIDTH != 0 {
            actions.push(LEFT);
        }
        if state % WIDTH != WIDTH - 1 {
            actions.push(RIGHT);
        }

        actions
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn corners_mask_off_grid_moves() {
        let env = CliffWalk::new();
        assert_eq!(env.valid_actions(0), [DOWN, RIGHT]);
        assert_eq!(env.valid_actions(START), [UP, RIGHT]);
        assert_eq!(env.valid_actions(WIDTH - 1), [DOWN, LEFT]);
        assert_eq!(env.valid_actions(17), [UP, DOWN, LEFT, RIGHT]);
    }

    #[test]
    fn cliff_sends_the_agent_back_to_start() {
        let mut env = CliffWalk::new();
        env.reset();
        let outcome = env.step(RIGHT);
        assert_eq!(outcome.state, START);
        assert_eq!(outcome.reward, -100.0);
        assert!(!outcome.done);
    }

    #[test]
    #[should_panic(expected = "not valid")]
    fn off_grid_move_is_rejected() {
        let mut env = CliffWalk::new();
        env.reset();
        // Start square sits in the left column; LEFT would leave the grid
        env.step(LEFT);
    }

    #[test]
    fn goal_terminates() {
        let mut env = CliffWalk::new();
        env.reset();
        env.step(UP);
        for _ in 0..(WIDTH - 1) {
            env.step(RIGHT);
        }
        let outcome = env.step(DOWN);
        assert_eq!(outcome.state, GOAL);
        assert_eq!(outcome.reward, -1.0);
        assert!(outcome.done);
    }
}
