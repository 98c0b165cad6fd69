/// A dense action-value table over a discrete state and action space
///
/// Entries start at zero and are only mutated by the update rules in
/// [`algo`](crate::algo). Indexing outside the declared spaces is a
/// programming error and panics.
#[derive(Debug, Clone, PartialEq)]
pub struct QTable {
    values: Vec<f64>,
    num_states: usize,
    num_actions: usize,
}

impl QTable {
    /// Create a zero-initialized table of `num_states` x `num_actions` entries
    pub fn new(num_states: usize, num_actions: usize) -> Self {
        Self {
            values: vec![0.0; num_states * num_actions],
            num_states,
            num_actions,
        }
    }

    pub fn num_states(&self) -> usize {
        self.num_states
    }

    pub fn num_actions(&self) -> usize {
        self.num_actions
    }

    fn index(&self, state: usize, action: usize) -> usize {
        assert!(
            state < self.num_states,
            "state {state} out of bounds for {} states",
            self.num_states
        );
        assert!(
            action < self.num_actions,
            "action {action} out of bounds for {} actions",
            self.num_actions
        );
        state * self.num_actions + action
    }

    pub fn get(&self, state: usize, action: usize) -> f64 {
        self.values[self.index(state, action)]
    }

    pub fn set(&mut self, state: usize, action: usize, value: f64) {
        let ix = self.index(state, action);
        self.values[ix] = value;
    }

    /// All action values for one state
    pub fn row(&self, state: usize) -> &[f64] {
        let start = self.index(state, 0);
        &self.values[start..start + self.num_actions]
    }

    /// Maximum value over the full action domain for `state`
    ///
    /// 0.0 on a fresh table, per zero-initialization.
    pub fn max_value(&self, state: usize) -> f64 {
        self.row(state).iter().copied().fold(f64::NEG_INFINITY, f64::max)
    }
}

/// Highest-valued action among `valid`, scanning action indices in
/// descending value order and returning the first one present in the
/// valid set (ties broken toward the higher index)
///
/// `None` when `valid` is empty.
pub fn best_valid_action(values: &[f64], valid: &[usize]) -> Option<usize> {
    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|&a, &b| {
        values[b]
            .partial_cmp(&values[a])
            .expect("action values must not be NaN")
            .then(b.cmp(&a))
    });
    order.into_iter().find(|a| valid.contains(a))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_table_is_zero() {
        let table = QTable::new(3, 4);
        for s in 0..3 {
            for a in 0..4 {
                assert_eq!(table.get(s, a), 0.0);
            }
        }
        assert_eq!(table.max_value(2), 0.0);
    }

    #[test]
    fn set_get_roundtrip() {
        let mut table = QTable::new(2, 2);
        table.set(1, 0, 2.5);
        assert_eq!(table.get(1, 0), 2.5);
        assert_eq!(table.get(1, 1), 0.0);
        assert_eq!(table.row(1), [2.5, 0.0]);
    }

    #[test]
    fn max_over_full_action_domain() {
        let mut table = QTable::new(1, 4);
        table.set(0, 1, -1.0);
        table.set(0, 2, 5.0);
        assert_eq!(table.max_value(0), 5.0);
    }

    #[test]
    #[should_panic(expected = "out of bounds")]
    fn out_of_bounds_state_panics() {
        QTable::new(2, 2).get(2, 0);
    }

    #[test]
    #[should_panic(expected = "out of bounds")]
    fn out_of_bounds_action_panics() {
        QTable::new(2, 2).get(0, 2);
    }

    #[test]
    fn best_valid_skips_invalid_maximum() {
        // Actions 0 and 1 dominate the row but are not valid
        let values = [9.0, 8.0, 1.0, 2.0];
        assert_eq!(best_valid_action(&values, &[2, 3]), Some(3));
        assert_eq!(best_valid_action(&values, &[2]), Some(2));
    }

    #[test]
    fn best_valid_tie_breaks_toward_higher_index() {
        let values = [0.0, 0.0, 0.0, 0.0];
        assert_eq!(best_valid_action(&values, &[0, 2]), Some(2));
        assert_eq!(best_valid_action(&values, &[0, 1, 2, 3]), Some(3));
    }

    #[test]
    fn best_valid_empty_set() {
        assert_eq!(best_valid_action(&[1.0, 2.0], &[]), None);
    }
}
