use crate::comm::Communicator;
use crate::config::ProblemConfig;
use crate::error::Result;

/// Tracks the global max change across rounds and decides when to stop.
/// Every rank holds one and feeds it the same reduced values, so all
/// ranks make the same decision in the same round.
/// Only monitors built `with_history` keep the per round values.
#[derive(Debug, Clone)]
pub struct ConvergenceMonitor {
    epsilon: f64,
    max_rounds: Option<usize>,
    global_max_delta: f64,
    rounds: usize,
    history: Option<Vec<f64>>,
}

impl ConvergenceMonitor {
    pub fn new(epsilon: f64, max_rounds: Option<usize>) -> Self {
        ConvergenceMonitor {
            epsilon,
            max_rounds,
            global_max_delta: f64::INFINITY,
            rounds: 0,
            history: None,
        }
    }

    pub fn from_config(config: &ProblemConfig) -> Self {
        Self::new(config.epsilon, config.max_rounds)
    }

    /// Record the global max change of every round.
    pub fn with_history(mut self) -> Self {
        self.history.get_or_insert_with(Vec::new);
        self
    }

    /// Loop condition, true before the first round.
    pub fn should_continue(&self) -> bool {
        self.global_max_delta > self.epsilon
            && self.max_rounds.map_or(true, |max| self.rounds < max)
    }

    /// Reduce this rank's max change with the rest of the group and
    /// record the round. Returns the global max and whether to go on.
    pub fn reduce_and_decide<C: Communicator>(
        &mut self,
        comm: &C,
        local_max_delta: f64,
    ) -> Result<(f64, bool)> {
        profiling::scope!("convergence::reduce");
        let global = comm.all_reduce_max(local_max_delta)?;
        self.global_max_delta = global;
        self.rounds += 1;
        if let Some(history) = &mut self.history {
            history.push(global);
        }
        Ok((global, self.should_continue()))
    }

    pub fn global_max_delta(&self) -> f64 {
        self.global_max_delta
    }

    pub fn rounds(&self) -> usize {
        self.rounds
    }

    /// Global max change of every round so far,
    /// empty unless built `with_history`.
    pub fn into_history(self) -> Vec<f64> {
        self.history.unwrap_or_default()
    }
}
