use std::collections::BTreeMap;

/// Progress counters for one mode invocation, owned by the caller.
///
/// Logs a line like "Files hashed: 2000" whenever a count crosses a step
/// boundary, and dumps every final count at the end of the run.
pub struct Counters {
    counts: BTreeMap<String, u64>,
    steps: BTreeMap<String, u64>,
    step: u64,
}

const DEFAULT_STEP: u64 = 1000;

impl Counters {
    pub fn new() -> Self {
        Self::with_step(DEFAULT_STEP)
    }

    pub fn with_step(step: u64) -> Self {
        Counters {
            counts: BTreeMap::new(),
            steps: BTreeMap::new(),
            step: step.max(1),
        }
    }

    /// Increment a named count by one.
    pub fn inc(&mut self, name: &str) {
        self.add(name, 1);
    }

    /// Increment a named count by `amount`.
    pub fn add(&mut self, name: &str, amount: u64) {
        let count = self.counts.entry(name.to_string()).or_insert(0);
        *count += amount;

        let new_step = *count / self.step;
        let cur_step = self.steps.entry(name.to_string()).or_insert(0);
        if new_step > *cur_step {
            *cur_step = new_step;
            log::info!("{}: {}", name, new_step * self.step);
        }
    }

    pub fn get(&self, name: &str) -> u64 {
        self.counts.get(name).copied().unwrap_or(0)
    }

    /// Log every final count.
    pub fn dump(&self) {
        for (name, count) in &self.counts {
            log::info!("{}: {}", name, count);
        }
    }
}

impl Default for Counters {
    fn default() -> Self {
        Self::new()
    }
}
