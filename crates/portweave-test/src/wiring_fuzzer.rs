//! Wiring fuzzer - randomized mutation of connectivity patterns
//!
//! Applies random connect/disconnect/clear operations to a pattern and checks
//! after every step:
//! - No destination has more than one source
//! - Every edge spans two different interface groups
//! - Ports and edges stay unique and in canonical order
//! - A rejected operation leaves the pattern unchanged

use std::collections::HashSet;

use portweave_core::{ErrorKind, WeaveResult};
use portweave_pattern::Pattern;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info};

/// Fuzzer configuration
#[derive(Clone, Debug)]
pub struct FuzzerConfig {
    /// Number of interface groups
    pub groups: usize,
    /// Ports per group
    pub ports_per_group: usize,
    /// Number of operations to apply
    pub op_count: usize,
    /// Largest port range on either side of one operation
    pub batch_max: usize,
    /// Probability of a positional (rather than product) connect
    pub each_prob: f64,
    /// Probability of a disconnect
    pub disconnect_prob: f64,
    /// Probability of a clear
    pub clear_prob: f64,
    /// Random seed
    pub seed: u64,
}

impl Default for FuzzerConfig {
    fn default() -> Self {
        FuzzerConfig {
            groups: 3,
            ports_per_group: 8,
            op_count: 500,
            batch_max: 3,
            each_prob: 0.3,
            disconnect_prob: 0.2,
            clear_prob: 0.01,
            seed: 42,
        }
    }
}

impl FuzzerConfig {
    /// Light fuzzing for quick tests
    pub fn light() -> Self {
        FuzzerConfig {
            groups: 2,
            ports_per_group: 4,
            op_count: 100,
            batch_max: 2,
            each_prob: 0.3,
            disconnect_prob: 0.2,
            clear_prob: 0.0,
            seed: 42,
        }
    }

    /// Heavy fuzzing for thorough testing
    pub fn heavy() -> Self {
        FuzzerConfig {
            groups: 5,
            ports_per_group: 32,
            op_count: 5000,
            batch_max: 6,
            each_prob: 0.4,
            disconnect_prob: 0.25,
            clear_prob: 0.005,
            seed: 42,
        }
    }
}

/// One generated operation
#[derive(Clone, Debug, PartialEq)]
pub enum WiringOp {
    Connect { src: String, dst: String },
    ConnectEach { src: String, dst: String },
    Disconnect { src: String, dst: String },
    Clear,
}

/// Result of applying one operation
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OpOutcome {
    Applied,
    Rejected(ErrorKind),
}

/// Fuzzing result
#[derive(Debug, Default)]
pub struct FuzzResult {
    pub applied: usize,
    pub rejected: usize,
    pub fan_in_rejections: usize,
    pub violations: Vec<String>,
}

impl FuzzResult {
    pub fn is_valid(&self) -> bool {
        self.violations.is_empty()
    }
}

/// Wiring fuzzer
pub struct WiringFuzzer {
    config: FuzzerConfig,
    pattern: Pattern,
    rng: StdRng,
}

impl WiringFuzzer {
    /// Create a fuzzer over `config.groups` groups named `/g0`, `/g1`, ...
    pub fn new(config: FuzzerConfig) -> WeaveResult<Self> {
        let selectors: Vec<String> = (0..config.groups)
            .map(|g| format!("/g{}[0:{}]", g, config.ports_per_group))
            .collect();
        let pattern = Pattern::new(&selectors)?;
        let rng = StdRng::seed_from_u64(config.seed);
        Ok(WiringFuzzer {
            config,
            pattern,
            rng,
        })
    }

    pub fn pattern(&self) -> &Pattern {
        &self.pattern
    }

    /// Random port range of `group`
    fn random_range(&mut self, group: usize) -> String {
        let n = self.config.ports_per_group;
        let start = self.rng.gen_range(0..n);
        let len = self.rng.gen_range(1..=self.config.batch_max).min(n - start);
        format!("/g{}[{}:{}]", group, start, start + len)
    }

    /// Generate a random operation. Groups may coincide, which must be rejected.
    pub fn generate_op(&mut self) -> WiringOp {
        let roll = self.rng.gen::<f64>();
        if roll < self.config.clear_prob {
            return WiringOp::Clear;
        }
        let from = self.rng.gen_range(0..self.config.groups);
        let to = self.rng.gen_range(0..self.config.groups);
        let src = self.random_range(from);
        let dst = self.random_range(to);
        if roll < self.config.clear_prob + self.config.disconnect_prob {
            WiringOp::Disconnect { src, dst }
        } else if self.rng.gen::<f64>() < self.config.each_prob {
            WiringOp::ConnectEach { src, dst }
        } else {
            WiringOp::Connect { src, dst }
        }
    }

    /// Apply one operation, recording a violation if a rejected operation
    /// changed the pattern
    pub fn apply(&mut self, op: &WiringOp, result: &mut FuzzResult) -> OpOutcome {
        let before = self.pattern.clone();
        let outcome = match op {
            WiringOp::Connect { src, dst } => self.pattern.connect(src.as_str(), dst.as_str(), &[], 1),
            WiringOp::ConnectEach { src, dst } => {
                self.pattern.connect_each(src.as_str(), dst.as_str(), &[], 1)
            }
            WiringOp::Disconnect { src, dst } => {
                self.pattern.disconnect(src.as_str(), dst.as_str()).map(|_| ())
            }
            WiringOp::Clear => {
                self.pattern.clear();
                Ok(())
            }
        };
        match outcome {
            Ok(()) => OpOutcome::Applied,
            Err(e) => {
                if self.pattern != before {
                    result
                        .violations
                        .push(format!("rejected {:?} mutated the pattern", op));
                }
                OpOutcome::Rejected(e.kind())
            }
        }
    }

    /// Run the fuzzer
    pub fn run(&mut self) -> FuzzResult {
        let mut result = FuzzResult::default();
        for step in 0..self.config.op_count {
            let op = self.generate_op();
            match self.apply(&op, &mut result) {
                OpOutcome::Applied => result.applied += 1,
                OpOutcome::Rejected(kind) => {
                    result.rejected += 1;
                    if kind == ErrorKind::FanIn {
                        result.fan_in_rejections += 1;
                    }
                }
            }
            for violation in check_invariants(&self.pattern) {
                result.violations.push(format!("step {}: {}", step, violation));
            }
        }
        info!(
            applied = result.applied,
            rejected = result.rejected,
            edges = self.pattern.len(),
            violations = result.violations.len(),
            "wiring fuzz finished"
        );
        result
    }
}

/// Every invariant violated by `pattern`, described
pub fn check_invariants(pattern: &Pattern) -> Vec<String> {
    let mut violations = Vec::new();
    if !properties::no_fan_in(pattern) {
        violations.push("destination with more than one source".to_string());
    }
    if !properties::edges_span_groups(pattern) {
        violations.push("edge within a single interface".to_string());
    }
    if !properties::canonical_order(pattern) {
        violations.push("ports or edges out of canonical order".to_string());
    }
    if !properties::sources_consistent(pattern) {
        violations.push("source index disagrees with edge table".to_string());
    }
    if !violations.is_empty() {
        debug!(count = violations.len(), "invariant violations");
    }
    violations
}

/// Structural properties of a pattern
pub mod properties {
    use super::*;

    /// Property: each destination has at most one incoming edge
    pub fn no_fan_in(pattern: &Pattern) -> bool {
        let mut dests = HashSet::new();
        pattern.edges().all(|((_, d), _)| dests.insert(d))
    }

    /// Property: both endpoints of an edge belong to different groups
    pub fn edges_span_groups(pattern: &Pattern) -> bool {
        let interface = pattern.interface();
        pattern.edges().all(|((s, d), _)| {
            let (a, b) = (interface.group_of(s), interface.group_of(d));
            a.is_some() && b.is_some() && a != b
        })
    }

    /// Property: ports and edges are strictly increasing in canonical order
    pub fn canonical_order(pattern: &Pattern) -> bool {
        let ids: Vec<_> = pattern.interface().ids().collect();
        let conns: Vec<_> = pattern.edges().map(|(k, _)| k).collect();
        ids.windows(2).all(|w| w[0] < w[1]) && conns.windows(2).all(|w| w[0] < w[1])
    }

    /// Property: the destination-to-source index matches the edges
    pub fn sources_consistent(pattern: &Pattern) -> bool {
        pattern
            .edges()
            .all(|((s, d), _)| pattern.source_of(d) == Some(s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fuzzer_light() {
        crate::init_tracing();
        let mut fuzzer = WiringFuzzer::new(FuzzerConfig::light()).unwrap();
        let result = fuzzer.run();
        assert!(result.is_valid(), "{:?}", result.violations);
        assert_eq!(result.applied + result.rejected, 100);
    }

    #[test]
    fn test_fuzzer_default() {
        let mut fuzzer = WiringFuzzer::new(FuzzerConfig::default()).unwrap();
        let result = fuzzer.run();
        assert!(result.is_valid(), "{:?}", result.violations);
        assert!(result.applied > 0);
        assert!(result.fan_in_rejections > 0);
    }

    #[test]
    fn test_same_seed_same_pattern() {
        let mut a = WiringFuzzer::new(FuzzerConfig::light()).unwrap();
        let mut b = WiringFuzzer::new(FuzzerConfig::light()).unwrap();
        a.run();
        b.run();
        assert_eq!(a.pattern(), b.pattern());
    }

    #[test]
    fn test_rejected_op_is_noop() {
        let mut fuzzer = WiringFuzzer::new(FuzzerConfig::light()).unwrap();
        let mut result = FuzzResult::default();
        let op = WiringOp::Connect {
            src: "/g0[0:2]".to_string(),
            dst: "/g0[2:4]".to_string(),
        };
        assert_eq!(
            fuzzer.apply(&op, &mut result),
            OpOutcome::Rejected(ErrorKind::Direction)
        );
        assert!(result.is_valid());
        assert!(fuzzer.pattern().is_empty());
    }
}
