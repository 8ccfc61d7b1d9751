//! Rule flags governing how the phase clock and talk controller behave.
//!
//! A `RuleSet` is small and intentionally not map data: it only carries the
//! handful of booleans the coordination core itself branches on. Anything
//! adjudication-specific (builds, variants, victory conditions) belongs to
//! the engine, not here.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RuleFlag {
    /// Never auto-skip a phase with no orderable units/no pending talk; every
    /// phase slot in the template is always visited.
    DontSkipPhases,
    /// The game has no talk phases at all; `PhaseId::first` starts at
    /// `SPRING 1901 MOVEMENT` and talk-round slots are skipped by `next`.
    NoTalk,
    /// Players pick their power at join time instead of random assignment
    /// (4.G "start").
    PowerChoice,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleSet {
    flags: HashSet<RuleFlag>,
}

impl RuleSet {
    pub fn new(flags: impl IntoIterator<Item = RuleFlag>) -> Self {
        Self {
            flags: flags.into_iter().collect(),
        }
    }

    pub fn has(&self, flag: RuleFlag) -> bool {
        self.flags.contains(&flag)
    }

    pub fn set(&mut self, flag: RuleFlag) {
        self.flags.insert(flag);
    }

    pub fn unset(&mut self, flag: RuleFlag) {
        self.flags.remove(&flag);
    }

    pub fn no_talk(&self) -> bool {
        self.has(RuleFlag::NoTalk)
    }

    pub fn dont_skip_phases(&self) -> bool {
        self.has(RuleFlag::DontSkipPhases)
    }

    pub fn power_choice(&self) -> bool {
        self.has(RuleFlag::PowerChoice)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_rule_set_has_no_flags() {
        let rules = RuleSet::default();
        assert!(!rules.no_talk());
        assert!(!rules.dont_skip_phases());
        assert!(!rules.power_choice());
    }

    #[test]
    fn set_and_unset_round_trip() {
        let mut rules = RuleSet::default();
        rules.set(RuleFlag::NoTalk);
        assert!(rules.no_talk());
        rules.unset(RuleFlag::NoTalk);
        assert!(!rules.no_talk());
    }

    #[test]
    fn new_collects_an_iterator_of_flags() {
        let rules = RuleSet::new([RuleFlag::NoTalk, RuleFlag::PowerChoice]);
        assert!(rules.no_talk());
        assert!(rules.power_choice());
        assert!(!rules.dont_skip_phases());
    }
}
