//! Talk-round controller (component E): a small sub-state-machine that runs
//! inside one TALK phase, giving players a bounded negotiation window before
//! the adapter is allowed to push the phase clock past T.
//!
//! Shaped after the teacher's `game/turn.rs::TurnManager` — a round counter
//! plus a per-round "who's ready" set, advanced one `process()` tick at a
//! time — but the states here are fixed to the three named in the
//! negotiation lifecycle rather than the teacher's configurable turn modes.

use diplomacy_protocol::PowerName;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TalkState {
    /// Not yet inside a talk window (either pre-entry, or just reset on exit).
    Idle,
    /// Round `round` of negotiation is open.
    RoundOpen,
    /// All negotiation rounds spent; waiting for readiness before orders.
    OrdersOpen,
}

impl TalkState {
    fn as_str(self) -> &'static str {
        match self {
            TalkState::Idle => "",
            TalkState::RoundOpen => "round_open",
            TalkState::OrdersOpen => "orders_open",
        }
    }
}

/// One game's negotiation sub-state. Serialized alongside the rest of the
/// adapter's persisted fields — `talk_round`, `talk_round_state`,
/// `talk_ready`, `talk_held_messages`, `talk_num_rounds` all round-trip.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TalkController {
    pub talk_num_rounds: u32,
    pub talk_round: u32,
    pub talk_round_state: TalkState,
    pub talk_ready: HashSet<PowerName>,
    pub talk_held_messages: Vec<serde_json::Value>,
}

/// What happened on one `process()` tick, reported back to the adapter.
pub enum TalkOutcome {
    /// The tick was consumed inside the talk window; phase stays at T.
    Consumed,
    /// All rounds and the final readiness gate passed; the adapter should now
    /// advance the phase clock past T and reset this controller.
    ReadyToAdvance,
}

impl TalkController {
    pub fn new(talk_num_rounds: u32) -> Self {
        Self {
            talk_num_rounds,
            talk_round: 0,
            talk_round_state: TalkState::Idle,
            talk_ready: HashSet::new(),
            talk_held_messages: Vec::new(),
        }
    }

    /// True iff every controlled, non-eliminated power in `powers` has
    /// signalled ready, and the state is one of the two "open" states.
    /// Trivially true for a solitaire game (`powers` empty after filtering).
    pub fn round_complete(&self, powers: &[PowerName]) -> bool {
        if !matches!(self.talk_round_state, TalkState::RoundOpen | TalkState::OrdersOpen) {
            return false;
        }
        powers.iter().all(|p| self.talk_ready.contains(p))
    }

    /// Insert `power` into the current round's ready set. Idempotent.
    /// `claimed_state` must match the controller's current state, per the
    /// fix for the ready/advance race: a stale ready-insert from a round
    /// that already advanced is silently dropped rather than polluting the
    /// new round.
    pub fn mark_ready(&mut self, power: PowerName, claimed_state: TalkState) {
        if claimed_state == self.talk_round_state {
            self.talk_ready.insert(power);
        }
    }

    /// Drive one tick. `powers` is the set of controlled, non-eliminated
    /// powers `round_complete` checks readiness against.
    pub fn process(&mut self, powers: &[PowerName]) -> TalkOutcome {
        match self.talk_round_state {
            TalkState::Idle => {
                self.talk_round = 1;
                self.talk_round_state = TalkState::RoundOpen;
                self.talk_ready.clear();
                TalkOutcome::Consumed
            }
            TalkState::RoundOpen => {
                if !self.round_complete(powers) {
                    return TalkOutcome::Consumed;
                }
                if self.talk_round < self.talk_num_rounds {
                    self.talk_round += 1;
                    self.talk_round_state = TalkState::RoundOpen;
                } else {
                    self.talk_round_state = TalkState::OrdersOpen;
                }
                self.talk_ready.clear();
                TalkOutcome::Consumed
            }
            TalkState::OrdersOpen => {
                if !self.round_complete(powers) {
                    return TalkOutcome::Consumed;
                }
                self.reset();
                TalkOutcome::ReadyToAdvance
            }
        }
    }

    /// Reset to the pre-entry state; called by the adapter once it has
    /// advanced the phase clock past T.
    pub fn reset(&mut self) {
        self.talk_round = 0;
        self.talk_round_state = TalkState::Idle;
        self.talk_ready.clear();
        self.talk_held_messages.clear();
    }

    pub fn state_label(&self) -> &'static str {
        self.talk_round_state.as_str()
    }

    pub fn hold_message(&mut self, message: serde_json::Value) {
        self.talk_held_messages.push(message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn powers(names: &[&str]) -> Vec<PowerName> {
        names.iter().map(|n| PowerName::new(n.to_string())).collect()
    }

    #[test]
    fn default_two_round_cycle_matches_scenario_one() {
        let all = powers(&["FRANCE", "ENGLAND"]);
        let mut talk = TalkController::new(2);

        assert!(matches!(talk.process(&all), TalkOutcome::Consumed));
        assert_eq!(talk.talk_round, 1);
        assert_eq!(talk.state_label(), "round_open");

        for p in &all {
            talk.mark_ready(p.clone(), talk.talk_round_state);
        }
        assert!(matches!(talk.process(&all), TalkOutcome::Consumed));
        assert_eq!(talk.talk_round, 2);
        assert_eq!(talk.state_label(), "round_open");

        for p in &all {
            talk.mark_ready(p.clone(), talk.talk_round_state);
        }
        assert!(matches!(talk.process(&all), TalkOutcome::Consumed));
        assert_eq!(talk.state_label(), "orders_open");

        for p in &all {
            talk.mark_ready(p.clone(), talk.talk_round_state);
        }
        assert!(matches!(talk.process(&all), TalkOutcome::ReadyToAdvance));
        assert_eq!(talk.talk_round, 0);
        assert_eq!(talk.state_label(), "");
    }

    #[test]
    fn solitaire_game_is_trivially_round_complete() {
        let talk = TalkController::new(2);
        assert!(talk.round_complete(&[]) == false);
        let mut talk = talk;
        talk.process(&[]);
        assert!(talk.round_complete(&[]));
    }

    #[test]
    fn stale_ready_insert_for_old_state_is_dropped() {
        let all = powers(&["FRANCE"]);
        let mut talk = TalkController::new(1);
        talk.process(&all); // Idle -> RoundOpen
        let stale_state = talk.talk_round_state; // RoundOpen
        for p in &all {
            talk.mark_ready(p.clone(), talk.talk_round_state);
        }
        talk.process(&all); // RoundOpen -> OrdersOpen (only round configured)
        assert_eq!(talk.state_label(), "orders_open");

        talk.mark_ready(PowerName::new("FRANCE"), stale_state);
        assert!(talk.talk_ready.is_empty());
    }

    #[test]
    fn duplicate_ready_insert_is_idempotent() {
        let mut talk = TalkController::new(1);
        talk.process(&[]);
        let power = PowerName::new("FRANCE");
        talk.mark_ready(power.clone(), talk.talk_round_state);
        talk.mark_ready(power.clone(), talk.talk_round_state);
        assert_eq!(talk.talk_ready.len(), 1);
    }
}
