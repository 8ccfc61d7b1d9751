//! Game engine adapter (component F): composes the phase clock, the
//! talk-round controller and the opaque engine into one per-game object.
//! This is the only thing in the coordination core that is allowed to know
//! both "what phase is it really" (engine) and "are we still negotiating"
//! (talk controller) — everything else only ever sees the composed answer
//! from `get_current_phase`.

use crate::player_log::PlayerLogStore;
use crate::talk::{TalkController, TalkOutcome};
use diplomacy_engine::error::EngineError;
use diplomacy_engine::{Engine, GamePhaseData, ProcessOutcome};
use diplomacy_protocol::{GameId, Order, OrderRejection, PhaseId, PhaseType, PowerName, RuleSet, Username};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use tracing::warn;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameStatus {
    Forming,
    Active,
    Paused,
    Completed,
    Canceled,
}

#[derive(Debug, thiserror::Error)]
pub enum AdapterError {
    #[error("game is not active")]
    NotActive,
    #[error(transparent)]
    Engine(#[from] EngineError),
}

/// Who a filtered phase projection is being built for.
#[derive(Clone, Debug)]
pub enum ViewerRole {
    Power(PowerName),
    Observer,
    Omniscient,
}

#[derive(Serialize, Deserialize)]
struct Inner {
    status: GameStatus,
    rules: RuleSet,
    talk: TalkController,
    /// True while the publicly-visible phase is a Talk slot the engine
    /// itself never represents (see `diplomacy_engine::reference`'s
    /// `advance_skipping_talk`).
    in_talk_phase: bool,
    controllers: HashMap<PowerName, Username>,
    observers: HashSet<Username>,
    omniscients: HashSet<Username>,
    history: Vec<GamePhaseData>,
}

pub struct GameAdapter {
    game_id: GameId,
    map_name: String,
    engine: Arc<dyn Engine>,
    player_log: Arc<PlayerLogStore>,
    inner: Mutex<Inner>,
}

impl GameAdapter {
    /// Create the engine-side game and wrap it. `talk_num_rounds` is the
    /// fixed negotiation-round count for every TALK phase this game enters.
    pub fn new(
        game_id: GameId,
        map_name: String,
        rules: RuleSet,
        n_controls: usize,
        talk_num_rounds: u32,
        engine: Arc<dyn Engine>,
        player_log: Arc<PlayerLogStore>,
    ) -> Result<Self, AdapterError> {
        engine.create_game(&game_id, &map_name, rules.clone(), n_controls)?;
        let in_talk_phase = !rules.no_talk();
        Ok(Self {
            game_id,
            map_name,
            engine,
            player_log,
            inner: Mutex::new(Inner {
                status: GameStatus::Active,
                rules,
                talk: TalkController::new(talk_num_rounds),
                in_talk_phase,
                controllers: HashMap::new(),
                observers: HashSet::new(),
                omniscients: HashSet::new(),
                history: Vec::new(),
            }),
        })
    }

    pub fn game_id(&self) -> &GameId {
        &self.game_id
    }

    pub fn map_name(&self) -> &str {
        &self.map_name
    }

    pub fn status(&self) -> GameStatus {
        self.inner.lock().expect("adapter mutex poisoned").status
    }

    pub fn set_status(&self, status: GameStatus) {
        self.inner.lock().expect("adapter mutex poisoned").status = status;
    }

    pub fn join_game(&self, username: &Username, power: Option<PowerName>) -> Result<PowerName, AdapterError> {
        let power = self.engine.join_game(&self.game_id, username, power)?;
        self.inner
            .lock()
            .expect("adapter mutex poisoned")
            .controllers
            .insert(power.clone(), username.clone());
        Ok(power)
    }

    pub fn leave_game(&self, username: &Username) -> Result<(), AdapterError> {
        self.engine.leave_game(&self.game_id, username)?;
        self.inner
            .lock()
            .expect("adapter mutex poisoned")
            .controllers
            .retain(|_, u| u != username);
        Ok(())
    }

    pub fn is_controlled_by(&self, power: &PowerName, username: &Username) -> Result<bool, AdapterError> {
        Ok(self.engine.is_controlled_by(&self.game_id, power, username)?)
    }

    pub fn set_orders(&self, power: &PowerName, orders: Vec<Order>) -> Result<Vec<Order>, Vec<OrderRejection>> {
        self.engine.set_orders(&self.game_id, power, orders)
    }

    pub fn submit_retreat(&self, power: &PowerName, order: Order) -> Result<(), AdapterError> {
        Ok(self.engine.submit_retreat(&self.game_id, power, order)?)
    }

    /// The composed, publicly-visible phase: the engine's own phase while
    /// past negotiation, or the T slot immediately preceding it while a
    /// talk window is open.
    pub fn get_current_phase(&self) -> Result<PhaseId, AdapterError> {
        let inner = self.inner.lock().expect("adapter mutex poisoned");
        let engine_phase = self.engine.get_current_phase(&self.game_id)?;
        if inner.in_talk_phase {
            Ok(engine_phase.previous(Some(PhaseType::Talk)))
        } else {
            Ok(engine_phase)
        }
    }

    pub fn get_orderable_locations(&self) -> Result<HashMap<PowerName, Vec<String>>, AdapterError> {
        if self.inner.lock().expect("adapter mutex poisoned").in_talk_phase {
            return Ok(HashMap::new());
        }
        Ok(self.engine.get_orderable_locations(&self.game_id)?)
    }

    pub fn get_all_possible_orders(&self) -> Result<HashMap<String, Vec<Order>>, AdapterError> {
        if self.inner.lock().expect("adapter mutex poisoned").in_talk_phase {
            return Ok(HashMap::new());
        }
        Ok(self.engine.get_all_possible_orders(&self.game_id)?)
    }

    pub fn get_units(&self) -> Result<HashMap<PowerName, Vec<String>>, AdapterError> {
        Ok(self.engine.get_units(&self.game_id)?)
    }

    pub fn get_centers(&self) -> Result<HashMap<PowerName, Vec<String>>, AdapterError> {
        Ok(self.engine.get_centers(&self.game_id)?)
    }

    pub fn get_retreats(&self) -> Result<HashMap<PowerName, Vec<String>>, AdapterError> {
        Ok(self.engine.get_retreats(&self.game_id)?)
    }

    pub fn has_observer_token(&self, username: &Username) -> bool {
        self.inner.lock().expect("adapter mutex poisoned").observers.contains(username)
    }

    pub fn has_omniscient_token(&self, username: &Username) -> bool {
        self.inner.lock().expect("adapter mutex poisoned").omniscients.contains(username)
    }

    pub fn add_omniscient_token(&self, username: Username) {
        self.inner.lock().expect("adapter mutex poisoned").omniscients.insert(username);
    }

    pub fn add_observer_token(&self, username: Username) {
        self.inner.lock().expect("adapter mutex poisoned").observers.insert(username);
    }

    /// A mutating ready-signal, routed to the talk controller. No-op outside
    /// a talk window.
    pub fn mark_ready(&self, power: PowerName) -> Result<(), AdapterError> {
        let mut inner = self.inner.lock().expect("adapter mutex poisoned");
        if !inner.in_talk_phase {
            return Ok(());
        }
        let claimed_state = inner.talk.talk_round_state;
        inner.talk.mark_ready(power, claimed_state);
        Ok(())
    }

    /// Drive one external tick, per spec §4.F:
    /// 1. If inside a talk window, delegate to the talk controller; a
    ///    consumed tick (or one that only closes the window) returns `None`.
    /// 2. Otherwise call the engine's phase primitive, applying the skip
    ///    policy for empty Retreats/Adjustments phases.
    /// 3. Re-open the talk window once the engine has landed back on a
    ///    fresh Movement phase (the only phase type Talk ever precedes).
    /// 4. Log the previous phase's filtered projection for every
    ///    participant.
    pub fn process(&self) -> Result<Option<ProcessOutcome>, AdapterError> {
        let mut inner = self.inner.lock().expect("adapter mutex poisoned");
        if inner.status != GameStatus::Active {
            return Err(AdapterError::NotActive);
        }

        if inner.in_talk_phase {
            let powers = controlled_nonelim_powers(&self.engine, &self.game_id, &inner.controllers)?;
            match inner.talk.process(&powers) {
                TalkOutcome::Consumed => return Ok(None),
                TalkOutcome::ReadyToAdvance => {
                    inner.in_talk_phase = false;
                    return Ok(None);
                }
            }
        }

        let mut outcome = self.engine.process_phase(&self.game_id)?;
        while !inner.rules.dont_skip_phases() && self.is_emptily_skippable(&outcome)? {
            outcome = self.engine.process_phase(&self.game_id)?;
        }

        if outcome.current_phase_data.phase.kind == PhaseType::Movement && !inner.rules.no_talk() {
            inner.in_talk_phase = true;
            inner.talk.reset();
        }

        inner.history.push(outcome.current_phase_data.clone());
        self.log_for_participants(&inner, &outcome.previous_phase_data);

        Ok(Some(outcome))
    }

    fn is_emptily_skippable(&self, outcome: &ProcessOutcome) -> Result<bool, AdapterError> {
        match outcome.current_phase_data.phase.kind {
            PhaseType::Retreats => {
                let retreats = self.engine.get_retreats(&self.game_id)?;
                Ok(retreats.values().all(|v| v.is_empty()))
            }
            // This reference engine never needs a build/disband decision —
            // center ownership is fixed at creation — so Adjustments always
            // skips. A fuller engine would check for unsettled adjustments.
            PhaseType::Adjustments => Ok(true),
            PhaseType::Movement | PhaseType::Talk => Ok(false),
        }
    }

    fn log_for_participants(&self, inner: &Inner, data: &GamePhaseData) {
        for (power, username) in &inner.controllers {
            let entry = diplomacy_protocol::PhaseLogEntry::new(data.phase, project(data, &ViewerRole::Power(power.clone())));
            if let Err(e) = self.player_log.append(username, &self.game_id, &entry) {
                warn!(?e, %username, game_id = %self.game_id, "failed to append player log entry");
            }
        }
        for username in inner.observers.iter().chain(inner.omniscients.iter()) {
            let role = if inner.omniscients.contains(username) {
                ViewerRole::Omniscient
            } else {
                ViewerRole::Observer
            };
            let entry = diplomacy_protocol::PhaseLogEntry::new(data.phase, project(data, &role));
            if let Err(e) = self.player_log.append(username, &self.game_id, &entry) {
                warn!(?e, %username, game_id = %self.game_id, "failed to append player log entry");
            }
        }
    }

    /// Every logged phase between `from` and `to` (inclusive indices into
    /// this game's history), projected for `role`.
    pub fn get_phase_history(&self, from: Option<usize>, to: Option<usize>, role: &ViewerRole) -> Vec<Value> {
        let inner = self.inner.lock().expect("adapter mutex poisoned");
        let from = from.unwrap_or(0);
        let to = to.unwrap_or(inner.history.len().saturating_sub(1));
        inner
            .history
            .iter()
            .enumerate()
            .filter(|(i, _)| *i >= from && *i <= to)
            .map(|(_, data)| project(data, role))
            .collect()
    }

    pub fn to_json(&self) -> Result<Value, AdapterError> {
        let inner = self.inner.lock().expect("adapter mutex poisoned");
        let engine_state = self.engine.to_json(&self.game_id)?;
        let inner_state = serde_json::to_value(&*inner).unwrap_or(Value::Null);
        Ok(json!({
            "game_id": self.game_id,
            "map_name": self.map_name,
            "engine": engine_state,
            "core": inner_state,
        }))
    }
}

fn controlled_nonelim_powers(
    engine: &Arc<dyn Engine>,
    game_id: &GameId,
    controllers: &HashMap<PowerName, Username>,
) -> Result<Vec<PowerName>, AdapterError> {
    let units = engine.get_units(game_id)?;
    let centers = engine.get_centers(game_id)?;
    Ok(controllers
        .keys()
        .filter(|power| {
            let has_units = units.get(*power).map(|v| !v.is_empty()).unwrap_or(false);
            let has_centers = centers.get(*power).map(|v| !v.is_empty()).unwrap_or(false);
            has_units || has_centers
        })
        .cloned()
        .collect())
}

/// Project one phase's full data down to what `role` is allowed to see.
/// Powers see only their own submitted orders; observers see none; an
/// omniscient viewer sees everything. State and results are not filtered —
/// the opaque engine is trusted to have already redacted secret positions
/// if its map ever needs fog of war, which this reference engine doesn't.
fn project(data: &GamePhaseData, role: &ViewerRole) -> Value {
    let orders_visible: HashMap<&PowerName, &Vec<Order>> = match role {
        ViewerRole::Omniscient => data.orders.iter().collect(),
        ViewerRole::Power(p) => data.orders.iter().filter(|(power, _)| *power == p).collect(),
        ViewerRole::Observer => HashMap::new(),
    };
    json!({
        "phase": data.phase.abbrev(),
        "state": data.state,
        "results": data.results,
        "orders": orders_visible,
        "messages": data.messages,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use diplomacy_engine::ReferenceEngine;
    use diplomacy_protocol::RuleFlag;
    use std::sync::Arc;
    use tempfile::tempdir;

    fn setup(no_talk: bool) -> (GameAdapter, Vec<PowerName>) {
        let engine: Arc<dyn Engine> = Arc::new(ReferenceEngine::new());
        let dir = tempdir().unwrap();
        let log = Arc::new(PlayerLogStore::new(dir.path()));
        let mut rules = RuleSet::default();
        if no_talk {
            rules.set(RuleFlag::NoTalk);
        }
        let adapter = GameAdapter::new(GameId::new("game_TEST"), "standard".to_string(), rules, 7, 2, engine.clone(), log).unwrap();
        let powers = engine.powers(adapter.game_id()).unwrap();
        for power in &powers {
            adapter.join_game(&Username::from(power.as_str()), Some(power.clone())).unwrap();
        }
        (adapter, powers)
    }

    #[test]
    fn no_talk_game_starts_at_movement_and_skips_empty_phases() {
        let (adapter, powers) = setup(true);
        assert_eq!(adapter.get_current_phase().unwrap().abbrev(), "S1901M");
        for power in &powers {
            adapter.set_orders(power, vec![Order::new(format!("A {} H", adapter.get_units().unwrap()[power][0].split_whitespace().nth(1).unwrap()))]).ok();
        }
        let outcome = adapter.process().unwrap().expect("no-talk tick always advances the engine");
        assert_eq!(outcome.current_phase_data.phase.abbrev(), "F1901M");
        assert_eq!(adapter.get_current_phase().unwrap().abbrev(), "F1901M");
    }

    #[test]
    fn talk_enabled_game_starts_at_talk_and_opens_on_first_tick() {
        let (adapter, _) = setup(false);
        assert_eq!(adapter.get_current_phase().unwrap().abbrev(), "S1901T");
        adapter.process().unwrap();
        assert_eq!(adapter.get_current_phase().unwrap().abbrev(), "S1901T");
    }

    #[test]
    fn talk_cycle_then_movement_matches_scenario_one() {
        let (adapter, powers) = setup(false);
        // tick 1: Idle -> round_open (round 1)
        assert!(adapter.process().unwrap().is_none());
        for power in &powers {
            adapter.mark_ready(power.clone()).unwrap();
        }
        // tick 2: round 1 complete -> round_open (round 2)
        assert!(adapter.process().unwrap().is_none());
        for power in &powers {
            adapter.mark_ready(power.clone()).unwrap();
        }
        // tick 3: round 2 complete -> orders_open
        assert!(adapter.process().unwrap().is_none());
        for power in &powers {
            adapter.mark_ready(power.clone()).unwrap();
        }
        // tick 4: orders_open complete -> talk window closes, phase shows M
        assert!(adapter.process().unwrap().is_none());
        assert_eq!(adapter.get_current_phase().unwrap().abbrev(), "S1901M");
    }
}
