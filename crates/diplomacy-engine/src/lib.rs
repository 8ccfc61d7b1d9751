//! The contract for the Diplomacy rules engine — the external collaborator
//! that owns order legality, adjudication and map geometry. Those concerns
//! are out of scope for the coordination core; this crate defines the
//! `Engine` trait the game engine adapter (component F, in `diplomacy-core`)
//! programs against, plus one concrete, deliberately simplified
//! implementation (`ReferenceEngine`) that stands in for it.
//!
//! `ReferenceEngine` is not DATC-complete: it has no convoys, no build/disband
//! accounting beyond center ownership, and a simplified support-cutting rule.
//! It exists to drive the coordination core's own test scenarios, the way a
//! test double stands in for a collaborator reached only by contract.

pub mod error;
pub mod map;
pub mod reference;

use diplomacy_protocol::{GameId, Order, OrderRejection, PhaseId, PowerName, RuleSet, Username};
use error::EngineError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

pub use map::{lookup as lookup_map, MapInfo};
pub use reference::ReferenceEngine;

/// One processed phase's full (unfiltered) data. The adapter projects this
/// per-participant before it reaches the player log.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GamePhaseData {
    pub phase: PhaseId,
    pub state: Value,
    pub orders: HashMap<PowerName, Vec<Order>>,
    pub results: Value,
    pub messages: Vec<Value>,
}

/// Outcome of one `process_phase` call.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProcessOutcome {
    pub previous_phase_data: GamePhaseData,
    pub current_phase_data: GamePhaseData,
    /// Powers the engine force-waived/auto-processed because they never
    /// submitted orders for a phase that required them.
    pub kicked_powers: Vec<PowerName>,
}

/// The engine contract. Implementations are expected to serialize internally
/// however they like; `to_json`/`from_json` are the only cross-process
/// boundary this trait defines.
pub trait Engine: Send + Sync {
    fn create_game(
        &self,
        game_id: &GameId,
        map_name: &str,
        rules: RuleSet,
        n_controls: usize,
    ) -> Result<(), EngineError>;

    fn delete_game(&self, game_id: &GameId) -> Result<(), EngineError>;

    /// Bind a power to a controller. `power = None` requests random
    /// assignment from the map's remaining unclaimed powers (the
    /// `PowerChoice` rule flag instead lets the lobby pass a specific power).
    fn join_game(
        &self,
        game_id: &GameId,
        username: &Username,
        power: Option<PowerName>,
    ) -> Result<PowerName, EngineError>;

    /// Release `username`'s binding to whatever power they controlled. The
    /// power becomes a dummy (uncontrolled) rather than being removed.
    fn leave_game(&self, game_id: &GameId, username: &Username) -> Result<(), EngineError>;

    fn powers(&self, game_id: &GameId) -> Result<Vec<PowerName>, EngineError>;

    fn get_current_phase(&self, game_id: &GameId) -> Result<PhaseId, EngineError>;

    fn get_orderable_locations(
        &self,
        game_id: &GameId,
    ) -> Result<HashMap<PowerName, Vec<String>>, EngineError>;

    fn get_all_possible_orders(
        &self,
        game_id: &GameId,
    ) -> Result<HashMap<String, Vec<Order>>, EngineError>;

    /// Replace `power`'s pending orders for the current phase. On success,
    /// returns the accepted orders; on any invalid order, rejects the whole
    /// batch with one `OrderRejection` per invalid entry and leaves previously
    /// set orders untouched (set_orders is all-or-nothing, matching "no
    /// state change" in the order-validation scenario).
    fn set_orders(
        &self,
        game_id: &GameId,
        power: &PowerName,
        orders: Vec<Order>,
    ) -> Result<Vec<Order>, Vec<OrderRejection>>;

    /// Submit a retreat order for a dislodged unit. Outside the normal
    /// `set_orders` path since it only applies during an R phase and targets
    /// one unit rather than a whole power's order set.
    fn submit_retreat(
        &self,
        game_id: &GameId,
        power: &PowerName,
        order: Order,
    ) -> Result<(), EngineError>;

    /// Advance exactly one engine phase tick (never the talk sub-machine,
    /// which the adapter handles itself before ever calling this).
    fn process_phase(&self, game_id: &GameId) -> Result<ProcessOutcome, EngineError>;

    fn get_units(&self, game_id: &GameId) -> Result<HashMap<PowerName, Vec<String>>, EngineError>;

    fn get_centers(&self, game_id: &GameId) -> Result<HashMap<PowerName, Vec<String>>, EngineError>;

    /// Units currently owed a retreat order, by power.
    fn get_retreats(&self, game_id: &GameId) -> Result<HashMap<PowerName, Vec<String>>, EngineError>;

    fn is_controlled_by(
        &self,
        game_id: &GameId,
        power: &PowerName,
        username: &Username,
    ) -> Result<bool, EngineError>;

    fn to_json(&self, game_id: &GameId) -> Result<Value, EngineError>;
}
