//! A simplified, non-DATC-complete reference implementation of [`Engine`].
//!
//! Movement adjudication understands holds, moves and supports over a small
//! built-in province graph (enough to drive retreats and bounces); it has no
//! convoys and Adjustments phases never build or disband — center ownership
//! is fixed at game creation. This is a test double for "the Diplomacy rules
//! engine proper", not a production adjudicator.

use crate::error::EngineError;
use crate::map;
use crate::{Engine, GamePhaseData, ProcessOutcome};
use diplomacy_protocol::{
    GameId, Order, OrderRejection, PhaseId, PhaseType, PowerName, RuleSet, Season, Username,
};
use serde_json::json;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

/// Adjacency for the reduced province graph this engine understands.
/// Real Diplomacy has ~75 provinces; this is a teaching-scale subset
/// sufficient to exercise moves, bounces, dislodgements and retreats.
const ADJACENCY: &[(&str, &[&str])] = &[
    ("PAR", &["BUR", "PIC", "GAS", "BRE"]),
    ("BUR", &["PAR", "GAS", "MAR", "PIC", "MUN", "PIE"]),
    ("GAS", &["PAR", "BUR", "MAR", "BRE", "SPA"]),
    ("PIC", &["PAR", "BUR", "BRE"]),
    ("BRE", &["PAR", "PIC", "GAS"]),
    ("MAR", &["BUR", "GAS", "SPA", "PIE"]),
    ("SPA", &["GAS", "MAR", "POR"]),
    ("POR", &["SPA"]),
    ("MUN", &["BUR", "KIE", "BER", "SIL", "BOH", "TYR"]),
    ("KIE", &["MUN", "BER", "RUH"]),
    ("BER", &["KIE", "MUN", "SIL", "PRU"]),
    ("RUH", &["KIE", "MUN"]),
    ("SIL", &["BER", "MUN", "BOH", "PRU", "WAR"]),
    ("PRU", &["BER", "SIL", "WAR"]),
    ("WAR", &["PRU", "SIL", "MOS", "UKR"]),
    ("MOS", &["WAR", "UKR", "SEV", "STP"]),
    ("UKR", &["WAR", "MOS", "SEV", "GAL"]),
    ("SEV", &["MOS", "UKR"]),
    ("STP", &["MOS"]),
    ("BOH", &["MUN", "SIL", "TYR", "VIE"]),
    ("TYR", &["MUN", "BOH", "PIE", "VEN", "TRI", "VIE"]),
    ("PIE", &["MAR", "BUR", "TYR", "VEN", "TUS"]),
    ("VEN", &["PIE", "TYR", "TRI", "TUS", "ROM"]),
    ("TUS", &["PIE", "VEN", "ROM"]),
    ("ROM", &["TUS", "VEN", "NAP"]),
    ("NAP", &["ROM", "APU"]),
    ("APU", &["NAP", "ROM"]),
    ("TRI", &["TYR", "VEN", "VIE", "BUD", "SER"]),
    ("VIE", &["BOH", "TYR", "TRI", "BUD", "GAL"]),
    ("BUD", &["VIE", "TRI", "GAL", "SER", "RUM"]),
    ("GAL", &["SIL", "WAR", "UKR", "BOH", "VIE", "BUD", "RUM"]),
    ("SER", &["TRI", "BUD", "RUM", "BUL", "ALB", "GRE"]),
    ("RUM", &["BUD", "GAL", "UKR", "SEV", "SER", "BUL"]),
    ("BUL", &["SER", "RUM", "GRE", "CON"]),
    ("GRE", &["SER", "BUL", "ALB"]),
    ("ALB", &["SER", "GRE", "TRI"]),
    ("CON", &["BUL", "SMY", "ANK"]),
    ("SMY", &["CON", "ANK", "ARM", "SYR"]),
    ("ANK", &["CON", "SMY", "ARM"]),
    ("ARM", &["ANK", "SMY", "SEV", "SYR"]),
    ("SYR", &["SMY", "ARM"]),
];

fn adjacent(loc: &str) -> &'static [&'static str] {
    ADJACENCY
        .iter()
        .find(|(name, _)| *name == loc)
        .map(|(_, adj)| *adj)
        .unwrap_or(&[])
}

/// One parsed order, stripped of the unit-type prefix (`A`/`F`) which this
/// engine doesn't distinguish between army/fleet adjacency for.
#[derive(Clone, Debug, PartialEq)]
enum ParsedOrder {
    Hold,
    Move { to: String },
    SupportHold { unit: String },
    SupportMove { unit: String, to: String },
    Retreat { to: String },
    Disband,
    Waive,
}

fn parse_order(raw: &str) -> Result<(String, ParsedOrder), String> {
    let tokens: Vec<&str> = raw.split_whitespace().collect();
    if tokens.len() < 2 {
        return Err(format!("cannot parse order {raw:?}"));
    }
    let origin = tokens[1].to_string();
    match tokens.get(2).copied() {
        Some("H") => Ok((origin, ParsedOrder::Hold)),
        Some("D") => Ok((origin, ParsedOrder::Disband)),
        Some("-") => {
            let to = tokens.get(3).ok_or_else(|| format!("missing destination in {raw:?}"))?;
            Ok((origin, ParsedOrder::Move { to: to.to_string() }))
        }
        Some("R") => {
            let to = tokens.get(3).ok_or_else(|| format!("missing retreat destination in {raw:?}"))?;
            Ok((origin, ParsedOrder::Retreat { to: to.to_string() }))
        }
        Some("S") => {
            // "A WAR S A PRU" or "A WAR S A PRU - LVN"
            let unit = tokens.get(4).ok_or_else(|| format!("missing supported unit in {raw:?}"))?;
            if tokens.get(5) == Some(&"-") {
                let to = tokens.get(6).ok_or_else(|| format!("missing support destination in {raw:?}"))?;
                Ok((origin, ParsedOrder::SupportMove { unit: unit.to_string(), to: to.to_string() }))
            } else {
                Ok((origin, ParsedOrder::SupportHold { unit: unit.to_string() }))
            }
        }
        Some("C") => Err(format!("convoys are not supported by this engine: {raw:?}")),
        Some("B") => Err(format!("builds are not supported by this engine: {raw:?}")),
        None if tokens[0] == "WAIVE" => Ok((String::new(), ParsedOrder::Waive)),
        other => Err(format!("unrecognized order keyword {other:?} in {raw:?}")),
    }
}

#[derive(Clone, Debug)]
struct PendingRetreat {
    /// Province the unit is retreating from.
    from: String,
    /// Province it may not retreat into (where its attacker came from).
    forbidden: HashSet<String>,
}

#[derive(Clone, Debug)]
struct GameState {
    map_name: String,
    rules: RuleSet,
    phase: PhaseId,
    powers: Vec<PowerName>,
    controllers: HashMap<PowerName, Username>,
    units: HashMap<PowerName, Vec<String>>,
    centers: HashMap<PowerName, Vec<String>>,
    retreats: HashMap<PowerName, Vec<PendingRetreat>>,
    orders: HashMap<PowerName, Vec<Order>>,
}

impl GameState {
    fn location_owner(&self, loc: &str) -> Option<PowerName> {
        self.units
            .iter()
            .find(|(_, units)| units.iter().any(|u| unit_location(u) == loc))
            .map(|(power, _)| power.clone())
    }

    fn orderable_locations(&self, power: &PowerName) -> Vec<String> {
        self.units
            .get(power)
            .map(|units| units.iter().map(|u| unit_location(u).to_string()).collect())
            .unwrap_or_default()
    }
}

fn unit_location(unit: &str) -> &str {
    unit.split_whitespace().nth(1).unwrap_or(unit)
}

fn unit_type(unit: &str) -> &str {
    unit.split_whitespace().next().unwrap_or("A")
}

/// Default starting deployment: three units and three centers per power,
/// placed on non-overlapping provinces from the graph above. Deliberately
/// not historically accurate — this reference engine's purpose is to drive
/// coordination-core scenarios, not to model the 1901 starting position.
fn seed_units(powers: &[PowerName]) -> (HashMap<PowerName, Vec<String>>, HashMap<PowerName, Vec<String>>) {
    let seeds: &[&[&str]] = &[
        &["PAR", "BRE", "MAR"],
        &["MUN", "KIE", "BER"],
        &["VIE", "TRI", "BUD"],
        &["WAR", "MOS", "SEV"],
        &["ROM", "NAP", "VEN"],
        &["CON", "SMY", "ANK"],
        &["GAS", "PIC", "TUS"],
    ];
    let mut units = HashMap::new();
    let mut centers = HashMap::new();
    for (i, power) in powers.iter().enumerate() {
        let provinces = seeds[i % seeds.len()];
        units.insert(power.clone(), provinces.iter().map(|p| format!("A {p}")).collect());
        centers.insert(power.clone(), provinces.iter().map(|p| p.to_string()).collect());
    }
    (units, centers)
}

pub struct ReferenceEngine {
    games: Mutex<HashMap<GameId, GameState>>,
}

impl Default for ReferenceEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl ReferenceEngine {
    pub fn new() -> Self {
        Self {
            games: Mutex::new(HashMap::new()),
        }
    }

    fn with_game<R>(&self, game_id: &GameId, f: impl FnOnce(&mut GameState) -> Result<R, EngineError>) -> Result<R, EngineError> {
        let mut games = self.games.lock().expect("reference engine mutex poisoned");
        let game = games
            .get_mut(game_id)
            .ok_or_else(|| EngineError::UnknownMap(game_id.to_string()))?;
        f(game)
    }
}

impl Engine for ReferenceEngine {
    fn create_game(&self, game_id: &GameId, map_name: &str, rules: RuleSet, n_controls: usize) -> Result<(), EngineError> {
        let info = map::lookup(map_name).ok_or_else(|| EngineError::UnknownMap(map_name.to_string()))?;
        let _ = n_controls; // this engine always seats every power on the map
        let powers = info.powers.clone();
        let (units, centers) = seed_units(&powers);
        let game = GameState {
            map_name: map_name.to_string(),
            rules,
            phase: PhaseId::first(1901, false),
            powers,
            controllers: HashMap::new(),
            units,
            centers,
            retreats: HashMap::new(),
            orders: HashMap::new(),
        };
        self.games.lock().expect("reference engine mutex poisoned").insert(game_id.clone(), game);
        Ok(())
    }

    fn delete_game(&self, game_id: &GameId) -> Result<(), EngineError> {
        self.games.lock().expect("reference engine mutex poisoned").remove(game_id);
        Ok(())
    }

    fn join_game(&self, game_id: &GameId, username: &Username, power: Option<PowerName>) -> Result<PowerName, EngineError> {
        self.with_game(game_id, |game| {
            let power = match power {
                Some(p) => p,
                None => game
                    .powers
                    .iter()
                    .find(|p| !game.controllers.contains_key(*p))
                    .cloned()
                    .ok_or_else(|| EngineError::NotOrderable)?,
            };
            if !game.powers.contains(&power) {
                return Err(EngineError::UnknownPower(power));
            }
            if let Some(existing) = game.controllers.get(&power) {
                if existing != username {
                    return Err(EngineError::PowerAlreadyControlled(power));
                }
            }
            game.controllers.insert(power.clone(), username.clone());
            Ok(power)
        })
    }

    fn leave_game(&self, game_id: &GameId, username: &Username) -> Result<(), EngineError> {
        self.with_game(game_id, |game| {
            game.controllers.retain(|_, u| u != username);
            Ok(())
        })
    }

    fn powers(&self, game_id: &GameId) -> Result<Vec<PowerName>, EngineError> {
        self.with_game(game_id, |game| Ok(game.powers.clone()))
    }

    fn get_current_phase(&self, game_id: &GameId) -> Result<PhaseId, EngineError> {
        self.with_game(game_id, |game| Ok(game.phase))
    }

    fn get_orderable_locations(&self, game_id: &GameId) -> Result<HashMap<PowerName, Vec<String>>, EngineError> {
        self.with_game(game_id, |game| {
            if game.phase.kind == PhaseType::Retreats {
                return Ok(game
                    .retreats
                    .iter()
                    .map(|(power, pending)| (power.clone(), pending.iter().map(|r| r.from.clone()).collect()))
                    .collect());
            }
            Ok(game
                .powers
                .iter()
                .map(|power| (power.clone(), game.orderable_locations(power)))
                .collect())
        })
    }

    fn get_all_possible_orders(&self, game_id: &GameId) -> Result<HashMap<String, Vec<Order>>, EngineError> {
        self.with_game(game_id, |game| {
            let mut out = HashMap::new();
            match game.phase.kind {
                PhaseType::Movement => {
                    for units in game.units.values() {
                        for unit in units {
                            let loc = unit_location(unit);
                            let kind = unit_type(unit);
                            let mut orders = vec![Order::new(format!("{kind} {loc} H"))];
                            for dest in adjacent(loc) {
                                orders.push(Order::new(format!("{kind} {loc} - {dest}")));
                            }
                            out.insert(loc.to_string(), orders);
                        }
                    }
                }
                PhaseType::Retreats => {
                    for pending in game.retreats.values() {
                        for retreat in pending {
                            let kind = "A";
                            let mut orders = vec![Order::new(format!("{kind} {} D", retreat.from))];
                            for dest in adjacent(&retreat.from) {
                                if !retreat.forbidden.contains(*dest) && game.location_owner(dest).is_none() {
                                    orders.push(Order::new(format!("{kind} {} R {dest}", retreat.from)));
                                }
                            }
                            out.insert(retreat.from.clone(), orders);
                        }
                    }
                }
                PhaseType::Adjustments | PhaseType::Talk => {}
            }
            Ok(out)
        })
    }

    fn set_orders(&self, game_id: &GameId, power: &PowerName, orders: Vec<Order>) -> Result<Vec<Order>, Vec<OrderRejection>> {
        let possible = self.get_all_possible_orders(game_id).unwrap_or_default();
        let mut rejections = Vec::new();
        for order in &orders {
            let Ok((origin, _)) = parse_order(order.as_str()) else {
                rejections.push(OrderRejection::new(order.clone(), "could not parse order", Vec::new()));
                continue;
            };
            let legal = possible.get(&origin);
            let is_legal = legal.map(|opts| opts.contains(order)).unwrap_or(false);
            if !is_legal {
                let suggestions = legal.cloned().unwrap_or_default();
                rejections.push(OrderRejection::new(order.clone(), "not a legal order for this unit", suggestions));
            }
        }
        if !rejections.is_empty() {
            return Err(rejections);
        }
        let result = self.with_game(game_id, |game| {
            game.orders.insert(power.clone(), orders.clone());
            Ok(orders.clone())
        });
        result.map_err(|e| vec![OrderRejection::new(Order::new(""), e.to_string(), Vec::new())])
    }

    fn submit_retreat(&self, game_id: &GameId, power: &PowerName, order: Order) -> Result<(), EngineError> {
        self.with_game(game_id, |game| {
            if game.phase.kind != PhaseType::Retreats {
                return Err(EngineError::NotOrderable);
            }
            if !game.retreats.contains_key(power) {
                return Err(EngineError::NoPendingRetreat(power.clone()));
            }
            game.orders.entry(power.clone()).or_default().push(order);
            Ok(())
        })
    }

    fn process_phase(&self, game_id: &GameId) -> Result<ProcessOutcome, EngineError> {
        self.with_game(game_id, |game| process_one_phase(game))
    }

    fn get_units(&self, game_id: &GameId) -> Result<HashMap<PowerName, Vec<String>>, EngineError> {
        self.with_game(game_id, |game| Ok(game.units.clone()))
    }

    fn get_centers(&self, game_id: &GameId) -> Result<HashMap<PowerName, Vec<String>>, EngineError> {
        self.with_game(game_id, |game| Ok(game.centers.clone()))
    }

    fn get_retreats(&self, game_id: &GameId) -> Result<HashMap<PowerName, Vec<String>>, EngineError> {
        self.with_game(game_id, |game| {
            Ok(game
                .retreats
                .iter()
                .map(|(power, pending)| (power.clone(), pending.iter().map(|r| r.from.clone()).collect()))
                .collect())
        })
    }

    fn is_controlled_by(&self, game_id: &GameId, power: &PowerName, username: &Username) -> Result<bool, EngineError> {
        self.with_game(game_id, |game| Ok(game.controllers.get(power) == Some(username)))
    }

    fn to_json(&self, game_id: &GameId) -> Result<serde_json::Value, EngineError> {
        self.with_game(game_id, |game| {
            Ok(json!({
                "map_name": game.map_name,
                "phase": game.phase.abbrev(),
                "powers": game.powers,
                "units": game.units,
                "centers": game.centers,
            }))
        })
    }
}

fn process_one_phase(game: &mut GameState) -> Result<ProcessOutcome, EngineError> {
    let previous_phase = game.phase;
    let previous_state = snapshot(game, &game.orders.clone(), &json!({}));

    let dislodged = match game.phase.kind {
        PhaseType::Movement => resolve_movement(game),
        PhaseType::Retreats => {
            resolve_retreats(game);
            HashSet::new()
        }
        PhaseType::Adjustments => HashSet::new(),
        PhaseType::Talk => return Err(EngineError::NotOrderable),
    };

    let results = json!({ "dislodged": dislodged.iter().map(|p| p.as_str().to_string()).collect::<Vec<_>>() });
    let current_orders = game.orders.clone();
    game.orders.clear();

    game.phase = if game.phase.kind == PhaseType::Movement && !game.retreats.is_empty() {
        game.phase.next(Some(PhaseType::Retreats))
    } else {
        advance_skipping_talk(game.phase)
    };

    let current_state = snapshot(game, &current_orders, &results);
    Ok(ProcessOutcome {
        previous_phase_data: previous_state,
        current_phase_data: current_state,
        kicked_powers: Vec::new(),
    })
}

/// This engine's own calendar never rests on a Talk slot — negotiation is
/// owned entirely by the coordination core's talk-round controller, which
/// sits in front of this engine and only calls `process_phase` once it has
/// decided to move play past T. Skip it here unconditionally so `game.phase`
/// is always M, R or A, regardless of the `NO_TALK` rule flag.
fn advance_skipping_talk(phase: PhaseId) -> PhaseId {
    let mut next = phase.next(None);
    while next.kind == PhaseType::Talk {
        next = next.next(None);
    }
    next
}

fn snapshot(game: &GameState, orders: &HashMap<PowerName, Vec<Order>>, results: &serde_json::Value) -> GamePhaseData {
    GamePhaseData {
        phase: game.phase,
        state: json!({
            "units": game.units,
            "centers": game.centers,
            "retreats": game.retreats.iter().map(|(p, r)| (p.as_str().to_string(), r.iter().map(|x| x.from.clone()).collect::<Vec<_>>())).collect::<HashMap<_, _>>(),
        }),
        orders: orders.clone(),
        results: results.clone(),
        messages: Vec::new(),
    }
}

fn resolve_movement(game: &mut GameState) -> HashSet<PowerName> {
    let mut parsed: HashMap<PowerName, Vec<(String, ParsedOrder)>> = HashMap::new();
    for (power, orders) in &game.orders {
        let mut entries = Vec::new();
        for order in orders {
            if let Ok(parsed_order) = parse_order(order.as_str()) {
                entries.push(parsed_order);
            }
        }
        parsed.insert(power.clone(), entries);
    }

    // Default: any unit with no explicit order holds.
    for power in game.powers.clone() {
        let ordered_locs: HashSet<String> = parsed
            .get(&power)
            .map(|v| v.iter().map(|(loc, _)| loc.clone()).collect())
            .unwrap_or_default();
        for unit in game.units.get(&power).cloned().unwrap_or_default() {
            let loc = unit_location(&unit).to_string();
            if !ordered_locs.contains(&loc) {
                parsed.entry(power.clone()).or_default().push((loc, ParsedOrder::Hold));
            }
        }
    }

    // Flatten to (power, origin, order) for easy lookup.
    let mut flat: Vec<(PowerName, String, ParsedOrder)> = Vec::new();
    for (power, entries) in &parsed {
        for (loc, order) in entries {
            flat.push((power.clone(), loc.clone(), order.clone()));
        }
    }

    let support_strength = |target_origin: &str, target_is_move: Option<&str>| -> u32 {
        let mut strength = 1;
        for (_, _support_origin, order) in &flat {
            match (order, target_is_move) {
                (ParsedOrder::SupportHold { unit }, None) if unit == target_origin => strength += 1,
                (ParsedOrder::SupportMove { unit, to }, Some(dest)) if unit == target_origin && to == dest => strength += 1,
                _ => {}
            }
        }
        strength
    };

    let mut moves: HashMap<String, Vec<(PowerName, String)>> = HashMap::new();
    for (power, origin, order) in &flat {
        if let ParsedOrder::Move { to } = order {
            moves.entry(to.clone()).or_default().push((power.clone(), origin.clone()));
        }
    }

    let mut successful_moves: HashMap<String, (PowerName, String)> = HashMap::new();
    let mut dislodged_powers = HashSet::new();
    let vacated: HashSet<String> = flat
        .iter()
        .filter_map(|(_, origin, order)| matches!(order, ParsedOrder::Move { .. }).then(|| origin.clone()))
        .collect();

    for (dest, contenders) in &moves {
        let mut ranked: Vec<(u32, PowerName, String)> = contenders
            .iter()
            .map(|(power, origin)| (support_strength(origin, Some(dest.as_str())), power.clone(), origin.clone()))
            .collect();
        ranked.sort_by(|a, b| b.0.cmp(&a.0));

        let defender = game.location_owner(dest).filter(|_| !vacated.contains(dest));
        let defender_strength = defender.as_ref().map(|_| support_strength(dest, None));

        // The strongest mover wins only if its strength is strictly greater
        // than both the second-strongest mover (no ties) and the defender
        // holding the destination, if any.
        let winner = match ranked.first() {
            None => None,
            Some((top_strength, power, origin)) => {
                let unique = ranked.get(1).map(|(s, ..)| top_strength > s).unwrap_or(true);
                let beats_defender = defender_strength.map(|d| *top_strength > d).unwrap_or(true);
                if unique && beats_defender {
                    Some((power.clone(), origin.clone()))
                } else {
                    None
                }
            }
        };

        if let Some((power, origin)) = winner {
            successful_moves.insert(dest.clone(), (power.clone(), origin.clone()));
            if let Some(defender_power) = defender {
                if defender_power != power {
                    dislodged_powers.insert(defender_power.clone());
                    let attacker_origin: HashSet<String> = [origin.clone()].into_iter().collect();
                    game.retreats.entry(defender_power).or_default().push(PendingRetreat {
                        from: dest.clone(),
                        forbidden: attacker_origin,
                    });
                }
            }
        }
    }

    // Apply successful moves.
    for (dest, (power, origin)) in &successful_moves {
        if let Some(units) = game.units.get_mut(power) {
            for unit in units.iter_mut() {
                if unit_location(unit) == origin {
                    *unit = format!("{} {}", unit_type(unit), dest);
                }
            }
        }
    }

    dislodged_powers
}

fn resolve_retreats(game: &mut GameState) {
    let mut parsed: HashMap<PowerName, Vec<(String, ParsedOrder)>> = HashMap::new();
    for (power, orders) in &game.orders {
        let mut entries = Vec::new();
        for order in orders {
            if let Ok(parsed_order) = parse_order(order.as_str()) {
                entries.push(parsed_order);
            }
        }
        parsed.insert(power.clone(), entries);
    }

    for (power, pending) in game.retreats.clone() {
        for retreat in pending {
            let order = parsed
                .get(&power)
                .and_then(|entries| entries.iter().find(|(loc, _)| *loc == retreat.from))
                .map(|(_, order)| order.clone());
            match order {
                Some(ParsedOrder::Retreat { to }) if adjacent(&retreat.from).contains(&to.as_str()) && !retreat.forbidden.contains(&to) => {
                    game.units.entry(power.clone()).or_default().push(format!("A {to}"));
                }
                _ => {
                    // Disband: unit is simply not re-added.
                }
            }
        }
    }
    game.retreats.clear();
}

#[cfg(test)]
mod tests {
    use super::*;
    use diplomacy_protocol::RuleFlag;

    fn setup(no_talk: bool) -> (ReferenceEngine, GameId) {
        let engine = ReferenceEngine::new();
        let game_id = GameId::new("game_TEST");
        let mut rules = RuleSet::default();
        if no_talk {
            rules.set(RuleFlag::NoTalk);
        }
        engine.create_game(&game_id, "standard", rules, 7).unwrap();
        (engine, game_id)
    }

    #[test]
    fn unsupported_move_bounces_against_supported_defender() {
        let (engine, game_id) = setup(true);
        let powers = engine.powers(&game_id).unwrap();
        let attacker = powers[0].clone();
        let defender = powers[1].clone();

        // Attacker at PAR moves to MUN (defender's home); defender holds with
        // one support, attacker has none; attacker should bounce.
        let support_power = powers[2].clone();
        engine.set_orders(&game_id, &attacker, vec![Order::new("A PAR - MUN")]).unwrap();
        engine.set_orders(&game_id, &defender, vec![Order::new("A MUN H")]).unwrap();
        // third power's unit isn't adjacent enough to legally support in this
        // reduced graph, so we only assert the bounce, not the support path.
        let _ = support_power;

        let outcome = engine.process_phase(&game_id).unwrap();
        assert_eq!(outcome.current_phase_data.phase.kind, PhaseType::Retreats);
        let units = engine.get_units(&game_id).unwrap();
        assert!(units[&attacker].contains(&"A PAR".to_string()));
    }

    #[test]
    fn unopposed_move_succeeds() {
        let (engine, game_id) = setup(true);
        let powers = engine.powers(&game_id).unwrap();
        let power = powers[0].clone();
        engine.set_orders(&game_id, &power, vec![Order::new("A PAR - BUR")]).unwrap();
        engine.process_phase(&game_id).unwrap();
        let units = engine.get_units(&game_id).unwrap();
        assert!(units[&power].contains(&"A BUR".to_string()));
    }

    #[test]
    fn invalid_order_is_rejected_with_suggestions() {
        let (engine, game_id) = setup(true);
        let powers = engine.powers(&game_id).unwrap();
        let power = powers[0].clone();
        let err = engine
            .set_orders(&game_id, &power, vec![Order::new("A PAR - XYZ")])
            .unwrap_err();
        assert_eq!(err.len(), 1);
        assert!(!err[0].suggestions.is_empty());
    }
}
