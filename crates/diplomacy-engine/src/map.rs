//! Map metadata: the handful of facts the lobby coordinator (component G)
//! needs about a map without touching adjudication — name and power list.

use diplomacy_protocol::PowerName;
use std::collections::HashMap;
use std::sync::OnceLock;

#[derive(Clone, Debug)]
pub struct MapInfo {
    pub name: &'static str,
    pub powers: Vec<PowerName>,
}

impl MapInfo {
    pub fn n_powers(&self) -> usize {
        self.powers.len()
    }
}

fn standard() -> MapInfo {
    MapInfo {
        name: "standard",
        powers: ["AUSTRIA", "ENGLAND", "FRANCE", "GERMANY", "ITALY", "RUSSIA", "TURKEY"]
            .into_iter()
            .map(PowerName::new)
            .collect(),
    }
}

fn ancmed() -> MapInfo {
    MapInfo {
        name: "ancmed",
        powers: ["ROME", "CARTHAGE", "EGYPT", "PERSIA"]
            .into_iter()
            .map(PowerName::new)
            .collect(),
    }
}

fn registry() -> &'static HashMap<&'static str, MapInfo> {
    static REGISTRY: OnceLock<HashMap<&'static str, MapInfo>> = OnceLock::new();
    REGISTRY.get_or_init(|| {
        let mut m = HashMap::new();
        for info in [standard(), ancmed()] {
            m.insert(info.name, info);
        }
        m
    })
}

/// Look up a map by name, case-sensitive (map names are canonical identifiers,
/// not user display text).
pub fn lookup(name: &str) -> Option<&'static MapInfo> {
    registry().get(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_map_has_seven_powers() {
        let info = lookup("standard").unwrap();
        assert_eq!(info.n_powers(), 7);
        assert!(info.powers.contains(&PowerName::new("FRANCE")));
    }

    #[test]
    fn unknown_map_is_none() {
        assert!(lookup("nonexistent").is_none());
    }
}
