//! The phase clock: a pure, total, deterministic calendar (component 4.D).
//!
//! A game's clock cycles through seven phase slots per year — three seasonal
//! sub-phases in spring and fall, one in winter — and the year rolls forward
//! after `WINTER ADJUSTMENTS`. Nothing here touches engine state; this module
//! only knows how to enumerate, compare and (de)serialize phase identifiers.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Season {
    Spring,
    Fall,
    Winter,
}

impl Season {
    fn letter(self) -> char {
        match self {
            Season::Spring => 'S',
            Season::Fall => 'F',
            Season::Winter => 'W',
        }
    }

    fn name(self) -> &'static str {
        match self {
            Season::Spring => "SPRING",
            Season::Fall => "FALL",
            Season::Winter => "WINTER",
        }
    }

    fn from_letter(c: char) -> Option<Self> {
        match c.to_ascii_uppercase() {
            'S' => Some(Season::Spring),
            'F' => Some(Season::Fall),
            'W' => Some(Season::Winter),
            _ => None,
        }
    }

    fn from_name(s: &str) -> Option<Self> {
        match s.to_ascii_uppercase().as_str() {
            "SPRING" => Some(Season::Spring),
            "FALL" => Some(Season::Fall),
            "WINTER" => Some(Season::Winter),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PhaseType {
    Talk,
    Movement,
    Retreats,
    Adjustments,
}

impl PhaseType {
    fn letter(self) -> char {
        match self {
            PhaseType::Talk => 'T',
            PhaseType::Movement => 'M',
            PhaseType::Retreats => 'R',
            PhaseType::Adjustments => 'A',
        }
    }

    fn name(self) -> &'static str {
        match self {
            PhaseType::Talk => "TALK",
            PhaseType::Movement => "MOVEMENT",
            PhaseType::Retreats => "RETREATS",
            PhaseType::Adjustments => "ADJUSTMENTS",
        }
    }

    fn from_letter(c: char) -> Option<Self> {
        match c.to_ascii_uppercase() {
            'T' => Some(PhaseType::Talk),
            'M' => Some(PhaseType::Movement),
            'R' => Some(PhaseType::Retreats),
            'A' => Some(PhaseType::Adjustments),
            _ => None,
        }
    }

    fn from_name(s: &str) -> Option<Self> {
        match s.to_ascii_uppercase().as_str() {
            "TALK" => Some(PhaseType::Talk),
            "MOVEMENT" => Some(PhaseType::Movement),
            "RETREATS" => Some(PhaseType::Retreats),
            "ADJUSTMENTS" => Some(PhaseType::Adjustments),
            _ => None,
        }
    }
}

/// The seven-slot template one year cycles through, in order.
const TEMPLATE: [(Season, PhaseType); 7] = [
    (Season::Spring, PhaseType::Talk),
    (Season::Spring, PhaseType::Movement),
    (Season::Spring, PhaseType::Retreats),
    (Season::Fall, PhaseType::Talk),
    (Season::Fall, PhaseType::Movement),
    (Season::Fall, PhaseType::Retreats),
    (Season::Winter, PhaseType::Adjustments),
];

/// A phase identifier: season + year + type, e.g. `SPRING 1901 TALK` / `S1901T`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PhaseId {
    pub season: Season,
    pub year: u16,
    pub kind: PhaseType,
}

/// Failure to parse a phase identifier string.
#[derive(Clone, Debug, thiserror::Error, PartialEq, Eq)]
#[error("not a valid phase identifier: {0:?}")]
pub struct PhaseParseError(pub String);

impl PhaseId {
    pub fn new(season: Season, year: u16, kind: PhaseType) -> Self {
        Self { season, year, kind }
    }

    /// The first phase of the first year, honoring a `NO_TALK` rule set
    /// (skip config lives in `crate::rules`; callers pass the flag so this
    /// module stays rule-set-agnostic).
    pub fn first(year: u16, start_with_talk: bool) -> Self {
        if start_with_talk {
            Self::new(Season::Spring, year, PhaseType::Talk)
        } else {
            Self::new(Season::Spring, year, PhaseType::Movement)
        }
    }

    fn template_index(self) -> usize {
        TEMPLATE
            .iter()
            .position(|&(s, k)| s == self.season && k == self.kind)
            .expect("season/kind pairs are always one of the seven template slots")
    }

    /// Short form, e.g. `"S1901T"`.
    pub fn abbrev(self) -> String {
        format!("{}{:04}{}", self.season.letter(), self.year, self.kind.letter())
    }

    /// Long form, e.g. `"SPRING 1901 TALK"`.
    pub fn long(self) -> String {
        format!("{} {:04} {}", self.season.name(), self.year, self.kind.name())
    }

    /// Case-insensitive parse of the short form.
    pub fn parse_abbrev(s: &str) -> Result<Self, PhaseParseError> {
        let err = || PhaseParseError(s.to_string());
        let mut chars = s.chars();
        let season = chars.next().and_then(Season::from_letter).ok_or_else(err)?;
        let rest: String = chars.collect();
        if rest.len() < 5 {
            return Err(err());
        }
        let (year_str, kind_str) = rest.split_at(rest.len() - 1);
        let year: u16 = year_str.parse().map_err(|_| err())?;
        let kind = kind_str.chars().next().and_then(PhaseType::from_letter).ok_or_else(err)?;
        if season == Season::Winter && kind != PhaseType::Adjustments {
            return Err(err());
        }
        Ok(Self::new(season, year, kind))
    }

    /// Case-insensitive parse of the long form (`"SEASON YEAR TYPE"`).
    pub fn parse_long(s: &str) -> Result<Self, PhaseParseError> {
        let err = || PhaseParseError(s.to_string());
        let mut parts = s.split_whitespace();
        let season = parts.next().and_then(Season::from_name).ok_or_else(err)?;
        let year: u16 = parts.next().and_then(|y| y.parse().ok()).ok_or_else(err)?;
        let kind = parts.next().and_then(PhaseType::from_name).ok_or_else(err)?;
        if parts.next().is_some() {
            return Err(err());
        }
        if season == Season::Winter && kind != PhaseType::Adjustments {
            return Err(err());
        }
        Ok(Self::new(season, year, kind))
    }

    /// Advance to the next phase, optionally skipping ahead to the next phase
    /// of a given type (e.g. `next(phase, Some(PhaseType::Movement))` jumps
    /// past any intervening talk/retreats/adjustments slots).
    pub fn next(self, type_filter: Option<PhaseType>) -> Self {
        let mut cur = self.step_once();
        while let Some(wanted) = type_filter {
            if cur.kind == wanted {
                break;
            }
            cur = cur.step_once();
        }
        cur
    }

    /// Symmetric to `next`.
    pub fn previous(self, type_filter: Option<PhaseType>) -> Self {
        let mut cur = self.step_back_once();
        while let Some(wanted) = type_filter {
            if cur.kind == wanted {
                break;
            }
            cur = cur.step_back_once();
        }
        cur
    }

    fn step_once(self) -> Self {
        let idx = self.template_index();
        if idx + 1 == TEMPLATE.len() {
            let (season, kind) = TEMPLATE[0];
            Self::new(season, self.year + 1, kind)
        } else {
            let (season, kind) = TEMPLATE[idx + 1];
            Self::new(season, self.year, kind)
        }
    }

    fn step_back_once(self) -> Self {
        let idx = self.template_index();
        if idx == 0 {
            let (season, kind) = TEMPLATE[TEMPLATE.len() - 1];
            Self::new(season, self.year.saturating_sub(1), kind)
        } else {
            let (season, kind) = TEMPLATE[idx - 1];
            Self::new(season, self.year, kind)
        }
    }

    /// Total order: by year, then by position of the type within the season's
    /// sub-sequence (per spec, `T < M < R`, and Winter has only `A`).
    pub fn compare(self, other: Self) -> Ordering {
        (self.year, self.template_index()).cmp(&(other.year, other.template_index()))
    }
}

impl fmt::Display for PhaseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.abbrev())
    }
}

impl FromStr for PhaseId {
    type Err = PhaseParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_abbrev(s)
    }
}

impl PartialOrd for PhaseId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.compare(*other))
    }
}

impl Ord for PhaseId {
    fn cmp(&self, other: &Self) -> Ordering {
        self.compare(*other)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn abbrev_long_round_trip() {
        let p = PhaseId::new(Season::Spring, 1901, PhaseType::Talk);
        assert_eq!(p.abbrev(), "S1901T");
        assert_eq!(p.long(), "SPRING 1901 TALK");
        assert_eq!(PhaseId::parse_abbrev("s1901t").unwrap(), p);
        assert_eq!(PhaseId::parse_abbrev(&p.abbrev()).unwrap(), p);
        assert_eq!(PhaseId::parse_long(&p.long()).unwrap(), p);
    }

    #[test]
    fn winter_only_has_adjustments() {
        assert!(PhaseId::parse_abbrev("W1901M").is_err());
        assert!(PhaseId::parse_abbrev("W1901A").is_ok());
    }

    #[test]
    fn next_cycles_the_template_and_rolls_the_year() {
        let mut p = PhaseId::new(Season::Spring, 1901, PhaseType::Talk);
        let expect = [
            "S1901M", "S1901R", "F1901T", "F1901M", "F1901R", "W1901A", "S1902T",
        ];
        for e in expect {
            p = p.next(None);
            assert_eq!(p.abbrev(), e);
        }
    }

    #[test]
    fn next_with_type_filter_skips_ahead() {
        let p = PhaseId::new(Season::Spring, 1901, PhaseType::Movement);
        assert_eq!(p.next(Some(PhaseType::Movement)).abbrev(), "F1901M");
    }

    #[test]
    fn previous_is_symmetric_with_next() {
        let p = PhaseId::new(Season::Fall, 1901, PhaseType::Retreats);
        assert_eq!(p.next(None).previous(None), p);
        assert_eq!(p.previous(None).next(None), p);
    }

    #[test]
    fn compare_is_a_total_order_and_anti_symmetric() {
        let a = PhaseId::new(Season::Spring, 1901, PhaseType::Talk);
        let b = PhaseId::new(Season::Spring, 1901, PhaseType::Movement);
        let c = PhaseId::new(Season::Fall, 1901, PhaseType::Talk);
        assert_eq!(a.compare(b), Ordering::Less);
        assert_eq!(b.compare(a), Ordering::Greater);
        assert_eq!(a.compare(c), Ordering::Less);
        assert_eq!(a.compare(a), Ordering::Equal);
        assert_eq!(a.compare(b), a.compare(b));
        assert_eq!(b.compare(a), std::cmp::Reverse(a.compare(b)).0);
    }
}
