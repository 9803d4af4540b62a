//! Shared payload types for battle protocol messages

use crate::ParseError;

/// Player in a battle (p1, p2, p3, p4)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Player {
    P1,
    P2,
    P3,
    P4,
}

impl Player {
    pub fn parse(s: &str) -> Option<Self> {
        match s.get(..2)? {
            "p1" => Some(Player::P1),
            "p2" => Some(Player::P2),
            "p3" => Some(Player::P3),
            "p4" => Some(Player::P4),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Player::P1 => "p1",
            Player::P2 => "p2",
            Player::P3 => "p3",
            Player::P4 => "p4",
        }
    }

    /// The player sitting across the field in a two-player battle.
    pub fn foe(&self) -> Player {
        match self {
            Player::P1 => Player::P2,
            Player::P2 => Player::P1,
            Player::P3 => Player::P4,
            Player::P4 => Player::P3,
        }
    }
}

impl std::fmt::Display for Player {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A creature identifier of the shape `p2a: Tapu Koko` or `p2: Tapu Koko`.
///
/// The slot letter is only present while the creature is on the field and is not part
/// of its identity; see [`Ident::key`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Ident {
    pub player: Player,
    /// Active slot letter (`a`, `b`, `c`), absent for bench references
    pub slot: Option<char>,
    /// Nickname as shown by the server
    pub name: String,
}

impl Ident {
    pub fn new(player: Player, name: impl Into<String>) -> Self {
        Self {
            player,
            slot: None,
            name: name.into(),
        }
    }

    /// Parse an identifier like `p1a: Pikachu` or `p1: Pikachu`
    pub fn parse(s: &str) -> Option<Self> {
        let (position, name) = s.split_once(": ")?;
        let player = Player::parse(position)?;

        let slot = match position.len() {
            2 => None,
            3 => position.chars().nth(2).filter(|c| c.is_ascii_lowercase()),
            _ => return None,
        };
        if position.len() == 3 && slot.is_none() {
            return None;
        }

        let name = name.trim();
        if name.is_empty() {
            return None;
        }

        Some(Ident {
            player,
            slot,
            name: name.to_string(),
        })
    }

    /// Zero-based active slot index, if the identifier carries a slot letter
    pub fn slot_index(&self) -> Option<usize> {
        self.slot.map(|c| (c as u8).saturating_sub(b'a') as usize)
    }

    /// Slot-free key used to identify a creature for the whole battle, e.g. `p2: tapukoko`.
    ///
    /// Names are normalised to their lowercase alphanumeric form so that `Tapu Koko` and
    /// `tapukoko` refer to the same creature.
    pub fn key(&self) -> String {
        format!("{}: {}", self.player.as_str(), to_id(&self.name))
    }
}

impl std::fmt::Display for Ident {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.slot {
            Some(slot) => write!(f, "{}{}: {}", self.player, slot, self.name),
            None => write!(f, "{}: {}", self.player, self.name),
        }
    }
}

/// Showdown ID form of a name: lowercase ASCII letters and digits only.
pub fn to_id(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// Details string (species, level, gender, shiny, tera)
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Details {
    pub species: String,
    pub level: Option<u8>,
    pub gender: Option<char>,
    pub shiny: bool,
    pub tera_type: Option<String>,
}

impl Details {
    /// Parse a details string like `Pikachu, L50, M, shiny` or `Arceus-*`
    pub fn parse(s: &str) -> Self {
        let mut details = Details::default();
        let mut fields = s.split(',').map(str::trim);

        if let Some(species) = fields.next() {
            details.species = species.to_string();
        }

        for field in fields {
            if let Some(level) = field.strip_prefix('L') {
                details.level = level.parse().ok();
            } else if field == "M" || field == "F" {
                details.gender = field.chars().next();
            } else if field == "shiny" {
                details.shiny = true;
            } else if let Some(tera) = field.strip_prefix("tera:") {
                details.tera_type = Some(tera.to_string());
            }
        }

        details
    }

    /// Team preview hides some formes behind a wildcard (`Arceus-*`, `Urshifu-*`)
    pub fn is_wildcard(&self) -> bool {
        self.species.ends_with("-*")
    }

    /// Species with any wildcard forme suffix removed
    pub fn base_species(&self) -> &str {
        self.species.strip_suffix("-*").unwrap_or(&self.species)
    }
}

/// HP and status condition (e.g., `100/100`, `50/100 slp`, `0 fnt`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HpStatus {
    /// Current HP (exact for our side, out of 100 for the opponent)
    pub current: u32,
    /// Max HP (absent for `0 fnt`)
    pub max: Option<u32>,
    /// Status condition (slp, par, brn, psn, tox, frz, fnt)
    pub status: Option<String>,
}

impl HpStatus {
    pub fn parse(s: &str) -> Option<Self> {
        let mut fields = s.split_whitespace();
        let hp = fields.next()?;
        let status = fields.next().map(str::to_string);

        let (current, max) = match hp.split_once('/') {
            Some((current, max)) => (current.parse().ok()?, Some(max.parse().ok()?)),
            None => (hp.parse().ok()?, None),
        };

        Some(HpStatus {
            current,
            max,
            status,
        })
    }

    pub fn is_fainted(&self) -> bool {
        self.status.as_deref() == Some("fnt")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GameType {
    Singles,
    Doubles,
    Triples,
    Multi,
    FreeForAll,
}

impl GameType {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "singles" => Some(GameType::Singles),
            "doubles" => Some(GameType::Doubles),
            "triples" => Some(GameType::Triples),
            "multi" => Some(GameType::Multi),
            "freeforall" => Some(GameType::FreeForAll),
            _ => None,
        }
    }

    /// Number of active slots per side
    pub fn active_slots(&self) -> usize {
        match self {
            GameType::Singles | GameType::FreeForAll => 1,
            GameType::Doubles | GameType::Multi => 2,
            GameType::Triples => 3,
        }
    }
}

/// Boostable stat
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stat {
    Atk,
    Def,
    Spa,
    Spd,
    Spe,
    Accuracy,
    Evasion,
}

impl Stat {
    pub const ALL: [Stat; 7] = [
        Stat::Atk,
        Stat::Def,
        Stat::Spa,
        Stat::Spd,
        Stat::Spe,
        Stat::Accuracy,
        Stat::Evasion,
    ];

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "atk" => Some(Stat::Atk),
            "def" => Some(Stat::Def),
            "spa" => Some(Stat::Spa),
            "spd" => Some(Stat::Spd),
            "spe" => Some(Stat::Spe),
            "accuracy" => Some(Stat::Accuracy),
            "evasion" => Some(Stat::Evasion),
            _ => None,
        }
    }
}

/// Side reference in side-condition messages (`p1: Alice`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Side {
    pub player: Player,
    pub raw: String,
}

impl Side {
    pub fn parse(s: &str) -> Option<Self> {
        Some(Side {
            player: Player::parse(s)?,
            raw: s.to_string(),
        })
    }
}

pub(crate) fn parse_ident(parts: &[&str], index: usize) -> Result<Ident, anyhow::Error> {
    let raw = parts
        .get(index)
        .ok_or_else(|| ParseError::MissingField("pokemon".to_string()))?;
    Ident::parse(raw)
        .ok_or_else(|| ParseError::InvalidFormat(format!("bad identifier {raw:?}")).into())
}

pub(crate) fn parse_details(parts: &[&str], index: usize) -> Details {
    parts
        .get(index)
        .map(|s| Details::parse(s))
        .unwrap_or_default()
}

pub(crate) fn parse_hp_status(parts: &[&str], index: usize) -> Option<HpStatus> {
    parts.get(index).and_then(|s| HpStatus::parse(s))
}

/// Value of a `[name] value` tag anywhere in the trailing fields
pub(crate) fn tag<'a>(parts: &[&'a str], name: &str) -> Option<&'a str> {
    parts
        .iter()
        .copied()
        .find_map(|p: &'a str| p.strip_prefix(name).map(|rest| rest.trim_start()))
}

/// Whether a bare `[flag]` tag is present
pub(crate) fn flag(parts: &[&str], name: &str) -> bool {
    parts.iter().any(|p| *p == name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ident_with_slot() {
        let ident = Ident::parse("p2a: Tapu Koko").unwrap();
        assert_eq!(ident.player, Player::P2);
        assert_eq!(ident.slot, Some('a'));
        assert_eq!(ident.slot_index(), Some(0));
        assert_eq!(ident.name, "Tapu Koko");
        assert_eq!(ident.key(), "p2: tapukoko");
    }

    #[test]
    fn test_ident_without_slot() {
        let ident = Ident::parse("p1: hydreigon").unwrap();
        assert_eq!(ident.slot, None);
        assert_eq!(ident.key(), "p1: hydreigon");
    }

    #[test]
    fn test_ident_rejects_garbage() {
        assert!(Ident::parse("hydreigon").is_none());
        assert!(Ident::parse("p9: hydreigon").is_none());
        assert!(Ident::parse("p1: ").is_none());
        assert!(Ident::parse("p1a1: x").is_none());
    }

    #[test]
    fn test_details_parse() {
        let details = Details::parse("Hydreigon, L50, F, shiny, tera:Dark");
        assert_eq!(details.species, "Hydreigon");
        assert_eq!(details.level, Some(50));
        assert_eq!(details.gender, Some('F'));
        assert!(details.shiny);
        assert_eq!(details.tera_type.as_deref(), Some("Dark"));
    }

    #[test]
    fn test_details_wildcard() {
        let details = Details::parse("Arceus-*");
        assert!(details.is_wildcard());
        assert_eq!(details.base_species(), "Arceus");
    }

    #[test]
    fn test_hp_status_parse() {
        let hp = HpStatus::parse("50/100 slp").unwrap();
        assert_eq!(hp.current, 50);
        assert_eq!(hp.max, Some(100));
        assert_eq!(hp.status.as_deref(), Some("slp"));

        let fainted = HpStatus::parse("0 fnt").unwrap();
        assert!(fainted.is_fainted());
        assert_eq!(fainted.max, None);
    }

    #[test]
    fn test_tags() {
        let parts = ["", "move", "p1a: X", "Tackle", "", "[from]Metronome", "[still]"];
        assert_eq!(tag(&parts, "[from]"), Some("Metronome"));
        assert!(flag(&parts, "[still]"));
        assert!(!flag(&parts, "[miss]"));

        let spaced = ["", "-damage", "p1a: X", "50/100", "[from] item: Life Orb"];
        assert_eq!(tag(&spaced, "[from]"), Some("item: Life Orb"));
    }
}
