//! Major status and volatile effects

use pokestate_protocol::to_id;

/// Major status. `Fainted` is terminal until an authoritative HP update revives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
    Burn,
    Freeze,
    Paralysis,
    Poison,
    Toxic,
    Sleep,
    Fainted,
}

impl Status {
    /// Parse the short protocol form (`brn`, `tox`, `fnt`, ...)
    pub fn from_protocol(s: &str) -> Option<Self> {
        match s {
            "brn" => Some(Status::Burn),
            "frz" => Some(Status::Freeze),
            "par" => Some(Status::Paralysis),
            "psn" => Some(Status::Poison),
            "tox" => Some(Status::Toxic),
            "slp" => Some(Status::Sleep),
            "fnt" => Some(Status::Fainted),
            _ => None,
        }
    }

    pub fn to_protocol(&self) -> &'static str {
        match self {
            Status::Burn => "brn",
            Status::Freeze => "frz",
            Status::Paralysis => "par",
            Status::Poison => "psn",
            Status::Toxic => "tox",
            Status::Sleep => "slp",
            Status::Fainted => "fnt",
        }
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.to_protocol())
    }
}

/// Effects that end when the holder leaves the field
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Volatile {
    Confusion,
    Taunt,
    Encore,
    Disable,
    Torment,
    Attract,
    Trapped,
    PartialTrap,
    LeechSeed,
    Curse,
    PerishSong,
    Substitute,
    FocusEnergy,
    Yawn,
    Protect,
    Endure,
    Flinch,
    Roost,
    HelpingHand,
    CenterOfAttention,
    MagicCoat,
    Recharging,
    Charging,
    LockedMove,
    Transformed,
    TypeChange,
    Dynamaxed,
    SlowStart,
    FlashFire,
    Unburden,
    Stockpile,
    SaltCure,
    Other(String),
}

impl Volatile {
    /// Map a `-start`/`-end` effect name, keeping anything unrecognised as `Other`
    pub fn from_protocol(s: &str) -> Self {
        let clean = s
            .strip_prefix("move: ")
            .or_else(|| s.strip_prefix("ability: "))
            .or_else(|| s.strip_prefix("item: "))
            .unwrap_or(s);

        match to_id(clean).as_str() {
            "confusion" | "confused" => Volatile::Confusion,
            "taunt" => Volatile::Taunt,
            "encore" => Volatile::Encore,
            "disable" => Volatile::Disable,
            "torment" => Volatile::Torment,
            "attract" => Volatile::Attract,
            "trapped" | "meanlook" | "block" | "spiderweb" => Volatile::Trapped,
            "partiallytrapped" | "bind" | "wrap" | "firespin" | "whirlpool" | "sandtomb"
            | "infestation" | "magmastorm" => Volatile::PartialTrap,
            "leechseed" => Volatile::LeechSeed,
            "curse" => Volatile::Curse,
            "perish0" | "perish1" | "perish2" | "perish3" | "perishsong" => Volatile::PerishSong,
            "substitute" => Volatile::Substitute,
            "focusenergy" => Volatile::FocusEnergy,
            "yawn" => Volatile::Yawn,
            "protect" | "detect" | "kingsshield" | "spikyshield" | "banefulbunker"
            | "obstruct" | "silktrap" | "burningbulwark" | "maxguard" => Volatile::Protect,
            "endure" => Volatile::Endure,
            "flinch" => Volatile::Flinch,
            "roost" => Volatile::Roost,
            "helpinghand" => Volatile::HelpingHand,
            "followme" | "ragepowder" | "spotlight" => Volatile::CenterOfAttention,
            "magiccoat" => Volatile::MagicCoat,
            "mustrecharge" | "recharge" => Volatile::Recharging,
            "lockedmove" | "outrage" | "thrash" | "petaldance" => Volatile::LockedMove,
            "transform" => Volatile::Transformed,
            "typechange" => Volatile::TypeChange,
            "dynamax" => Volatile::Dynamaxed,
            "slowstart" => Volatile::SlowStart,
            "flashfire" => Volatile::FlashFire,
            "unburden" => Volatile::Unburden,
            "stockpile" | "stockpile1" | "stockpile2" | "stockpile3" => Volatile::Stockpile,
            "saltcure" => Volatile::SaltCure,
            _ => Volatile::Other(clean.to_string()),
        }
    }

    /// Effects that only last until the end of the turn they started in
    pub fn is_single_turn(&self) -> bool {
        matches!(
            self,
            Volatile::Protect
                | Volatile::Endure
                | Volatile::Flinch
                | Volatile::Roost
                | Volatile::HelpingHand
                | Volatile::CenterOfAttention
                | Volatile::MagicCoat
        )
    }
}
