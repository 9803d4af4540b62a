//! Weather, field and side conditions

use pokestate_protocol::to_id;

/// Strip the effect prefix the server puts in front of condition names
pub(crate) fn condition_id(s: &str) -> String {
    let clean = s
        .strip_prefix("move: ")
        .or_else(|| s.strip_prefix("ability: "))
        .unwrap_or(s);
    to_id(clean)
}

/// Weather, named after the protocol's effect names
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Weather {
    SunnyDay,
    RainDance,
    Sandstorm,
    Hail,
    Snow,
    DesolateLand,
    PrimordialSea,
    DeltaStream,
    /// A weather this build does not know, kept by name
    Unknown(String),
}

impl Weather {
    /// `None` for the `none` sentinel that clears the weather
    pub fn from_protocol(s: &str) -> Option<Self> {
        let weather = match condition_id(s).as_str() {
            "none" | "" => return None,
            "sunnyday" => Weather::SunnyDay,
            "raindance" => Weather::RainDance,
            "sandstorm" => Weather::Sandstorm,
            "hail" => Weather::Hail,
            "snow" | "snowscape" => Weather::Snow,
            "desolateland" => Weather::DesolateLand,
            "primordialsea" => Weather::PrimordialSea,
            "deltastream" => Weather::DeltaStream,
            _ => Weather::Unknown(s.to_string()),
        };
        Some(weather)
    }

    pub fn is_primal(&self) -> bool {
        matches!(
            self,
            Weather::DesolateLand | Weather::PrimordialSea | Weather::DeltaStream
        )
    }

    pub fn as_str(&self) -> &str {
        match self {
            Weather::SunnyDay => "SunnyDay",
            Weather::RainDance => "RainDance",
            Weather::Sandstorm => "Sandstorm",
            Weather::Hail => "Hail",
            Weather::Snow => "Snow",
            Weather::DesolateLand => "DesolateLand",
            Weather::PrimordialSea => "PrimordialSea",
            Weather::DeltaStream => "DeltaStream",
            Weather::Unknown(name) => name,
        }
    }
}

impl std::fmt::Display for Weather {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Battle-wide field effects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Field {
    ElectricTerrain,
    GrassyTerrain,
    MistyTerrain,
    PsychicTerrain,
    TrickRoom,
    MagicRoom,
    WonderRoom,
    Gravity,
    MudSport,
    WaterSport,
    IonDeluge,
    FairyLock,
}

impl Field {
    pub fn from_protocol(s: &str) -> Option<Self> {
        match condition_id(s).as_str() {
            "electricterrain" => Some(Field::ElectricTerrain),
            "grassyterrain" => Some(Field::GrassyTerrain),
            "mistyterrain" => Some(Field::MistyTerrain),
            "psychicterrain" => Some(Field::PsychicTerrain),
            "trickroom" => Some(Field::TrickRoom),
            "magicroom" => Some(Field::MagicRoom),
            "wonderroom" => Some(Field::WonderRoom),
            "gravity" => Some(Field::Gravity),
            "mudsport" => Some(Field::MudSport),
            "watersport" => Some(Field::WaterSport),
            "iondeluge" => Some(Field::IonDeluge),
            "fairylock" => Some(Field::FairyLock),
            _ => None,
        }
    }

    /// At most one terrain is up at a time
    pub fn is_terrain(&self) -> bool {
        matches!(
            self,
            Field::ElectricTerrain
                | Field::GrassyTerrain
                | Field::MistyTerrain
                | Field::PsychicTerrain
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Field::ElectricTerrain => "Electric Terrain",
            Field::GrassyTerrain => "Grassy Terrain",
            Field::MistyTerrain => "Misty Terrain",
            Field::PsychicTerrain => "Psychic Terrain",
            Field::TrickRoom => "Trick Room",
            Field::MagicRoom => "Magic Room",
            Field::WonderRoom => "Wonder Room",
            Field::Gravity => "Gravity",
            Field::MudSport => "Mud Sport",
            Field::WaterSport => "Water Sport",
            Field::IonDeluge => "Ion Deluge",
            Field::FairyLock => "Fairy Lock",
        }
    }
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Conditions attached to one side of the field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SideCondition {
    Reflect,
    LightScreen,
    AuroraVeil,
    Spikes,
    ToxicSpikes,
    StealthRock,
    StickyWeb,
    Steelsurge,
    Tailwind,
    Safeguard,
    Mist,
    LuckyChant,
    WideGuard,
    QuickGuard,
    CraftyShield,
    MatBlock,
    Wildfire,
    Volcalith,
    VineLash,
    Cannonade,
    FirePledge,
    GrassPledge,
    WaterPledge,
}

impl SideCondition {
    pub fn from_protocol(s: &str) -> Option<Self> {
        match condition_id(s).as_str() {
            "reflect" => Some(SideCondition::Reflect),
            "lightscreen" => Some(SideCondition::LightScreen),
            "auroraveil" => Some(SideCondition::AuroraVeil),
            "spikes" => Some(SideCondition::Spikes),
            "toxicspikes" => Some(SideCondition::ToxicSpikes),
            "stealthrock" => Some(SideCondition::StealthRock),
            "stickyweb" => Some(SideCondition::StickyWeb),
            "gmaxsteelsurge" | "steelsurge" => Some(SideCondition::Steelsurge),
            "tailwind" => Some(SideCondition::Tailwind),
            "safeguard" => Some(SideCondition::Safeguard),
            "mist" => Some(SideCondition::Mist),
            "luckychant" => Some(SideCondition::LuckyChant),
            "wideguard" => Some(SideCondition::WideGuard),
            "quickguard" => Some(SideCondition::QuickGuard),
            "craftyshield" => Some(SideCondition::CraftyShield),
            "matblock" => Some(SideCondition::MatBlock),
            "gmaxwildfire" => Some(SideCondition::Wildfire),
            "gmaxvolcalith" => Some(SideCondition::Volcalith),
            "gmaxvinelash" => Some(SideCondition::VineLash),
            "gmaxcannonade" => Some(SideCondition::Cannonade),
            "firepledge" => Some(SideCondition::FirePledge),
            "grasspledge" => Some(SideCondition::GrassPledge),
            "waterpledge" => Some(SideCondition::WaterPledge),
            _ => None,
        }
    }

    pub fn max_layers(&self) -> u8 {
        match self {
            SideCondition::Spikes => 3,
            SideCondition::ToxicSpikes => 2,
            _ => 1,
        }
    }

    pub fn is_hazard(&self) -> bool {
        matches!(
            self,
            SideCondition::Spikes
                | SideCondition::ToxicSpikes
                | SideCondition::StealthRock
                | SideCondition::StickyWeb
                | SideCondition::Steelsurge
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SideCondition::Reflect => "Reflect",
            SideCondition::LightScreen => "Light Screen",
            SideCondition::AuroraVeil => "Aurora Veil",
            SideCondition::Spikes => "Spikes",
            SideCondition::ToxicSpikes => "Toxic Spikes",
            SideCondition::StealthRock => "Stealth Rock",
            SideCondition::StickyWeb => "Sticky Web",
            SideCondition::Steelsurge => "G-Max Steelsurge",
            SideCondition::Tailwind => "Tailwind",
            SideCondition::Safeguard => "Safeguard",
            SideCondition::Mist => "Mist",
            SideCondition::LuckyChant => "Lucky Chant",
            SideCondition::WideGuard => "Wide Guard",
            SideCondition::QuickGuard => "Quick Guard",
            SideCondition::CraftyShield => "Crafty Shield",
            SideCondition::MatBlock => "Mat Block",
            SideCondition::Wildfire => "G-Max Wildfire",
            SideCondition::Volcalith => "G-Max Volcalith",
            SideCondition::VineLash => "G-Max Vine Lash",
            SideCondition::Cannonade => "G-Max Cannonade",
            SideCondition::FirePledge => "Fire Pledge",
            SideCondition::GrassPledge => "Grass Pledge",
            SideCondition::WaterPledge => "Water Pledge",
        }
    }
}

impl std::fmt::Display for SideCondition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weather_from_protocol() {
        assert_eq!(Weather::from_protocol("DesolateLand"), Some(Weather::DesolateLand));
        assert_eq!(Weather::from_protocol("RainDance"), Some(Weather::RainDance));
        assert_eq!(Weather::from_protocol("none"), None);
        assert_eq!(
            Weather::from_protocol("AcidRain"),
            Some(Weather::Unknown("AcidRain".to_string()))
        );
        assert!(Weather::DeltaStream.is_primal());
        assert!(!Weather::Hail.is_primal());
    }

    #[test]
    fn test_field_from_protocol() {
        assert_eq!(Field::from_protocol("move: Trick Room"), Some(Field::TrickRoom));
        assert_eq!(
            Field::from_protocol("Electric Terrain"),
            Some(Field::ElectricTerrain)
        );
        assert_eq!(Field::from_protocol("Mirror Room"), None);
        assert!(Field::PsychicTerrain.is_terrain());
        assert!(!Field::Gravity.is_terrain());
    }

    #[test]
    fn test_side_condition_from_protocol() {
        assert_eq!(
            SideCondition::from_protocol("move: Stealth Rock"),
            Some(SideCondition::StealthRock)
        );
        assert_eq!(
            SideCondition::from_protocol("G-Max Steelsurge"),
            Some(SideCondition::Steelsurge)
        );
        assert_eq!(
            SideCondition::from_protocol("move: G-Max Volcalith"),
            Some(SideCondition::Volcalith)
        );
        assert_eq!(
            SideCondition::from_protocol("Fire Pledge"),
            Some(SideCondition::FirePledge)
        );
        assert!(!SideCondition::Wildfire.is_hazard());
        assert_eq!(SideCondition::from_protocol("Sea of Fire"), None);
        assert_eq!(SideCondition::Spikes.max_layers(), 3);
        assert_eq!(SideCondition::ToxicSpikes.max_layers(), 2);
        assert_eq!(SideCondition::Reflect.max_layers(), 1);
    }
}
