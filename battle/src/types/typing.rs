//! Elemental types

use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
pub enum Type {
    Normal,
    Fire,
    Water,
    Electric,
    Grass,
    Ice,
    Fighting,
    Poison,
    Ground,
    Flying,
    Psychic,
    Bug,
    Rock,
    Ghost,
    Dragon,
    Dark,
    Steel,
    Fairy,
    /// Tera-only type that keeps the original typing
    Stellar,
}

impl Type {
    /// Parse a type name in any case (`Electric`, `electric`)
    pub fn from_protocol(s: &str) -> Option<Self> {
        let t = match s.trim().to_ascii_lowercase().as_str() {
            "normal" => Type::Normal,
            "fire" => Type::Fire,
            "water" => Type::Water,
            "electric" => Type::Electric,
            "grass" => Type::Grass,
            "ice" => Type::Ice,
            "fighting" => Type::Fighting,
            "poison" => Type::Poison,
            "ground" => Type::Ground,
            "flying" => Type::Flying,
            "psychic" => Type::Psychic,
            "bug" => Type::Bug,
            "rock" => Type::Rock,
            "ghost" => Type::Ghost,
            "dragon" => Type::Dragon,
            "dark" => Type::Dark,
            "steel" => Type::Steel,
            "fairy" => Type::Fairy,
            "stellar" => Type::Stellar,
            _ => return None,
        };
        Some(t)
    }

    /// Parse a `typechange` detail such as `Fire/Water`
    pub fn parse_list(s: &str) -> Vec<Type> {
        s.split('/').filter_map(Type::from_protocol).collect()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Type::Normal => "Normal",
            Type::Fire => "Fire",
            Type::Water => "Water",
            Type::Electric => "Electric",
            Type::Grass => "Grass",
            Type::Ice => "Ice",
            Type::Fighting => "Fighting",
            Type::Poison => "Poison",
            Type::Ground => "Ground",
            Type::Flying => "Flying",
            Type::Psychic => "Psychic",
            Type::Bug => "Bug",
            Type::Rock => "Rock",
            Type::Ghost => "Ghost",
            Type::Dragon => "Dragon",
            Type::Dark => "Dark",
            Type::Steel => "Steel",
            Type::Fairy => "Fairy",
            Type::Stellar => "Stellar",
        }
    }
}

impl std::fmt::Display for Type {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_parsing() {
        assert_eq!(Type::from_protocol("Fairy"), Some(Type::Fairy));
        assert_eq!(Type::from_protocol("stellar"), Some(Type::Stellar));
        assert_eq!(Type::from_protocol("???"), None);
        assert_eq!(Type::parse_list("Fire/Water"), vec![Type::Fire, Type::Water]);
    }
}
