//! Turning identifier strings into canonical creatures

use pokestate_protocol::{Details, Ident, to_id};

use super::battle::{CreatureRef, TrackedBattle};
use crate::error::{BattleError, Inconsistency, Result};
use crate::types::Creature;

#[derive(Debug, Clone, Copy, Default)]
pub struct ResolveOptions<'a> {
    /// File the creature under our team whatever the identifier says
    pub force_self_team: bool,
    pub details: Option<&'a Details>,
}

impl<'a> ResolveOptions<'a> {
    pub fn with_details(details: &'a Details) -> Self {
        Self {
            force_self_team: false,
            details: Some(details),
        }
    }

    pub fn self_team(details: Option<&'a Details>) -> Self {
        Self {
            force_self_team: true,
            details,
        }
    }
}

impl TrackedBattle {
    /// Resolve an identifier such as `p2a: Tapu Koko`, creating the creature on
    /// first sight.
    pub fn resolve(&mut self, identifier: &str, options: ResolveOptions<'_>) -> Result<CreatureRef> {
        let ident = Ident::parse(identifier).ok_or_else(|| {
            BattleError::inconsistent(
                Inconsistency::BadIdentifier,
                format!("cannot parse {identifier:?}"),
            )
        })?;
        self.resolve_ident(&ident, options)
    }

    pub fn resolve_ident(&mut self, ident: &Ident, options: ResolveOptions<'_>) -> Result<CreatureRef> {
        let own = options.force_self_team || self.is_own(ident.player);
        let key = match self.perspective() {
            Some(me) if options.force_self_team => format!("{me}: {}", to_id(&ident.name)),
            _ => ident.key(),
        };

        let dex = self.dex.clone();
        let side = self.side_mut(own);
        let (index, created) = match side.find(&key) {
            Some(index) => (index, false),
            None => (side.insert(Creature::new(key, ident.name.clone()))?, true),
        };

        let creature = &mut side.creatures[index];
        let species_changed = match options.details {
            Some(details) => creature.merge_details(details, dex.as_ref())?,
            None => false,
        };
        if created || species_changed {
            if let Some(data) = dex.species(creature.species()) {
                creature.apply_species_data(data);
            }
        }

        Ok(CreatureRef { own, index })
    }
}

#[cfg(test)]
mod tests {
    use pokestate_protocol::Player;

    use super::*;
    use crate::types::Type;

    #[test]
    fn test_resolution_scenario() {
        let mut battle = TrackedBattle::new();

        // Before we know who we are, forced creatures land on our team
        let azumarill = battle
            .resolve("p2: azumarill", ResolveOptions::self_team(None))
            .unwrap();
        assert!(azumarill.own);
        assert_eq!(battle.team.creatures[0].key, "p2: azumarill");

        battle.set_perspective(Player::P2).unwrap();
        let koko = battle.resolve("p2a: Tapu Koko", ResolveOptions::default()).unwrap();
        assert!(koko.own);
        assert_eq!(battle.team.creatures[koko.index].key, "p2: tapukoko");

        let details = Details::parse("Hydreigon, F");
        let hydreigon = battle
            .resolve("p1: Hydreigon", ResolveOptions::with_details(&details))
            .unwrap();
        assert!(!hydreigon.own);
        assert!(battle.creature(hydreigon).unwrap().is_resolved());

        let fini = battle.resolve("p1: Tapu Fini", ResolveOptions::default()).unwrap();
        assert_eq!(battle.creature(fini).unwrap().species_id(), "tapufini");

        let bulu = battle.resolve("p1: Tapu Bulu", ResolveOptions::default()).unwrap();
        assert_eq!(
            battle.creature(bulu).unwrap().base_types,
            vec![Type::Grass, Type::Fairy]
        );

        let lele = battle.resolve("p1: Tapu Lele", ResolveOptions::default()).unwrap();
        let stats = battle.creature(lele).unwrap().base_stats.clone().unwrap();
        assert_eq!((stats.hp, stats.spa, stats.spe), (70, 130, 95));

        battle.resolve("p1: Yveltal", ResolveOptions::default()).unwrap();
        battle.resolve("p1: Pikachu", ResolveOptions::default()).unwrap();
        assert_eq!(battle.opponent_team.creatures.len(), 6);

        let err = battle.resolve("p1: Tyranitar", ResolveOptions::default()).unwrap_err();
        assert!(matches!(err, BattleError::CapacityViolation { .. }));
        assert_eq!(battle.opponent_team.creatures.len(), 6);
        assert!(battle.get_creature("p1: tyranitar").is_none());
    }

    #[test]
    fn test_identity_is_stable() {
        let mut battle = TrackedBattle::new();
        battle.set_perspective(Player::P1).unwrap();

        let first = battle.resolve("p2a: Tapu Koko", ResolveOptions::default()).unwrap();
        let again = battle.resolve("p2: tapukoko", ResolveOptions::default()).unwrap();
        let slotted = battle.resolve("p2b: Tapu Koko", ResolveOptions::default()).unwrap();

        assert_eq!(first, again);
        assert_eq!(first, slotted);
        assert_eq!(battle.opponent_team.creatures.len(), 1);
    }

    #[test]
    fn test_forced_key_uses_our_prefix() {
        let mut battle = TrackedBattle::new();
        battle.set_perspective(Player::P1).unwrap();
        let details = Details::parse("Pikachu, L50");
        let pikachu = battle
            .resolve("p1: Pikachu", ResolveOptions::self_team(Some(&details)))
            .unwrap();
        assert_eq!(battle.team.creatures[pikachu.index].key, "p1: pikachu");
        assert_eq!(battle.team.creatures[pikachu.index].level(), 50);
    }

    #[test]
    fn test_malformed_identifier() {
        let mut battle = TrackedBattle::new();
        let err = battle.resolve("tapukoko", ResolveOptions::default()).unwrap_err();
        assert!(matches!(
            err,
            BattleError::ProtocolInconsistency {
                kind: Inconsistency::BadIdentifier,
                ..
            }
        ));
    }

    #[test]
    fn test_species_conflict_is_inconsistent() {
        let mut battle = TrackedBattle::new();
        battle.set_perspective(Player::P1).unwrap();
        let details = Details::parse("Garchomp");
        battle
            .resolve("p2a: Chompy", ResolveOptions::with_details(&details))
            .unwrap();

        let other = Details::parse("Excadrill");
        let err = battle
            .resolve("p2a: Chompy", ResolveOptions::with_details(&other))
            .unwrap_err();
        assert!(err.is_fatal());
    }
}
