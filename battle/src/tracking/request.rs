//! Merging the request payload into our side

use pokestate_protocol::{BattleRequest, Details, to_id};

use super::battle::TrackedBattle;
use super::resolver::ResolveOptions;
use crate::error::Result;
use crate::types::{MAX_KNOWN_MOVES, Status, Type};

impl TrackedBattle {
    /// Apply a request: the authoritative view of our own team.
    ///
    /// Sets the perspective from `side.id`, then overwrites HP, stats, moves, item
    /// and ability of every creature listed, and places the active ones.
    pub fn update_from_request(&mut self, request: &BattleRequest) -> Result<()> {
        let Some(side) = &request.side else {
            return Ok(());
        };
        if let Some(player) = side.player() {
            self.set_perspective(player)?;
        }
        if !side.name.is_empty() {
            self.username.get_or_insert_with(|| side.name.clone());
        }

        let slots = self.team.slot_count();
        for (position, pokemon) in side.pokemon.iter().enumerate() {
            let details = Details::parse(&pokemon.details);
            let r = self.resolve(&pokemon.ident, ResolveOptions::self_team(Some(&details)))?;

            if let Some(creature) = self.creature_mut(r) {
                match pokemon.hp_status() {
                    Some(hp) => {
                        creature.hp_current = hp.current;
                        creature.hp_max = hp.max.or(creature.hp_max);
                        creature.status = hp.status.as_deref().and_then(Status::from_protocol);
                    }
                    None => tracing::warn!(
                        creature = %creature.key,
                        condition = %pokemon.condition,
                        "unreadable condition in request"
                    ),
                }
                creature.stats = Some(pokemon.stats.clone());
                creature.known_moves = pokemon
                    .moves
                    .iter()
                    .map(|m| to_id(m))
                    .take(MAX_KNOWN_MOVES)
                    .collect();
                let ability = if pokemon.ability.is_empty() {
                    &pokemon.base_ability
                } else {
                    &pokemon.ability
                };
                creature.ability = (!ability.is_empty()).then(|| to_id(ability));
                creature.item = (!pokemon.item.is_empty()).then(|| to_id(&pokemon.item));
                if let Some(tera) = pokemon.tera_type.as_deref().and_then(Type::from_protocol) {
                    creature.tera_type = Some(tera);
                }
                if pokemon.is_terastallized() && !creature.terastallized {
                    let tera = pokemon
                        .terastallized
                        .as_deref()
                        .and_then(Type::from_protocol)
                        .or(creature.tera_type);
                    match tera {
                        Some(tera) => creature.terastallize(tera),
                        None => creature.terastallized = true,
                    }
                }
            }

            // Active creatures lead the list, one per slot
            if pokemon.active && position < slots && self.team.active_index(position) != Some(r.index) {
                self.team.place(position, r.index)?;
            }
        }
        Ok(())
    }
}
