//! Applying server messages to battle state

use pokestate_protocol::{Details, HpStatus, Ident, ServerMessage, Side, to_id};
use tracing::{debug, warn};

use super::battle::{CreatureRef, TrackedBattle};
use super::carry_over::EntranceCause;
use super::resolver::ResolveOptions;
use crate::error::{BattleError, Inconsistency, Result};
use crate::types::{
    Creature, Field, MAX_TEAM_SIZE, Mechanic, SideCondition, StatStages, Status, Type, Volatile,
    Weather,
};

impl TrackedBattle {
    /// Update battle state from a server message.
    ///
    /// Messages that carry no state are accepted and ignored. An error means the
    /// stream contradicts what was tracked so far.
    pub fn update(&mut self, msg: &ServerMessage) -> Result<()> {
        match msg {
            // === Battle Initialization ===
            ServerMessage::Player {
                player, username, ..
            } => {
                self.record_player(*player, username);
                let ours = self
                    .username
                    .as_deref()
                    .is_some_and(|name| !name.is_empty() && to_id(name) == to_id(username));
                if ours && self.perspective().is_none() {
                    self.set_perspective(*player)?;
                }
            }

            ServerMessage::TeamSize { player, size } => {
                if !(1..=MAX_TEAM_SIZE).contains(size) {
                    return Err(BattleError::capacity(format!(
                        "{player} announced a team of {size}"
                    )));
                }
                self.record_team_size(*player, *size);
            }

            ServerMessage::GameType(game_type) => self.set_game_type(*game_type),
            ServerMessage::Gen(generation) => self.generation = *generation,
            ServerMessage::Tier(tier) => self.tier = tier.clone(),
            ServerMessage::Rated(_) => self.rated = true,
            ServerMessage::Rule(rule) => self.rules.push(rule.clone()),
            ServerMessage::ClearPoke => self.clear_previews(),
            ServerMessage::Poke {
                player, details, ..
            } => self.record_preview(*player, details)?,

            // === Progress ===
            ServerMessage::Request(Some(request)) => self.update_from_request(request)?,

            ServerMessage::Turn(turn) => {
                if *turn <= self.turn {
                    return Err(BattleError::inconsistent(
                        Inconsistency::TurnRegression,
                        format!("turn {turn} after turn {}", self.turn),
                    ));
                }
                self.turn = *turn;
                for side in [&mut self.team, &mut self.opponent_team] {
                    for creature in &mut side.creatures {
                        creature.end_turn();
                    }
                }
            }

            ServerMessage::Win(winner) => {
                self.ended = true;
                self.winner = Some(winner.clone());
            }

            ServerMessage::Tie => {
                self.ended = true;
                self.tie = true;
            }

            // === Major Actions ===
            ServerMessage::Move {
                source,
                move_name,
                from,
                ..
            } => self.handle_move(source, move_name, from.as_deref())?,

            ServerMessage::Switch { ident, details, hp } => {
                self.handle_entrance(ident, details, hp.as_ref(), EntranceCause::Switch)?;
            }

            ServerMessage::Drag { ident, details, hp } => {
                self.handle_entrance(ident, details, hp.as_ref(), EntranceCause::Drag)?;
            }

            ServerMessage::Replace { ident, details, hp } => {
                let r = self.resolve_ident(ident, ResolveOptions::with_details(details))?;
                let slot = ident.slot_index().unwrap_or(0);
                self.side_mut(r.own).replace(slot, r.index)?;
                if let Some(hp) = hp {
                    self.with_creature(r, |c| c.apply_hp(hp));
                }
            }

            ServerMessage::DetailsChange { ident, details, hp } => {
                self.handle_forme_change(ident, &details.species, hp.as_ref())?;
            }

            ServerMessage::FormeChange { ident, species, hp } => {
                self.handle_forme_change(ident, species, hp.as_ref())?;
            }

            ServerMessage::Swap { ident, position } => {
                let r = self.resolve_ident(ident, ResolveOptions::default())?;
                let side = self.side_mut(r.own);
                let current = side
                    .slot_of(r.index)
                    .or(ident.slot_index())
                    .unwrap_or(0);
                side.swap_slots(current, *position)?;
            }

            ServerMessage::Cant { ident, reason, .. } => {
                let r = self.resolve_ident(ident, ResolveOptions::default())?;
                if to_id(reason) == "recharge" {
                    self.with_creature(r, |c| {
                        c.volatiles.remove(&Volatile::Recharging);
                    });
                }
            }

            ServerMessage::Faint(ident) => {
                let r = self.resolve_ident(ident, ResolveOptions::default())?;
                self.with_creature(r, Creature::faint);
                self.side_mut(r.own).vacate(r.index);
            }

            // === HP and Status ===
            ServerMessage::Damage { ident, hp, .. }
            | ServerMessage::Heal { ident, hp, .. }
            | ServerMessage::SetHp { ident, hp } => {
                let r = self.resolve_ident(ident, ResolveOptions::default())?;
                self.with_creature(r, |c| c.apply_hp(hp));
                if hp.is_fainted() {
                    self.side_mut(r.own).vacate(r.index);
                }
            }

            ServerMessage::Status { ident, status } => {
                let r = self.resolve_ident(ident, ResolveOptions::default())?;
                match Status::from_protocol(status) {
                    Some(status) => self.with_creature(r, |c| c.status = Some(status)),
                    None => warn!(creature = %ident, status = %status, "unknown status ignored"),
                }
            }

            ServerMessage::CureStatus { ident, .. } => {
                let r = self.resolve_ident(ident, ResolveOptions::default())?;
                self.with_creature(r, |c| {
                    if !c.is_fainted() {
                        c.status = None;
                    }
                });
            }

            ServerMessage::CureTeam(ident) => {
                let r = self.resolve_ident(ident, ResolveOptions::default())?;
                for creature in &mut self.side_mut(r.own).creatures {
                    if !creature.is_fainted() {
                        creature.status = None;
                    }
                }
            }

            // === Stat Stages ===
            ServerMessage::Boost {
                ident,
                stat,
                amount,
            } => {
                let r = self.resolve_ident(ident, ResolveOptions::default())?;
                self.with_creature(r, |c| {
                    c.boosts.boost(*stat, *amount);
                });
            }

            ServerMessage::Unboost {
                ident,
                stat,
                amount,
            } => {
                let r = self.resolve_ident(ident, ResolveOptions::default())?;
                self.with_creature(r, |c| {
                    c.boosts.unboost(*stat, *amount);
                });
            }

            ServerMessage::SetBoost {
                ident,
                stat,
                amount,
            } => {
                let r = self.resolve_ident(ident, ResolveOptions::default())?;
                self.with_creature(r, |c| c.boosts.set(*stat, *amount));
            }

            ServerMessage::SwapBoost {
                source,
                target,
                stats,
            } => {
                let source = self.resolve_ident(source, ResolveOptions::default())?;
                let target = self.resolve_ident(target, ResolveOptions::default())?;
                let mut a = self.boosts_of(source);
                let mut b = self.boosts_of(target);
                a.swap(&mut b, stats);
                self.with_creature(source, |c| c.boosts = a);
                self.with_creature(target, |c| c.boosts = b);
            }

            ServerMessage::InvertBoost(ident) => {
                let r = self.resolve_ident(ident, ResolveOptions::default())?;
                self.with_creature(r, |c| c.boosts.invert());
            }

            ServerMessage::ClearBoost(ident) => {
                let r = self.resolve_ident(ident, ResolveOptions::default())?;
                self.with_creature(r, |c| c.boosts.clear());
            }

            ServerMessage::ClearPositiveBoost(ident) => {
                let r = self.resolve_ident(ident, ResolveOptions::default())?;
                self.with_creature(r, |c| c.boosts.clear_positive());
            }

            ServerMessage::ClearNegativeBoost(ident) => {
                let r = self.resolve_ident(ident, ResolveOptions::default())?;
                self.with_creature(r, |c| c.boosts.clear_negative());
            }

            ServerMessage::ClearAllBoost => {
                for side in [&mut self.team, &mut self.opponent_team] {
                    for creature in &mut side.creatures {
                        creature.boosts.clear();
                    }
                }
            }

            // Psych Up: the first creature takes the second's stages
            ServerMessage::CopyBoost { source, target } => {
                let source = self.resolve_ident(source, ResolveOptions::default())?;
                let target = self.resolve_ident(target, ResolveOptions::default())?;
                let copied = self.boosts_of(target);
                self.with_creature(source, |c| c.boosts = copied);
            }

            // === Field ===
            ServerMessage::Weather { weather, upkeep } => {
                if !upkeep {
                    self.handle_weather(weather);
                }
            }

            ServerMessage::FieldStart(name) => match Field::from_protocol(name) {
                Some(field) => self.field.start(field),
                None => {
                    self.unknown_condition(name)?;
                    self.field.start_unknown(name);
                }
            },

            ServerMessage::FieldEnd(name) => {
                let Some(field) = Field::from_protocol(name) else {
                    if !self.field.end_unknown(name) {
                        return Err(BattleError::inconsistent(
                            Inconsistency::UnknownCondition,
                            format!("cannot end unknown field {name:?} that never started"),
                        ));
                    }
                    return Ok(());
                };
                if !self.field.end(field) {
                    return Err(BattleError::inconsistent(
                        Inconsistency::ConditionNotActive,
                        format!("{} ended but was not active", field.as_str()),
                    ));
                }
            }

            // === Side Conditions ===
            ServerMessage::SideStart { side, condition } => {
                match SideCondition::from_protocol(condition) {
                    Some(cond) => {
                        let own = self.is_own(side.player);
                        let layers = self.side_mut(own).start_condition(cond);
                        debug!(side = %side.player, condition = cond.as_str(), layers, "side condition started");
                    }
                    None => {
                        self.unknown_condition(condition)?;
                        let own = self.is_own(side.player);
                        self.side_mut(own).start_unknown_condition(condition);
                    }
                }
            }

            ServerMessage::SideEnd { side, condition } => self.handle_side_end(side, condition)?,

            ServerMessage::SwapSideConditions => {
                std::mem::swap(&mut self.team.conditions, &mut self.opponent_team.conditions);
                std::mem::swap(
                    &mut self.team.unknown_conditions,
                    &mut self.opponent_team.unknown_conditions,
                );
            }

            // === Volatiles ===
            ServerMessage::VolatileStart {
                ident,
                effect,
                detail,
            } => {
                let r = self.resolve_ident(ident, ResolveOptions::default())?;
                let volatile = Volatile::from_protocol(effect);
                if volatile == Volatile::Dynamaxed {
                    self.side_mut(r.own).mechanics.mark_used(Mechanic::Dynamax);
                    self.with_creature(r, |c| c.dynamaxed = true);
                    return Ok(());
                }
                self.with_creature(r, |c| {
                    if volatile == Volatile::TypeChange {
                        if let Some(types) = detail.as_deref() {
                            c.current_types = Type::parse_list(types);
                        }
                    }
                    c.volatiles.insert(volatile);
                });
            }

            ServerMessage::VolatileEnd { ident, effect } => {
                let r = self.resolve_ident(ident, ResolveOptions::default())?;
                let volatile = Volatile::from_protocol(effect);
                self.with_creature(r, |c| match volatile {
                    Volatile::Dynamaxed => c.dynamaxed = false,
                    _ => {
                        c.volatiles.remove(&volatile);
                    }
                });
            }

            ServerMessage::SingleTurn { ident, effect } => {
                let r = self.resolve_ident(ident, ResolveOptions::default())?;
                let volatile = Volatile::from_protocol(effect);
                self.with_creature(r, |c| {
                    c.volatiles.insert(volatile);
                });
            }

            ServerMessage::MustRecharge(ident) => {
                let r = self.resolve_ident(ident, ResolveOptions::default())?;
                self.with_creature(r, |c| {
                    c.volatiles.insert(Volatile::Recharging);
                });
            }

            ServerMessage::Prepare { ident, .. } => {
                let r = self.resolve_ident(ident, ResolveOptions::default())?;
                self.with_creature(r, |c| {
                    c.volatiles.insert(Volatile::Charging);
                });
            }

            // === Items and Abilities ===
            ServerMessage::Item { ident, item, .. } => {
                let r = self.resolve_ident(ident, ResolveOptions::default())?;
                self.with_creature(r, |c| {
                    c.item = Some(to_id(item));
                    c.item_consumed = false;
                });
            }

            ServerMessage::EndItem { ident, item, .. } => {
                let r = self.resolve_ident(ident, ResolveOptions::default())?;
                self.with_creature(r, |c| {
                    c.item = Some(to_id(item));
                    c.item_consumed = true;
                });
            }

            ServerMessage::Ability { ident, ability, .. } => {
                let r = self.resolve_ident(ident, ResolveOptions::default())?;
                self.with_creature(r, |c| c.ability = Some(to_id(ability)));
            }

            ServerMessage::EndAbility(ident) => {
                let r = self.resolve_ident(ident, ResolveOptions::default())?;
                self.with_creature(r, |c| {
                    c.volatiles.insert(Volatile::Other("abilitysuppressed".to_string()));
                });
            }

            // === Transformations and Mechanics ===
            ServerMessage::Transform { ident, into } => self.handle_transform(ident, into)?,

            ServerMessage::Mega { ident, .. } => {
                let r = self.resolve_ident(ident, ResolveOptions::default())?;
                self.side_mut(r.own).mechanics.mark_used(Mechanic::Mega);
                self.with_creature(r, |c| c.mega_evolved = true);
            }

            ServerMessage::Burst { ident, species } => {
                let r = self.resolve_ident(ident, ResolveOptions::default())?;
                self.side_mut(r.own).mechanics.mark_used(Mechanic::UltraBurst);
                self.apply_forme(r, species);
            }

            ServerMessage::ZPower(ident) => {
                let r = self.resolve_ident(ident, ResolveOptions::default())?;
                self.side_mut(r.own).mechanics.mark_used(Mechanic::ZMove);
                self.with_creature(r, |c| c.z_move_used = true);
                self.pending_zmove = Some(r);
            }

            ServerMessage::Terastallize { ident, tera_type } => {
                let r = self.resolve_ident(ident, ResolveOptions::default())?;
                self.side_mut(r.own).mechanics.mark_used(Mechanic::Terastallize);
                match Type::from_protocol(tera_type) {
                    Some(t) => self.with_creature(r, |c| c.terastallize(t)),
                    None => {
                        warn!(creature = %ident, tera_type = %tera_type, "unknown tera type");
                        self.with_creature(r, |c| c.terastallized = true);
                    }
                }
            }

            // Primal reversion arrives with its own detailschange
            ServerMessage::Primal(ident) => {
                self.resolve_ident(ident, ResolveOptions::default())?;
            }

            // === Informational ===
            ServerMessage::Request(None)
            | ServerMessage::Start
            | ServerMessage::TeamPreview(_)
            | ServerMessage::Upkeep
            | ServerMessage::Inactive(_)
            | ServerMessage::InactiveOff(_)
            | ServerMessage::Error(_)
            | ServerMessage::Activate { .. }
            | ServerMessage::SingleMove { .. }
            | ServerMessage::HitCount { .. }
            | ServerMessage::Crit(_)
            | ServerMessage::SuperEffective(_)
            | ServerMessage::Resisted(_)
            | ServerMessage::Immune(_)
            | ServerMessage::Notice { .. }
            | ServerMessage::Raw(_) => {}
        }
        Ok(())
    }

    fn with_creature(&mut self, r: CreatureRef, f: impl FnOnce(&mut Creature)) {
        if let Some(creature) = self.creature_mut(r) {
            f(creature);
        }
    }

    fn boosts_of(&self, r: CreatureRef) -> StatStages {
        self.creature(r).map(|c| c.boosts).unwrap_or_default()
    }

    fn handle_move(&mut self, source: &Ident, move_name: &str, from: Option<&str>) -> Result<()> {
        let r = self.resolve_ident(source, ResolveOptions::default())?;
        let id = to_id(move_name);
        let z_move = self.pending_zmove.take_if(|pending| *pending == r).is_some();
        let generated = self
            .dex
            .move_data(&id)
            .is_some_and(|data| data.is_z || data.is_max);
        // `[from]lockedmove` repeats the creature's own move
        let called = from.is_some_and(|effect| to_id(effect) != "lockedmove");

        let Some(creature) = self.creature_mut(r) else {
            return Ok(());
        };
        creature.volatiles.remove(&Volatile::Charging);
        creature.last_move = Some(id.clone());

        if z_move || generated || called || creature.dynamaxed {
            return Ok(());
        }
        if !creature.record_move(&id) {
            warn!(creature = %creature.key, move_id = %id, "more than four moves revealed, not recorded");
        }
        Ok(())
    }

    fn handle_entrance(
        &mut self,
        ident: &Ident,
        details: &Details,
        hp: Option<&HpStatus>,
        cause: EntranceCause,
    ) -> Result<()> {
        let r = self.resolve_ident(ident, ResolveOptions::with_details(details))?;
        let slot = ident.slot_index().unwrap_or(0);

        let rule = self.carry_over.clone();
        let side = self.side_mut(r.own);
        let carried = side
            .active_index(slot)
            .filter(|&outgoing| outgoing != r.index)
            .and_then(|outgoing| side.creatures.get(outgoing))
            .filter(|outgoing| rule.carries_boosts(outgoing, cause))
            .map(|outgoing| outgoing.boosts);
        side.switch_in(slot, r.index, carried)?;

        if let Some(hp) = hp {
            self.with_creature(r, |c| c.apply_hp(hp));
        }
        Ok(())
    }

    fn handle_forme_change(&mut self, ident: &Ident, species: &str, hp: Option<&HpStatus>) -> Result<()> {
        let r = self.resolve_ident(ident, ResolveOptions::default())?;
        self.apply_forme(r, species);
        if let Some(hp) = hp {
            self.with_creature(r, |c| c.apply_hp(hp));
        }
        Ok(())
    }

    fn apply_forme(&mut self, r: CreatureRef, species: &str) {
        let dex = self.dex.clone();
        self.with_creature(r, |c| {
            c.change_forme(species);
            if let Some(data) = dex.species(species) {
                c.apply_species_data(data);
            }
        });
    }

    fn handle_transform(&mut self, ident: &Ident, into: &str) -> Result<()> {
        let r = self.resolve_ident(ident, ResolveOptions::default())?;
        // Usually an identifier; some formats send a bare species
        let (species, types, boosts) = match Ident::parse(into) {
            Some(target) => {
                let t = self.resolve_ident(&target, ResolveOptions::default())?;
                match self.creature(t) {
                    Some(c) => (c.species().to_string(), c.current_types.clone(), Some(c.boosts)),
                    None => return Ok(()),
                }
            }
            None => {
                let types = self
                    .dex
                    .species(into)
                    .map(|data| data.types.clone())
                    .unwrap_or_default();
                (into.to_string(), types, None)
            }
        };

        self.with_creature(r, |c| {
            c.transformed = Some(species);
            if !types.is_empty() {
                c.current_types = types;
            }
            if let Some(boosts) = boosts {
                c.boosts = boosts;
            }
            c.volatiles.insert(Volatile::Transformed);
        });
        Ok(())
    }

    fn handle_weather(&mut self, name: &str) {
        let weather = Weather::from_protocol(name);
        if let Some(Weather::Unknown(unknown)) = &weather {
            warn!(weather = %unknown, "unknown weather recorded");
        }
        self.field.set_weather(weather);
    }

    fn handle_side_end(&mut self, side: &Side, name: &str) -> Result<()> {
        let own = self.is_own(side.player);
        let Some(condition) = SideCondition::from_protocol(name) else {
            if !self.side_mut(own).end_unknown_condition(name) {
                return Err(BattleError::inconsistent(
                    Inconsistency::UnknownCondition,
                    format!("cannot end unknown side condition {name:?} that never started"),
                ));
            }
            return Ok(());
        };
        if !self.side_mut(own).end_condition(condition) {
            return Err(BattleError::inconsistent(
                Inconsistency::ConditionNotActive,
                format!("{} ended on {} but was not active", condition.as_str(), side.player),
            ));
        }
        Ok(())
    }

    fn unknown_condition(&self, name: &str) -> Result<()> {
        if self.strict_conditions {
            return Err(BattleError::inconsistent(
                Inconsistency::UnknownCondition,
                format!("cannot start unknown condition {name:?}"),
            ));
        }
        warn!(condition = %name, "unknown condition recorded by name");
        Ok(())
    }
}
