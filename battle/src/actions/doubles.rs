use pokestate_protocol::{ActiveSlot, BattleRequest, MoveSlot, RequestKind};

use super::{DoubleOrder, Order, TeamRule, offered_mechanics};
use crate::data::MoveTarget;
use crate::tracking::TrackedBattle;
use crate::types::{Mechanic, MechanicAllocation};

const SLOTS: usize = 2;

/// Legal orders for a battle with two active slots per side.
///
/// Each slot's set is derived on its own. Pairs are checked for conflicts only
/// when they are combined, see [`DoubleActions::compatible`].
#[derive(Debug, Clone, PartialEq)]
pub struct DoubleActions {
    slots: [Vec<Order>; SLOTS],
    team: Option<TeamRule>,
    /// Switches a forced-switch pair must contain
    required_switches: usize,
}

impl DoubleActions {
    pub fn derive(battle: &TrackedBattle, request: &BattleRequest) -> Self {
        if request.kind() == RequestKind::TeamPreview {
            return Self {
                slots: Default::default(),
                team: TeamRule::from_request(request),
                required_switches: 0,
            };
        }

        let forced = match request.kind() {
            RequestKind::ForceSwitch => (0..SLOTS).filter(|&slot| request.must_switch(slot)).count(),
            _ => 0,
        };
        let required_switches = forced.min(request.switch_positions().len());
        let short_of_bench = required_switches < forced;

        let slots = std::array::from_fn(|slot| {
            let mut orders = slot_orders(battle, request, slot);
            // Fewer healthy creatures on the bench than forced slots: the rest pass
            if short_of_bench && request.must_switch(slot) {
                orders.push(Order::Pass);
            }
            if orders.is_empty() { vec![Order::Pass] } else { orders }
        });
        Self {
            slots,
            team: None,
            required_switches,
        }
    }

    /// Legal orders for one active slot
    pub fn slot(&self, slot: usize) -> &[Order] {
        self.slots.get(slot).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn team_rule(&self) -> Option<&TeamRule> {
        self.team.as_ref()
    }

    /// True when neither slot has anything but `pass`
    pub fn is_idle(&self) -> bool {
        self.team.is_none() && self.slots.iter().flatten().all(|o| *o == Order::Pass)
    }

    /// Whether two per-slot orders can be submitted together: a one-shot mechanic
    /// is claimed by at most one slot and a bench creature switches into one slot
    pub fn compatible(first: &Order, second: &Order) -> bool {
        let mut allocation = MechanicAllocation::default();
        let mechanics_ok = [first.mechanic(), second.mechanic()]
            .into_iter()
            .flatten()
            .all(|mechanic| allocation.allocate(mechanic));

        let same_switch = matches!(
            (first, second),
            (Order::Switch { position: a }, Order::Switch { position: b }) if a == b
        );
        mechanics_ok && !same_switch
    }

    pub fn contains(&self, order: &DoubleOrder) -> bool {
        let DoubleOrder(first, second) = order;
        match first {
            Order::Team(positions) => self.team.is_some_and(|rule| rule.accepts(positions)),
            Order::Default => self.team.is_some() || self.is_idle(),
            Order::Forfeit => false,
            _ => {
                self.slots[0].contains(first)
                    && self.slots[1].contains(second)
                    && self.accepts_pair(first, second)
            }
        }
    }

    /// Compatible, and sending in as many creatures as a forced switch allows
    fn accepts_pair(&self, first: &Order, second: &Order) -> bool {
        let switches = [first, second]
            .into_iter()
            .filter(|o| matches!(o, Order::Switch { .. }))
            .count();
        Self::compatible(first, second) && switches >= self.required_switches
    }

    /// Every legal pair, or the identity team order during preview
    pub fn joint_orders(&self) -> Vec<DoubleOrder> {
        if let Some(rule) = &self.team {
            return vec![DoubleOrder::side_wide(rule.identity())];
        }
        let mut pairs = Vec::new();
        for first in &self.slots[0] {
            for second in &self.slots[1] {
                if self.accepts_pair(first, second) {
                    pairs.push(DoubleOrder(first.clone(), second.clone()));
                }
            }
        }
        pairs
    }
}

fn slot_orders(battle: &TrackedBattle, request: &BattleRequest, slot: usize) -> Vec<Order> {
    let occupied = request
        .pokemon()
        .get(slot)
        .is_some_and(|p| p.active && !p.is_fainted());

    match request.kind() {
        RequestKind::ForceSwitch => {
            if request.must_switch(slot) {
                switches(request)
            } else {
                Vec::new()
            }
        }
        RequestKind::Move => match request.active.get(slot) {
            Some(active) if occupied => move_orders(battle, request, active, slot),
            _ => Vec::new(),
        },
        RequestKind::TeamPreview | RequestKind::Wait => Vec::new(),
    }
}

fn switches(request: &BattleRequest) -> Vec<Order> {
    request
        .switch_positions()
        .into_iter()
        .map(|position| Order::Switch { position })
        .collect()
}

fn move_orders(
    battle: &TrackedBattle,
    request: &BattleRequest,
    active: &ActiveSlot,
    slot: usize,
) -> Vec<Order> {
    let field = Positions::new(battle, request, slot);
    let mechanics = offered_mechanics(active, &battle.team.mechanics);
    let dynamaxed = battle
        .team
        .active_creature(slot)
        .is_some_and(|c| c.dynamaxed);

    let mut orders = Vec::new();
    for (index, move_slot) in active.usable_moves() {
        let plain = if dynamaxed {
            max_move_class(active, index)
        } else {
            move_class(battle, move_slot)
        };
        push_targets(&mut orders, &field, index, None, plain);

        for &mechanic in &mechanics {
            let class = match mechanic {
                Mechanic::ZMove => match active.z_move(index) {
                    Some(z) => MoveTarget::from_protocol(&z.target),
                    None => continue,
                },
                Mechanic::Dynamax => max_move_class(active, index),
                _ => plain,
            };
            push_targets(&mut orders, &field, index, Some(mechanic), class);
        }
    }

    if active.can_switch() {
        orders.extend(switches(request));
    }
    orders
}

fn move_class(battle: &TrackedBattle, move_slot: &MoveSlot) -> MoveTarget {
    match &move_slot.target {
        Some(target) => MoveTarget::from_protocol(target),
        None => battle
            .static_data()
            .move_data(&move_slot.id)
            .map(|data| data.target)
            .unwrap_or(MoveTarget::Unknown),
    }
}

/// Max moves hit a chosen foe; Max Guard targets the user
fn max_move_class(active: &ActiveSlot, index: usize) -> MoveTarget {
    match active.max_move(index) {
        Some(max) if MoveTarget::from_protocol(&max.target) == MoveTarget::User => MoveTarget::User,
        _ => MoveTarget::AdjacentFoe,
    }
}

fn push_targets(
    orders: &mut Vec<Order>,
    field: &Positions,
    index: usize,
    mechanic: Option<Mechanic>,
    class: MoveTarget,
) {
    let Some(targets) = field.targets(class) else {
        return;
    };
    orders.extend(targets.into_iter().map(|target| Order::Move {
        index,
        target,
        mechanic,
    }));
}

/// Which target positions are occupied, seen from one of our slots
struct Positions {
    slot: usize,
    foes: [bool; SLOTS],
    ally: bool,
}

impl Positions {
    fn new(battle: &TrackedBattle, request: &BattleRequest, slot: usize) -> Self {
        let foes = std::array::from_fn(|foe| {
            battle
                .opponent_team
                .active_creature(foe)
                .is_some_and(|c| c.is_alive())
        });
        let ally = request
            .pokemon()
            .get(1 - slot)
            .is_some_and(|p| p.active && !p.is_fainted());
        Self { slot, foes, ally }
    }

    fn ally_target(&self) -> i8 {
        -((1 - self.slot) as i8 + 1)
    }

    fn self_target(&self) -> i8 {
        -(self.slot as i8 + 1)
    }

    /// Target choices for a move class; `None` drops the move
    fn targets(&self, class: MoveTarget) -> Option<Vec<Option<i8>>> {
        let foe_targets = [1, 2];
        let candidates: Vec<i8> = match class {
            MoveTarget::Normal | MoveTarget::Any => vec![1, 2, self.ally_target()],
            MoveTarget::AdjacentFoe => foe_targets.to_vec(),
            MoveTarget::AdjacentAlly => vec![self.ally_target()],
            MoveTarget::AdjacentAllyOrSelf => vec![self.self_target(), self.ally_target()],
            _ => return Some(vec![None]),
        };

        let filtered: Vec<i8> = candidates
            .iter()
            .copied()
            .filter(|&t| self.is_occupied(t))
            .collect();
        if !filtered.is_empty() {
            return Some(filtered.into_iter().map(Some).collect());
        }

        // Nobody there: keep aiming at the foe positions, drop ally-only moves
        let foes: Vec<Option<i8>> = candidates
            .into_iter()
            .filter(|t| *t > 0)
            .map(Some)
            .collect();
        (!foes.is_empty()).then_some(foes)
    }

    fn is_occupied(&self, target: i8) -> bool {
        if target > 0 {
            self.foes[(target - 1) as usize]
        } else if target == self.self_target() {
            true
        } else {
            self.ally
        }
    }
}

#[cfg(test)]
mod tests {
    use pokestate_protocol::{Player, parse_server_message};

    use super::*;

    const TEAM: &str = r#"{"name": "Alice", "id": "p1", "pokemon": [
        {"ident": "p1: Tapu Koko", "details": "Tapu Koko", "condition": "100/100", "active": true, "moves": ["thunderbolt", "protect"]},
        {"ident": "p1: Tapu Fini", "details": "Tapu Fini", "condition": "100/100", "active": true, "moves": ["helpinghand", "rockslide"]},
        {"ident": "p1: Tapu Bulu", "details": "Tapu Bulu", "condition": "100/100", "active": false, "moves": ["woodhammer"]},
        {"ident": "p1: Tapu Lele", "details": "Tapu Lele", "condition": "100/100", "active": false, "moves": ["psychic"]}
    ]}"#;

    const KOKO: &str = r#"{"moves": [
        {"move": "Thunderbolt", "id": "thunderbolt", "pp": 24, "maxpp": 24, "target": "normal"},
        {"move": "Protect", "id": "protect", "pp": 16, "maxpp": 16, "target": "self"}
    ], "canTerastallize": "Electric"}"#;

    const FINI: &str = r#"{"moves": [
        {"move": "Helping Hand", "id": "helpinghand", "pp": 32, "maxpp": 32, "target": "adjacentAlly"},
        {"move": "Rock Slide", "id": "rockslide", "pp": 16, "maxpp": 16, "target": "allAdjacentFoes"}
    ], "canTerastallize": "Water"}"#;

    fn doubles_battle(foes: &[&str]) -> TrackedBattle {
        let mut battle = TrackedBattle::with_slots(2);
        battle.set_perspective(Player::P1).unwrap();
        for line in foes {
            battle.update(&parse_server_message(line).unwrap()).unwrap();
        }
        battle
    }

    fn both_foes() -> TrackedBattle {
        doubles_battle(&[
            "|switch|p2a: Hydreigon|Hydreigon|100/100",
            "|switch|p2b: Yveltal|Yveltal|100/100",
        ])
    }

    fn move_request(first: &str, second: &str) -> BattleRequest {
        BattleRequest::from_json(&format!(
            r#"{{"rqid": 5, "active": [{first}, {second}], "side": {TEAM}}}"#
        ))
        .unwrap()
    }

    fn mv(index: usize, target: Option<i8>, mechanic: Option<Mechanic>) -> Order {
        Order::Move {
            index,
            target,
            mechanic,
        }
    }

    #[test]
    fn test_targets_per_class() {
        let battle = both_foes();
        let actions = DoubleActions::derive(&battle, &move_request(KOKO, FINI));

        let koko = actions.slot(0);
        assert!(koko.contains(&mv(1, Some(1), None)));
        assert!(koko.contains(&mv(1, Some(2), None)));
        assert!(koko.contains(&mv(1, Some(-2), None)));
        assert!(koko.contains(&mv(2, None, None)));
        assert!(koko.contains(&Order::Switch { position: 3 }));

        let fini = actions.slot(1);
        assert!(fini.contains(&mv(1, Some(-1), None)));
        assert!(fini.contains(&mv(2, None, None)));
        assert!(!fini.contains(&mv(2, Some(1), None)));
    }

    #[test]
    fn test_mechanic_exclusive_across_slots() {
        let battle = both_foes();
        let actions = DoubleActions::derive(&battle, &move_request(KOKO, FINI));

        let tera_koko = mv(2, None, Some(Mechanic::Terastallize));
        let tera_fini = mv(2, None, Some(Mechanic::Terastallize));
        // Both slots offer it on their own
        assert!(actions.slot(0).contains(&tera_koko));
        assert!(actions.slot(1).contains(&tera_fini));

        assert!(!actions.contains(&DoubleOrder(tera_koko.clone(), tera_fini.clone())));
        assert!(actions.contains(&DoubleOrder(tera_koko.clone(), mv(2, None, None))));
        assert!(
            actions
                .joint_orders()
                .iter()
                .all(|DoubleOrder(a, b)| !(a.mechanic().is_some() && a.mechanic() == b.mechanic()))
        );
    }

    #[test]
    fn test_slots_are_independent() {
        let battle = both_foes();
        let actions = DoubleActions::derive(&battle, &move_request(KOKO, FINI));
        let first_slot = actions.slot(0).to_vec();

        let other = DoubleActions::derive(
            &battle,
            &move_request(KOKO, r#"{"moves": [{"move": "Rock Slide", "id": "rockslide", "pp": 16, "maxpp": 16}]}"#),
        );
        assert_eq!(other.slot(0), first_slot.as_slice());
    }

    #[test]
    fn test_same_switch_in_both_slots() {
        let battle = both_foes();
        let actions = DoubleActions::derive(&battle, &move_request(KOKO, FINI));
        let switch = Order::Switch { position: 3 };
        assert!(!actions.contains(&DoubleOrder(switch.clone(), switch.clone())));
        assert!(actions.contains(&DoubleOrder(switch, Order::Switch { position: 4 })));
    }

    #[test]
    fn test_empty_foe_slot_filters_targets() {
        let battle = doubles_battle(&["|switch|p2a: Hydreigon|Hydreigon|100/100"]);
        let actions = DoubleActions::derive(&battle, &move_request(KOKO, FINI));
        let koko = actions.slot(0);
        assert!(koko.contains(&mv(1, Some(1), None)));
        assert!(!koko.contains(&mv(1, Some(2), None)));
    }

    #[test]
    fn test_no_foes_keeps_foe_targets() {
        let battle = doubles_battle(&[]);
        let adjacent_foe = r#"{"moves": [{"move": "Fake Out", "id": "fakeout", "pp": 16, "maxpp": 16, "target": "adjacentFoe"}]}"#;
        let actions = DoubleActions::derive(&battle, &move_request(adjacent_foe, FINI));
        assert_eq!(actions.slot(0)[..2], [mv(1, Some(1), None), mv(1, Some(2), None)]);
    }

    #[test]
    fn test_ally_move_dropped_without_ally() {
        let battle = both_foes();
        let team = TEAM.replace(
            r#""details": "Tapu Koko", "condition": "100/100""#,
            r#""details": "Tapu Koko", "condition": "0 fnt""#,
        );
        let req = BattleRequest::from_json(&format!(
            r#"{{"rqid": 6, "active": [{KOKO}, {FINI}], "side": {team}}}"#
        ))
        .unwrap();
        let actions = DoubleActions::derive(&battle, &req);
        assert_eq!(actions.slot(0), &[Order::Pass]);
        assert!(actions.slot(1).iter().all(|o| !matches!(o, Order::Move { index: 1, .. })));
    }

    #[test]
    fn test_dynamax_targets() {
        let battle = both_foes();
        let dyna = r#"{"moves": [
            {"move": "Thunderbolt", "id": "thunderbolt", "pp": 24, "maxpp": 24, "target": "normal"},
            {"move": "Protect", "id": "protect", "pp": 16, "maxpp": 16, "target": "self"}
        ], "canDynamax": true, "maxMoves": {"maxMoves": [
            {"move": "maxlightning", "target": "adjacentFoe"},
            {"move": "maxguard", "target": "self"}
        ]}}"#;
        let actions = DoubleActions::derive(&battle, &move_request(dyna, FINI));
        let koko = actions.slot(0);
        assert!(koko.contains(&mv(1, Some(2), Some(Mechanic::Dynamax))));
        assert!(!koko.contains(&mv(1, Some(-2), Some(Mechanic::Dynamax))));
        assert!(koko.contains(&mv(2, None, Some(Mechanic::Dynamax))));
    }

    #[test]
    fn test_force_switch_one_slot() {
        let battle = both_foes();
        let req = BattleRequest::from_json(&format!(
            r#"{{"rqid": 7, "forceSwitch": [false, true], "side": {TEAM}}}"#
        ))
        .unwrap();
        let actions = DoubleActions::derive(&battle, &req);
        assert_eq!(actions.slot(0), &[Order::Pass]);
        assert_eq!(
            actions.slot(1),
            &[Order::Switch { position: 3 }, Order::Switch { position: 4 }]
        );
        assert!(actions.contains(&DoubleOrder(Order::Pass, Order::Switch { position: 4 })));
    }

    #[test]
    fn test_force_switch_short_bench() {
        let battle = both_foes();
        let team = r#"{"name": "Alice", "id": "p1", "pokemon": [
            {"ident": "p1: Tapu Koko", "details": "Tapu Koko", "condition": "0 fnt", "active": true},
            {"ident": "p1: Tapu Fini", "details": "Tapu Fini", "condition": "0 fnt", "active": true},
            {"ident": "p1: Tapu Bulu", "details": "Tapu Bulu", "condition": "100/100", "active": false}
        ]}"#;
        let req = BattleRequest::from_json(&format!(
            r#"{{"rqid": 8, "forceSwitch": [true, true], "side": {team}}}"#
        ))
        .unwrap();
        let actions = DoubleActions::derive(&battle, &req);
        let bulu = Order::Switch { position: 3 };

        assert!(actions.contains(&DoubleOrder(bulu.clone(), Order::Pass)));
        assert!(actions.contains(&DoubleOrder(Order::Pass, bulu.clone())));
        assert!(!actions.contains(&DoubleOrder(bulu.clone(), bulu.clone())));
        // Bulu has to come in
        assert!(!actions.contains(&DoubleOrder(Order::Pass, Order::Pass)));
        assert_eq!(actions.joint_orders().len(), 2);
    }

    #[test]
    fn test_team_preview() {
        let battle = TrackedBattle::with_slots(2);
        let req = BattleRequest::from_json(&format!(
            r#"{{"rqid": 1, "teamPreview": true, "maxChosenTeamSize": 4, "side": {TEAM}}}"#
        ))
        .unwrap();
        let actions = DoubleActions::derive(&battle, &req);
        assert!(actions.contains(&DoubleOrder::side_wide(Order::Team(vec![4, 3, 2, 1]))));
        assert_eq!(actions.joint_orders().len(), 1);
    }
}
