use pokestate_protocol::{BattleRequest, RequestKind};

use super::{Order, TeamRule, offered_mechanics};
use crate::tracking::TrackedBattle;
use crate::types::Mechanic;

/// Legal orders for a battle with one active slot per side
#[derive(Debug, Clone, PartialEq)]
pub struct SingleActions {
    orders: Vec<Order>,
    team: Option<TeamRule>,
}

impl SingleActions {
    pub fn derive(battle: &TrackedBattle, request: &BattleRequest) -> Self {
        let team = match request.kind() {
            RequestKind::TeamPreview => TeamRule::from_request(request),
            _ => None,
        };

        let mut orders = match request.kind() {
            RequestKind::TeamPreview => team.iter().map(TeamRule::identity).collect(),
            RequestKind::ForceSwitch => switches(request),
            RequestKind::Move => move_orders(battle, request),
            RequestKind::Wait => Vec::new(),
        };
        if orders.is_empty() {
            orders.push(Order::Default);
        }

        Self { orders, team }
    }

    pub fn orders(&self) -> &[Order] {
        &self.orders
    }

    pub fn len(&self) -> usize {
        self.orders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    /// Whether the order may be submitted. Any permutation passes for team preview
    pub fn contains(&self, order: &Order) -> bool {
        match (order, &self.team) {
            (Order::Team(positions), Some(rule)) => rule.accepts(positions),
            (Order::Default, Some(_)) => true,
            _ => self.orders.contains(order),
        }
    }
}

fn switches(request: &BattleRequest) -> Vec<Order> {
    request
        .switch_positions()
        .into_iter()
        .map(|position| Order::Switch { position })
        .collect()
}

fn move_orders(battle: &TrackedBattle, request: &BattleRequest) -> Vec<Order> {
    let Some(slot) = request.active.first() else {
        return switches(request);
    };
    let mechanics = offered_mechanics(slot, &battle.team.mechanics);

    let mut orders = Vec::new();
    for (index, _) in slot.usable_moves() {
        orders.push(Order::move_to(index));
        for &mechanic in &mechanics {
            if mechanic == Mechanic::ZMove && slot.z_move(index).is_none() {
                continue;
            }
            orders.push(Order::Move {
                index,
                target: None,
                mechanic: Some(mechanic),
            });
        }
    }
    if slot.can_switch() {
        orders.extend(switches(request));
    }
    orders
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(json: &str) -> BattleRequest {
        BattleRequest::from_json(json).unwrap()
    }

    const TEAM: &str = r#"{"name": "Alice", "id": "p1", "pokemon": [
        {"ident": "p1: Pikachu", "details": "Pikachu, L50", "condition": "100/100", "active": true, "moves": ["thunderbolt", "volttackle"]},
        {"ident": "p1: Snorlax", "details": "Snorlax", "condition": "200/200", "active": false, "moves": ["bodyslam"]},
        {"ident": "p1: Mew", "details": "Mew", "condition": "0 fnt", "active": false, "moves": ["psychic"]}
    ]}"#;

    fn move_request(active: &str) -> BattleRequest {
        request(&format!(r#"{{"rqid": 3, "active": [{active}], "side": {TEAM}}}"#))
    }

    #[test]
    fn test_moves_and_switches() {
        let battle = TrackedBattle::new();
        let req = move_request(
            r#"{"moves": [
                {"move": "Thunderbolt", "id": "thunderbolt", "pp": 15, "maxpp": 24, "target": "normal"},
                {"move": "Volt Tackle", "id": "volttackle", "pp": 0, "maxpp": 24, "target": "normal"}
            ]}"#,
        );
        let actions = SingleActions::derive(&battle, &req);
        assert_eq!(
            actions.orders(),
            &[Order::move_to(1), Order::Switch { position: 2 }]
        );
        // Fainted and active positions are never offered
        assert!(!actions.contains(&Order::Switch { position: 3 }));
        assert!(!actions.contains(&Order::move_to(2)));
    }

    #[test]
    fn test_trapped_and_locked() {
        let battle = TrackedBattle::new();
        let req = move_request(
            r#"{"moves": [{"move": "Outrage", "id": "outrage"}], "trapped": true}"#,
        );
        let actions = SingleActions::derive(&battle, &req);
        assert_eq!(actions.orders(), &[Order::move_to(1)]);
    }

    #[test]
    fn test_mechanic_variants() {
        let mut battle = TrackedBattle::new();
        let req = move_request(
            r#"{"moves": [
                {"move": "Thunderbolt", "id": "thunderbolt", "pp": 15, "maxpp": 24},
                {"move": "Protect", "id": "protect", "pp": 10, "maxpp": 16}
            ],
            "canZMove": [{"move": "Gigavolt Havoc", "target": "normal"}, null],
            "canTerastallize": "Electric"}"#,
        );
        let actions = SingleActions::derive(&battle, &req);
        let zmove = Order::Move {
            index: 1,
            target: None,
            mechanic: Some(Mechanic::ZMove),
        };
        let tera = Order::Move {
            index: 2,
            target: None,
            mechanic: Some(Mechanic::Terastallize),
        };
        assert!(actions.contains(&zmove));
        assert!(actions.contains(&tera));
        assert!(!actions.contains(&Order::Move {
            index: 2,
            target: None,
            mechanic: Some(Mechanic::ZMove),
        }));

        battle.team.mechanics.mark_used(Mechanic::Terastallize);
        let actions = SingleActions::derive(&battle, &req);
        assert!(!actions.contains(&tera));
        assert!(actions.contains(&zmove));
    }

    #[test]
    fn test_force_switch() {
        let battle = TrackedBattle::new();
        let req = request(&format!(
            r#"{{"rqid": 4, "forceSwitch": [true], "side": {TEAM}}}"#
        ));
        let actions = SingleActions::derive(&battle, &req);
        assert_eq!(actions.orders(), &[Order::Switch { position: 2 }]);
    }

    #[test]
    fn test_team_preview_accepts_permutations() {
        let battle = TrackedBattle::new();
        let req = request(&format!(
            r#"{{"rqid": 1, "teamPreview": true, "side": {TEAM}}}"#
        ));
        let actions = SingleActions::derive(&battle, &req);
        assert_eq!(actions.orders(), &[Order::Team(vec![1, 2, 3])]);
        assert!(actions.contains(&Order::Team(vec![3, 1, 2])));
        assert!(!actions.contains(&Order::Team(vec![3, 3, 2])));
    }

    #[test]
    fn test_nothing_to_do_falls_back_to_default() {
        let battle = TrackedBattle::new();
        let req = request(r#"{"rqid": 9, "forceSwitch": [true]}"#);
        let actions = SingleActions::derive(&battle, &req);
        assert_eq!(actions.orders(), &[Order::Default]);
    }
}
