use std::fmt::{Debug, Display};

use pokestate_protocol::BattleRequest;

use crate::actions::{DoubleActions, DoubleOrder, Order, SingleActions};
use crate::tracking::TrackedBattle;

/// Number of active slots and the matching action model
pub trait Variant: Debug + Clone + Copy + Send + Sync + 'static {
    const SLOTS: usize;
    type Actions: Debug + Clone + Send + Sync;
    type Order: Debug + Clone + Display + Send + Sync;

    fn derive(battle: &TrackedBattle, request: &BattleRequest) -> Self::Actions;
    fn contains(actions: &Self::Actions, order: &Self::Order) -> bool;
    fn is_forfeit(order: &Self::Order) -> bool;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Singles;

impl Variant for Singles {
    const SLOTS: usize = 1;
    type Actions = SingleActions;
    type Order = Order;

    fn derive(battle: &TrackedBattle, request: &BattleRequest) -> SingleActions {
        SingleActions::derive(battle, request)
    }

    fn contains(actions: &SingleActions, order: &Order) -> bool {
        actions.contains(order)
    }

    fn is_forfeit(order: &Order) -> bool {
        *order == Order::Forfeit
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Doubles;

impl Variant for Doubles {
    const SLOTS: usize = 2;
    type Actions = DoubleActions;
    type Order = DoubleOrder;

    fn derive(battle: &TrackedBattle, request: &BattleRequest) -> DoubleActions {
        DoubleActions::derive(battle, request)
    }

    fn contains(actions: &DoubleActions, order: &DoubleOrder) -> bool {
        actions.contains(order)
    }

    fn is_forfeit(order: &DoubleOrder) -> bool {
        order.0 == Order::Forfeit
    }
}
