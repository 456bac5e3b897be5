//! Unit orders
//!
//! A troop holds exactly one order. Giving a new order replaces the old one.
//! Orders that point at entities store ids, resolved against the world each
//! day, because targets move and die between days.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::types::{Point, SettlementId, TroopId};
use crate::world::scenario::World;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderKind {
    Idle,
    Move,
    MoveEnter,
    AttackLocation,
    AttackTroop,
    AttackSettlement,
}

impl OrderKind {
    /// Save-row name
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderKind::Idle => "idle",
            OrderKind::Move => "move",
            OrderKind::MoveEnter => "moveEnter",
            OrderKind::AttackLocation => "attackLocation",
            OrderKind::AttackTroop => "attackTroop",
            OrderKind::AttackSettlement => "attackArch",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "idle" => Some(OrderKind::Idle),
            "move" => Some(OrderKind::Move),
            "moveEnter" => Some(OrderKind::MoveEnter),
            "attackLocation" => Some(OrderKind::AttackLocation),
            "attackTroop" => Some(OrderKind::AttackTroop),
            "attackArch" => Some(OrderKind::AttackSettlement),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Order {
    #[default]
    Idle,
    MoveTo(Point),
    MoveEnter(SettlementId),
    AttackLocation(Point),
    AttackTroop(TroopId),
    AttackSettlement(SettlementId),
}

/// An entity an order resolves to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderTarget {
    Settlement(SettlementId),
    Troop(TroopId),
}

/// A stored order row could not be parsed
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid order '{kind}' with target '{target}'")]
pub struct OrderParseError {
    pub kind: String,
    pub target: String,
}

impl Order {
    pub fn kind(&self) -> OrderKind {
        match self {
            Order::Idle => OrderKind::Idle,
            Order::MoveTo(_) => OrderKind::Move,
            Order::MoveEnter(_) => OrderKind::MoveEnter,
            Order::AttackLocation(_) => OrderKind::AttackLocation,
            Order::AttackTroop(_) => OrderKind::AttackTroop,
            Order::AttackSettlement(_) => OrderKind::AttackSettlement,
        }
    }

    /// Explicit target point, for orders that carry one
    pub fn target_point(&self) -> Option<Point> {
        match self {
            Order::MoveTo(p) | Order::AttackLocation(p) => Some(*p),
            _ => None,
        }
    }

    /// (kind, target) pair as stored in save rows
    pub fn to_row(&self) -> (String, String) {
        let target = match self {
            Order::Idle => String::new(),
            Order::MoveTo(p) | Order::AttackLocation(p) => p.to_string(),
            Order::MoveEnter(id) | Order::AttackSettlement(id) => id.to_string(),
            Order::AttackTroop(id) => id.to_string(),
        };
        (self.kind().as_str().to_string(), target)
    }

    pub fn from_row(kind: &str, target: &str) -> Result<Self, OrderParseError> {
        let err = || OrderParseError {
            kind: kind.to_string(),
            target: target.to_string(),
        };
        let point = || target.parse::<Point>().map_err(|_| err());
        let id = || target.trim().parse::<u32>().map_err(|_| err());

        match OrderKind::parse(kind).ok_or_else(err)? {
            OrderKind::Idle => Ok(Order::Idle),
            OrderKind::Move => Ok(Order::MoveTo(point()?)),
            OrderKind::AttackLocation => Ok(Order::AttackLocation(point()?)),
            OrderKind::MoveEnter => Ok(Order::MoveEnter(SettlementId(id()?))),
            OrderKind::AttackTroop => Ok(Order::AttackTroop(TroopId(id()?))),
            OrderKind::AttackSettlement => Ok(Order::AttackSettlement(SettlementId(id()?))),
        }
    }

    /// Display string; None when idle
    pub fn describe(&self, world: &World) -> Option<String> {
        let settlement = |id: SettlementId| {
            world
                .settlements
                .get(id)
                .map_or_else(|| format!("settlement #{}", id), |s| s.name.clone())
        };
        match *self {
            Order::Idle => None,
            Order::MoveTo(p) => Some(format!("Move to ({}, {})", p.x, p.y)),
            Order::MoveEnter(id) => Some(format!("Move to enter {}", settlement(id))),
            Order::AttackLocation(p) => Some(format!("Attack ({}, {})", p.x, p.y)),
            Order::AttackTroop(id) => Some(format!(
                "Attack {}",
                world
                    .troop_name(id)
                    .map_or_else(|| format!("troop #{}", id), str::to_string)
            )),
            Order::AttackSettlement(id) => Some(format!("Attack {}", settlement(id))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_round_trip_preserves_kind_and_target() {
        let orders = [
            Order::Idle,
            Order::MoveTo(Point::new(3, 4)),
            Order::MoveEnter(SettlementId(2)),
            Order::AttackLocation(Point::new(-1, 7)),
            Order::AttackTroop(TroopId(11)),
            Order::AttackSettlement(SettlementId(5)),
        ];
        for order in orders {
            let (kind, target) = order.to_row();
            assert_eq!(Order::from_row(&kind, &target), Ok(order));
        }
    }

    #[test]
    fn test_row_format() {
        assert_eq!(
            Order::MoveTo(Point::new(3, 4)).to_row(),
            ("move".to_string(), "3,4".to_string())
        );
        assert_eq!(
            Order::AttackSettlement(SettlementId(5)).to_row(),
            ("attackArch".to_string(), "5".to_string())
        );
        assert_eq!(Order::Idle.to_row(), ("idle".to_string(), String::new()));
    }

    #[test]
    fn test_malformed_rows_rejected() {
        assert!(Order::from_row("charge", "1").is_err());
        assert!(Order::from_row("move", "3").is_err());
        assert!(Order::from_row("attackTroop", "x").is_err());

        let err = Order::from_row("charge", "1").unwrap_err();
        assert_eq!(err.to_string(), "invalid order 'charge' with target '1'");
    }

    #[test]
    fn test_target_point() {
        assert_eq!(Order::MoveTo(Point::new(1, 1)).target_point(), Some(Point::new(1, 1)));
        assert_eq!(Order::AttackTroop(TroopId(1)).target_point(), None);
        assert_eq!(Order::Idle.target_point(), None);
    }
}
