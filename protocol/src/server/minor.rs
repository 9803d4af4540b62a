//! Minor battle action message parsers
//!
//! Secondary effects: damage, stat stages, status, conditions, items, abilities and
//! the one-shot battle mechanics. Lines that only carry a creature are parsed with
//! [`parse_ident_only`].

use anyhow::Result;

use super::ServerMessage;
use super::ident::{Ident, Side, Stat, flag, parse_hp_status, parse_ident, tag};

fn text(parts: &[&str], index: usize) -> String {
    parts.get(index).unwrap_or(&"").to_string()
}

fn optional_text(parts: &[&str], index: usize) -> Option<String> {
    parts
        .get(index)
        .filter(|s| !s.is_empty() && !s.starts_with('['))
        .map(|s| s.to_string())
}

fn from_tag(parts: &[&str]) -> Option<String> {
    tag(parts.get(3..).unwrap_or(&[]), "[from]").map(str::to_string)
}

/// Parse any KIND|POKEMON line into the given variant
pub fn parse_ident_only(parts: &[&str], make: fn(Ident) -> ServerMessage) -> Result<ServerMessage> {
    Ok(make(parse_ident(parts, 2)?))
}

/// Parse |-damage|, |-heal| and |-sethp|: KIND|POKEMON|HP STATUS
pub fn parse_hp_change(parts: &[&str]) -> Result<ServerMessage> {
    let ident = parse_ident(parts, 2)?;
    let hp = parse_hp_status(parts, 3)
        .ok_or_else(|| anyhow::anyhow!("Missing hp status for {ident}"))?;
    let from = from_tag(parts);

    Ok(match parts.get(1).copied() {
        Some("-heal") => ServerMessage::Heal { ident, hp, from },
        Some("-sethp") => ServerMessage::SetHp { ident, hp },
        _ => ServerMessage::Damage { ident, hp, from },
    })
}

/// Parse |-status|POKEMON|STATUS
pub fn parse_status(parts: &[&str]) -> Result<ServerMessage> {
    let ident = parse_ident(parts, 2)?;
    Ok(ServerMessage::Status {
        ident,
        status: text(parts, 3),
    })
}

/// Parse |-curestatus|POKEMON|STATUS
pub fn parse_curestatus(parts: &[&str]) -> Result<ServerMessage> {
    let ident = parse_ident(parts, 2)?;
    Ok(ServerMessage::CureStatus {
        ident,
        status: text(parts, 3),
    })
}

/// Parse |-boost|, |-unboost| and |-setboost|: KIND|POKEMON|STAT|AMOUNT
pub fn parse_stat_change(parts: &[&str]) -> Result<ServerMessage> {
    let ident = parse_ident(parts, 2)?;
    let stat = parts
        .get(3)
        .and_then(|s| Stat::parse(s))
        .ok_or_else(|| anyhow::anyhow!("Missing stat"))?;
    let amount = parts
        .get(4)
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| anyhow::anyhow!("Missing amount"))?;

    Ok(match parts.get(1).copied() {
        Some("-unboost") => ServerMessage::Unboost { ident, stat, amount },
        Some("-setboost") => ServerMessage::SetBoost { ident, stat, amount },
        _ => ServerMessage::Boost { ident, stat, amount },
    })
}

/// Parse |-swapboost|SOURCE|TARGET|STATS
pub fn parse_swapboost(parts: &[&str]) -> Result<ServerMessage> {
    let source = parse_ident(parts, 2)?;
    let target = parse_ident(parts, 3)?;
    let stats = match parts.get(4).filter(|s| !s.is_empty() && !s.starts_with('[')) {
        Some(list) => list.split(',').filter_map(|s| Stat::parse(s.trim())).collect(),
        None => Stat::ALL.to_vec(),
    };

    Ok(ServerMessage::SwapBoost {
        source,
        target,
        stats,
    })
}

/// Parse |-copyboost|SOURCE|TARGET
pub fn parse_copyboost(parts: &[&str]) -> Result<ServerMessage> {
    Ok(ServerMessage::CopyBoost {
        source: parse_ident(parts, 2)?,
        target: parse_ident(parts, 3)?,
    })
}

/// Parse |-clearpositiveboost|TARGET|POKEMON|EFFECT
pub fn parse_clearpositiveboost(parts: &[&str]) -> Result<ServerMessage> {
    Ok(ServerMessage::ClearPositiveBoost(parse_ident(parts, 2)?))
}

/// Parse |-weather|WEATHER with optional [upkeep]
pub fn parse_weather(parts: &[&str]) -> Result<ServerMessage> {
    let weather = parts
        .get(2)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| anyhow::anyhow!("Missing weather"))?
        .to_string();
    let upkeep = flag(parts, "[upkeep]");

    Ok(ServerMessage::Weather { weather, upkeep })
}

/// Parse |-fieldstart|CONDITION and |-fieldend|CONDITION
pub fn parse_field(parts: &[&str]) -> Result<ServerMessage> {
    let condition = parts
        .get(2)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| anyhow::anyhow!("Missing field condition"))?
        .to_string();

    Ok(match parts.get(1).copied() {
        Some("-fieldend") => ServerMessage::FieldEnd(condition),
        _ => ServerMessage::FieldStart(condition),
    })
}

/// Parse |-sidestart|SIDE|CONDITION and |-sideend|SIDE|CONDITION
pub fn parse_side_condition(parts: &[&str]) -> Result<ServerMessage> {
    let side = parts
        .get(2)
        .and_then(|s| Side::parse(s))
        .ok_or_else(|| anyhow::anyhow!("Missing side"))?;
    let condition = parts
        .get(3)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| anyhow::anyhow!("Missing side condition"))?
        .to_string();

    Ok(match parts.get(1).copied() {
        Some("-sideend") => ServerMessage::SideEnd { side, condition },
        _ => ServerMessage::SideStart { side, condition },
    })
}

/// Parse |-start|POKEMON|EFFECT|DETAIL and |-end|POKEMON|EFFECT
pub fn parse_volatile(parts: &[&str]) -> Result<ServerMessage> {
    let ident = parse_ident(parts, 2)?;
    let effect = text(parts, 3);
    let detail = optional_text(parts, 4);

    Ok(match parts.get(1).copied() {
        Some("-end") => ServerMessage::VolatileEnd { ident, effect },
        _ => ServerMessage::VolatileStart {
            ident,
            effect,
            detail,
        },
    })
}

/// Parse |-item|POKEMON|ITEM with optional [from]EFFECT
pub fn parse_item(parts: &[&str]) -> Result<ServerMessage> {
    Ok(ServerMessage::Item {
        ident: parse_ident(parts, 2)?,
        item: text(parts, 3),
        from: from_tag(parts),
    })
}

/// Parse |-enditem|POKEMON|ITEM with optional [from]EFFECT or [eat]
pub fn parse_enditem(parts: &[&str]) -> Result<ServerMessage> {
    Ok(ServerMessage::EndItem {
        ident: parse_ident(parts, 2)?,
        item: text(parts, 3),
        from: from_tag(parts),
        eat: flag(parts, "[eat]"),
    })
}

/// Parse |-ability|POKEMON|ABILITY with optional [from]EFFECT
pub fn parse_ability(parts: &[&str]) -> Result<ServerMessage> {
    Ok(ServerMessage::Ability {
        ident: parse_ident(parts, 2)?,
        ability: text(parts, 3),
        from: from_tag(parts),
    })
}

/// Parse |-transform|POKEMON|TARGET
pub fn parse_transform(parts: &[&str]) -> Result<ServerMessage> {
    Ok(ServerMessage::Transform {
        ident: parse_ident(parts, 2)?,
        into: text(parts, 3),
    })
}

/// Parse |-mega|POKEMON|SPECIES|MEGASTONE
pub fn parse_mega(parts: &[&str]) -> Result<ServerMessage> {
    Ok(ServerMessage::Mega {
        ident: parse_ident(parts, 2)?,
        stone: optional_text(parts, 4).or_else(|| optional_text(parts, 3)),
    })
}

/// Parse |-burst|POKEMON|SPECIES|ITEM
pub fn parse_burst(parts: &[&str]) -> Result<ServerMessage> {
    Ok(ServerMessage::Burst {
        ident: parse_ident(parts, 2)?,
        species: text(parts, 3),
    })
}

/// Parse |-terastallize|POKEMON|TYPE
pub fn parse_terastallize(parts: &[&str]) -> Result<ServerMessage> {
    let ident = parse_ident(parts, 2)?;
    let tera_type = parts
        .get(3)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| anyhow::anyhow!("Missing tera type"))?
        .to_string();

    Ok(ServerMessage::Terastallize { ident, tera_type })
}

/// Parse |-activate|EFFECT, where the first field may be a creature
pub fn parse_activate(parts: &[&str]) -> Result<ServerMessage> {
    let ident = parts.get(2).and_then(|s| Ident::parse(s));
    let effect = if ident.is_some() {
        text(parts, 3)
    } else {
        text(parts, 2)
    };

    Ok(ServerMessage::Activate { ident, effect })
}

/// Parse |-prepare|ATTACKER|MOVE or |-prepare|ATTACKER|MOVE|DEFENDER
pub fn parse_prepare(parts: &[&str]) -> Result<ServerMessage> {
    Ok(ServerMessage::Prepare {
        ident: parse_ident(parts, 2)?,
        move_name: text(parts, 3),
    })
}

/// Parse |-singleturn|POKEMON|MOVE and |-singlemove|POKEMON|MOVE
pub fn parse_single(parts: &[&str]) -> Result<ServerMessage> {
    let ident = parse_ident(parts, 2)?;
    let effect = text(parts, 3);

    Ok(match parts.get(1).copied() {
        Some("-singlemove") => ServerMessage::SingleMove { ident, effect },
        _ => ServerMessage::SingleTurn { ident, effect },
    })
}

/// Parse |-hitcount|POKEMON|NUM
pub fn parse_hitcount(parts: &[&str]) -> Result<ServerMessage> {
    let ident = parse_ident(parts, 2)?;
    let count = parts
        .get(3)
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| anyhow::anyhow!("Missing hit count"))?;

    Ok(ServerMessage::HitCount { ident, count })
}

/// Text-only informational lines such as |-hint|MESSAGE and |-message|MESSAGE
pub fn parse_notice(parts: &[&str]) -> Result<ServerMessage> {
    Ok(ServerMessage::Notice {
        kind: parts.get(1).unwrap_or(&"").trim_start_matches('-').to_string(),
        text: parts.get(2..).map(|rest| rest.join("|")).unwrap_or_default(),
    })
}
