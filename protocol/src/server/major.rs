//! Major battle action message parsers
//!
//! Moves, switches, forme changes and faints.

use anyhow::Result;

use super::ServerMessage;
use super::ident::{Ident, flag, parse_details, parse_hp_status, parse_ident, tag};

/// Parse |move|POKEMON|MOVE|TARGET with optional tags
pub fn parse_move(parts: &[&str]) -> Result<ServerMessage> {
    let source = parse_ident(parts, 2)?;
    let move_name = parts.get(3).unwrap_or(&"").to_string();
    if move_name.is_empty() {
        return Err(anyhow::anyhow!("Missing move name"));
    }
    let target = parts.get(4).and_then(|s| Ident::parse(s));
    let tags = parts.get(5..).unwrap_or(&[]);

    Ok(ServerMessage::Move {
        source,
        move_name,
        target,
        miss: flag(tags, "[miss]"),
        still: flag(tags, "[still]"),
        from: tag(tags, "[from]").map(str::to_string),
    })
}

/// Parse |switch|, |drag| and |replace| lines, which share a layout:
/// KIND|POKEMON|DETAILS|HP STATUS
pub fn parse_entrance(parts: &[&str]) -> Result<ServerMessage> {
    let ident = parse_ident(parts, 2)?;
    let details = parse_details(parts, 3);
    let hp = parse_hp_status(parts, 4);

    Ok(match parts.get(1).copied() {
        Some("drag") => ServerMessage::Drag { ident, details, hp },
        Some("replace") => ServerMessage::Replace { ident, details, hp },
        Some("detailschange") => ServerMessage::DetailsChange { ident, details, hp },
        _ => ServerMessage::Switch { ident, details, hp },
    })
}

/// Parse |-formechange|POKEMON|SPECIES|HP STATUS
pub fn parse_formechange(parts: &[&str]) -> Result<ServerMessage> {
    let ident = parse_ident(parts, 2)?;
    let species = parts.get(3).unwrap_or(&"").to_string();
    let hp = parse_hp_status(parts, 4);

    Ok(ServerMessage::FormeChange { ident, species, hp })
}

/// Parse |swap|POKEMON|POSITION
pub fn parse_swap(parts: &[&str]) -> Result<ServerMessage> {
    let ident = parse_ident(parts, 2)?;
    let position = parts
        .get(3)
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| anyhow::anyhow!("Missing position"))?;

    Ok(ServerMessage::Swap { ident, position })
}

/// Parse |cant|POKEMON|REASON or |cant|POKEMON|REASON|MOVE
pub fn parse_cant(parts: &[&str]) -> Result<ServerMessage> {
    let ident = parse_ident(parts, 2)?;
    let reason = parts.get(3).unwrap_or(&"").to_string();
    let move_name = parts.get(4).map(|s| s.to_string());

    Ok(ServerMessage::Cant {
        ident,
        reason,
        move_name,
    })
}

/// Parse |faint|POKEMON
pub fn parse_faint(parts: &[&str]) -> Result<ServerMessage> {
    Ok(ServerMessage::Faint(parse_ident(parts, 2)?))
}
