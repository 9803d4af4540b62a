//! Battle initialization message parsers
//!
//! These lines arrive before the first turn: who is playing, the format, and the
//! team preview roster.

use anyhow::Result;

use super::ServerMessage;
use super::ident::{Details, GameType, Player};

fn required_player(parts: &[&str]) -> Result<Player> {
    parts
        .get(2)
        .and_then(|s| Player::parse(s))
        .ok_or_else(|| anyhow::anyhow!("Missing player"))
}

/// Parse |player|PLAYER|USERNAME|AVATAR|RATING
pub fn parse_player(parts: &[&str]) -> Result<ServerMessage> {
    let player = required_player(parts)?;
    let username = parts.get(3).unwrap_or(&"").to_string();
    let avatar = parts.get(4).unwrap_or(&"").to_string();
    let rating = parts.get(5).and_then(|s| s.parse().ok());

    Ok(ServerMessage::Player {
        player,
        username,
        avatar,
        rating,
    })
}

/// Parse |teamsize|PLAYER|NUMBER
pub fn parse_teamsize(parts: &[&str]) -> Result<ServerMessage> {
    let player = required_player(parts)?;
    let size = parts
        .get(3)
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| anyhow::anyhow!("Missing team size"))?;

    Ok(ServerMessage::TeamSize { player, size })
}

/// Parse |gametype|GAMETYPE
pub fn parse_gametype(parts: &[&str]) -> Result<ServerMessage> {
    let game_type = parts
        .get(2)
        .and_then(|s| GameType::parse(s))
        .ok_or_else(|| anyhow::anyhow!("Unknown game type"))?;

    Ok(ServerMessage::GameType(game_type))
}

/// Parse |gen|GENNUM
pub fn parse_gen(parts: &[&str]) -> Result<ServerMessage> {
    let generation = parts
        .get(2)
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| anyhow::anyhow!("Missing generation"))?;

    Ok(ServerMessage::Gen(generation))
}

/// Parse |tier|FORMATNAME
pub fn parse_tier(parts: &[&str]) -> Result<ServerMessage> {
    Ok(ServerMessage::Tier(parts.get(2).unwrap_or(&"").to_string()))
}

/// Parse |rated| or |rated|MESSAGE
pub fn parse_rated(parts: &[&str]) -> Result<ServerMessage> {
    let message = parts.get(2).filter(|s| !s.is_empty()).map(|s| s.to_string());
    Ok(ServerMessage::Rated(message))
}

/// Parse |rule|RULE: DESCRIPTION
pub fn parse_rule(parts: &[&str]) -> Result<ServerMessage> {
    Ok(ServerMessage::Rule(parts.get(2).unwrap_or(&"").to_string()))
}

/// Parse |poke|PLAYER|DETAILS|ITEM
pub fn parse_poke(parts: &[&str]) -> Result<ServerMessage> {
    let player = required_player(parts)?;
    let details = parts
        .get(3)
        .filter(|s| !s.is_empty())
        .map(|s| Details::parse(s))
        .ok_or_else(|| anyhow::anyhow!("Missing details"))?;
    let has_item = parts.get(4).is_some_and(|s| *s == "item");

    Ok(ServerMessage::Poke {
        player,
        details,
        has_item,
    })
}

/// Parse |teampreview or |teampreview|NUMBER
pub fn parse_teampreview(parts: &[&str]) -> Result<ServerMessage> {
    Ok(ServerMessage::TeamPreview(parts.get(2).and_then(|s| s.parse().ok())))
}
