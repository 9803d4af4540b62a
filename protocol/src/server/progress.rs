//! Battle progress message parsers

use anyhow::Result;

use super::ServerMessage;
use super::request::BattleRequest;

/// Parse |request|REQUEST (JSON, may be empty)
pub fn parse_request(parts: &[&str]) -> Result<ServerMessage> {
    // JSON can legitimately contain `|`
    let json = parts.get(2..).map(|rest| rest.join("|")).unwrap_or_default();
    if json.trim().is_empty() {
        return Ok(ServerMessage::Request(None));
    }

    let request = BattleRequest::from_json(&json)?;
    Ok(ServerMessage::Request(Some(Box::new(request))))
}

/// Parse |inactive|MESSAGE
pub fn parse_inactive(parts: &[&str]) -> Result<ServerMessage> {
    Ok(ServerMessage::Inactive(parts.get(2).unwrap_or(&"").to_string()))
}

/// Parse |inactiveoff|MESSAGE
pub fn parse_inactiveoff(parts: &[&str]) -> Result<ServerMessage> {
    Ok(ServerMessage::InactiveOff(parts.get(2).unwrap_or(&"").to_string()))
}

/// Parse |turn|NUMBER
pub fn parse_turn(parts: &[&str]) -> Result<ServerMessage> {
    let turn = parts
        .get(2)
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| anyhow::anyhow!("Missing turn number"))?;

    Ok(ServerMessage::Turn(turn))
}

/// Parse |win|USER
pub fn parse_win(parts: &[&str]) -> Result<ServerMessage> {
    Ok(ServerMessage::Win(parts.get(2).unwrap_or(&"").to_string()))
}

/// Parse |error|MESSAGE, e.g. `[Invalid choice] Can't move: ...`
pub fn parse_error(parts: &[&str]) -> Result<ServerMessage> {
    let message = parts.get(2..).map(|rest| rest.join("|")).unwrap_or_default();
    Ok(ServerMessage::Error(message))
}
