/// Commands a battle participant sends to the server
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientCommand {
    /// /choose CHOICE|RQID
    Choose { choice: String, rqid: Option<u64> },

    /// /forfeit
    Forfeit,

    /// /undo
    Undo,

    /// /timer on|off
    Timer(bool),

    /// /leave ROOMID
    Leave(String),

    /// Raw command for catch-all
    Raw(String),
}

impl ClientCommand {
    /// Serialize command to protocol format
    pub fn to_protocol_string(&self) -> String {
        match self {
            Self::Choose {
                choice,
                rqid: Some(rqid),
            } => format!("/choose {}|{}", choice, rqid),
            Self::Choose { choice, rqid: None } => format!("/choose {}", choice),
            Self::Forfeit => "/forfeit".to_string(),
            Self::Undo => "/undo".to_string(),
            Self::Timer(on) => format!("/timer {}", if *on { "on" } else { "off" }),
            Self::Leave(room) => format!("/leave {}", room),
            Self::Raw(command) => command.clone(),
        }
    }
}

/// Client message with optional room context
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientMessage {
    pub room_id: Option<String>,
    pub command: ClientCommand,
}

impl ClientMessage {
    pub fn new(room_id: Option<String>, command: ClientCommand) -> Self {
        Self { room_id, command }
    }

    /// Serialize to wire format: ROOMID|TEXT or |TEXT
    pub fn to_wire_format(&self) -> String {
        let text = self.command.to_protocol_string();
        match &self.room_id {
            Some(room) => format!("{}|{}", room, text),
            None => format!("|{}", text),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_choose_with_rqid() {
        let message = ClientMessage::new(
            Some("battle-gen9ou-1".to_string()),
            ClientCommand::Choose {
                choice: "move 1 terastallize".to_string(),
                rqid: Some(12),
            },
        );
        assert_eq!(
            message.to_wire_format(),
            "battle-gen9ou-1|/choose move 1 terastallize|12"
        );
    }

    #[test]
    fn test_choose_default() {
        let command = ClientCommand::Choose {
            choice: "default".to_string(),
            rqid: None,
        };
        assert_eq!(command.to_protocol_string(), "/choose default");
    }

    #[test]
    fn test_forfeit_and_timer() {
        assert_eq!(ClientCommand::Forfeit.to_protocol_string(), "/forfeit");
        assert_eq!(ClientCommand::Timer(true).to_protocol_string(), "/timer on");
        let message = ClientMessage::new(None, ClientCommand::Undo);
        assert_eq!(message.to_wire_format(), "|/undo");
    }
}
