mod ident;
mod init;
mod major;
mod minor;
mod progress;
mod request;

use anyhow::Result;

use crate::ParseError;

pub use ident::{Details, GameType, HpStatus, Ident, Player, Side, Stat, to_id};
pub use request::{
    ActiveSlot, BattleRequest, MaxMoveSlot, MaxMoves, MoveSlot, RequestKind, RequestPokemon,
    RequestSide, StatTable, ZMoveInfo,
};

/// One parsed server line.
///
/// Every battle line kind the tracker cares about has its own variant. Kinds that are
/// not recognised are kept verbatim in [`ServerMessage::Raw`].
#[derive(Debug, Clone, PartialEq)]
pub enum ServerMessage {
    // === Initialization ===
    Player {
        player: Player,
        username: String,
        avatar: String,
        rating: Option<u32>,
    },
    TeamSize {
        player: Player,
        size: usize,
    },
    GameType(GameType),
    Gen(u8),
    Tier(String),
    Rated(Option<String>),
    Rule(String),
    ClearPoke,
    Poke {
        player: Player,
        details: Details,
        has_item: bool,
    },
    TeamPreview(Option<usize>),
    Start,

    // === Progress ===
    /// `None` for the empty request sent once the battle is over
    Request(Option<Box<BattleRequest>>),
    Inactive(String),
    InactiveOff(String),
    Upkeep,
    Turn(u32),
    Win(String),
    Tie,
    /// Rejected choice or other error addressed to us
    Error(String),

    // === Major actions ===
    Move {
        source: Ident,
        move_name: String,
        target: Option<Ident>,
        miss: bool,
        still: bool,
        /// Set when the move was called through another effect (Metronome, Sleep Talk, ...)
        from: Option<String>,
    },
    Switch {
        ident: Ident,
        details: Details,
        hp: Option<HpStatus>,
    },
    Drag {
        ident: Ident,
        details: Details,
        hp: Option<HpStatus>,
    },
    Replace {
        ident: Ident,
        details: Details,
        hp: Option<HpStatus>,
    },
    DetailsChange {
        ident: Ident,
        details: Details,
        hp: Option<HpStatus>,
    },
    FormeChange {
        ident: Ident,
        species: String,
        hp: Option<HpStatus>,
    },
    Swap {
        ident: Ident,
        position: usize,
    },
    Cant {
        ident: Ident,
        reason: String,
        move_name: Option<String>,
    },
    Faint(Ident),

    // === Minor actions ===
    Damage {
        ident: Ident,
        hp: HpStatus,
        from: Option<String>,
    },
    Heal {
        ident: Ident,
        hp: HpStatus,
        from: Option<String>,
    },
    SetHp {
        ident: Ident,
        hp: HpStatus,
    },
    Status {
        ident: Ident,
        status: String,
    },
    CureStatus {
        ident: Ident,
        status: String,
    },
    CureTeam(Ident),
    Boost {
        ident: Ident,
        stat: Stat,
        amount: i8,
    },
    Unboost {
        ident: Ident,
        stat: Stat,
        amount: i8,
    },
    SetBoost {
        ident: Ident,
        stat: Stat,
        amount: i8,
    },
    SwapBoost {
        source: Ident,
        target: Ident,
        stats: Vec<Stat>,
    },
    InvertBoost(Ident),
    ClearBoost(Ident),
    ClearAllBoost,
    ClearPositiveBoost(Ident),
    ClearNegativeBoost(Ident),
    CopyBoost {
        source: Ident,
        target: Ident,
    },
    Weather {
        weather: String,
        upkeep: bool,
    },
    FieldStart(String),
    FieldEnd(String),
    SideStart {
        side: Side,
        condition: String,
    },
    SideEnd {
        side: Side,
        condition: String,
    },
    SwapSideConditions,
    VolatileStart {
        ident: Ident,
        effect: String,
        /// Extra field, e.g. the new typing for `typechange`
        detail: Option<String>,
    },
    VolatileEnd {
        ident: Ident,
        effect: String,
    },
    Item {
        ident: Ident,
        item: String,
        from: Option<String>,
    },
    EndItem {
        ident: Ident,
        item: String,
        from: Option<String>,
        eat: bool,
    },
    Ability {
        ident: Ident,
        ability: String,
        from: Option<String>,
    },
    EndAbility(Ident),
    Transform {
        ident: Ident,
        /// Usually the identifier of the creature copied
        into: String,
    },
    Mega {
        ident: Ident,
        stone: Option<String>,
    },
    Primal(Ident),
    Burst {
        ident: Ident,
        species: String,
    },
    ZPower(Ident),
    Terastallize {
        ident: Ident,
        tera_type: String,
    },
    Activate {
        ident: Option<Ident>,
        effect: String,
    },
    MustRecharge(Ident),
    Prepare {
        ident: Ident,
        move_name: String,
    },
    SingleTurn {
        ident: Ident,
        effect: String,
    },
    SingleMove {
        ident: Ident,
        effect: String,
    },
    HitCount {
        ident: Ident,
        count: u8,
    },
    Crit(Ident),
    SuperEffective(Ident),
    Resisted(Ident),
    Immune(Ident),
    /// Informational lines with no state effect (`-hint`, `-message`, `-fail`, ...)
    Notice {
        kind: String,
        text: String,
    },

    Raw(String),
}

impl ServerMessage {
    /// Lines that describe the match rather than the battle state
    pub fn is_metadata(&self) -> bool {
        matches!(
            self,
            ServerMessage::Player { .. }
                | ServerMessage::TeamSize { .. }
                | ServerMessage::GameType(_)
                | ServerMessage::Gen(_)
                | ServerMessage::Tier(_)
                | ServerMessage::Rated(_)
                | ServerMessage::Rule(_)
                | ServerMessage::ClearPoke
                | ServerMessage::Poke { .. }
                | ServerMessage::TeamPreview(_)
                | ServerMessage::Start
                | ServerMessage::Request(_)
                | ServerMessage::Inactive(_)
                | ServerMessage::InactiveOff(_)
                | ServerMessage::Error(_)
                | ServerMessage::Notice { .. }
                | ServerMessage::Raw(_)
        )
    }

    /// Battle-ending lines
    pub fn is_terminal(&self) -> bool {
        matches!(self, ServerMessage::Win(_) | ServerMessage::Tie)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ServerFrame {
    pub room_id: Option<String>,
    pub messages: Vec<ServerMessage>,
}

/// Parse a complete frame into structured messages.
///
/// A frame may start with `>ROOMID`; every following non-empty line is one message.
pub fn parse_server_frame(frame: &str) -> Result<ServerFrame> {
    if frame.trim().is_empty() {
        return Err(ParseError::EmptyMessage.into());
    }

    let mut lines = frame.lines().peekable();
    let room_id = lines
        .peek()
        .and_then(|first| first.strip_prefix('>'))
        .map(|room| room.trim().to_string());
    if room_id.is_some() {
        lines.next();
    }

    let messages = lines
        .filter(|line| !line.trim().is_empty())
        .map(parse_server_message)
        .collect::<Result<Vec<_>>>()?;

    Ok(ServerFrame { room_id, messages })
}

/// Parse a single line from the server into a ServerMessage
pub fn parse_server_message(line: &str) -> Result<ServerMessage> {
    let line = line.trim_end_matches(['\r', '\n']);

    if line.trim().is_empty() {
        return Ok(ServerMessage::Raw(String::new()));
    }

    if !line.starts_with('|') {
        return Ok(ServerMessage::Raw(line.to_string()));
    }

    let parts: Vec<&str> = line.split('|').collect();
    if parts.len() < 2 {
        return Ok(ServerMessage::Raw(line.to_string()));
    }

    match parts[1] {
        // Initialization
        "player" => init::parse_player(&parts),
        "teamsize" => init::parse_teamsize(&parts),
        "gametype" => init::parse_gametype(&parts),
        "gen" => init::parse_gen(&parts),
        "tier" => init::parse_tier(&parts),
        "rated" => init::parse_rated(&parts),
        "rule" => init::parse_rule(&parts),
        "clearpoke" => Ok(ServerMessage::ClearPoke),
        "poke" => init::parse_poke(&parts),
        "teampreview" => init::parse_teampreview(&parts),
        "start" => Ok(ServerMessage::Start),

        // Progress
        "request" => progress::parse_request(&parts),
        "inactive" => progress::parse_inactive(&parts),
        "inactiveoff" => progress::parse_inactiveoff(&parts),
        "upkeep" => Ok(ServerMessage::Upkeep),
        "turn" => progress::parse_turn(&parts),
        "win" => progress::parse_win(&parts),
        "tie" => Ok(ServerMessage::Tie),
        "error" => progress::parse_error(&parts),

        // Major actions
        "move" => major::parse_move(&parts),
        "switch" | "drag" | "replace" | "detailschange" => major::parse_entrance(&parts),
        "-formechange" => major::parse_formechange(&parts),
        "swap" => major::parse_swap(&parts),
        "cant" => major::parse_cant(&parts),
        "faint" => major::parse_faint(&parts),

        // Minor actions
        "-damage" | "-heal" | "-sethp" => minor::parse_hp_change(&parts),
        "-status" => minor::parse_status(&parts),
        "-curestatus" => minor::parse_curestatus(&parts),
        "-cureteam" => minor::parse_ident_only(&parts, ServerMessage::CureTeam),
        "-boost" | "-unboost" | "-setboost" => minor::parse_stat_change(&parts),
        "-swapboost" => minor::parse_swapboost(&parts),
        "-invertboost" => minor::parse_ident_only(&parts, ServerMessage::InvertBoost),
        "-clearboost" => minor::parse_ident_only(&parts, ServerMessage::ClearBoost),
        "-clearallboost" => Ok(ServerMessage::ClearAllBoost),
        "-clearpositiveboost" => minor::parse_clearpositiveboost(&parts),
        "-clearnegativeboost" => {
            minor::parse_ident_only(&parts, ServerMessage::ClearNegativeBoost)
        }
        "-copyboost" => minor::parse_copyboost(&parts),
        "-weather" => minor::parse_weather(&parts),
        "-fieldstart" | "-fieldend" => minor::parse_field(&parts),
        "-sidestart" | "-sideend" => minor::parse_side_condition(&parts),
        "-swapsideconditions" => Ok(ServerMessage::SwapSideConditions),
        "-start" | "-end" => minor::parse_volatile(&parts),
        "-item" => minor::parse_item(&parts),
        "-enditem" => minor::parse_enditem(&parts),
        "-ability" => minor::parse_ability(&parts),
        "-endability" => minor::parse_ident_only(&parts, ServerMessage::EndAbility),
        "-transform" => minor::parse_transform(&parts),
        "-mega" => minor::parse_mega(&parts),
        "-primal" => minor::parse_ident_only(&parts, ServerMessage::Primal),
        "-burst" => minor::parse_burst(&parts),
        "-zpower" => minor::parse_ident_only(&parts, ServerMessage::ZPower),
        "-terastallize" => minor::parse_terastallize(&parts),
        "-activate" => minor::parse_activate(&parts),
        "-mustrecharge" => minor::parse_ident_only(&parts, ServerMessage::MustRecharge),
        "-prepare" => minor::parse_prepare(&parts),
        "-singleturn" | "-singlemove" => minor::parse_single(&parts),
        "-hitcount" => minor::parse_hitcount(&parts),
        "-crit" => minor::parse_ident_only(&parts, ServerMessage::Crit),
        "-supereffective" => minor::parse_ident_only(&parts, ServerMessage::SuperEffective),
        "-resisted" => minor::parse_ident_only(&parts, ServerMessage::Resisted),
        "-immune" => minor::parse_ident_only(&parts, ServerMessage::Immune),
        "-fail" | "-block" | "-notarget" | "-miss" | "-hint" | "-message" | "-center"
        | "-combine" | "-nothing" | "-waiting" | "-zbroken" => minor::parse_notice(&parts),

        _ => Ok(ServerMessage::Raw(line.to_string())),
    }
}
