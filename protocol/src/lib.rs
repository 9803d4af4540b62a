//! Wire types for the Pokemon Showdown battle protocol.
//!
//! The server side of the protocol is a stream of `|`-delimited lines, optionally
//! grouped into frames that start with `>room-id`. [`parse_server_message`] turns a
//! single line into a [`ServerMessage`]; anything the parser does not recognise comes
//! back as [`ServerMessage::Raw`] so newer server versions never break a client.
//!
//! The client side is a handful of slash commands, see [`ClientCommand`].

use thiserror::Error;

pub mod client;
pub mod server;

pub use client::{ClientCommand, ClientMessage};
pub use server::{
    ActiveSlot, BattleRequest, Details, GameType, HpStatus, Ident, MaxMoveSlot, MaxMoves,
    MoveSlot, Player, RequestKind, RequestPokemon, RequestSide, ServerFrame, ServerMessage, Side,
    Stat, StatTable, ZMoveInfo, parse_server_frame, parse_server_message, to_id,
};

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("Invalid message format: {0}")]
    InvalidFormat(String),

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Empty message")]
    EmptyMessage,
}
