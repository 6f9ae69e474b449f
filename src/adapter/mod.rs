//! Adapter module - remote control over TCP
//!
//! The transport side of the simulation: line-delimited JSON packets with
//! base64 frame payloads, plus a raw-socket compatibility mode. All scene
//! state stays behind the simulation task in [`runtime`]; the server only
//! exchanges immutable messages with it.

pub mod protocol;
pub mod runtime;
pub mod server;

pub use protocol::{decode_payload, encode_payload, DataPacket};
pub use runtime::{run_simulation, SetupReply, SimRequest, TurnReply};
pub use server::{run_server, ServerConfig, TransportMode};
