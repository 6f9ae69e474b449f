//! TCP server for remote agents
//!
//! Accepts connections and relays command batches into the simulation task.
//! Uses tokio for async networking. Two transport modes:
//!
//! - packet (default): line-delimited JSON [`DataPacket`]s, frames travel
//!   base64-encoded in `payload`
//! - raw legacy: unframed UTF-8 reads, one command per read, `"close"`
//!   terminates, replies are raw frame bytes with no header
//!
//! Replies are written before the next batch is read, so a connection never
//! has more than one batch in flight.

use std::net::SocketAddr;

use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{mpsc, oneshot};

use crate::adapter::protocol::{
    decode_payload, DataPacket, CMD_ERROR, CMD_HANDSHAKE, CMD_INTERACTION, CMD_SCREENSHOT,
    CMD_SETUP,
};
use crate::adapter::runtime::{SimRequest, TurnReply};
use crate::core::config::PuzzleConfig;

/// How command batches and frames travel on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportMode {
    Packet,
    RawLegacy,
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub mode: TransportMode,
    pub capture_timeout_ms: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 13000,
            mode: TransportMode::Packet,
            capture_timeout_ms: 5000,
        }
    }
}

impl ServerConfig {
    /// Create from environment variables.
    pub fn from_env() -> Self {
        use std::env;

        let defaults = Self::default();
        let host = env::var("PUZZLE_HOST").unwrap_or(defaults.host);
        let port = env::var("PUZZLE_PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.port);
        let mode = match env::var("PUZZLE_MODE").as_deref() {
            Ok("raw") => TransportMode::RawLegacy,
            _ => TransportMode::Packet,
        };
        let capture_timeout_ms = env::var("PUZZLE_CAPTURE_TIMEOUT_MS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.capture_timeout_ms);

        Self {
            host,
            port,
            mode,
            capture_timeout_ms,
        }
    }
}

/// Start the TCP server. Runs until the listener fails.
pub async fn run_server(
    config: ServerConfig,
    sim_tx: mpsc::Sender<SimRequest>,
    ready_tx: Option<oneshot::Sender<SocketAddr>>,
) -> anyhow::Result<()> {
    let listener = TcpListener::bind((config.host.as_str(), config.port)).await?;
    let bound = listener.local_addr()?;
    println!("[Server] listening on {} ({:?} mode)", bound, config.mode);
    if let Some(tx) = ready_tx {
        let _ = tx.send(bound);
    }

    let mut client_id_counter = 0usize;
    loop {
        let (socket, addr) = listener.accept().await?;
        client_id_counter += 1;
        let client_id = client_id_counter;
        println!("[Server] client {} connected from {}", client_id, addr);

        let sim_tx = sim_tx.clone();
        let mode = config.mode;
        tokio::spawn(async move {
            let result = match mode {
                TransportMode::Packet => handle_packet_client(socket, client_id, sim_tx).await,
                TransportMode::RawLegacy => handle_raw_client(socket, client_id, sim_tx).await,
            };
            if let Err(e) = result {
                eprintln!("[Server] client {} error: {}", client_id, e);
            }
            println!("[Server] client {} disconnected", client_id);
        });
    }
}

async fn request(
    sim_tx: &mpsc::Sender<SimRequest>,
    build: impl FnOnce(oneshot::Sender<TurnReply>) -> SimRequest,
) -> anyhow::Result<TurnReply> {
    let (reply_tx, reply_rx) = oneshot::channel();
    sim_tx
        .send(build(reply_tx))
        .await
        .map_err(|_| anyhow::anyhow!("simulation task is gone"))?;
    reply_rx
        .await
        .map_err(|_| anyhow::anyhow!("simulation dropped the reply"))
}

/// Line-delimited JSON packet loop.
async fn handle_packet_client(
    socket: TcpStream,
    client_id: usize,
    sim_tx: mpsc::Sender<SimRequest>,
) -> anyhow::Result<()> {
    let peer = format!("client-{client_id}");
    let (reader, mut writer) = tokio::io::split(socket);
    let mut reader = BufReader::new(reader);

    write_packet(&mut writer, &DataPacket::handshake(&peer)).await?;

    let mut line = String::new();
    loop {
        line.clear();
        let bytes_read = reader.read_line(&mut line).await?;
        if bytes_read == 0 {
            break;
        }
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let packet: DataPacket = match serde_json::from_str(trimmed) {
            Ok(p) => p,
            Err(e) => {
                let error = DataPacket::error(&peer, &format!("malformed packet: {e}"));
                write_packet(&mut writer, &error).await?;
                continue;
            }
        };

        match packet.command.as_str() {
            CMD_INTERACTION => {
                let batch = packet.messages;
                let reply = request(&sim_tx, |tx| SimRequest::Turn { batch, reply: tx }).await?;
                let out = if reply.capture_timed_out {
                    DataPacket::error(&peer, "frame capture timed out")
                } else {
                    DataPacket::action_ack(&peer, &reply.ack, reply.frame.as_deref())
                };
                write_packet(&mut writer, &out).await?;
            }
            CMD_SCREENSHOT => {
                let reply = request(&sim_tx, |tx| SimRequest::Frame { reply: tx }).await?;
                let out = match reply.frame {
                    Some(frame) => DataPacket::screenshot(&peer, &frame),
                    None => DataPacket::error(&peer, "frame capture timed out"),
                };
                write_packet(&mut writer, &out).await?;
            }
            CMD_SETUP => {
                let out = handle_setup(&sim_tx, &peer, &packet).await?;
                write_packet(&mut writer, &out).await?;
            }
            CMD_HANDSHAKE => {
                write_packet(&mut writer, &DataPacket::handshake(&peer)).await?;
            }
            other => {
                let error = DataPacket::error(&peer, &format!("unknown command '{other}'"));
                write_packet(&mut writer, &error).await?;
            }
        }
    }
    Ok(())
}

/// Decode a Setup packet's configuration (base64 payload, or the bare
/// `message` field) and hand it to the simulation.
async fn handle_setup(
    sim_tx: &mpsc::Sender<SimRequest>,
    peer: &str,
    packet: &DataPacket,
) -> anyhow::Result<DataPacket> {
    let json = if packet.has_payload() {
        match decode_payload(&packet.payload) {
            Ok(bytes) => match String::from_utf8(bytes) {
                Ok(text) => text,
                Err(_) => {
                    return Ok(DataPacket::error(peer, "setup payload is not UTF-8"));
                }
            },
            Err(e) => {
                return Ok(DataPacket::error(peer, &format!("setup payload: {e}")));
            }
        }
    } else {
        packet.message.clone()
    };

    let config = match PuzzleConfig::from_json(&json) {
        Ok(c) => c,
        Err(e) => return Ok(DataPacket::error(peer, &e.to_string())),
    };

    let (reply_tx, reply_rx) = oneshot::channel();
    sim_tx
        .send(SimRequest::Setup {
            config: Box::new(config),
            reply: reply_tx,
        })
        .await
        .map_err(|_| anyhow::anyhow!("simulation task is gone"))?;
    let setup = reply_rx
        .await
        .map_err(|_| anyhow::anyhow!("simulation dropped the reply"))?;

    Ok(match setup.result {
        Ok(()) => DataPacket::setup_loaded(peer),
        Err(e) => DataPacket::error(peer, &e),
    })
}

async fn write_packet<W: AsyncWriteExt + Unpin>(
    writer: &mut W,
    packet: &DataPacket,
) -> anyhow::Result<()> {
    let mut bytes = serde_json::to_vec(packet)?;
    bytes.push(b'\n');
    writer.write_all(&bytes).await?;
    writer.flush().await?;
    if packet.command == CMD_ERROR {
        eprintln!("[Server] -> {}: {}", packet.to, packet.message);
    }
    Ok(())
}

/// Raw legacy loop: each read is one command, `"close"` ends the
/// connection, replies are unframed frame bytes.
async fn handle_raw_client(
    mut socket: TcpStream,
    client_id: usize,
    sim_tx: mpsc::Sender<SimRequest>,
) -> anyhow::Result<()> {
    let mut buffer = vec![0u8; 4096];
    loop {
        let bytes_read = socket.read(&mut buffer).await?;
        if bytes_read == 0 {
            break;
        }
        let text = String::from_utf8_lossy(&buffer[..bytes_read]);
        let command = text.trim();
        if command.is_empty() {
            continue;
        }
        if command == "close" {
            break;
        }
        println!("[Server] client {} raw command: {}", client_id, command);

        let batch = vec![command.to_string()];
        let reply = request(&sim_tx, |tx| SimRequest::Turn { batch, reply: tx }).await?;
        if let Some(frame) = reply.frame {
            socket.write_all(&frame).await?;
            socket.flush().await?;
        } else {
            eprintln!("[Server] client {} got no frame, skipping reply", client_id);
        }
    }
    Ok(())
}
