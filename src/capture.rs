//! Frame capture bridge
//!
//! The simulation never renders inline: after a batch it hands an immutable
//! [`SceneSnapshot`] to a [`CaptureBridge`] and suspends on the returned
//! receiver until the frame bytes arrive (or the caller's timeout fires).
//! The bundled [`BoardRenderer`] draws a headless top-down PPM frame and
//! resolves the receiver exactly once per request.

use tokio::sync::oneshot;

use crate::core::turn::TurnEngine;

/// An immutable copy of everything a renderer needs, taken while the
/// simulation still owns the scene. Nothing mutable crosses to the capture
/// side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SceneSnapshot {
    pub width: u32,
    pub height: u32,
    /// On-board objects only: cell position plus display color.
    pub cells: Vec<CellSprite>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellSprite {
    pub x: i32,
    pub z: i32,
    pub color: String,
}

impl SceneSnapshot {
    pub fn of(engine: &TurnEngine) -> Self {
        let cells = engine
            .objects()
            .iter()
            .filter(|o| o.state().on_board)
            .map(|o| CellSprite {
                x: o.state().x,
                z: o.state().z,
                color: o.color().to_string(),
            })
            .collect();
        Self {
            width: engine.board().width(),
            height: engine.board().height(),
            cells,
        }
    }
}

/// Asynchronous frame source. Implementations resolve the returned receiver
/// exactly once with the frame bytes; they must never block the caller.
pub trait CaptureBridge: Send + Sync {
    fn request_frame(&self, scene: SceneSnapshot) -> oneshot::Receiver<Vec<u8>>;
}

/// Pixels per board cell in rendered frames.
const CELL_PX: u32 = 16;

/// Headless renderer: one binary PPM (P6) frame per request, top-down,
/// one solid square per on-board object. Row 0 of the image is the top of
/// the board (highest z), matching how a viewer reads the grid.
pub struct BoardRenderer;

impl BoardRenderer {
    pub fn render(scene: &SceneSnapshot) -> Vec<u8> {
        let w = scene.width as usize * CELL_PX as usize;
        let h = scene.height as usize * CELL_PX as usize;
        let mut frame = format!("P6\n{w} {h}\n255\n").into_bytes();
        let header = frame.len();
        frame.resize(header + w * h * 3, 0xf0);

        for sprite in &scene.cells {
            if sprite.x < 0 || sprite.z < 0 {
                continue;
            }
            let (cx, cz) = (sprite.x as u32, sprite.z as u32);
            if cx >= scene.width || cz >= scene.height {
                continue;
            }
            let (r, g, b) = color_rgb(&sprite.color);
            let cell = CELL_PX as usize;
            let top = (scene.height - 1 - cz) as usize * cell;
            for py in top..top + cell {
                for px in cx as usize * cell..(cx as usize + 1) * cell {
                    let at = header + (py * w + px) * 3;
                    frame[at] = r;
                    frame[at + 1] = g;
                    frame[at + 2] = b;
                }
            }
        }
        frame
    }
}

impl CaptureBridge for BoardRenderer {
    fn request_frame(&self, scene: SceneSnapshot) -> oneshot::Receiver<Vec<u8>> {
        let (tx, rx) = oneshot::channel();
        let _ = tx.send(Self::render(&scene));
        rx
    }
}

fn color_rgb(color: &str) -> (u8, u8, u8) {
    match color {
        "red" => (0xd0, 0x30, 0x30),
        "green" => (0x30, 0xa0, 0x40),
        "blue" => (0x30, 0x50, 0xc0),
        "yellow" => (0xd0, 0xc0, 0x30),
        "orange" => (0xe0, 0x80, 0x20),
        "purple" => (0x80, 0x40, 0xa0),
        "white" => (0xff, 0xff, 0xff),
        "black" => (0x20, 0x20, 0x20),
        _ => (0x80, 0x80, 0x80),
    }
}

/// A capture bridge whose frames never arrive; drives timeout paths in
/// tests. Senders are parked internally so the receivers pend forever
/// instead of erroring out.
pub struct StalledCapture {
    hold: std::sync::Mutex<Vec<oneshot::Sender<Vec<u8>>>>,
}

impl StalledCapture {
    pub fn new() -> Self {
        Self {
            hold: std::sync::Mutex::new(Vec::new()),
        }
    }
}

impl Default for StalledCapture {
    fn default() -> Self {
        Self::new()
    }
}

impl CaptureBridge for StalledCapture {
    fn request_frame(&self, _scene: SceneSnapshot) -> oneshot::Receiver<Vec<u8>> {
        let (tx, rx) = oneshot::channel();
        if let Ok(mut hold) = self.hold.lock() {
            hold.push(tx);
        }
        rx
    }
}
