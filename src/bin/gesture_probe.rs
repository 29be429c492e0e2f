//! Local stand-in for the inference backend: accepts framed JSON payloads,
//! logs a running summary, and replies with advisory acks.
//!
//! Only imports from `gesture_stream::{client, payload}`. Everything else is
//! inline.

use anyhow::{Context, Result};
use bytes::Bytes;
use futures::{SinkExt, StreamExt};
use std::time::{Duration, Instant};
use tokio::net::{TcpListener, TcpStream};

use gesture_stream::client::message_stream;
use gesture_stream::payload::GesturePayload;

const DEFAULT_ADDR: &str = "127.0.0.1:8765";
const ACK_EVERY: u64 = 20;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let addr = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_ADDR.to_string());

    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    println!("Gesture Probe ({}) listening on {}", env!("GIT_VERSION"), addr);

    loop {
        let (stream, peer) = listener.accept().await?;
        println!("[probe] client connected: {peer}");
        tokio::spawn(handle_client(stream));
    }
}

async fn handle_client(stream: TcpStream) {
    let mut framed = message_stream(stream);
    let mut count: u64 = 0;
    let mut capture_count: u64 = 0;
    let mut report_timer = Instant::now();

    while let Some(frame) = framed.next().await {
        let bytes = match frame {
            Ok(b) => b,
            Err(e) => {
                eprintln!("[probe] read error: {e}");
                break;
            }
        };

        count += 1;
        match serde_json::from_slice::<GesturePayload>(&bytes) {
            Ok(payload) => {
                if let Some(b64) = &payload.screen_capture {
                    capture_count += 1;
                    println!("[probe] #{count}: screen capture ({}KB base64)", b64.len() / 1024);
                }
                if report_timer.elapsed() >= Duration::from_secs(1) {
                    let w = payload.left_hand.world_wrist_root;
                    println!(
                        "[probe] {count} payloads ({capture_count} with image) | left wrist [{:.2}, {:.2}, {:.2}]",
                        w.x, w.y, w.z
                    );
                    report_timer = Instant::now();
                }
            }
            Err(e) => eprintln!("[probe] bad payload: {e}"),
        }

        if count % ACK_EVERY == 0 {
            let ack = format!("ack {count}");
            if framed.send(Bytes::from(ack)).await.is_err() {
                break;
            }
        }
    }
    println!("[probe] client disconnected ({count} payloads total)");
}
