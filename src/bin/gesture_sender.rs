//! Demo sender: drives the full pipeline against a synthetic animated rig.
//!
//! In production the joint source is the tracking runtime; here a pair of
//! procedurally animated hands stands in so the sampler -> scheduler ->
//! client path can run end-to-end against `gesture_probe`.

use anyhow::Result;
use log::{error, info};
use nalgebra::{Point3, UnitQuaternion, Vector3};
use std::path::Path;
use std::time::Instant;

use gesture_stream::capture::FramebufferCapture;
use gesture_stream::client::{StreamClient, StreamEvent};
use gesture_stream::config::Config;
use gesture_stream::hand::HandSampler;
use gesture_stream::payload::HandFrame;
use gesture_stream::rig::{BoneId, BoneMap, JointPose, JointSource};
use gesture_stream::scheduler::StreamScheduler;

const CONFIG_PATH: &str = "gesture_stream.toml";

// ---------------------------------------------------------------------------
// Synthetic rig (demo only)
// ---------------------------------------------------------------------------

/// ゆっくり手を振る合成リグ。JointSourceの時間駆動実装
struct AnimatedHandRig {
    start: Instant,
    /// 左手は -1.0（X反転）
    mirror: f32,
    base: Point3<f32>,
}

impl AnimatedHandRig {
    fn left() -> Self {
        Self {
            start: Instant::now(),
            mirror: -1.0,
            base: Point3::new(-0.15, 1.2, 0.4),
        }
    }

    fn right() -> Self {
        Self {
            start: Instant::now(),
            mirror: 1.0,
            base: Point3::new(0.15, 1.2, 0.4),
        }
    }

    fn wrist_pose(&self, t: f32) -> JointPose {
        let position = self.base + Vector3::new(0.0, (t * 0.8).sin() * 0.05, 0.0);
        let rotation = UnitQuaternion::from_axis_angle(&Vector3::z_axis(), (t * 0.6).sin() * 0.3);
        JointPose::new(position, rotation)
    }

    /// 手首基準のローカルオフセット（メートル）
    /// 指は+z方向に伸び、curlで握り込む
    fn local_offset(id: BoneId, curl: f32) -> Option<Vector3<f32>> {
        use BoneId::*;
        // (指のX位置, 手首からのセグメント番号 0=付け根)
        let (x, segment) = match id {
            Wrist => return Some(Vector3::zeros()),
            ThumbMetacarpal => (0.030, 0),
            ThumbProximal => (0.045, 1),
            ThumbDistal => (0.055, 2),
            ThumbTip => (0.060, 3),
            IndexMetacarpal => (0.020, 0),
            IndexProximal => (0.020, 1),
            IndexIntermediate => (0.020, 2),
            IndexDistal => (0.020, 3),
            IndexTip => (0.020, 4),
            MiddleMetacarpal => (0.000, 0),
            MiddleProximal => (0.000, 1),
            MiddleIntermediate => (0.000, 2),
            MiddleDistal => (0.000, 3),
            MiddleTip => (0.000, 4),
            RingMetacarpal => (-0.020, 0),
            RingProximal => (-0.020, 1),
            RingIntermediate => (-0.020, 2),
            RingDistal => (-0.020, 3),
            RingTip => (-0.020, 4),
            LittleMetacarpal => (-0.040, 0),
            LittleProximal => (-0.040, 1),
            LittleIntermediate => (-0.040, 2),
            LittleDistal => (-0.040, 3),
            LittleTip => (-0.040, 4),
            Palm => return Some(Vector3::new(0.0, 0.0, 0.04)),
        };
        let reach = 0.03 + 0.025 * segment as f32;
        let bend = curl * 0.4 * segment as f32;
        Some(Vector3::new(x, -reach * bend.sin(), reach * bend.cos()))
    }
}

impl JointSource for AnimatedHandRig {
    fn is_tracked(&self) -> bool {
        true
    }

    fn joint(&self, id: BoneId) -> Option<JointPose> {
        let t = self.start.elapsed().as_secs_f32();
        let wrist = self.wrist_pose(t);
        if id == BoneId::Wrist {
            return Some(wrist);
        }
        let curl = (t * 1.5).sin() * 0.5 + 0.5;
        let local = Self::local_offset(id, curl)?;
        let local = Vector3::new(local.x * self.mirror, local.y, local.z);
        let world = wrist.isometry().transform_point(&Point3::from(local));
        Some(JointPose::new(world, wrist.rotation))
    }
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let config = Config::load_or_default(CONFIG_PATH);

    println!("Gesture Sender ({})", env!("GIT_VERSION"));
    println!("Backend: {}", config.network.addr);
    println!(
        "Hand rate: {} Hz / capture rate: {} Hz",
        config.stream.hand_rate_hz, config.stream.capture_rate_hz
    );
    println!(
        "Capture: {}x{} quality={}",
        config.capture.width, config.capture.height, config.capture.jpeg_quality
    );
    println!("Skeleton: {:?}", config.rig.skeleton);
    println!();

    let left_rig = AnimatedHandRig::left();
    let right_rig = AnimatedHandRig::right();

    let map = BoneMap::for_kind(config.rig.skeleton);
    let mut left = HandSampler::new(map.clone());
    let mut right = HandSampler::new(map);
    left.initialize();
    right.initialize();

    // サンプルJSONの保存（デバッグ用、設定時のみ）
    if let Some(dir) = &config.rig.dump_dir {
        left.sample(&left_rig);
        right.sample(&right_rig);
        for (sampler, hand) in [(&left, "left"), (&right, "right")] {
            if sampler.is_ready() {
                let path = HandFrame::from_sample(sampler.current()).save_to_dir(Path::new(dir), hand)?;
                println!("Saved {hand} sample: {}", path.display());
            }
        }
    }

    let (mut client, mut events) = StreamClient::connect(&config.network.addr).await?;
    println!("Connected to {}", config.network.addr);

    // Backend responses are advisory; log and nothing else.
    let event_logger = tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            match event {
                StreamEvent::Opened => info!("connection open"),
                StreamEvent::Message(text) => info!("backend: {text}"),
                StreamEvent::Error(e) => error!("connection error: {e}"),
                StreamEvent::Closed => {
                    info!("connection closed");
                    break;
                }
            }
        }
    });

    let mut scheduler =
        StreamScheduler::new(config.stream.hand_rate_hz, config.stream.capture_rate_hz);
    println!(
        "Streaming (capture every {} hand frames)",
        scheduler.capture_every()
    );

    let mut capture = FramebufferCapture::new(
        config.capture.width,
        config.capture.height,
        config.capture.jpeg_quality,
    );

    scheduler
        .run(
            &mut client,
            &left_rig,
            &right_rig,
            &mut left,
            &mut right,
            &mut capture,
        )
        .await?;

    client.close().await;
    event_logger.await.ok();
    println!("Shutting down...");
    Ok(())
}
