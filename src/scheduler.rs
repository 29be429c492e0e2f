//! マルチレート送信ループ
//!
//! 高頻度のハンドサンプリングと低頻度の画面キャプチャを
//! 同一クロックで駆動する。キャプチャ周期はプライマリtick数に
//! 一度だけ換算され、Ntickごとにキャプチャが走る

use anyhow::Result;
use log::{debug, warn};
use std::time::Duration;

use crate::capture::FrameCapture;
use crate::client::{SendOutcome, StreamClient};
use crate::hand::HandSampler;
use crate::payload::PayloadBuilder;
use crate::rig::JointSource;

/// キャプチャ周期をプライマリtick数に換算する
/// capture_hz は最低1Hzに切り上げ、結果は最低1tick
pub fn capture_interval_ticks(primary_hz: f32, capture_hz: f32) -> u64 {
    let capture = if capture_hz <= 0.0 { 1.0 } else { capture_hz };
    let ticks = (primary_hz / capture).round() as i64;
    ticks.max(1) as u64
}

pub struct StreamScheduler {
    interval: Duration,
    capture_every: u64,
    tick: u64,
}

impl StreamScheduler {
    pub fn new(hand_rate_hz: f32, capture_rate_hz: f32) -> Self {
        let rate = hand_rate_hz.max(0.001);
        Self {
            interval: Duration::from_secs_f64(1.0 / rate as f64),
            capture_every: capture_interval_ticks(hand_rate_hz, capture_rate_hz),
            tick: 0,
        }
    }

    pub fn capture_every(&self) -> u64 {
        self.capture_every
    }

    /// 送信ループ本体。接続がOpenである間だけ回る
    ///
    /// tickごとに: レート待ち → 両手サンプリング → どちらも
    /// not-readyならスキップ → Ntick目ならキャプチャ（完了まで
    /// ブロック）→ ペイロード組み立て → 送信。接続断をsendか
    /// is_open()で観測したら以降の送信なしに抜ける。再接続は
    /// 行わない（外部ポリシー）
    pub async fn run<L, R, C>(
        &mut self,
        client: &mut StreamClient,
        left_source: &L,
        right_source: &R,
        left: &mut HandSampler,
        right: &mut HandSampler,
        capture: &mut C,
    ) -> Result<()>
    where
        L: JointSource,
        R: JointSource,
        C: FrameCapture,
    {
        while client.is_open() {
            tokio::time::sleep(self.interval).await;

            left.sample(left_source);
            right.sample(right_source);

            // 片手でも有効なら送る。両方not-readyならこのtickはスキップ
            if !left.is_ready() && !right.is_ready() {
                debug!("tick skipped: no hand ready");
                continue;
            }

            let mut builder = PayloadBuilder::new(left.current(), right.current());

            if self.tick % self.capture_every == 0 {
                // キャプチャ完了を待ってから送信する（ペイロードに同梱するため）
                match capture.capture().await {
                    Ok(Some(frame)) => {
                        debug!(
                            "capture tick {}: {}x{} {}KB",
                            self.tick,
                            frame.width,
                            frame.height,
                            frame.jpeg.len() / 1024
                        );
                        builder = builder.screen_capture(&frame.jpeg);
                    }
                    Ok(None) => debug!("capture tick {}: no frame available", self.tick),
                    Err(e) => warn!("capture failed: {e:#}"),
                }
            }

            let json = builder.build().to_json()?;
            if client.send(&json).await == SendOutcome::Dropped {
                warn!("dropped sample: connection no longer open");
            }
            self.tick += 1;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::FramebufferCapture;
    use crate::client::{message_stream, StreamClient};
    use crate::payload::GesturePayload;
    use crate::rig::{BoneId, BoneMap, JointPose, RigSnapshot};
    use futures::StreamExt;
    use tokio::net::TcpListener;

    #[test]
    fn test_capture_interval_derivation() {
        assert_eq!(capture_interval_ticks(20.0, 5.0), 4);
        assert_eq!(capture_interval_ticks(20.0, 7.0), 3);
        assert_eq!(capture_interval_ticks(20.0, 20.0), 1);
    }

    #[test]
    fn test_capture_interval_clamped_to_one() {
        // キャプチャレートがプライマリを超えても毎tickが下限
        assert_eq!(capture_interval_ticks(20.0, 100.0), 1);
        // 0以下は1Hz扱い
        assert_eq!(capture_interval_ticks(20.0, 0.0), 20);
        assert_eq!(capture_interval_ticks(20.0, -3.0), 20);
    }

    fn tracked_rig() -> RigSnapshot {
        let mut rig = RigSnapshot::new();
        rig.set_joint(BoneId::Wrist, JointPose::from_position(0.0, 1.0, 0.0));
        rig.set_joint(BoneId::IndexTip, JointPose::from_position(0.02, 1.05, -0.01));
        rig.set_tracked(true);
        rig
    }

    /// エンドツーエンド: 高レートで回してキャプチャtickの間隔と
    /// フィールドの有無を確認し、サーバ切断でループが止まること
    #[tokio::test]
    async fn test_run_sends_payloads_and_halts_on_close() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap().to_string();

        let server = tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            let mut framed = message_stream(stream);
            let mut payloads = Vec::new();
            for _ in 0..3 {
                let bytes = framed.next().await.unwrap().unwrap();
                let payload: GesturePayload = serde_json::from_slice(&bytes).unwrap();
                payloads.push(payload);
            }
            // 3送信を受けたら切断。クライアント側はループを抜けるはず
            drop(framed);
            payloads
        });

        let (mut client, _rx) = StreamClient::connect(&addr).await.unwrap();

        let left_rig = tracked_rig();
        let right_rig = tracked_rig();
        let mut left = HandSampler::new(BoneMap::xr_hand());
        let mut right = HandSampler::new(BoneMap::xr_hand());
        left.initialize();
        right.initialize();

        // 100Hzハンド / 50Hzキャプチャ → 2tickごとにキャプチャ
        let mut scheduler = StreamScheduler::new(100.0, 50.0);
        assert_eq!(scheduler.capture_every(), 2);

        let mut capture = FramebufferCapture::new(8, 8, 50);
        scheduler
            .run(
                &mut client,
                &left_rig,
                &right_rig,
                &mut left,
                &mut right,
                &mut capture,
            )
            .await
            .unwrap();

        assert!(!client.is_open());

        let payloads = server.await.unwrap();
        // tick 0: キャプチャあり, tick 1: なし, tick 2: あり
        assert!(payloads[0].screen_capture.is_some(), "tick 0 should carry an image");
        assert!(payloads[1].screen_capture.is_none(), "tick 1 should not");
        assert!(payloads[2].screen_capture.is_some(), "tick 2 should carry an image");
        assert_eq!(payloads[0].left_hand.relative_landmarks.len(), 21);
    }

    /// 片手だけreadyでも送信される（両手とも固定スキーマ）
    #[tokio::test]
    async fn test_run_single_ready_hand_is_sufficient() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap().to_string();

        let server = tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            let mut framed = message_stream(stream);
            let bytes = framed.next().await.unwrap().unwrap();
            serde_json::from_slice::<GesturePayload>(&bytes).unwrap()
        });

        let (mut client, _rx) = StreamClient::connect(&addr).await.unwrap();

        // 左手のみトラッキング。右手は空のリグ
        let left_rig = tracked_rig();
        let right_rig = RigSnapshot::new();
        let mut left = HandSampler::new(BoneMap::xr_hand());
        let mut right = HandSampler::new(BoneMap::xr_hand());
        left.initialize();
        right.initialize();

        let mut scheduler = StreamScheduler::new(200.0, 1.0);
        let mut capture = crate::capture::NullCapture;

        // 1通receiveしたらサーバが消えるので、ループもやがて終わる
        let run = scheduler.run(
            &mut client,
            &left_rig,
            &right_rig,
            &mut left,
            &mut right,
            &mut capture,
        );
        let payload = tokio::select! {
            p = server => p.unwrap(),
            _ = run => panic!("run ended before server received a payload"),
        };

        // 右手はnever-validのゼロサンプルだが、スキーマは両手とも固定
        assert_eq!(payload.right_hand.relative_landmarks.len(), 21);
        assert!((payload.left_hand.world_wrist_root.y - 1.0).abs() < 1e-6);
    }
}
