//! Wire payload for the gesture backend.
//!
//! One JSON object per tick: both hands plus an optional base64 JPEG on
//! capture ticks. A builder produces an immutable payload per tick so no
//! transient field has to be cleared between sends.

use anyhow::{Context, Result};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::hand::HandSample;
use crate::rig::LandmarkIndex;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct WirePoint {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

/// One hand as the backend expects it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HandFrame {
    pub world_wrist_root: WirePoint,
    pub relative_landmarks: [WirePoint; LandmarkIndex::COUNT],
}

impl HandFrame {
    pub fn from_sample(sample: &HandSample) -> Self {
        let [wx, wy, wz] = sample.world_wrist;
        let mut relative_landmarks = [WirePoint::default(); LandmarkIndex::COUNT];
        for (out, lm) in relative_landmarks.iter_mut().zip(sample.landmarks.iter()) {
            *out = WirePoint {
                x: lm.x,
                y: lm.y,
                z: lm.z,
            };
        }
        Self {
            world_wrist_root: WirePoint { x: wx, y: wy, z: wz },
            relative_landmarks,
        }
    }

    /// Save this frame as a timestamped JSON file (debugging convenience).
    pub fn save_to_dir(&self, dir: &Path, hand: &str) -> Result<PathBuf> {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("failed to create {}", dir.display()))?;
        let ts = chrono::Local::now().format("%Y%m%d_%H%M%S");
        let path = dir.join(format!("hand_landmarks_{hand}_{ts}.json"));
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(&path, json)
            .with_context(|| format!("failed to write {}", path.display()))?;
        Ok(path)
    }
}

/// The full per-tick message.
///
/// `screen_capture` is present only on capture ticks; it serializes as an
/// absent field (not an empty string) so the backend can tell "no image this
/// tick" apart from "empty image".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GesturePayload {
    pub left_hand: HandFrame,
    pub right_hand: HandFrame,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub screen_capture: Option<String>,
}

impl GesturePayload {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Builds one immutable payload per tick.
pub struct PayloadBuilder {
    left: HandFrame,
    right: HandFrame,
    screen_capture: Option<String>,
}

impl PayloadBuilder {
    pub fn new(left: &HandSample, right: &HandSample) -> Self {
        Self {
            left: HandFrame::from_sample(left),
            right: HandFrame::from_sample(right),
            screen_capture: None,
        }
    }

    /// Attach a compressed image; encoded to base64 here so the scheduler
    /// never handles encodings.
    pub fn screen_capture(mut self, jpeg: &[u8]) -> Self {
        self.screen_capture = Some(BASE64.encode(jpeg));
        self
    }

    pub fn build(self) -> GesturePayload {
        GesturePayload {
            left_hand: self.left,
            right_hand: self.right,
            screen_capture: self.screen_capture,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hand::Landmark;

    fn sample_with_tip() -> HandSample {
        let mut sample = HandSample::default();
        sample.world_wrist = [0.1, 0.2, 0.3];
        sample.landmarks[LandmarkIndex::IndexTip as usize] = Landmark::new(0.02, -0.05, -0.01);
        sample.valid = true;
        sample
    }

    #[test]
    fn test_hand_frame_has_21_landmarks() {
        let frame = HandFrame::from_sample(&sample_with_tip());
        assert_eq!(frame.relative_landmarks.len(), 21);
        assert_eq!(frame.world_wrist_root.x, 0.1);
        let tip = &frame.relative_landmarks[LandmarkIndex::IndexTip as usize];
        assert_eq!(tip.y, -0.05);
    }

    #[test]
    fn test_capture_field_omitted_when_absent() {
        let sample = sample_with_tip();
        let payload = PayloadBuilder::new(&sample, &sample).build();
        let json = payload.to_json().unwrap();
        assert!(!json.contains("screen_capture"), "json: {json}");
        assert!(json.contains("left_hand"));
        assert!(json.contains("right_hand"));
        assert!(json.contains("world_wrist_root"));
        assert!(json.contains("relative_landmarks"));
    }

    #[test]
    fn test_capture_field_base64_when_present() {
        let sample = sample_with_tip();
        let payload = PayloadBuilder::new(&sample, &sample)
            .screen_capture(&[0xFF, 0xD8, 0xFF, 0xE0])
            .build();
        let json = payload.to_json().unwrap();
        assert!(json.contains("screen_capture"));

        let parsed: GesturePayload = serde_json::from_str(&json).unwrap();
        let b64 = parsed.screen_capture.unwrap();
        assert!(!b64.is_empty());
        let decoded = BASE64.decode(b64.as_bytes()).unwrap();
        assert_eq!(decoded, vec![0xFF, 0xD8, 0xFF, 0xE0]);
    }

    #[test]
    fn test_payload_roundtrip_without_capture() {
        let sample = sample_with_tip();
        let payload = PayloadBuilder::new(&sample, &sample).build();
        let json = payload.to_json().unwrap();
        let parsed: GesturePayload = serde_json::from_str(&json).unwrap();
        assert!(parsed.screen_capture.is_none());
        let tip = &parsed.left_hand.relative_landmarks[LandmarkIndex::IndexTip as usize];
        assert_eq!(tip.x, 0.02);
    }

    #[test]
    fn test_save_to_dir() {
        let frame = HandFrame::from_sample(&sample_with_tip());
        let dir = std::env::temp_dir().join("gesture_stream_test_dump");
        let path = frame.save_to_dir(&dir, "left").unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("world_wrist_root"));
        std::fs::remove_file(path).ok();
    }
}
