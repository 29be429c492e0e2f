use crate::rig::LandmarkIndex;

/// 手首ローカル座標系の単一ランドマーク
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Landmark {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Landmark {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}

/// 片手分の正規化結果
/// 起動時に一度だけ確保され、以降はtickごとにin-placeで上書きされる
#[derive(Debug, Clone)]
pub struct HandSample {
    /// 手首のワールド座標（絶対位置の参照用）
    pub world_wrist: [f32; 3],
    /// 21ランドマーク、順序は LandmarkIndex 固定
    pub landmarks: [Landmark; LandmarkIndex::COUNT],
    /// 直近の sample() が成功したか
    pub valid: bool,
}

impl HandSample {
    pub fn get(&self, index: LandmarkIndex) -> &Landmark {
        &self.landmarks[index as usize]
    }
}

impl Default for HandSample {
    fn default() -> Self {
        Self {
            world_wrist: [0.0; 3],
            landmarks: [Landmark::default(); LandmarkIndex::COUNT],
            valid: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_sample_invalid() {
        let sample = HandSample::default();
        assert!(!sample.valid);
        assert_eq!(sample.landmarks.len(), 21);
        assert_eq!(sample.world_wrist, [0.0; 3]);
    }

    #[test]
    fn test_get_by_index() {
        let mut sample = HandSample::default();
        sample.landmarks[LandmarkIndex::ThumbTip as usize] = Landmark::new(0.1, 0.2, 0.3);
        let tip = sample.get(LandmarkIndex::ThumbTip);
        assert_eq!(tip.x, 0.1);
        assert_eq!(tip.y, 0.2);
        assert_eq!(tip.z, 0.3);
    }
}
