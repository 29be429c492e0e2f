use crate::hand::landmark::HandSample;
use crate::hand::normalize::LandmarkNormalizer;
use crate::rig::{BoneMap, JointSource};

/// 片手分のサンプリング状態
///
/// HandSample をひとつ所有し、スケジューラのtickごとに
/// 正規化を実行して in-place で更新する。左右の手で
/// インスタンスを共有してはいけない
pub struct HandSampler {
    normalizer: LandmarkNormalizer,
    sample: HandSample,
    initialized: bool,
}

impl HandSampler {
    pub fn new(map: BoneMap) -> Self {
        Self {
            normalizer: LandmarkNormalizer::new(map),
            sample: HandSample::default(),
            initialized: false,
        }
    }

    /// 固定長コンテナの確保。sample() の前に一度だけ呼ぶこと
    /// 2回目以降の呼び出しは no-op
    pub fn initialize(&mut self) {
        if self.initialized {
            return;
        }
        self.sample = HandSample::default();
        self.initialized = true;
    }

    /// スケジューラのtickごとに1回呼ばれる
    /// 未初期化またはソースが非トラッキングなら即座に not-ready を立てて戻る
    pub fn sample(&mut self, source: &dyn JointSource) {
        if !self.initialized || !source.is_tracked() {
            self.sample.valid = false;
            return;
        }
        self.sample.valid = self.normalizer.normalize(source, &mut self.sample);
    }

    /// ソースが有効になって以降、少なくとも1回 sample() が成功していれば true
    pub fn is_ready(&self) -> bool {
        self.initialized && self.sample.valid
    }

    pub fn current(&self) -> &HandSample {
        &self.sample
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rig::{BoneId, JointPose, LandmarkIndex, RigSnapshot};

    fn tracked_rig() -> RigSnapshot {
        let mut rig = RigSnapshot::new();
        rig.set_joint(BoneId::Wrist, JointPose::from_position(0.0, 1.0, 0.0));
        rig.set_joint(BoneId::IndexTip, JointPose::from_position(0.02, 1.05, -0.01));
        rig.set_tracked(true);
        rig
    }

    #[test]
    fn test_sample_before_initialize_is_noop() {
        let mut sampler = HandSampler::new(BoneMap::xr_hand());
        sampler.sample(&tracked_rig());
        assert!(!sampler.is_ready());
    }

    #[test]
    fn test_sample_untracked_source() {
        let mut sampler = HandSampler::new(BoneMap::xr_hand());
        sampler.initialize();

        let mut rig = tracked_rig();
        rig.set_tracked(false);
        sampler.sample(&rig);
        assert!(!sampler.is_ready());
    }

    #[test]
    fn test_successful_sample_marks_ready() {
        let mut sampler = HandSampler::new(BoneMap::xr_hand());
        sampler.initialize();
        sampler.sample(&tracked_rig());
        assert!(sampler.is_ready());
        assert_eq!(sampler.current().world_wrist, [0.0, 1.0, 0.0]);
    }

    #[test]
    fn test_readiness_resets_when_source_lost() {
        let mut sampler = HandSampler::new(BoneMap::xr_hand());
        sampler.initialize();

        let mut rig = tracked_rig();
        sampler.sample(&rig);
        assert!(sampler.is_ready());

        // トラッキング喪失で not-ready に戻ること
        rig.set_tracked(false);
        sampler.sample(&rig);
        assert!(!sampler.is_ready());

        rig.set_tracked(true);
        sampler.sample(&rig);
        assert!(sampler.is_ready());
    }

    #[test]
    fn test_resampling_unchanged_snapshot_is_idempotent() {
        let mut sampler = HandSampler::new(BoneMap::xr_hand());
        sampler.initialize();

        let rig = tracked_rig();
        sampler.sample(&rig);
        let first = sampler.current().clone();
        sampler.sample(&rig);
        let second = sampler.current();

        assert_eq!(first.world_wrist, second.world_wrist);
        assert_eq!(first.valid, second.valid);
        for i in 0..LandmarkIndex::COUNT {
            assert_eq!(first.landmarks[i], second.landmarks[i], "landmark {i}");
        }
    }

    #[test]
    fn test_initialize_idempotent() {
        let mut sampler = HandSampler::new(BoneMap::xr_hand());
        sampler.initialize();
        sampler.sample(&tracked_rig());
        assert!(sampler.is_ready());

        // 再initializeで状態が壊れないこと
        sampler.initialize();
        assert!(sampler.is_ready());
    }
}
