use crate::hand::landmark::{HandSample, Landmark};
use crate::rig::{BoneMap, JointSource};

/// リグのボーン群を21個の正規化ランドマークへ変換する
///
/// 各ボーンのワールド位置を手首のローカル座標系に移し
/// （手首の並進・回転を除去）、受信側の座標規約に合わせて
/// Y成分を反転する。どのボーンがどのスロットに入るかは
/// BoneMap が決める。テーブルにないボーンは無視される
pub struct LandmarkNormalizer {
    map: BoneMap,
}

impl LandmarkNormalizer {
    pub fn new(map: BoneMap) -> Self {
        Self { map }
    }

    /// スナップショットを正規化して sample に書き込む
    /// 手首ボーンが見つからない場合は false（このtickは not-ready）
    pub fn normalize(&self, source: &dyn JointSource, sample: &mut HandSample) -> bool {
        let wrist = match source.joint(self.map.wrist_bone()) {
            Some(w) => w,
            None => return false,
        };

        sample.world_wrist = [wrist.position.x, wrist.position.y, wrist.position.z];

        let to_local = wrist.isometry().inverse();
        for (bone, index) in self.map.entries() {
            if let Some(joint) = source.joint(*bone) {
                let local = to_local.transform_point(&joint.position);
                // 受信側はY-down規約のため反転
                sample.landmarks[*index as usize] = Landmark::new(local.x, -local.y, local.z);
            }
        }
        true
    }
}
