use nalgebra::{Isometry3, Point3, Translation3, UnitQuaternion};
use std::collections::HashMap;

/// 片手のスケルトンを構成するボーン識別子
/// XRハンドトラッキング互換の命名。リグによっては一部のボーンしか提供されない
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BoneId {
    Wrist,
    Palm,
    ThumbMetacarpal,
    ThumbProximal,
    ThumbDistal,
    ThumbTip,
    IndexMetacarpal,
    IndexProximal,
    IndexIntermediate,
    IndexDistal,
    IndexTip,
    MiddleMetacarpal,
    MiddleProximal,
    MiddleIntermediate,
    MiddleDistal,
    MiddleTip,
    RingMetacarpal,
    RingProximal,
    RingIntermediate,
    RingDistal,
    RingTip,
    LittleMetacarpal,
    LittleProximal,
    LittleIntermediate,
    LittleDistal,
    LittleTip,
}

/// 単一ボーンのワールド姿勢（位置 + 回転）
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JointPose {
    pub position: Point3<f32>,
    pub rotation: UnitQuaternion<f32>,
}

impl JointPose {
    pub fn new(position: Point3<f32>, rotation: UnitQuaternion<f32>) -> Self {
        Self { position, rotation }
    }

    /// 回転なしの姿勢
    pub fn from_position(x: f32, y: f32, z: f32) -> Self {
        Self {
            position: Point3::new(x, y, z),
            rotation: UnitQuaternion::identity(),
        }
    }

    pub fn isometry(&self) -> Isometry3<f32> {
        Isometry3::from_parts(Translation3::from(self.position.coords), self.rotation)
    }
}

/// リグからボーン姿勢を取得する能力インターフェース
/// リグ本体（アニメーションシステム）は外部コラボレータであり、
/// コアはtickごとに読み取り専用スナップショットとして参照するのみ
pub trait JointSource {
    /// トラッキング中かつデータが有効か
    fn is_tracked(&self) -> bool;

    /// 指定ボーンのワールド姿勢。リグが提供しないボーンは None
    fn joint(&self, id: BoneId) -> Option<JointPose>;
}

/// メモリ上のリグスナップショット
/// テストとデモ用の具象実装。実機ではトラッキングランタイムが
/// フレームごとに内容を更新する
#[derive(Debug, Clone, Default)]
pub struct RigSnapshot {
    joints: HashMap<BoneId, JointPose>,
    tracked: bool,
}

impl RigSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_joint(&mut self, id: BoneId, pose: JointPose) {
        self.joints.insert(id, pose);
    }

    pub fn set_tracked(&mut self, tracked: bool) {
        self.tracked = tracked;
    }

    pub fn clear(&mut self) {
        self.joints.clear();
        self.tracked = false;
    }
}

impl JointSource for RigSnapshot {
    fn is_tracked(&self) -> bool {
        self.tracked
    }

    fn joint(&self, id: BoneId) -> Option<JointPose> {
        self.joints.get(&id).copied()
    }
}
