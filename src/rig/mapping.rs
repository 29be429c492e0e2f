use serde::Deserialize;

use super::joint::BoneId;

/// 正規化ランドマークの21スロット
/// 順序は受信側スキーマに固定: 手首、親指CMC→先端、以降は
/// 人差し指〜小指のMCP→先端
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(usize)]
pub enum LandmarkIndex {
    Wrist = 0,
    ThumbCmc = 1,
    ThumbMcp = 2,
    ThumbIp = 3,
    ThumbTip = 4,
    IndexMcp = 5,
    IndexPip = 6,
    IndexDip = 7,
    IndexTip = 8,
    MiddleMcp = 9,
    MiddlePip = 10,
    MiddleDip = 11,
    MiddleTip = 12,
    RingMcp = 13,
    RingPip = 14,
    RingDip = 15,
    RingTip = 16,
    LittleMcp = 17,
    LittlePip = 18,
    LittleDip = 19,
    LittleTip = 20,
}

impl LandmarkIndex {
    pub const COUNT: usize = 21;

    pub fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Self::Wrist),
            1 => Some(Self::ThumbCmc),
            2 => Some(Self::ThumbMcp),
            3 => Some(Self::ThumbIp),
            4 => Some(Self::ThumbTip),
            5 => Some(Self::IndexMcp),
            6 => Some(Self::IndexPip),
            7 => Some(Self::IndexDip),
            8 => Some(Self::IndexTip),
            9 => Some(Self::MiddleMcp),
            10 => Some(Self::MiddlePip),
            11 => Some(Self::MiddleDip),
            12 => Some(Self::MiddleTip),
            13 => Some(Self::RingMcp),
            14 => Some(Self::RingPip),
            15 => Some(Self::RingDip),
            16 => Some(Self::RingTip),
            17 => Some(Self::LittleMcp),
            18 => Some(Self::LittlePip),
            19 => Some(Self::LittleDip),
            20 => Some(Self::LittleTip),
            _ => None,
        }
    }
}

/// 設定で選択するスケルトン種別
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkeletonKind {
    /// XRハンドトラッキングの標準スケルトン（指ごとに4関節）
    #[default]
    XrHand,
    /// リグ済みハンドモデルの簡易スケルトン（指ごとに3ボーン）
    HandModel,
}

/// ボーン→ランドマークの変換テーブル
/// 純粋なデータ。変換アルゴリズム側は一切この内容を知らない
#[derive(Debug, Clone)]
pub struct BoneMap {
    entries: [(BoneId, LandmarkIndex); LandmarkIndex::COUNT],
}

impl BoneMap {
    pub fn for_kind(kind: SkeletonKind) -> Self {
        match kind {
            SkeletonKind::XrHand => Self::xr_hand(),
            SkeletonKind::HandModel => Self::hand_model(),
        }
    }

    /// ハンドトラッキングスケルトン用テーブル
    pub fn xr_hand() -> Self {
        use BoneId::*;
        use LandmarkIndex as L;
        Self {
            entries: [
                (Wrist, L::Wrist),
                (ThumbMetacarpal, L::ThumbCmc),
                (ThumbProximal, L::ThumbMcp),
                (ThumbDistal, L::ThumbIp),
                (ThumbTip, L::ThumbTip),
                (IndexProximal, L::IndexMcp),
                (IndexIntermediate, L::IndexPip),
                (IndexDistal, L::IndexDip),
                (IndexTip, L::IndexTip),
                (MiddleProximal, L::MiddleMcp),
                (MiddleIntermediate, L::MiddlePip),
                (MiddleDistal, L::MiddleDip),
                (MiddleTip, L::MiddleTip),
                (RingProximal, L::RingMcp),
                (RingIntermediate, L::RingPip),
                (RingDistal, L::RingDip),
                (RingTip, L::RingTip),
                (LittleProximal, L::LittleMcp),
                (LittleIntermediate, L::LittlePip),
                (LittleDistal, L::LittleDip),
                (LittleTip, L::LittleTip),
            ],
        }
    }

    /// ハンドモデルスケルトン用テーブル
    /// 指ごとに3ボーンしか持たないため、中手骨の先端を
    /// ナックル行（MCP）に充てて行をひとつずつ繰り上げる
    pub fn hand_model() -> Self {
        use BoneId::*;
        use LandmarkIndex as L;
        Self {
            entries: [
                (Wrist, L::Wrist),
                (ThumbMetacarpal, L::ThumbCmc),
                (ThumbProximal, L::ThumbMcp),
                (ThumbDistal, L::ThumbIp),
                (ThumbTip, L::ThumbTip),
                (IndexMetacarpal, L::IndexMcp),
                (IndexProximal, L::IndexPip),
                (IndexDistal, L::IndexDip),
                (IndexTip, L::IndexTip),
                (MiddleMetacarpal, L::MiddleMcp),
                (MiddleProximal, L::MiddlePip),
                (MiddleDistal, L::MiddleDip),
                (MiddleTip, L::MiddleTip),
                (RingMetacarpal, L::RingMcp),
                (RingProximal, L::RingPip),
                (RingDistal, L::RingDip),
                (RingTip, L::RingTip),
                (LittleMetacarpal, L::LittleMcp),
                (LittleProximal, L::LittlePip),
                (LittleDistal, L::LittleDip),
                (LittleTip, L::LittleTip),
            ],
        }
    }

    pub fn entries(&self) -> &[(BoneId, LandmarkIndex)] {
        &self.entries
    }

    /// 手首ランドマークに対応するボーン（ローカル座標系の原点）
    pub fn wrist_bone(&self) -> BoneId {
        self.entries
            .iter()
            .find(|(_, index)| *index == LandmarkIndex::Wrist)
            .map(|(bone, _)| *bone)
            .unwrap_or(BoneId::Wrist)
    }
}
