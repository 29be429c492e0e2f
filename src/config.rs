use anyhow::Result;
use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::rig::SkeletonKind;

#[derive(Debug, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub network: NetworkConfig,
    #[serde(default)]
    pub stream: StreamConfig,
    #[serde(default)]
    pub capture: CaptureConfig,
    #[serde(default)]
    pub rig: RigConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct NetworkConfig {
    /// バックエンドのアドレス (host:port)
    #[serde(default = "default_addr")]
    pub addr: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StreamConfig {
    /// ハンドデータ送信レート (Hz)
    #[serde(default = "default_hand_rate")]
    pub hand_rate_hz: f32,
    /// 画面キャプチャレート (Hz)。最低1Hz
    #[serde(default = "default_capture_rate")]
    pub capture_rate_hz: f32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CaptureConfig {
    /// キャプチャ解像度。小さいほど高速
    #[serde(default = "default_capture_width")]
    pub width: u32,
    #[serde(default = "default_capture_height")]
    pub height: u32,
    /// JPEG品質 (1〜100)
    #[serde(default = "default_jpeg_quality")]
    pub jpeg_quality: u8,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct RigConfig {
    /// ボーンマッピングの選択
    #[serde(default)]
    pub skeleton: SkeletonKind,
    /// サンプルJSONの保存先（指定時のみ保存）
    #[serde(default)]
    pub dump_dir: Option<String>,
}

fn default_addr() -> String { "127.0.0.1:8765".to_string() }
fn default_hand_rate() -> f32 { 20.0 }
fn default_capture_rate() -> f32 { 5.0 }
fn default_capture_width() -> u32 { 640 }
fn default_capture_height() -> u32 { 480 }
fn default_jpeg_quality() -> u8 { 75 }

impl Default for NetworkConfig {
    fn default() -> Self {
        Self { addr: default_addr() }
    }
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            hand_rate_hz: default_hand_rate(),
            capture_rate_hz: default_capture_rate(),
        }
    }
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            width: default_capture_width(),
            height: default_capture_height(),
            jpeg_quality: default_jpeg_quality(),
        }
    }
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// 設定ファイルがなければデフォルト値で起動する
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        Self::load(path).unwrap_or_default()
    }
}
