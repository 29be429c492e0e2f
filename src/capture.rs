//! フレームキャプチャ能力
//!
//! コアは「現フレームの圧縮画像をくれ」という能力だけを要求する。
//! 実機ではレンダリング層がrender targetから読み出すが、ここでは
//! トレイトの背後に隠し、デモとテストには合成実装を使う

use anyhow::{Context, Result};
use image::codecs::jpeg::JpegEncoder;
use image::{ExtendedColorType, ImageEncoder};

/// 圧縮済みの1フレーム
#[derive(Debug, Clone)]
pub struct CapturedFrame {
    pub width: u32,
    pub height: u32,
    pub jpeg: Vec<u8>,
}

/// キャプチャ能力
///
/// `capture()` は描画完了（end of frame）を待ってからピクセルを
/// 読むため停止点を含む。対象が不可視・ゼロ面積の場合は
/// 部分画像ではなく None を返す
pub trait FrameCapture {
    fn capture(&mut self) -> impl std::future::Future<Output = Result<Option<CapturedFrame>>> + Send;
}

/// RGB8バッファをJPEGに圧縮する。quality は 1〜100
pub fn encode_jpeg(rgb: &[u8], width: u32, height: u32, quality: u8) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    let encoder = JpegEncoder::new_with_quality(&mut buf, quality.clamp(1, 100));
    encoder
        .write_image(rgb, width, height, ExtendedColorType::Rgb8)
        .context("jpeg encode failed")?;
    Ok(buf)
}

/// 常に「画像なし」を返す実装。キャプチャ無効の構成やテスト用
#[derive(Debug, Default)]
pub struct NullCapture;

impl FrameCapture for NullCapture {
    async fn capture(&mut self) -> Result<Option<CapturedFrame>> {
        Ok(None)
    }
}

/// 合成フレームバッファからのキャプチャ
///
/// デモ用: 毎回フレーム番号に応じたグラデーションを描いて
/// JPEG圧縮する。実機のrender-target読み出しと同じ形の
/// 停止点（end-of-frame待ち）を持つ
pub struct FramebufferCapture {
    width: u32,
    height: u32,
    quality: u8,
    frame_index: u64,
}

impl FramebufferCapture {
    pub fn new(width: u32, height: u32, quality: u8) -> Self {
        Self {
            width,
            height,
            quality,
            frame_index: 0,
        }
    }

    fn render(&self) -> Vec<u8> {
        let (w, h) = (self.width as usize, self.height as usize);
        let phase = (self.frame_index % 256) as u8;
        let mut rgb = vec![0u8; w * h * 3];
        for y in 0..h {
            for x in 0..w {
                let i = (y * w + x) * 3;
                rgb[i] = ((x * 255) / w.max(1)) as u8;
                rgb[i + 1] = ((y * 255) / h.max(1)) as u8;
                rgb[i + 2] = phase;
            }
        }
        rgb
    }
}

impl FrameCapture for FramebufferCapture {
    async fn capture(&mut self) -> Result<Option<CapturedFrame>> {
        // ゼロ面積のrender targetは「画像なし」
        if self.width == 0 || self.height == 0 {
            return Ok(None);
        }

        // 描画完了を待ってからピクセルを読む
        tokio::task::yield_now().await;

        let rgb = self.render();
        self.frame_index += 1;
        let jpeg = encode_jpeg(&rgb, self.width, self.height, self.quality)?;
        Ok(Some(CapturedFrame {
            width: self.width,
            height: self.height,
            jpeg,
        }))
    }
}
