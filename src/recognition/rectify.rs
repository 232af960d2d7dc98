use image::imageops::{grayscale, rotate180};
use image::{GrayImage, Rgb, RgbImage};
use imageproc::contrast::{otsu_level, threshold};
use imageproc::filter::gaussian_blur_f32;
use imageproc::geometric_transformations::{warp_into, Interpolation, Projection};
use log::{debug, warn};

use crate::config::{EnhanceArgs, RectifyArgs};
use crate::error::{GeometryError, GeometryResult};
use crate::models::card::{CardPoint, Quadrilateral};
use crate::my_utils::image::{clahe, sharpen};
use crate::recognition::engine::Engine;

/// 矫正后的卡片交给调用方指定的增强器处理
pub trait CardEnhancer {
    fn enhance(&self, card: &RgbImage) -> GrayImage;
}

/// 默认增强：灰度 -> CLAHE -> 锐化 -> 高斯模糊 -> 大津法二值化
#[derive(Debug, Clone, Default)]
pub struct ContrastEnhancer {
    args: EnhanceArgs,
}

impl ContrastEnhancer {
    pub fn new(args: EnhanceArgs) -> Self {
        Self { args }
    }
}

impl CardEnhancer for ContrastEnhancer {
    fn enhance(&self, card: &RgbImage) -> GrayImage {
        let gray = grayscale(card);
        let equalized = clahe(&gray, self.args.clahe_clip_limit, self.args.clahe_tiles);
        let blurred = gaussian_blur_f32(&sharpen(&equalized), self.args.blur_sigma);
        threshold(&blurred, otsu_level(&blurred))
    }
}

pub trait RectifyRegions {
    /// 每个四边形矫正为固定尺寸的卡片，旋转180度后增强
    fn rectify_regions(&self, src: &RgbImage, quads: &[Quadrilateral], enhancer: &dyn CardEnhancer) -> Vec<GrayImage>;
}

impl RectifyRegions for Engine {
    fn rectify_regions(&self, src: &RgbImage, quads: &[Quadrilateral], enhancer: &dyn CardEnhancer) -> Vec<GrayImage> {
        get_cards(src, quads, &self.config().rectify, enhancer)
    }
}

/// 矫正失败的四边形告警后跳过
pub fn get_cards(src: &RgbImage, quads: &[Quadrilateral], args: &RectifyArgs, enhancer: &dyn CardEnhancer) -> Vec<GrayImage> {
    let mut cards = Vec::with_capacity(quads.len());
    for (index, quad) in quads.iter().enumerate() {
        match warp_card(src, &quad.points, args.card_width, args.card_height) {
            // 精确像素翻转 (x -> W-1-x, y -> H-1-y)，绕 (W/2, H/2) 旋转会偏一个像素
            Ok(card) => cards.push(enhancer.enhance(&rotate180(&card))),
            Err(err) => warn!("四边形 {index} 矫正失败: {err}"),
        }
    }
    debug!("四边形 {} 个，矫正卡片 {} 张", quads.len(), cards.len());
    cards
}

/// 按 x+y、x-y 的极值把任意4个点排成 左上、右上、右下、左下。
/// 四个角色各自独立取极值，相同时保留先出现的点；退化四边形可能重复分配同一个点
pub fn order_corners(points: &[CardPoint]) -> GeometryResult<[CardPoint; 4]> {
    if points.len() != 4 {
        return Err(GeometryError::InvalidArgument(format!(
            "corner ordering needs 4 points, got {}",
            points.len()
        )));
    }
    let sum = |p: &CardPoint| p.x + p.y;
    let diff = |p: &CardPoint| p.x - p.y;

    let [mut tl, mut tr, mut br, mut bl] = [points[0]; 4];
    for p in &points[1..] {
        if sum(p) < sum(&tl) {
            tl = *p;
        }
        if sum(p) > sum(&br) {
            br = *p;
        }
        if diff(p) > diff(&tr) {
            tr = *p;
        }
        if diff(p) < diff(&bl) {
            bl = *p;
        }
    }
    Ok([tl, tr, br, bl])
}

/// 透视变换到 width x height，双线性插值，越界补0
pub fn warp_card(src: &RgbImage, points: &[CardPoint], width: u32, height: u32) -> GeometryResult<RgbImage> {
    if width == 0 || height == 0 {
        return Err(GeometryError::InvalidArgument(format!(
            "card size must be positive, got {width}x{height}"
        )));
    }
    let corners = order_corners(points)?;
    let from = corners.map(|p| (p.x as f32, p.y as f32));
    let (w, h) = ((width - 1) as f32, (height - 1) as f32);
    let to = [(0.0, 0.0), (w, 0.0), (w, h), (0.0, h)];

    let projection = Projection::from_control_points(from, to).ok_or(GeometryError::SingularTransform)?;
    let mut card = RgbImage::new(width, height);
    warp_into(src, &projection, Interpolation::Bilinear, Rgb([0, 0, 0]), &mut card);
    Ok(card)
}
