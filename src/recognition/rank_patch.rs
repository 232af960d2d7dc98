//! 点数区域定位
//!
//! 矫正后卡片的左上角窗口内，点数字符通常是离窗口中心最近的一到两个墨迹块。
//! 贴边的块多半是卡片边框或花色的残影，直接丢弃。

use image::{GrayImage, Luma};
use imageproc::contrast::threshold;
use log::{debug, warn};

use crate::config::RankPatchArgs;
use crate::models::card::{CardPoint, Polygon};
use crate::my_utils::image::{binarize_inverted, clahe, crop_gray, fill_polygons_mask, outer_contours, pad_white_left};
use crate::my_utils::math::{euclidean_distance, polygon_centroid};
use crate::recognition::engine::Engine;

pub trait LocateRankPatch {
    /// 输入矫正后的灰度卡片，输出清理过的点数掩码(墨迹为0，背景为255)
    fn extract_rank_patch(&self, card: &GrayImage) -> GrayImage;
}

impl LocateRankPatch for Engine {
    fn extract_rank_patch(&self, card: &GrayImage) -> GrayImage {
        extract_rank_patch_center_based(card, &self.config().rank_patch)
    }
}

/// 输入小于窗口时返回全0窗口；没有任何轮廓返回全0窗口；
/// 没有满足条件的轮廓返回全白窗口。这三种情况都不补左边距
pub fn extract_rank_patch_center_based(gray: &GrayImage, args: &RankPatchArgs) -> GrayImage {
    let (win_w, win_h) = args.window_size();
    let (width, height) = gray.dimensions();
    if width < win_w || height < win_h {
        warn!("卡片尺寸 {width}x{height} 小于点数窗口 {win_w}x{win_h}");
        return GrayImage::new(win_w, win_h);
    }

    let patch = clahe(&crop_gray(gray, 0, 0, win_w, win_h), args.clahe_clip_limit, args.clahe_tiles);
    let bin = binarize_inverted(&patch, args.ink_threshold);
    let contours = outer_contours(&bin);
    if contours.is_empty() {
        return GrayImage::new(win_w, win_h);
    }

    let selected = select_central_components(&contours, win_w, win_h, args);
    debug!("点数窗口轮廓 {} 个，选中 {} 个", contours.len(), selected.len());
    if selected.is_empty() {
        return GrayImage::from_pixel(win_w, win_h, Luma([255]));
    }

    // 选中区域保留增强后的原图，其余为白色，再用宽松阈值去掉抗锯齿
    let mask = fill_polygons_mask(win_w, win_h, &selected);
    let mut composite = GrayImage::from_pixel(win_w, win_h, Luma([255]));
    for (x, y, m) in mask.enumerate_pixels() {
        if m[0] > 0 {
            composite.put_pixel(x, y, *patch.get_pixel(x, y));
        }
    }
    let cleaned = threshold(&composite, args.clean_threshold);
    pad_white_left(&cleaned, args.left_margin)
}

/// 不贴边、与中心矩形有交点、质心可求的轮廓，按质心到窗口中心的距离取最近的几个
fn select_central_components<'a>(contours: &'a [Polygon], win_w: u32, win_h: u32, args: &RankPatchArgs) -> Vec<&'a Polygon> {
    let center = (win_w as f64 / 2.0, win_h as f64 / 2.0);
    let box_w = win_w as f64 * args.center_width_ratio as f64;
    let box_h = win_h as f64 * args.center_height_ratio as f64;
    let (box_x, box_y) = ((center.0 - box_w / 2.0) as i32, (center.1 - box_h / 2.0) as i32);
    let (box_w, box_h) = (box_w as i32, box_h as i32);

    let (right, bottom) = (win_w as i32 - 1, win_h as i32 - 1);
    let touches_border = |p: &CardPoint| p.x <= 0 || p.y <= 0 || p.x >= right || p.y >= bottom;
    let in_center_box = |p: &CardPoint| p.x >= box_x && p.x < box_x + box_w && p.y >= box_y && p.y < box_y + box_h;

    let mut ranked: Vec<(f64, &Polygon)> = contours
        .iter()
        .filter(|c| !c.iter().any(touches_border) && c.iter().any(in_center_box))
        .filter_map(|c| polygon_centroid(c).map(|centroid| (euclidean_distance(centroid, center), c)))
        .collect();
    ranked.sort_by(|a, b| a.0.total_cmp(&b.0));
    ranked.into_iter().take(args.max_components).map(|(_, c)| c).collect()
}

/// 墨迹(0值)占比不超过 max_ink_ratio 且数量不少于 min_ink_pixels 时才值得送去分类
pub fn has_plausible_ink(patch: &GrayImage, args: &RankPatchArgs) -> bool {
    let total = patch.width() as u64 * patch.height() as u64;
    if total == 0 {
        return false;
    }
    let ink = patch.pixels().filter(|p| p[0] == 0).count() as u64;
    let ratio = ink as f64 / total as f64;
    ratio <= args.max_ink_ratio && ink >= args.min_ink_pixels as u64
}
