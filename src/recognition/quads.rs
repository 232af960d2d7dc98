use image::GrayImage;
use log::{debug, warn};

use crate::config::{Config, QuadBuilderArgs};
use crate::error::GeometryResult;
use crate::models::card::{CardPoint, Polygon, Quadrilateral};
use crate::models::engine_rec::{CardCandidate, PeakPair};
use crate::my_utils::image::outer_contours;
use crate::my_utils::math::point_distance;
use crate::recognition::contours::{filter_contours, locate_candidates};
use crate::recognition::engine::Engine;
use crate::recognition::peaks::{distance_profile, find_local_maxima, pair_indices_symmetric};

pub trait DetectRegions {
    /// 输入前景非零的二值掩码，输出卡片四边形，顺序为 左下、右下、右上、左上
    fn detect_regions(&self, mask: &GrayImage) -> Vec<Quadrilateral>;
}

impl DetectRegions for Engine {
    fn detect_regions(&self, mask: &GrayImage) -> Vec<Quadrilateral> {
        process(mask, self.config())
    }
}

/// 轮廓过滤 -> 参照角点 -> 距离曲线 -> 峰值 -> 对称配对 -> 四边形
pub fn process(mask: &GrayImage, config: &Config) -> Vec<Quadrilateral> {
    let (width, height) = mask.dimensions();
    if width == 0 || height == 0 {
        warn!("输入掩码为空");
        return Vec::new();
    }

    let contours = outer_contours(mask);
    let cards = filter_contours(
        &contours,
        config.contour_filter.min_area,
        config.contour_filter.min_perimeter,
    );
    debug!("外轮廓 {} 个，过滤后 {} 个", contours.len(), cards.len());

    let candidates = locate_candidates(cards, width, height);
    build_quadrilaterals(&candidates, &config.quad_builder)
}

/// 逐个候选生成四边形，前置条件不满足的候选记录告警后跳过
pub fn build_quadrilaterals(candidates: &[CardCandidate], args: &QuadBuilderArgs) -> Vec<Quadrilateral> {
    let mut quads = Vec::new();
    for (index, candidate) in candidates.iter().enumerate() {
        match candidate_quadrilaterals(candidate, args) {
            Ok(blocks) => quads.extend(blocks),
            Err(err) => warn!("候选轮廓 {index} 跳过: {err}"),
        }
    }
    debug!("候选 {} 个，生成四边形 {} 个", candidates.len(), quads.len());
    quads
}

/// 单个候选的四边形。参照角点先向外扩 pixel_tolerance，补偿上游腐蚀造成的边界内缩
pub fn candidate_quadrilaterals(candidate: &CardCandidate, args: &QuadBuilderArgs) -> GeometryResult<Vec<Quadrilateral>> {
    let tol = args.pixel_tolerance;
    let bl = candidate.corners.bottom_left.offset(-tol, tol);
    let tr = candidate.corners.top_right.offset(tol, -tol);

    let distances = distance_profile(&candidate.polygon, bl, tr, point_distance(bl, tr))?;
    let peaks = find_local_maxima(&distances, args.peak_window, args.min_prominence);
    let pairs = pair_indices_symmetric(&peaks)?;
    Ok(assemble_blocks(&candidate.polygon, &pairs, bl, tr, tol))
}

/// 每一对峰值对应一个子块：first 点外扩得到右下角，second 点外扩得到左上角。
/// 第一块的左下角取外扩后的 bl，其余块取 (tl.x, br.y)；
/// 最后一块的右上角取外扩后的 tr，其余块取 (br.x, tl.y)。
fn assemble_blocks(polygon: &Polygon, pairs: &[PeakPair], bl: CardPoint, tr: CardPoint, tol: i32) -> Vec<Quadrilateral> {
    if pairs.is_empty() {
        return vec![Quadrilateral::new(
            bl,
            CardPoint::new(tr.x, bl.y),
            tr,
            CardPoint::new(bl.x, tr.y),
        )];
    }

    let last = pairs.len() - 1;
    pairs
        .iter()
        .enumerate()
        .map(|(j, pair)| {
            let br = polygon[pair.first].offset(tol, tol);
            let tl = polygon[pair.second].offset(-tol, -tol);
            let bottom_left = if j == 0 { bl } else { CardPoint::new(tl.x, br.y) };
            let top_right = if j == last { tr } else { CardPoint::new(br.x, tl.y) };
            Quadrilateral::new(bottom_left, br, top_right, tl)
        })
        .collect()
}
