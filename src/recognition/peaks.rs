//! 距离曲线、峰值检测和对称配对
//!
//! 卡片轮廓按左下点开始遍历，轮廓上每个点到"左下-右上"基线的距离
//! 在卡片的右下角、左上角处取得局部极大值。多张卡片叠放时，每张卡片
//! 各贡献一对极值，且沿主对角线两侧对称出现。

use crate::error::{GeometryError, GeometryResult};
use crate::models::card::CardPoint;
use crate::models::engine_rec::{DistanceProfile, PeakPair};
use crate::my_utils::math::point_line_distance;

/// 计算轮廓上每个点到过 p1、p2 直线的距离
pub fn distance_profile(
    polygon: &[CardPoint],
    p1: CardPoint,
    p2: CardPoint,
    line_length: f64,
) -> GeometryResult<DistanceProfile> {
    if line_length <= 0.0 || !line_length.is_finite() {
        return Err(GeometryError::DegenerateBaseline);
    }
    Ok(polygon
        .iter()
        .map(|p| point_line_distance(*p, p1, p2, line_length))
        .collect())
}

/// 在 [i - window, i + window] 内没有更大值的点是候选峰值，
/// 突出度 = 值 - max(左半窗最小值, 右半窗最小值)，不小于 min_prominence 才接受。
/// 与上一个接受的峰值距离不超过 window/2 的会被抑制。
pub fn find_local_maxima(distances: &[f64], window_size: usize, min_prominence: f64) -> Vec<usize> {
    let n = distances.len();
    let mut maxima: Vec<usize> = Vec::new();
    if window_size == 0 || n <= 2 * window_size {
        return maxima;
    }

    for i in window_size..n - window_size {
        let current = distances[i];
        let window = &distances[i - window_size..=i + window_size];
        if window.iter().any(|&v| v > current) {
            continue;
        }

        let left = min_of(&distances[i - window_size..i]);
        let right = min_of(&distances[i + 1..=i + window_size]);
        if current - left.max(right) < min_prominence {
            continue;
        }

        match maxima.last() {
            Some(&last) if i - last <= window_size / 2 => {}
            _ => maxima.push(i),
        }
    }
    maxima
}

fn min_of(values: &[f64]) -> f64 {
    values.iter().copied().fold(f64::INFINITY, f64::min)
}

/// 双侧对称假设：峰值序列首尾两两配对，(第1个, 最后1个)、(第2个, 倒数第2个)...
/// 最内层的一对排在最后。奇数个峰值违反这一假设，返回错误。
pub fn pair_indices_symmetric(indices: &[usize]) -> GeometryResult<Vec<PeakPair>> {
    let n = indices.len();
    if n % 2 != 0 {
        return Err(GeometryError::OddPeakCount(n));
    }
    Ok((0..n / 2)
        .map(|i| PeakPair {
            first: indices[i],
            second: indices[n - 1 - i],
        })
        .collect())
}
