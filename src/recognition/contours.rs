use crate::models::card::{CardPoint, Polygon, ReferenceCorners};
use crate::models::engine_rec::CardCandidate;
use crate::my_utils::math::{point_distance, polygon_area, polygon_perimeter};

/// 过滤面积和周长都达标的轮廓
pub fn filter_contours(contours: &[Polygon], min_area: f64, min_perimeter: f64) -> Vec<Polygon> {
    contours
        .iter()
        .filter(|c| polygon_area(c) >= min_area && polygon_perimeter(c) >= min_perimeter)
        .cloned()
        .collect()
}

/// 找到轮廓上离图像左下角(0, h-1)、右上角(w-1, 0)最近的点
/// 距离相同时保留先遍历到的点，空轮廓返回None
pub fn find_closest_to_corners(polygon: &[CardPoint], width: u32, height: u32) -> Option<ReferenceCorners> {
    let tr_anchor = CardPoint::new(width as i32 - 1, 0);
    let bl_anchor = CardPoint::new(0, height as i32 - 1);

    let mut tr_best: Option<(usize, f64)> = None;
    let mut bl_best: Option<(usize, f64)> = None;
    for (i, p) in polygon.iter().enumerate() {
        let tr_dist = point_distance(*p, tr_anchor);
        if tr_best.map_or(true, |(_, d)| tr_dist < d) {
            tr_best = Some((i, tr_dist));
        }
        let bl_dist = point_distance(*p, bl_anchor);
        if bl_best.map_or(true, |(_, d)| bl_dist < d) {
            bl_best = Some((i, bl_dist));
        }
    }

    let (bl_index, _) = bl_best?;
    let (tr_index, _) = tr_best?;
    Some(ReferenceCorners {
        bottom_left: polygon[bl_index],
        bottom_left_index: bl_index,
        top_right: polygon[tr_index],
        top_right_index: tr_index,
    })
}

/// 左旋轮廓使左下参照点排在首位，保持相对顺序
/// 下标越界或点不匹配时不做任何修改
pub fn reorder_bottom_left_first(polygon: &mut Polygon, corners: &mut ReferenceCorners) {
    let n = polygon.len();
    let start = corners.bottom_left_index;
    if start >= n || polygon[start] != corners.bottom_left {
        return;
    }
    polygon.rotate_left(start);
    corners.bottom_left_index = 0;
    corners.top_right_index = (corners.top_right_index + n - start) % n;
}

/// 对过滤后的轮廓依次求参照角点并重排，得到候选卡片
pub fn locate_candidates(polygons: Vec<Polygon>, width: u32, height: u32) -> Vec<CardCandidate> {
    polygons
        .into_iter()
        .filter_map(|mut polygon| {
            let mut corners = find_closest_to_corners(&polygon, width, height)?;
            reorder_bottom_left_first(&mut polygon, &mut corners);
            Some(CardCandidate { polygon, corners })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(x0: i32, y0: i32, side: i32) -> Polygon {
        vec![
            CardPoint::new(x0, y0),
            CardPoint::new(x0, y0 + side),
            CardPoint::new(x0 + side, y0 + side),
            CardPoint::new(x0 + side, y0),
        ]
    }

    #[test]
    fn filter_keeps_only_large_contours() {
        let contours = vec![square(0, 0, 10), square(0, 0, 100), square(50, 50, 60), square(5, 5, 70)];
        let kept = filter_contours(&contours, 3000.0, 250.0);
        // 60x60 面积够但周长240不够
        assert_eq!(kept, vec![square(0, 0, 100), square(5, 5, 70)]);
        assert!(filter_contours(&[], 0.0, 0.0).is_empty());
    }

    #[test]
    fn filter_is_monotonic_in_thresholds() {
        let contours: Vec<Polygon> = (1..20).map(|i| square(i, i, i * 10)).collect();
        let mut previous = contours.len();
        for area in [0.0, 500.0, 3000.0, 10_000.0, 40_000.0] {
            let kept = filter_contours(&contours, area, 0.0);
            assert!(kept.iter().all(|c| contours.contains(c)));
            assert!(kept.len() <= previous);
            previous = kept.len();
        }
        let mut previous = contours.len();
        for perimeter in [0.0, 100.0, 250.0, 600.0] {
            let kept = filter_contours(&contours, 0.0, perimeter);
            assert!(kept.len() <= previous);
            previous = kept.len();
        }
    }

    #[test]
    fn corners_nearest_to_image_extremes() {
        let poly = square(20, 30, 40);
        let corners = find_closest_to_corners(&poly, 100, 100).unwrap();
        assert_eq!(corners.bottom_left, CardPoint::new(20, 70));
        assert_eq!(corners.bottom_left_index, 1);
        assert_eq!(corners.top_right, CardPoint::new(60, 30));
        assert_eq!(corners.top_right_index, 3);
        assert!(find_closest_to_corners(&[], 100, 100).is_none());
    }

    #[test]
    fn ties_keep_first_point() {
        // 两个点到左下角(0, 9)距离相同
        let poly = vec![CardPoint::new(0, 5), CardPoint::new(4, 9), CardPoint::new(9, 0)];
        let corners = find_closest_to_corners(&poly, 10, 10).unwrap();
        assert_eq!(corners.bottom_left_index, 0);
    }

    #[test]
    fn reorder_rotates_to_bottom_left() {
        let mut poly = square(20, 30, 40);
        let mut corners = find_closest_to_corners(&poly, 100, 100).unwrap();
        reorder_bottom_left_first(&mut poly, &mut corners);
        assert_eq!(
            poly,
            vec![
                CardPoint::new(20, 70),
                CardPoint::new(60, 70),
                CardPoint::new(60, 30),
                CardPoint::new(20, 30),
            ]
        );
        assert_eq!(corners.bottom_left_index, 0);
        assert_eq!(poly[corners.top_right_index], corners.top_right);
    }

    #[test]
    fn reorder_mismatch_is_a_no_op() {
        let mut poly = square(0, 0, 10);
        let mut corners = ReferenceCorners {
            bottom_left: CardPoint::new(99, 99),
            bottom_left_index: 2,
            top_right: poly[3],
            top_right_index: 3,
        };
        reorder_bottom_left_first(&mut poly, &mut corners);
        assert_eq!(poly, square(0, 0, 10));
        corners.bottom_left_index = 17;
        reorder_bottom_left_first(&mut poly, &mut corners);
        assert_eq!(poly, square(0, 0, 10));
    }
}
