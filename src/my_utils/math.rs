use crate::models::card::CardPoint;

/// 欧氏距离
pub fn euclidean_distance(point1: (f64, f64), point2: (f64, f64)) -> f64 {
    let dx = point2.0 - point1.0;
    let dy = point2.1 - point1.1;

    (dx.powi(2) + dy.powi(2)).sqrt()
}

pub fn point_distance(p1: CardPoint, p2: CardPoint) -> f64 {
    euclidean_distance((p1.x as f64, p1.y as f64), (p2.x as f64, p2.y as f64))
}

/// 点p到过p1、p2直线的垂直距离，line_length 为 |p2 - p1|
/// 叉积的模除以底边长度
pub fn point_line_distance(p: CardPoint, p1: CardPoint, p2: CardPoint, line_length: f64) -> f64 {
    let d1 = ((p.x - p1.x) as f64, (p.y - p1.y) as f64);
    let d2 = ((p2.x - p1.x) as f64, (p2.y - p1.y) as f64);
    (d1.0 * d2.1 - d1.1 * d2.0).abs() / line_length
}

/// 闭合多边形的有向面积（鞋带公式）
fn signed_area(points: &[CardPoint]) -> f64 {
    if points.len() < 3 {
        return 0.0;
    }
    let mut sum = 0i64;
    for (i, p) in points.iter().enumerate() {
        let q = points[(i + 1) % points.len()];
        sum += p.x as i64 * q.y as i64 - q.x as i64 * p.y as i64;
    }
    sum as f64 / 2.0
}

/// 闭合多边形面积
pub fn polygon_area(points: &[CardPoint]) -> f64 {
    signed_area(points).abs()
}

/// 闭合多边形周长
pub fn polygon_perimeter(points: &[CardPoint]) -> f64 {
    if points.len() < 2 {
        return 0.0;
    }
    points
        .iter()
        .enumerate()
        .map(|(i, p)| point_distance(*p, points[(i + 1) % points.len()]))
        .sum()
}

/// 多边形区域的质心，面积为0时返回None
pub fn polygon_centroid(points: &[CardPoint]) -> Option<(f64, f64)> {
    if points.len() < 3 {
        return None;
    }
    let mut m00 = 0f64;
    let mut m10 = 0f64;
    let mut m01 = 0f64;
    for (i, p) in points.iter().enumerate() {
        let q = points[(i + 1) % points.len()];
        let (x0, y0, x1, y1) = (p.x as f64, p.y as f64, q.x as f64, q.y as f64);
        let cross = x0 * y1 - x1 * y0;
        m00 += cross;
        m10 += (x0 + x1) * cross;
        m01 += (y0 + y1) * cross;
    }
    if m00 == 0.0 {
        return None;
    }
    // m00是两倍面积，m10/m01是六倍一阶矩
    Some((m10 / (3.0 * m00), m01 / (3.0 * m00)))
}
