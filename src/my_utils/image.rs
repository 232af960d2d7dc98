use image::imageops::{crop_imm, invert, replace};
use image::{GrayImage, Luma};
use imageproc::contours::{find_contours, BorderType, Contour};
use imageproc::contrast::threshold;
use imageproc::drawing::draw_polygon_mut;
use imageproc::filter::filter3x3;
use imageproc::point::Point;

use crate::models::card::{CardPoint, Polygon};

/// 3x3 锐化核
pub const SHARPEN_KERNEL: [f32; 9] = [0.0, -1.0, 0.0, -1.0, 5.0, -1.0, 0.0, -1.0, 0.0];

/// 限制对比度自适应直方图均衡(CLAHE)
/// clip_limit 是相对值，实际截断高度为 clip_limit * tile面积 / 256，至少为1
pub fn clahe(img: &GrayImage, clip_limit: f32, tiles: u32) -> GrayImage {
    let (width, height) = img.dimensions();
    if width == 0 || height == 0 {
        return img.clone();
    }
    let tile_w = width.div_ceil(tiles.clamp(1, width));
    let tile_h = height.div_ceil(tiles.clamp(1, height));
    let tiles_x = width.div_ceil(tile_w);
    let tiles_y = height.div_ceil(tile_h);

    // 每个tile一张映射表
    let mut luts = Vec::with_capacity((tiles_x * tiles_y) as usize);
    for ty in 0..tiles_y {
        for tx in 0..tiles_x {
            let x0 = tx * tile_w;
            let y0 = ty * tile_h;
            let x1 = (x0 + tile_w).min(width);
            let y1 = (y0 + tile_h).min(height);
            let mut hist = [0u32; 256];
            for y in y0..y1 {
                for x in x0..x1 {
                    hist[img.get_pixel(x, y)[0] as usize] += 1;
                }
            }
            luts.push(tile_lut(&mut hist, (x1 - x0) * (y1 - y0), clip_limit));
        }
    }

    // 相邻四个tile的映射结果双线性插值
    let neighbours = |pos: u32, tile: u32, count: u32| -> (usize, usize, f32) {
        let f = pos as f32 / tile as f32 - 0.5;
        let lo = f.floor();
        let weight = f - lo;
        let lo = lo as i64;
        let first = lo.clamp(0, count as i64 - 1) as usize;
        let second = (lo + 1).clamp(0, count as i64 - 1) as usize;
        (first, second, weight)
    };

    let mut out = GrayImage::new(width, height);
    for y in 0..height {
        let (ty0, ty1, wy) = neighbours(y, tile_h, tiles_y);
        for x in 0..width {
            let (tx0, tx1, wx) = neighbours(x, tile_w, tiles_x);
            let v = img.get_pixel(x, y)[0] as usize;
            let lut = |tx: usize, ty: usize| luts[ty * tiles_x as usize + tx][v] as f32;
            let top = lut(tx0, ty0) * (1.0 - wx) + lut(tx1, ty0) * wx;
            let bottom = lut(tx0, ty1) * (1.0 - wx) + lut(tx1, ty1) * wx;
            let value = top * (1.0 - wy) + bottom * wy;
            out.put_pixel(x, y, Luma([value.round().clamp(0.0, 255.0) as u8]));
        }
    }
    out
}

/// 截断直方图，把截掉的数量均匀补回，返回累计分布映射表
fn tile_lut(hist: &mut [u32; 256], area: u32, clip_limit: f32) -> [u8; 256] {
    if clip_limit > 0.0 {
        let limit = ((clip_limit * area as f32 / 256.0) as u32).max(1);
        let mut clipped = 0u32;
        for bin in hist.iter_mut() {
            if *bin > limit {
                clipped += *bin - limit;
                *bin = limit;
            }
        }
        let batch = clipped / 256;
        let mut residual = clipped - batch * 256;
        for bin in hist.iter_mut() {
            *bin += batch;
        }
        if residual > 0 {
            let step = (256 / residual).max(1) as usize;
            let mut i = 0;
            while i < 256 && residual > 0 {
                hist[i] += 1;
                residual -= 1;
                i += step;
            }
        }
    }

    let scale = 255.0 / area.max(1) as f32;
    let mut lut = [0u8; 256];
    let mut sum = 0u32;
    for (i, bin) in hist.iter().enumerate() {
        sum += *bin;
        lut[i] = (sum as f32 * scale).round().min(255.0) as u8;
    }
    lut
}

/// 锐化
pub fn sharpen(img: &GrayImage) -> GrayImage {
    filter3x3::<Luma<u8>, f32, u8>(img, &SHARPEN_KERNEL)
}

/// 反向二值化，小于等于阈值的像素变为255
pub fn binarize_inverted(img: &GrayImage, thresh: u8) -> GrayImage {
    let mut out = threshold(img, thresh);
    invert(&mut out);
    out
}

/// 截取图像
pub fn crop_gray(img: &GrayImage, x: u32, y: u32, w: u32, h: u32) -> GrayImage {
    crop_imm(img, x, y, w, h).to_image()
}

/// 在左侧补白色列
pub fn pad_white_left(img: &GrayImage, cols: u32) -> GrayImage {
    if cols == 0 {
        return img.clone();
    }
    let mut out = GrayImage::from_pixel(img.width() + cols, img.height(), Luma([255u8]));
    replace(&mut out, img, cols as i64, 0);
    out
}

/// 只取最外层轮廓，点顺序与边界追踪顺序一致
pub fn outer_contours(bin: &GrayImage) -> Vec<Polygon> {
    let contours: Vec<Contour<i32>> = find_contours(bin);
    contours
        .into_iter()
        .filter(|c| matches!(c.border_type, BorderType::Outer) && c.parent.is_none())
        .map(|c| c.points.into_iter().map(CardPoint::from).collect())
        .collect()
}

/// 把多个轮廓实心填充到一张掩码上，轮廓本身的像素也算在内
pub fn fill_polygons_mask(width: u32, height: u32, polygons: &[&Polygon]) -> GrayImage {
    let mut mask = GrayImage::new(width, height);
    let white = Luma([255u8]);
    for polygon in polygons {
        let mut points: Vec<Point<i32>> = polygon.iter().map(|p| Point::from(*p)).collect();
        while points.len() > 1 && points.first() == points.last() {
            points.pop();
        }
        if points.len() >= 3 {
            draw_polygon_mut(&mut mask, &points, white);
        }
        for p in polygon.iter() {
            if p.x >= 0 && p.y >= 0 && (p.x as u32) < width && (p.y as u32) < height {
                mask.put_pixel(p.x as u32, p.y as u32, white);
            }
        }
    }
    mask
}

#[cfg(test)]
mod tests {
    use super::*;
    use imageproc::drawing::draw_filled_rect_mut;
    use imageproc::rect::Rect;

    #[test]
    fn clahe_keeps_flat_white_white() {
        let img = GrayImage::from_pixel(40, 30, Luma([255]));
        let out = clahe(&img, 8.0, 8);
        assert!(out.pixels().all(|p| p[0] == 255));
    }

    #[test]
    fn clahe_keeps_ink_dark_on_paper() {
        let mut img = GrayImage::from_pixel(84, 124, Luma([255]));
        draw_filled_rect_mut(&mut img, Rect::at(30, 40).of_size(20, 40), Luma([20]));
        let out = clahe(&img, 8.0, 8);
        assert!(out.get_pixel(40, 60)[0] < 180);
        assert_eq!(out.get_pixel(5, 5)[0], 255);
    }

    #[test]
    fn inverted_binarization() {
        let mut img = GrayImage::from_pixel(3, 1, Luma([255]));
        img.put_pixel(0, 0, Luma([180]));
        img.put_pixel(1, 0, Luma([181]));
        let bin = binarize_inverted(&img, 180);
        assert_eq!(bin.get_pixel(0, 0)[0], 255);
        assert_eq!(bin.get_pixel(1, 0)[0], 0);
        assert_eq!(bin.get_pixel(2, 0)[0], 0);
    }

    #[test]
    fn left_padding_is_white() {
        let img = GrayImage::new(4, 3);
        let out = pad_white_left(&img, 2);
        assert_eq!(out.dimensions(), (6, 3));
        assert_eq!(out.get_pixel(1, 2)[0], 255);
        assert_eq!(out.get_pixel(2, 2)[0], 0);
        assert_eq!(pad_white_left(&img, 0).dimensions(), (4, 3));
    }

    #[test]
    fn outer_contours_skip_holes() {
        let mut img = GrayImage::new(60, 60);
        draw_filled_rect_mut(&mut img, Rect::at(10, 10).of_size(40, 40), Luma([255]));
        draw_filled_rect_mut(&mut img, Rect::at(20, 20).of_size(10, 10), Luma([0]));
        let contours = outer_contours(&img);
        assert_eq!(contours.len(), 1);
        assert!(contours[0].contains(&CardPoint::new(10, 10)));
    }

    #[test]
    fn filled_mask_covers_interior_and_boundary() {
        let poly = vec![
            CardPoint::new(2, 2),
            CardPoint::new(2, 8),
            CardPoint::new(8, 8),
            CardPoint::new(8, 2),
        ];
        let mask = fill_polygons_mask(12, 12, &[&poly]);
        assert_eq!(mask.get_pixel(5, 5)[0], 255);
        assert_eq!(mask.get_pixel(8, 8)[0], 255);
        assert_eq!(mask.get_pixel(10, 10)[0], 0);
        // 单点轮廓不会触发多边形绘制
        let dot = vec![CardPoint::new(1, 1)];
        let mask = fill_polygons_mask(4, 4, &[&dot]);
        assert_eq!(mask.get_pixel(1, 1)[0], 255);
    }
}
