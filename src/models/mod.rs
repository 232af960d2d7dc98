//! 定义检测流程的输入输出和公用结构体

/// 定义常用几何结构体
pub mod card {
    use imageproc::point::Point;
    use serde::{Deserialize, Serialize};

    use crate::error::{GeometryError, GeometryResult};

    #[derive(Debug, Serialize, Deserialize, Copy, Clone, PartialEq, Eq, Hash, Default)]
    pub struct CardPoint {
        pub x: i32, // 所有坐标点均使用i32
        pub y: i32,
    }

    impl CardPoint {
        pub const fn new(x: i32, y: i32) -> Self {
            Self { x, y }
        }

        pub const fn offset(self, dx: i32, dy: i32) -> Self {
            Self {
                x: self.x + dx,
                y: self.y + dy,
            }
        }
    }

    impl From<Point<i32>> for CardPoint {
        fn from(p: Point<i32>) -> Self {
            Self::new(p.x, p.y)
        }
    }

    impl From<CardPoint> for Point<i32> {
        fn from(p: CardPoint) -> Self {
            Point::new(p.x, p.y)
        }
    }

    /// 有序轮廓，点的顺序就是边界的遍历顺序
    pub type Polygon = Vec<CardPoint>;

    /// 四点区域，顺序固定为 左下、右下、右上、左上
    #[derive(Debug, Serialize, Deserialize, Copy, Clone, PartialEq, Eq)]
    pub struct Quadrilateral {
        pub points: [CardPoint; 4],
    }

    impl Quadrilateral {
        pub const fn new(bl: CardPoint, br: CardPoint, tr: CardPoint, tl: CardPoint) -> Self {
            Self {
                points: [bl, br, tr, tl],
            }
        }

        pub fn bottom_left(&self) -> CardPoint {
            self.points[0]
        }

        pub fn bottom_right(&self) -> CardPoint {
            self.points[1]
        }

        pub fn top_right(&self) -> CardPoint {
            self.points[2]
        }

        pub fn top_left(&self) -> CardPoint {
            self.points[3]
        }

        /// (左下, 右下)
        pub fn bottom_edge(&self) -> [CardPoint; 2] {
            [self.points[0], self.points[1]]
        }

        /// (左上, 右上)
        pub fn top_edge(&self) -> [CardPoint; 2] {
            [self.points[3], self.points[2]]
        }
    }

    impl TryFrom<&[CardPoint]> for Quadrilateral {
        type Error = GeometryError;

        fn try_from(points: &[CardPoint]) -> GeometryResult<Self> {
            match points {
                [bl, br, tr, tl] => Ok(Self::new(*bl, *br, *tr, *tl)),
                _ => Err(GeometryError::InvalidArgument(format!(
                    "quadrilateral needs 4 points, got {}",
                    points.len()
                ))),
            }
        }
    }

    /// 轮廓上离图像左下角、右上角最近的两个点
    /// index 是发现时在轮廓中的下标，重排时直接使用，不再按值查找
    #[derive(Debug, Copy, Clone, PartialEq, Eq)]
    pub struct ReferenceCorners {
        pub bottom_left: CardPoint,
        pub bottom_left_index: usize,
        pub top_right: CardPoint,
        pub top_right_index: usize,
    }
}

/// 定义各检测阶段之间传递的结构体
pub mod engine_rec {
    use super::card::{Polygon, ReferenceCorners};

    /// 与轮廓点一一对应的点线距离
    pub type DistanceProfile = Vec<f64>;

    /// 对称配对的峰值下标，first 来自峰值序列前半段，second 来自后半段
    #[derive(Debug, Copy, Clone, PartialEq, Eq)]
    pub struct PeakPair {
        pub first: usize,
        pub second: usize,
    }

    /// 一个卡片候选：已重排(左下点在首位)的轮廓和它的参照角点
    #[derive(Debug, Clone, PartialEq)]
    pub struct CardCandidate {
        pub polygon: Polygon,
        pub corners: ReferenceCorners,
    }
}
