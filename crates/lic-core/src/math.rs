//! 数学基础类型
//!
//! 基于 nalgebra 提供的点和向量类型别名，以及页面布局使用的矩形与尺寸。
//! 所有坐标均为像素，原点在左上角，Y 轴向下。

use nalgebra as na;
use serde::{Deserialize, Serialize};

/// 2D点类型
pub type Point2 = na::Point2<f64>;

/// 2D向量类型
pub type Vector2 = na::Vector2<f64>;

/// 数值容差，用于几何比较
pub const EPSILON: f64 = 1e-10;

/// 判断两个浮点数是否近似相等
#[inline]
pub fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() < EPSILON
}

/// 判断两个2D点是否近似相等
#[inline]
pub fn points_approx_eq(a: &Point2, b: &Point2) -> bool {
    approx_eq(a.x, b.x) && approx_eq(a.y, b.y)
}

/// 像素尺寸
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub const ZERO: Size = Size::new(0.0, 0.0);

    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

impl Default for Size {
    fn default() -> Self {
        Self::ZERO
    }
}

/// 矩形（位置 + 尺寸）
///
/// 条目的 `x/y` 相对于父条目，整体要么全部存在，要么全部缺失，
/// 因此条目上以 `Option<Rect>` 存储。
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub const ZERO: Rect = Rect::new(0.0, 0.0, 0.0, 0.0);

    /// 创建新的矩形
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// 从原点和尺寸创建
    pub fn from_origin_size(origin: Point2, size: Size) -> Self {
        Self::new(origin.x, origin.y, size.width, size.height)
    }

    /// 从点集创建包围矩形，空点集返回 `None`
    pub fn from_points(points: impl IntoIterator<Item = Point2>) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let (mut min, mut max) = (first, first);
        for p in iter {
            min.x = min.x.min(p.x);
            min.y = min.y.min(p.y);
            max.x = max.x.max(p.x);
            max.y = max.y.max(p.y);
        }
        Some(Self::new(min.x, min.y, max.x - min.x, max.y - min.y))
    }

    /// 左上角
    pub fn origin(&self) -> Point2 {
        Point2::new(self.x, self.y)
    }

    /// 右下角
    pub fn max(&self) -> Point2 {
        Point2::new(self.x + self.width, self.y + self.height)
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// 获取中心点
    pub fn center(&self) -> Point2 {
        Point2::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// 四边各向内收缩 `margin`
    pub fn inset(&self, margin: f64) -> Self {
        Self::new(
            self.x + margin,
            self.y + margin,
            self.width - margin - margin,
            self.height - margin - margin,
        )
    }

    /// 四边各向外扩张
    pub fn expand(&self, dx: f64, dy: f64) -> Self {
        Self::new(
            self.x - dx,
            self.y - dy,
            self.width + dx + dx,
            self.height + dy + dy,
        )
    }

    /// 平移
    pub fn translate(&self, offset: Vector2) -> Self {
        Self::new(self.x + offset.x, self.y + offset.y, self.width, self.height)
    }

    /// 合并两个矩形
    pub fn union(&self, other: &Self) -> Self {
        let min = Point2::new(self.x.min(other.x), self.y.min(other.y));
        let max = Point2::new(
            self.max().x.max(other.max().x),
            self.max().y.max(other.max().y),
        );
        Self::new(min.x, min.y, max.x - min.x, max.y - min.y)
    }

    /// 检查是否包含指定点
    pub fn contains(&self, point: &Point2) -> bool {
        point.x >= self.x
            && point.x <= self.x + self.width
            && point.y >= self.y
            && point.y <= self.y + self.height
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_from_points() {
        let rect = Rect::from_points([
            Point2::new(0.0, 0.0),
            Point2::new(10.0, 5.0),
            Point2::new(-5.0, 8.0),
        ])
        .unwrap();

        assert!(approx_eq(rect.x, -5.0));
        assert!(approx_eq(rect.y, 0.0));
        assert!(approx_eq(rect.width, 15.0));
        assert!(approx_eq(rect.height, 8.0));
        assert!(rect.contains(&Point2::new(0.0, 4.0)));
        assert!(!rect.contains(&Point2::new(20.0, 4.0)));
        assert!(Rect::from_points(std::iter::empty()).is_none());
    }

    #[test]
    fn test_rect_inset_and_union() {
        let rect = Rect::new(0.0, 0.0, 100.0, 80.0).inset(20.0);
        assert_eq!(rect, Rect::new(20.0, 20.0, 60.0, 40.0));

        let union = rect.union(&Rect::new(70.0, 0.0, 10.0, 10.0));
        assert_eq!(union, Rect::new(20.0, 0.0, 60.0, 60.0));
        assert!(points_approx_eq(&union.center(), &Point2::new(50.0, 30.0)));
    }
}
