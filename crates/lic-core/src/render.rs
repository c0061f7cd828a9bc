//! 尺寸提供者（渲染器）接口
//!
//! 布局引擎不绘制像素，只向渲染器询问步骤图、零件图标和文本的像素尺寸。

use crate::math::Size;
use crate::model::{Model, Part};
use crate::step::Step;

/// 尺寸提供者
///
/// 对布局引擎而言是纯函数；实现可以自行缓存。
pub trait SizeProvider {
    /// 步骤图（CSI）尺寸
    fn measure_step_picture(&self, model: &Model, step: &Step) -> Size;

    /// 零件表图标尺寸
    fn measure_part_icon(&self, part: &Part) -> Size;

    /// 文本尺寸，`font` 为 CSS 风格字体描述
    fn measure_label(&self, font: &str, text: &str) -> Size;
}

/// 不依赖渲染的估算实现
///
/// 结果完全由输入决定，适合命令行批处理和测试。
#[derive(Debug, Clone, PartialEq)]
pub struct EstimatingSizeProvider {
    /// 零件图标尺寸
    pub icon_size: Size,
    /// 子模型图标尺寸
    pub submodel_icon_size: Size,
    /// 空步骤图尺寸
    pub picture_base: Size,
    /// 每个零件使步骤图增长的像素
    pub picture_growth: f64,
    /// 步骤图尺寸上限
    pub picture_max: Size,
}

impl Default for EstimatingSizeProvider {
    fn default() -> Self {
        Self {
            icon_size: Size::new(40.0, 30.0),
            submodel_icon_size: Size::new(60.0, 45.0),
            picture_base: Size::new(120.0, 90.0),
            picture_growth: 6.0,
            picture_max: Size::new(400.0, 300.0),
        }
    }
}

impl EstimatingSizeProvider {
    /// 从字体描述中取出像素字号（`20pt` 按 4/3 换算，`16px` 原样）
    fn font_pixels(font: &str) -> f64 {
        font.split_whitespace()
            .find_map(|token| {
                if let Some(pt) = token.strip_suffix("pt") {
                    pt.parse::<f64>().ok().map(|v| v * 4.0 / 3.0)
                } else {
                    token.strip_suffix("px").and_then(|px| px.parse::<f64>().ok())
                }
            })
            .unwrap_or(16.0)
    }
}

impl SizeProvider for EstimatingSizeProvider {
    fn measure_step_picture(&self, model: &Model, step: &Step) -> Size {
        // 封面页步骤没有零件，按整个模型估算
        let count = if step.parts.is_empty() {
            model.parts.len()
        } else {
            step.parts.len()
        } as f64;
        Size::new(
            (self.picture_base.width + count * self.picture_growth).min(self.picture_max.width),
            (self.picture_base.height + count * self.picture_growth * 0.75)
                .min(self.picture_max.height),
        )
    }

    fn measure_part_icon(&self, part: &Part) -> Size {
        if part.filename.ends_with(".ldr") || part.filename.ends_with(".mpd") {
            self.submodel_icon_size
        } else {
            self.icon_size
        }
    }

    fn measure_label(&self, font: &str, text: &str) -> Size {
        let px = Self::font_pixels(font);
        let factor = if font.contains("bold") { 0.65 } else { 0.6 };
        let chars = text.chars().count() as f64;
        Size::new((chars * px * factor).ceil(), (px * 1.2).ceil())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::{ItemType, Lookup};

    #[test]
    fn test_font_pixels() {
        assert_eq!(EstimatingSizeProvider::font_pixels("bold 15pt Helvetica"), 20.0);
        assert_eq!(EstimatingSizeProvider::font_pixels("12px Arial"), 12.0);
        assert_eq!(EstimatingSizeProvider::font_pixels("Helvetica"), 16.0);
    }

    #[test]
    fn test_measure_label_is_deterministic() {
        let sizes = EstimatingSizeProvider::default();
        let a = sizes.measure_label("bold 10pt Helvetica", "x3");
        let b = sizes.measure_label("bold 10pt Helvetica", "x3");
        assert_eq!(a, b);
        assert!(sizes.measure_label("bold 10pt Helvetica", "x12").width > a.width);
        assert_eq!(sizes.measure_label("10pt Helvetica", "").width, 0.0);
    }

    #[test]
    fn test_step_picture_is_capped() {
        let sizes = EstimatingSizeProvider::default();
        let model = Model::new("big.ldr");
        let mut step = Step::new(Lookup::new(ItemType::Page, 0));
        step.parts = (0..500).collect();
        assert_eq!(sizes.measure_step_picture(&model, &step), sizes.picture_max);
    }
}
