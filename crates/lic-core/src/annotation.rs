//! 注释：自由文本、箭头与图片
//!
//! 箭头的几何由它的控制点 [`Point`] 决定；控制点坐标位于注释父条目的
//! 坐标系中，或者位于 `relative_to` 指定条目的坐标系中。

use crate::document::Document;
use crate::error::RegistryError;
use crate::item::{node_common, ItemId, ItemType, Lookup, Node};
use crate::math::{Point2, Rect};
use crate::model::ModelProvider;
use crate::render::SizeProvider;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// 注释类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AnnotationType {
    Label,
    Arrow,
    Image,
}

/// 注释
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    pub id: ItemId,
    pub parent: Option<Lookup>,
    pub annotation_type: AnnotationType,
    pub text: Option<String>,
    pub font: Option<String>,
    pub color: Option<String>,
    /// 图片注释的来源
    pub src: Option<String>,
    /// 箭头控制点
    pub points: Vec<ItemId>,
    pub bounds: Option<Rect>,
}

impl Annotation {
    pub fn new(annotation_type: AnnotationType, parent: Lookup) -> Self {
        Self {
            id: 0,
            parent: Some(parent),
            annotation_type,
            text: None,
            font: None,
            color: None,
            src: None,
            points: Vec::new(),
            bounds: None,
        }
    }

    pub fn is_label(&self) -> bool {
        self.annotation_type == AnnotationType::Label
    }
}

impl Node for Annotation {
    node_common!(ItemType::Annotation);

    fn child_list(&self, child: ItemType) -> Option<&Vec<ItemId>> {
        (child == ItemType::Point).then_some(&self.points)
    }

    fn child_list_mut(&mut self, child: ItemType) -> Option<&mut Vec<ItemId>> {
        (child == ItemType::Point).then_some(&mut self.points)
    }
}

/// 箭头控制点
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub id: ItemId,
    pub parent: Option<Lookup>,
    pub x: f64,
    pub y: f64,
    /// 坐标参照条目，缺省为注释的父条目
    pub relative_to: Option<Lookup>,
}

impl Point {
    pub fn new(annotation: Lookup, x: f64, y: f64) -> Self {
        Self {
            id: 0,
            parent: Some(annotation),
            x,
            y,
            relative_to: None,
        }
    }
}

impl Node for Point {
    fn item_type(&self) -> ItemType {
        ItemType::Point
    }

    fn id(&self) -> ItemId {
        self.id
    }

    fn set_id(&mut self, id: ItemId) {
        self.id = id;
    }

    fn parent(&self) -> Option<Lookup> {
        self.parent
    }

    fn set_parent(&mut self, parent: Option<Lookup>) {
        self.parent = parent;
    }

    fn position(&self) -> Option<Point2> {
        Some(Point2::new(self.x, self.y))
    }

    fn set_position(&mut self, x: f64, y: f64) {
        self.x = x;
        self.y = y;
    }
}

/// 添加注释的参数
#[derive(Debug, Clone, PartialEq)]
pub struct AddAnnotationOptions {
    pub annotation_type: AnnotationType,
    /// 所属页面或步骤
    pub parent: Lookup,
    pub x: f64,
    pub y: f64,
    pub text: Option<String>,
    pub font: Option<String>,
    pub color: Option<String>,
    pub src: Option<String>,
}

impl AddAnnotationOptions {
    pub fn new(annotation_type: AnnotationType, parent: impl Into<Lookup>, x: f64, y: f64) -> Self {
        Self {
            annotation_type,
            parent: parent.into(),
            x,
            y,
            text: None,
            font: None,
            color: None,
            src: None,
        }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn with_font(mut self, font: impl Into<String>) -> Self {
        self.font = Some(font.into());
        self
    }

    pub fn with_src(mut self, src: impl Into<String>) -> Self {
        self.src = Some(src.into());
        self
    }
}

/// 修改注释的参数
#[derive(Debug, Clone, PartialEq)]
pub struct SetAnnotationOptions {
    pub annotation: Lookup,
    /// 新文本，仅对文本注释有效
    pub text: Option<String>,
    /// 修改后重新布局所在页面
    pub do_layout: bool,
}

impl<M: ModelProvider, R: SizeProvider> Document<M, R> {
    /// 添加注释
    ///
    /// 文本注释使用默认文本、字体与颜色并立即测量尺寸；
    /// 箭头注释得到两个控制点 `(x, y)` 与 `(x + arrow_length, y)`；
    /// 图片注释的尺寸在图片加载后才确定，初始为零。
    pub fn add_annotation(&mut self, opts: AddAnnotationOptions) -> Result<Lookup, RegistryError> {
        let mut annotation = Annotation::new(opts.annotation_type, opts.parent);
        match opts.annotation_type {
            AnnotationType::Label => {
                let text = opts.text.unwrap_or_else(|| "Label".to_string());
                let font = opts
                    .font
                    .unwrap_or_else(|| self.config.annotation_font.clone());
                let size = self.renderer.measure_label(&font, &text);
                annotation.bounds = Some(Rect::new(opts.x, opts.y, size.width, size.height));
                annotation.text = Some(text);
                annotation.font = Some(font);
                annotation.color = Some(opts.color.unwrap_or_else(|| "black".to_string()));
            }
            AnnotationType::Arrow => {
                annotation.color = opts.color;
            }
            AnnotationType::Image => {
                annotation.src = opts.src;
                annotation.bounds = Some(Rect::new(opts.x, opts.y, 0.0, 0.0));
            }
        }

        let lookup = self.state.add_child(annotation, opts.parent)?;
        if opts.annotation_type == AnnotationType::Arrow {
            let end_x = opts.x + self.config.arrow_length;
            self.state.add_child(Point::new(lookup, opts.x, opts.y), lookup)?;
            self.state.add_child(Point::new(lookup, end_x, opts.y), lookup)?;
        }
        debug!("Added {:?} annotation {} to {}", opts.annotation_type, lookup, opts.parent);
        Ok(lookup)
    }

    /// 修改注释，注释不存在时返回 `None`
    pub fn set_annotation(&mut self, opts: SetAnnotationOptions) -> Option<Lookup> {
        if opts.annotation.item_type != ItemType::Annotation {
            return None;
        }
        let annotation = self.state.annotation_mut(opts.annotation.id)?;
        if let Some(text) = opts.text {
            if annotation.is_label() {
                annotation.text = Some(text);
                self.layout_label(opts.annotation);
            }
        }
        if opts.do_layout {
            self.layout_page_for(opts.annotation);
        }
        Some(opts.annotation)
    }

    /// 删除注释及其控制点
    pub fn delete_annotation(&mut self, annotation: impl Into<Lookup>) -> bool {
        let lookup = annotation.into();
        if lookup.item_type != ItemType::Annotation {
            return false;
        }
        self.state.delete_item(lookup)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_position() {
        let mut point = Point::new(Lookup::new(ItemType::Annotation, 0), 3.0, 4.0);
        assert_eq!(point.position(), Some(Point2::new(3.0, 4.0)));
        point.set_position(10.0, 12.0);
        assert_eq!((point.x, point.y), (10.0, 12.0));
        assert!(point.bounds().is_none());
    }

    #[test]
    fn test_annotation_points_list() {
        let annotation = Annotation::new(AnnotationType::Arrow, Lookup::new(ItemType::Page, 0));
        assert!(annotation.child_list(ItemType::Point).is_some());
        assert!(annotation.child_list(ItemType::Step).is_none());
        assert!(!annotation.is_label());
    }
}
