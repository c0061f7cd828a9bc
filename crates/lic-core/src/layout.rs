//! 布局引擎
//!
//! 根据页面尺寸、配置与尺寸提供者给出的像素尺寸，重新计算页面子树中
//! 每个条目的几何信息。布局只覆盖几何并清除 `needs_layout`，
//! 不创建也不删除条目；对同一状态重复布局得到相同结果。
//!
//! 坐标均相对父条目：步骤相对页面，步骤图、零件表、步骤号相对步骤，
//! 零件表项相对零件表，数量标签相对零件表项。

use crate::annotation::Annotation;
use crate::document::Document;
use crate::item::{ItemId, ItemType, Lookup, Node};
use crate::math::{Rect, Size};
use crate::model::{ModelProvider, Part};
use crate::page::{Page, PageKind};
use crate::pli::quantity_text;
use crate::render::SizeProvider;
use crate::step::Step;
use tracing::debug;

/// LDraw 主色，子模型图使用
const MAIN_COLOR: i32 = 16;

impl<M: ModelProvider, R: SizeProvider> Document<M, R> {
    /// 布局页面
    ///
    /// 步骤按 `ceil(sqrt(n))` 列的网格排列，页码标签放在右下角。
    /// 封面页转交 [`Document::layout_title_page`]。
    pub fn layout_page(&mut self, page: impl Into<Lookup>) -> bool {
        let lookup = page.into();
        let Some(page) = self.state.get::<Page>(lookup) else {
            return false;
        };
        if page.is_title_page() {
            return self.layout_title_page();
        }

        let steps = page.steps.clone();
        let number = page.number;
        let number_label = page.number_label;
        let page_size = self.state.page_size;
        let margin = self.config.page_margin;

        let count = steps.len();
        if count > 0 {
            let cols = (count as f64).sqrt().ceil() as usize;
            let rows = count.div_ceil(cols);
            let col_size = (page_size.width / cols as f64).floor();
            let row_size = (page_size.height / rows as f64).floor();
            for (i, &id) in steps.iter().enumerate() {
                let cell = Rect::new(
                    col_size * (i % cols) as f64,
                    row_size * (i / cols) as f64,
                    col_size,
                    row_size,
                );
                self.layout_step(Lookup::new(ItemType::Step, id), cell);
            }
        }

        if let Some(label_id) = number_label {
            let text = number.map(|n| n.to_string()).unwrap_or_default();
            let size = self
                .renderer
                .measure_label(&self.config.page_number_font, &text);
            if let Some(label) = self.state.number_label_mut(label_id) {
                label.bounds = Some(Rect::new(
                    page_size.width - margin - size.width,
                    page_size.height - margin - size.height,
                    size.width,
                    size.height,
                ));
            }
        }

        if let Some(page) = self.state.get_mut::<Page>(lookup) {
            page.needs_layout = false;
        }
        debug!("Laid out {} ({} steps)", lookup, count);
        true
    }

    /// 在给定单元格内布局步骤
    ///
    /// 步骤矩形为单元格四边内缩 `page_margin`；步骤图居中；
    /// 零件表从左上角开始横向排列；步骤号位于零件表下方。
    pub fn layout_step(&mut self, step: impl Into<Lookup>, cell: Rect) -> bool {
        let lookup = step.into();
        let Some(step) = self.state.get::<Step>(lookup) else {
            return false;
        };
        let step = step.clone();
        let margin = self.config.page_margin;
        let bounds = cell.inset(margin);
        if let Some(s) = self.state.step_mut(step.id) {
            s.bounds = Some(bounds);
        }

        let csi_rect = match step.csi_id {
            Some(csi_id) => {
                let size = match self.model.submodel_descendant(&step.submodel) {
                    Some(model) => self.renderer.measure_step_picture(model, &step),
                    None => Size::ZERO,
                };
                let rect = Rect::new(
                    ((bounds.width - size.width) / 2.0).floor(),
                    ((bounds.height - size.height) / 2.0).floor(),
                    size.width,
                    size.height,
                );
                if let Some(csi) = self.state.csi_mut(csi_id) {
                    csi.bounds = Some(rect);
                }
                Some(rect)
            }
            None => None,
        };

        let pli_height = match step.pli_id {
            Some(pli_id) if self.state.plis_visible => self.layout_pli(pli_id, &step.submodel),
            Some(pli_id) => {
                if let Some(pli) = self.state.pli_mut(pli_id) {
                    pli.bounds = Some(Rect::ZERO);
                }
                0.0
            }
            None => 0.0,
        };

        if let Some(label_id) = step.number_label {
            let text = step.number.map(|n| n.to_string()).unwrap_or_default();
            let size = self
                .renderer
                .measure_label(&self.config.step_number_font, &text);
            let y = if pli_height > 0.0 {
                pli_height + margin
            } else {
                0.0
            };
            if let Some(label) = self.state.number_label_mut(label_id) {
                label.bounds = Some(Rect::new(0.0, y, size.width, size.height));
            }
        }

        if let Some(icon_id) = step.rotate_icon_id {
            let size = self.config.rotate_icon_size;
            let (x, y) = match csi_rect {
                Some(csi) => (
                    csi.x + csi.width + margin,
                    csi.y + ((csi.height - size.height) / 2.0).floor(),
                ),
                None => (bounds.width - size.width, 0.0),
            };
            if let Some(icon) = self.state.rotate_icon_mut(icon_id) {
                icon.bounds = Some(Rect::new(x, y, size.width, size.height));
            }
        }

        if let Some(image_id) = step.submodel_image_id {
            self.layout_submodel_image(image_id, bounds);
        }

        for &callout in &step.callouts {
            self.layout_callout(callout);
        }
        true
    }

    /// 布局零件表，返回零件表高度（空零件表为 0）
    fn layout_pli(&mut self, pli_id: ItemId, submodel: &[usize]) -> f64 {
        let pli_margin = self.config.pli_margin;
        let offset = self.config.qty_label_offset;
        let Some(pli) = self.state.pli(pli_id) else {
            return 0.0;
        };
        let items = pli.pli_items.clone();
        if items.is_empty() {
            if let Some(pli) = self.state.pli_mut(pli_id) {
                pli.bounds = Some(Rect::ZERO);
            }
            return 0.0;
        }

        let mut left = pli_margin + offset;
        let mut max_height: f64 = 0.0;
        for id in items {
            let Some(item) = self.state.pli_item(id) else {
                continue;
            };
            let part = item
                .part_numbers
                .first()
                .and_then(|&p| self.model.part_from_id(p, submodel))
                .filter(|p| item.matches(&p.filename, p.color_code))
                .cloned()
                .unwrap_or_else(|| item.part());
            let icon = self.renderer.measure_part_icon(&part);
            let label = self
                .renderer
                .measure_label(&self.config.pli_qty_font, &quantity_text(item.quantity));
            let qty_id = item.quantity_label;

            if let Some(item) = self.state.pli_item_mut(id) {
                item.bounds = Some(Rect::new(
                    left.floor(),
                    pli_margin.floor(),
                    icon.width,
                    icon.height,
                ));
            }
            if let Some(qty) = qty_id.and_then(|q| self.state.pli_qty_mut(q)) {
                qty.bounds = Some(Rect::new(
                    -offset,
                    icon.height - offset,
                    label.width,
                    label.height,
                ));
            }

            left += (icon.width + pli_margin).floor();
            max_height = max_height.max(icon.height - offset + label.height);
        }

        let height = pli_margin + max_height + pli_margin;
        if let Some(pli) = self.state.pli_mut(pli_id) {
            pli.bounds = Some(Rect::new(0.0, 0.0, left, height));
        }
        height
    }

    /// 子模型图放在步骤右上角，数量标签在图内右下角
    fn layout_submodel_image(&mut self, image_id: ItemId, step_bounds: Rect) {
        let pli_margin = self.config.pli_margin;
        let offset = self.config.qty_label_offset;
        let Some(image) = self.state.submodel_image(image_id) else {
            return;
        };
        let icon = match self.model.submodel_descendant(&image.submodel) {
            Some(model) => self
                .renderer
                .measure_part_icon(&Part::new(model.filename.clone(), MAIN_COLOR)),
            None => Size::ZERO,
        };
        let label_size = self
            .renderer
            .measure_label(&self.config.pli_qty_font, &quantity_text(image.quantity));
        let label_id = image.quantity_label;

        let width = icon.width + pli_margin * 2.0;
        let height = icon.height + pli_margin * 2.0;
        if let Some(image) = self.state.submodel_image_mut(image_id) {
            image.bounds = Some(Rect::new(step_bounds.width - width, 0.0, width, height));
        }
        if let Some(label) = label_id.and_then(|id| self.state.quantity_label_mut(id)) {
            label.bounds = Some(Rect::new(
                width - label_size.width - offset,
                height - label_size.height - offset,
                label_size.width,
                label_size.height,
            ));
        }
    }

    /// 插图框内的步骤按等高行自上而下排列；插图框自身位置不变
    pub fn layout_callout(&mut self, callout: ItemId) -> bool {
        let Some(callout) = self.state.callout(callout) else {
            return false;
        };
        let Some(bounds) = callout.bounds else {
            return false;
        };
        let steps = callout.steps.clone();
        if steps.is_empty() {
            return true;
        }
        let row = (bounds.height / steps.len() as f64).floor();
        for (i, id) in steps.into_iter().enumerate() {
            let cell = Rect::new(0.0, row * i as f64, bounds.width, row);
            self.layout_step(Lookup::new(ItemType::Step, id), cell);
        }
        true
    }

    /// 布局封面页：步骤图居中并留白，标题在其上方居中，模型信息在其下方居中
    pub fn layout_title_page(&mut self) -> bool {
        let Some(page) = self.state.title_page.as_ref() else {
            return false;
        };
        let step_id = page.steps.first().copied();
        let labels = page.labels.clone();
        let page_size = self.state.page_size;
        let padding = self.config.title_page_padding;

        let mut step_rect = Rect::new(page_size.width / 2.0, page_size.height / 2.0, 0.0, 0.0);
        if let Some(step_id) = step_id {
            let full_page = Rect::new(0.0, 0.0, page_size.width, page_size.height);
            self.layout_step(Lookup::new(ItemType::Step, step_id), full_page);

            let csi_id = self.state.step(step_id).and_then(|s| s.csi_id);
            let csi_size = csi_id
                .and_then(|id| self.state.csi(id))
                .and_then(|csi| csi.bounds)
                .map_or(Size::ZERO, |b| b.size());
            let width = csi_size.width + padding * 2.0;
            let height = csi_size.height + padding * 2.0;
            step_rect = Rect::new(
                ((page_size.width - width) / 2.0).floor(),
                ((page_size.height - height) / 2.0).floor(),
                width,
                height,
            );
            if let Some(step) = self.state.step_mut(step_id) {
                step.bounds = Some(step_rect);
            }
            if let Some(csi) = csi_id.and_then(|id| self.state.csi_mut(id)) {
                csi.set_position(padding, padding);
            }
        }

        // 第一个标签为标题，第二个为模型信息
        for (idx, &label_id) in labels.iter().take(2).enumerate() {
            let Some(label) = self.state.label(label_id) else {
                continue;
            };
            let size = self.renderer.measure_label(&label.font, &label.text);
            let mut y = (step_rect.y - size.height) / 2.0;
            if idx == 1 {
                y += step_rect.y + step_rect.height;
            }
            if let Some(label) = self.state.label_mut(label_id) {
                label.bounds = Some(Rect::new(
                    (page_size.width - size.width) / 2.0,
                    y,
                    size.width,
                    size.height,
                ));
            }
        }

        if let Some(page) = self.state.title_page.as_mut() {
            page.needs_layout = false;
        }
        debug!("Laid out title page");
        true
    }

    /// 测量文本注释并更新尺寸，位置保持不变
    pub fn layout_label(&mut self, annotation: impl Into<Lookup>) -> Option<Rect> {
        let lookup = annotation.into();
        let annotation = self.state.get::<Annotation>(lookup)?;
        if !annotation.is_label() {
            return None;
        }
        let text = annotation.text.as_deref().unwrap_or_default();
        let font = annotation
            .font
            .as_deref()
            .unwrap_or(&self.config.annotation_font);
        let size = self.renderer.measure_label(font, text);
        let origin = annotation.bounds.map_or((0.0, 0.0), |b| (b.x, b.y));

        let rect = Rect::new(origin.0, origin.1, size.width, size.height);
        self.state.node_mut(lookup)?.set_bounds(Some(rect));
        Some(rect)
    }

    /// 除模板页外的全部页面，按页面顺序
    fn layout_targets(&self, pending_only: bool) -> Vec<Lookup> {
        self.state
            .page_list()
            .into_iter()
            .filter(|p| p.kind != PageKind::Template)
            .filter(|p| !pending_only || p.needs_layout)
            .map(|p| p.lookup())
            .collect()
    }

    /// 布局所有页面，返回布局的页面数
    pub fn layout_all(&mut self) -> usize {
        let pages = self.layout_targets(false);
        for &page in &pages {
            self.layout_page(page);
        }
        debug!("Laid out {} pages", pages.len());
        pages.len()
    }

    /// 只布局标记为待布局的页面
    pub fn layout_pending(&mut self) -> usize {
        let pages = self.layout_targets(true);
        for &page in &pages {
            self.layout_page(page);
        }
        pages.len()
    }

    /// 布局条目所在的页面
    pub fn layout_page_for(&mut self, item: impl Into<Lookup>) -> bool {
        match self.state.page_lookup_for_item(item) {
            Some(page) => self.layout_page(page),
            None => false,
        }
    }
}
