//! 辅助装饰：插图框、子模型图、分隔线与旋转图标

use crate::document::Document;
use crate::item::{node_common, ItemId, ItemType, Lookup, Node};
use crate::label::QuantityLabel;
use crate::math::Rect;
use crate::model::ModelProvider;
use crate::mutation::AddStepOptions;
use crate::render::SizeProvider;
use crate::step::Step;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// 插图框（Callout），内含若干子步骤
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Callout {
    pub id: ItemId,
    pub parent: Option<Lookup>,
    pub steps: Vec<ItemId>,
    pub bounds: Option<Rect>,
}

impl Callout {
    pub fn new(step: Lookup) -> Self {
        Self {
            id: 0,
            parent: Some(step),
            steps: Vec::new(),
            bounds: None,
        }
    }
}

impl Node for Callout {
    node_common!(ItemType::Callout);

    fn child_list(&self, child: ItemType) -> Option<&Vec<ItemId>> {
        (child == ItemType::Step).then_some(&self.steps)
    }

    fn child_list_mut(&mut self, child: ItemType) -> Option<&mut Vec<ItemId>> {
        (child == ItemType::Step).then_some(&mut self.steps)
    }
}

/// 子模型完成图
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmodelImage {
    pub id: ItemId,
    pub parent: Option<Lookup>,
    /// 子模型路径
    pub submodel: Vec<usize>,
    pub quantity: u32,
    pub quantity_label: Option<ItemId>,
    pub bounds: Option<Rect>,
}

impl SubmodelImage {
    pub fn new(step: Lookup, submodel: Vec<usize>, quantity: u32) -> Self {
        Self {
            id: 0,
            parent: Some(step),
            submodel,
            quantity,
            quantity_label: None,
            bounds: None,
        }
    }
}

impl Node for SubmodelImage {
    node_common!(ItemType::SubmodelImage);

    fn child_slot(&self, child: ItemType) -> Option<ItemId> {
        match child {
            ItemType::QuantityLabel => self.quantity_label,
            _ => None,
        }
    }

    fn set_child_slot(&mut self, child: ItemType, id: Option<ItemId>) -> bool {
        match child {
            ItemType::QuantityLabel => {
                self.quantity_label = id;
                true
            }
            _ => false,
        }
    }
}

/// 页面分隔线
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Divider {
    pub id: ItemId,
    pub parent: Option<Lookup>,
    pub bounds: Option<Rect>,
}

impl Divider {
    pub fn new(page: Lookup, bounds: Rect) -> Self {
        Self {
            id: 0,
            parent: Some(page),
            bounds: Some(bounds),
        }
    }
}

impl Node for Divider {
    node_common!(ItemType::Divider);
}

/// "翻转模型" 图标
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RotateIcon {
    pub id: ItemId,
    pub parent: Option<Lookup>,
    pub bounds: Option<Rect>,
}

impl RotateIcon {
    pub fn new(step: Lookup) -> Self {
        Self {
            id: 0,
            parent: Some(step),
            bounds: None,
        }
    }
}

impl Node for RotateIcon {
    node_common!(ItemType::RotateIcon);
}

/// 向插图框加入零件的参数
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddPartToCalloutOptions {
    pub part_id: usize,
    /// 零件所在的步骤
    pub step: Lookup,
    pub callout: Lookup,
}

/// 从插图框步骤移除零件的参数
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RemovePartFromCalloutOptions {
    pub part_id: usize,
    /// 插图框内的步骤
    pub step: Lookup,
}

impl<M: ModelProvider, R: SizeProvider> Document<M, R> {
    /// 在步骤上添加空插图框，放在步骤左下角
    pub fn add_callout(&mut self, step: impl Into<Lookup>) -> Option<Lookup> {
        let step = step.into();
        let step_bounds = self.state.get::<Step>(step)?.bounds;
        let margin = self.config.page_margin;
        let size = self.config.callout_size;
        let y = step_bounds.map_or(margin, |b| (b.height - size.height - margin).max(0.0));

        let mut callout = Callout::new(step);
        callout.bounds = Some(Rect::new(margin, y, size.width, size.height));
        let lookup = self.state.add_child(callout, step).ok()?;
        self.state.mark_needs_layout(step);
        self.layout_page_for(step);
        debug!("Added callout {} to {}", lookup, step);
        Some(lookup)
    }

    /// 把步骤中的零件加入插图框
    ///
    /// 空插图框先新建一个子步骤，否则使用最后一个子步骤。
    /// 返回接收零件的插图框步骤。
    pub fn add_part_to_callout(&mut self, opts: AddPartToCalloutOptions) -> Option<Lookup> {
        let submodel = self.state.get::<Step>(opts.step)?.submodel.clone();
        let last = self.state.get::<Callout>(opts.callout)?.steps.last().copied();
        let dest = match last {
            Some(id) => Lookup::new(ItemType::Step, id),
            None => self.add_step(AddStepOptions::new(opts.callout))?,
        };

        let dest_step = self.state.step_mut(dest.id)?;
        dest_step.submodel = submodel;
        dest_step.add_part(opts.part_id);
        debug!("Added part {} to callout step {}", opts.part_id, dest);

        self.layout_page_for(opts.step);
        Some(dest)
    }

    /// 从插图框步骤移除零件
    pub fn remove_part_from_callout(&mut self, opts: RemovePartFromCalloutOptions) -> bool {
        let Some(step) = self.state.get_mut::<Step>(opts.step) else {
            return false;
        };
        if !step.remove_part(opts.part_id) {
            warn!("Part {} not found in {}", opts.part_id, opts.step);
            return false;
        }
        self.layout_page_for(opts.step);
        true
    }

    /// 在页面上添加分隔线
    pub fn add_divider(&mut self, page: impl Into<Lookup>, bounds: Rect) -> Option<Lookup> {
        let page = page.into();
        let lookup = self.state.add_child(Divider::new(page, bounds), page).ok()?;
        debug!("Added divider {} to {}", lookup, page);
        Some(lookup)
    }

    /// 为步骤添加旋转图标，步骤已有图标时返回原图标
    pub fn add_rotate_icon(&mut self, step: impl Into<Lookup>) -> Option<Lookup> {
        let step = step.into();
        if let Some(id) = self.state.get::<Step>(step)?.rotate_icon_id {
            return Some(Lookup::new(ItemType::RotateIcon, id));
        }
        let lookup = self.state.add_child(RotateIcon::new(step), step).ok()?;
        self.layout_page_for(step);
        Some(lookup)
    }

    /// 为步骤添加子模型完成图，数量大于 1 时附带数量标签
    pub fn add_submodel_image(&mut self, step: impl Into<Lookup>, quantity: u32) -> Option<Lookup> {
        let step = step.into();
        let existing = self.state.get::<Step>(step)?;
        if existing.submodel_image_id.is_some() {
            warn!("{} already has a submodel image", step);
            return None;
        }
        let image = SubmodelImage::new(step, existing.submodel.clone(), quantity);
        let lookup = self.state.add_child(image, step).ok()?;
        if quantity > 1 {
            self.state
                .add_child(QuantityLabel::new(lookup), lookup)
                .ok()?;
        }
        self.layout_page_for(step);
        Some(lookup)
    }
}
