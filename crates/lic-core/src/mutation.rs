//! 结构修改
//!
//! 所有操作先解析引用，解析失败或守卫拒绝时不做任何修改，
//! 返回 `None` / `false`。[`State`] 上的操作只修改结构并把受影响的页面
//! 标记为待布局；[`Document`] 上的操作在修改后立即重新布局受影响的页面。

use crate::document::Document;
use crate::item::{ItemId, ItemType, Lookup, Node};
use crate::label::NumberLabel;
use crate::model::ModelProvider;
use crate::page::Page;
use crate::pli::{Pli, PliItem, PliQty};
use crate::render::SizeProvider;
use crate::state::State;
use crate::step::{Csi, DisplacedPart, Direction, Step};
use std::collections::HashMap;
use tracing::{debug, warn};

/// 重新挂接条目的参数
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReparentOptions {
    pub item: Lookup,
    pub new_parent: Lookup,
    /// 插入位置，越界时截断；缺省追加到末尾
    pub insertion_index: Option<usize>,
}

/// 移动条目位置的参数
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RepositionOptions {
    pub item: Lookup,
    pub x: f64,
    pub y: f64,
}

/// 在步骤之间移动零件的参数
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MovePartOptions {
    pub part_id: usize,
    pub src_step: Lookup,
    pub dest_step: Lookup,
}

/// 把步骤移到其他页面的参数
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveStepOptions {
    pub step: Lookup,
    pub dest_page: Lookup,
    pub insertion_index: usize,
}

impl MoveStepOptions {
    /// 插入到目标页面的第一个位置
    pub fn new(step: impl Into<Lookup>, dest_page: impl Into<Lookup>) -> Self {
        Self {
            step: step.into(),
            dest_page: dest_page.into(),
            insertion_index: 0,
        }
    }
}

/// 合并步骤的参数
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MergeStepsOptions {
    pub source_step: Lookup,
    pub dest_step: Lookup,
}

/// 添加步骤的参数
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddStepOptions {
    /// 页面或插图框
    pub dest: Lookup,
    /// 缺省追加到末尾
    pub insertion_index: Option<usize>,
}

impl AddStepOptions {
    pub fn new(dest: impl Into<Lookup>) -> Self {
        Self {
            dest: dest.into(),
            insertion_index: None,
        }
    }

    pub fn at(mut self, index: usize) -> Self {
        self.insertion_index = Some(index);
        self
    }
}

/// 零件位移参数；`direction` 为 `None` 时取消位移
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplacePartOptions {
    pub step: Lookup,
    pub part_id: usize,
    pub direction: Option<Direction>,
    pub part_distance: Option<f64>,
    pub arrow_offset: Option<f64>,
    pub arrow_length: Option<f64>,
    pub arrow_rotation: Option<f64>,
}

impl DisplacePartOptions {
    pub fn new(step: impl Into<Lookup>, part_id: usize, direction: Option<Direction>) -> Self {
        Self {
            step: step.into(),
            part_id,
            direction,
            part_distance: None,
            arrow_offset: None,
            arrow_length: None,
            arrow_rotation: None,
        }
    }
}

impl State {
    /// 把条目挂到新的父条目下
    ///
    /// 同时更新条目的 `parent`、旧父条目与新父条目的子条目列表。
    /// 新父条目没有对应列表时拒绝。
    pub fn reparent_item(&mut self, opts: ReparentOptions) -> Option<Lookup> {
        let item_type = opts.item.item_type;
        let old_parent = self.node(opts.item)?.parent();
        if self.node(opts.new_parent)?.child_list(item_type).is_none() {
            warn!("{} has no {} list", opts.new_parent, item_type);
            return None;
        }

        if let Some(old_parent) = old_parent {
            if let Some(list) = self
                .node_mut(old_parent)
                .and_then(|n| n.child_list_mut(item_type))
            {
                list.retain(|&id| id != opts.item.id);
            }
            self.mark_needs_layout(old_parent);
        }

        let list = self.node_mut(opts.new_parent)?.child_list_mut(item_type)?;
        match opts.insertion_index {
            Some(idx) => list.insert(idx.min(list.len()), opts.item.id),
            None => list.push(opts.item.id),
        }
        self.node_mut(opts.item)?.set_parent(Some(opts.new_parent));
        self.mark_needs_layout(opts.new_parent);
        debug!("Reparented {} to {}", opts.item, opts.new_parent);
        Some(opts.item)
    }

    /// 移动条目位置；没有几何信息的条目得到零尺寸矩形
    pub fn reposition_item(&mut self, opts: RepositionOptions) -> Option<Lookup> {
        self.node_mut(opts.item)?.set_position(opts.x, opts.y);
        Some(opts.item)
    }

    /// 压缩编号
    ///
    /// 按存储顺序遍历：第一个编号大于 1 时置为 1；之后的编号超过
    /// 前一个编号 + 1 时置为前一个编号 + 1；连续或相等的编号不变。
    /// "前一个编号" 按父条目类型分别记录。返回编号被修改的条目。
    pub fn renumber(&mut self, item_type: ItemType) -> Vec<Lookup> {
        let numbered: Vec<(Lookup, u32, Option<ItemType>)> = self
            .nodes(item_type)
            .into_iter()
            .filter_map(|n| Some((n.lookup(), n.number()?, n.parent().map(|p| p.item_type))))
            .collect();

        let mut previous: HashMap<Option<ItemType>, u32> = HashMap::new();
        let mut changed = Vec::new();
        for (lookup, number, parent_type) in numbered {
            let renumbered = match previous.get(&parent_type) {
                None if number > 1 => 1,
                Some(&prev) if number > prev + 1 => prev + 1,
                _ => number,
            };
            if renumbered != number {
                if let Some(node) = self.node_mut(lookup) {
                    node.set_number(Some(renumbered));
                }
                changed.push(lookup);
            }
            previous.insert(parent_type, renumbered);
        }

        for &lookup in &changed {
            self.mark_needs_layout(lookup);
        }
        if !changed.is_empty() {
            debug!("Renumbered {} {} items", changed.len(), item_type);
        }
        changed
    }

    /// 从父条目摘除（列表或槽位）
    fn detach_from_parent(&mut self, item: Lookup) {
        let Some(parent) = self.node(item).and_then(|n| n.parent()) else {
            return;
        };
        self.mark_needs_layout(parent);
        let Some(parent) = self.node_mut(parent) else {
            return;
        };
        if let Some(list) = parent.child_list_mut(item.item_type) {
            list.retain(|&id| id != item.id);
        } else if parent.child_slot(item.item_type) == Some(item.id) {
            parent.set_child_slot(item.item_type, None);
        }
    }

    /// 从父条目摘除并级联删除整棵子树
    pub fn delete_item(&mut self, item: impl Into<Lookup>) -> bool {
        let lookup = item.into();
        if self.node(lookup).is_none() {
            return false;
        }
        self.detach_from_parent(lookup);
        let count = self.delete_subtree(lookup);
        debug!("Deleted {} ({} items)", lookup, count);
        count > 0
    }

    /// 删除零件表；仍有零件时拒绝
    pub fn delete_pli(&mut self, pli: impl Into<Lookup>) -> bool {
        let lookup = pli.into();
        let Some(pli) = self.get::<Pli>(lookup) else {
            return false;
        };
        if !pli.pli_items.is_empty() {
            warn!("Refusing to delete {}: it still has items", lookup);
            return false;
        }
        self.delete_item(lookup)
    }

    /// 删除空页面并重新编号；仍有步骤时拒绝
    pub fn delete_page(&mut self, page: impl Into<Lookup>) -> bool {
        let lookup = page.into();
        let Some(page) = self.get::<Page>(lookup) else {
            return false;
        };
        if !page.steps.is_empty() {
            warn!("Refusing to delete {}: it still has steps", lookup);
            return false;
        }
        self.delete_subtree(lookup);
        self.renumber(lookup.item_type);
        debug!("Deleted page {}", lookup);
        true
    }

    /// 删除步骤及其子条目并重新编号；零件表仍有零件时拒绝
    pub fn delete_step(&mut self, step: impl Into<Lookup>) -> bool {
        let lookup = step.into();
        let Some(step) = self.get::<Step>(lookup) else {
            return false;
        };
        if let Some(pli) = step.pli_id.and_then(|id| self.pli(id)) {
            if !pli.pli_items.is_empty() {
                warn!("Refusing to delete {}: its PLI still has items", lookup);
                return false;
            }
        }
        self.detach_from_parent(lookup);
        self.delete_subtree(lookup);
        self.renumber(ItemType::Step);
        debug!("Deleted step {}", lookup);
        true
    }

    /// 把零件从来源零件表转移到目标零件表，返回接收零件的零件表项
    ///
    /// 来源项数量为 1 时并入目标中相同（文件名, 颜色）的项，或整体挂到目标下；
    /// 数量大于 1 时拆出一个新项（连同新的数量标签）。
    /// 没有目标零件表时只从来源项移除，来源项清空后删除。
    fn transfer_pli_part(
        &mut self,
        part_id: usize,
        src_pli: Lookup,
        dest_pli: Option<Lookup>,
    ) -> Option<Lookup> {
        let source = self
            .get::<Pli>(src_pli)?
            .pli_items
            .iter()
            .filter_map(|&id| self.pli_item(id))
            .find(|item| item.part_numbers.contains(&part_id))?
            .clone();
        let source_lookup = source.lookup();

        let Some(dest_pli) = dest_pli.filter(|&pli| self.get::<Pli>(pli).is_some()) else {
            let item = self.get_mut::<PliItem>(source_lookup)?;
            item.remove_part(part_id);
            if item.quantity == 0 {
                self.delete_item(source_lookup);
            }
            return None;
        };

        if source.quantity <= 1 {
            let target = self
                .matching_pli_item(dest_pli, &source.part())
                .map(|item| item.lookup())
                .filter(|&target| target != source_lookup);
            return match target {
                Some(target) => {
                    self.get_mut::<PliItem>(target)?.add_part(part_id);
                    self.delete_item(source_lookup);
                    Some(target)
                }
                None => self.reparent_item(ReparentOptions {
                    item: source_lookup,
                    new_parent: dest_pli,
                    insertion_index: None,
                }),
            };
        }

        self.get_mut::<PliItem>(source_lookup)?.remove_part(part_id);
        let qty_bounds = source
            .quantity_label
            .and_then(|id| self.pli_qty(id))
            .and_then(|qty| qty.bounds);

        let mut split = source;
        split.part_numbers = vec![part_id];
        split.quantity = 1;
        split.quantity_label = None;
        let new_item = self.add_child(split, dest_pli).ok()?;

        let mut qty = PliQty::new(new_item);
        qty.bounds = qty_bounds;
        self.add_child(qty, new_item).ok()?;
        Some(new_item)
    }

    /// 把槽位子条目（如零件表）移到新的父条目
    fn move_slot_child(&mut self, child: Lookup, new_parent: Lookup) -> Option<Lookup> {
        self.detach_from_parent(child);
        if !self
            .node_mut(new_parent)?
            .set_child_slot(child.item_type, Some(child.id))
        {
            return None;
        }
        self.node_mut(child)?.set_parent(Some(new_parent));
        Some(child)
    }
}

impl<M: ModelProvider, R: SizeProvider> Document<M, R> {
    /// 移动条目位置（用户拖动）
    pub fn reposition_item(&mut self, opts: RepositionOptions) -> Option<Lookup> {
        self.state.reposition_item(opts)
    }

    /// 级联删除条目并重新布局所在页面
    pub fn delete_item(&mut self, item: impl Into<Lookup>) -> bool {
        let deleted = self.state.delete_item(item);
        if deleted {
            self.layout_pending();
        }
        deleted
    }

    /// 把零件从一个步骤移到另一个步骤，返回目标步骤
    pub fn move_part_to_step(&mut self, opts: MovePartOptions) -> Option<Lookup> {
        if opts.src_step == opts.dest_step {
            return self
                .state
                .get::<Step>(opts.dest_step)
                .filter(|step| step.parts.contains(&opts.part_id))
                .map(|step| step.lookup());
        }
        let dest_pli = self.state.get::<Step>(opts.dest_step)?.pli_id;
        let src = self.state.get_mut::<Step>(opts.src_step)?;
        if !src.remove_part(opts.part_id) {
            warn!("Part {} not found in {}", opts.part_id, opts.src_step);
            return None;
        }
        let src_pli = src.pli_id;
        self.state.get_mut::<Step>(opts.dest_step)?.add_part(opts.part_id);

        if let Some(src_pli) = src_pli {
            self.state.transfer_pli_part(
                opts.part_id,
                Lookup::new(ItemType::Pli, src_pli),
                dest_pli.map(|id| Lookup::new(ItemType::Pli, id)),
            );
        }
        debug!(
            "Moved part {} from {} to {}",
            opts.part_id, opts.src_step, opts.dest_step
        );

        let src_page = self.state.page_lookup_for_item(opts.src_step);
        let dest_page = self.state.page_lookup_for_item(opts.dest_step);
        if let Some(page) = src_page {
            self.layout_page(page);
        }
        if let Some(page) = dest_page.filter(|&p| Some(p) != src_page) {
            self.layout_page(page);
        }
        Some(opts.dest_step)
    }

    /// 把步骤移到指定页面
    pub fn move_step_to_page(&mut self, opts: MoveStepOptions) -> Option<Lookup> {
        if opts.step.item_type != ItemType::Step || !opts.dest_page.item_type.is_page() {
            return None;
        }
        let current_page = self.state.get::<Step>(opts.step)?.parent?;
        if !current_page.item_type.is_page() {
            return None;
        }
        self.state.reparent_item(ReparentOptions {
            item: opts.step,
            new_parent: opts.dest_page,
            insertion_index: Some(opts.insertion_index),
        })?;
        self.layout_page(current_page);
        self.layout_page(opts.dest_page);
        Some(opts.dest_page)
    }

    /// 把步骤追加到上一个普通页末尾
    pub fn move_step_to_previous_page(&mut self, step: impl Into<Lookup>) -> Option<Lookup> {
        let step = step.into();
        let page = self.state.get::<Step>(step)?.parent?;
        if !page.item_type.is_page() {
            return None;
        }
        let dest = self.state.prev_basic_page(page)?;
        let opts = MoveStepOptions {
            step,
            dest_page: dest.lookup(),
            insertion_index: dest.steps.len(),
        };
        self.move_step_to_page(opts)
    }

    /// 把步骤插到下一个普通页开头
    pub fn move_step_to_next_page(&mut self, step: impl Into<Lookup>) -> Option<Lookup> {
        let step = step.into();
        let page = self.state.get::<Step>(step)?.parent?;
        if !page.item_type.is_page() {
            return None;
        }
        let dest = self.state.next_basic_page(page)?.lookup();
        self.move_step_to_page(MoveStepOptions::new(step, dest))
    }

    /// 把来源步骤合并进目标步骤，然后删除来源步骤
    ///
    /// 零件合并后排序；零件表项整体挂到目标零件表，不合并同类项。
    /// 插图框与注释随之移动。
    pub fn merge_steps(&mut self, opts: MergeStepsOptions) -> Option<Lookup> {
        if opts.source_step == opts.dest_step {
            return None;
        }
        let source = self.state.get::<Step>(opts.source_step)?.clone();
        let dest_pli = self.state.get::<Step>(opts.dest_step)?.pli_id;
        let source_page = self.state.page_lookup_for_item(opts.source_step);
        let dest_page = self.state.page_lookup_for_item(opts.dest_step);

        let dest = self.state.get_mut::<Step>(opts.dest_step)?;
        dest.parts.extend_from_slice(&source.parts);
        dest.parts.sort_unstable();

        match (source.pli_id, dest_pli) {
            (Some(src_pli), Some(dest_pli)) => {
                let items = self.state.pli(src_pli).map(|p| p.pli_items.clone());
                for id in items.unwrap_or_default() {
                    self.state.reparent_item(ReparentOptions {
                        item: Lookup::new(ItemType::PliItem, id),
                        new_parent: Lookup::new(ItemType::Pli, dest_pli),
                        insertion_index: None,
                    });
                }
            }
            (Some(src_pli), None) => {
                self.state
                    .move_slot_child(Lookup::new(ItemType::Pli, src_pli), opts.dest_step);
            }
            _ => {}
        }

        let movable = [
            (ItemType::Callout, &source.callouts),
            (ItemType::Annotation, &source.annotations),
        ];
        for (item_type, ids) in movable {
            for &id in ids {
                self.state.reparent_item(ReparentOptions {
                    item: Lookup::new(item_type, id),
                    new_parent: opts.dest_step,
                    insertion_index: None,
                });
            }
        }

        if !self.state.delete_step(opts.source_step) {
            warn!("Merged {} but could not delete it", opts.source_step);
        }
        debug!("Merged {} into {}", opts.source_step, opts.dest_step);

        if let Some(page) = source_page {
            self.layout_page(page);
        }
        if let Some(page) = dest_page.filter(|&p| Some(p) != source_page) {
            self.layout_page(page);
        }
        self.layout_pending();
        Some(opts.dest_step)
    }

    /// 删除空页面，其余页面重新编号并布局
    pub fn delete_page(&mut self, page: impl Into<Lookup>) -> bool {
        let deleted = self.state.delete_page(page);
        if deleted {
            self.layout_pending();
        }
        deleted
    }

    /// 删除步骤，重新编号并布局受影响的页面
    pub fn delete_step(&mut self, step: impl Into<Lookup>) -> bool {
        let deleted = self.state.delete_step(step);
        if deleted {
            self.layout_pending();
        }
        deleted
    }

    /// 添加空步骤（含步骤图与步骤号）
    ///
    /// 页面上的步骤另带空零件表，编号取步骤ID；
    /// 插图框中的步骤按位置从 1 编号。
    pub fn add_step(&mut self, opts: AddStepOptions) -> Option<Lookup> {
        let dest = opts.dest;
        let step = self
            .state
            .add_child_at(Step::new(dest), dest, opts.insertion_index)
            .ok()?;
        self.state.add_child(Csi::new(step), step).ok()?;

        match dest.item_type {
            ItemType::Page | ItemType::InventoryPage => {
                self.state.add_child(NumberLabel::new(step), step).ok()?;
                self.state.add_child(Pli::new(step), step).ok()?;
                self.state.step_mut(step.id)?.number = Some(step.id);
            }
            ItemType::Callout => {
                self.state.add_child(NumberLabel::new(step), step).ok()?;
                let steps: Vec<ItemId> = self.state.callout(dest.id)?.steps.clone();
                for (idx, id) in steps.into_iter().enumerate() {
                    if let Some(s) = self.state.step_mut(id) {
                        s.number = Some(idx as u32 + 1);
                    }
                }
            }
            _ => {}
        }
        self.state.mark_needs_layout(dest);
        self.layout_page_for(dest);
        debug!("Added step {} to {}", step, dest);
        Some(step)
    }

    /// 设置、更新或取消零件位移
    pub fn displace_part(&mut self, opts: DisplacePartOptions) -> Option<Lookup> {
        let distance = self.config.displacement_distance;
        let step = self.state.get_mut::<Step>(opts.step)?;
        let existing = step
            .displaced_parts
            .iter()
            .position(|p| p.part_id == opts.part_id);

        match (opts.direction, existing) {
            (Some(direction), _) => {
                let displaced = DisplacedPart {
                    part_id: opts.part_id,
                    direction,
                    part_distance: opts.part_distance.unwrap_or(distance),
                    arrow_offset: opts.arrow_offset.unwrap_or(0.0),
                    arrow_length: opts.arrow_length.unwrap_or(distance),
                    arrow_rotation: opts.arrow_rotation.unwrap_or(0.0),
                };
                match existing {
                    Some(idx) => step.displaced_parts[idx] = displaced,
                    None => step.displaced_parts.push(displaced),
                }
            }
            (None, Some(idx)) => {
                step.displaced_parts.remove(idx);
            }
            (None, None) => {}
        }

        self.layout_page_for(opts.step);
        Some(opts.step)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Part;
    use crate::page::PageKind;

    fn page_with_step(state: &mut State) -> (Lookup, Lookup, Lookup) {
        let page = state.add(Page::new(PageKind::Basic)).unwrap();
        let step = state.add_child(Step::new(page), page).unwrap();
        let pli = state.add_child(Pli::new(step), step).unwrap();
        (page, step, pli)
    }

    #[test]
    fn test_renumber_compresses_forward() {
        let mut state = State::new();
        for number in [3, 4, 4, 9] {
            let page = state.add(Page::new(PageKind::Basic)).unwrap();
            state.page_mut(page.id).unwrap().number = Some(number);
        }
        let changed = state.renumber(ItemType::Page);
        let numbers: Vec<_> = state.pages.iter().map(|p| p.number.unwrap()).collect();
        assert_eq!(numbers, vec![1, 2, 2, 3]);
        assert_eq!(changed.len(), 4);

        // 已经连续时不变
        assert!(state.renumber(ItemType::Page).is_empty());
    }

    #[test]
    fn test_reparent_updates_both_lists() {
        let mut state = State::new();
        let (page_a, step, _) = page_with_step(&mut state);
        let page_b = state.add(Page::new(PageKind::Basic)).unwrap();
        let other = state.add_child(Step::new(page_b), page_b).unwrap();

        let moved = state.reparent_item(ReparentOptions {
            item: step,
            new_parent: page_b,
            insertion_index: Some(0),
        });
        assert_eq!(moved, Some(step));
        assert!(state.page(page_a.id).unwrap().steps.is_empty());
        assert_eq!(state.page(page_b.id).unwrap().steps, vec![step.id, other.id]);
        assert_eq!(state.step(step.id).unwrap().parent, Some(page_b));

        // 步骤没有页面列表
        let refused = state.reparent_item(ReparentOptions {
            item: page_a,
            new_parent: step,
            insertion_index: None,
        });
        assert!(refused.is_none());
    }

    #[test]
    fn test_delete_guards() {
        let mut state = State::new();
        let (page, step, pli) = page_with_step(&mut state);
        let part = Part::new("3001.dat", 4);
        let item = state.add_child(PliItem::new(pli, &part, 0), pli).unwrap();
        state.add_child(PliQty::new(item), item).unwrap();

        assert!(!state.delete_page(page));
        assert!(!state.delete_pli(pli));
        assert!(!state.delete_step(step));
        assert!(state.page(page.id).is_some());

        assert!(state.delete_item(item));
        assert!(state.pli_qtys.is_empty());
        assert!(state.delete_step(step));
        assert!(state.plis.is_empty());
        assert!(state.delete_page(page));
        assert!(state.pages.is_empty());
    }

    #[test]
    fn test_transfer_without_destination_pli() {
        let mut state = State::new();
        let (_, _, pli) = page_with_step(&mut state);
        let part = Part::new("3001.dat", 4);
        let item = state.add_child(PliItem::new(pli, &part, 2), pli).unwrap();
        state.add_child(PliQty::new(item), item).unwrap();

        assert!(state.transfer_pli_part(2, pli, None).is_none());
        assert!(state.pli_items.is_empty());
        assert!(state.pli_qtys.is_empty());
        assert!(state.pli(pli.id).unwrap().pli_items.is_empty());
    }
}
