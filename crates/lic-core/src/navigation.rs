//! 导航与查询
//!
//! 只读遍历：父子解析、按编号查找前后条目、页面顺序、坐标变换，
//! 以及依赖模型提供者的零件与子模型查询。

use crate::annotation::Annotation;
use crate::decoration::Callout;
use crate::document::Document;
use crate::item::{ItemId, ItemType, Lookup, Node};
use crate::math::{Point2, Rect, Vector2};
use crate::model::{ModelProvider, Part};
use crate::page::Page;
use crate::pli::{Pli, PliItem};
use crate::render::SizeProvider;
use crate::state::State;
use crate::step::Step;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// 箭头目标框在控制点包围盒四周的扩展量
const TARGET_BOX_PADDING: f64 = 8.0;

impl State {
    /// 父条目
    pub fn parent(&self, item: impl Into<Lookup>) -> Option<&dyn Node> {
        let parent = self.node(item.into())?.parent()?;
        self.node(parent)
    }

    /// 条目所在页面的引用
    pub fn page_lookup_for_item(&self, item: impl Into<Lookup>) -> Option<Lookup> {
        let mut lookup = item.into();
        while !lookup.item_type.is_page() {
            lookup = self.node(lookup)?.parent()?;
        }
        self.node(lookup).map(|_| lookup)
    }

    /// 条目所在页面（页面本身返回自己）
    pub fn page_for_item(&self, item: impl Into<Lookup>) -> Option<&Page> {
        let page = self.page_lookup_for_item(item)?;
        self.get::<Page>(page)
    }

    /// 全部页面：模板页、封面页、普通页、清单页
    pub fn page_list(&self) -> Vec<&Page> {
        self.template_page
            .iter()
            .chain(self.title_page.iter())
            .chain(self.pages.iter())
            .chain(self.inventory_pages.iter())
            .collect()
    }

    fn page_offset(&self, item: impl Into<Lookup>, delta: isize) -> Option<&Page> {
        let page = self.page_lookup_for_item(item)?;
        let list = self.page_list();
        let idx = list.iter().position(|p| p.lookup() == page)?;
        let target = idx.checked_add_signed(delta)?;
        list.get(target).copied()
    }

    /// 条目所在页面的下一页
    pub fn next_page(&self, item: impl Into<Lookup>) -> Option<&Page> {
        self.page_offset(item, 1)
    }

    /// 条目所在页面的上一页
    pub fn prev_page(&self, item: impl Into<Lookup>) -> Option<&Page> {
        self.page_offset(item, -1)
    }

    /// 下一页，仅当它是普通页时返回
    pub fn next_basic_page(&self, item: impl Into<Lookup>) -> Option<&Page> {
        self.next_page(item)
            .filter(|p| p.item_type() == ItemType::Page)
    }

    /// 上一页，仅当它是普通页时返回
    pub fn prev_basic_page(&self, item: impl Into<Lookup>) -> Option<&Page> {
        self.prev_page(item)
            .filter(|p| p.item_type() == ItemType::Page)
    }

    pub fn is_first_page(&self, page: impl Into<Lookup>) -> bool {
        let page = page.into();
        match page.item_type {
            ItemType::Page => self.pages.first().is_some_and(|p| p.id == page.id),
            _ => false,
        }
    }

    pub fn is_last_page(&self, page: impl Into<Lookup>) -> bool {
        let page = page.into();
        match page.item_type {
            ItemType::TitlePage => self.pages.is_empty() && self.inventory_pages.is_empty(),
            ItemType::Page => {
                self.inventory_pages.is_empty()
                    && self.pages.last().is_some_and(|p| p.id == page.id)
            }
            ItemType::InventoryPage => self.inventory_pages.last().is_some_and(|p| p.id == page.id),
            _ => false,
        }
    }

    /// 第一个普通页
    pub fn first_page(&self) -> Option<&Page> {
        self.pages.first()
    }

    /// 最后一个普通页
    pub fn last_page(&self) -> Option<&Page> {
        self.pages.last()
    }

    /// 普通页数量，可选计入封面页
    pub fn page_count(&self, include_title_page: bool) -> usize {
        self.pages.len() + usize::from(include_title_page && self.title_page.is_some())
    }

    /// 同类型、同父类型中编号相差 `delta` 的条目
    ///
    /// `scope` 限定候选ID（例如插图框内的步骤），缺省为该类型的全部条目。
    fn adjacent(&self, item: Lookup, delta: i64, scope: Option<&[ItemId]>) -> Option<Lookup> {
        let node = self.node(item)?;
        let number = i64::from(node.number()?) + delta;
        let parent_type = node.parent().map(|p| p.item_type);
        let candidates: Vec<&dyn Node> = match scope {
            Some(ids) => ids
                .iter()
                .filter_map(|&id| self.node(Lookup::new(item.item_type, id)))
                .collect(),
            None => self.nodes(item.item_type),
        };
        candidates
            .into_iter()
            .find(|n| {
                n.number().map(i64::from) == Some(number)
                    && n.parent().map(|p| p.item_type) == parent_type
            })
            .map(|n| n.lookup())
    }

    /// 编号小一的同类条目
    pub fn prev(&self, item: impl Into<Lookup>) -> Option<Lookup> {
        self.adjacent(item.into(), -1, None)
    }

    /// 编号大一的同类条目
    pub fn next(&self, item: impl Into<Lookup>) -> Option<Lookup> {
        self.adjacent(item.into(), 1, None)
    }

    fn adjacent_step(&self, step: Lookup, delta: i64, limit_to_submodel: bool) -> Option<&Step> {
        let current = self.get::<Step>(step)?;
        // 插图框中的步骤只在同一插图框内查找
        let scope = match current.parent {
            Some(parent) if parent.item_type == ItemType::Callout => {
                Some(self.get::<Callout>(parent)?.steps.as_slice())
            }
            _ => None,
        };
        let mut adjacent = self.adjacent(step, delta, scope)?;
        if limit_to_submodel && scope.is_none() {
            loop {
                let candidate = self.get::<Step>(adjacent)?;
                if candidate.submodel == current.submodel {
                    break;
                }
                adjacent = self.adjacent(adjacent, delta, None)?;
            }
        }
        self.get::<Step>(adjacent)
    }

    /// 上一步骤
    pub fn prev_step(&self, step: impl Into<Lookup>, limit_to_submodel: bool) -> Option<&Step> {
        self.adjacent_step(step.into(), -1, limit_to_submodel)
    }

    /// 下一步骤
    pub fn next_step(&self, step: impl Into<Lookup>, limit_to_submodel: bool) -> Option<&Step> {
        self.adjacent_step(step.into(), 1, limit_to_submodel)
    }

    /// `item` 是否等于 `ancestor` 或是它的后代
    pub fn is_descendant(&self, item: impl Into<Lookup>, ancestor: impl Into<Lookup>) -> bool {
        let ancestor = ancestor.into();
        let mut current = Some(item.into());
        while let Some(lookup) = current {
            if lookup == ancestor {
                return true;
            }
            current = self.node(lookup).and_then(|n| n.parent());
        }
        false
    }

    /// 指定类型的子条目；列表为空时再看同类型的槽位
    pub fn children(&self, item: impl Into<Lookup>, child_types: &[ItemType]) -> Vec<Lookup> {
        let Some(node) = self.node(item.into()) else {
            return Vec::new();
        };
        let mut children = Vec::new();
        for &child_type in child_types {
            match node.child_list(child_type) {
                Some(list) if !list.is_empty() => {
                    children.extend(list.iter().map(|&id| Lookup::new(child_type, id)));
                }
                _ => {
                    if let Some(id) = node.child_slot(child_type) {
                        children.push(Lookup::new(child_type, id));
                    }
                }
            }
        }
        children
    }

    /// 是否有非空的子条目列表
    pub fn has_children(&self, item: impl Into<Lookup>) -> bool {
        let lookup = item.into();
        let Some(node) = self.node(lookup) else {
            return false;
        };
        lookup
            .item_type
            .child_types()
            .iter()
            .any(|&ty| node.child_list(ty).is_some_and(|l| !l.is_empty()))
    }

    /// 本步骤及同一子模型中此前所有步骤的零件
    pub fn part_list(&self, step: impl Into<Lookup>) -> Vec<usize> {
        let mut parts = Vec::new();
        let mut current = self.get::<Step>(step);
        while let Some(step) = current {
            parts.extend_from_slice(&step.parts);
            current = self.prev_step(step, true);
        }
        parts
    }

    /// 在零件表中找到文件名与颜色一致的项
    pub fn matching_pli_item(&self, pli: impl Into<Lookup>, part: &Part) -> Option<&PliItem> {
        self.get::<Pli>(pli)?
            .pli_items
            .iter()
            .filter_map(|&id| self.pli_item(id))
            .find(|item| item.matches(&part.filename, part.color_code))
    }

    // ========== 坐标变换 ==========

    /// 条目在页面坐标系中的位置
    pub fn item_to_page(&self, item: impl Into<Lookup>) -> Point2 {
        let mut position = Point2::origin();
        let mut current = self.node(item.into());
        while let Some(node) = current {
            if let Some(p) = node.position() {
                position += p.coords;
            }
            current = node.parent().and_then(|parent| self.node(parent));
        }
        position
    }

    /// 页面坐标转换为条目坐标
    pub fn page_to_item(&self, point: Point2, item: impl Into<Lookup>) -> Point2 {
        let offset = self.item_to_page(item).coords;
        point - offset
    }

    /// 相对某条目的点转换为页面坐标，无参照时原样返回
    pub fn point_to_page(&self, x: f64, y: f64, relative_to: Option<Lookup>) -> Point2 {
        let point = Point2::new(x, y);
        match relative_to {
            Some(item) => point + self.item_to_page(item).coords,
            None => point,
        }
    }

    /// 条目在页面坐标系中的目标框
    ///
    /// 箭头注释取控制点包围盒并向外扩展；其他条目取几何矩形。
    pub fn target_box(&self, item: impl Into<Lookup>) -> Option<Rect> {
        let lookup = item.into();
        let node = self.node(lookup)?;

        if let Some(annotation) = self.get::<Annotation>(lookup) {
            if !annotation.points.is_empty() {
                let points = annotation.points.iter().filter_map(|&id| {
                    let point = self.point(id)?;
                    let relative_to = point.relative_to.or(annotation.parent);
                    Some(self.point_to_page(point.x, point.y, relative_to))
                });
                return Rect::from_points(points)
                    .map(|b| b.expand(TARGET_BOX_PADDING, TARGET_BOX_PADDING));
            }
        }

        let bounds = node.bounds()?;
        let offset: Vector2 = match node.parent() {
            Some(parent) => self.item_to_page(parent).coords,
            None => Vector2::zeros(),
        };
        Some(bounds.translate(offset))
    }
}

/// 子模型的使用情况
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmodelUsage {
    /// 首次使用该子模型的步骤
    pub step: ItemId,
    pub filename: String,
    /// 父步骤中使用的数量
    pub quantity: u32,
}

impl<M: ModelProvider, R: SizeProvider> Document<M, R> {
    /// 步骤中的零件描述
    pub fn parts_in_step(&self, step: impl Into<Lookup>) -> Vec<&Part> {
        let Some(step) = self.state.get::<Step>(step) else {
            return Vec::new();
        };
        step.parts
            .iter()
            .filter_map(|&id| self.model.part_from_id(id, &step.submodel))
            .collect()
    }

    /// 步骤是否加入了子模型
    pub fn step_has_submodel(&self, step: impl Into<Lookup>) -> bool {
        self.parts_in_step(step)
            .iter()
            .any(|part| self.model.is_submodel(&part.filename))
    }

    /// 零件表项是否对应子模型
    pub fn pli_item_is_submodel(&self, pli_item: impl Into<Lookup>) -> bool {
        self.state
            .get::<PliItem>(pli_item)
            .is_some_and(|item| self.model.is_submodel(&item.filename))
    }

    /// 主模型使用的子模型，按首次出现的步骤排列，外层先于内层
    pub fn submodels(&self) -> Vec<SubmodelUsage> {
        let main = self.model.main_model().filename.clone();
        let mut added = HashSet::from([main]);
        let mut usages = Vec::new();

        let page_steps = self.state.steps.iter().filter(|s| {
            s.parent.is_some_and(|p| p.item_type == ItemType::Page) && !s.submodel.is_empty()
        });
        for step in page_steps {
            let Some(model) = self.model.submodel_descendant(&step.submodel) else {
                continue;
            };
            if added.contains(&model.filename) {
                continue;
            }

            let mut hierarchy = Vec::new();
            for depth in (1..=step.submodel.len()).rev() {
                let path = &step.submodel[..depth];
                let Some(sub) = self.model.submodel_descendant(path) else {
                    break;
                };
                let quantity = self.usage_count(&path[..depth - 1], path[depth - 1], &sub.filename);
                hierarchy.push((sub.filename.clone(), quantity));
            }
            for (filename, quantity) in hierarchy.into_iter().rev() {
                if added.insert(filename.clone()) {
                    usages.push(SubmodelUsage {
                        step: step.id,
                        filename,
                        quantity,
                    });
                }
            }
        }
        usages
    }

    /// 父模型中加入该子模型的步骤里同名零件的数量
    fn usage_count(&self, parent_path: &[usize], part_id: usize, filename: &str) -> u32 {
        let Some(parent_model) = self.model.submodel_descendant(parent_path) else {
            return 1;
        };
        self.state
            .steps
            .iter()
            .find(|s| s.submodel == parent_path && s.parts.contains(&part_id))
            .map(|s| {
                s.parts
                    .iter()
                    .filter(|&&p| {
                        parent_model
                            .parts
                            .get(p)
                            .is_some_and(|part| part.filename == filename)
                    })
                    .count() as u32
            })
            .unwrap_or(1)
            .max(1)
    }

    /// 模型名称；`nice` 时把文件名整理为标题形式
    pub fn model_name(&self, nice: bool) -> String {
        let main = self.model.main_model();
        if let Some(name) = &main.name {
            return name.clone();
        }
        let base = self.model_filename_base("");
        if nice {
            start_case(&base.replace('/', "-").replace('_', " "))
        } else {
            base
        }
    }

    /// 去掉扩展名的模型文件名，附加 `ext`
    pub fn model_filename_base(&self, ext: &str) -> String {
        let filename = &self.model.main_model().filename;
        if filename.is_empty() {
            return String::new();
        }
        let base = filename.split('.').next().unwrap_or_default();
        format!("{base}{ext}")
    }
}

/// 拆分单词并首字母大写，单词间以空格连接
fn start_case(text: &str) -> String {
    let mut words: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut prev_lower = false;
    for c in text.chars() {
        if !c.is_alphanumeric() {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            prev_lower = false;
            continue;
        }
        if c.is_uppercase() && prev_lower && !current.is_empty() {
            words.push(std::mem::take(&mut current));
        }
        prev_lower = c.is_lowercase() || c.is_ascii_digit();
        current.push(c);
    }
    if !current.is_empty() {
        words.push(current);
    }

    words
        .iter()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
