//! 文档状态与条目注册表
//!
//! [`State`] 为每种条目类型保存一个按插入顺序排列的列表，
//! 另有封面页与模板页两个根级单例。条目只经由注册表创建与删除：
//!
//! - [`State::add`] 分配ID（同类型 `max(id) + 1`，空列表为 0）并追加；
//! - [`State::delete`] 从列表移除，不处理父子引用，也不级联；
//! - [`State::delete_subtree`] 按 [`ItemType::child_types`] 先删子条目再删自身。
//!
//! 状态可克隆、可序列化，外部的撤销/持久化层直接对它做快照。

use crate::annotation::{Annotation, Point};
use crate::decoration::{Callout, Divider, RotateIcon, SubmodelImage};
use crate::error::RegistryError;
use crate::item::{ItemId, ItemType, Lookup, Node};
use crate::label::{Label, NumberLabel, QuantityLabel};
use crate::math::Size;
use crate::page::{Page, PageKind};
use crate::pli::{Pli, PliItem, PliQty};
use crate::step::{Csi, Step};
use serde::{Deserialize, Serialize};

/// 默认页面尺寸
pub const DEFAULT_PAGE_SIZE: Size = Size::new(900.0, 700.0);

/// 文档状态
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct State {
    pub page_size: Size,
    pub plis_visible: bool,
    pub template_page: Option<Page>,
    pub title_page: Option<Page>,
    pub pages: Vec<Page>,
    pub inventory_pages: Vec<Page>,
    pub steps: Vec<Step>,
    pub csis: Vec<Csi>,
    pub plis: Vec<Pli>,
    pub pli_items: Vec<PliItem>,
    pub pli_qtys: Vec<PliQty>,
    pub number_labels: Vec<NumberLabel>,
    pub quantity_labels: Vec<QuantityLabel>,
    pub labels: Vec<Label>,
    pub annotations: Vec<Annotation>,
    pub points: Vec<Point>,
    pub callouts: Vec<Callout>,
    pub submodel_images: Vec<SubmodelImage>,
    pub dividers: Vec<Divider>,
    pub rotate_icons: Vec<RotateIcon>,
}

impl Default for State {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            plis_visible: true,
            template_page: None,
            title_page: None,
            pages: Vec::new(),
            inventory_pages: Vec::new(),
            steps: Vec::new(),
            csis: Vec::new(),
            plis: Vec::new(),
            pli_items: Vec::new(),
            pli_qtys: Vec::new(),
            number_labels: Vec::new(),
            quantity_labels: Vec::new(),
            labels: Vec::new(),
            annotations: Vec::new(),
            points: Vec::new(),
            callouts: Vec::new(),
            submodel_images: Vec::new(),
            dividers: Vec::new(),
            rotate_icons: Vec::new(),
        }
    }
}

/// 可以存放在 [`State`] 中的条目
///
/// 把条目类型映射到状态中的具体列表；根级单例通过 `singleton` 访问。
pub trait StateItem: Node + Sized + 'static {
    fn list(state: &State, item_type: ItemType) -> Option<&Vec<Self>>;

    fn list_mut(state: &mut State, item_type: ItemType) -> Option<&mut Vec<Self>>;

    fn singleton(_state: &State, _item_type: ItemType) -> Option<&Self> {
        None
    }

    fn singleton_mut(_state: &mut State, _item_type: ItemType) -> Option<&mut Self> {
        None
    }

    /// 清除根级单例，原本存在时返回 `true`
    fn clear_singleton(_state: &mut State, _item_type: ItemType) -> bool {
        false
    }
}

macro_rules! list_item {
    ($($ty:ty => $item_type:path, $field:ident;)*) => {
        $(
            impl StateItem for $ty {
                fn list(state: &State, item_type: ItemType) -> Option<&Vec<Self>> {
                    (item_type == $item_type).then_some(&state.$field)
                }

                fn list_mut(state: &mut State, item_type: ItemType) -> Option<&mut Vec<Self>> {
                    (item_type == $item_type).then_some(&mut state.$field)
                }
            }
        )*
    };
}

list_item! {
    Step => ItemType::Step, steps;
    Csi => ItemType::Csi, csis;
    Pli => ItemType::Pli, plis;
    PliItem => ItemType::PliItem, pli_items;
    PliQty => ItemType::PliQty, pli_qtys;
    NumberLabel => ItemType::NumberLabel, number_labels;
    QuantityLabel => ItemType::QuantityLabel, quantity_labels;
    Label => ItemType::Label, labels;
    Annotation => ItemType::Annotation, annotations;
    Point => ItemType::Point, points;
    Callout => ItemType::Callout, callouts;
    SubmodelImage => ItemType::SubmodelImage, submodel_images;
    Divider => ItemType::Divider, dividers;
    RotateIcon => ItemType::RotateIcon, rotate_icons;
}

impl StateItem for Page {
    fn list(state: &State, item_type: ItemType) -> Option<&Vec<Self>> {
        match item_type {
            ItemType::Page => Some(&state.pages),
            ItemType::InventoryPage => Some(&state.inventory_pages),
            _ => None,
        }
    }

    fn list_mut(state: &mut State, item_type: ItemType) -> Option<&mut Vec<Self>> {
        match item_type {
            ItemType::Page => Some(&mut state.pages),
            ItemType::InventoryPage => Some(&mut state.inventory_pages),
            _ => None,
        }
    }

    fn singleton(state: &State, item_type: ItemType) -> Option<&Self> {
        match item_type {
            ItemType::TitlePage => state.title_page.as_ref(),
            ItemType::TemplatePage => state.template_page.as_ref(),
            _ => None,
        }
    }

    fn singleton_mut(state: &mut State, item_type: ItemType) -> Option<&mut Self> {
        match item_type {
            ItemType::TitlePage => state.title_page.as_mut(),
            ItemType::TemplatePage => state.template_page.as_mut(),
            _ => None,
        }
    }

    fn clear_singleton(state: &mut State, item_type: ItemType) -> bool {
        match item_type {
            ItemType::TitlePage => state.title_page.take().is_some(),
            ItemType::TemplatePage => state.template_page.take().is_some(),
            _ => false,
        }
    }
}

/// 按条目类型把调用分派到对应具体类型的泛型函数
macro_rules! dispatch {
    ($item_type:expr, $func:ident($($arg:expr),*)) => {
        match $item_type {
            ItemType::TemplatePage
            | ItemType::TitlePage
            | ItemType::Page
            | ItemType::InventoryPage => $func::<Page>($($arg),*),
            ItemType::Step => $func::<Step>($($arg),*),
            ItemType::Csi => $func::<Csi>($($arg),*),
            ItemType::Pli => $func::<Pli>($($arg),*),
            ItemType::PliItem => $func::<PliItem>($($arg),*),
            ItemType::PliQty => $func::<PliQty>($($arg),*),
            ItemType::NumberLabel => $func::<NumberLabel>($($arg),*),
            ItemType::QuantityLabel => $func::<QuantityLabel>($($arg),*),
            ItemType::Label => $func::<Label>($($arg),*),
            ItemType::Annotation => $func::<Annotation>($($arg),*),
            ItemType::Point => $func::<Point>($($arg),*),
            ItemType::Callout => $func::<Callout>($($arg),*),
            ItemType::SubmodelImage => $func::<SubmodelImage>($($arg),*),
            ItemType::Divider => $func::<Divider>($($arg),*),
            ItemType::RotateIcon => $func::<RotateIcon>($($arg),*),
        }
    };
}

fn node_of<T: StateItem>(state: &State, lookup: Lookup) -> Option<&dyn Node> {
    state.get::<T>(lookup).map(|item| item as &dyn Node)
}

fn node_mut_of<T: StateItem>(state: &mut State, lookup: Lookup) -> Option<&mut dyn Node> {
    state.get_mut::<T>(lookup).map(|item| item as &mut dyn Node)
}

fn nodes_of<T: StateItem>(state: &State, item_type: ItemType) -> Vec<&dyn Node> {
    if item_type.is_singleton() {
        return T::singleton(state, item_type)
            .map(|item| vec![item as &dyn Node])
            .unwrap_or_default();
    }
    T::list(state, item_type)
        .map(|list| list.iter().map(|item| item as &dyn Node).collect())
        .unwrap_or_default()
}

fn remove_of<T: StateItem>(state: &mut State, lookup: Lookup) -> bool {
    if lookup.item_type.is_singleton() {
        return T::clear_singleton(state, lookup.item_type);
    }
    let Some(list) = T::list_mut(state, lookup.item_type) else {
        return false;
    };
    match list.iter().position(|item| item.id() == lookup.id) {
        Some(idx) => {
            list.remove(idx);
            true
        }
        None => false,
    }
}

impl State {
    /// 创建空状态
    pub fn new() -> Self {
        Self::default()
    }

    // ========== 注册表 ==========

    /// 同类型下一个可用ID：`max(id) + 1`，空列表为 0
    pub fn next_item_id(&self, item_type: ItemType) -> ItemId {
        if item_type.is_singleton() {
            return 0;
        }
        self.nodes(item_type)
            .iter()
            .map(|n| n.id())
            .max()
            .map_or(0, |max| max + 1)
    }

    /// 添加条目：分配ID并追加到对应列表
    ///
    /// 根级单例没有列表，返回 [`RegistryError::InvalidType`]。
    /// 不修改父条目的子条目列表，需要同时挂接时使用 [`State::add_child`]。
    pub fn add<T: StateItem>(&mut self, mut item: T) -> Result<Lookup, RegistryError> {
        let item_type = item.item_type();
        let id = self.next_item_id(item_type);
        let list = T::list_mut(self, item_type).ok_or(RegistryError::InvalidType(item_type))?;
        item.set_id(id);
        list.push(item);
        Ok(Lookup::new(item_type, id))
    }

    /// 添加条目并挂到父条目的子条目列表（或槽位）末尾
    pub fn add_child<T: StateItem>(
        &mut self,
        item: T,
        parent: impl Into<Lookup>,
    ) -> Result<Lookup, RegistryError> {
        self.add_child_at(item, parent, None)
    }

    /// 添加条目并挂到父条目的子条目列表指定位置（越界时追加）
    pub fn add_child_at<T: StateItem>(
        &mut self,
        mut item: T,
        parent: impl Into<Lookup>,
        index: Option<usize>,
    ) -> Result<Lookup, RegistryError> {
        let parent = parent.into();
        let child_type = item.item_type();
        if !parent.item_type.child_types().contains(&child_type) {
            return Err(RegistryError::InvalidParent {
                child: child_type,
                parent,
            });
        }
        if self.node(parent).is_none() {
            return Err(RegistryError::NotFound(parent));
        }

        item.set_parent(Some(parent));
        let lookup = self.add(item)?;
        if let Some(node) = self.node_mut(parent) {
            if let Some(list) = node.child_list_mut(child_type) {
                match index {
                    Some(idx) => list.insert(idx.min(list.len()), lookup.id),
                    None => list.push(lookup.id),
                }
            } else {
                node.set_child_slot(child_type, Some(lookup.id));
            }
        }
        Ok(lookup)
    }

    /// 设置封面页或模板页单例，返回其引用
    pub fn set_root_page(&mut self, mut page: Page) -> Result<Lookup, RegistryError> {
        page.id = 0;
        let lookup = page.lookup();
        match page.kind {
            PageKind::Title => self.title_page = Some(page),
            PageKind::Template => self.template_page = Some(page),
            _ => return Err(RegistryError::InvalidType(lookup.item_type)),
        }
        Ok(lookup)
    }

    /// 按引用取得具体类型的条目
    pub fn get<T: StateItem>(&self, item: impl Into<Lookup>) -> Option<&T> {
        let lookup = item.into();
        if lookup.item_type.is_singleton() {
            return T::singleton(self, lookup.item_type);
        }
        T::list(self, lookup.item_type)?
            .iter()
            .find(|item| item.id() == lookup.id)
    }

    pub fn get_mut<T: StateItem>(&mut self, item: impl Into<Lookup>) -> Option<&mut T> {
        let lookup = item.into();
        if lookup.item_type.is_singleton() {
            return T::singleton_mut(self, lookup.item_type);
        }
        T::list_mut(self, lookup.item_type)?
            .iter_mut()
            .find(|item| item.id() == lookup.id)
    }

    /// 按引用取得条目（动态类型），未找到返回 `None`
    pub fn node(&self, lookup: Lookup) -> Option<&dyn Node> {
        dispatch!(lookup.item_type, node_of(self, lookup))
    }

    pub fn node_mut(&mut self, lookup: Lookup) -> Option<&mut dyn Node> {
        dispatch!(lookup.item_type, node_mut_of(self, lookup))
    }

    /// 同 [`State::node`]，接受条目或引用
    pub fn lookup_to_item(&self, item: impl Into<Lookup>) -> Option<&dyn Node> {
        self.node(item.into())
    }

    pub fn lookup_to_item_mut(&mut self, item: impl Into<Lookup>) -> Option<&mut dyn Node> {
        self.node_mut(item.into())
    }

    /// 条目的引用；条目不在注册表中时返回 `None`
    pub fn item_to_lookup(&self, item: &dyn Node) -> Option<Lookup> {
        let lookup = item.lookup();
        self.node(lookup).is_some().then_some(lookup)
    }

    /// 某类型的全部条目，按存储顺序
    pub fn nodes(&self, item_type: ItemType) -> Vec<&dyn Node> {
        dispatch!(item_type, nodes_of(self, item_type))
    }

    /// 某类型的条目数
    pub fn count(&self, item_type: ItemType) -> usize {
        self.nodes(item_type).len()
    }

    /// 删除条目，不触碰父子引用
    ///
    /// 未找到时不做任何事并返回 `None`。
    pub fn delete(&mut self, item: impl Into<Lookup>) -> Option<Lookup> {
        let lookup = item.into();
        let removed = dispatch!(lookup.item_type, remove_of(self, lookup));
        removed.then_some(lookup)
    }

    /// 条目的直接子条目引用，按 [`ItemType::child_types`] 顺序
    pub fn child_lookups(&self, item: impl Into<Lookup>) -> Vec<Lookup> {
        let lookup = item.into();
        let Some(node) = self.node(lookup) else {
            return Vec::new();
        };
        let mut children = Vec::new();
        for &child_type in lookup.item_type.child_types() {
            if let Some(list) = node.child_list(child_type) {
                children.extend(list.iter().map(|&id| Lookup::new(child_type, id)));
            } else if let Some(id) = node.child_slot(child_type) {
                children.push(Lookup::new(child_type, id));
            }
        }
        children
    }

    /// 深度优先删除条目及其全部后代，子条目先于父条目
    ///
    /// 不会把根条目从它的父条目列表中摘除。返回删除的条目数。
    pub fn delete_subtree(&mut self, item: impl Into<Lookup>) -> usize {
        let lookup = item.into();
        let mut count = 0;
        for child in self.child_lookups(lookup) {
            count += self.delete_subtree(child);
        }
        if self.delete(lookup).is_some() {
            count += 1;
        }
        count
    }

    /// 把条目所在页面标记为待布局
    pub fn mark_needs_layout(&mut self, item: impl Into<Lookup>) {
        if let Some(page) = self.page_lookup_for_item(item) {
            if let Some(page) = self.get_mut::<Page>(page) {
                page.needs_layout = true;
            }
        }
    }
}

/// 为每个列表生成按ID访问的便捷方法
macro_rules! typed_getters {
    ($($name:ident, $name_mut:ident => $ty:ty, $item_type:path;)*) => {
        impl State {
            $(
                pub fn $name(&self, id: ItemId) -> Option<&$ty> {
                    self.get::<$ty>(Lookup::new($item_type, id))
                }

                pub fn $name_mut(&mut self, id: ItemId) -> Option<&mut $ty> {
                    self.get_mut::<$ty>(Lookup::new($item_type, id))
                }
            )*
        }
    };
}

typed_getters! {
    page, page_mut => Page, ItemType::Page;
    inventory_page, inventory_page_mut => Page, ItemType::InventoryPage;
    step, step_mut => Step, ItemType::Step;
    csi, csi_mut => Csi, ItemType::Csi;
    pli, pli_mut => Pli, ItemType::Pli;
    pli_item, pli_item_mut => PliItem, ItemType::PliItem;
    pli_qty, pli_qty_mut => PliQty, ItemType::PliQty;
    number_label, number_label_mut => NumberLabel, ItemType::NumberLabel;
    quantity_label, quantity_label_mut => QuantityLabel, ItemType::QuantityLabel;
    label, label_mut => Label, ItemType::Label;
    annotation, annotation_mut => Annotation, ItemType::Annotation;
    point, point_mut => Point, ItemType::Point;
    callout, callout_mut => Callout, ItemType::Callout;
    submodel_image, submodel_image_mut => SubmodelImage, ItemType::SubmodelImage;
    divider, divider_mut => Divider, ItemType::Divider;
    rotate_icon, rotate_icon_mut => RotateIcon, ItemType::RotateIcon;
}
