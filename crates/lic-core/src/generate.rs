//! 由模型生成初始文档

use crate::config::ImportOptions;
use crate::document::Document;
use crate::error::RegistryError;
use crate::item::{ItemId, ItemType, Lookup, Node};
use crate::label::{Label, NumberLabel};
use crate::model::{ModelProvider, MAX_SUBMODEL_DEPTH};
use crate::mutation::ReparentOptions;
use crate::page::{Page, PageKind};
use crate::pli::{Pli, PliItem, PliQty};
use crate::render::SizeProvider;
use crate::step::{Csi, Step};
use tracing::{debug, info, warn};

impl<M: ModelProvider, R: SizeProvider> Document<M, R> {
    /// 为模型的每个步骤生成一页
    ///
    /// 深度优先：步骤中用到的子模型先生成自己的页面，排在使用它的步骤之前。
    /// 每页包含页码标签、一个步骤（步骤号、步骤图、零件表）。
    /// 模型没有步骤但子模型有步骤时，主模型的每个零件各成一步。
    /// 返回新建的页面。
    pub fn add_initial_pages(&mut self, submodel: &[usize]) -> Result<Vec<Lookup>, RegistryError> {
        let mut pages = Vec::new();
        self.add_pages_for(submodel, &mut pages)?;
        debug!("Added {} initial pages for {:?}", pages.len(), submodel);
        Ok(pages)
    }

    fn add_pages_for(&mut self, path: &[usize], pages: &mut Vec<Lookup>) -> Result<(), RegistryError> {
        if path.len() > MAX_SUBMODEL_DEPTH {
            warn!("Submodel nesting too deep at {:?}", path);
            return Ok(());
        }
        let Some(model) = self.model.submodel_descendant(path) else {
            return Ok(());
        };
        let model_parts = model.parts.clone();
        let steps: Vec<Vec<usize>> = match &model.steps {
            Some(steps) if !steps.is_empty() => steps.iter().map(|s| s.parts.clone()).collect(),
            _ => {
                let has_stepped_submodels = self.model.submodels(path).iter().any(|m| m.has_steps());
                if !has_stepped_submodels {
                    return Ok(());
                }
                (0..model_parts.len()).map(|idx| vec![idx]).collect()
            }
        };

        for mut parts in steps {
            for &part_id in &parts {
                let is_submodel = model_parts
                    .get(part_id)
                    .is_some_and(|p| self.model.is_submodel(&p.filename));
                if is_submodel {
                    let mut sub_path = path.to_vec();
                    sub_path.push(part_id);
                    self.add_pages_for(&sub_path, pages)?;
                }
            }

            let page = self.state.add(Page::new(PageKind::Basic))?;
            self.state.add_child(NumberLabel::new(page), page)?;
            if let Some(p) = self.state.page_mut(page.id) {
                p.number = Some(page.id + 1);
            }

            parts.sort_unstable();
            let step = self
                .state
                .add_child(Step::new(page).with_parts(parts.clone(), path), page)?;
            self.state.add_child(NumberLabel::new(step), step)?;
            if let Some(s) = self.state.step_mut(step.id) {
                s.number = Some(step.id);
            }
            self.state.add_child(Csi::new(step), step)?;
            let pli = self.state.add_child(Pli::new(step), step)?;

            for part_id in parts {
                let Some(part) = model_parts.get(part_id) else {
                    warn!("Part {} does not exist in {:?}", part_id, path);
                    continue;
                };
                let target = self.state.matching_pli_item(pli, part).map(|i| i.lookup());
                match target.and_then(|t| self.state.get_mut::<PliItem>(t)) {
                    Some(item) => item.add_part(part_id),
                    None => {
                        let item = self.state.add_child(PliItem::new(pli, part, part_id), pli)?;
                        self.state.add_child(PliQty::new(item), item)?;
                    }
                }
            }
            pages.push(page);
        }
        Ok(())
    }

    /// 添加封面页：一个不编号的步骤（仅步骤图）、标题与模型信息
    ///
    /// 封面页已存在时直接返回它。
    pub fn add_title_page(&mut self) -> Result<Lookup, RegistryError> {
        if let Some(page) = &self.state.title_page {
            return Ok(page.lookup());
        }
        let page = self.state.set_root_page(Page::new(PageKind::Title))?;
        let step = self.state.add_child(Step::new(page), page)?;
        self.state.add_child(Csi::new(step), step)?;

        let title = Label::new(page, self.model_name(true), self.config.title_font.clone());
        self.state.add_child(title, page)?;

        let info = format!(
            "{} parts, {} pages",
            self.model.total_part_count(),
            self.state.page_count(false)
        );
        let model_info = Label::new(page, info, self.config.model_info_font.clone());
        self.state.add_child(model_info, page)?;

        self.layout_title_page();
        debug!("Added title page");
        Ok(page)
    }

    /// 每页容纳 `steps_per_page` 个步骤：把后续页面的步骤移到前一页，删除清空的页面
    fn pack_steps(&mut self, steps_per_page: usize) {
        let page_ids: Vec<ItemId> = self.state.pages.iter().map(|p| p.id).collect();
        let mut target: Option<ItemId> = None;

        for page_id in page_ids {
            let Some(target_id) = target else {
                target = Some(page_id);
                continue;
            };
            let steps = self
                .state
                .page(page_id)
                .map(|p| p.steps.clone())
                .unwrap_or_default();
            for step in steps {
                let room = self
                    .state
                    .page(target_id)
                    .is_some_and(|p| p.steps.len() < steps_per_page);
                if !room {
                    break;
                }
                self.state.reparent_item(ReparentOptions {
                    item: Lookup::new(ItemType::Step, step),
                    new_parent: Lookup::new(ItemType::Page, target_id),
                    insertion_index: None,
                });
            }

            let emptied = self.state.page(page_id).is_some_and(|p| p.steps.is_empty());
            if emptied {
                self.state.delete_page(Lookup::new(ItemType::Page, page_id));
            } else {
                target = Some(page_id);
            }
        }
    }

    /// 生成整本说明书：初始页面、步骤合并、可选封面页，最后整体布局
    pub fn import_model(&mut self, options: &ImportOptions) -> Result<Vec<Lookup>, RegistryError> {
        self.state.plis_visible = options.include_pli;
        self.add_initial_pages(&[])?;
        if options.steps_per_page > 1 {
            self.pack_steps(options.steps_per_page);
        }
        if options.include_title_page {
            self.add_title_page()?;
        }
        self.layout_all();

        info!(
            "Generated instructions for {}: {} pages, {} steps",
            self.model.main_model().filename,
            self.state.page_count(false),
            self.state.steps.len()
        );
        Ok(self.state.pages.iter().map(|p| p.lookup()).collect())
    }
}
