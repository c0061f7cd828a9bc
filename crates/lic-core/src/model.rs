//! 模型提供者接口
//!
//! 3D 模型解析不属于本库。文档只通过 [`ModelProvider`] 查询零件的
//! 文件名与颜色、子模型结构和模型自带的步骤划分。
//! [`ModelFile`] 是一个内存实现，供文件格式、命令行程序和测试使用。

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 子模型嵌套深度上限，防止自引用的模型无限递归
pub const MAX_SUBMODEL_DEPTH: usize = 32;

/// 零件描述
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Part {
    pub filename: String,
    /// LDraw 颜色代码
    pub color_code: i32,
}

impl Part {
    pub fn new(filename: impl Into<String>, color_code: i32) -> Self {
        Self {
            filename: filename.into(),
            color_code,
        }
    }
}

/// 模型自带的步骤划分
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ModelStep {
    pub parts: Vec<usize>,
}

/// 模型或子模型
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Model {
    pub filename: String,

    /// 显示名称，缺省时由文件名推导
    #[serde(default)]
    pub name: Option<String>,

    pub parts: Vec<Part>,

    /// `None` 表示模型没有步骤信息，与空列表不同
    #[serde(default)]
    pub steps: Option<Vec<ModelStep>>,
}

impl Model {
    pub fn new(filename: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            name: None,
            parts: Vec::new(),
            steps: None,
        }
    }

    /// 添加零件
    pub fn with_parts(mut self, parts: impl IntoIterator<Item = Part>) -> Self {
        self.parts.extend(parts);
        self
    }

    /// 设置步骤划分
    pub fn with_steps(mut self, steps: impl IntoIterator<Item = Vec<usize>>) -> Self {
        self.steps = Some(steps.into_iter().map(|parts| ModelStep { parts }).collect());
        self
    }

    pub fn has_steps(&self) -> bool {
        self.steps.as_ref().is_some_and(|s| !s.is_empty())
    }
}

/// 模型提供者
pub trait ModelProvider {
    /// 主模型
    fn main_model(&self) -> &Model;

    /// 按文件名查找子模型
    fn model_by_filename(&self, filename: &str) -> Option<&Model>;

    /// 文件名是否指向子模型
    fn is_submodel(&self, filename: &str) -> bool {
        self.model_by_filename(filename).is_some()
    }

    /// 沿子模型路径（逐级零件下标）找到对应的模型
    fn submodel_descendant(&self, path: &[usize]) -> Option<&Model> {
        let mut model = self.main_model();
        for &idx in path {
            let part = model.parts.get(idx)?;
            model = self.model_by_filename(&part.filename)?;
        }
        Some(model)
    }

    /// 子模型路径下的零件
    fn part_from_id(&self, part_id: usize, path: &[usize]) -> Option<&Part> {
        self.submodel_descendant(path)?.parts.get(part_id)
    }

    /// 指定模型直接使用的子模型（按零件顺序，可能重复）
    fn submodels(&self, path: &[usize]) -> Vec<&Model> {
        self.submodel_descendant(path)
            .map(|model| {
                model
                    .parts
                    .iter()
                    .filter_map(|p| self.model_by_filename(&p.filename))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// 展开子模型后的零件总数
    fn total_part_count(&self) -> usize {
        fn count<P: ModelProvider + ?Sized>(provider: &P, model: &Model, depth: usize) -> usize {
            if depth > MAX_SUBMODEL_DEPTH {
                return 0;
            }
            model
                .parts
                .iter()
                .map(|p| match provider.model_by_filename(&p.filename) {
                    Some(sub) => count(provider, sub, depth + 1),
                    None => 1,
                })
                .sum()
        }
        count(self, self.main_model(), 0)
    }
}

/// 内存中的模型文件：主模型 + 按文件名索引的子模型
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelFile {
    pub main: Model,
    #[serde(default)]
    pub submodels: BTreeMap<String, Model>,
}

impl ModelFile {
    pub fn new(main: Model) -> Self {
        Self {
            main,
            submodels: BTreeMap::new(),
        }
    }

    /// 注册子模型
    pub fn with_submodel(mut self, model: Model) -> Self {
        self.submodels.insert(model.filename.clone(), model);
        self
    }
}

impl ModelProvider for ModelFile {
    fn main_model(&self) -> &Model {
        &self.main
    }

    fn model_by_filename(&self, filename: &str) -> Option<&Model> {
        self.submodels.get(filename)
    }
}
