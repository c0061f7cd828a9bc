//! 说明书文档数据

use chrono::{DateTime, Utc};
use lic_core::model::{ModelFile, ModelProvider};
use lic_core::render::SizeProvider;
use lic_core::{Document, State};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// 当前文件格式版本
pub const FORMAT_VERSION: u32 = 1;

/// 文档元数据
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    /// 文档唯一标识
    pub id: Uuid,

    /// 文档标题
    pub title: String,

    /// 作者
    pub author: String,

    /// 创建时间
    pub created_at: DateTime<Utc>,

    /// 最后修改时间
    pub modified_at: DateTime<Utc>,

    /// 自定义属性
    #[serde(default)]
    pub custom_properties: HashMap<String, String>,
}

impl Default for DocumentMetadata {
    fn default() -> Self {
        Self {
            id: Uuid::new_v4(),
            title: "Untitled".to_string(),
            author: String::new(),
            created_at: Utc::now(),
            modified_at: Utc::now(),
            custom_properties: HashMap::new(),
        }
    }
}

impl DocumentMetadata {
    /// 以模型名称为标题
    pub fn for_model(model: &ModelFile) -> Self {
        let main = model.main_model();
        let title = main.name.clone().unwrap_or_else(|| main.filename.clone());
        Self {
            title,
            ..Self::default()
        }
    }

    /// 更新修改时间
    pub fn touch(&mut self) {
        self.modified_at = Utc::now();
    }
}

/// `.lic` 文件内容
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LicContent {
    pub format_version: u32,
    pub metadata: DocumentMetadata,
    pub model: ModelFile,
    pub state: State,
}

impl LicContent {
    pub fn new(metadata: DocumentMetadata, model: ModelFile, state: State) -> Self {
        Self {
            format_version: FORMAT_VERSION,
            metadata,
            model,
            state,
        }
    }

    /// 从文档复制模型与状态
    pub fn from_document<R: SizeProvider>(
        document: &Document<ModelFile, R>,
        metadata: DocumentMetadata,
    ) -> Self {
        Self::new(metadata, document.model().clone(), document.state().clone())
    }

    /// 用给定的尺寸提供者还原文档
    pub fn into_document<R: SizeProvider>(self, renderer: R) -> (DocumentMetadata, Document<ModelFile, R>) {
        let document = Document::load(self.model, renderer, self.state);
        (self.metadata, document)
    }
}
