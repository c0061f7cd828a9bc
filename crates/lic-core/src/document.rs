//! 文档上下文
//!
//! [`Document`] 持有状态、模型提供者、尺寸提供者与布局配置。
//! 所有结构修改与布局都经由它进行；单线程、同步执行。

use crate::config::LayoutConfig;
use crate::model::ModelProvider;
use crate::render::SizeProvider;
use crate::state::State;
use tracing::debug;

/// 说明书文档
#[derive(Debug, Clone)]
pub struct Document<M, R> {
    pub(crate) state: State,
    pub(crate) model: M,
    pub(crate) renderer: R,
    pub(crate) config: LayoutConfig,
}

impl<M: ModelProvider, R: SizeProvider> Document<M, R> {
    /// 以空状态和默认配置创建文档
    pub fn new(model: M, renderer: R) -> Self {
        Self {
            state: State::new(),
            model,
            renderer,
            config: LayoutConfig::default(),
        }
    }

    /// 使用指定的布局配置
    pub fn with_config(mut self, config: LayoutConfig) -> Self {
        self.config = config;
        self
    }

    /// 用已有的模型与状态创建文档（例如从文件加载）
    pub fn load(model: M, renderer: R, state: State) -> Self {
        Self {
            state,
            model,
            renderer,
            config: LayoutConfig::default(),
        }
    }

    pub fn state(&self) -> &State {
        &self.state
    }

    /// 可变状态，直接修改时调用方自行维护不变量
    pub fn state_mut(&mut self) -> &mut State {
        &mut self.state
    }

    /// 整体替换状态，返回旧状态（撤销/重做使用）
    pub fn replace_state(&mut self, state: State) -> State {
        debug!("Replacing document state");
        std::mem::replace(&mut self.state, state)
    }

    /// 恢复为空状态
    pub fn reset_state(&mut self) {
        self.state = State::new();
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut LayoutConfig {
        &mut self.config
    }

    /// 拆分为模型与状态（保存文件使用）
    pub fn into_parts(self) -> (M, State) {
        (self.model, self.state)
    }
}
