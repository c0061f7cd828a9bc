//! 布局与导入配置

use crate::math::Size;
use serde::{Deserialize, Serialize};

/// 页面边距
pub const PAGE_MARGIN: f64 = 20.0;

/// 布局参数
///
/// 缺省字段取默认值，因此 JSON 配置文件只需写出要覆盖的部分。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// 步骤单元格内边距，也用于页码标签到页边的距离
    pub page_margin: f64,

    /// 零件表内边距
    pub pli_margin: f64,

    /// 数量标签相对图标左下角的偏移
    pub qty_label_offset: f64,

    /// 封面页步骤图四周留白
    pub title_page_padding: f64,

    pub step_number_font: String,
    pub page_number_font: String,
    pub pli_qty_font: String,
    pub title_font: String,
    pub model_info_font: String,

    /// 新建文本注释的默认字体
    pub annotation_font: String,

    pub rotate_icon_size: Size,

    /// 新建插图框的默认尺寸
    pub callout_size: Size,

    /// 新建箭头注释的长度
    pub arrow_length: f64,

    /// 零件位移距离与位移箭头长度的默认值
    pub displacement_distance: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            page_margin: PAGE_MARGIN,
            pli_margin: PAGE_MARGIN / 1.2,
            qty_label_offset: 5.0,
            title_page_padding: 20.0,
            step_number_font: "bold 20pt Helvetica".to_string(),
            page_number_font: "bold 20pt Helvetica".to_string(),
            pli_qty_font: "bold 10pt Helvetica".to_string(),
            title_font: "20pt Helvetica".to_string(),
            model_info_font: "16pt Helvetica".to_string(),
            annotation_font: "20pt Helvetica".to_string(),
            rotate_icon_size: Size::new(40.0, 40.0),
            callout_size: Size::new(200.0, 150.0),
            arrow_length: 100.0,
            displacement_distance: 60.0,
        }
    }
}

/// 模型导入选项
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportOptions {
    /// 每页步骤数，至少为 1
    pub steps_per_page: usize,

    /// 是否生成封面页
    pub include_title_page: bool,

    /// 是否显示零件表
    pub include_pli: bool,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            steps_per_page: 1,
            include_title_page: false,
            include_pli: true,
        }
    }
}
