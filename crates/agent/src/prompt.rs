//! Knowledge-base system prompt.
//!
//! The whole brand catalog is rendered into the system instruction so the
//! model answers from the platform's own records. Rendering is a pure
//! function of the brand slice; callers decide when to re-read the catalog.

use laozihao_core::brand::Brand;

const PREAMBLE: &str = "你是一位专业的老字号文化传承助手，专门回答关于中华老字号品牌的问题。\n\n\
以下是平台收录的老字号品牌信息：";

const RULES: &str = "请根据以上信息回答用户的问题。要求：\n\
1. 回答要准确、专业，基于提供的品牌信息\n\
2. 如果问题涉及的信息不在上述品牌列表中，请礼貌地说明\n\
3. 回答要简洁明了，突出老字号的文化价值和历史意义\n\
4. 使用中文回答\n\
5. 如果用户询问的品牌不在列表中，可以简要介绍该品牌（如果确实存在），但说明平台目前没有收录详细信息\n\n\
请开始回答用户的问题：";

/// Separator between rendered brand blocks.
pub const BLOCK_SEPARATOR: &str = "\n---\n\n";

/// Render the system prompt for the given catalog.
pub fn build_system_prompt(brands: &[Brand]) -> String {
    let catalog = brands
        .iter()
        .map(render_brand)
        .collect::<Vec<_>>()
        .join(BLOCK_SEPARATOR);

    format!("{PREAMBLE}\n\n{catalog}\n\n{RULES}")
}

/// One brand as a block of labelled lines.
pub fn render_brand(brand: &Brand) -> String {
    let mut block = format!(
        "品牌名称：{}\n类别：{}\n创立时间：{}\n所在地：{}\n简介：{}\n",
        brand.name,
        brand.category,
        brand.founded,
        brand.location.as_deref().unwrap_or("未知"),
        brand.description,
    );

    if let Some(history) = brand.history.as_deref().filter(|h| !h.is_empty()) {
        block.push_str(&format!("历史：{history}\n"));
    }
    if let Some(keywords) = brand.keywords.as_ref().filter(|k| !k.is_empty()) {
        block.push_str(&format!("关键词：{}\n", keywords.join("、")));
    }
    if let Some(features) = brand.features.as_ref().filter(|f| !f.is_empty()) {
        block.push_str(&format!("特色：{}\n", features.join("、")));
    }

    block
}
