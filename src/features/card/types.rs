use serde::Deserialize;

use crate::features::langs::models::DEFAULT_TOP_N;

/// 卡片请求参数（全部通过 Query 传入，便于 `<img src>` 直接引用）。
#[derive(Debug, Clone, Deserialize)]
pub struct CardQuery {
    /// GitHub 用户名（缓存键）
    pub name: String,
    /// 背景色（#hex），缺省使用内置深色
    #[serde(default)]
    pub background: Option<String>,
    /// 逗号分隔的仓库排除列表（按名精确匹配）
    #[serde(default)]
    pub exclude: Option<String>,
    /// 逗号分隔的语言隐藏列表（大小写不敏感）
    #[serde(default)]
    pub hide: Option<String>,
    /// 是否统计私有仓库
    #[serde(default = "default_true")]
    pub include_private: bool,
    /// 是否并入所属组织的仓库
    #[serde(default = "default_true")]
    pub include_orgs: bool,
    /// 是否统计 fork 仓库
    #[serde(default = "default_true")]
    pub include_forks: bool,
    /// 展示的语言数量上限
    #[serde(default = "default_count")]
    pub count: usize,
}

fn default_true() -> bool {
    true
}

fn default_count() -> usize {
    DEFAULT_TOP_N
}

/// 拆分逗号分隔的列表参数；空段丢弃，两端空白剔除。
pub fn parse_list(raw: Option<&str>) -> Vec<String> {
    raw.map(|s| {
        s.split(',')
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .map(str::to_string)
            .collect()
    })
    .unwrap_or_default()
}
