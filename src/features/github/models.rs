use serde::Deserialize;

/// 仓库引用（GitHub repository 对象的只读子集）。
///
/// 只保留聚合需要的字段：跳过判定（private/fork/name）与
/// 语言字节表查询（full_name）。
#[derive(Debug, Clone, Deserialize)]
pub struct RepoRef {
    pub id: u64,
    pub name: String,
    /// `owner/name` 形式，语言接口按它定位仓库
    pub full_name: String,
    pub private: bool,
    pub fork: bool,
}

/// 组织引用
#[derive(Debug, Clone, Deserialize)]
pub struct OrgRef {
    pub login: String,
}
