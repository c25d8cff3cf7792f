/// GitHub API 客户端
pub mod github;

/// 语言字节数聚合引擎
pub mod langs;

/// 语言占比卡片（渲染 + HTTP 接口）
pub mod card;
