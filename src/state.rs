use axum::body::Bytes;
use moka::future::Cache;
use std::sync::Arc;

use crate::features::github::GithubClient;
use crate::queue::QueueHandle;

/// 聚合的应用共享状态
#[derive(Clone)]
pub struct AppState {
    /// GitHub API 客户端（仅后台 worker 通过队列间接使用）
    pub github: Arc<GithubClient>,
    /// 卡片缓存：用户名 → 压缩后的 SVG（按字节大小加权）
    pub card_cache: Cache<String, Bytes>,
    /// 后台渲染队列句柄
    pub queue: QueueHandle,
}
