use axum::{
    Router,
    body::Bytes,
    extract::{Query, State},
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use tracing::debug;

use crate::error::AppError;
use crate::features::langs::CountOptions;
use crate::queue::{EnqueueOutcome, RenderJob};
use crate::state::AppState;

use super::renderer::DEFAULT_BACKGROUND;
use super::types::{CardQuery, parse_list};

pub fn create_card_router() -> Router<AppState> {
    Router::new().route("/card", get(get_card))
}

#[utoipa::path(
    get,
    path = "/card",
    summary = "生成语言占比卡片",
    description = "返回按字节占比排列的语言分布 SVG 卡片。首次请求返回 202 并在后台聚合；聚合完成后同一用户的请求命中缓存返回 SVG。",
    params(
        ("name" = String, Query, description = "GitHub 用户名"),
        ("background" = Option<String>, Query, description = "背景色（#hex），默认 #3c4043"),
        ("exclude" = Option<String>, Query, description = "逗号分隔的仓库排除列表（按名精确匹配）"),
        ("hide" = Option<String>, Query, description = "逗号分隔的语言隐藏列表（大小写不敏感）"),
        ("include_private" = Option<bool>, Query, description = "是否统计私有仓库，默认 true"),
        ("include_orgs" = Option<bool>, Query, description = "是否并入所属组织的仓库，默认 true"),
        ("include_forks" = Option<bool>, Query, description = "是否统计 fork 仓库，默认 true"),
        ("count" = Option<usize>, Query, description = "展示的语言数量上限，默认 5")
    ),
    responses(
        (status = 200, description = "SVG card for the subject"),
        (status = 202, description = "Aggregation queued, retry later"),
        (status = 422, description = "Invalid parameters", body = AppError)
    ),
    tag = "Card"
)]
pub async fn get_card(
    State(state): State<AppState>,
    Query(q): Query<CardQuery>,
) -> Result<Response, AppError> {
    let subject = q.name.trim();
    validate_subject(subject)?;
    if q.count == 0 {
        return Err(AppError::Validation("count 必须大于 0".to_string()));
    }

    let background = match q.background.as_deref().map(str::trim) {
        Some(raw) if !raw.is_empty() => {
            validate_background(raw)?;
            raw.to_string()
        }
        _ => DEFAULT_BACKGROUND.to_string(),
    };

    // 命中缓存：直接返回上次后台任务产出的 SVG
    if let Some(cached) = state.card_cache.get(subject).await {
        return Ok(svg_response(cached));
    }

    // 未命中：入队后立即 202，聚合失败也不会同步暴露给调用方
    let job = RenderJob {
        subject: subject.to_string(),
        options: CountOptions {
            exclude_repos: parse_list(q.exclude.as_deref()),
            hide_langs: parse_list(q.hide.as_deref()),
            include_private: q.include_private,
            include_orgs: q.include_orgs,
            include_forks: q.include_forks,
            top_n: q.count,
        },
        background,
    };
    match state.queue.try_enqueue(job) {
        EnqueueOutcome::Queued => debug!("用户 {} 的聚合任务已入队", subject),
        EnqueueOutcome::Coalesced => debug!("用户 {} 已有任务在途，本次合并", subject),
        // 队列满载已在队列侧告警；调用方照常拿到 202，稍后重试即可
        EnqueueOutcome::Rejected => {}
    }

    Ok(StatusCode::ACCEPTED.into_response())
}

fn svg_response(body: Bytes) -> Response {
    (
        [(
            header::CONTENT_TYPE,
            HeaderValue::from_static("image/svg+xml; charset=utf-8"),
        )],
        body,
    )
        .into_response()
}

/// GitHub 用户名规则：字母数字与连字符，最长 39。
fn validate_subject(subject: &str) -> Result<(), AppError> {
    if subject.is_empty()
        || subject.len() > 39
        || !subject
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-')
    {
        return Err(AppError::Validation(format!("无效的用户名: {subject}")));
    }
    Ok(())
}

/// 背景色会被插进 SVG 文本，只放行 `#` + 3-8 位十六进制。
fn validate_background(background: &str) -> Result<(), AppError> {
    let digits = background.strip_prefix('#').unwrap_or("");
    if !(3..=8).contains(&digits.len()) || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(AppError::Validation(format!("无效的背景色: {background}")));
    }
    Ok(())
}
