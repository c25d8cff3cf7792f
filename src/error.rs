use axum::{
    Json,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

/// 应用统一错误类型
#[derive(Error, Debug, utoipa::ToSchema)]
pub enum AppError {
    /// 参数校验错误
    #[error("参数校验错误: {0}")]
    Validation(String),

    /// 内部服务器错误
    #[error("内部错误: {0}")]
    Internal(String),

    /// 上游 GitHub API 错误
    #[error("GitHub API 错误: {0}")]
    Github(#[from] GithubError),
}

/// GitHub API 错误类型
///
/// 聚合任务中的上游失败只会终结当前后台任务（记录日志后跳过），
/// 不会同步返回给请求方；请求方始终只看到 202 轮询。
#[derive(Error, Debug, utoipa::ToSchema)]
pub enum GithubError {
    /// 网络请求错误
    #[error("网络错误: {0}")]
    Network(String),

    /// 请求超时
    #[error("请求超时")]
    Timeout,

    /// 认证失败（token 无效或权限不足）
    #[error("认证失败: {0}")]
    Auth(String),

    /// 触发限流
    #[error("触发限流: {0}")]
    RateLimited(String),

    /// 目标不存在（用户/组织/仓库）
    #[error("目标不存在: {0}")]
    NotFound(String),

    /// 无效的响应
    #[error("无效的响应: {0}")]
    InvalidResponse(String),

    /// JSON 解析错误
    #[error("JSON 解析错误: {0}")]
    Json(String),
}

/// RFC7807 风格的错误响应（Problem Details）。
///
/// 设计目标：
/// - 让所有 API 错误返回结构化 JSON，便于调用方稳定处理
/// - 与 OpenAPI 一致（content-type = application/problem+json）
#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProblemDetails {
    /// 问题类型（URI）。若无更细分的类型，可使用 about:blank。
    #[serde(rename = "type")]
    #[schema(example = "about:blank")]
    pub type_url: String,

    /// 简短标题，用于概括错误。
    #[schema(example = "Validation Failed")]
    pub title: String,

    /// HTTP 状态码（与响应 status 一致）。
    #[schema(example = 422)]
    pub status: u16,

    /// 人类可读的详细信息（尽量稳定，不建议依赖解析）。
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,

    /// 稳定的错误码，用于程序化处理。
    #[schema(example = "VALIDATION_FAILED")]
    pub code: String,

    /// 可选：请求追踪 ID。
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

impl AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Github(e) => match e {
                GithubError::Auth(_) => StatusCode::UNAUTHORIZED,
                GithubError::RateLimited(_) => StatusCode::TOO_MANY_REQUESTS,
                GithubError::NotFound(_) => StatusCode::NOT_FOUND,
                GithubError::Timeout => StatusCode::GATEWAY_TIMEOUT,
                GithubError::Network(_) => StatusCode::BAD_GATEWAY,
                GithubError::InvalidResponse(_) | GithubError::Json(_) => StatusCode::BAD_GATEWAY,
            },
        }
    }

    fn stable_code(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "VALIDATION_FAILED",
            AppError::Internal(_) => "INTERNAL_ERROR",
            AppError::Github(e) => match e {
                GithubError::Auth(_) => "GITHUB_AUTH_FAILED",
                GithubError::RateLimited(_) => "GITHUB_RATE_LIMITED",
                GithubError::NotFound(_) => "GITHUB_NOT_FOUND",
                GithubError::Timeout => "UPSTREAM_TIMEOUT",
                GithubError::Network(_) => "UPSTREAM_ERROR",
                GithubError::InvalidResponse(_) | GithubError::Json(_) => "UPSTREAM_BAD_RESPONSE",
            },
        }
    }

    fn title(&self) -> &'static str {
        match self.status_code() {
            StatusCode::UNPROCESSABLE_ENTITY => "Validation Failed",
            StatusCode::UNAUTHORIZED => "Unauthorized",
            StatusCode::TOO_MANY_REQUESTS => "Too Many Requests",
            StatusCode::NOT_FOUND => "Not Found",
            StatusCode::BAD_GATEWAY => "Bad Gateway",
            StatusCode::GATEWAY_TIMEOUT => "Gateway Timeout",
            StatusCode::INTERNAL_SERVER_ERROR => "Internal Server Error",
            _ => "Error",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let problem = ProblemDetails {
            type_url: "about:blank".to_string(),
            title: self.title().to_string(),
            status: status.as_u16(),
            detail: Some(self.to_string()),
            code: self.stable_code().to_string(),
            request_id: crate::request_id::current_request_id(),
        };

        let mut res = Json(problem).into_response();
        *res.status_mut() = status;
        res.headers_mut().insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/problem+json"),
        );
        res
    }
}

// =============== Error conversions for common external errors ===============

impl From<reqwest::Error> for GithubError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            GithubError::Timeout
        } else if err.is_decode() {
            GithubError::Json(err.to_string())
        } else {
            GithubError::Network(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::GithubError;
    use std::time::Duration;

    async fn start_hanging_http_server() -> std::net::SocketAddr {
        use tokio::net::TcpListener;

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind tcp listener");
        let addr = listener.local_addr().expect("local addr");

        tokio::spawn(async move {
            loop {
                let (socket, _) = match listener.accept().await {
                    Ok(v) => v,
                    Err(_) => break,
                };
                tokio::spawn(async move {
                    // 不返回任何 HTTP 响应，触发客户端 read timeout。
                    tokio::time::sleep(Duration::from_secs(3)).await;
                    drop(socket);
                });
            }
        });

        addr
    }

    #[tokio::test]
    async fn github_error_from_reqwest_timeout_is_timeout() {
        let addr = start_hanging_http_server().await;
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(100))
            .build()
            .expect("build reqwest client");

        let err = client
            .get(format!("http://{addr}/"))
            .send()
            .await
            .expect_err("expected timeout");
        assert!(err.is_timeout(), "expected reqwest timeout, got: {err}");

        let gh: GithubError = err.into();
        assert!(
            matches!(gh, GithubError::Timeout),
            "expected GithubError::Timeout, got: {gh:?}"
        );
    }
}
