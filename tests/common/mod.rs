//! 集成测试公共设施：本地 mock GitHub API + 应用组装辅助。
//!
//! GithubClient 的基地址来自配置，测试把它指向本机随机端口上的
//! mock 服务即可覆盖完整网络路径，不需要真实凭证。

// 各测试二进制只用到本模块的子集
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    Json, Router,
    body::Bytes,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use moka::future::Cache;
use serde_json::{Value, json};

use toplangs_backend::config::GithubConfig;
use toplangs_backend::features::card::create_card_router;
use toplangs_backend::features::github::GithubClient;
use toplangs_backend::queue::spawn_render_queue;
use toplangs_backend::state::AppState;

/// 可编程的 mock GitHub：固定数据 + 请求日志。
#[derive(Clone, Default)]
pub struct MockGithub {
    inner: Arc<Mutex<MockData>>,
}

#[derive(Default)]
struct MockData {
    user_repos: HashMap<String, Vec<Value>>,
    user_orgs: HashMap<String, Vec<Value>>,
    org_repos: HashMap<String, Vec<Value>>,
    repo_languages: HashMap<String, Value>,
    request_log: Vec<String>,
    languages_delay: Duration,
}

fn repo_json(full_name: &str, private: bool, fork: bool) -> Value {
    let name = full_name.rsplit('/').next().unwrap_or(full_name);
    json!({
        "id": 1,
        "name": name,
        "full_name": full_name,
        "private": private,
        "fork": fork,
    })
}

impl MockGithub {
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册一个用户仓库及其语言字节表（`langs` 顺序即上游响应顺序）。
    pub fn add_user_repo(
        &self,
        user: &str,
        full_name: &str,
        private: bool,
        fork: bool,
        langs: &[(&str, i64)],
    ) {
        let mut data = self.inner.lock().unwrap();
        data.user_repos
            .entry(user.to_string())
            .or_default()
            .push(repo_json(full_name, private, fork));
        data.repo_languages
            .insert(full_name.to_string(), langs_json(langs));
    }

    /// 注册用户所属组织。
    pub fn add_user_org(&self, user: &str, org: &str) {
        let mut data = self.inner.lock().unwrap();
        data.user_orgs
            .entry(user.to_string())
            .or_default()
            .push(json!({ "login": org }));
        data.org_repos.entry(org.to_string()).or_default();
    }

    /// 注册一个组织仓库及其语言字节表。
    pub fn add_org_repo(&self, org: &str, full_name: &str, langs: &[(&str, i64)]) {
        let mut data = self.inner.lock().unwrap();
        data.org_repos
            .entry(org.to_string())
            .or_default()
            .push(repo_json(full_name, false, false));
        data.repo_languages
            .insert(full_name.to_string(), langs_json(langs));
    }

    /// 给语言接口注入人为延迟，放大并发竞争窗口。
    pub fn set_languages_delay(&self, delay: Duration) {
        self.inner.lock().unwrap().languages_delay = delay;
    }

    /// 已收到的请求路径（按到达顺序）。
    pub fn requests(&self) -> Vec<String> {
        self.inner.lock().unwrap().request_log.clone()
    }

    fn log(&self, path: String) {
        self.inner.lock().unwrap().request_log.push(path);
    }

    /// 在本机随机端口启动 mock 服务，返回基地址。
    pub async fn serve(&self) -> String {
        let router = Router::new()
            .route("/users/:user/repos", get(list_user_repos))
            .route("/users/:user/orgs", get(list_user_orgs))
            .route("/orgs/:org/repos", get(list_org_repos))
            .route("/repos/:owner/:repo/languages", get(repo_languages))
            .with_state(self.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind mock listener");
        let addr = listener.local_addr().expect("mock local addr");

        tokio::spawn(async move {
            let _ = axum::serve(listener, router).await;
        });

        format!("http://{addr}")
    }
}

fn langs_json(langs: &[(&str, i64)]) -> Value {
    let mut map = serde_json::Map::new();
    for (name, bytes) in langs {
        map.insert(name.to_string(), json!(bytes));
    }
    Value::Object(map)
}

/// 按 `per_page`/`page` 切片，与真实 API 的翻页语义一致。
fn paginate(items: &[Value], query: &HashMap<String, String>) -> Vec<Value> {
    let per_page: usize = query
        .get("per_page")
        .and_then(|v| v.parse().ok())
        .unwrap_or(30);
    let page: usize = query.get("page").and_then(|v| v.parse().ok()).unwrap_or(1);
    items
        .iter()
        .skip(per_page * page.saturating_sub(1))
        .take(per_page)
        .cloned()
        .collect()
}

async fn list_user_repos(
    State(mock): State<MockGithub>,
    Path(user): Path<String>,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    mock.log(format!("/users/{user}/repos"));
    let data = mock.inner.lock().unwrap();
    match data.user_repos.get(&user) {
        Some(repos) => Json(paginate(repos, &query)).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn list_user_orgs(
    State(mock): State<MockGithub>,
    Path(user): Path<String>,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    mock.log(format!("/users/{user}/orgs"));
    let data = mock.inner.lock().unwrap();
    let orgs = data.user_orgs.get(&user).cloned().unwrap_or_default();
    Json(paginate(&orgs, &query)).into_response()
}

async fn list_org_repos(
    State(mock): State<MockGithub>,
    Path(org): Path<String>,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    mock.log(format!("/orgs/{org}/repos"));
    let data = mock.inner.lock().unwrap();
    match data.org_repos.get(&org) {
        Some(repos) => Json(paginate(repos, &query)).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn repo_languages(
    State(mock): State<MockGithub>,
    Path((owner, repo)): Path<(String, String)>,
) -> Response {
    let full_name = format!("{owner}/{repo}");
    mock.log(format!("/repos/{full_name}/languages"));
    let (delay, langs) = {
        let data = mock.inner.lock().unwrap();
        (
            data.languages_delay,
            data.repo_languages.get(&full_name).cloned(),
        )
    };
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
    match langs {
        Some(langs) => Json(langs).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

// ---------------- 应用组装 ----------------

pub fn github_config(base_url: &str) -> GithubConfig {
    GithubConfig {
        api_base_url: base_url.to_string(),
        token: String::new(),
        per_page: 100,
        timeout_secs: 5,
    }
}

pub fn github_client(base_url: &str) -> GithubClient {
    GithubClient::new(&github_config(base_url)).expect("GithubClient::new")
}

/// 组装一套贴近生产形态的应用状态：真实客户端 + moka 缓存 + 渲染队列。
pub fn new_test_state(base_url: &str) -> AppState {
    let github = Arc::new(github_client(base_url));
    let card_cache: Cache<String, Bytes> = Cache::builder().max_capacity(1024 * 1024).build();
    let queue = spawn_render_queue(16, github.clone(), card_cache.clone());

    AppState {
        github,
        card_cache,
        queue,
    }
}

/// 贴近生产部署：card 路由实际挂在 /api/v1 下
pub fn build_app(state: AppState) -> Router {
    Router::new()
        .nest("/api/v1", create_card_router())
        .with_state(state)
}
