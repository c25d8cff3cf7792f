use reqwest::{StatusCode, header};
use serde::de::DeserializeOwned;
use std::time::Duration;

use crate::config::GithubConfig;
use crate::error::GithubError;

use super::models::{OrgRef, RepoRef};

const USER_AGENT: &str = concat!("toplangs-backend/", env!("CARGO_PKG_VERSION"));
const ACCEPT_GITHUB_JSON: &str = "application/vnd.github+json";
const API_VERSION: &str = "2022-11-28";

/// GitHub REST API 客户端。
///
/// 聚合一个用户的语言分布需要的三类只读操作：
/// - 列出用户（或组织）的仓库，分页拉全；
/// - 列出用户所属组织；
/// - 拉取单个仓库的语言字节表。
///
/// 基地址来自配置，测试时指向本地 mock 服务即可覆盖全部网络路径。
pub struct GithubClient {
    http: reqwest::Client,
    api_base_url: String,
    token: String,
    per_page: u32,
}

impl GithubClient {
    pub fn new(config: &GithubConfig) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            api_base_url: config.api_base_url.trim_end_matches('/').to_string(),
            token: config.token.clone(),
            per_page: config.per_page.clamp(1, 100),
        })
    }

    /// 列出用户自己的仓库。
    pub async fn user_repositories(&self, user: &str) -> Result<Vec<RepoRef>, GithubError> {
        self.get_paged(&format!("/users/{user}/repos")).await
    }

    /// 列出用户所属组织。
    pub async fn user_organizations(&self, user: &str) -> Result<Vec<OrgRef>, GithubError> {
        self.get_paged(&format!("/users/{user}/orgs")).await
    }

    /// 列出组织的仓库。
    pub async fn org_repositories(&self, org: &str) -> Result<Vec<RepoRef>, GithubError> {
        self.get_paged(&format!("/orgs/{org}/repos")).await
    }

    /// 用户仓库 + 所属组织的仓库，简单拼接。
    ///
    /// 不做去重：同时以个人与组织身份可见的仓库会被统计两次，
    /// 与上游返回的可见性口径保持一致。
    pub async fn user_with_orgs_repositories(
        &self,
        user: &str,
    ) -> Result<Vec<RepoRef>, GithubError> {
        let mut repos = self.user_repositories(user).await?;

        let orgs = self.user_organizations(user).await?;
        for org in orgs {
            let org_repos = self.org_repositories(&org.login).await?;
            repos.extend(org_repos);
        }

        Ok(repos)
    }

    /// 拉取仓库的语言字节表，保持上游响应顺序。
    ///
    /// 顺序参与排名语义：字节数相同的语言按首次出现顺序排列，
    /// 因此这里不能落进按键排序的 map。
    pub async fn repo_languages(
        &self,
        full_name: &str,
    ) -> Result<Vec<(String, i64)>, GithubError> {
        let url = format!("{}/repos/{}/languages", self.api_base_url, full_name);
        let map: serde_json::Map<String, serde_json::Value> = self.get_json(&url).await?;

        let mut langs = Vec::with_capacity(map.len());
        for (name, value) in map {
            let bytes = value.as_i64().ok_or_else(|| {
                GithubError::InvalidResponse(format!("仓库 {full_name} 的语言 {name} 字节数非整数"))
            })?;
            langs.push((name, bytes));
        }
        Ok(langs)
    }

    /// 按 `per_page`/`page` 翻页拉全一个列表接口。
    async fn get_paged<T: DeserializeOwned>(&self, path: &str) -> Result<Vec<T>, GithubError> {
        let mut all = Vec::new();
        let mut page = 1u32;

        loop {
            let url = format!(
                "{}{}?per_page={}&page={}",
                self.api_base_url, path, self.per_page, page
            );
            let batch: Vec<T> = self.get_json(&url).await?;
            let fetched = batch.len();
            all.extend(batch);

            // 不满一页即为最后一页
            if fetched < self.per_page as usize {
                break;
            }
            page += 1;
        }

        Ok(all)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, GithubError> {
        let mut req = self
            .http
            .get(url)
            .header(header::USER_AGENT, USER_AGENT)
            .header(header::ACCEPT, ACCEPT_GITHUB_JSON)
            .header("X-GitHub-Api-Version", API_VERSION);
        if !self.token.is_empty() {
            req = req.bearer_auth(&self.token);
        }

        let response = req.send().await?;
        let status = response.status();

        if !status.is_success() {
            return Err(match status {
                StatusCode::UNAUTHORIZED => {
                    GithubError::Auth("token 无效或已过期".to_string())
                }
                StatusCode::FORBIDDEN | StatusCode::TOO_MANY_REQUESTS => {
                    if rate_limit_exhausted(&response) {
                        GithubError::RateLimited(format!("GET {url} 被限流"))
                    } else {
                        GithubError::Auth(format!("GET {url} 被拒绝: {status}"))
                    }
                }
                StatusCode::NOT_FOUND => GithubError::NotFound(format!("GET {url} 返回 404")),
                _ => GithubError::InvalidResponse(format!("GET {url} 返回 {status}")),
            });
        }

        Ok(response.json().await?)
    }
}

/// 403 可能是权限问题也可能是限流；以 `x-ratelimit-remaining: 0` 区分。
fn rate_limit_exhausted(response: &reqwest::Response) -> bool {
    response
        .headers()
        .get("x-ratelimit-remaining")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.trim() == "0")
}
