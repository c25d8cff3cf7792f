use tracing::debug;

use crate::error::GithubError;
use crate::features::github::{GithubClient, RepoRef};

use super::models::{CountOptions, LangCount, LangShare};

/// 聚合一个用户的语言分布。
///
/// 流程：拉仓库列表（可并入组织仓库，简单拼接不去重）→ 按跳过谓词
/// 过滤仓库 → 逐仓库累加语言字节数 → 排名取 top-N 计算占比。
/// 上游任何一步失败都直接向上传播，引擎内部不重试。
pub async fn count_subject_langs(
    github: &GithubClient,
    subject: &str,
    opts: &CountOptions,
) -> Result<Vec<LangShare>, GithubError> {
    let repos = if opts.include_orgs {
        github.user_with_orgs_repositories(subject).await?
    } else {
        github.user_repositories(subject).await?
    };
    debug!("用户 {} 共 {} 个候选仓库", subject, repos.len());

    let skip_repo_ifs = build_skip_predicates(opts);
    let hide_lower: Vec<String> = opts.hide_langs.iter().map(|h| h.to_lowercase()).collect();

    let mut counts: Vec<LangCount> = Vec::new();
    for repo in &repos {
        // 任一谓词命中即跳过
        if skip_repo_ifs.iter().any(|skip| skip(repo)) {
            continue;
        }

        let repo_langs = github.repo_languages(&repo.full_name).await?;
        accumulate_repo_langs(&mut counts, repo_langs, &hide_lower);
    }
    debug!("用户 {} 累计 {} 种语言", subject, counts.len());

    Ok(rank_shares(counts, opts.top_n))
}

type SkipPredicate = Box<dyn Fn(&RepoRef) -> bool + Send + Sync>;

/// 把过滤开关翻译成一组跳过谓词，命中任意一条即跳过该仓库。
fn build_skip_predicates(opts: &CountOptions) -> Vec<SkipPredicate> {
    let mut skip_repo_ifs: Vec<SkipPredicate> = Vec::new();
    if !opts.include_private {
        skip_repo_ifs.push(Box::new(|repo| repo.private));
    }
    if !opts.exclude_repos.is_empty() {
        let exclude = opts.exclude_repos.clone();
        skip_repo_ifs.push(Box::new(move |repo| exclude.iter().any(|x| *x == repo.name)));
    }
    if !opts.include_forks {
        skip_repo_ifs.push(Box::new(|repo| repo.fork));
    }
    skip_repo_ifs
}

/// 把单个仓库的语言字节表累加进运行总账。
///
/// - 被隐藏的语言（大小写不敏感）连同字节数一起剔除，不进分母；
/// - 首次出现的语言建新条目，后续出现累加，因此条目顺序即首次出现顺序；
/// - 上游返回的非正字节数按 0 处理。
fn accumulate_repo_langs(
    counts: &mut Vec<LangCount>,
    repo_langs: Vec<(String, i64)>,
    hide_lower: &[String],
) {
    for (name, bytes) in repo_langs {
        if hide_lower.iter().any(|h| *h == name.to_lowercase()) {
            continue;
        }

        let bytes = if bytes <= 0 { 0 } else { bytes as u64 };
        match counts.iter_mut().find(|c| c.name == name) {
            Some(existing) => existing.bytes += bytes,
            None => counts.push(LangCount { name, bytes }),
        }
    }
}

/// 排名核心：按字节数降序稳定排序，取前 `top_n`，以全量总和为分母计算占比。
///
/// 总和为 0（没有任何语言）时返回空序列，不做除法。
pub fn rank_shares(counts: Vec<LangCount>, top_n: usize) -> Vec<LangShare> {
    let total: u64 = counts.iter().map(|c| c.bytes).sum();
    if total == 0 {
        return Vec::new();
    }

    let mut ranked = counts;
    // Vec::sort_by 是稳定排序：字节数相同的语言保持首次出现顺序
    ranked.sort_by(|a, b| b.bytes.cmp(&a.bytes));
    ranked.truncate(top_n);

    ranked
        .into_iter()
        .map(|c| LangShare {
            name: c.name,
            percent: c.bytes as f64 / total as f64,
        })
        .collect()
}
