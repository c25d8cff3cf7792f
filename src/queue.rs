//! 后台渲染队列
//!
//! 进程级单 worker：聚合 + 渲染 + 写缓存串行执行，任意时刻最多一个
//! 聚合在途，从而把对上游 API 的并发压力压到 1。请求线程只做非阻塞
//! 入队，慢路径完全与请求处理解耦。

use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::body::Bytes;
use moka::future::Cache;
use tokio::sync::{mpsc, watch};
use tracing::{info, warn};

use crate::error::AppError;
use crate::features::card::renderer::render_lang_card;
use crate::features::github::GithubClient;
use crate::features::langs::{self, CountOptions};

/// 一次后台渲染任务：入队时快照的用户与过滤配置。
///
/// 任务自入队起归队列独占，完成后不留任何外部引用。
#[derive(Debug, Clone)]
pub struct RenderJob {
    pub subject: String,
    pub options: CountOptions,
    pub background: String,
}

/// 入队结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnqueueOutcome {
    /// 已进入队列
    Queued,
    /// 同一用户已有任务排队或执行中，本次合并
    Coalesced,
    /// 队列已满，任务被丢弃（后续请求会重新触发）
    Rejected,
}

/// 渲染队列句柄：对外只暴露非阻塞入队与优雅关闭。
#[derive(Clone)]
pub struct QueueHandle {
    tx: mpsc::Sender<RenderJob>,
    /// 排队中或执行中的用户集合，用于合并重复任务
    in_flight: Arc<Mutex<HashSet<String>>>,
    shutdown_tx: watch::Sender<bool>,
    done_rx: watch::Receiver<bool>,
}

impl QueueHandle {
    /// 非阻塞入队。
    ///
    /// 同一用户的任务在排队或执行期间重复入队会被合并；
    /// 队列满载时任务被拒绝并记录告警，调用方照常返回 202，
    /// 该用户由之后的请求重新触发。
    pub fn try_enqueue(&self, job: RenderJob) -> EnqueueOutcome {
        {
            let mut in_flight = lock_in_flight(&self.in_flight);
            if !in_flight.insert(job.subject.clone()) {
                return EnqueueOutcome::Coalesced;
            }
        }

        match self.tx.try_send(job) {
            Ok(()) => EnqueueOutcome::Queued,
            Err(err) => {
                let job = match err {
                    mpsc::error::TrySendError::Full(job) => job,
                    mpsc::error::TrySendError::Closed(job) => job,
                };
                warn!("渲染队列已满或已关闭，丢弃用户 {} 的任务", job.subject);
                lock_in_flight(&self.in_flight).remove(&job.subject);
                EnqueueOutcome::Rejected
            }
        }
    }

    /// 优雅关闭渲染队列：worker 跑完当前任务后不再取新任务。
    ///
    /// 排队未开始的任务允许被丢弃，对应用户的缓存条目保持缺失即可。
    pub async fn graceful_shutdown(&self, timeout: Duration) -> Result<(), AppError> {
        info!("开始关闭渲染队列，超时时间: {:?}", timeout);
        let _ = self.shutdown_tx.send(true);

        let mut rx = self.done_rx.clone();
        let wait = async {
            loop {
                if *rx.borrow() {
                    break;
                }
                if rx.changed().await.is_err() {
                    break;
                }
            }
        };

        match tokio::time::timeout(timeout, wait).await {
            Ok(_) => {
                info!("渲染队列已关闭");
                Ok(())
            }
            Err(_) => Err(AppError::Internal("渲染队列关闭超时".into())),
        }
    }
}

fn lock_in_flight(
    in_flight: &Mutex<HashSet<String>>,
) -> std::sync::MutexGuard<'_, HashSet<String>> {
    match in_flight.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

/// 启动渲染队列：创建有界 FIFO 通道并 spawn 唯一的 worker。
///
/// worker 存活整个进程生命周期，严格按入队顺序逐个执行任务；
/// 单个任务失败记录日志后继续，不影响后续任务。
pub fn spawn_render_queue(
    capacity: usize,
    github: Arc<GithubClient>,
    card_cache: Cache<String, Bytes>,
) -> QueueHandle {
    let (tx, mut rx) = mpsc::channel::<RenderJob>(capacity.max(1));
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let (done_tx, done_rx) = watch::channel(false);
    let in_flight = Arc::new(Mutex::new(HashSet::new()));

    let worker_in_flight = in_flight.clone();
    tokio::spawn(async move {
        let mut shutdown_rx = shutdown_rx;

        loop {
            tokio::select! {
                // 收到退出信号：当前任务已完成，直接停止取新任务
                _ = shutdown_rx.changed() => {
                    if *shutdown_rx.borrow() {
                        info!("渲染队列收到退出信号，停止取新任务");
                        break;
                    }
                }
                job = rx.recv() => {
                    match job {
                        Some(job) => {
                            let subject = job.subject.clone();
                            run_job(&github, &card_cache, job).await;
                            lock_in_flight(&worker_in_flight).remove(&subject);
                        }
                        None => {
                            info!("渲染队列通道关闭，worker 退出");
                            break;
                        }
                    }
                }
            }
        }

        let _ = done_tx.send(true);
    });

    QueueHandle {
        tx,
        in_flight,
        shutdown_tx,
        done_rx,
    }
}

/// 执行单个任务：聚合 → 渲染 → 写缓存。
///
/// 失败是该任务的终态（不重试）：缓存保持缺失，用户的下一次请求
/// 会重新入队。
async fn run_job(github: &GithubClient, card_cache: &Cache<String, Bytes>, job: RenderJob) {
    info!("开始聚合用户 {} 的语言分布", job.subject);

    match langs::count_subject_langs(github, &job.subject, &job.options).await {
        Ok(shares) => {
            let svg = render_lang_card(&shares, &job.background);
            let size = svg.len();
            card_cache.insert(job.subject.clone(), Bytes::from(svg)).await;
            info!(
                "用户 {} 的卡片已生成（{} 种语言，{} 字节）",
                job.subject,
                shares.len(),
                size
            );
        }
        Err(e) => {
            warn!("用户 {} 的聚合任务失败: {}", job.subject, e);
        }
    }
}
