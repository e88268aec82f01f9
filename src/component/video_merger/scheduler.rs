use super::engine::MediaEngine;
use super::error::MergeError;
use super::orchestrator::{MergeOrchestrator, MergeRequest, MergeResult};
use crate::tools::CpuMonitor;
use log::{error, info, warn};
use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskStatus {
    Pending,
    Running,
    Completed,
    Failed,
}

/// 一個排程中的合併請求與它的結果
#[derive(Debug)]
pub struct MergeTask {
    pub request: MergeRequest,
    pub status: TaskStatus,
    pub result: Option<MergeResult>,
    pub error_message: Option<String>,
}

impl MergeTask {
    #[must_use]
    pub fn new(request: MergeRequest) -> Self {
        Self {
            request,
            status: TaskStatus::Pending,
            result: None,
            error_message: None,
        }
    }
}

struct RunningMerge {
    handle: JoinHandle<Result<MergeResult, MergeError>>,
    task_index: usize,
}

/// 多個合併請求的排程器
///
/// 每個請求一個工作執行緒，同時數量受設定上限與 CPU 使用率限制。
/// 請求之間沒有共享狀態；輸出路徑重複的請求在排程前就會被拒絕，
/// 避免兩個請求互相覆寫。
pub struct MergeScheduler<E: MediaEngine + Send + Sync + 'static> {
    tasks: Vec<MergeTask>,
    running: Vec<RunningMerge>,
    orchestrator: Arc<MergeOrchestrator<E>>,
    cpu_monitor: CpuMonitor,
    shutdown_signal: Arc<AtomicBool>,
    max_concurrent: usize,
}

impl<E: MediaEngine + Send + Sync + 'static> MergeScheduler<E> {
    pub fn new(
        requests: Vec<MergeRequest>,
        orchestrator: Arc<MergeOrchestrator<E>>,
        shutdown_signal: Arc<AtomicBool>,
        max_concurrent: usize,
        cpu_monitor: CpuMonitor,
    ) -> Self {
        let mut seen_outputs = HashSet::new();
        let tasks = requests
            .into_iter()
            .map(|request| {
                let mut task = MergeTask::new(request);
                if !seen_outputs.insert(task.request.output.clone()) {
                    task.status = TaskStatus::Failed;
                    task.error_message = Some("輸出路徑與其他請求重複".to_string());
                    warn!(
                        "拒絕輸出路徑重複的請求: {}",
                        task.request.output.display()
                    );
                }
                task
            })
            .collect();

        Self {
            tasks,
            running: Vec::new(),
            orchestrator,
            cpu_monitor,
            shutdown_signal,
            max_concurrent: max_concurrent.max(1),
        }
    }

    pub fn run(&mut self) {
        info!("開始合併任務，共 {} 個請求", self.tasks.len());

        while !self.is_all_completed() {
            if self.shutdown_signal.load(Ordering::SeqCst) {
                self.handle_shutdown();
                return;
            }

            self.reap_finished();
            self.spawn_new_tasks_if_possible();

            thread::sleep(Duration::from_millis(200));
        }

        info!("所有合併任務已完成");
    }

    fn is_all_completed(&self) -> bool {
        self.tasks
            .iter()
            .all(|t| matches!(t.status, TaskStatus::Completed | TaskStatus::Failed))
            && self.running.is_empty()
    }

    fn spawn_new_tasks_if_possible(&mut self) {
        while self.running.len() < self.max_concurrent {
            // 第一個任務無條件啟動，其餘看 CPU 還有沒有餘裕
            if !self.running.is_empty() && !self.cpu_monitor.can_spawn_new_task() {
                break;
            }
            let Some(task_index) = self.find_next_pending_task() else {
                break;
            };
            self.spawn_task(task_index);
        }
    }

    fn find_next_pending_task(&self) -> Option<usize> {
        self.tasks
            .iter()
            .position(|t| t.status == TaskStatus::Pending)
    }

    fn spawn_task(&mut self, task_index: usize) {
        let task = &mut self.tasks[task_index];
        task.status = TaskStatus::Running;

        info!(
            "啟動合併任務: {} 個輸入 -> {}",
            task.request.inputs.len(),
            task.request.output.display()
        );

        let orchestrator = Arc::clone(&self.orchestrator);
        let request = task.request.clone();
        let handle = thread::spawn(move || orchestrator.run(&request));

        self.running.push(RunningMerge { handle, task_index });
    }

    fn reap_finished(&mut self) {
        let running: Vec<RunningMerge> = self.running.drain(..).collect();

        for merge in running {
            if merge.handle.is_finished() {
                self.collect_result(merge);
            } else {
                self.running.push(merge);
            }
        }
    }

    fn collect_result(&mut self, merge: RunningMerge) {
        let task = &mut self.tasks[merge.task_index];

        match merge.handle.join() {
            Ok(Ok(result)) => {
                task.status = TaskStatus::Completed;
                task.result = Some(result);
            }
            Ok(Err(e)) => {
                task.status = TaskStatus::Failed;
                task.error_message = Some(e.to_string());
                error!("合併任務失敗 ({}): {e}", task.request.output.display());
            }
            Err(_) => {
                task.status = TaskStatus::Failed;
                task.error_message = Some("合併執行緒異常結束".to_string());
                error!("合併執行緒異常結束: {}", task.request.output.display());
            }
        }
    }

    /// 中斷時等所有工作執行緒收尾
    ///
    /// 引擎自己會看到中斷旗標、終止 ffmpeg 並清掉半成品，這裡只負責 join
    fn handle_shutdown(&mut self) {
        warn!("收到中斷信號，正在停止所有合併任務...");

        let running: Vec<RunningMerge> = self.running.drain(..).collect();
        for merge in running {
            self.collect_result(merge);
        }
    }

    #[must_use]
    pub fn tasks(&self) -> &[MergeTask] {
        &self.tasks
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::video_merger::fake_engine::FakeEngine;
    use crate::component::video_merger::orchestrator::MergeMethod;
    use crate::config::MergeSettings;
    use std::path::PathBuf;

    fn scheduler_with(
        engine: FakeEngine,
        requests: Vec<MergeRequest>,
    ) -> MergeScheduler<FakeEngine> {
        let orchestrator = Arc::new(MergeOrchestrator::new(
            Arc::new(engine),
            MergeSettings::default(),
        ));
        MergeScheduler::new(
            requests,
            orchestrator,
            Arc::new(AtomicBool::new(false)),
            2,
            CpuMonitor::new(f32::MAX),
        )
    }

    fn uniform_engine() -> FakeEngine {
        FakeEngine::new()
            .with_clip("/v/a.mp4", "h264", 1920, 1080, 30, 1)
            .with_clip("/v/b.mp4", "h264", 1920, 1080, 30, 1)
    }

    fn request_to(output: &str) -> MergeRequest {
        MergeRequest::new(
            vec![PathBuf::from("/v/a.mp4"), PathBuf::from("/v/b.mp4")],
            PathBuf::from(output),
        )
    }

    #[test]
    fn test_scheduler_completes_all_tasks() {
        let requests = vec![
            request_to("/v/out1.mp4"),
            request_to("/v/out2.mp4"),
            request_to("/v/out3.mp4"),
        ];
        let mut scheduler = scheduler_with(uniform_engine(), requests);
        scheduler.run();

        for task in scheduler.tasks() {
            assert_eq!(task.status, TaskStatus::Completed);
            assert_eq!(task.result.as_ref().unwrap().method_used, MergeMethod::Fast);
        }
    }

    #[test]
    fn test_duplicate_output_path_rejected() {
        let requests = vec![request_to("/v/out.mp4"), request_to("/v/out.mp4")];
        let mut scheduler = scheduler_with(uniform_engine(), requests);

        assert_eq!(scheduler.tasks()[1].status, TaskStatus::Failed);

        scheduler.run();
        assert_eq!(scheduler.tasks()[0].status, TaskStatus::Completed);
        assert_eq!(scheduler.tasks()[1].status, TaskStatus::Failed);
    }

    #[test]
    fn test_failed_merge_reported_per_task() {
        let engine = uniform_engine().with_fast_failure().with_slow_failure();
        let mut scheduler = scheduler_with(engine, vec![request_to("/v/out.mp4")]);
        scheduler.run();

        let task = &scheduler.tasks()[0];
        assert_eq!(task.status, TaskStatus::Failed);
        assert!(task.error_message.is_some());
    }
}
