use super::engine::FfmpegEngine;
use super::orchestrator::{MergeOrchestrator, MergeRequest};
use super::scheduler::{MergeScheduler, MergeTask, TaskStatus};
use crate::config::Config;
use crate::config::save::{add_recent_path, save_settings};
use crate::tools::{CpuMonitor, MERGED_SUFFIX, scan_video_files, validate_directory_exists};
use anyhow::Result;
use console::style;
use dialoguer::Input;
use log::info;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

/// 影片合併元件：掃描資料夾、建立合併請求、交給排程器執行
pub struct VideoMerger {
    config: Config,
    shutdown_signal: Arc<AtomicBool>,
}

impl VideoMerger {
    pub const fn new(config: Config, shutdown_signal: Arc<AtomicBool>) -> Self {
        Self {
            config,
            shutdown_signal,
        }
    }

    pub fn run(&self) -> Result<()> {
        println!("{}", style("=== 影片合併 ===").cyan().bold());

        let input_path = self.prompt_input_path()?;
        let directory = PathBuf::from(&input_path);

        validate_directory_exists(&directory)?;
        self.remember_recent_path(&input_path)?;

        println!("{}", style("掃描影片檔案中...").dim());
        let requests = build_merge_requests(&directory, &self.config)?;

        if requests.is_empty() {
            println!("{}", style("找不到任何可以合併的影片檔案").yellow());
            return Ok(());
        }

        for request in &requests {
            println!(
                "{}",
                style(format!(
                    "  {} 個輸入 -> {}",
                    request.inputs.len(),
                    request.output.display()
                ))
                .green()
            );
            for input in &request.inputs {
                println!(
                    "    - {}",
                    input.file_name().unwrap_or_default().to_string_lossy()
                );
            }
        }

        println!();
        println!("{}", style("開始合併任務...").cyan());

        let engine = Arc::new(FfmpegEngine::new(Arc::clone(&self.shutdown_signal)));
        let orchestrator = Arc::new(MergeOrchestrator::new(
            engine,
            self.config.settings.clone(),
        ));
        let mut scheduler = MergeScheduler::new(
            requests,
            orchestrator,
            Arc::clone(&self.shutdown_signal),
            self.config.settings.max_concurrent_merges,
            CpuMonitor::default(),
        );

        scheduler.run();
        self.print_summary(scheduler.tasks());

        Ok(())
    }

    fn prompt_input_path(&self) -> Result<String> {
        let mut prompt = Input::<String>::new().with_prompt("請輸入影片資料夾路徑");
        if let Some(recent) = self.config.settings.recent_paths.first() {
            prompt = prompt.default(recent.clone());
        }
        Ok(prompt.interact_text()?.trim().to_string())
    }

    fn remember_recent_path(&self, path: &str) -> Result<()> {
        let mut settings = self.config.settings.clone();
        add_recent_path(&mut settings, path);
        save_settings(&settings)
    }

    fn print_summary(&self, tasks: &[MergeTask]) {
        let completed = tasks
            .iter()
            .filter(|t| t.status == TaskStatus::Completed)
            .count();
        let failed = tasks
            .iter()
            .filter(|t| t.status == TaskStatus::Failed)
            .count();

        println!();
        println!("{}", style("=== 合併任務摘要 ===").cyan().bold());
        for task in tasks {
            let name = task
                .request
                .output
                .file_name()
                .unwrap_or_default()
                .to_string_lossy()
                .to_string();
            match (&task.status, &task.result) {
                (TaskStatus::Completed, Some(result)) => {
                    println!(
                        "  {} {} ({}，{:.2} MB，{:.1}s)",
                        style("✓").green(),
                        name,
                        result.method_used,
                        result.size_mb(),
                        result.duration_taken.as_secs_f64()
                    );
                }
                (TaskStatus::Failed, _) => {
                    println!(
                        "  {} {} ({})",
                        style("✗").red(),
                        name,
                        task.error_message.as_deref().unwrap_or("未知錯誤")
                    );
                }
                _ => println!("  {} {} (未執行)", style("-").dim(), name),
            }
        }
        println!("  總計: {} 個請求", tasks.len());
        println!("  成功: {} 個", style(completed).green());
        if failed > 0 {
            println!("  失敗: {} 個", style(failed).red());
        }

        info!("合併任務完成 - 成功: {completed}, 失敗: {failed}");
    }
}

/// 把資料夾轉成合併請求
///
/// 有子資料夾時，每個含影片的子資料夾是一個請求（輸出放在根目錄）；
/// 根目錄自己的影片則合成另一個請求。輸入順序一律是檔名排序。
fn build_merge_requests(directory: &Path, config: &Config) -> Result<Vec<MergeRequest>> {
    let mut requests = Vec::new();

    let mut subdirs: Vec<PathBuf> = fs::read_dir(directory)?
        .filter_map(std::result::Result::ok)
        .filter(|entry| entry.file_type().is_ok_and(|t| t.is_dir()))
        .map(|entry| entry.path())
        .collect();
    subdirs.sort();

    for subdir in subdirs {
        let files = scan_video_files(&subdir, &config.settings)?;
        if files.is_empty() {
            continue;
        }
        let name = subdir
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "output".to_string());
        requests.push(MergeRequest::new(
            files.into_iter().map(|f| f.path).collect(),
            directory.join(format!("{name}{MERGED_SUFFIX}.mp4")),
        ));
    }

    let root_files = scan_video_files(directory, &config.settings)?;
    if !root_files.is_empty() {
        let name = directory
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "output".to_string());
        requests.push(MergeRequest::new(
            root_files.into_iter().map(|f| f.path).collect(),
            directory.join(format!("{name}{MERGED_SUFFIX}.mp4")),
        ));
    }

    Ok(requests)
}
