use crate::component::VideoMerger;
use crate::config::Config;
use crate::pause;
use anyhow::Result;
use console::{Term, style};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

pub fn run_video_merger(term: &Term, shutdown_signal: &Arc<AtomicBool>) -> Result<()> {
    // 上一次被中斷的旗標不能影響這次執行
    shutdown_signal.store(false, Ordering::SeqCst);

    let config = Config::new()?;
    let merger = VideoMerger::new(config, Arc::clone(shutdown_signal));

    if let Err(e) = merger.run() {
        eprintln!("{} {}", style("錯誤:").red().bold(), e);
    }

    pause(term)?;
    Ok(())
}
