//! 影片合併元件
//!
//! 核心是兩層合併策略：輸入一致時先試串流複製（快），
//! 條件不符或執行失敗時自動回退到重新編碼（慢但一定能做）

mod compatibility;
mod engine;
mod error;
mod main;
mod merger;
mod orchestrator;
mod scheduler;

#[cfg(test)]
pub(crate) mod fake_engine;

pub use compatibility::is_uniform;
pub use engine::{FfmpegEngine, MediaEngine};
pub use error::{EngineError, FastMergeError, FatalMergeError, MergeError};
pub use main::VideoMerger;
pub use merger::{FastMerger, SlowMerger};
pub use orchestrator::{MergeMethod, MergeOrchestrator, MergeRequest, MergeResult};
pub use scheduler::{MergeScheduler, MergeTask, TaskStatus};
