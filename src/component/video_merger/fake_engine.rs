//! 測試用的假引擎：不碰 ffmpeg，照腳本回應，並記錄被呼叫的順序與參數

use super::engine::MediaEngine;
use super::error::EngineError;
use crate::tools::{MediaDescriptor, ProbeError};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

#[derive(Debug, Clone, PartialEq)]
pub enum EngineCall {
    StreamCopy {
        inputs: Vec<PathBuf>,
        output: PathBuf,
    },
    Reencode {
        inputs: Vec<PathBuf>,
        output: PathBuf,
        width: u32,
        height: u32,
        preset: String,
    },
}

#[derive(Default)]
pub struct FakeEngine {
    descriptors: HashMap<PathBuf, MediaDescriptor>,
    probe_failures: HashSet<PathBuf>,
    fail_fast: bool,
    cancel_fast: bool,
    fail_slow: bool,
    calls: Mutex<Vec<EngineCall>>,
}

impl FakeEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_clip(
        mut self,
        path: &str,
        codec: &str,
        width: u32,
        height: u32,
        fps_num: u32,
        fps_den: u32,
    ) -> Self {
        let path = PathBuf::from(path);
        self.descriptors.insert(
            path.clone(),
            MediaDescriptor {
                path,
                codec_id: codec.to_string(),
                width,
                height,
                fps_num,
                fps_den,
                duration_seconds: Some(1.0),
            },
        );
        self
    }

    pub fn with_probe_failure(mut self, path: &str) -> Self {
        self.probe_failures.insert(PathBuf::from(path));
        self
    }

    pub fn with_fast_failure(mut self) -> Self {
        self.fail_fast = true;
        self
    }

    pub fn with_fast_cancelled(mut self) -> Self {
        self.cancel_fast = true;
        self
    }

    pub fn with_slow_failure(mut self) -> Self {
        self.fail_slow = true;
        self
    }

    pub fn calls(&self) -> Vec<EngineCall> {
        self.calls.lock().unwrap().clone()
    }
}

impl MediaEngine for FakeEngine {
    fn probe(&self, path: &Path) -> Result<MediaDescriptor, ProbeError> {
        if self.probe_failures.contains(path) {
            return Err(ProbeError::NoVideoStream {
                path: path.to_path_buf(),
            });
        }
        self.descriptors
            .get(path)
            .cloned()
            .ok_or_else(|| ProbeError::ToolFailed {
                stderr: format!("unknown test clip: {}", path.display()),
            })
    }

    fn concat_stream_copy(&self, inputs: &[PathBuf], output: &Path) -> Result<(), EngineError> {
        self.calls.lock().unwrap().push(EngineCall::StreamCopy {
            inputs: inputs.to_vec(),
            output: output.to_path_buf(),
        });

        if self.cancel_fast {
            return Err(EngineError::Cancelled);
        }
        if self.fail_fast {
            return Err(EngineError::IncompatibleStreams(
                "stream 1 codec parameters do not match".to_string(),
            ));
        }
        Ok(())
    }

    fn concat_reencode(
        &self,
        inputs: &[PathBuf],
        output: &Path,
        width: u32,
        height: u32,
        preset: &str,
    ) -> Result<(), EngineError> {
        self.calls.lock().unwrap().push(EngineCall::Reencode {
            inputs: inputs.to_vec(),
            output: output.to_path_buf(),
            width,
            height,
            preset: preset.to_string(),
        });

        if self.fail_slow {
            return Err(EngineError::Failed("encoder exploded".to_string()));
        }
        Ok(())
    }
}
