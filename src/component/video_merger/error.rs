use thiserror::Error;

/// 外部 ffmpeg 呼叫的失敗分類
///
/// 串流不相容與其他失敗分開，讓協調器能決定要回退還是直接失敗
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("無法啟動 ffmpeg: {0}")]
    Spawn(std::io::Error),

    #[error("合併已取消")]
    Cancelled,

    #[error("串流不相容: {0}")]
    IncompatibleStreams(String),

    #[error("ffmpeg 執行失敗: {0}")]
    Failed(String),
}

/// 串流複製合併失敗：協調器會記錄後回退到重新編碼路徑，不會對外回報
#[derive(Debug, Error)]
pub enum FastMergeError {
    #[error("合併已取消")]
    Cancelled,

    #[error("串流複製合併失敗: {0}")]
    Engine(EngineError),
}

impl From<EngineError> for FastMergeError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::Cancelled => Self::Cancelled,
            other => Self::Engine(other),
        }
    }
}

/// 重新編碼合併失敗：沒有第三種策略，整個請求視為失敗
#[derive(Debug, Error)]
pub enum FatalMergeError {
    #[error("合併已取消")]
    Cancelled,

    #[error("重新編碼合併失敗: {0}")]
    Engine(EngineError),
}

impl From<EngineError> for FatalMergeError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::Cancelled => Self::Cancelled,
            other => Self::Engine(other),
        }
    }
}

/// 呼叫端看到的請求結果錯誤
#[derive(Debug, Error)]
pub enum MergeError {
    #[error("合併請求沒有任何輸入檔案")]
    EmptyRequest,

    #[error("合併已取消")]
    Cancelled,

    #[error(transparent)]
    Fatal(FatalMergeError),
}

impl From<FatalMergeError> for MergeError {
    fn from(err: FatalMergeError) -> Self {
        match err {
            FatalMergeError::Cancelled => Self::Cancelled,
            other => Self::Fatal(other),
        }
    }
}
