mod cpu_monitor;
mod ffmpeg_command;
mod media_probe;
mod path_validator;
mod video_scanner;

pub use cpu_monitor::CpuMonitor;
pub use ffmpeg_command::{ConcatCommand, ConcatInvocation, ConcatMode};
pub use media_probe::{MediaDescriptor, ProbeError, probe};
pub use path_validator::validate_directory_exists;
pub use video_scanner::{MERGED_SUFFIX, VideoFileInfo, scan_video_files};
