pub mod config;
pub mod gif;
pub mod invoker;
pub mod metrics;
pub mod segmenter;
pub mod session;
pub mod testing;
pub mod workspace;

pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError, ServerConfig,
};
pub use gif::{FailedPreview, GifConfig, GifEncoder, GifError, GifReport, ProducedGif};
pub use invoker::{FfmpegInvoker, InvocationOutput, Invoker, InvokerConfig, InvokerError};
pub use segmenter::{Clip, SegmentError, Segmenter, SegmenterConfig};
pub use session::{
    ReaperConfig, SessionReaper, SessionRecord, SessionRunner, SessionStatus, StatusTracker,
};
pub use workspace::{sanitize_file_name, SessionWorkspace, WorkspaceError};
