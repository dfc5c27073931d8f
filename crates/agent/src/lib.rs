//! Agent-side scheduler: prioritized job queue, surface scanner, structure
//! discovery and the uploader that streams scanned chunks to the tile
//! server.

pub mod config;
pub mod consts;
pub mod palette;
pub mod processor;
pub mod queue;
pub mod runtime;
pub mod scanner;
pub mod structures;
pub mod upload;

pub use config::{AgentConfig, ConfigError, LogLevel};
pub use processor::{JobProcessor, ProcessError, TickOutcome};
pub use queue::{EnqueueOpts, Job, JobKind, JobQueue, Priority, QueueStats};
pub use runtime::{BlockInfo, LoadAreaHandle, WorldRect, WorldRuntime};
#[cfg(any(test, feature = "test-util"))]
pub use runtime::fake;
pub use structures::DiscoveredStructure;
pub use upload::{UploadError, Uploader};
