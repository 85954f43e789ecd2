pub mod config;
pub mod error;
pub mod monitor;
pub mod replay;
pub mod source;

pub use config::{Config, resolve_workspace_path};
pub use error::{Error, Result};
pub use monitor::{Monitor, RunReport, ShutdownHandle};
pub use source::{CaptureSource, LineSource, SightingSource};
