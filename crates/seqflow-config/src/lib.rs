//! SeqFlow configuration
//!
//! Two concerns live here:
//!
//! - [`ProviderConfig`] / [`ProviderSettings`]: how to reach the Seq server.
//!   Explicitly configured values win over `SEQ_*` environment variables.
//! - [`find_flow_file`]: where the desired-state file (`seq.kdl`) lives.

pub mod discovery;
pub mod error;
pub mod settings;

pub use discovery::{ENV_CONFIG_PATH, find_flow_file, find_flow_file_from};
pub use error::*;
pub use settings::{
    DEFAULT_TIMEOUT_SECONDS, ENV_API_KEY, ENV_INSECURE_SKIP_VERIFY, ENV_SERVER_URL,
    ENV_TIMEOUT_SECONDS, ProviderConfig, ProviderSettings,
};
