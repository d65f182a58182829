//! SeqFlow core
//!
//! Desired-state model for Seq resources and the KDL parser that produces it.
//!
//! ```kdl
//! project "observability"
//!
//! provider {
//!     server-url "https://seq.example.com"
//!     timeout-seconds 30
//! }
//!
//! api-key "ingest" {
//!     title "ingest"
//!     permissions "Ingest"
//! }
//! ```

pub mod error;
pub mod model;
pub mod parser;

pub use error::{CoreError, Result};
pub use model::{ApiKeyConfig, Flow};
pub use parser::{parse_kdl_file, parse_kdl_string};
