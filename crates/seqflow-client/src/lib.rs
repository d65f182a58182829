//! Seq HTTP API client for SeqFlow
//!
//! A minimal JSON client for the Seq server API. It knows nothing about the
//! resources built on top of it: callers pass a method, a path and an
//! optional body, and get back either decoded data, "no data" (blank 2xx
//! body) or a [`ClientError`].
//!
//! # Example
//!
//! ```ignore
//! use seqflow_client::SeqClient;
//! use seqflow_config::ProviderConfig;
//!
//! let settings = ProviderConfig::default().resolve()?;
//! let client = SeqClient::connect(&settings).await?;
//!
//! let health = client.health().await?;
//! println!("{:?}", health.status);
//! ```

pub mod client;
pub mod error;

pub use client::{API_KEY_HEADER, HealthStatus, SeqClient};
pub use error::{ClientError, Result};
