//! SeqFlow resource reconciliation
//!
//! Declarative management of Seq API keys: compare the keys declared in
//! `seq.kdl` with recorded state, plan the difference and apply it through
//! the Seq HTTP API.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────┐
//! │                  SeqFlow CLI                     │
//! │       (seqflow plan / apply / refresh)           │
//! └─────────────────┬───────────────────────────────┘
//!                   │
//! ┌─────────────────▼───────────────────────────────┐
//! │                seqflow-cloud                     │
//! │  ┌──────────────┐  ┌──────────────┐             │
//! │  │ Plan/Engine  │  │  State Mgmt  │             │
//! │  └──────┬───────┘  └──────────────┘             │
//! │  ┌──────▼───────┐  ┌──────────────┐             │
//! │  │ApiKeyResource│  │    Health    │             │
//! │  └──────┬───────┘  └──────┬───────┘             │
//! └─────────┼─────────────────┼─────────────────────┘
//!           │                 │
//! ┌─────────▼─────────────────▼─────────────────────┐
//! │           seqflow-client (SeqClient)             │
//! └─────────────────────────────────────────────────┘
//! ```

pub mod action;
pub mod apikey;
pub mod engine;
pub mod error;
pub mod health;
pub mod state;

// Re-exports
pub use action::{Action, ActionResult, ActionType, ApplyResult, Plan, PlanSummary};
pub use apikey::{ApiKeyRequest, ApiKeyResource, ApiKeyResponse, ApiKeyState};
pub use engine::{Engine, RefreshReport};
pub use error::{CloudError, Result};
pub use health::HealthDataSource;
pub use state::{GlobalState, StateLock, StateManager};
