//! Client-side session lifecycle and role-gated routing for StreamPay.
//!
//! This crate owns everything the front ends share about authentication:
//! the [`SessionStore`] (token + user state, two persistence tiers, login,
//! logout, de-duplicated and throttled refresh, scheduled background refresh
//! with bounded retry) and the route guard that turns session state into a
//! render / loading / redirect decision.
//!
//! SYSTEM CONTEXT
//! ==============
//! The store is runtime-agnostic. Browser and native hosts plug in through
//! four seams: [`AuthApi`] (HTTP transport), [`KeyValueStore`] (one
//! persistence tier), [`Navigator`] (redirect sink) and [`Platform`] (clock,
//! sleep, local task spawning). `client` wires these to `gloo-net`,
//! `web-sys` storage and `gloo-timers`; `cli` wires them to `reqwest`, a JSON
//! file and `tokio`.
//!
//! DESIGN
//! ======
//! Everything runs on a single cooperative thread: state lives in
//! `Rc<RefCell<_>>` and futures are `?Send`. Ordering between concurrent
//! refresh triggers is controlled by one shared in-flight future rather than
//! a polled flag.

pub mod api;
pub mod config;
pub mod error;
pub mod guard;
pub mod platform;
pub mod storage;
pub mod store;
pub mod timer;
pub mod user;

pub use api::{ApiResponse, AuthApi, ResetTokenStatus};
pub use config::{ConfigError, SessionConfig};
pub use error::{SessionError, TransportError};
pub use guard::{AuthQueries, GuardDecision, Route, SessionAvailability, decide};
pub use platform::{Navigator, Platform};
pub use storage::{KeyValueStore, MemoryStore, SessionPersistence, StorageError, StorageTier};
pub use store::{SessionSnapshot, SessionStore};
pub use timer::{RefreshTimer, TimerAction, TimerEvent, TimerState};
pub use user::{Role, User};
