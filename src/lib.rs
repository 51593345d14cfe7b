//! svcpanel - remote control panel for systemd services
//!
//! An authenticated HTTP API that lists, starts, stops, restarts and
//! reports the status of OS services.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────┐
//! │                HTTP API (axum)                   │
//! ├─────────────────────────────────────────────────┤
//! │  Session Store  │        Panel dispatcher        │
//! ├─────────────────────────────────────────────────┤
//! │ Service Registry │ Refresher │ Status Prober     │
//! ├─────────────────────────────────────────────────┤
//! │                  systemctl                       │
//! └─────────────────────────────────────────────────┘
//! ```
//!
//! The registry is a cached catalog: the refresher replaces it every
//! minute, probes replace single entries. Names that are not in the
//! catalog are rejected before any command runs.

pub mod api;
pub mod manager;
pub mod panel;
pub mod protocol;
pub mod session;
pub mod units;
pub mod users;

pub use manager::{RegistryRefresher, ServiceRegistry, StatusProber, Systemctl};
pub use panel::{Panel, PanelError};
pub use units::{ActiveState, ServiceEntry};
