//! # spacewatch-dashboard
//!
//! Read-only web view of the spacewatch alert record, built on axum.
//!
//! The dashboard never writes: it reads the record through a
//! [`spacewatch_store::StateStore`] on every request.
//!
//! ## Endpoints
//!
//! | Endpoint | Method | Description |
//! |----------|--------|-------------|
//! | `/` | GET | HTML status page (risk, Kp, flare class, CME speed, time) |
//! | `/data` | GET | The raw record as JSON; 404 before the first cycle |
//! | `/health` | GET | Liveness and uptime |

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod server;
pub mod state;
pub mod view;

pub use config::DashboardConfig;
pub use error::{DashboardError, DashboardResult};
pub use server::DashboardServer;
pub use state::DashboardState;
pub use view::{render_page, StatusView};
