//! calc-trigger — HTTP trigger for the calcgrid function.
//!
//! Splits into a host-agnostic core and a minimal host:
//!
//! ```text
//! HTTP client
//!   │
//!   ▼
//! hyper server (HttpTrigger)
//!   │
//!   ├── Convert hyper::Request → Invocation
//!   ├── RequestHandler::handle()
//!   │     method check → decode → calculate → encode
//!   ├── Convert InvocationResponse → hyper::Response
//!   │
//!   ▼
//! HTTP response
//! ```
//!
//! [`RequestHandler`] never touches sockets; any host able to hand it a
//! method, headers and a body can drive it.

pub mod convert;
pub mod error;
pub mod handler;
pub mod invocation;

pub use error::{InvocationError, TriggerError};
pub use handler::HttpTrigger;
pub use invocation::{Invocation, InvocationResponse, RequestHandler};
