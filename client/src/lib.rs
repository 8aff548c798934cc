//! Client side of the sensor backend: a request hook that tracks the
//! loading/success/failure state of one endpoint, plus the typed API
//! client it runs on.

pub mod api_client;
pub mod hooks;
pub mod request;
pub mod settings;
pub mod state;
pub mod telemetry;
pub mod view;

pub use api_client::{APIClient, ClientError};
pub use hooks::{Invoker, RequestHook};
pub use request::{RequestConfig, RequestKey};
pub use state::ResultSnapshot;
