//! Upload queue engine: device transport, pollers and the reducer loop.
mod api;
mod engine;
mod poller;
mod types;

pub use api::{ApiSettings, DeviceApi, ReqwestDeviceApi};
pub use engine::{EngineConfig, EngineHandle, DEFAULT_OFFLINE_INTERVAL, DEFAULT_ONLINE_INTERVAL};
pub use types::{ApiError, FailureKind};
