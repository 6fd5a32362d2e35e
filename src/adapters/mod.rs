// Adapters layer: concrete implementations for external systems (upstream http, storage).

pub mod http;
pub mod storage;
