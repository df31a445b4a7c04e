// Adapters layer: concrete implementations of the domain ports.

pub mod storage;
pub mod toast;
pub mod ws;

pub use storage::{LocalStorage, MemoryStore};
pub use toast::{RecordingToastSink, TracingToastSink};
pub use ws::WsConnector;
