use crate::domain::ports::{Toast, ToastSink, ToastVariant};
use std::sync::Mutex;

/// Writes toasts to the log; destructive ones at warn level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingToastSink;

impl ToastSink for TracingToastSink {
    fn show(&self, toast: Toast) {
        match toast.variant {
            ToastVariant::Default => tracing::info!("🔔 {}: {}", toast.title, toast.description),
            ToastVariant::Destructive => tracing::warn!("⚠️ {}: {}", toast.title, toast.description),
        }
    }
}

/// Keeps every toast in memory.
#[derive(Debug, Default)]
pub struct RecordingToastSink {
    toasts: Mutex<Vec<Toast>>,
}

impl RecordingToastSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn toasts(&self) -> Vec<Toast> {
        self.toasts.lock().map(|t| t.clone()).unwrap_or_default()
    }
}

impl ToastSink for RecordingToastSink {
    fn show(&self, toast: Toast) {
        if let Ok(mut toasts) = self.toasts.lock() {
            toasts.push(toast);
        }
    }
}
