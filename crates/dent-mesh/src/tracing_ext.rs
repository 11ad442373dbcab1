//! Tracing helpers for mesh operations.
//!
//! Operations emit `tracing` events; nothing is printed unless the caller
//! installs a subscriber. Timing events use the `dent_mesh::timing` target so
//! they can be enabled separately, e.g. `RUST_LOG=dent_mesh::timing=info`.
//!
//! Levels: INFO for operation summaries and timing, DEBUG for intermediate
//! counts, WARN for recoverable problems and fallbacks.

use std::time::Instant;
use tracing::{Span, debug, info};

/// Logs the duration of an operation when dropped.
///
/// ```rust,ignore
/// let _timer = OperationTimer::with_context("solidify", mesh.face_count(), mesh.vertex_count());
/// ```
pub struct OperationTimer {
    name: &'static str,
    start: Instant,
    span: Span,
}

impl OperationTimer {
    /// Timer whose span records the operation name and input size.
    pub fn with_context(name: &'static str, face_count: usize, vertex_count: usize) -> Self {
        let span = tracing::info_span!(
            "mesh_operation",
            operation = name,
            faces = face_count,
            vertices = vertex_count
        );
        span.in_scope(|| debug!(target: "dent_mesh::timing", "Starting operation"));
        Self {
            name,
            start: Instant::now(),
            span,
        }
    }

    pub fn elapsed_ms(&self) -> f64 {
        self.start.elapsed().as_secs_f64() * 1000.0
    }
}

impl Drop for OperationTimer {
    fn drop(&mut self) {
        let elapsed_ms = self.elapsed_ms();
        self.span.in_scope(|| {
            info!(
                target: "dent_mesh::timing",
                operation = self.name,
                elapsed_ms = format!("{:.2}", elapsed_ms),
                "Operation completed"
            )
        });
    }
}

/// Log size and extent of a mesh at debug level.
pub fn log_mesh_stats(mesh: &crate::Mesh, context: &str) {
    let Some((min, max)) = mesh.bounds() else {
        debug!(context = context, "Mesh is empty");
        return;
    };
    let dims = max - min;
    debug!(
        context = context,
        vertices = mesh.vertex_count(),
        faces = mesh.face_count(),
        size_x = format!("{:.2}", dims.x),
        size_y = format!("{:.2}", dims.y),
        size_z = format!("{:.2}", dims.z),
        "Mesh statistics"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timer_measures_elapsed() {
        let timer = OperationTimer::with_context("test_op", 0, 0);
        std::thread::sleep(std::time::Duration::from_millis(5));
        assert!(timer.elapsed_ms() >= 5.0);
    }

    #[test]
    fn test_log_stats_handles_empty_mesh() {
        log_mesh_stats(&crate::Mesh::new(), "empty");
    }
}
