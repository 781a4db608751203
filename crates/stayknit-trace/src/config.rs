//! Tracer Configuration

/// Tracer configuration options
#[derive(Debug, Clone)]
pub struct TraceConfig {
    /// Panic on invariant violations instead of logging and repairing them
    pub strict: bool,

    /// Sweep released nodes out of the tables every N mutations (0 = only on demand)
    pub sweep_interval: usize,
}

impl Default for TraceConfig {
    fn default() -> Self {
        Self {
            strict: cfg!(debug_assertions),
            sweep_interval: 256,
        }
    }
}

impl TraceConfig {
    /// Log and repair violations, never panic
    pub fn lenient() -> Self {
        Self { strict: false, ..Self::default() }
    }
}
