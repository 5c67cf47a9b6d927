use std::collections::TryReserveError;

/// Error types for the heap.
#[derive(thiserror::Error, Debug)]
pub enum HeapError {
    #[error("Heap capacity must be greater than zero")]
    ZeroCapacity,

    #[error("Failed to reserve storage for {capacity} heap nodes")]
    Allocation {
        capacity: usize,
        #[source]
        source: TryReserveError,
    },

    #[error("Heap is full (capacity {capacity})")]
    CapacityExceeded { capacity: usize },

    #[error("Heap is empty")]
    Empty,
}

/// Result type for the heap.
pub type Result<T> = std::result::Result<T, HeapError>;
