//! Errors raised by the containers.

/// Failure of a container operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// The handle does not name a live element of this container.
    #[error("handle #{id} does not refer to a live element")]
    InvalidHandle {
        /// Raw id carried by the rejected handle.
        id: usize,
    },
    /// The operation needs at least one live element.
    #[error("container is empty")]
    EmptyContainer,
}
