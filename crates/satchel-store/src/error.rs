/// Errors that can occur in the store layer.
///
/// The in-memory store never fails. This type exists for stores that sit
/// on a disk or across a network, so that their failures can travel up
/// through the backend and middleware with `?`.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The backing store could not be reached or refused the operation.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}
