use crate::BatchRequest;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Hand a validated batch to the collection engine.
    SubmitBatch { request: BatchRequest },
    /// Ask the running batch to stop cooperatively.
    CancelBatch,
}
