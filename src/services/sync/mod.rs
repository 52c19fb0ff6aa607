pub mod operation_lock;
pub mod orchestrator;

pub use operation_lock::OperationLock;
pub use orchestrator::SyncService;
