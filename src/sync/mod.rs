pub mod coordinator;
pub mod debounce;
pub mod drive;
pub mod reconcile;
pub mod types;

pub use coordinator::SyncCoordinator;
pub use debounce::Debouncer;
pub use drive::DriveStore;
pub use reconcile::{reconcile, Reconciled};
pub use types::{RemoteStore, SyncOutcome};
