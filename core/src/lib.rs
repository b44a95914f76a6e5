pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod events;
pub mod interpreter;
pub mod logging;
pub mod skeletons;

// Re-export main types
pub use config::Config;
pub use engine::Engine;
pub use error::{ConfigurationError, MuscleError, SkeletonError, SkeletonResult};
pub use events::{Listener, ListenerId, ListenerRegistry};
pub use interpreter::types::{Condition, Execute, Merge, Split, Val};
pub use skeletons::{Program, Skeleton};
