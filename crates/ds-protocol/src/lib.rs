pub mod dashboard;
pub mod error;
pub mod intent;
pub mod metrics;
pub mod outcome;

pub use dashboard::*;
pub use error::*;
pub use intent::*;
pub use metrics::*;
pub use outcome::*;
