pub mod clock;
pub mod seed;
pub mod telemetry;

pub use clock::*;
pub use seed::*;
pub use telemetry::*;
