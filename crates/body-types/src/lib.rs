pub mod constraint;
pub mod names;
pub mod parameter;
pub mod request;
pub mod units;

pub use constraint::*;
pub use parameter::*;
pub use request::*;
pub use units::*;
