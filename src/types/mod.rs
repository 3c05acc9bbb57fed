pub mod record;
pub mod row;
pub mod stats;

pub use record::*;
pub use row::*;
pub use stats::*;
