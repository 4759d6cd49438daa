//! Data types shared by the cache, aggregation and filter layers.

mod event;
mod goal;
mod rollup;
mod row;
mod scope;
mod sheet;
mod value;

pub use event::*;
pub use goal::*;
pub use rollup::*;
pub use row::*;
pub use scope::*;
pub use sheet::*;
pub use value::*;
