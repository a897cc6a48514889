mod error;
mod group;
mod result;
mod target;
mod value;

pub use error::*;
pub use group::*;
pub use result::*;
pub use target::*;
pub use value::*;
