mod dimensions;
mod health;
mod ideas;

pub use dimensions::*;
pub use health::*;
pub use ideas::*;
