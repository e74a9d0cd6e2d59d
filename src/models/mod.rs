mod cart;
mod import;
mod order;
mod product;

pub use cart::*;
pub use import::*;
pub use order::*;
pub use product::*;
