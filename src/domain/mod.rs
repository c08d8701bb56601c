pub mod user;
pub mod catalog;
pub mod money;
pub mod cart;
pub mod order;
pub mod review;

pub use user::*;
pub use catalog::*;
pub use money::*;
pub use cart::*;
pub use order::*;
pub use review::*;
