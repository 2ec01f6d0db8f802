pub mod ledger;
pub mod product;
pub mod user;

// Re-export only the types we actually use
pub use ledger::{Receipt, Sale, SaleDisplay, SaleWithProduct};
pub use product::{Product, ProductDisplay, ProductInput};
pub use user::User;
