pub mod catalog;
pub mod query;
pub mod stock;

pub use catalog::{CatalogStore, ProductFilter, ProductOrder};
pub use query::{Dashboard, LowStockProduct, ProductSummary, QueryService, SalesTotals};
pub use stock::{ReceiveStock, StockEngine};
