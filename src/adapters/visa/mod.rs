//! Visa resolver adapters.

mod mock_resolver;
mod table;
mod table_resolver;

pub use mock_resolver::MockVisaResolver;
pub use table::{MaxStay, VisaRule, VisaTable, VisaTableError};
pub use table_resolver::{EstimationSettings, TableVisaResolver};
