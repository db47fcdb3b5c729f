//! Record classification and result filtering

pub mod address;
pub mod category;
pub mod filter;

pub use address::classify_address;
pub use category::category_label;
pub use filter::{FilterCriteria, extract_locality, filter_results, record_locality};
