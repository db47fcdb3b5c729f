pub mod business;
pub mod query;
pub mod result_set;

pub use business::{AddressType, BusinessDraft, BusinessRecord, Coordinates, ProviderKind};
pub use query::{SearchArea, SearchQuery};
pub use result_set::{ProviderWarning, ResultSet};
