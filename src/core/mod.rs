pub mod bootstrap;
pub mod lookup;
pub mod sync;

pub use crate::domain::model::{ApiClient, PropertyAddress, PropertyRecord, SewageType};
pub use crate::domain::ports::{ClientStore, PropertyStore, RemoteFetch, Repository};
pub use lookup::LookupService;
