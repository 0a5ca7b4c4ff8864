//! Provider registry core: provider records, pagination contracts and query message schemas.

pub mod messages;
pub mod pagination;
pub mod types;

pub use messages::{
    MsgCreateProvider, QueryProviderRequest, QueryProviderResponse, QueryProvidersRequest,
    QueryProvidersResponse,
};
pub use pagination::{PageRequest, PageResponse};
pub use types::{Attribute, Owner, Provider, ProviderInfo, ValidationError};
