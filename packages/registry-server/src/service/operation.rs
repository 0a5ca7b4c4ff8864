//! Operation types flowing through the tower pipeline.

use std::time::Duration;

use provider_registry_core::{
    MsgCreateProvider, QueryProviderRequest, QueryProviderResponse, QueryProvidersRequest,
    QueryProvidersResponse,
};

use crate::context::QueryContext;
use crate::error::{ErrorCode, RegistryError};

/// Service name constants used in spans and metric labels.
pub mod service_names {
    pub const PROVIDER: &str = "provider";
}

/// Context carried with every operation through the pipeline.
#[derive(Debug, Clone)]
pub struct OperationContext {
    pub call_id: u64,
    pub service_name: &'static str,
    pub call_timeout_ms: u64,
    /// Cancellation handle shared with the handler. Expires after
    /// `call_timeout_ms`; the timeout layer also cancels it.
    pub query: QueryContext,
}

impl OperationContext {
    #[must_use]
    pub fn new(call_id: u64, call_timeout_ms: u64) -> Self {
        Self {
            call_id,
            service_name: service_names::PROVIDER,
            call_timeout_ms,
            query: QueryContext::background()
                .with_timeout(Duration::from_millis(call_timeout_ms)),
        }
    }
}

/// Typed operations dispatched to the provider service.
#[derive(Debug)]
pub enum Operation {
    CreateProvider {
        ctx: OperationContext,
        payload: MsgCreateProvider,
    },
    QueryProvider {
        ctx: OperationContext,
        request: QueryProviderRequest,
    },
    QueryProviders {
        ctx: OperationContext,
        request: QueryProvidersRequest,
    },
}

impl Operation {
    #[must_use]
    pub fn ctx(&self) -> &OperationContext {
        match self {
            Self::CreateProvider { ctx, .. }
            | Self::QueryProvider { ctx, .. }
            | Self::QueryProviders { ctx, .. } => ctx,
        }
    }

    /// Short label for spans and metrics.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::CreateProvider { .. } => "create_provider",
            Self::QueryProvider { .. } => "query_provider",
            Self::QueryProviders { .. } => "query_providers",
        }
    }
}

/// Successful response from the provider service.
#[derive(Debug)]
pub enum OperationResponse {
    Created { call_id: u64 },
    Provider(Box<QueryProviderResponse>),
    Providers(QueryProvidersResponse),
}

/// Errors returned by operation handlers and middleware.
#[derive(Debug, thiserror::Error)]
pub enum OperationError {
    #[error(transparent)]
    Registry(#[from] RegistryError),
    #[error("operation timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },
    #[error("server overloaded, try again later")]
    Overloaded,
    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl OperationError {
    #[must_use]
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Registry(e) => e.code(),
            Self::Timeout { .. } => ErrorCode::DeadlineExceeded,
            Self::Overloaded => ErrorCode::Unavailable,
            Self::Internal(_) => ErrorCode::Internal,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::provider;

    #[test]
    fn ctx_is_reachable_for_every_variant() {
        let ops = [
            Operation::CreateProvider {
                ctx: OperationContext::new(1, 100),
                payload: MsgCreateProvider {
                    provider: provider("addr1"),
                },
            },
            Operation::QueryProvider {
                ctx: OperationContext::new(2, 100),
                request: QueryProviderRequest::new("addr1"),
            },
            Operation::QueryProviders {
                ctx: OperationContext::new(3, 100),
                request: QueryProvidersRequest::default(),
            },
        ];
        let ids: Vec<u64> = ops.iter().map(|op| op.ctx().call_id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert_eq!(ops[2].kind(), "query_providers");
        assert_eq!(ops[0].ctx().service_name, service_names::PROVIDER);
    }

    #[test]
    fn call_timeout_becomes_query_deadline() {
        let ctx = OperationContext::new(1, 0);
        let err = ctx.query.check().unwrap_err();
        assert_eq!(err.code(), ErrorCode::DeadlineExceeded);

        assert!(OperationContext::new(2, 60_000).query.check().is_ok());
    }

    #[test]
    fn error_codes_follow_the_cause() {
        let err = OperationError::from(RegistryError::NotFound {
            owner: "addr1".to_string(),
        });
        assert_eq!(err.code(), ErrorCode::NotFound);
        assert_eq!(err.to_string(), "provider not found: addr1");

        assert_eq!(
            OperationError::Timeout { timeout_ms: 5 }.code(),
            ErrorCode::DeadlineExceeded
        );
        assert_eq!(OperationError::Overloaded.code(), ErrorCode::Unavailable);
    }
}
