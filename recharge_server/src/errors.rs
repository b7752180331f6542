use actix_web::{
    error::ResponseError,
    http::{header::ContentType, StatusCode},
    HttpResponse,
};
use payment_providers::ProviderApiError;
use recharge_engine::{
    helpers::ResolutionError,
    traits::{CatalogApiError, MerchantApiError, OrderApiError, UserApiError},
    OrderFlowError,
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Could not initialize server. {0}")]
    InitializeError(String),
    #[error("An error occurred on the backend of the server. {0}")]
    BackendError(String),
    #[error("Payload deserialization error")]
    CouldNotDeserializePayload,
    #[error("Invalid request. {0}")]
    InvalidRequestBody(String),
    #[error("Could not read request path: {0}")]
    InvalidRequestPath(String),
    #[error("An I/O error happened in the server. {0}")]
    IOError(#[from] std::io::Error),
    #[error("Invalid server configuration. {0}")]
    ConfigurationError(String),
    #[error("UnspecifiedError. {0}")]
    Unspecified(String),
    #[error("Authentication Error. {0}")]
    AuthenticationError(#[from] AuthError),
    #[error("The data was not found. {0}")]
    NoRecordFound(String),
    #[error("Insufficient Permissions. {0}")]
    InsufficientPermissions(String),
    #[error("No merchant can fulfil this order. {0}")]
    NoActiveSeller(String),
    #[error("The order cannot be paid. {0}")]
    OrderNotPayable(String),
    #[error("The payment provider call failed. {0}")]
    PaymentProviderError(String),
}

impl ResponseError for ServerError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::CouldNotDeserializePayload => StatusCode::BAD_REQUEST,
            Self::InvalidRequestBody(_) => StatusCode::BAD_REQUEST,
            Self::InvalidRequestPath(_) => StatusCode::BAD_REQUEST,
            Self::NoActiveSeller(_) => StatusCode::BAD_REQUEST,
            Self::OrderNotPayable(_) => StatusCode::BAD_REQUEST,
            Self::AuthenticationError(e) => match e {
                AuthError::MissingToken => StatusCode::UNAUTHORIZED,
                AuthError::ValidationError(_) => StatusCode::UNAUTHORIZED,
                AuthError::PoorlyFormattedToken(_) => StatusCode::BAD_REQUEST,
                AuthError::InsufficientPermissions(_) => StatusCode::FORBIDDEN,
            },
            Self::NoRecordFound(_) => StatusCode::NOT_FOUND,
            Self::InsufficientPermissions(_) => StatusCode::FORBIDDEN,
            Self::PaymentProviderError(_) => StatusCode::BAD_GATEWAY,
            Self::InitializeError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::BackendError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::IOError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::ConfigurationError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Unspecified(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code())
            .insert_header(ContentType::json())
            .body(serde_json::json!({ "error": self.to_string() }).to_string())
    }
}

#[derive(Debug, Clone, Error)]
pub enum AuthError {
    #[error("Authentication required.")]
    MissingToken,
    #[error("Access token is invalid. {0}")]
    ValidationError(String),
    #[error("Access token is not in the correct format. {0}")]
    PoorlyFormattedToken(String),
    #[error("Insufficient Permissions. {0}")]
    InsufficientPermissions(String),
}

impl From<CatalogApiError> for ServerError {
    fn from(e: CatalogApiError) -> Self {
        match e {
            CatalogApiError::DatabaseError(e) => Self::BackendError(format!("Database error: {e}")),
        }
    }
}

impl From<OrderApiError> for ServerError {
    fn from(e: OrderApiError) -> Self {
        match e {
            OrderApiError::DatabaseError(e) => Self::BackendError(format!("Database error: {e}")),
            OrderApiError::SkuNotFound(_) | OrderApiError::OrderNotFound(_) => Self::NoRecordFound(e.to_string()),
            OrderApiError::Unresolvable(ResolutionError::NoActiveMerchant) => Self::NoActiveSeller(e.to_string()),
            OrderApiError::Unresolvable(_) => Self::InsufficientPermissions(e.to_string()),
        }
    }
}

impl From<OrderFlowError> for ServerError {
    fn from(e: OrderFlowError) -> Self {
        match e {
            OrderFlowError::OrderError(e) => e.into(),
            // Foreign orders must be indistinguishable from missing ones.
            OrderFlowError::NotOrderOwner => Self::NoRecordFound("Order not found for this user".to_string()),
            OrderFlowError::OrderNotPending => Self::OrderNotPayable(e.to_string()),
        }
    }
}

impl From<MerchantApiError> for ServerError {
    fn from(e: MerchantApiError) -> Self {
        match e {
            MerchantApiError::DatabaseError(e) => Self::BackendError(format!("Database error: {e}")),
            MerchantApiError::MerchantNotFound(_) |
            MerchantApiError::GameNotFound(_) |
            MerchantApiError::SkuNotFound(_) |
            MerchantApiError::ApplicationNotFound(_) => Self::NoRecordFound(e.to_string()),
            MerchantApiError::AlreadyMerchant |
            MerchantApiError::DuplicateApplication |
            MerchantApiError::ApplicationNotPending => Self::InvalidRequestBody(e.to_string()),
        }
    }
}

impl From<UserApiError> for ServerError {
    fn from(e: UserApiError) -> Self {
        match e {
            UserApiError::DatabaseError(e) => Self::BackendError(format!("Database error: {e}")),
            UserApiError::UserNotFound(_) => Self::NoRecordFound(e.to_string()),
        }
    }
}

impl From<ProviderApiError> for ServerError {
    fn from(e: ProviderApiError) -> Self {
        Self::PaymentProviderError(e.to_string())
    }
}
