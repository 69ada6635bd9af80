use actix_web::{
    error::ResponseError,
    http::{header::ContentType, StatusCode},
    HttpResponse,
};
use stock_reservation_engine::{OrderQueryError, ReservationError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Could not initialize server. {0}")]
    InitializeError(String),
    #[error("An error occurred on the backend of the server. {0}")]
    BackendError(String),
    #[error("Could not read request body: {0}")]
    InvalidRequestBody(String),
    #[error("Could not read request path: {0}")]
    InvalidRequestPath(String),
    #[error("An I/O error happened in the server. {0}")]
    IOError(#[from] std::io::Error),
    #[error("Invalid server configuration. {0}")]
    ConfigurationError(String),
    #[error("{0}")]
    InsufficientStock(String),
    #[error("The data was not found. {0}")]
    NoRecordFound(String),
    #[error("{0}")]
    OrderAlreadyFinalized(String),
}

impl ResponseError for ServerError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequestBody(_) => StatusCode::BAD_REQUEST,
            Self::InvalidRequestPath(_) => StatusCode::BAD_REQUEST,
            Self::InsufficientStock(_) => StatusCode::BAD_REQUEST,
            Self::NoRecordFound(_) => StatusCode::NOT_FOUND,
            Self::OrderAlreadyFinalized(_) => StatusCode::CONFLICT,
            Self::InitializeError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::BackendError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::IOError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::ConfigurationError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code())
            .insert_header(ContentType::json())
            .body(serde_json::json!({ "error": self.to_string() }).to_string())
    }
}

impl From<ReservationError> for ServerError {
    fn from(e: ReservationError) -> Self {
        match &e {
            ReservationError::InsufficientStock { .. } => Self::InsufficientStock(e.to_string()),
            ReservationError::UnknownProductSize { .. } => Self::InvalidRequestBody(e.to_string()),
            ReservationError::ValidationError(_) => Self::InvalidRequestBody(e.to_string()),
            ReservationError::OrderNotFound(_) => Self::NoRecordFound(e.to_string()),
            ReservationError::OrderAlreadyFinalized(_, _) => Self::OrderAlreadyFinalized(e.to_string()),
            ReservationError::DatabaseError(_) |
            ReservationError::StockRestoreFailed { .. } |
            ReservationError::QueryError(_) => Self::BackendError(e.to_string()),
        }
    }
}

impl From<OrderQueryError> for ServerError {
    fn from(e: OrderQueryError) -> Self {
        Self::BackendError(e.to_string())
    }
}
