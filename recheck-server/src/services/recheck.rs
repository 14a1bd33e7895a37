use actix_web::{
    HttpResponse, ResponseError,
    error::{InternalError, JsonPayloadError},
    http::StatusCode,
    web,
};
use recheck_logic::{ErrorKind, RecheckError, RecheckOrchestrator, RecheckRequest};
use serde::{Deserialize, Serialize};

pub const OBSERVATION_REQUEST_SENT: &str = "observation request sent";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecheckBody {
    pub chain_id: String,
    #[serde(default, rename = "txHashs")]
    pub tx_hashes: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: &'static str,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
#[error(transparent)]
pub struct ApiError(#[from] RecheckError);

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self.0.kind() {
            ErrorKind::InvalidRequest | ErrorKind::AlreadyFinalized => StatusCode::BAD_REQUEST,
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::Upstream => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorResponse::new(self.0.to_string()))
    }
}

pub fn json_config(max_body_size: usize) -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(max_body_size)
        .error_handler(|err: JsonPayloadError, _request| {
            tracing::debug!(error = %err, "rejected recheck request body");
            InternalError::from_response(
                err,
                HttpResponse::BadRequest().json(ErrorResponse::new("Invalid request body")),
            )
            .into()
        })
}

pub async fn recheck(
    orchestrator: web::Data<RecheckOrchestrator>,
    body: web::Json<RecheckBody>,
) -> Result<HttpResponse, ApiError> {
    let body = body.into_inner();
    tracing::info!(
        chain = %body.chain_id,
        references = body.tx_hashes.len(),
        "received recheck request"
    );
    orchestrator
        .recheck(RecheckRequest {
            chain: body.chain_id,
            references: body.tx_hashes,
        })
        .await?;
    Ok(HttpResponse::Accepted().json(StatusResponse {
        status: OBSERVATION_REQUEST_SENT,
    }))
}

pub async fn method_not_allowed() -> HttpResponse {
    HttpResponse::MethodNotAllowed().json(ErrorResponse::new("Method not allowed"))
}
