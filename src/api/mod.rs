//! HTTP API
//!
//! Serves the same trend reports the CLI prints, as JSON.

pub mod routes;

use axum::{http::StatusCode, response::IntoResponse};

use crate::TrendsError;

pub use routes::{router, ApiState};

/// Bind and serve until the process is stopped
pub async fn serve(bind: &str, state: ApiState) -> crate::Result<()> {
    let listener = tokio::net::TcpListener::bind(bind).await?;
    log::info!("Listening on {}", bind);
    axum::serve(listener, router(state)).await?;
    Ok(())
}

impl IntoResponse for TrendsError {
    fn into_response(self) -> axum::response::Response {
        let status = match &self {
            TrendsError::EmptyInput { .. }
            | TrendsError::NoValidGames { .. }
            | TrendsError::UnknownTeam(_) => StatusCode::NOT_FOUND,
            TrendsError::Config(_) | TrendsError::Parse(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            log::error!("Request failed: {}", self);
        }
        (status, self.to_string()).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TeamCode;

    #[test]
    fn test_error_status_codes() {
        let not_found = TrendsError::UnknownTeam(TeamCode::new("XYZ")).into_response();
        assert_eq!(not_found.status(), StatusCode::NOT_FOUND);

        let bad = TrendsError::Config("bad sport".to_string()).into_response();
        assert_eq!(bad.status(), StatusCode::BAD_REQUEST);

        let unparsed = TrendsError::Parse("Unknown sport: curling".to_string()).into_response();
        assert_eq!(unparsed.status(), StatusCode::BAD_REQUEST);

        let broken = TrendsError::Task("lock poisoned".to_string()).into_response();
        assert_eq!(broken.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
