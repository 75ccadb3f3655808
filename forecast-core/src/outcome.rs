//! Single-shot outcome envelope
//!
//! Service and repository layers hand results upward as an [`Outcome`]
//! instead of raising errors across layer boundaries. An outcome is exactly one
//! of a value, an empty success, or a failure carrying an application message.
//!
//! Faults raised by a lower layer are folded into the envelope by
//! [`Outcome::capture`] and friends, which await the wrapped future and turn an
//! `Err` (or a panic) into [`Outcome::Failure`].
//!
//! ## Example
//!
//! ```rust,ignore
//! use forecast_core::outcome::Outcome;
//!
//! async fn load(id: i64) -> anyhow::Result<Option<Forecast>> { /* ... */ }
//!
//! let outcome = Outcome::capture_value(load(7), "Failed to load forecast.")
//!     .await
//!     .and_then_option();
//!
//! if outcome.failed() {
//!     tracing::error!("{}", outcome.error_message().unwrap_or_default());
//! }
//! ```

use std::fmt::Display;
use std::future::Future;
use std::panic::AssertUnwindSafe;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use futures::FutureExt;
use serde::Serialize;

/// Outcome of a single operation
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub enum Outcome<T> {
    /// The operation produced a value
    Success(T),
    /// The operation succeeded but found nothing
    SuccessNull,
    /// The operation failed; carries the application error message
    Failure(String),
}

impl<T> Outcome<T> {
    /// Wrap a value
    pub fn success(value: T) -> Self {
        Self::Success(value)
    }

    /// Empty success
    pub fn success_null() -> Self {
        Self::SuccessNull
    }

    /// Failure with an application error message
    pub fn failure(message: impl Into<String>) -> Self {
        Self::Failure(message.into())
    }

    /// `None` becomes [`Outcome::SuccessNull`]
    pub fn from_option(value: Option<T>) -> Self {
        match value {
            Some(value) => Self::Success(value),
            None => Self::SuccessNull,
        }
    }

    /// Re-type a failed or null outcome, discarding any value
    ///
    /// Used when forwarding a lower layer's failure under a different result type.
    pub fn cast<U>(&self) -> Outcome<U> {
        match self {
            Self::Success(_) | Self::SuccessNull => Outcome::SuccessNull,
            Self::Failure(message) => Outcome::Failure(message.clone()),
        }
    }

    /// True when the operation failed
    pub fn failed(&self) -> bool {
        matches!(self, Self::Failure(_))
    }

    /// True when the operation succeeded without a value
    pub fn is_null(&self) -> bool {
        matches!(self, Self::SuccessNull)
    }

    /// The value, only present on [`Outcome::Success`]
    pub fn result_data(&self) -> Option<&T> {
        match self {
            Self::Success(value) => Some(value),
            _ => None,
        }
    }

    /// Consume the envelope, yielding the value if there is one
    pub fn into_result_data(self) -> Option<T> {
        match self {
            Self::Success(value) => Some(value),
            _ => None,
        }
    }

    /// The application error message, only present on [`Outcome::Failure`]
    pub fn error_message(&self) -> Option<&str> {
        match self {
            Self::Failure(message) => Some(message),
            _ => None,
        }
    }

    /// Transform the value, leaving null and failure untouched
    pub fn map<U, F>(self, f: F) -> Outcome<U>
    where
        F: FnOnce(T) -> U,
    {
        match self {
            Self::Success(value) => Outcome::Success(f(value)),
            Self::SuccessNull => Outcome::SuccessNull,
            Self::Failure(message) => Outcome::Failure(message),
        }
    }

    /// Await a future that yields an outcome, folding faults into a failure
    ///
    /// On `Ok` the inner envelope is forwarded as-is, so nothing is wrapped twice.
    /// An `Err` or a panic becomes `Failure("<fault> - <application_error_message>")`.
    pub async fn capture<F, E>(future: F, application_error_message: &str) -> Self
    where
        F: Future<Output = Result<Outcome<T>, E>>,
        E: Display,
    {
        match AssertUnwindSafe(future).catch_unwind().await {
            Ok(Ok(outcome)) => outcome,
            Ok(Err(err)) => Self::Failure(fault_message(&err, application_error_message)),
            Err(panic) => Self::Failure(fault_message(
                &panic_message(panic.as_ref()),
                application_error_message,
            )),
        }
    }

    /// Await a future that yields a bare value, folding faults into a failure
    pub async fn capture_value<F, E>(future: F, application_error_message: &str) -> Self
    where
        F: Future<Output = Result<T, E>>,
        E: Display,
    {
        Self::capture(future.map(|result| result.map(Outcome::Success)), application_error_message)
            .await
    }
}

impl<T> Outcome<Option<T>> {
    /// Flatten an optional value so that `None` reads as [`Outcome::SuccessNull`]
    pub fn and_then_option(self) -> Outcome<T> {
        match self {
            Self::Success(value) => Outcome::from_option(value),
            Self::SuccessNull => Outcome::SuccessNull,
            Self::Failure(message) => Outcome::Failure(message),
        }
    }
}

impl Outcome<()> {
    /// Await a unit future, folding faults into a failure
    pub async fn capture_unit<F, E>(future: F, application_error_message: &str) -> Self
    where
        F: Future<Output = Result<(), E>>,
        E: Display,
    {
        Self::capture_value(future, application_error_message).await
    }
}

fn fault_message(fault: &dyn Display, application_error_message: &str) -> String {
    format!("{fault:#} - {application_error_message}")
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        format!("panic: {message}")
    } else if let Some(message) = payload.downcast_ref::<String>() {
        format!("panic: {message}")
    } else {
        "panic: unknown payload".to_string()
    }
}

// ============================================================================
// HTTP envelope
// ============================================================================

/// Failure details carried by an [`HttpOutcome`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpFailure {
    /// Message surfaced to the caller, if any
    pub application_error_message: Option<String>,
    /// Reason phrase for logs
    pub reason_phrase: String,
    /// Status code returned to the caller
    pub status: StatusCode,
}

/// Outcome mapped onto HTTP semantics
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub enum HttpOutcome<T> {
    /// 200 with a JSON body
    Success(T),
    /// Non-success status with an optional message body
    Failure(HttpFailure),
}

impl<T> HttpOutcome<T> {
    /// Failure with a status, a reason phrase and a message for the caller
    pub fn failure(
        application_error_message: impl Into<String>,
        reason_phrase: impl Into<String>,
        status: StatusCode,
    ) -> Self {
        Self::Failure(HttpFailure {
            application_error_message: Some(application_error_message.into()),
            reason_phrase: reason_phrase.into(),
            status,
        })
    }

    /// Failure with a status and reason phrase only
    pub fn status(reason_phrase: impl Into<String>, status: StatusCode) -> Self {
        Self::Failure(HttpFailure {
            application_error_message: None,
            reason_phrase: reason_phrase.into(),
            status,
        })
    }

    /// Map a service outcome to HTTP
    ///
    /// Failure becomes 500 with the application message, null becomes 404 with
    /// `not_found_message`, and a value becomes 200.
    pub fn from_outcome(outcome: Outcome<T>, not_found_message: &str) -> Self {
        match outcome {
            Outcome::Success(value) => Self::Success(value),
            Outcome::SuccessNull => Self::failure(
                not_found_message,
                StatusCode::NOT_FOUND.canonical_reason().unwrap_or("Not Found"),
                StatusCode::NOT_FOUND,
            ),
            Outcome::Failure(message) => Self::failure(
                message,
                StatusCode::INTERNAL_SERVER_ERROR
                    .canonical_reason()
                    .unwrap_or("Internal Server Error"),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        }
    }

    /// True when this is a failure
    pub fn failed(&self) -> bool {
        matches!(self, Self::Failure(_))
    }

    /// Status code this outcome will respond with
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Success(_) => StatusCode::OK,
            Self::Failure(failure) => failure.status,
        }
    }
}

impl<T: Serialize> IntoResponse for HttpOutcome<T> {
    fn into_response(self) -> Response {
        match self {
            Self::Success(value) => (StatusCode::OK, Json(value)).into_response(),
            Self::Failure(failure) => match failure.application_error_message {
                Some(message) => (failure.status, message).into_response(),
                None => failure.status.into_response(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn states<T>(outcome: &Outcome<T>) -> [bool; 3] {
        [
            outcome.failed(),
            outcome.is_null(),
            !outcome.failed() && !outcome.is_null(),
        ]
    }

    #[test]
    fn test_exactly_one_state_is_active() {
        let outcomes = [
            Outcome::success(1),
            Outcome::success_null(),
            Outcome::failure("boom"),
        ];

        for outcome in &outcomes {
            let active = states(outcome).iter().filter(|s| **s).count();
            assert_eq!(active, 1, "{outcome:?}");
        }

        assert_eq!(outcomes[0].result_data(), Some(&1));
        assert_eq!(outcomes[1].result_data(), None);
        assert_eq!(outcomes[2].result_data(), None);
        assert_eq!(outcomes[2].error_message(), Some("boom"));
    }

    #[test]
    fn test_from_option() {
        assert_eq!(Outcome::from_option(Some("x")), Outcome::Success("x"));
        assert!(Outcome::<&str>::from_option(None).is_null());
    }

    #[test]
    fn test_cast_keeps_failure_message() {
        let failed: Outcome<i32> = Outcome::failure("db down");
        let cast: Outcome<String> = failed.cast();
        assert_eq!(cast.error_message(), Some("db down"));
    }

    #[test]
    fn test_map_only_touches_success() {
        assert_eq!(Outcome::success(2).map(|v| v * 2), Outcome::Success(4));
        assert!(Outcome::<i32>::success_null().map(|v| v * 2).is_null());
        assert!(Outcome::<i32>::failure("x").map(|v| v * 2).failed());
    }

    #[tokio::test]
    async fn test_capture_forwards_inner_tags() {
        let inner = async { Ok::<_, std::io::Error>(Outcome::<i32>::success_null()) };
        let outcome = Outcome::capture(inner, "Failed to load.").await;
        assert!(outcome.is_null());

        let inner = async { Ok::<_, std::io::Error>(Outcome::<i32>::failure("inner")) };
        let outcome = Outcome::capture(inner, "Failed to load.").await;
        assert_eq!(outcome.error_message(), Some("inner"));
    }

    #[tokio::test]
    async fn test_capture_converts_errors() {
        let inner = async { Err::<Outcome<i32>, _>(anyhow::anyhow!("connection refused")) };
        let outcome = Outcome::capture(inner, "Failed to load.").await;
        assert_eq!(
            outcome.error_message(),
            Some("connection refused - Failed to load.")
        );
    }

    #[tokio::test]
    async fn test_capture_value_wraps_success() {
        let outcome = Outcome::capture_value(async { Ok::<_, std::io::Error>(5) }, "x").await;
        assert_eq!(outcome, Outcome::Success(5));
    }

    #[tokio::test]
    async fn test_capture_converts_panics() {
        let inner = async {
            if true {
                panic!("exploded");
            }
            Ok::<Outcome<i32>, std::io::Error>(Outcome::success(1))
        };
        let outcome = Outcome::capture(inner, "Failed to load.").await;
        assert_eq!(
            outcome.error_message(),
            Some("panic: exploded - Failed to load.")
        );
    }

    #[tokio::test]
    async fn test_capture_unit() {
        let ok = Outcome::capture_unit(async { Ok::<(), std::io::Error>(()) }, "x").await;
        assert_eq!(ok, Outcome::Success(()));

        let err = Outcome::capture_unit(
            async { Err::<(), _>(std::io::Error::other("disk full")) },
            "Failed to write.",
        )
        .await;
        assert_eq!(err.error_message(), Some("disk full - Failed to write."));
    }

    #[test]
    fn test_and_then_option() {
        assert!(Outcome::success(None::<i32>).and_then_option().is_null());
        assert_eq!(
            Outcome::success(Some(3)).and_then_option(),
            Outcome::Success(3)
        );
    }

    #[test]
    fn test_http_outcome_status_mapping() {
        let ok = HttpOutcome::from_outcome(Outcome::success(1), "missing");
        assert_eq!(ok.status_code(), StatusCode::OK);

        let missing = HttpOutcome::from_outcome(Outcome::<i32>::success_null(), "missing");
        assert_eq!(missing.status_code(), StatusCode::NOT_FOUND);
        match missing {
            HttpOutcome::Failure(failure) => {
                assert_eq!(failure.application_error_message.as_deref(), Some("missing"));
                assert_eq!(failure.reason_phrase, "Not Found");
            }
            HttpOutcome::Success(_) => panic!("expected failure"),
        }

        let failed = HttpOutcome::from_outcome(Outcome::<i32>::failure("boom"), "missing");
        assert_eq!(failed.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(failed.failed());
    }

    #[test]
    fn test_http_outcome_into_response() {
        let response = HttpOutcome::<i32>::status("Bad Gateway", StatusCode::BAD_GATEWAY)
            .into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

        let response = HttpOutcome::Success(serde_json::json!({"a": 1})).into_response();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
