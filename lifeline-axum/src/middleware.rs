use std::sync::Arc;

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use lifeline::Lifeline;
use lifeline_core::{RepositoryProvider, User};

pub struct AppState<R: RepositoryProvider> {
    pub lifeline: Arc<Lifeline<R>>,
}

impl<R: RepositoryProvider> Clone for AppState<R> {
    fn clone(&self) -> Self {
        Self {
            lifeline: self.lifeline.clone(),
        }
    }
}

/// Resolve a `Bearer` token to the current user and stash it in request
/// extensions. Requests without a valid token pass through anonymously; the
/// extractors decide per route whether that is acceptable.
pub async fn auth_middleware<R>(
    State(state): State<AppState<R>>,
    mut request: Request,
    next: Next,
) -> Response
where
    R: RepositoryProvider,
{
    if let Some(token) = extract_bearer_token(&request) {
        match state.lifeline.current_user(&token).await {
            Ok(user) => {
                request.extensions_mut().insert(user);
            }
            Err(e) => {
                tracing::debug!(error = %e, "invalid session token");
            }
        }
    }

    next.run(request).await
}

fn extract_bearer_token(request: &Request) -> Option<String> {
    request
        .headers()
        .get("Authorization")
        .and_then(|header| header.to_str().ok())
        .and_then(|header| header.strip_prefix("Bearer "))
        .map(|token| token.to_string())
}
