use axum::{
    Router,
    extract::Request,
    http::StatusCode,
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
};
use axum_extra::{
    TypedHeader,
    headers::{Error as AxumError, Header},
};
use uuid::Uuid;

use std::sync::Arc;

use crate::{accounts, activity, transactions, transfers};
use ledger::{Ledger, Scope};

static SCOPE_HEADER: axum::http::HeaderName = axum::http::HeaderName::from_static("x-ledger-scope");

#[derive(Clone)]
pub struct ServerState {
    pub ledger: Arc<Ledger>,
}

/// `TypedHeader` carrying the caller's resolved scope.
///
/// Requests must contain an "x-ledger-scope" entry of the form `user:<id>`
/// or `org:<uuid>`. The value is produced by the authentication layer in
/// front of this service, never by end users directly.
#[derive(Debug)]
struct ScopeHeader(Scope);

impl Header for ScopeHeader {
    fn name() -> &'static axum::http::HeaderName {
        &SCOPE_HEADER
    }

    fn decode<'i, I>(values: &mut I) -> Result<Self, AxumError>
    where
        Self: Sized,
        I: Iterator<Item = &'i axum::http::HeaderValue>,
    {
        let value = values.next().ok_or_else(AxumError::invalid)?;
        let Ok(value) = value.to_str() else {
            return Err(AxumError::invalid());
        };

        if let Some(user_id) = value.strip_prefix("user:") {
            if user_id.is_empty() {
                return Err(AxumError::invalid());
            }
            return Ok(ScopeHeader(Scope::personal(user_id)));
        }
        if let Some(org_id) = value.strip_prefix("org:") {
            let Ok(org_id) = Uuid::parse_str(org_id) else {
                return Err(AxumError::invalid());
            };
            return Ok(ScopeHeader(Scope::organization(org_id)));
        }

        Err(AxumError::invalid())
    }

    fn encode<E: Extend<axum::http::HeaderValue>>(&self, values: &mut E) {
        let as_string = self.0.key();
        match axum::http::HeaderValue::from_str(&as_string) {
            Ok(value) => values.extend(std::iter::once(value)),
            Err(_) => tracing::error!("failed to encode x-ledger-scope header"),
        }
    }
}

async fn resolve_scope(
    scope_header: Option<TypedHeader<ScopeHeader>>,
    mut request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let Some(TypedHeader(ScopeHeader(scope))) = scope_header else {
        return Err(StatusCode::UNAUTHORIZED);
    };

    request.extensions_mut().insert(scope);
    Ok(next.run(request).await)
}

fn router(state: ServerState) -> Router {
    Router::new()
        .route("/accounts", post(accounts::create).get(accounts::list))
        .route("/accounts/{id}", get(accounts::get))
        .route("/accounts/{id}/balance", get(accounts::balance))
        .route("/transactions", post(transactions::create))
        .route(
            "/transactions/{id}",
            get(transactions::get)
                .patch(transactions::update)
                .delete(transactions::delete),
        )
        .route("/transfers", post(transfers::create))
        .route(
            "/transfers/{id}",
            get(transfers::get)
                .patch(transfers::update)
                .delete(transfers::delete),
        )
        .route("/activity", get(activity::list))
        .route_layer(middleware::from_fn(resolve_scope))
        .with_state(state)
}

/// Builds the application router over an already constructed [`Ledger`].
pub fn app(ledger: Ledger) -> Router {
    router(ServerState {
        ledger: Arc::new(ledger),
    })
}

pub async fn run(ledger: Ledger) {
    let listener = match tokio::net::TcpListener::bind("127.0.0.1:3000").await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!("failed to bind server listener: {err}");
            return;
        }
    };
    if let Err(err) = run_with_listener(ledger, listener).await {
        tracing::error!("server failed: {err}");
    }
}

pub async fn run_with_listener(
    ledger: Ledger,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app(ledger)).await
}

pub fn spawn_with_listener(
    ledger: Ledger,
    listener: tokio::net::TcpListener,
) -> Result<std::net::SocketAddr, std::io::Error> {
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        if let Err(err) = run_with_listener(ledger, listener).await {
            tracing::error!("server failed: {err}");
        }
    });

    Ok(addr)
}
