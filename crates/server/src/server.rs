use axum::{
    Router,
    extract::{DefaultBodyLimit, Request, State},
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, Error as AxumError, Header, authorization::Basic},
};
use engine::{Engine, EngineError, Role};

use std::sync::Arc;

use crate::{ServerError, geolocation, pharmacies, signup, user};

static ROLE_HEADER: axum::http::HeaderName = axum::http::HeaderName::from_static("x-role");

/// Room left in the request body for the text fields of a multipart signup.
const FORM_OVERHEAD_BYTES: usize = 64 * 1024;

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
}

/// `TypedHeader` for the role a caller authenticates as.
///
/// Values are `PATIENT` or `PHARMACY`; without the header the caller is
/// resolved as a patient.
#[derive(Debug)]
struct RoleHeader(Role);

impl Header for RoleHeader {
    fn name() -> &'static axum::http::HeaderName {
        &ROLE_HEADER
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
        let Ok(role) = Role::try_from(value.trim().to_ascii_uppercase().as_str()) else {
            return Err(AxumError::invalid());
        };

        Ok(RoleHeader(role))
    }

    fn encode<E: Extend<axum::http::HeaderValue>>(&self, values: &mut E) {
        values.extend(std::iter::once(axum::http::HeaderValue::from_static(
            self.0.as_str(),
        )));
    }
}

async fn auth(
    auth_header: Option<TypedHeader<Authorization<Basic>>>,
    role_header: Option<TypedHeader<RoleHeader>>,
    State(state): State<ServerState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ServerError> {
    let Some(TypedHeader(credentials)) = auth_header else {
        return Err(EngineError::Unauthorized.into());
    };
    let role = role_header.map_or(Role::Patient, |TypedHeader(RoleHeader(role))| role);

    let caller = state
        .engine
        .require_user(role, credentials.username(), credentials.password())
        .await?;

    request.extensions_mut().insert(caller);
    Ok(next.run(request).await)
}

pub fn router(state: ServerState) -> Router {
    let body_limit = state.engine.max_document_bytes() + FORM_OVERHEAD_BYTES;

    let authenticated = Router::new()
        .route("/me", get(user::me))
        .route("/patient/profile", get(user::patient_profile))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth));

    Router::new()
        .route("/signup/patient", post(signup::patient))
        .route(
            "/signup/pharmacy",
            post(signup::pharmacy).layer(DefaultBodyLimit::max(body_limit)),
        )
        .route("/pharmacy/geolocation", post(geolocation::upsert))
        .route("/pharmacy/{id}/geolocation", get(geolocation::get))
        .route("/pharmacies", get(pharmacies::list))
        .merge(authenticated)
        .with_state(state)
}

pub async fn run_with_listener(
    engine: Engine,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    let state = ServerState {
        engine: Arc::new(engine),
    };

    axum::serve(listener, router(state)).await
}
