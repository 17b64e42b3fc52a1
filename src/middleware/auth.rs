use crate::services::auth_service;
use crate::services::UserService;
use crate::utils::error::AuthFailure;
use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    Error, HttpMessage, HttpResponse,
};
use futures::future::LocalBoxFuture;
use std::future::{ready, Ready};
use std::rc::Rc;

fn unauthorized(message: &str) -> Error {
    let response = HttpResponse::Unauthorized().json(serde_json::json!({ "error": message }));
    actix_web::error::InternalError::from_response(message.to_string(), response).into()
}

struct AuthState {
    jwt_secret: String,
    users: UserService,
}

/// Verifies the session token (bearer header or `jwt` cookie), resolves it
/// to an existing user, and attaches the claims to the request for
/// handlers to read via `web::ReqData<Claims>`.
///
/// The bearer path answers with a specific 401 sub-reason (missing vs
/// invalid vs expired); the cookie path is a generic 401.
pub struct AuthMiddleware {
    state: Rc<AuthState>,
}

impl AuthMiddleware {
    pub fn new(jwt_secret: String, users: UserService) -> Self {
        Self {
            state: Rc::new(AuthState { jwt_secret, users }),
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = AuthMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthMiddlewareService {
            service: Rc::new(service),
            state: Rc::clone(&self.state),
        }))
    }
}

pub struct AuthMiddlewareService<S> {
    service: Rc<S>,
    state: Rc<AuthState>,
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let state = Rc::clone(&self.state);

        Box::pin(async move {
            let bearer = req
                .headers()
                .get("Authorization")
                .and_then(|value| value.to_str().ok())
                .and_then(|value| value.strip_prefix("Bearer "))
                .map(str::to_string);

            let claims = if let Some(token) = bearer {
                auth_service::verify_token(&token, &state.jwt_secret)
                    .map_err(|failure| unauthorized(failure.message()))?
            } else if let Some(cookie) = req.cookie(auth_service::SESSION_COOKIE) {
                // Browser flow: any failure collapses into a generic 401.
                auth_service::verify_token(cookie.value(), &state.jwt_secret)
                    .map_err(|_| unauthorized("Unauthorized"))?
            } else {
                return Err(unauthorized(AuthFailure::MissingToken.message()));
            };

            // The token may outlive the account it was issued for.
            if state.users.find_by_id(&claims.sub).await.is_err() {
                log::warn!("❌ Token for unknown user {}", claims.sub);
                return Err(unauthorized(AuthFailure::InvalidToken.message()));
            }

            req.extensions_mut().insert(claims);
            service.call(req).await
        })
    }
}
