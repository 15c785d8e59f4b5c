use crate::helpers::JsonResponse;
use crate::models;
use actix_web::{
    dev::{Service, ServiceRequest, ServiceResponse, Transform},
    Error, HttpMessage,
};
use casbin::{function_map::key_match2, CoreApi, DefaultModel, Enforcer, FileAdapter};
use futures::future::{FutureExt, LocalBoxFuture};
use std::cell::RefCell;
use std::future::{ready, Ready};
use std::io::{Error as IoError, ErrorKind};
use std::rc::Rc;
use std::sync::Arc;
use std::task::{Context, Poll};

const MODEL_PATH: &str = "access_control.conf";
const POLICY_PATH: &str = "access_control.csv";

/// Subject of requests without an identity.
pub const ANONYMOUS: &str = "anonym";
/// Subject of requests carrying a verified bearer token.
pub const AUTHENTICATED: &str = "user";

/// Casbin guard in front of every route except `/ping`.
#[derive(Clone)]
pub struct Authorization {
    enforcer: Arc<Enforcer>,
}

pub async fn try_new() -> Result<Authorization, IoError> {
    let m = DefaultModel::from_file(MODEL_PATH)
        .await
        .map_err(|err| IoError::new(ErrorKind::Other, format!("{err:?}")))?;
    let a = FileAdapter::new(POLICY_PATH);

    let mut enforcer = Enforcer::new(m, a)
        .await
        .map_err(|err| IoError::new(ErrorKind::Other, format!("{err:?}")))?;
    enforcer
        .get_role_manager()
        .write()
        .matching_fn(Some(key_match2), None);

    Ok(Authorization {
        enforcer: Arc::new(enforcer),
    })
}

impl Authorization {
    pub fn allows(&self, subject: &str, path: &str, method: &str) -> Result<bool, String> {
        self.enforcer
            .enforce(vec![subject.to_owned(), path.to_owned(), method.to_owned()])
            .map_err(|err| format!("{err:?}"))
    }
}

impl<S, B> Transform<S, ServiceRequest> for Authorization
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = AuthorizationMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthorizationMiddleware {
            service: Rc::new(RefCell::new(service)),
            acl: self.clone(),
        }))
    }
}

pub struct AuthorizationMiddleware<S> {
    service: Rc<RefCell<S>>,
    acl: Authorization,
}

impl<S, B> Service<ServiceRequest> for AuthorizationMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<ServiceResponse<B>, Error>>;

    fn poll_ready(&self, ctx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        if let Ok(service) = self.service.try_borrow_mut() {
            service.poll_ready(ctx)
        } else {
            Poll::Pending
        }
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let subject = if req.extensions().get::<Arc<models::Identity>>().is_some() {
            AUTHENTICATED
        } else {
            ANONYMOUS
        };

        let rejection = match self.acl.allows(subject, req.path(), req.method().as_str()) {
            Ok(true) => None,
            Ok(false) if subject == ANONYMOUS => {
                Some(JsonResponse::<()>::build().unauthorized("Authentication required"))
            }
            Ok(false) => Some(JsonResponse::<()>::build().forbidden("")),
            Err(err) => {
                tracing::error!("Failed to evaluate access policy: {}", err);
                Some(JsonResponse::<()>::build().internal_server_error(""))
            }
        };

        if let Some(err) = rejection {
            tracing::debug!("rejected {} {} {}", subject, req.method(), req.path());
            return ready(Err(err)).boxed_local();
        }

        let fut = self.service.borrow_mut().call(req);
        fut.boxed_local()
    }
}
