use crate::auth::jwt::verify_token;
use crate::config::Config;
use crate::error::LeaveError;
use crate::model::{role::Role, tenant::TenantId};
use crate::models::Claims;
use actix_web::{
    FromRequest, HttpMessage, HttpRequest, dev::Payload, error::ErrorUnauthorized, web::Data,
};
use futures::future::{Ready, ready};

#[derive(Debug, Clone)]
pub struct AuthUser {
    pub username: String,
    pub employee_id: u64,
    pub tenant: TenantId,
    pub role: Role,
}

impl TryFrom<Claims> for AuthUser {
    type Error = &'static str;

    fn try_from(claims: Claims) -> Result<Self, Self::Error> {
        let role = Role::from_id(claims.role).ok_or("Invalid role")?;
        Ok(AuthUser {
            username: claims.sub,
            employee_id: claims.employee_id,
            tenant: TenantId(claims.tenant_id),
            role,
        })
    }
}

impl FromRequest for AuthUser {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        // set by auth_middleware on protected scopes
        if let Some(user) = req.extensions().get::<AuthUser>() {
            return ready(Ok(user.clone()));
        }

        let token = match req
            .headers()
            .get("Authorization")
            .and_then(|h| h.to_str().ok())
            .and_then(|h| h.strip_prefix("Bearer "))
        {
            Some(t) => t,
            None => return ready(Err(ErrorUnauthorized("Missing token"))),
        };

        let config = match req.app_data::<Data<Config>>() {
            Some(c) => c,
            None => {
                return ready(Err(actix_web::error::ErrorInternalServerError(
                    "Config missing",
                )));
            }
        };

        let claims = match verify_token(token, &config.jwt_secret) {
            Ok(c) => c,
            Err(_) => return ready(Err(ErrorUnauthorized("Invalid token"))),
        };

        ready(AuthUser::try_from(claims).map_err(ErrorUnauthorized))
    }
}

impl AuthUser {
    pub fn require_approver(&self) -> Result<(), LeaveError> {
        if self.role.can_approve() {
            Ok(())
        } else {
            Err(LeaveError::Forbidden("Approver, HR or Admin only".into()))
        }
    }

    pub fn require_hr(&self) -> Result<(), LeaveError> {
        if self.role.is_hr() {
            Ok(())
        } else {
            Err(LeaveError::Forbidden("HR/Admin only".into()))
        }
    }

    /// Own records are always visible; others' only to HR.
    pub fn require_self_or_hr(&self, employee_id: u64) -> Result<(), LeaveError> {
        if self.employee_id == employee_id {
            Ok(())
        } else {
            self.require_hr()
        }
    }
}
