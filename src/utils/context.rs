use crate::middleware::auth::get_user_id_from_request;
use crate::utils::error::CustomError;
use actix_web::HttpRequest;
use mongodb::bson::oid::ObjectId;
use uuid::Uuid;

/// Request-scoped context carrying the verified caller identity and a
/// correlation id for log lines. Built once per request in the controller
/// and passed by reference into the service layer.
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub caller_id: ObjectId,
    pub request_id: Uuid,
}

impl RequestContext {
    pub fn from_request(req: &HttpRequest) -> Result<Self, CustomError> {
        let user_id = get_user_id_from_request(req)
            .ok_or_else(|| CustomError::UnauthorizedError("Not authenticated".to_string()))?;

        let caller_id = ObjectId::parse_str(&user_id)
            .map_err(|_| CustomError::BadRequestError("Invalid user ID".to_string()))?;

        Ok(RequestContext {
            caller_id,
            request_id: Uuid::new_v4(),
        })
    }
}
