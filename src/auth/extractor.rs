use std::{
    future::{ready, Ready},
    sync::Arc,
};

use actix_web::{web, FromRequest, HttpRequest};

use crate::{app_state::AppState, errors::AppError, models::domain::User};

// Extractor for the signed-in user in handlers
pub struct SignedIn(pub User);

impl FromRequest for SignedIn {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut actix_web::dev::Payload) -> Self::Future {
        let user = req
            .app_data::<web::Data<Arc<AppState>>>()
            .and_then(|state| state.session.current_user())
            .ok_or(AppError::AuthRequired);

        ready(user.map(SignedIn))
    }
}
