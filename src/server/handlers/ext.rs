//! `/ext` routes: named action dispatch through the action registry.

use crate::server::response::Envelope;
use crate::server::state::AppState;
use actix_web::web::{self, Data, Json};
use actix_web::{HttpResponse, Scope};
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Deserialize)]
pub struct ActionRequest {
    #[serde(default)]
    pub action: String,
    #[serde(default)]
    pub parameters: Value,
}

pub fn scope() -> Scope {
    web::scope("/ext")
        .service(web::resource("/action").route(web::post().to(dispatch)))
        .service(web::resource("/list").route(web::get().to(list)))
}

async fn dispatch(state: Data<AppState>, request: Json<ActionRequest>) -> HttpResponse {
    if request.action.is_empty() {
        return HttpResponse::Ok().json(Envelope::failure(
            "action name must not be empty",
            "INVALID_ARGUMENT",
        ));
    }

    match state.actions.dispatch(&request.action, &request.parameters) {
        Ok(value) => HttpResponse::Ok().json(Envelope::success(value)),
        Err(e) => HttpResponse::Ok().json(Envelope::failure(e.to_string(), e.error_code())),
    }
}

async fn list(state: Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(Envelope::success(state.actions.names()))
}
