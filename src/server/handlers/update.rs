//! `/update` routes: repository configuration and install/update operations.

use crate::server::response::Envelope;
use crate::server::state::AppState;
use crate::update::api::{UpdateOutcome, UpdateResult};
use actix_web::web::{self, Data, Json};
use actix_web::{HttpResponse, Scope};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepositoryRequest {
    #[serde(default)]
    pub repository_url: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PluginIdRequest {
    #[serde(default)]
    pub plugin_id: String,
}

pub fn scope() -> Scope {
    web::scope("/update")
        .service(web::resource("/repository").route(web::post().to(set_repository)))
        .service(web::resource("/check").route(web::post().to(check_for_update)))
        .service(web::resource("/install").route(web::post().to(install)))
        .service(web::resource("/update").route(web::post().to(update)))
        .service(web::resource("/update-or-install").route(web::post().to(update_or_install)))
}

async fn set_repository(
    state: Data<AppState>,
    request: Json<RepositoryRequest>,
) -> HttpResponse {
    if request.repository_url.is_empty() {
        return HttpResponse::Ok().json(Envelope::failure(
            "repository URL must not be empty",
            "INVALID_ARGUMENT",
        ));
    }

    match state.repository.set_repository_url(&request.repository_url) {
        Ok(()) => HttpResponse::Ok().json(Envelope::success_message("repository URL updated")),
        Err(e) => HttpResponse::Ok().json(Envelope::failure(
            format!("failed to persist repository URL: {}", e),
            "IO_ERROR",
        )),
    }
}

async fn check_for_update(
    state: Data<AppState>,
    request: Json<PluginIdRequest>,
) -> HttpResponse {
    match state.orchestrator.check_for_update(&request.plugin_id).await {
        Ok(check) => {
            let message = if check.has_update {
                "new version available"
            } else {
                "already the latest version"
            };
            HttpResponse::Ok().json(Envelope::success_with_message(check, message))
        }
        Err(e) => HttpResponse::Ok().json(Envelope::failure(e.to_string(), e.error_code())),
    }
}

async fn install(state: Data<AppState>, request: Json<PluginIdRequest>) -> HttpResponse {
    outcome_response(state.orchestrator.install_plugin(&request.plugin_id).await)
}

async fn update(state: Data<AppState>, request: Json<PluginIdRequest>) -> HttpResponse {
    outcome_response(state.orchestrator.update_plugin(&request.plugin_id).await)
}

async fn update_or_install(
    state: Data<AppState>,
    request: Json<PluginIdRequest>,
) -> HttpResponse {
    outcome_response(
        state
            .orchestrator
            .update_or_install_plugin(&request.plugin_id)
            .await,
    )
}

fn outcome_response(result: UpdateResult<UpdateOutcome>) -> HttpResponse {
    match result {
        Ok(outcome) => HttpResponse::Ok().json(Envelope::success_message(outcome.to_string())),
        Err(e) => HttpResponse::Ok().json(Envelope::failure(e.to_string(), e.error_code())),
    }
}
