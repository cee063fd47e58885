//! `/plugin` routes: artifact upload, descriptor listing, and lifecycle
//! operations delegated to the plugin manager.

use crate::plugin::api::MAX_UPLOAD_SIZE;
use crate::server::handlers::update::PluginIdRequest;
use crate::server::response::Envelope;
use crate::server::state::AppState;
use actix_multipart::Multipart;
use actix_web::web::{self, Data, Json, Path, Query};
use actix_web::{HttpResponse, Scope};
use futures::TryStreamExt;

pub fn scope() -> Scope {
    // `list` and `upload` are registered before the `{action}` wildcard;
    // actix matches in registration order.
    web::scope("/plugin")
        .service(web::resource("/list").route(web::get().to(list)))
        .service(web::resource("/upload").route(web::post().to(upload)))
        .service(web::resource("/reload").route(web::post().to(reload)))
        .service(
            web::resource("/{action}")
                .route(web::post().to(lifecycle_json))
                .route(web::get().to(lifecycle_query)),
        )
}

async fn list(state: Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(Envelope::success(state.manager.list_plugins().await))
}

async fn reload(state: Data<AppState>) -> HttpResponse {
    match state.manager.reload_plugins().await {
        Ok(count) => HttpResponse::Ok().json(Envelope::success_message(format!(
            "reloaded {} plugin(s)",
            count
        ))),
        Err(e) => plugin_failure(e),
    }
}

async fn lifecycle_json(
    state: Data<AppState>,
    action: Path<String>,
    request: Json<PluginIdRequest>,
) -> HttpResponse {
    dispatch_lifecycle(&state, &action, &request.plugin_id).await
}

async fn lifecycle_query(
    state: Data<AppState>,
    action: Path<String>,
    query: Query<PluginIdRequest>,
) -> HttpResponse {
    dispatch_lifecycle(&state, &action, &query.plugin_id).await
}

async fn dispatch_lifecycle(state: &AppState, action: &str, plugin_id: &str) -> HttpResponse {
    let manager = &state.manager;
    match action {
        "load" => match manager.load_plugin(plugin_id).await {
            Ok(descriptor) => HttpResponse::Ok()
                .json(Envelope::success_with_message(descriptor, "plugin loaded")),
            Err(e) => plugin_failure(e),
        },
        "unload" => match manager.unload_plugin(plugin_id).await {
            Ok(()) => HttpResponse::Ok().json(Envelope::success_message("plugin unloaded")),
            Err(e) => plugin_failure(e),
        },
        "start" => match manager.start_plugin(plugin_id).await {
            Ok(plugin_state) => HttpResponse::Ok()
                .json(Envelope::success_with_message(plugin_state, "plugin started")),
            Err(e) => plugin_failure(e),
        },
        "stop" => match manager.stop_plugin(plugin_id).await {
            Ok(plugin_state) => HttpResponse::Ok()
                .json(Envelope::success_with_message(plugin_state, "plugin stopped")),
            Err(e) => plugin_failure(e),
        },
        "enable" => match manager.enable_plugin(plugin_id).await {
            Ok(()) => HttpResponse::Ok().json(Envelope::success_message("plugin enabled")),
            Err(e) => plugin_failure(e),
        },
        "disable" => match manager.disable_plugin(plugin_id).await {
            Ok(()) => HttpResponse::Ok().json(Envelope::success_message("plugin disabled")),
            Err(e) => plugin_failure(e),
        },
        "delete" => match manager.delete_plugin(plugin_id).await {
            Ok(()) => HttpResponse::Ok().json(Envelope::success_message("plugin deleted")),
            Err(e) => plugin_failure(e),
        },
        unknown => HttpResponse::Ok().json(Envelope::failure(
            format!("unknown plugin operation: {}", unknown),
            "NOT_FOUND",
        )),
    }
}

fn plugin_failure(error: crate::plugin::api::PluginError) -> HttpResponse {
    HttpResponse::Ok().json(Envelope::failure(error.to_string(), error.error_code()))
}

async fn upload(state: Data<AppState>, mut payload: Multipart) -> HttpResponse {
    let (file_name, data) = match read_file_field(&mut payload).await {
        Ok(Some(upload)) => upload,
        Ok(None) => {
            return HttpResponse::Ok().json(Envelope::failure(
                "multipart request carries no file field",
                "INVALID_ARGUMENT",
            ));
        }
        Err(e) => {
            return HttpResponse::Ok().json(Envelope::failure(
                format!("failed to read upload: {}", e),
                "INVALID_ARGUMENT",
            ));
        }
    };

    match state.manager.upload_plugin(&file_name, &data).await {
        Ok(path) => HttpResponse::Ok().json(Envelope::success_message(format!(
            "plugin artifact stored at {}",
            path.display()
        ))),
        Err(e) => HttpResponse::Ok().json(Envelope::failure(e.to_string(), e.error_code())),
    }
}

/// Pull the first file field out of the multipart body.
///
/// Reading stops once the payload exceeds the upload cap; the manager rejects
/// the oversized result, so at most one extra chunk is buffered.
async fn read_file_field(
    payload: &mut Multipart,
) -> Result<Option<(String, Vec<u8>)>, actix_multipart::MultipartError> {
    while let Some(mut field) = payload.try_next().await? {
        let file_name = match field.content_disposition().get_filename() {
            Some(name) => name.to_string(),
            None => continue,
        };

        let mut data = Vec::new();
        while let Some(chunk) = field.try_next().await? {
            data.extend_from_slice(&chunk);
            if data.len() > MAX_UPLOAD_SIZE {
                break;
            }
        }

        return Ok(Some((file_name, data)));
    }

    Ok(None)
}
