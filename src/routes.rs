use std::sync::Arc;

use actix_web::{
    dev::Payload, error::InternalError, web, Error, FromRequest, HttpMessage, HttpRequest, HttpResponse,
    ResponseError,
};
use futures_util::future::LocalBoxFuture;
use serde::Serialize;
use utoipa::ToSchema;

use crate::error::ApiError;
use crate::models::*;
use crate::service::BoardService;
use crate::validation::{self, FieldErrors};

/// Largest accepted request body. `content` has no length cap of its own.
pub const MAX_BODY_BYTES: usize = 8 * 1024 * 1024;

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config()).app_data(form_config()).app_data(path_config());
    cfg.service(
        web::scope("/api/board")
            .service(web::resource("/create").route(web::post().to(create_board)))
            .service(web::resource("/update").route(web::put().to(update_board)))
            .service(web::resource("/delete").route(web::delete().to(delete_board)))
            .service(web::resource("/get").route(web::get().to(list_boards)))
            .service(web::resource("/detail/{id}").route(web::get().to(get_board_detail))),
    );
}

// Malformed bodies come back as {"error": "..."} like every other failure.
fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().limit(MAX_BODY_BYTES).error_handler(|err, _req: &HttpRequest| {
        let res = ApiError::BadRequest(format!("invalid request body: {err}")).error_response();
        InternalError::from_response(err, res).into()
    })
}

fn form_config() -> web::FormConfig {
    web::FormConfig::default().limit(MAX_BODY_BYTES).error_handler(|err, _req: &HttpRequest| {
        let res = ApiError::BadRequest(format!("invalid form body: {err}")).error_response();
        InternalError::from_response(err, res).into()
    })
}

fn path_config() -> web::PathConfig {
    web::PathConfig::default().error_handler(|err, _req: &HttpRequest| {
        let mut fields = FieldErrors::new();
        fields.add("boardId", "boardId must be a positive integer");
        InternalError::from_response(err, ApiError::Validation(fields).error_response()).into()
    })
}

/// Create and update fields, taken from a JSON body, a urlencoded form body,
/// or the query string when the request carries no body type at all.
pub struct BoardParams(pub BoardRequest);

impl FromRequest for BoardParams {
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self, Error>>;

    fn from_request(req: &HttpRequest, pl: &mut Payload) -> Self::Future {
        let mime = req.content_type();
        if mime.is_empty() {
            let parsed: Result<Self, Error> = web::Query::<BoardRequest>::from_query(req.query_string())
                .map(|q| BoardParams(q.into_inner()))
                .map_err(|e| ApiError::BadRequest(format!("invalid query string: {e}")).into());
            Box::pin(async move { parsed })
        } else if mime.eq_ignore_ascii_case("application/x-www-form-urlencoded") {
            let form = web::Form::<BoardRequest>::from_request(req, pl);
            Box::pin(async move { Ok(BoardParams(form.await?.into_inner())) })
        } else {
            // the JSON extractor rejects any other content type with a 400
            let json = web::Json::<BoardRequest>::from_request(req, pl);
            Box::pin(async move { Ok(BoardParams(json.await?.into_inner())) })
        }
    }
}

#[derive(Clone)]
pub struct AppState { pub boards: Arc<BoardService> }

#[derive(Debug, Serialize, ToSchema)]
pub struct SuccessBody {
    pub success: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatedBody {
    pub success: String,
    #[schema(value_type = i64)]
    pub board_id: Id,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct BoardListBody {
    pub boards: Vec<BoardPost>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct BoardDetailBody {
    pub board: BoardPost,
}

#[utoipa::path(
    post,
    path = "/api/board/create",
    request_body = BoardRequest,
    responses(
        (status = 200, description = "Post created", body = CreatedBody),
        (status = 400, description = "Missing or invalid fields"),
        (status = 403, description = "Permission denied"),
        (status = 409, description = "Title already in use")
    )
)]
pub async fn create_board(
    data: web::Data<AppState>,
    BoardParams(payload): BoardParams,
) -> Result<HttpResponse, ApiError> {
    let new = validation::validate_create(&payload)?;
    let post = data.boards.create(new).await?;
    Ok(HttpResponse::Ok().json(CreatedBody {
        success: "Post created successfully.".into(),
        board_id: post.id,
    }))
}

#[utoipa::path(
    put,
    path = "/api/board/update",
    request_body = BoardRequest,
    responses(
        (status = 200, description = "Post updated", body = SuccessBody),
        (status = 400, description = "Missing or invalid fields"),
        (status = 404, description = "Post not found")
    )
)]
pub async fn update_board(
    data: web::Data<AppState>,
    BoardParams(payload): BoardParams,
) -> Result<HttpResponse, ApiError> {
    let (id, upd) = validation::validate_update(&payload)?;
    data.boards.update(id, upd).await?;
    Ok(HttpResponse::Ok().json(SuccessBody { success: "Post updated successfully.".into() }))
}

#[utoipa::path(
    delete,
    path = "/api/board/delete",
    request_body = BoardRequest,
    responses(
        (status = 200, description = "Post deleted", body = SuccessBody),
        (status = 400, description = "Missing or invalid boardId"),
        (status = 404, description = "Post not found")
    )
)]
pub async fn delete_board(
    data: web::Data<AppState>,
    payload: web::Json<BoardRequest>,
) -> Result<HttpResponse, ApiError> {
    let id = validation::validate_board_id(payload.board_id)?;
    data.boards.delete(id).await?;
    Ok(HttpResponse::Ok().json(SuccessBody { success: "Post deleted successfully.".into() }))
}

#[utoipa::path(
    get,
    path = "/api/board/get",
    responses(
        (status = 200, description = "All posts, oldest first", body = BoardListBody)
    )
)]
pub async fn list_boards(data: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let boards = data.boards.list_all().await?;
    Ok(HttpResponse::Ok().json(BoardListBody { boards }))
}

#[utoipa::path(
    get,
    path = "/api/board/detail/{id}",
    params(("id" = i64, Path, description = "Board post id")),
    responses(
        (status = 200, description = "Post", body = BoardDetailBody),
        (status = 400, description = "Invalid id"),
        (status = 404, description = "Post not found")
    )
)]
pub async fn get_board_detail(
    data: web::Data<AppState>,
    path: web::Path<Id>,
) -> Result<HttpResponse, ApiError> {
    let id = validation::validate_board_id(Some(path.into_inner().into()))?;
    let board = data.boards.get_by_id(id).await?;
    Ok(HttpResponse::Ok().json(BoardDetailBody { board }))
}
