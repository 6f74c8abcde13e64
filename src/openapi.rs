use crate::models::{BoardPost, BoardRequest};
use crate::routes::{BoardDetailBody, BoardListBody, CreatedBody, SuccessBody};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::create_board,
        crate::routes::update_board,
        crate::routes::delete_board,
        crate::routes::list_boards,
        crate::routes::get_board_detail,
    ),
    components(schemas(
        BoardPost, BoardRequest, SuccessBody, CreatedBody, BoardListBody, BoardDetailBody
    )),
    tags(
        (name = "board", description = "Bulletin board posts"),
    )
)]
pub struct ApiDoc;
