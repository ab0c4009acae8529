use utoipa::OpenApi;
use utoipa::ToSchema;

#[derive(ToSchema)]
pub struct HealthResponse { pub status: String }

#[derive(ToSchema)]
pub struct BookDoc {
    pub id: i64,
    pub title: String,
    pub author: String,
    pub isbn: Option<String>,
    pub year: Option<i32>,
}

/// Body for create and update; any `id` in the payload is ignored.
#[derive(ToSchema)]
pub struct BookInputDoc {
    pub title: String,
    pub author: String,
    pub isbn: Option<String>,
    pub year: Option<i32>,
}

#[derive(ToSchema)]
pub struct ErrorDoc { pub error: String }

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health,
        crate::routes::books::list,
        crate::routes::books::create,
        crate::routes::books::get,
        crate::routes::books::update,
        crate::routes::books::delete,
    ),
    components(schemas(HealthResponse, BookDoc, BookInputDoc, ErrorDoc)),
    tags(
        (name = "health"),
        (name = "books")
    )
)]
pub struct ApiDoc;
