use utoipa::OpenApi;

use crate::common::response::ErrorBody;
use crate::modules::dub::dto::{DubForm, DubResponse};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::modules::dub::handler::translate_video,
        crate::modules::dub::handler::upload_video,
    ),
    components(
        schemas(DubForm, DubResponse, ErrorBody)
    ),
    tags(
        (name = "Dub", description = "Video translation and dubbing")
    )
)]
pub struct ApiDoc;
