use utoipa::OpenApi;
use utoipa::ToSchema;

#[derive(ToSchema)]
pub struct HealthResponse { pub status: String }

#[derive(ToSchema)]
pub struct ErrorDoc { pub error: String }

#[derive(ToSchema)]
#[allow(non_snake_case)]
pub struct ResidentDoc {
    pub id: String,
    pub firstName: String,
    pub lastName: String,
    pub role: String,
    pub profilePhoto: String,
    pub linkedin: Option<String>,
    pub twitter: Option<String>,
    /// RFC 3339 timestamp
    pub createdAt: String,
}

#[derive(ToSchema)]
pub struct ResidentListDoc { pub residents: Vec<ResidentDoc> }

/// Also accepted as JSON or urlencoded, without the file.
#[derive(ToSchema)]
#[allow(non_snake_case)]
pub struct CreateResidentDoc {
    pub firstName: String,
    pub lastName: String,
    pub role: String,
    /// Either a URL string or an image file; an uploaded file wins.
    #[schema(value_type = Option<String>, format = Binary)]
    pub profilePhoto: Option<String>,
    pub linkedin: Option<String>,
    pub twitter: Option<String>,
}

#[derive(ToSchema)]
pub struct UploadRequestDoc {
    #[schema(value_type = String, format = Binary)]
    pub image: Vec<u8>,
}

#[derive(ToSchema)]
pub struct UploadResponseDoc { pub url: String }

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health,
        crate::routes::residents::list,
        crate::routes::residents::create,
        crate::routes::upload::upload,
    ),
    components(
        schemas(
            HealthResponse,
            ErrorDoc,
            ResidentDoc,
            ResidentListDoc,
            CreateResidentDoc,
            UploadRequestDoc,
            UploadResponseDoc,
        )
    ),
    tags(
        (name = "health"),
        (name = "residents"),
        (name = "upload")
    )
)]
pub struct ApiDoc;
