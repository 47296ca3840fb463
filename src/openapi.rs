use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::handlers::health::HealthResponse;
use crate::models::{
    ActiveReport, ActiveReportsResponse, ContactInfo, ErrorResponse, LatLng, SubmitReportRequest,
    SubmitReportResponse,
};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::reports::save_report,
        crate::handlers::reports::active_reports,
        crate::handlers::health::health_check,
    ),
    components(
        schemas(
            SubmitReportRequest,
            SubmitReportResponse,
            ActiveReportsResponse,
            ActiveReport,
            ContactInfo,
            LatLng,
            ErrorResponse,
            HealthResponse
        )
    ),
    tags(
        (name = "rescue-radar-api", description = "Animal welfare report submission and listing")
    )
)]
pub struct ApiDoc;

pub fn routes() -> SwaggerUi {
    SwaggerUi::new("/docs").url("/openapi.json", ApiDoc::openapi())
}
