//! axum adapter serving generated workbooks as file downloads

use crate::config::WorkbookSpec;
use crate::convert::{MediaType, MessageConverter, OutputMessage, WorkbookMessageConverter};
use crate::document::Document;
use crate::error::ExcelError;
use crate::generator::WorkbookGenerator;
use crate::sizing::SizingPolicy;
use axum::body::Body;
use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use std::sync::Arc;

/// A generated document returned from a handler
///
/// Serialized through [`WorkbookMessageConverter`]; failures become a `500`.
pub struct WorkbookResponse(pub Document);

impl IntoResponse for WorkbookResponse {
    fn into_response(self) -> Response {
        let mut message = OutputMessage::new();
        if let Err(err) =
            WorkbookMessageConverter::new().write(self.0, &MediaType::VND_MS_EXCEL, &mut message)
        {
            return error_response(err);
        }

        let (headers, body) = message.into_parts();
        let mut response = Response::new(Body::from(body));
        for (name, value) in headers {
            match (
                HeaderName::try_from(name.as_str()),
                HeaderValue::try_from(value.as_str()),
            ) {
                (Ok(header_name), Ok(header_value)) => {
                    response.headers_mut().insert(header_name, header_value);
                }
                _ => {
                    return error_response(ExcelError::WriteError(format!(
                        "invalid response header '{name}: {value}'"
                    )))
                }
            }
        }
        response
    }
}

fn error_response(err: ExcelError) -> Response {
    log::warn!("workbook response failed: {err}");
    (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()).into_response()
}

/// Generate a workbook for `records` and turn it into a response
pub fn workbook_response<R>(spec: &WorkbookSpec<R>, records: &[R]) -> Response {
    sized_workbook_response(spec, records, SizingPolicy::default())
}

fn sized_workbook_response<R>(
    spec: &WorkbookSpec<R>,
    records: &[R],
    sizing: SizingPolicy,
) -> Response {
    match WorkbookGenerator::new(spec, records)
        .with_sizing(sizing)
        .generate()
    {
        Ok(document) => WorkbookResponse(document).into_response(),
        Err(err) => error_response(err),
    }
}

/// A router serving `GET path` with a fresh workbook per request
///
/// `source` is called once per request to fetch the records. Column sizing
/// follows [`SizingPolicy::from_env`], read once when the router is built.
pub fn workbook_router<R, F>(path: &str, spec: Arc<WorkbookSpec<R>>, source: F) -> Router
where
    R: Send + Sync + 'static,
    F: Fn() -> Vec<R> + Clone + Send + Sync + 'static,
{
    let sizing = SizingPolicy::from_env();
    Router::new().route(
        path,
        get(move || {
            let spec = Arc::clone(&spec);
            let source = source.clone();
            async move { sized_workbook_response(&spec, &source(), sizing) }
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::header;

    fn spec() -> WorkbookSpec<(u32, bool)> {
        let mut builder = WorkbookSpec::<(u32, bool)>::builder()
            .name("Flags")
            .sheet_name(None)
            .default_header_style()
            .default_body_style();
        builder
            .number_col("No", |r: &(u32, bool)| Some(r.0))
            .unwrap()
            .boolean_col("On", |r: &(u32, bool)| Some(r.1))
            .unwrap();
        builder.build()
    }

    #[tokio::test]
    async fn test_workbook_response_headers() {
        let response = workbook_response(&spec(), &[(1, true), (2, false)]);

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "application/vnd.ms-excel"
        );
        assert_eq!(
            response.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=\"Flags.xlsx\""
        );
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&body[..2], b"PK");
    }

    #[tokio::test]
    async fn test_generation_failure_is_500() {
        let spec = WorkbookSpec::<(u32, bool)>::builder()
            .name("Flags")
            .sheet_name("bad?name")
            .default_header_style()
            .default_body_style()
            .build();

        let response = workbook_response(&spec, &[]);
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_non_ascii_title_keeps_ascii_header() {
        let mut document = Document::new();
        document.set_title("Lương.xlsx");
        let response = WorkbookResponse(document).into_response();

        assert_eq!(response.status(), StatusCode::OK);
        let disposition = response.headers()[header::CONTENT_DISPOSITION]
            .to_str()
            .unwrap();
        assert!(disposition.ends_with("filename*=UTF-8''L%C6%B0%C6%A1ng.xlsx"));
    }
}
