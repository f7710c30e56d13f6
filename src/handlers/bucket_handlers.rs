//! Page handlers for browsing, thawing and flushing archived buckets.
//!
//! Each handler hands its [`Page`] model to the renderer as JSON. Archiver
//! trouble is reported inside the page (`errors`), never as an HTTP error, so
//! the page always renders with whatever data is available.

use crate::{
    errors::AppError,
    models::{
        params::BucketParams,
        table::{Page, templates},
    },
    services::gateway_service::{GatewayService, TableResult},
};
use axum::{
    Form, Json,
    extract::{State, rejection::FormRejection},
};

/// GET `/thaw/show` — the thaw page shell.
pub async fn show_thaw() -> Json<Page> {
    tracing::info!("Show thaw page");
    Json(Page::shell(templates::THAW))
}

/// GET `/thaw/show_flush` — the flush page shell.
pub async fn show_flush() -> Json<Page> {
    tracing::info!("Show flushing page");
    Json(Page::shell(templates::FLUSHING))
}

/// GET `/thaw/list_indexes`
pub async fn list_indexes(State(service): State<GatewayService>) -> Json<Page> {
    let listing = service.list_indexes().await;

    Json(Page {
        template: templates::INDEX_LIST.into(),
        indexes: Some(listing.indexes),
        tables: None,
        errors: listing.errors,
    })
}

/// POST `/thaw/list_buckets`
pub async fn list_buckets(
    State(service): State<GatewayService>,
    form: Result<Form<BucketParams>, FormRejection>,
) -> Result<Json<Page>, AppError> {
    let Form(params) = form?;
    Ok(bucket_page(service.list_buckets(&params).await))
}

/// POST `/thaw/list_thawed`
pub async fn list_thawed(
    State(service): State<GatewayService>,
    form: Result<Form<BucketParams>, FormRejection>,
) -> Result<Json<Page>, AppError> {
    let Form(params) = form?;
    Ok(bucket_page(service.list_thawed(&params).await))
}

/// POST `/thaw/thaw`
pub async fn thaw(
    State(service): State<GatewayService>,
    form: Result<Form<BucketParams>, FormRejection>,
) -> Result<Json<Page>, AppError> {
    let Form(params) = form?;
    Ok(bucket_page(service.thaw(&params).await))
}

/// POST `/thaw/flush`
pub async fn flush(
    State(service): State<GatewayService>,
    form: Result<Form<BucketParams>, FormRejection>,
) -> Result<Json<Page>, AppError> {
    let Form(params) = form?;
    Ok(bucket_page(service.flush(&params).await))
}

/// GET `/archiving/show` — indexes and all buckets on one page.
pub async fn show_archiving(State(service): State<GatewayService>) -> Json<Page> {
    let overview = service.overview().await;

    Json(Page {
        template: templates::ARCHIVING.into(),
        indexes: Some(overview.indexes),
        tables: Some(overview.tables),
        errors: overview.errors,
    })
}

fn bucket_page(result: TableResult) -> Json<Page> {
    Json(Page {
        template: templates::BUCKET_LIST.into(),
        indexes: None,
        tables: Some(result.tables),
        errors: result.errors,
    })
}

#[cfg(test)]
mod tests {
    use crate::{
        models::{
            params::BucketParams,
            table::{Page, SUPER_HEADER_KEY, templates},
        },
        routes::routes::routes,
        services::{
            archiver_client::{Endpoint, fake::FakeArchiver},
            gateway_service::{EMPTY_ACTION_RESPONSE, GatewayService},
        },
    };
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use std::sync::Arc;

    fn server(fake: &FakeArchiver) -> TestServer {
        let service = GatewayService::new(Arc::new(fake.clone()));
        TestServer::new(routes().with_state(service)).unwrap()
    }

    #[tokio::test]
    async fn show_pages_have_no_errors() {
        let server = server(&FakeArchiver::new());

        let page = server.get("/thaw/show").await.json::<Page>();
        assert_eq!(page, Page::shell(templates::THAW));

        let page = server.get("/thaw/show_flush").await.json::<Page>();
        assert_eq!(page.template, templates::FLUSHING);
        assert_eq!(page.errors, None);
    }

    #[tokio::test]
    async fn list_indexes_page_is_sorted() {
        let fake = FakeArchiver::new().respond(Endpoint::ListIndexes, 200, r#"["b","a","c"]"#);
        let server = server(&fake);

        let response = server.get("/thaw/list_indexes").await;
        response.assert_status_ok();

        let page = response.json::<Page>();
        assert_eq!(page.template, templates::INDEX_LIST);
        assert_eq!(page.indexes.unwrap(), ["a", "b", "c"]);
        assert_eq!(page.errors, None);
    }

    #[tokio::test]
    async fn archiver_failures_still_render_the_page() {
        let fake = FakeArchiver::new().unreachable(Endpoint::ListIndexes);
        let server = server(&fake);

        let response = server.get("/thaw/list_indexes").await;
        response.assert_status_ok();

        let page = response.json::<Page>();
        assert_eq!(page.indexes.unwrap(), Vec::<String>::new());
        assert!(page.errors.unwrap().mentions("Could not reach"));
    }

    #[tokio::test]
    async fn list_buckets_forwards_form_fields() {
        let fake = FakeArchiver::new().respond(Endpoint::ListBuckets, 200, r#"{"buckets": []}"#);
        let server = server(&fake);

        let form = BucketParams::new("main", "2012-05-05", "2012-05-06");
        let page = server
            .post("/thaw/list_buckets")
            .form(&form)
            .await
            .json::<Page>();

        assert_eq!(page.template, templates::BUCKET_LIST);
        let tables = page.tables.unwrap();
        assert!(tables.contains_key(SUPER_HEADER_KEY));

        let requests = fake.requests();
        let sent = &requests[0];
        assert_eq!(sent.endpoint, Endpoint::ListBuckets);
        assert_eq!(sent.params, form.to_pairs());
    }

    #[tokio::test]
    async fn list_thawed_hits_thaw_list() {
        let fake = FakeArchiver::new().respond(Endpoint::ListThawed, 200, "");
        let server = server(&fake);

        server
            .post("/thaw/list_thawed")
            .form(&BucketParams::default())
            .await
            .assert_status_ok();

        assert_eq!(fake.requests()[0].endpoint, Endpoint::ListThawed);
    }

    #[tokio::test]
    async fn thaw_page_puts_thawed_first() {
        let body = r#"{"failed": [{"bucket":{"bucketName":"x"},"reason":"r"}], "thawed": []}"#;
        let fake = FakeArchiver::new().respond(Endpoint::Thaw, 200, body);
        let server = server(&fake);

        let page = server
            .post("/thaw/thaw")
            .form(&BucketParams::new("main", "2012-05-05", "2012-05-06"))
            .await
            .json::<Page>();

        let tables = page.tables.unwrap();
        let keys: Vec<&str> = tables.keys().map(String::as_str).collect();
        assert_eq!(keys[..2], ["thawed", "failed"]);
        assert_eq!(tables["failed"][0]["bucket_bucketName"], "x");
        assert_eq!(page.errors, None);
    }

    #[tokio::test]
    async fn flush_reports_empty_response() {
        let fake = FakeArchiver::new().respond(Endpoint::Flush, 200, "{}");
        let server = server(&fake);

        let page = server
            .post("/thaw/flush")
            .form(&BucketParams::default())
            .await
            .json::<Page>();

        assert!(page.errors.unwrap().mentions(EMPTY_ACTION_RESPONSE));
        assert_eq!(fake.requests()[0].endpoint, Endpoint::Flush);
    }

    #[tokio::test]
    async fn bucket_routes_reject_non_form_bodies() {
        let fake = FakeArchiver::new();
        let server = server(&fake);

        let response = server.post("/thaw/thaw").text("index=main").await;

        response.assert_status(StatusCode::UNSUPPORTED_MEDIA_TYPE);
        let body = response.json::<serde_json::Value>();
        assert_eq!(body["status"], 415);
        assert!(fake.requests().is_empty());
    }

    #[tokio::test]
    async fn thaw_forwards_trimmed_form_values() {
        let fake = FakeArchiver::new().respond(Endpoint::Thaw, 200, r#"{"thawed": []}"#);
        let server = server(&fake);

        server
            .post("/thaw/thaw")
            .text("index=+main+&from=+")
            .content_type("application/x-www-form-urlencoded")
            .await
            .assert_status_ok();

        let requests = fake.requests();
        assert_eq!(requests[0].endpoint, Endpoint::Thaw);
        assert_eq!(
            requests[0].params,
            vec![("index".to_string(), "main".to_string())]
        );
    }

    #[tokio::test]
    async fn archiving_overview_combines_indexes_and_buckets() {
        let fake = FakeArchiver::new()
            .respond(Endpoint::ListIndexes, 200, r#"["main"]"#)
            .respond(Endpoint::ListBuckets, 200, r#"{"buckets": []}"#);
        let server = server(&fake);

        let page = server.get("/archiving/show").await.json::<Page>();

        assert_eq!(page.template, templates::ARCHIVING);
        assert_eq!(page.indexes.unwrap(), ["main"]);
        assert!(page.tables.unwrap().contains_key("buckets"));
        assert_eq!(page.errors, None);
    }
}
