//! RemoteAdapter against an in-process HTTP server.

use std::convert::Infallible;
use std::sync::Arc;
use std::sync::Mutex;

use edittable_lib::adapter::RemoteAdapter;
use edittable_lib::adapter::TableAdapter;
use edittable_lib::controller::TableConfig;
use edittable_lib::controller::TableController;
use edittable_lib::error::AdapterError;
use edittable_lib::model::Column;
use edittable_lib::model::Row;
use edittable_lib::model::RowId;
use edittable_lib::query::Direction;
use edittable_lib::query::PageRequest;
use edittable_lib::query::SortSpec;
use http_body_util::BodyExt;
use http_body_util::Full;
use hyper::Request;
use hyper::Response;
use hyper::body::Bytes;
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use tokio::net::TcpListener;

#[derive(Debug, Clone, PartialEq)]
struct Recorded {
    method: String,
    target: String,
    body: String,
}

type Handler = fn(&str, &str) -> (u16, String);
type Log = Arc<Mutex<Vec<Recorded>>>;

/// Starts a server answering with `handler`; returns the endpoint URL.
async fn serve(handler: Handler) -> (String, Log) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let log: Log = Arc::default();
    let server_log = log.clone();

    tokio::spawn(async move {
        while let Ok((stream, _)) = listener.accept().await {
            let log = server_log.clone();
            tokio::spawn(async move {
                let service = service_fn(move |req: Request<Incoming>| {
                    let log = log.clone();
                    async move {
                        let method = req.method().to_string();
                        let target = req
                            .uri()
                            .path_and_query()
                            .map(|p| p.to_string())
                            .unwrap_or_default();
                        let bytes = req.into_body().collect().await.unwrap().to_bytes();
                        let body = String::from_utf8_lossy(&bytes).to_string();
                        log.lock().unwrap().push(Recorded {
                            method: method.clone(),
                            target: target.clone(),
                            body,
                        });

                        let (status, reply) = handler(&method, &target);
                        Ok::<_, Infallible>(
                            Response::builder()
                                .status(status)
                                .header("Content-Type", "application/json")
                                .body(Full::new(Bytes::from(reply)))
                                .unwrap(),
                        )
                    }
                });
                let _ = http1::Builder::new()
                    .serve_connection(TokioIo::new(stream), service)
                    .await;
            });
        }
    });

    (format!("http://{}/api/items", addr), log)
}

fn items_api(method: &str, target: &str) -> (u16, String) {
    match (method, target) {
        ("GET", t) if t.starts_with("/api/items/all") => (
            200,
            r#"{"page": 2, "limit": 10, "total": 12, "lastPage": 2,
                "items": [{"id": 11, "name": "Eleven"}, {"id": 12, "name": "Twelve"}]}"#
                .to_string(),
        ),
        ("POST", "/api/items/add") => (201, r#"{"id": 42, "name": "Widget"}"#.to_string()),
        ("PUT", t) if t.starts_with("/api/items/update/") => (200, String::new()),
        ("DELETE", "/api/items/delete/11") => (204, String::new()),
        ("DELETE", _) => (404, "no such row".to_string()),
        ("GET", "/api/items/syncall") => (200, String::new()),
        ("GET", t) if t.starts_with("/api/items/sync/") => (500, "upstream down".to_string()),
        _ => (404, "not found".to_string()),
    }
}

fn columns() -> Vec<Column> {
    vec![
        Column::text("name", "Name"),
        Column::text("code", "Code").read_only(),
        Column::checkbox("is_active", "Active"),
    ]
}

async fn adapter() -> (RemoteAdapter, Log) {
    let (url, log) = serve(items_api).await;
    let adapter = RemoteAdapter::builder().url(url).columns(columns()).build().unwrap();
    (adapter, log)
}

fn last(log: &Log) -> Recorded {
    log.lock().unwrap().last().cloned().unwrap()
}

#[tokio::test]
async fn test_fetch_page() {
    let (adapter, log) = adapter().await;
    let request = PageRequest::new(2, 10).with_sort(
        SortSpec::new()
            .then("name", Direction::Desc)
            .then("is_active", Direction::Asc),
    );

    let page = adapter.fetch_page(&request).await.unwrap();
    assert_eq!(page.total, 12);
    assert_eq!(page.last_page, 2);
    assert_eq!(page.items.len(), 2);
    assert_eq!(page.items[0].id(), &RowId::Int(11));

    assert_eq!(
        last(&log).target,
        "/api/items/all?page=2&limit=10&sortFields=name&sortOrders=desc&sortFields=is_active&sortOrders=asc"
    );
}

#[tokio::test]
async fn test_add_update_delete() {
    let (adapter, log) = adapter().await;
    let row = Row::new(7)
        .with("name", "Widget")
        .with("code", "W-1")
        .with("is_active", true);

    let id = adapter.add_row(&row).await.unwrap();
    assert_eq!(id, Some(RowId::Int(42)));
    let add = last(&log);
    assert_eq!(add.method, "POST");
    assert_eq!(add.body, "name=Widget&code=W-1&is_active=true");

    adapter.update_row(&row).await.unwrap();
    let update = last(&log);
    assert_eq!(update.method, "PUT");
    assert_eq!(update.target, "/api/items/update/7");
    assert_eq!(update.body, "name=Widget&is_active=true");

    adapter.delete_row(&RowId::Int(11)).await.unwrap();
    assert_eq!(last(&log).target, "/api/items/delete/11");
}

#[tokio::test]
async fn test_error_carries_body() {
    let (adapter, _) = adapter().await;

    let err = adapter.delete_row(&RowId::Int(99)).await.unwrap_err();
    match err {
        AdapterError::Http { status, message } => {
            assert_eq!(status, 404);
            assert_eq!(message, "no such row");
        }
        other => panic!("unexpected error: {other:?}"),
    }

    let err = adapter.sync_row(&RowId::Int(1)).await.unwrap_err();
    assert_eq!(err.status_code(), Some(500));
    adapter.sync_all().await.unwrap();
}

#[tokio::test]
async fn test_network_failure() {
    let adapter = RemoteAdapter::builder()
        .url("http://127.0.0.1:1/api/items")
        .build()
        .unwrap();
    let err = adapter.fetch_page(&PageRequest::new(1, 10)).await.unwrap_err();
    assert!(matches!(err, AdapterError::Network(_)));
}

#[tokio::test]
async fn test_controller_over_remote() {
    let (adapter, log) = adapter().await;
    let table = TableController::open(adapter, columns(), TableConfig::default()).await;

    // the server answers page 2 whatever was asked
    assert_eq!(table.pagination().page, 2);
    assert_eq!(table.rows().len(), 2);

    let id = table.add_new_row().unwrap();
    assert_eq!(id, RowId::Int(13));
    table.change_field(&id, "name", "Widget").unwrap();
    assert_eq!(table.save(&id).await.unwrap(), RowId::Int(42));

    let requests = log.lock().unwrap().clone();
    let methods: Vec<&str> = requests.iter().map(|r| r.method.as_str()).collect();
    assert_eq!(methods, ["GET", "POST", "GET"]);
    assert_eq!(requests[1].body, "name=Widget&code=&is_active=false");
}
