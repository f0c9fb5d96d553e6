//! # Print Service
//!
//! The connection manager and HTTP API against an in-memory printer.

mod common;

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode};
use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use tower::ServiceExt;

use common::{FakeConnector, Wire, fast_profile};
use stocklabel::label::{Label, RasterSource, builder};
use stocklabel::protocol::status::STATUS_REQUEST;
use stocklabel::render::page::ImageRenderer;
use stocklabel::server::{self, AppState, ServerConfig};
use stocklabel::transport::{PrintService, PrinterDevice, StaticPermissions};

fn service(connector: FakeConnector) -> PrintService<FakeConnector> {
    PrintService::new(
        connector,
        Arc::new(StaticPermissions::granted()),
        fast_profile(),
    )
}

#[test]
fn concurrent_prints_never_interleave() {
    let wire = Arc::new(Wire::default());
    let service = Arc::new(service(FakeConnector {
        wire: wire.clone(),
        reply: Vec::new(),
        write_delay: Duration::from_micros(200),
    }));
    let device = PrinterDevice::new("00:11:62:AA:BB:CC");

    let labels: Vec<Label> = (0..6)
        .map(|i| Label::fixed_text(format!("BIN-{:02}", i), Some("Shelf label")))
        .collect();

    let handles: Vec<_> = labels
        .iter()
        .cloned()
        .map(|label| {
            let service = service.clone();
            let device = device.clone();
            thread::spawn(move || service.print(&device, &label).unwrap())
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    // One link for all jobs
    assert_eq!(wire.connects(), 1);

    // The wire is a sequence of (probe, whole label) pairs in some order
    let mut remaining: Vec<Vec<u8>> = labels
        .iter()
        .map(|l| builder::build(l, &fast_profile()).unwrap().to_bytes())
        .collect();
    let bytes = wire.bytes();
    let mut rest = bytes.as_slice();
    while !rest.is_empty() {
        assert!(rest.starts_with(STATUS_REQUEST), "job did not start with a probe");
        rest = &rest[STATUS_REQUEST.len()..];
        let i = remaining
            .iter()
            .position(|job| rest.starts_with(job))
            .expect("label bytes interleaved");
        rest = &rest[remaining[i].len()..];
        remaining.remove(i);
    }
    assert!(remaining.is_empty());
}

#[test]
fn printer_fault_is_reported_and_nothing_printed() {
    let wire = Arc::new(Wire::default());
    let service = service(FakeConnector {
        wire: wire.clone(),
        reply: b"HEAD OPEN\r\n".to_vec(),
        ..Default::default()
    });
    let device = PrinterDevice::new("/dev/rfcomm0");

    let err = service
        .print(&device, &Label::fixed_text("A1", None))
        .unwrap_err();
    assert_eq!(err.to_string(), "Printer not ready: printer door is open");
    assert_eq!(wire.bytes(), STATUS_REQUEST);

    // The link survives for the next attempt
    assert!(service.status(&device).is_ok());
    assert_eq!(wire.connects(), 1);
}

// ============================================================================
// HTTP API
// ============================================================================

fn app(connector: FakeConnector, default_device: Option<&str>) -> axum::Router {
    let config = ServerConfig {
        listen_addr: "127.0.0.1:0".to_string(),
        default_device: default_device.map(PrinterDevice::new),
    };
    let source = RasterSource::new(Arc::new(ImageRenderer)).unwrap();
    server::router(Arc::new(AppState::new(config, service(connector), source)))
}

async fn post(app: axum::Router, uri: &str, body: Value) -> (StatusCode, Vec<u8>) {
    let request = Request::post(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, body.to_vec())
}

#[tokio::test]
async fn http_print_returns_job_id() {
    let wire = Arc::new(Wire::default());
    let app = app(
        FakeConnector {
            wire: wire.clone(),
            ..Default::default()
        },
        None,
    );

    let (status, body) = post(
        app,
        "/api/labels/print",
        json!({
            "device": { "address": "00:11:62:AA:BB:CC" },
            "job": { "type": "fixed_text", "barcode": "A-17", "caption": "Returns" }
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let body: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["job_id"].as_str().unwrap().len(), 36);

    let sent = body["bytes"].as_u64().unwrap() as usize;
    assert_eq!(wire.bytes().len(), STATUS_REQUEST.len() + sent);
}

#[tokio::test]
async fn http_preview_lists_commands() {
    let app = app(FakeConnector::default(), None);
    let (status, body) = post(
        app,
        "/api/labels/preview",
        json!({ "job": { "type": "fixed_text", "barcode": "A-17", "style": "compact" } }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let listing = String::from_utf8(body).unwrap();
    assert!(listing.contains("BARCODE 24,8,\"128\",170,0,0,2,3,\"A-17\"\n"));
    assert!(listing.ends_with("PRINT 1,1\n"));
}

#[tokio::test]
async fn http_status_reports_reason() {
    let app = app(
        FakeConnector {
            reply: b"Paper Out".to_vec(),
            ..Default::default()
        },
        Some("/dev/rfcomm0"),
    );
    let (status, body) = post(app, "/api/printer/status", json!({})).await;

    assert_eq!(status, StatusCode::OK);
    let body: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body, json!({ "ready": false, "reason": "paper_out" }));
}

#[tokio::test]
async fn http_not_ready_is_conflict() {
    let app = app(
        FakeConnector {
            reply: b"PAUSE".to_vec(),
            ..Default::default()
        },
        Some("/dev/rfcomm0"),
    );
    let (status, body) = post(
        app,
        "/api/labels/print",
        json!({ "job": { "type": "fixed_text", "barcode": "A-17" } }),
    )
    .await;

    assert_eq!(status, StatusCode::CONFLICT);
    let body: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body["success"], json!(false));
}

#[tokio::test]
async fn http_missing_device_is_bad_request() {
    let app = app(FakeConnector::default(), None);
    let (status, _) = post(
        app,
        "/api/labels/print",
        json!({ "job": { "type": "fixed_text", "barcode": "A-17" } }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn http_failed_download_is_failed_dependency() {
    let wire = Arc::new(Wire::default());
    let app = app(
        FakeConnector {
            wire: wire.clone(),
            ..Default::default()
        },
        Some("/dev/rfcomm0"),
    );
    let (status, _) = post(
        app,
        "/api/labels/print",
        json!({ "job": {
            "type": "raster_image", "pdf_url": "/nonexistent/label.pdf",
            "width_mm": 100, "height_mm": 150, "dpi": 203
        } }),
    )
    .await;

    assert_eq!(status, StatusCode::FAILED_DEPENDENCY);
    assert_eq!(wire.connects(), 0);
}

#[tokio::test]
async fn http_oversized_raster_is_bad_request() {
    let wire = Arc::new(Wire::default());
    let app = app(
        FakeConnector {
            wire: wire.clone(),
            ..Default::default()
        },
        Some("/dev/rfcomm0"),
    );
    let (status, _) = post(
        app,
        "/api/labels/print",
        json!({ "job": {
            "type": "raster_image", "pdf_url": "https://labels.invalid/huge.pdf",
            "width_mm": 1.0e7, "height_mm": 1.0e7, "dpi": 203
        } }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(wire.connects(), 0);
}
