use anyhow::Result;
use autopro::app::admin::{export_bookings_csv, recent_bookings, BookingAdmin, BookingFilter, DashboardStats};
use autopro::domain::model::BookingStatus;
use autopro::domain::ports::{KeyValueStore, AUTH_TOKEN_KEY, USER_KEY};
use autopro::{ApiClient, MemoryStore, RentalError};
use chrono::NaiveDate;
use httpmock::prelude::*;
use serde_json::json;
use std::sync::Arc;
use tempfile::TempDir;

fn admin_store() -> Result<Arc<MemoryStore>> {
    let store = Arc::new(MemoryStore::new());
    store.set(AUTH_TOKEN_KEY, "admin-token")?;
    store.set(
        USER_KEY,
        r#"{"id":"U0","name":"Admin","email":"admin@autorent.ru","role":"admin"}"#,
    )?;
    Ok(store)
}

fn booking(id: &str, customer: &str, email: &str, start: &str, end: &str, status: &str, paid: bool, created: &str) -> serde_json::Value {
    json!({
        "id": id,
        "customerName": customer,
        "customerEmail": email,
        "customerPhone": "+7 900 000-00-00",
        "carId": "CAR001",
        "carName": "Toyota Camry",
        "startDate": start,
        "endDate": end,
        "status": status,
        "totalPrice": 10500,
        "paymentStatus": if paid { "paid" } else { "pending" },
        "createdAt": created
    })
}

fn bookings_payload() -> serde_json::Value {
    json!([
        booking("B1001", "Ivan Petrov", "ivan@example.com", "2025-05-01", "2025-05-04", "active", true, "2025-04-20T09:00:00"),
        booking("B1002", "Anna Smirnova", "anna@example.com", "2025-05-03", "2025-05-10", "pending", false, "2025-04-28T15:30:00"),
        booking("B1003", "Ivan Petrov", "ivan@example.com", "2025-05-12", "2025-05-15", "confirmed", true, "2025-05-02T11:00:00"),
        booking("B1004", "Oleg Ivanov", "oleg@example.com", "2025-05-05", "2025-05-06", "cancelled", true, "2025-04-30T08:15:00")
    ])
}

#[tokio::test]
async fn test_admin_filters_and_bulk_updates() -> Result<()> {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/bookings").header("Authorization", "Bearer admin-token");
        then.status(200).json_body(bookings_payload());
    });
    let ok_update = server.mock(|when, then| {
        when.method(PUT)
            .path("/bookings/B1001")
            .json_body(json!({"status": "completed"}));
        then.status(200).json_body(booking(
            "B1001", "Ivan Petrov", "ivan@example.com", "2025-05-01", "2025-05-04", "completed", true, "2025-04-20T09:00:00",
        ));
    });
    let failed_update = server.mock(|when, then| {
        when.method(PUT).path("/bookings/B1003");
        then.status(500).body("database unavailable");
    });

    let client = ApiClient::new(server.base_url(), admin_store()?);
    let admin = BookingAdmin::new(&client)?;

    let filter = BookingFilter {
        search: Some("petrov".to_string()),
        ..Default::default()
    };
    let petrov = admin.list(None, &filter).await?;
    assert_eq!(petrov.len(), 2);

    let on_may_4 = BookingFilter {
        date: NaiveDate::from_ymd_opt(2025, 5, 4),
        ..Default::default()
    };
    let ids: Vec<String> = admin.list(None, &on_may_4).await?.into_iter().map(|b| b.id).collect();
    assert_eq!(ids, vec!["B1001", "B1002"]);

    let targets: Vec<String> = petrov.iter().map(|b| b.id.clone()).collect();
    let report = admin.bulk_set_status(&targets, BookingStatus::Completed).await;
    ok_update.assert();
    failed_update.assert();
    assert_eq!(report.updated.len(), 1);
    assert_eq!(report.updated[0].status, BookingStatus::Completed);
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].0, "B1003");
    Ok(())
}

#[tokio::test]
async fn test_confirm_and_cancel_endpoints() -> Result<()> {
    let server = MockServer::start();
    let confirm = server.mock(|when, then| {
        when.method(POST).path("/bookings/B1002/confirm");
        then.status(200).json_body(json!({"success": true}));
    });
    let cancel = server.mock(|when, then| {
        when.method(POST)
            .path("/bookings/B1002/cancel")
            .json_body(json!({"reason": "car unavailable"}));
        then.status(200).json_body(json!({"success": true}));
    });

    let client = ApiClient::new(server.base_url(), admin_store()?);
    let admin = BookingAdmin::new(&client)?;
    admin.confirm("B1002").await?;
    admin.cancel("B1002", "  car unavailable ").await?;

    confirm.assert();
    cancel.assert();
    Ok(())
}

#[tokio::test]
async fn test_non_admin_is_sent_to_login() -> Result<()> {
    let store = Arc::new(MemoryStore::new());
    store.set(AUTH_TOKEN_KEY, "user-token")?;
    store.set(
        USER_KEY,
        r#"{"id":"U5","name":"Anna","email":"anna@example.com","role":"manager"}"#,
    )?;
    let client = ApiClient::new("http://localhost:1", store);

    match BookingAdmin::new(&client) {
        Err(RentalError::Unauthorized { redirect, from }) => {
            assert_eq!(redirect, "/login");
            assert_eq!(from.as_deref(), Some("/admin/bookings"));
        }
        Err(other) => panic!("unexpected error: {:?}", other),
        Ok(_) => panic!("manager must not reach the admin area"),
    }
    Ok(())
}

#[tokio::test]
async fn test_dashboard_and_export() -> Result<()> {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/bookings");
        then.status(200).json_body(bookings_payload());
    });

    let client = ApiClient::new(server.base_url(), admin_store()?);
    let bookings = BookingAdmin::new(&client)?.list(None, &BookingFilter::default()).await?;

    let stats = DashboardStats::compute(&[], &bookings, NaiveDate::from_ymd_opt(2025, 5, 1).unwrap());
    assert_eq!(stats.active_bookings, 2);
    assert_eq!(stats.total_customers, 3);
    // B1001 and B1003 are paid and live; B1004 is cancelled
    assert_eq!(stats.monthly_revenue, 21000.0);

    let recent: Vec<&str> = recent_bookings(&bookings, 2).iter().map(|b| b.id.as_str()).collect();
    assert_eq!(recent, vec!["B1003", "B1004"]);

    let temp_dir = TempDir::new()?;
    let path = temp_dir.path().join("bookings.csv");
    let rows = export_bookings_csv(&bookings, std::fs::File::create(&path)?)?;
    assert_eq!(rows, 4);

    let mut reader = csv::Reader::from_path(&path)?;
    let records: Vec<csv::StringRecord> = reader.records().collect::<std::result::Result<_, _>>()?;
    assert_eq!(records.len(), 4);
    assert_eq!(&records[1][0], "B1002");
    // 7 days, 10500 total
    assert_eq!(&records[1][7], "7");
    assert_eq!(&records[1][8], "1500.0");
    Ok(())
}
