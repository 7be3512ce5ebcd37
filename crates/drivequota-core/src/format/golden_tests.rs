//! Golden tests for dashboard output.
//!
//! These tests use insta inline snapshots to keep the terminal layout stable.
//! Run with `cargo insta review` to update snapshots after intentional changes.

use serde_json::json;

use crate::account::LinkedAccount;
use crate::dashboard::{AccountQuota, Dashboard};
use crate::format::{DashboardFormatter, FormatOptions};
use crate::quota::QuotaResult;

const MIB: u64 = 1 << 20;
const GIB: u64 = 1 << 30;

fn account(id: &str, email: Option<&str>) -> LinkedAccount {
    let account = LinkedAccount::google("alice", id);
    match email {
        Some(email) => account.with_email(email),
        None => account,
    }
}

fn fetched(id: &str, email: &str, usage: u64, limit: Option<u64>) -> AccountQuota {
    AccountQuota::from_outcome::<String>(
        account(id, Some(email)),
        Ok(QuotaResult::from_reported(Some(usage), limit)),
    )
}

fn failed(id: &str, message: &str) -> AccountQuota {
    AccountQuota::from_outcome(account(id, None), Err(message))
}

#[test]
fn tty_two_finite_accounts() {
    let dashboard = Dashboard::new(vec![
        fetched("1", "alice@example.com", 4 * GIB, Some(15 * GIB)),
        fetched("2", "work@example.com", GIB, Some(15 * GIB)),
    ]);
    let output = DashboardFormatter::default().format_tty(&dashboard);

    insta::assert_snapshot!(output, @r"
    alice@example.com: 4.0 GB used of 15.0 GB (27%), 11.0 GB free
    work@example.com: 1.0 GB used of 15.0 GB (7%), 14.0 GB free

    Total: 5.0 GB used of 30.0 GB (17%), 25.0 GB free
    ");
}

#[test]
fn tty_unlimited_account() {
    let dashboard = Dashboard::new(vec![
        fetched("1", "edu@example.edu", 3 * GIB, None),
        fetched("2", "alice@example.com", GIB, Some(15 * GIB)),
    ]);
    let output = DashboardFormatter::default().format_tty(&dashboard);

    insta::assert_snapshot!(output, @r"
    edu@example.edu: 3.0 GB used of unlimited
    alice@example.com: 1.0 GB used of 15.0 GB (7%), 14.0 GB free

    Total: 4.0 GB used of unlimited
    ");
}

#[test]
fn tty_partial_failure() {
    let dashboard = Dashboard::new(vec![
        fetched("1", "alice@example.com", 4 * GIB, Some(15 * GIB)),
        failed("broken", "[google:broken] network_error: request timeout"),
        fetched("2", "work@example.com", GIB, Some(15 * GIB)),
    ]);
    let output = DashboardFormatter::default().format_tty(&dashboard);

    insta::assert_snapshot!(output, @r"
    alice@example.com: 4.0 GB used of 15.0 GB (27%), 11.0 GB free
    broken: error: [google:broken] network_error: request timeout
    work@example.com: 1.0 GB used of 15.0 GB (7%), 14.0 GB free

    Total: 5.0 GB used of 30.0 GB (17%), 25.0 GB free
    1 of 3 accounts could not be read and are not included.
    ");
}

#[test]
fn tty_over_quota_and_breakdown() {
    let quota = QuotaResult::from_reported(Some(16 * GIB), Some(15 * GIB))
        .with_breakdown(Some(3 * GIB), Some(512 * MIB));
    let dashboard = Dashboard::new(vec![AccountQuota::from_outcome::<String>(
        account("1", Some("full@example.com")),
        Ok(quota),
    )]);
    let formatter = DashboardFormatter::new(FormatOptions {
        show_breakdown: true,
        ..Default::default()
    });

    insta::assert_snapshot!(formatter.format_tty(&dashboard), @r"
    full@example.com: 16.0 GB used of 15.0 GB (107%), -1.0 GB free [drive 3.0 GB, trash 512.0 MB]

    Total: 16.0 GB used of 15.0 GB (107%), -1.0 GB free
    ");
}

#[test]
fn json_items_and_total() {
    let dashboard = Dashboard::new(vec![
        fetched("1", "alice@example.com", 1024, Some(4096)),
        failed("2", "[google:2] missing_refresh_token: no refresh token"),
    ]);
    let output = DashboardFormatter::default()
        .format_json(&dashboard)
        .unwrap();
    let value: serde_json::Value = serde_json::from_str(&output).unwrap();

    assert_eq!(
        value,
        json!({
            "items": [
                {
                    "account": {
                        "user": "alice",
                        "provider": "google",
                        "account_id": "1",
                        "email": "alice@example.com"
                    },
                    "quota": {
                        "usage_bytes": 1024,
                        "limit_bytes": 4096,
                        "remaining_bytes": 3072,
                        "percent_used": 25,
                        "usage": "1.0 KB",
                        "limit": "4.0 KB",
                        "remaining": "3.0 KB"
                    },
                    "error": null
                },
                {
                    "account": {
                        "user": "alice",
                        "provider": "google",
                        "account_id": "2"
                    },
                    "quota": null,
                    "error": "[google:2] missing_refresh_token: no refresh token"
                }
            ],
            "total": {
                "total_used": 1024,
                "total_limit": 4096,
                "total_remaining": 3072,
                "percent_used": 25,
                "accounts_counted": 1,
                "accounts_failed": 1,
                "used": "1.0 KB",
                "limit": "4.0 KB",
                "remaining": "3.0 KB"
            }
        })
    );
}

#[test]
fn json_unlimited_total_is_null() {
    let dashboard = Dashboard::new(vec![fetched("1", "edu@example.edu", GIB, None)]);
    let output = DashboardFormatter::default()
        .format_json(&dashboard)
        .unwrap();
    let value: serde_json::Value = serde_json::from_str(&output).unwrap();

    assert_eq!(value["total"]["total_limit"], serde_json::Value::Null);
    assert_eq!(value["total"]["percent_used"], serde_json::Value::Null);
    assert_eq!(value["total"]["limit"], "unlimited");
    assert_eq!(value["items"][0]["quota"]["remaining"], serde_json::Value::Null);
}
