//! Shared constants for end-to-end tests
//!
//! When the seeded Odoo data changes, update only this file and
//! `fixtures.rs`.

#![allow(dead_code)]

// ============================================================================
// Fake Odoo credentials
// ============================================================================

pub const FAKE_DB: &str = "odoo-test";
pub const FAKE_LOGIN: &str = "mcp-bot@example.com";
pub const FAKE_API_KEY: &str = "test-api-key";
pub const FAKE_UID: i64 = 2;

// ============================================================================
// Seeded records
// ============================================================================

pub const PROJECT_WEBSITE_ID: i64 = 1;
pub const PROJECT_WEBSITE_NAME: &str = "Website Redesign";
pub const PROJECT_ARCHIVED_ID: i64 = 2;
pub const PROJECT_ARCHIVED_NAME: &str = "Legacy Intranet";

pub const USER_ANA_ID: i64 = 7;
pub const USER_ANA_NAME: &str = "Ana Torres";
pub const USER_LUIS_ID: i64 = 8;
pub const USER_LUIS_NAME: &str = "Luis Romero";

pub const TASK_HOMEPAGE_ID: i64 = 11;
pub const TASK_HOMEPAGE_NAME: &str = "Homepage mockups";
pub const TASK_HOMEPAGE_DESCRIPTION: &str = "<p>Three variants for review</p>";
pub const TASK_CHECKOUT_ID: i64 = 12;
pub const TASK_CHECKOUT_NAME: &str = "Checkout flow";

pub const STAGE_IN_PROGRESS_ID: i64 = 3;

pub const PARTNER_ACME_ID: i64 = 21;
pub const SALE_ORDER_ID: i64 = 31;
pub const SALE_ORDER_NAME: &str = "S00031";

// ============================================================================
// Timeouts
// ============================================================================

pub const SERVER_READY_TIMEOUT_MS: u64 = 5000;
pub const SERVER_READY_POLL_INTERVAL_MS: u64 = 20;
pub const REQUEST_TIMEOUT_SECS: u64 = 10;
