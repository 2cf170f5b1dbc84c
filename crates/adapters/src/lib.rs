// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! robosched-adapters: adapters against the outside world — SMTP, the
//! vendor's SQL Server database, the host process table, and the
//! machine-scoped secret cipher protecting the SMTP password at rest.

pub mod notify;
pub mod process_monitor;
pub mod secret_cipher;
pub mod vendor_db;

pub use notify::{NotifyAdapter, NotifyError, OutboundEmail, SmtpNotifyAdapter};
#[cfg(any(test, feature = "test-support"))]
pub use notify::FakeNotifyAdapter;

pub use process_monitor::{ProcessMonitor, SysinfoProcessMonitor, DEFAULT_CHECK_INTERVAL};
#[cfg(any(test, feature = "test-support"))]
pub use process_monitor::FakeProcessMonitor;

pub use secret_cipher::{decrypt_to_string, decrypt_with_machine_id, encrypt, encrypt_with_machine_id, machine_id, SecretCipherError};

pub use vendor_db::{TiberiusVendorDbAdapter, VendorDbAdapter, VendorDbError, CONNECT_TIMEOUT};
#[cfg(any(test, feature = "test-support"))]
pub use vendor_db::FakeVendorDbAdapter;
