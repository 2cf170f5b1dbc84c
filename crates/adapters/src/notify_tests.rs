// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[tokio::test]
async fn fake_adapter_records_sent_email() {
    let adapter = FakeNotifyAdapter::new();
    let settings = NotificationSettings::builder().build();
    let email = OutboundEmail {
        recipients: vec!["ops@example.com".into()],
        subject: "Experiment aborted".into(),
        body: "run 42 aborted".into(),
    };
    adapter.send(&settings, &email).await.unwrap();
    let calls = adapter.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].subject, "Experiment aborted");
}

#[tokio::test]
async fn fake_adapter_can_simulate_failure() {
    let adapter = FakeNotifyAdapter::new();
    adapter.fail_next_send();
    let settings = NotificationSettings::builder().build();
    let email = OutboundEmail { recipients: vec!["ops@example.com".into()], subject: "x".into(), body: "y".into() };
    assert!(adapter.send(&settings, &email).await.is_err());
    assert!(adapter.calls().is_empty());
}

#[test]
fn tls_and_ssl_both_set_prefers_starttls_path() {
    // use_ssl && use_tls both true; spec §4.G clears use_tls, so the
    // implicit-TLS branch must NOT be selected.
    let settings = NotificationSettings::builder().use_tls(true).use_ssl(true).build();
    let use_ssl = settings.use_ssl && !settings.use_tls;
    assert!(!use_ssl);
}
