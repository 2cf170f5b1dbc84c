// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `robosched notifications` end-to-end specs (spec §4.G).

use crate::prelude::Project;

#[test]
fn settings_update_then_get_redacts_password() {
    let project = Project::empty();

    let update = project
        .robosched()
        .args([
            "notifications",
            "settings-update",
            "--smtp-host",
            "smtp.example.com",
            "--smtp-port",
            "587",
            "--smtp-username",
            "scheduler@example.com",
            "--smtp-password",
            "hunter2",
            "--sender-address",
            "scheduler@example.com",
            "--recipient",
            "oncall@example.com",
        ])
        .output()
        .expect("update settings");
    assert!(update.status.success(), "stderr: {}", String::from_utf8_lossy(&update.stderr));

    let get = project.robosched().args(["notifications", "settings-get"]).output().expect("get settings");
    assert!(get.status.success());
    let stdout = String::from_utf8_lossy(&get.stdout);
    assert!(stdout.contains("smtp.example.com"));
    assert!(!stdout.contains("hunter2"), "plaintext password leaked in settings-get output");
}

#[test]
fn send_test_to_unknown_contact_is_a_no_op_not_an_error() {
    let project = Project::empty();
    let unknown_id = "00000000-0000-0000-0000-000000000000";

    let output = project
        .robosched()
        .args(["notifications", "send-test", "--contact", unknown_id])
        .output()
        .expect("send test notification");
    // Dispatch treats an unresolvable contact id as "no active contacts"
    // and returns Ok without attempting SMTP (spec §4.G step 2).
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
}
