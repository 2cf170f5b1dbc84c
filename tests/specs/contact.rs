// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `robosched contact` end-to-end specs.

use crate::prelude::{first_token, Project};

fn create_contact(project: &Project, name: &str, email: &str) -> String {
    let output = project
        .robosched()
        .args(["contact", "create", "--display-name", name, "--email-address", email])
        .output()
        .expect("run robosched contact create");
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    first_token(&String::from_utf8_lossy(&output.stdout))
}

#[test]
fn create_list_update_delete_round_trips() {
    let project = Project::empty();
    let id = create_contact(&project, "Lab Operator", "operator@example.com");

    let list = project.robosched().args(["contact", "list"]).output().expect("list contacts");
    assert!(String::from_utf8_lossy(&list.stdout).contains("operator@example.com"));

    let update = project
        .robosched()
        .args(["contact", "update", &id, "--display-name", "Senior Operator"])
        .output()
        .expect("update contact");
    assert!(update.status.success());
    assert!(String::from_utf8_lossy(&update.stdout).contains("Senior Operator"));

    let delete = project.robosched().args(["contact", "delete", &id]).output().expect("delete contact");
    assert!(delete.status.success());

    let list_after = project.robosched().args(["contact", "list"]).output().expect("list after delete");
    assert!(!String::from_utf8_lossy(&list_after.stdout).contains("operator@example.com"));
}

#[test]
fn create_rejects_invalid_email() {
    let project = Project::empty();
    let output = project
        .robosched()
        .args(["contact", "create", "--display-name", "Bad Email", "--email-address", "not-an-email"])
        .output()
        .expect("run robosched contact create");
    assert!(String::from_utf8_lossy(&output.stderr).contains("email_address"));
}
