// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `robosched recovery` end-to-end specs (spec §4.H).

use crate::prelude::{first_token, Project};

fn create_schedule(project: &Project, name: &str) -> String {
    let output = project
        .robosched()
        .args([
            "schedule",
            "create",
            "--experiment-name",
            name,
            "--experiment-path",
            "C:/vendor/methods/run.med",
            "--schedule-type",
            "once",
            "--start-time",
            "2026-08-01T09:00:00",
            "--estimated-duration-minutes",
            "30",
            "--created-by",
            "spec-harness",
        ])
        .output()
        .expect("create schedule");
    assert!(output.status.success());
    first_token(&String::from_utf8_lossy(&output.stdout))
}

#[test]
fn mark_then_resolve_clears_global_state() {
    let project = Project::empty();
    let id = create_schedule(&project, "recovery-spec-1");

    let mark = project
        .robosched()
        .args(["recovery", "mark", &id, "--note", "vendor abort", "--actor", "operator"])
        .output()
        .expect("mark recovery");
    assert!(mark.status.success(), "stderr: {}", String::from_utf8_lossy(&mark.stderr));
    assert!(String::from_utf8_lossy(&mark.stdout).contains("recovery_required=true"));

    let status_during = project.robosched().args(["recovery", "status"]).output().expect("recovery status");
    assert!(String::from_utf8_lossy(&status_during.stdout).contains("active=true"));

    let resolve = project
        .robosched()
        .args(["recovery", "resolve", &id, "--actor", "operator"])
        .output()
        .expect("resolve recovery");
    assert!(resolve.status.success());
    assert!(String::from_utf8_lossy(&resolve.stdout).contains("recovery_required=false"));

    let status_after = project.robosched().args(["recovery", "status"]).output().expect("recovery status after");
    assert!(String::from_utf8_lossy(&status_after.stdout).contains("active=false"));
}
