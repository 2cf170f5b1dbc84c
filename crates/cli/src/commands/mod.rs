// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! One module per §6.5 operation group, mirroring the teacher's
//! per-entity `XArgs`/`XCommand` command layout.

pub mod conflicts;
pub mod contact;
pub mod history;
pub mod notifications;
pub mod recovery;
pub mod scheduler;
pub mod schedule;
pub mod upcoming;
