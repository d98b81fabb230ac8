// SPDX-License-Identifier: MIT

//! `jitrealmd --perfbench`: the one CLI-surface scenario that genuinely
//! needs the compiled binary plus a real world directory, rather than
//! driving `jit-world`/`jit-sandbox` directly.

use std::fs;

use crate::prelude::cli;

const CLOCKWORK_SPIDER: &str = r#"
    (module
        (func $on_load (export "on_load"))
        (func $heartbeat (export "heartbeat"))
        (func $cap_ai_npc (export "cap_ai_npc"))
    )
"#;

#[test]
fn perfbench_prints_a_deterministic_summary_line() {
    let dir = tempfile::tempdir().expect("tempdir");
    let blueprint_dir = dir.path().join("World").join("npcs");
    fs::create_dir_all(&blueprint_dir).expect("mkdir");
    fs::write(blueprint_dir.join("clockwork_spider.wat"), CLOCKWORK_SPIDER).expect("write blueprint");

    cli()
        .env("JITREALM_PATHS_WORLDDIRECTORY", dir.path().join("World"))
        .args(&[
            "--perfbench",
            "--blueprint",
            "npcs/clockwork_spider",
            "--count",
            "5",
            "--ticks",
            "3",
            "--loopDelayMs",
            "1000",
        ])
        .passes()
        .stdout_has("instances=5")
        .stdout_has("ticks=3");
}

#[test]
fn perfbench_without_a_blueprint_fails() {
    let dir = tempfile::tempdir().expect("tempdir");
    cli()
        .env("JITREALM_PATHS_WORLDDIRECTORY", dir.path().join("World"))
        .args(&["--perfbench"])
        .fails();
}
