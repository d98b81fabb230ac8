// SPDX-License-Identifier: MIT

//! `jitrealmd --help`: genuinely spawns the compiled binary rather than
//! driving library APIs.

use crate::prelude::cli;

#[test]
fn help_lists_the_three_modes() {
    cli()
        .args(&["--help"])
        .passes()
        .stdout_has("--server")
        .stdout_has("--perfbench")
        .stdout_has("--player");
}
