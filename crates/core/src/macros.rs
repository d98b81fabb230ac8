// SPDX-License-Identifier: MIT

//! Small declarative-macro helpers shared across the workspace.

/// Implements `Display` by delegating to an inner field's `Display`.
macro_rules! simple_display {
    ($ty:ident, $field:ident) => {
        impl std::fmt::Display for $ty {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                std::fmt::Display::fmt(&self.$field, f)
            }
        }
    };
}

pub(crate) use simple_display;
