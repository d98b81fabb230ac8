// SPDX-License-Identifier: MIT

//! Input-layer errors: malformed command, unknown command, bad argument,
//! ambiguous target — reported to the session as a one-line message,
//! never fatal. Nothing in this crate returns a `Fatal` error; that
//! classification belongs to the safe invoker, not the dispatcher.

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("unknown command: {0:?}")]
    Unknown(String),
    #[error("that command is restricted to wizards")]
    WizardOnly,
    #[error("{0}")]
    BadArgument(String),
    #[error("a command with that name is already registered: {0:?}")]
    DuplicateName(String),
}
