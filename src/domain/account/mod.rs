//! Account domain module.

mod account;

pub use account::{Account, AccountKind};
