//! Access Control Domain
//!
//! User accounts of the back office, their roles, and the single table that
//! decides what each role may do.
//!
//! # Roles
//!
//! | role         | scope                                                |
//! |--------------|------------------------------------------------------|
//! | `superadmin` | everything, including other administrators           |
//! | `admin`      | everything except superadmin assignment and accounts |
//! |              | above `register` other than its own                  |
//! | `register`   | day-to-day data entry, no deletions, no users        |
//!
//! Permissions live in [`permissions`]; handlers ask it instead of comparing
//! role names.
//!
//! # Example
//!
//! ```rust,ignore
//! use domain_access::{Action, Role, permissions};
//!
//! assert!(permissions::is_allowed(Role::Admin, Action::PoliciesDelete));
//! assert!(!permissions::is_allowed(Role::Register, Action::PoliciesDelete));
//! ```

pub mod role;
pub mod permissions;
pub mod user;
pub mod password;
pub mod error;
pub mod ports;
pub mod services;

pub use role::Role;
pub use permissions::{Action, Actor};
pub use user::{User, NewUser, UserUpdate, UserView};
pub use password::{hash_password, verify_password};
pub use error::AccessError;
pub use ports::UserPort;
pub use services::UserService;
#[cfg(any(test, feature = "mock"))]
pub use ports::mock::MockUserPort;
