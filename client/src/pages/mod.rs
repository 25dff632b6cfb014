//! Page modules for route-level screens.
//!
//! ARCHITECTURE
//! ============
//! Each page owns route-scoped orchestration (form state, calls into the
//! session store) and is mounted inside `ProtectedRoute` by `app`.

pub mod admin;
pub mod forgot_password;
pub mod home;
pub mod login;
pub mod payments;
pub mod reset_password;
