// handlers/mod.rs - Route handlers
//
// Public: landing page, user accounts, health
// Gated (ensure_authenticated): academic-year mutations and every annexure route
pub mod academic_year;
pub mod access;
pub mod annexure;
pub mod health;
pub mod users;
