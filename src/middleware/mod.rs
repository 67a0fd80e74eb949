pub mod auth;
pub mod method_override;
pub mod response;
pub mod session;

pub use auth::ensure_authenticated;
pub use method_override::method_override;
pub use response::{page, redirect_with};
pub use session::session_middleware;
