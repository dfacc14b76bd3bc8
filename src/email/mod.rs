//! Guest email: template rendering, dispatch and the send log.

pub mod mailer;
pub mod models;
pub mod queries;
pub mod template;

pub use mailer::Mailer;
pub use template::render_template;
