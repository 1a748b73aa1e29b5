mod auth;
mod deploy;
mod recall;

pub use auth::*;
pub use deploy::*;
pub use recall::*;
