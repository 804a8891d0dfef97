pub mod login;
pub mod register;

pub use login::login_post;
pub use register::register_post;
