// Protected handlers: every route sits behind the JWT middleware and passes
// the authenticated user's id to the repositories.
pub mod auth;
pub mod folders;
pub mod notes;
pub mod tags;
