pub mod replies;
pub mod router;
pub mod server;
