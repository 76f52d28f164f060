pub mod middleware;
mod routes;

pub use routes::build_router;
