//! API Module
//!
//! HTTP front-end exposing a `Cache<String, String>` as a REST API.
//!
//! # Endpoints
//! - `PUT /set` - Store a key-value pair
//! - `GET /get/:key` - Retrieve a value by key
//! - `GET /has/:key` - Check whether a key is live
//! - `DELETE /del/:key` - Delete a key
//! - `GET /keys` - List live keys
//! - `POST /clear` - Remove every entry
//! - `GET /stats` - Get cache statistics
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
