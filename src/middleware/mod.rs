//! Middleware layer.
//!
//! Middleware wraps a request handler and is the right place for
//! cross-cutting concerns. The built-in middleware is [`Timeline`]: every
//! request that passes through it gets a lane on a rail diagram printed to
//! the terminal, with an open line when it enters, a close line when it
//! leaves, and any log output of its handler drawn in between.
//!
//! ```text
//! ┈┈┈ ⇾ GET     ┈┈┈┈┈ ┬┈┈┈┈ /users/42
//! ┈┈┈ ⇾ POST    ┈┈┈┈┈ │┈┬┈┈ /users
//!                     ├┈│┈┈ cache miss
//! 201 ⇽ POST     12ms │┈┴┈┈ /users
//! 200 ⇽ GET      31ms ┴┈┈┈┈ /users/42
//! ```

mod timeline;

pub use timeline::{Session, Timeline};
