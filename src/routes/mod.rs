pub mod auth;
pub mod health;
pub mod hello_world;
pub mod movies;

pub use auth::*;
pub use health::*;
pub use hello_world::*;
pub use movies::*;
