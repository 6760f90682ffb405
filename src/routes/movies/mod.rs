mod create_movie;
mod delete_movie;
mod get_movie;
mod list_movies;
mod types;
mod update_movie;
mod upload_poster;
mod util;

pub use create_movie::*;
pub use delete_movie::*;
pub use get_movie::*;
pub use list_movies::*;
pub use types::*;
pub use update_movie::*;
pub use upload_poster::*;
pub use util::*;
