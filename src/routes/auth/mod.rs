mod login;
mod register;
mod util;

pub use login::*;
pub use register::*;
pub use util::*;
