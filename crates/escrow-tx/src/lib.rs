pub mod data;
pub mod deposit;
pub mod lock;
pub mod submit;
pub mod unlock;
pub mod wallet;

mod error;
pub use error::*;

mod shared;
pub use shared::*;

mod validator;
pub use validator::*;
