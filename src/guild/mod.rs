//! Guild domain: the document schema and the operations members perform on it.

pub mod error;
pub mod model;
pub mod ops;

pub use error::{GuildError, GuildResult};
pub use model::{Guild, Member, Role, Team};
pub use ops::UserProfile;
