mod session;
mod user;
mod workspace;

pub use session::{Preference, Session};
pub use user::User;
pub use workspace::{Workspace, WorkspaceRole};
