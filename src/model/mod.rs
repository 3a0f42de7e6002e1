pub mod actor;
pub mod attachment;
pub mod comment;
pub mod event;
pub mod item;
pub mod outline;
pub mod project;
pub mod snapshot;

pub use actor::*;
pub use attachment::*;
pub use comment::*;
pub use event::*;
pub use item::*;
pub use outline::*;
pub use project::*;
pub use snapshot::*;
