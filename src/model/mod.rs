pub mod corpus;
pub mod intent;
pub mod settings;
pub mod task;
pub mod view;

pub use corpus::*;
pub use intent::*;
pub use settings::*;
pub use task::*;
pub use view::*;
