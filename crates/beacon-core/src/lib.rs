pub mod alerts;
pub mod contacts;
pub mod error;
pub mod ids;
pub mod notifications;
pub mod responders;
pub mod settings;
pub mod types;

pub use alerts::*;
pub use contacts::*;
pub use error::*;
pub use notifications::*;
pub use responders::*;
pub use settings::*;
pub use types::*;
