pub mod request;
pub mod settings;
pub mod target;

pub use request::{ResponseFuture, URLRequest};
pub use settings::{Settings, SettingsOverrides};
pub use target::{ConnectionTarget, TargetInput, TargetMode};
