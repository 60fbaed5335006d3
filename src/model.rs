/// Training hooks invoked at train, epoch and batch boundaries
pub mod callback;
/// Named training parameters supplied per fit invocation
pub mod fit_config;
/// Per-epoch training statistics returned by fit
pub mod history;
/// The sequential model itself
pub mod sequential;

pub use callback::*;
pub use fit_config::*;
pub use history::*;
pub use sequential::*;
