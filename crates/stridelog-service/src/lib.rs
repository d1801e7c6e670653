pub mod http;
pub mod local;
pub mod session;
pub mod traits;

pub use http::HttpService;
pub use local::LocalService;
pub use session::{Identity, SessionHandle};
pub use traits::{ServiceError, TrackerService};
