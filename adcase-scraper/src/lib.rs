//! Network side of the repair pipeline: candidate gatherers, the validator,
//! the per-record resolver and the resumable batch driver.

pub mod driver;
pub mod error;
pub mod gather;
pub mod html;
pub mod http;
pub mod log;
pub mod resolve;
#[cfg(any(test, feature = "testing"))]
pub mod testing;
pub mod validate;

pub use driver::{RepairEvent, RepairOptions, RunPlan, RunSummary, run_repair};
pub use error::{FetchError, RepairError};
pub use gather::{Gatherer, build_gatherers};
pub use http::{FetchRequest, FetchResponse, HttpClient, Method, ReqwestClient, Throttle};
pub use log::{LogEntry, LogSummary, RepairLog};
pub use resolve::{Resolution, Resolver};
pub use validate::{HostPolicy, Liveness, Rejection, Selection, Validator, Verdict};
