// Device HTTP API (http_api feature)
//
// Re-expresses the device's calibration endpoints over the core. The routing
// layer stays thin: parsing and JSON shaping here, all semantics in the
// calibration manager.

mod routes;

pub use routes::{build_router, run_http_server, ApiState};
