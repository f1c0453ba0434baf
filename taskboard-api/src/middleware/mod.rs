/// Middleware modules for the API server
///
/// Currently contains the security headers layer; request tracing and CORS
/// come from tower-http and are wired up in `app::build_router`.

pub mod security;
