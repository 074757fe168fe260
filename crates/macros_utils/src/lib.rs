//! Small declarative helpers shared by the HTTP apps.

#[cfg(feature = "actix")]
#[doc(hidden)]
pub use actix_web as __actix_web;

/// Generates a `pub fn routes(cfg: &mut ServiceConfig)` registering the listed
/// attribute-macro handlers of the current module.
///
/// ```ignore
/// macros_utils::routes! {
///     route health_route,
/// }
///
/// App::new().configure(routes);
/// ```
#[cfg(feature = "actix")]
#[macro_export]
macro_rules! routes {
    ($(route $handler:ident),+ $(,)?) => {
        pub fn routes(cfg: &mut $crate::__actix_web::web::ServiceConfig) {
            $( cfg.service($handler); )+
        }
    };
}
