//! Small declarative helpers shared by the HTTP apps.

#[cfg(feature = "actix")]
#[doc(hidden)]
pub use actix_web as __actix_web;

/// Declare a `routes` function usable with `App::configure`.
///
/// `route` registers an actix handler produced by one of the method macros
/// (`#[get]`, `#[post]`, ...), `configure` nests another `routes` function.
///
/// ```ignore
/// macros_utils::routes! {
///     route health_route,
///     configure worker::routes,
/// }
/// ```
#[cfg(feature = "actix")]
#[macro_export]
macro_rules! routes {
    (@register $cfg:ident, route, $item:path) => {
        $cfg.service($item);
    };
    (@register $cfg:ident, configure, $item:path) => {
        $cfg.configure($item);
    };
    ( $( $kind:ident $item:path ),* $(,)? ) => {
        pub fn routes(cfg: &mut $crate::__actix_web::web::ServiceConfig) {
            $( $crate::routes!(@register cfg, $kind, $item); )*
        }
    };
}
