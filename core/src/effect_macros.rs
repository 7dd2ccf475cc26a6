//! Declarative macros for ergonomic effect construction
//!
//! Remote commands are written as `async_effect!` blocks inside reducers, and
//! session timers as `delay!`.

/// Create an `Effect::Future` from an async block
///
/// # Example
///
/// ```rust,ignore
/// use shopfront_core::async_effect;
///
/// let api = Arc::clone(&env.api);
/// async_effect! {
///     match api.fetch_products().await {
///         Ok(products) => Some(ShopAction::ProductsLoaded { request, products, owner }),
///         Err(error) => Some(ShopAction::SyncFailed { request, command, error: error.into() }),
///     }
/// }
/// ```
#[macro_export]
macro_rules! async_effect {
    ($($body:tt)*) => {
        $crate::effect::Effect::Future(
            ::std::boxed::Box::pin(async move { $($body)* })
        )
    };
}

/// Create an `Effect::Delay` for scheduling delayed actions
///
/// # Example
///
/// ```rust,ignore
/// use shopfront_core::delay;
///
/// delay! {
///     duration: remaining,
///     action: ShopAction::SessionExpired { expires_at }
/// }
/// ```
#[macro_export]
macro_rules! delay {
    (
        duration: $duration:expr,
        action: $action:expr
    ) => {
        $crate::effect::Effect::Delay {
            duration: $duration,
            action: ::std::boxed::Box::new($action),
        }
    };
}
