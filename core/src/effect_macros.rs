//! Declarative macro for building `Effect::Future` values from reducers.

/// Create an `Effect::Future` from an async block
///
/// # Example
///
/// ```rust,ignore
/// use todo_sync_core::async_effect;
///
/// async_effect! {
///     match storage.read_all().await {
///         Ok(items) => Some(TodoAction::LocalLoaded { items }),
///         Err(error) => Some(TodoAction::LoadFailed { error: error.into() }),
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
