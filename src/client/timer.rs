//! Sleeping between write-confirmation polls.

use futures_util::future::LocalBoxFuture;
use futures_util::FutureExt;
use std::time::Duration;

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::JsValue;
#[cfg(target_arch = "wasm32")]
use wasm_bindgen_futures::JsFuture;

/// Asynchronous delay. Injected so tests can poll without waiting.
pub trait Sleeper {
    fn sleep(&self, duration: Duration) -> LocalBoxFuture<'static, ()>;
}

/// `setTimeout` in the browser; a Tokio timer on native targets.
///
/// On native targets `sleep` must be called inside a Tokio runtime with the
/// time driver enabled.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemSleeper;

impl Sleeper for SystemSleeper {
    #[cfg(target_arch = "wasm32")]
    fn sleep(&self, duration: Duration) -> LocalBoxFuture<'static, ()> {
        let ms = i32::try_from(duration.as_millis()).unwrap_or(i32::MAX);
        let promise = js_sys::Promise::new(&mut |resolve, _reject| {
            let scheduled = web_sys::window().is_some_and(|window| {
                window
                    .set_timeout_with_callback_and_timeout_and_arguments_0(&resolve, ms)
                    .is_ok()
            });
            if !scheduled {
                let _ = resolve.call0(&JsValue::NULL);
            }
        });
        async move {
            let _ = JsFuture::from(promise).await;
        }
        .boxed_local()
    }

    #[cfg(not(target_arch = "wasm32"))]
    fn sleep(&self, duration: Duration) -> LocalBoxFuture<'static, ()> {
        tokio::time::sleep(duration).boxed_local()
    }
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_native_sleep_yields_to_the_executor() {
        let long = SystemSleeper.sleep(Duration::from_secs(30));
        let cut = tokio::time::timeout(Duration::from_millis(20), long).await;
        assert!(cut.is_err(), "sleep must not block the runtime thread");
    }

    #[tokio::test]
    async fn test_native_sleep_completes() {
        SystemSleeper.sleep(Duration::from_millis(1)).await;
    }
}
