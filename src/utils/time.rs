use std::time::Duration;

/// Monotonic clock that advances together with [`sleep`]
#[cfg(target_arch = "wasm32")]
pub use instant::Instant;
#[cfg(not(target_arch = "wasm32"))]
pub use tokio::time::Instant;

/// Suspend the current task for `duration` without blocking the event loop.
///
/// Browser builds park on a JS timer; native builds (tests included) use
/// tokio's timer so a paused test clock can drive it.
pub async fn sleep(duration: Duration) {
    #[cfg(target_arch = "wasm32")]
    {
        gloo_timers::future::sleep(duration).await;
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        tokio::time::sleep(duration).await;
    }
}
