use std::future::Future;
use std::pin::Pin;

pub type Task = Box<dyn FnOnce()>;
pub type LocalFuture = Pin<Box<dyn Future<Output = ()>>>;

/// Timers, animation frames and a local task spawner.
///
/// Everything runs on one thread; none of these callbacks need to be `Send`.
pub trait Scheduler {
    fn set_timeout(&self, delay_ms: u32, task: Task);
    fn request_animation_frame(&self, task: Task);
    fn spawn_local(&self, future: LocalFuture);
}
