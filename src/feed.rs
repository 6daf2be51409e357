//! Feed trait for applying loaded data to view state.
//!
//! A load is never cancelled when its view goes away; the result still
//! arrives. [`deliver`] checks the view's [`MountFlag`] first and drops the
//! result if the view is gone.

use crate::error::{Error, Result};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Liveness token of one view.
///
/// Clone it into every task that applies results; call
/// [`unmount`](MountFlag::unmount) when the view goes away.
#[derive(Clone, Debug)]
pub struct MountFlag(Arc<AtomicBool>);

impl MountFlag {
    pub fn new() -> Self {
        MountFlag(Arc::new(AtomicBool::new(true)))
    }

    pub fn unmount(&self) {
        self.0.store(false, Ordering::Release);
    }

    pub fn is_mounted(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

impl Default for MountFlag {
    fn default() -> Self {
        Self::new()
    }
}

/// A sink for loaded data, typically one piece of view state.
///
/// # Example
///
/// ```
/// use service_center_kit::feed::{deliver, Feed, MountFlag};
///
/// struct CustomerCount {
///     mount: MountFlag,
///     count: usize,
/// }
///
/// impl Feed<usize> for CustomerCount {
///     fn is_mounted(&self) -> bool {
///         self.mount.is_mounted()
///     }
///
///     fn feed(&mut self, value: usize) {
///         self.count = value;
///     }
/// }
///
/// let mount = MountFlag::new();
/// let mut view = CustomerCount { mount: mount.clone(), count: 0 };
/// assert!(deliver(&mut view, Ok(3)));
///
/// mount.unmount();
/// assert!(!deliver(&mut view, Ok(5)));
/// assert_eq!(view.count, 3);
/// ```
pub trait Feed<T>: Send {
    /// Whether the owning view still exists.
    fn is_mounted(&self) -> bool;

    /// Apply a successfully loaded value.
    fn feed(&mut self, value: T);

    /// Optional: apply a failure. The default only logs it.
    fn on_error(&mut self, error: Error) {
        if error.is_unauthenticated() {
            debug!("Feed load not authenticated: {}", error);
        } else {
            warn!("Feed load failed: {}", error);
        }
    }
}

/// Apply `result` to `feed` if it is still mounted.
///
/// Returns `true` when the result was applied (as a value or an error).
pub fn deliver<T, F>(feed: &mut F, result: Result<T>) -> bool
where
    F: Feed<T> + ?Sized,
{
    if !feed.is_mounted() {
        debug!("Dropping result for unmounted view");
        return false;
    }
    match result {
        Ok(value) => feed.feed(value),
        Err(e) => feed.on_error(e),
    }
    true
}

/// Ready-made feed holding the last value or error.
#[derive(Debug)]
pub struct Slot<T> {
    mount: MountFlag,
    pub data: Option<T>,
    pub error: Option<Error>,
}

impl<T> Slot<T> {
    pub fn new(mount: MountFlag) -> Self {
        Slot {
            mount,
            data: None,
            error: None,
        }
    }

    pub fn mount(&self) -> &MountFlag {
        &self.mount
    }
}

impl<T: Send> Feed<T> for Slot<T> {
    fn is_mounted(&self) -> bool {
        self.mount.is_mounted()
    }

    fn feed(&mut self, value: T) {
        self.data = Some(value);
        self.error = None;
    }

    fn on_error(&mut self, error: Error) {
        if !error.is_unauthenticated() {
            warn!("Load failed: {}", error);
        }
        self.error = Some(error);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mount_flag_shared_between_clones() {
        let flag = MountFlag::new();
        let task_copy = flag.clone();
        assert!(task_copy.is_mounted());
        flag.unmount();
        assert!(!task_copy.is_mounted());
    }

    #[test]
    fn test_slot_receives_value_then_error() {
        let mut slot = Slot::new(MountFlag::new());
        assert!(deliver(&mut slot, Ok(vec![1, 2])));
        assert_eq!(slot.data, Some(vec![1, 2]));

        assert!(deliver(&mut slot, Err(Error::rejected(500, "boom"))));
        assert_eq!(slot.data, Some(vec![1, 2]));
        assert_eq!(slot.error, Some(Error::rejected(500, "boom")));

        assert!(deliver(&mut slot, Ok(vec![3])));
        assert!(slot.error.is_none());
    }

    #[test]
    fn test_unmounted_slot_is_untouched() {
        let mount = MountFlag::new();
        let mut slot: Slot<u32> = Slot::new(mount.clone());
        mount.unmount();

        assert!(!deliver(&mut slot, Ok(7)));
        assert!(!deliver(&mut slot, Err(Error::TransportError("refused".into()))));
        assert!(slot.data.is_none());
        assert!(slot.error.is_none());
    }

    #[tokio::test]
    async fn test_late_result_after_unmount_is_dropped() {
        let mount = MountFlag::new();
        let mut slot: Slot<&'static str> = Slot::new(mount.clone());

        let load = tokio::spawn(async {
            tokio::task::yield_now().await;
            Ok::<_, Error>("customers")
        });
        mount.unmount();
        let result = load.await.unwrap();

        assert!(!deliver(&mut slot, result));
        assert!(slot.data.is_none());
    }
}
