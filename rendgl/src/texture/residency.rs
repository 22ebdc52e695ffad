use std::{cell::Cell, rc::Rc};

use rendgl_types::{SamplerHandle, TextureHandle, ViewHandle, ViewUsage};

use crate::Driver;

/// Number of live views holding a handle.
#[derive(Debug, Default)]
struct ActivationCount(Cell<u32>);

impl ActivationCount {
    fn new(count: u32) -> Self {
        Self(Cell::new(count))
    }

    fn get(&self) -> u32 {
        self.0.get()
    }

    /// Returns true when the count left zero.
    fn increment(&self) -> bool {
        let count = self.0.get();
        self.0.set(count + 1);
        count == 0
    }

    /// Returns true when the count reached zero, `None` if it already was zero.
    fn decrement(&self) -> Option<bool> {
        let count = self.0.get();
        debug_assert!(count > 0, "deactivating a handle which is not active");
        if count == 0 {
            return None;
        }
        self.0.set(count - 1);
        Some(count == 1)
    }

    /// Drops every activation, returns the previous count.
    fn reset(&self) -> u32 {
        self.0.replace(0)
    }
}

/// Shared record behind every view of one texture with one [`ViewKey`](rendgl_types::ViewKey).
///
/// The handle is resident exactly while the activation count is above zero. Once the
/// owning texture is gone the record is released: the count is drained, the driver
/// no longer knows the handle, and later activations are contract violations.
pub(crate) struct ViewResidency<D: Driver> {
    driver: Rc<D>,
    owner: TextureHandle,
    handle: ViewHandle,
    usage: Cell<ViewUsage>,
    sampler: Option<SamplerHandle>,
    active: ActivationCount,
    released: Cell<bool>,
}

impl<D: Driver> ViewResidency<D> {
    pub fn new(
        driver: Rc<D>,
        owner: TextureHandle,
        handle: ViewHandle,
        usage: ViewUsage,
        sampler: Option<SamplerHandle>,
    ) -> Self {
        let resident = driver.is_resident(handle, usage);
        Self {
            driver,
            owner,
            handle,
            usage: Cell::new(usage),
            sampler,
            active: ActivationCount::new(resident as u32),
            released: Cell::new(false),
        }
    }

    pub fn handle(&self) -> ViewHandle {
        self.handle
    }

    pub fn owner(&self) -> TextureHandle {
        self.owner
    }

    pub fn active_count(&self) -> u32 {
        self.active.get()
    }

    pub fn is_released(&self) -> bool {
        self.released.get()
    }

    /// Changes how the handle is made resident the next time. Only possible while
    /// nothing holds the handle, otherwise returns the usage in effect.
    pub fn set_usage(&self, usage: ViewUsage) -> Result<(), ViewUsage> {
        let current = self.usage.get();
        if current == usage {
            return Ok(());
        }
        if self.active.get() > 0 {
            return Err(current);
        }
        self.usage.set(usage);
        Ok(())
    }

    pub fn activate(&self) {
        if self.released.get() {
            debug_assert!(false, "activating {:?} after its texture {:?} was destroyed", self.handle, self.owner);
            log::error!("Ignoring activation of {:?}, texture {:?} was destroyed", self.handle, self.owner);
            return;
        }

        if self.active.increment() {
            self.driver.make_resident(self.handle, self.usage.get());
        }
    }

    pub fn deactivate(&self) {
        if self.released.get() {
            return;
        }

        match self.active.decrement() {
            Some(true) => self.driver.make_non_resident(self.handle, self.usage.get()),
            Some(false) => {}
            None => log::error!("Ignoring deactivation of inactive {:?}", self.handle),
        }
    }

    /// Drains the activation count and invalidates the record. Returns the sampler
    /// object the handle was created with, which the caller has to delete.
    pub fn release(&self) -> Option<SamplerHandle> {
        if self.active.reset() > 0 {
            self.driver.make_non_resident(self.handle, self.usage.get());
        }
        self.released.set(true);
        self.sampler
    }

    /// Invalidates the record without talking to the driver.
    pub fn abandon(&self) {
        self.active.reset();
        self.released.set(true);
    }
}

#[cfg(test)]
mod tests {
    use super::ActivationCount;

    #[test]
    fn transitions_are_reported_once() {
        let count = ActivationCount::default();
        assert!(count.increment());
        assert!(!count.increment());
        assert_eq!(count.get(), 2);

        assert_eq!(count.decrement(), Some(false));
        assert_eq!(count.decrement(), Some(true));
        assert_eq!(count.get(), 0);

        let mirrored = ActivationCount::new(1);
        assert!(!mirrored.increment());
        assert_eq!(mirrored.reset(), 2);
        assert_eq!(mirrored.get(), 0);
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "not active")]
    fn deactivating_inactive_handle_panics() {
        let count = ActivationCount::default();
        count.decrement();
    }
}
