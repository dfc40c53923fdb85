//! Shared handle to an [`XmpMeta`]
//!
//! With the `mutli-thread` feature (default) the handle wraps
//! `Arc<RwLock<XmpMeta>>` and can be sent across threads; without it the
//! handle wraps `Rc<RefCell<XmpMeta>>`. Both expose the same closure based
//! API, and lock failures surface as `InternalError`.

use super::XmpMeta;
use crate::core::error::{XmpError, XmpResult};

#[cfg(not(feature = "mutli-thread"))]
mod impl_ {
    use super::{XmpError, XmpMeta, XmpResult};
    use std::cell::RefCell;
    use std::rc::Rc;

    /// Single-threaded shared metadata
    pub type Inner = Rc<RefCell<XmpMeta>>;

    pub fn new_inner(meta: XmpMeta) -> Inner {
        Rc::new(RefCell::new(meta))
    }

    pub fn read_with<F, R>(inner: &Inner, f: F) -> XmpResult<R>
    where
        F: FnOnce(&XmpMeta) -> R,
    {
        let guard = inner
            .try_borrow()
            .map_err(|_| XmpError::InternalError("Metadata is being written".to_string()))?;
        Ok(f(&guard))
    }

    pub fn write_with<F, R>(inner: &Inner, f: F) -> XmpResult<R>
    where
        F: FnOnce(&mut XmpMeta) -> R,
    {
        let mut guard = inner
            .try_borrow_mut()
            .map_err(|_| XmpError::InternalError("Metadata is borrowed".to_string()))?;
        Ok(f(&mut guard))
    }
}

#[cfg(feature = "mutli-thread")]
mod impl_ {
    use super::{XmpError, XmpMeta, XmpResult};
    use std::sync::{Arc, RwLock};

    /// Multi-threaded shared metadata
    pub type Inner = Arc<RwLock<XmpMeta>>;

    pub fn new_inner(meta: XmpMeta) -> Inner {
        Arc::new(RwLock::new(meta))
    }

    pub fn read_with<F, R>(inner: &Inner, f: F) -> XmpResult<R>
    where
        F: FnOnce(&XmpMeta) -> R,
    {
        let guard = inner
            .read()
            .map_err(|_| XmpError::InternalError("Lock poisoned".to_string()))?;
        Ok(f(&guard))
    }

    pub fn write_with<F, R>(inner: &Inner, f: F) -> XmpResult<R>
    where
        F: FnOnce(&mut XmpMeta) -> R,
    {
        let mut guard = inner
            .write()
            .map_err(|_| XmpError::InternalError("Lock poisoned".to_string()))?;
        Ok(f(&mut guard))
    }
}

/// A cloneable handle sharing one [`XmpMeta`]
///
/// # Example
///
/// ```rust
/// use xmpdom::{SharedMeta, XmpMeta, XmpValue};
///
/// let shared = SharedMeta::new(XmpMeta::new());
/// let writer = shared.clone();
/// writer.write(|meta| meta.set_property("xmp:Label", "Red")).unwrap().unwrap();
///
/// let label = shared.read(|meta| meta.get_property("xmp:Label")).unwrap().unwrap();
/// assert_eq!(label, Some(XmpValue::from("Red")));
/// ```
#[derive(Debug, Clone)]
pub struct SharedMeta {
    inner: impl_::Inner,
}

impl SharedMeta {
    /// Wrap metadata in a shared handle
    pub fn new(meta: XmpMeta) -> Self {
        Self {
            inner: impl_::new_inner(meta),
        }
    }

    /// Run `f` with shared access
    pub fn read<F, R>(&self, f: F) -> XmpResult<R>
    where
        F: FnOnce(&XmpMeta) -> R,
    {
        impl_::read_with(&self.inner, f)
    }

    /// Run `f` with exclusive access
    pub fn write<F, R>(&self, f: F) -> XmpResult<R>
    where
        F: FnOnce(&mut XmpMeta) -> R,
    {
        impl_::write_with(&self.inner, f)
    }

    /// A copy of the current metadata
    pub fn snapshot(&self) -> XmpResult<XmpMeta> {
        self.read(XmpMeta::clone)
    }
}

impl From<XmpMeta> for SharedMeta {
    fn from(meta: XmpMeta) -> Self {
        Self::new(meta)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::value::XmpValue;

    #[test]
    fn test_read_write() {
        let shared = SharedMeta::from(XmpMeta::new());
        let other = shared.clone();
        other
            .write(|meta| meta.set_property("xmp:Label", "Blue"))
            .unwrap()
            .unwrap();

        let snapshot = shared.snapshot().unwrap();
        assert_eq!(
            snapshot.get_property("xmp:Label").unwrap(),
            Some(XmpValue::from("Blue"))
        );
    }
}
