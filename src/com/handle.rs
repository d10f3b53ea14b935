//! # Owned-value handles around a single heap value.
//!
//! Two variants exist:
//!
//! - [`DataBuffer`] — the mutable owner. Exactly one holder has write access.
//!   A provider fills it and publishes it; publishing moves the value out.
//! - [`Sample`] — the shared reader. Any number of holders, read-only, cheap
//!   to clone. Subscribers retain the most recent sample without copying it;
//!   the value lives until the last handle drops.
//!
//! Transfer goes one way: `Sample::from(buffer)` consumes the mutable owner.
//! There is no way back to mutable access.
//!
//! ## Empty handles
//! A [`DataBuffer`] is observably `empty` or `carrying`. Dereferencing an
//! empty buffer is a programming error and panics; well-formed providers
//! never observe it because [`DataBuffer::new`] starts carrying and the value
//! only leaves on publish.

use std::ops::{Deref, DerefMut};
use std::sync::Arc;

/// Mutable sole-owner handle around a single heap value.
#[derive(Debug)]
pub struct DataBuffer<T> {
    value: Option<Box<T>>,
}

impl<T> DataBuffer<T> {
    /// Creates a buffer carrying `value`.
    pub fn new(value: T) -> Self {
        Self {
            value: Some(Box::new(value)),
        }
    }

    /// Creates an empty buffer. Dereferencing it panics.
    pub fn empty() -> Self {
        Self { value: None }
    }

    /// True when the buffer carries no value.
    pub fn is_empty(&self) -> bool {
        self.value.is_none()
    }

    /// Moves the value out, leaving the buffer empty.
    pub fn take(&mut self) -> Option<Box<T>> {
        self.value.take()
    }
}

impl<T: Default> Default for DataBuffer<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T> Deref for DataBuffer<T> {
    type Target = T;

    fn deref(&self) -> &T {
        self.value
            .as_deref()
            .expect("dereferenced an empty DataBuffer")
    }
}

impl<T> DerefMut for DataBuffer<T> {
    fn deref_mut(&mut self) -> &mut T {
        self.value
            .as_deref_mut()
            .expect("dereferenced an empty DataBuffer")
    }
}

/// Shared read-only handle to a published value.
///
/// Clones share the same heap value; it is released when the last handle
/// drops.
#[derive(Debug)]
pub struct Sample<T> {
    value: Arc<T>,
}

impl<T> Sample<T> {
    /// Wraps a value into a shared sample.
    pub fn new(value: T) -> Self {
        Self {
            value: Arc::new(value),
        }
    }
}

impl<T> Clone for Sample<T> {
    fn clone(&self) -> Self {
        Self {
            value: Arc::clone(&self.value),
        }
    }
}

impl<T> Deref for Sample<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.value
    }
}

impl<T> From<DataBuffer<T>> for Sample<T> {
    /// Explicit mutable→shared move. Panics if the buffer is empty.
    fn from(mut buffer: DataBuffer<T>) -> Self {
        let boxed = buffer
            .take()
            .expect("published an empty DataBuffer");
        Self {
            value: Arc::from(boxed),
        }
    }
}
