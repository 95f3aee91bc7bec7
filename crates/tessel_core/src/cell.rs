//! Persistent value cells
//!
//! Render procedures receive arguments that are either a literal or a live
//! binding to state owned by a parent. [`Value<T>`] carries that distinction to
//! the argument boundary:
//!
//! - [`Value::Plain`] holds the value inline. Reading it never allocates a cell.
//! - [`Value::Bound`] holds a [`Binding<T>`], a shared cell whose current value is
//!   read and written through indirection, so a child can write back into its
//!   parent's state.
//!
//! ```rust
//! use tessel_core::{Binding, Value};
//!
//! let name = Binding::new(String::from("ada"));
//! let arg: Value<String> = (&name).into();
//! arg.set("grace".into()).unwrap();
//! assert_eq!(name.get(), "grace");
//!
//! let literal: Value<String> = String::from("fixed").into();
//! assert!(literal.set("other".into()).is_err());
//! ```
//!
//! [`Ref<T>`] is the slot the runtime fills when a staged ref is consumed by
//! the next element or component call.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::error::CoreError;

/// A shared, mutable cell (cheap to clone; clones point at the same value)
pub struct Binding<T> {
    cell: Rc<RefCell<T>>,
}

impl<T> Clone for Binding<T> {
    fn clone(&self) -> Self {
        Self {
            cell: Rc::clone(&self.cell),
        }
    }
}

impl<T: Default> Default for Binding<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: fmt::Debug> fmt::Debug for Binding<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Binding").field(&*self.cell.borrow()).finish()
    }
}

impl<T> Binding<T> {
    /// Create a new cell holding `value`
    pub fn new(value: T) -> Self {
        Self {
            cell: Rc::new(RefCell::new(value)),
        }
    }

    /// Read the current value
    pub fn get(&self) -> T
    where
        T: Clone,
    {
        self.cell.borrow().clone()
    }

    /// Borrow the current value for the duration of `f`
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.cell.borrow())
    }

    /// Overwrite the current value
    pub fn set(&self, value: T) {
        *self.cell.borrow_mut() = value;
    }

    /// Overwrite the current value and return the previous one
    pub fn replace(&self, value: T) -> T {
        self.cell.replace(value)
    }

    /// Update the value in place
    pub fn update(&self, f: impl FnOnce(&mut T)) {
        f(&mut self.cell.borrow_mut());
    }

    /// Whether two bindings share the same cell
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.cell, &other.cell)
    }
}

/// A call argument: either a plain value or a binding to a live cell
pub enum Value<T> {
    /// A literal, read directly
    Plain(T),
    /// A live reference to state owned elsewhere
    Bound(Binding<T>),
}

impl<T: Clone> Clone for Value<T> {
    fn clone(&self) -> Self {
        match self {
            Self::Plain(value) => Self::Plain(value.clone()),
            Self::Bound(binding) => Self::Bound(binding.clone()),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Value<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Plain(value) => f.debug_tuple("Plain").field(value).finish(),
            Self::Bound(binding) => f.debug_tuple("Bound").field(binding).finish(),
        }
    }
}

impl<T: Default> Default for Value<T> {
    fn default() -> Self {
        Self::Plain(T::default())
    }
}

impl<T> Value<T> {
    /// Read the current value
    pub fn get(&self) -> T
    where
        T: Clone,
    {
        match self {
            Self::Plain(value) => value.clone(),
            Self::Bound(binding) => binding.get(),
        }
    }

    /// Borrow the current value for the duration of `f`
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        match self {
            Self::Plain(value) => f(value),
            Self::Bound(binding) => binding.with(f),
        }
    }

    /// Write through the binding.
    ///
    /// Fails with [`CoreError::NotBound`] when the argument is a plain value;
    /// the plain value is left untouched.
    pub fn set(&self, value: T) -> Result<(), CoreError> {
        match self {
            Self::Plain(_) => Err(CoreError::NotBound),
            Self::Bound(binding) => {
                binding.set(value);
                Ok(())
            }
        }
    }

    /// Whether this argument is a live binding
    pub fn is_bound(&self) -> bool {
        matches!(self, Self::Bound(_))
    }

    /// The underlying binding, if any
    pub fn binding(&self) -> Option<&Binding<T>> {
        match self {
            Self::Plain(_) => None,
            Self::Bound(binding) => Some(binding),
        }
    }
}

impl<T> From<T> for Value<T> {
    fn from(value: T) -> Self {
        Self::Plain(value)
    }
}

impl<T> From<Binding<T>> for Value<T> {
    fn from(binding: Binding<T>) -> Self {
        Self::Bound(binding)
    }
}

impl<T> From<&Binding<T>> for Value<T> {
    fn from(binding: &Binding<T>) -> Self {
        Self::Bound(binding.clone())
    }
}

impl From<&str> for Value<String> {
    fn from(value: &str) -> Self {
        Self::Plain(value.to_owned())
    }
}

/// A slot the runtime fills with the instance produced by the next call
pub struct Ref<T> {
    current: Rc<RefCell<Option<T>>>,
}

impl<T> Clone for Ref<T> {
    fn clone(&self) -> Self {
        Self {
            current: Rc::clone(&self.current),
        }
    }
}

impl<T> Default for Ref<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: fmt::Debug> fmt::Debug for Ref<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Ref").field(&*self.current.borrow()).finish()
    }
}

impl<T> Ref<T> {
    /// Create an empty slot
    pub fn new() -> Self {
        Self {
            current: Rc::new(RefCell::new(None)),
        }
    }

    /// The value last written into the slot
    pub fn current(&self) -> Option<T>
    where
        T: Clone,
    {
        self.current.borrow().clone()
    }

    /// Whether the slot has been filled
    pub fn is_set(&self) -> bool {
        self.current.borrow().is_some()
    }

    /// Fill the slot
    pub fn set(&self, value: T) {
        *self.current.borrow_mut() = Some(value);
    }

    /// Empty the slot and return what it held
    pub fn take(&self) -> Option<T> {
        self.current.borrow_mut().take()
    }

    /// Whether two refs share the same slot
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.current, &other.current)
    }
}
