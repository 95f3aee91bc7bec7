//! Tessel Core
//!
//! The identity and persistence primitives of the Tessel immediate-mode runtime:
//!
//! - **Value cells**: [`Value`] arguments that are either a plain value or a live
//!   [`Binding`] to parent state, plus [`Ref`] slots filled by the runtime
//! - **Keyed paths**: [`KeyPath`] turns the stack of local keys ([`Ckey`]) active
//!   at a call into a composite identity ([`Ikey`])
//! - **Ref table**: [`RefTable`] maps identities to the persistent instances
//!   created at them and sweeps the ones a pass did not visit
//!
//! # Example
//!
//! ```rust
//! use tessel_core::{Ckey, KeyPath, RefTable};
//!
//! let mut keys = KeyPath::new('/');
//! let mut table: RefTable<u32> = RefTable::new();
//!
//! table.begin_pass();
//! keys.push(Ckey::Named("list"));
//! keys.push(Ckey::Index(0));
//! let visit = table.visit_or_insert_with(keys.current(), || 7);
//! assert!(visit.created);
//! assert_eq!(&*visit.ikey, "list/#0");
//! keys.pop();
//! keys.pop();
//! ```

pub mod cell;
pub mod error;
pub mod key;
pub mod ref_table;

pub use cell::{Binding, Ref, Value};
pub use error::CoreError;
pub use key::{Ckey, Ikey, KeyPath};
pub use ref_table::{RefTable, Visit};
