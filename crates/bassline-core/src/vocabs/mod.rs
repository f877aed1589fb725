//! Built-in vocabularies
//!
//! Each factory installs its words through [`Interpreter::with_vocabulary`],
//! which adds the vocabulary to the search list and makes it current while
//! the words are defined.

use crate::interpreter::{errors::Result, Interpreter};

pub mod editor;
pub mod events;
pub mod hooks;
pub mod io;
pub mod kernel;
pub mod reflect;

#[cfg(test)]
pub(crate) mod test_support;
#[cfg(test)]
mod events_tests;
#[cfg(test)]
mod kernel_tests;

pub use editor::create_editor_vocab;
pub use events::{create_events_vocab, parse_duration};
pub use hooks::{create_hooks_vocab, trigger};
pub use io::create_io_vocab;
pub use kernel::create_kernel_vocab;
pub use reflect::create_reflect_vocab;

/// Install every built-in vocabulary in search-list order
pub fn install_all(rt: &mut Interpreter) -> Result<()> {
    create_kernel_vocab(rt)?;
    create_io_vocab(rt)?;
    create_reflect_vocab(rt)?;
    create_events_vocab(rt)?;
    create_editor_vocab(rt)?;
    create_hooks_vocab(rt)?;
    Ok(())
}
