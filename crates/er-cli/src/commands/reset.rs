//! Deletes stored risk state.

use std::io::Write;

use anyhow::Result;

use crate::state::StateStore;

pub fn run<W: Write>(writer: &mut W, store: &StateStore) -> Result<()> {
    let _lock = store.lock()?;
    if store.clear()? {
        writeln!(writer, "Cleared stored risk state in {}", store.dir().display())?;
    } else {
        writeln!(writer, "No stored risk state.")?;
    }
    Ok(())
}
