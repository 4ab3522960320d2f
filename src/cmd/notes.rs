use crate::data::persistence::get_data_dir;
use crate::data::{FileStore, KeyValueStore, NoteMap};
use anyhow::Result;
use chrono::NaiveDate;
use log::info;

pub fn run() -> Result<()> {
    let store = FileStore::open(&get_data_dir()?);
    let notes = NoteMap::load(&store);
    write_notes(&notes, &mut std::io::stdout())
}

pub fn run_set(date: NaiveDate, text: &str) -> Result<()> {
    let mut store = FileStore::open(&get_data_dir()?);
    let key = date.format("%Y-%m-%d").to_string();
    if apply_note(&mut store, &key, text)? {
        println!("Saved note for {}", key);
    } else {
        println!("Removed note for {}", key);
    }
    Ok(())
}

/// Same rule as the editor's Save: blank text removes the note. Returns true
/// when a note was stored.
pub(crate) fn apply_note(store: &mut dyn KeyValueStore, key: &str, text: &str) -> Result<bool> {
    let mut notes = NoteMap::load(store);
    let stored = notes.set(key, text);
    notes.persist(store)?;
    info!("event=note_save source=cli date={} stored={}", key, stored);
    Ok(stored)
}

pub(crate) fn write_notes<W: std::io::Write>(notes: &NoteMap, out: &mut W) -> Result<()> {
    writeln!(out, "Notes")?;
    writeln!(out, "---")?;
    writeln!(out, "  {:<14} {}", "Date", "Note")?;
    if notes.is_empty() {
        writeln!(out, "  (no notes)")?;
    }
    for (date, text) in notes.iter() {
        writeln!(out, "  {:<14} {}", date, text)?;
    }
    writeln!(out, "---")?;
    writeln!(out, "Total: {} note(s)", notes.len())?;
    Ok(())
}
