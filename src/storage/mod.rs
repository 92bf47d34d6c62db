//! Persistent traffic log.
//!
//! Storage is brought up once at startup by [`open_storage`]: mount the
//! volume, then create a table named after the creation time. Either step may
//! fail; the bridge keeps running and the [`StorageWriter`] simply drops every
//! record for the rest of the run.
//!
//! | Item | Description |
//! |------|-------------|
//! | [`StorageVolume`] | Mountable volume, [`DirectoryVolume`] on hosts |
//! | [`LogTable`] | CSV table with the fixed header row |
//! | [`render_row`] | One record to one row |
//! | [`StorageWriter`] | Queue consumer with periodic and idle flushes |

mod table;
mod volume;
mod writer;

pub use table::{
    DIRECTION_RX, HEADER, LogTable, PAD_BYTE, format_timestamp, render_row, table_name,
};
pub use volume::{DirectoryVolume, StorageVolume};
pub use writer::{SharedTable, StepOutcome, StorageWriter, WriteOutcome};

use chrono::NaiveDateTime;

/// Mount `volume` and create this run's table.
///
/// Failures are logged and yield `None`; they are never retried.
pub fn open_storage<V: StorageVolume>(
    volume: &mut V,
    created: NaiveDateTime,
) -> Option<LogTable<V::Sink>> {
    log::info!(target: "SD_CARD", "Initializing storage");
    if let Err(e) = volume.mount() {
        log::error!(target: "SD_CARD", "Storage initialization failed: {e}");
        return None;
    }

    let name = table_name(created);
    match volume
        .create(&name)
        .and_then(|sink| LogTable::new(name.clone(), sink))
    {
        Ok(table) => {
            log::info!(target: "SD_CARD", "Created log file: {name}");
            Some(table)
        }
        Err(e) => {
            log::error!(target: "SD_CARD", "Failed to create log file {name}: {e}");
            None
        }
    }
}
