//! Reconciliation of raw edit cells into edit events.
//!
//! Each cut is logged as two consecutive cells, an in-edge and an out-edge.
//! The same cut on several tracks is logged once per track and is merged
//! back into a single event carrying all track labels.

use crate::{Error, Result};
use ed5_common::{CutKey, EditCell, EditEvent};
use std::collections::HashMap;
use tracing::warn;

/// Pair cells and merge multi-track duplicates.
pub fn reconcile(cells: &[EditCell]) -> Result<Vec<EditEvent>> {
    if cells.is_empty() {
        return Err(Error::NoEditData);
    }
    Ok(merge_tracks(pair_cells(cells)?))
}

/// Combine each in-edge cell with the out-edge cell following it.
///
/// The first cell of a pair supplies reel, track and ids. A pair that lacks
/// one of its edges is kept with zeroed times for that edge.
pub fn pair_cells(cells: &[EditCell]) -> Result<Vec<EditEvent>> {
    if cells.len() % 2 != 0 {
        return Err(Error::OddCellCount(cells.len()));
    }

    Ok(cells
        .chunks_exact(2)
        .enumerate()
        .map(|(n, pair)| {
            let (first, second) = (&pair[0], &pair[1]);
            let (rec_in, src_in) = first.in_times().or(second.in_times()).unwrap_or_else(|| {
                warn!(pair = n, track = %first.track, "edit pair has no in-edge");
                (0.0, 0.0)
            });
            let (rec_out, src_out) =
                second.out_times().or(first.out_times()).unwrap_or_else(|| {
                    warn!(pair = n, track = %first.track, "edit pair has no out-edge");
                    (0.0, 0.0)
                });

            EditEvent {
                reel: first.reel.clone(),
                track: first.track.clone(),
                src_in,
                src_out,
                rec_in,
                rec_out,
                scope: first.scope,
                id1: first.id1,
                id2: first.id2,
                speed: first.speed,
                transition: None,
            }
        })
        .collect())
}

/// Merge events describing the same cut on different tracks.
///
/// Events are bucketed by reel and the four times; every bucket collapses
/// into its first member, which collects the track labels of the rest in
/// order. Merging never changes a key, so one pass reaches the fixed point.
pub fn merge_tracks(events: Vec<EditEvent>) -> Vec<EditEvent> {
    let mut merged: Vec<EditEvent> = Vec::with_capacity(events.len());
    let mut buckets: HashMap<CutKey, usize> = HashMap::new();

    for event in events {
        match buckets.get(&event.cut_key()) {
            Some(&idx) => merged[idx].add_tracks(&event.track),
            None => {
                buckets.insert(event.cut_key(), merged.len());
                merged.push(event);
            }
        }
    }

    merged
}
