//! Shared-memory (single writer, many readers) modules.
//!
//! Region `k` is encoded as `k` in reader rows (reader -> writer cell) and as
//! `k + SHM_REGIONS_OFFSET` in the writer row.

use crate::routing::error::RoutingError;
use crate::routing::fill::write_cell;
use crate::routing::index::CoreIndex;
use crate::routing::matrix::Matrix;
use crate::spec::CoreId;

pub const SHM_SLAVE_START: i32 = 50;
pub const SHM_REGIONS_OFFSET: i32 = 20;
pub const SHM_MASTER_START: i32 = SHM_SLAVE_START + SHM_REGIONS_OFFSET;

pub const SHM_SLAVE_MAX: i32 = SHM_SLAVE_START + SHM_REGIONS_OFFSET - 1;
pub const SHM_MASTER_MAX: i32 = SHM_MASTER_START + SHM_REGIONS_OFFSET - 1;

/// Hands out shared-memory region numbers for one build.
#[derive(Debug, Clone, Default)]
pub struct ShmRegions {
    used: i32,
}

impl ShmRegions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of regions allocated so far.
    pub fn used(&self) -> usize {
        self.used as usize
    }

    fn allocate(&mut self, sender: &CoreId) -> Result<i32, RoutingError> {
        if self.used >= SHM_REGIONS_OFFSET {
            return Err(RoutingError::ShmRegionsExhausted {
                sender: sender.clone(),
            });
        }
        let region = SHM_SLAVE_START + self.used;
        self.used += 1;
        Ok(region)
    }
}

/// Write one shared-memory module into `matrix`, consuming a region.
pub fn fill_shm(
    sender: &CoreId,
    receivers: &[CoreId],
    matrix: &mut Matrix,
    index: &CoreIndex,
    regions: &mut ShmRegions,
) -> Result<i32, RoutingError> {
    if !receivers.contains(sender) {
        return Err(RoutingError::ShmSenderNotReceiver {
            sender: sender.clone(),
        });
    }

    let region = regions.allocate(sender)?;
    log::info!(
        "shm region {} for writer {} -> {} readers",
        region,
        sender,
        receivers.len() - 1
    );

    for r in receivers {
        write_cell(matrix, index, sender, r, region + SHM_REGIONS_OFFSET)?;
        if r != sender {
            write_cell(matrix, index, r, sender, region)?;
        }
    }
    Ok(region)
}
