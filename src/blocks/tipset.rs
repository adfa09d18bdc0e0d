// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use super::{Block, BlockHeader, Error};
use crate::shim::clock::ChainEpoch;
use itertools::Itertools as _;

/// Sort key of a block within a tipset: ticket first, header CID bytes as the
/// tie-break.
fn sort_key(header: &BlockHeader) -> Result<([u8; 32], Vec<u8>), Error> {
    let cid = header
        .cid()
        .map_err(|e| Error::Validation(format!("failed to compute header cid: {e}")))?;
    Ok((header.ticket().vrfproof.digest(), cid.to_bytes()))
}

fn sorted_by_ticket<T>(
    items: Vec<T>,
    header: impl Fn(&T) -> &BlockHeader,
) -> Result<Vec<T>, Error> {
    let keyed = items
        .into_iter()
        .map(|item| sort_key(header(&item)).map(|key| (key, item)))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(keyed
        .into_iter()
        .sorted_by(|(a, _), (b, _)| a.cmp(b))
        .map(|(_, item)| item)
        .collect())
}

fn common_epoch<'a>(headers: impl Iterator<Item = &'a BlockHeader>) -> Result<ChainEpoch, Error> {
    let mut epochs = headers.map(BlockHeader::epoch).dedup();
    match (epochs.next(), epochs.next()) {
        (None, _) => Err(Error::NoBlocks),
        (Some(epoch), None) => Ok(epoch),
        (Some(a), Some(b)) => Err(Error::InvalidTipset(format!(
            "blocks have mismatching epochs {a} and {b}"
        ))),
    }
}

/// An immutable set of block headers at the same height, ordered by ticket.
/// Used to describe chain ancestry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Tipset {
    headers: Vec<BlockHeader>,
}

impl Tipset {
    pub fn new(headers: Vec<BlockHeader>) -> Result<Self, Error> {
        if headers.is_empty() {
            return Err(Error::NoBlocks);
        }
        let headers = sorted_by_ticket(headers, |h| h)?;
        common_epoch(headers.iter())?;
        Ok(Self { headers })
    }

    pub fn block_headers(&self) -> &[BlockHeader] {
        &self.headers
    }

    pub fn epoch(&self) -> ChainEpoch {
        // Non-empty and uniform by construction.
        self.headers.first().map(BlockHeader::epoch).unwrap_or_default()
    }
}

/// A tipset together with the messages of every block.
///
/// Blocks are kept in ascending ticket order. Construction does not reject an
/// empty block list; [`FullTipset::epoch`] reports that case so that the
/// processor can treat it as a fault.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FullTipset {
    blocks: Vec<Block>,
}

impl FullTipset {
    pub fn new(blocks: Vec<Block>) -> Result<Self, Error> {
        Ok(Self {
            blocks: sorted_by_ticket(blocks, Block::header)?,
        })
    }

    /// Returns the blocks of the tipset in ticket order.
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Height shared by every block of the tipset.
    pub fn epoch(&self) -> Result<ChainEpoch, Error> {
        common_epoch(self.blocks.iter().map(Block::header))
    }
}
