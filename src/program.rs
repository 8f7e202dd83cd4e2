use crate::blocks::{BlockError, BlockKind, ListId};
use anyhow::{anyhow, Context, Result};
use serde_json::Value;
use std::str::FromStr;

/// One placed block with its field state. List-bearing kinds carry their
/// list id in the variant, so a kind can never be paired with a missing or
/// extra list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockInstance {
    ScanCard,
    ScanAndCheck(ListId),
    ScanAndAddCard(ListId),
    ScanAndRemoveCard(ListId),
    ClearList(ListId),
}

impl BlockInstance {
    pub fn with_list(kind: BlockKind, list: ListId) -> Result<Self, BlockError> {
        match kind {
            BlockKind::ScanCard => Err(BlockError::UnexpectedListId(kind)),
            BlockKind::ScanAndCheck => Ok(BlockInstance::ScanAndCheck(list)),
            BlockKind::ScanAndAddCard => Ok(BlockInstance::ScanAndAddCard(list)),
            BlockKind::ScanAndRemoveCard => Ok(BlockInstance::ScanAndRemoveCard(list)),
            BlockKind::ClearList => Ok(BlockInstance::ClearList(list)),
        }
    }

    /// Builds an instance from raw field state, the way the editor hands it over.
    pub fn from_fields(kind: BlockKind, list_name: Option<&str>) -> Result<Self, BlockError> {
        match (kind, list_name) {
            (BlockKind::ScanCard, None) => Ok(BlockInstance::ScanCard),
            (BlockKind::ScanCard, Some(_)) => Err(BlockError::UnexpectedListId(kind)),
            (_, Some(raw)) => Self::with_list(kind, ListId::from_str(raw)?),
            (_, None) => Err(BlockError::MissingListId(kind)),
        }
    }

    pub fn kind(self) -> BlockKind {
        match self {
            BlockInstance::ScanCard => BlockKind::ScanCard,
            BlockInstance::ScanAndCheck(_) => BlockKind::ScanAndCheck,
            BlockInstance::ScanAndAddCard(_) => BlockKind::ScanAndAddCard,
            BlockInstance::ScanAndRemoveCard(_) => BlockKind::ScanAndRemoveCard,
            BlockInstance::ClearList(_) => BlockKind::ClearList,
        }
    }

    pub fn list_name(self) -> Option<ListId> {
        match self {
            BlockInstance::ScanCard => None,
            BlockInstance::ScanAndCheck(list)
            | BlockInstance::ScanAndAddCard(list)
            | BlockInstance::ScanAndRemoveCard(list)
            | BlockInstance::ClearList(list) => Some(list),
        }
    }
}

/// Blocks in the execution order the editor walks them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Program {
    pub blocks: Vec<BlockInstance>,
}

impl Program {
    pub fn new(blocks: Vec<BlockInstance>) -> Self {
        Self { blocks }
    }

    pub fn push(&mut self, block: BlockInstance) {
        self.blocks.push(block);
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Loads `[{"kind": "clear_list", "list_name": "3"}, ...]`.
    pub fn from_json_str(text: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(text).context("Program is not valid JSON.")?;
        Self::from_json(&value)
    }

    pub fn from_json(value: &Value) -> Result<Self> {
        let entries = value
            .as_array()
            .ok_or_else(|| anyhow!("Program must be a JSON array of blocks."))?;
        let mut blocks = Vec::with_capacity(entries.len());
        for (index, entry) in entries.iter().enumerate() {
            blocks.push(
                block_from_json(entry).with_context(|| format!("Invalid block at index {}.", index))?,
            );
        }
        Ok(Self { blocks })
    }
}

fn block_from_json(entry: &Value) -> Result<BlockInstance> {
    let obj = entry
        .as_object()
        .ok_or_else(|| anyhow!("Block must be a JSON object."))?;
    let kind = obj
        .get("kind")
        .and_then(Value::as_str)
        .ok_or_else(|| anyhow!("Block is missing string field 'kind'."))?;
    let kind = BlockKind::from_str(kind)?;
    let list_name = match obj.get("list_name") {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s.as_str()),
        Some(other) => {
            return Err(anyhow!(
                "Field 'list_name' must be a string, found {}.",
                other
            ))
        }
    };
    Ok(BlockInstance::from_fields(kind, list_name)?)
}
