use anyhow::Result;
use regex::Regex;
use serde_json::{json, Value};
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

pub const BLOCK_COLOUR: &str = "#cb2026";

/// Module every emitted call goes through.
pub const RFID_MODULE: &str = "rfid";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockError {
    UnknownKind(String),
    UnknownListId(String),
    MissingListId(BlockKind),
    UnexpectedListId(BlockKind),
    TemplateMismatch(BlockKind),
}

impl Display for BlockError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            BlockError::UnknownKind(kind) => write!(f, "Unknown block kind '{}'.", kind),
            BlockError::UnknownListId(id) => write!(
                f,
                "Unknown RFID list '{}' (expected one of 1, 2, 3, 4, 5).",
                id
            ),
            BlockError::MissingListId(kind) => {
                write!(f, "Block '{}' requires a list_name field.", kind.name())
            }
            BlockError::UnexpectedListId(kind) => {
                write!(f, "Block '{}' does not take a list_name field.", kind.name())
            }
            BlockError::TemplateMismatch(kind) => write!(
                f,
                "Display template of block '{}' does not reference each field exactly by number.",
                kind.name()
            ),
        }
    }
}

impl Error for BlockError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BlockKind {
    ScanCard,
    ScanAndCheck,
    ScanAndAddCard,
    ScanAndRemoveCard,
    ClearList,
}

impl BlockKind {
    pub const ALL: [BlockKind; 5] = [
        BlockKind::ScanCard,
        BlockKind::ScanAndCheck,
        BlockKind::ScanAndAddCard,
        BlockKind::ScanAndRemoveCard,
        BlockKind::ClearList,
    ];

    pub fn name(self) -> &'static str {
        match self {
            BlockKind::ScanCard => "scan_card",
            BlockKind::ScanAndCheck => "scan_and_check",
            BlockKind::ScanAndAddCard => "scan_and_add_card",
            BlockKind::ScanAndRemoveCard => "scan_and_remove_card",
            BlockKind::ClearList => "clear_list",
        }
    }

    pub fn spec(self) -> &'static BlockSpec {
        BlockSpec::for_kind(self)
    }

    pub fn takes_list(self) -> bool {
        !self.spec().fields.is_empty()
    }
}

impl FromStr for BlockKind {
    type Err = BlockError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        BlockKind::ALL
            .into_iter()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| BlockError::UnknownKind(s.to_string()))
    }
}

/// One of the five persistent card lists on the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ListId {
    One,
    Two,
    Three,
    Four,
    Five,
}

impl ListId {
    pub const ALL: [ListId; 5] = [
        ListId::One,
        ListId::Two,
        ListId::Three,
        ListId::Four,
        ListId::Five,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ListId::One => "1",
            ListId::Two => "2",
            ListId::Three => "3",
            ListId::Four => "4",
            ListId::Five => "5",
        }
    }

    /// Name the runtime library stores the list under, e.g. `rfids_3`.
    pub fn list_name(self) -> String {
        format!("rfids_{}", self.as_str())
    }
}

impl FromStr for ListId {
    type Err = BlockError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        ListId::ALL
            .into_iter()
            .find(|id| id.as_str() == s)
            .ok_or_else(|| BlockError::UnknownListId(s.to_string()))
    }
}

impl Display for ListId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockShape {
    /// Produces a value that a consuming block embeds inline.
    Expression,
    /// Produces a line that chains with the statements around it.
    Statement,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Dropdown,
}

#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
    pub options: &'static [ListId],
}

#[derive(Debug, Clone, Copy)]
pub struct BlockSpec {
    pub kind: BlockKind,
    pub display_template: &'static str,
    pub fields: &'static [FieldSpec],
    pub shape: BlockShape,
    pub colour: &'static str,
    pub tooltip: &'static str,
}

const LIST_FIELD: FieldSpec = FieldSpec {
    name: "list_name",
    kind: FieldKind::Dropdown,
    options: &ListId::ALL,
};

pub static REGISTRY: [BlockSpec; 5] = [
    BlockSpec {
        kind: BlockKind::ScanCard,
        display_template: "scan RFID card",
        fields: &[],
        shape: BlockShape::Expression,
        colour: BLOCK_COLOUR,
        tooltip: "Scan a card and return its ID, or an empty string when no card is present.",
    },
    BlockSpec {
        kind: BlockKind::ScanAndCheck,
        display_template: "scan RFID card and check it is in list %1",
        fields: &[LIST_FIELD],
        shape: BlockShape::Expression,
        colour: BLOCK_COLOUR,
        tooltip: "Scan a card and return true if its ID is stored in the chosen list.",
    },
    BlockSpec {
        kind: BlockKind::ScanAndAddCard,
        display_template: "scan RFID card and add it to list %1",
        fields: &[LIST_FIELD],
        shape: BlockShape::Statement,
        colour: BLOCK_COLOUR,
        tooltip: "Scan a card and save its ID to the chosen list.",
    },
    BlockSpec {
        kind: BlockKind::ScanAndRemoveCard,
        display_template: "scan RFID card and remove it from list %1",
        fields: &[LIST_FIELD],
        shape: BlockShape::Statement,
        colour: BLOCK_COLOUR,
        tooltip: "Scan a card and delete its ID from the chosen list.",
    },
    BlockSpec {
        kind: BlockKind::ClearList,
        display_template: "clear RFID list %1",
        fields: &[LIST_FIELD],
        shape: BlockShape::Statement,
        colour: BLOCK_COLOUR,
        tooltip: "Delete every card ID stored in the chosen list.",
    },
];

impl BlockSpec {
    pub fn for_kind(kind: BlockKind) -> &'static BlockSpec {
        match kind {
            BlockKind::ScanCard => &REGISTRY[0],
            BlockKind::ScanAndCheck => &REGISTRY[1],
            BlockKind::ScanAndAddCard => &REGISTRY[2],
            BlockKind::ScanAndRemoveCard => &REGISTRY[3],
            BlockKind::ClearList => &REGISTRY[4],
        }
    }

    /// Placeholder numbers (`%1`, `%2`, ...) used in the display template.
    pub fn placeholders(&self) -> Result<BTreeSet<usize>> {
        let re = Regex::new(r"%(\d+)")?;
        let mut found = BTreeSet::new();
        for caps in re.captures_iter(self.display_template) {
            found.insert(caps[1].parse::<usize>()?);
        }
        Ok(found)
    }

    /// Checks that the template names fields `%1..=%n`, one per field.
    pub fn validate(&self) -> Result<()> {
        let expected = (1..=self.fields.len()).collect::<BTreeSet<_>>();
        if self.placeholders()? != expected {
            return Err(BlockError::TemplateMismatch(self.kind).into());
        }
        Ok(())
    }

    /// Editor definition object for this block.
    pub fn definition_json(&self) -> Value {
        let args = self
            .fields
            .iter()
            .map(|field| match field.kind {
                FieldKind::Dropdown => json!({
                    "type": "field_dropdown",
                    "name": field.name,
                    "options": field
                        .options
                        .iter()
                        .map(|id| json!([id.as_str(), id.as_str()]))
                        .collect::<Vec<_>>(),
                }),
            })
            .collect::<Vec<_>>();

        let mut def = json!({
            "type": self.kind.name(),
            "message0": self.display_template,
            "colour": self.colour,
            "tooltip": self.tooltip,
            "helpUrl": "",
        });
        if !args.is_empty() {
            def["args0"] = Value::Array(args);
        }
        match self.shape {
            BlockShape::Expression => {
                def["output"] = Value::Null;
            }
            BlockShape::Statement => {
                def["previousStatement"] = Value::Null;
                def["nextStatement"] = Value::Null;
            }
        }
        def
    }
}

pub fn definitions_json() -> Result<Value> {
    let mut defs = Vec::with_capacity(REGISTRY.len());
    for spec in &REGISTRY {
        spec.validate()?;
        defs.push(spec.definition_json());
    }
    Ok(Value::Array(defs))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_is_indexed_by_kind() {
        for kind in BlockKind::ALL {
            assert_eq!(BlockSpec::for_kind(kind).kind, kind);
        }
    }

    #[test]
    fn template_placeholders_match_fields() {
        for spec in &REGISTRY {
            let expected = (1..=spec.fields.len()).collect::<BTreeSet<_>>();
            assert_eq!(spec.placeholders().unwrap(), expected, "{}", spec.kind.name());
            spec.validate().unwrap();
        }
    }

    #[test]
    fn validate_rejects_template_field_mismatch() {
        let missing = BlockSpec {
            display_template: "clear RFID list",
            ..REGISTRY[4]
        };
        let err = missing.validate().unwrap_err();
        assert_eq!(
            err.downcast_ref::<BlockError>(),
            Some(&BlockError::TemplateMismatch(BlockKind::ClearList))
        );

        let extra = BlockSpec {
            display_template: "scan RFID card %1",
            ..REGISTRY[0]
        };
        assert!(extra.validate().is_err());
    }

    #[test]
    fn kind_names_round_trip() {
        for kind in BlockKind::ALL {
            assert_eq!(kind.name().parse::<BlockKind>(), Ok(kind));
        }
        assert_eq!(
            "scan_everything".parse::<BlockKind>(),
            Err(BlockError::UnknownKind("scan_everything".to_string()))
        );
    }

    #[test]
    fn list_ids_are_closed() {
        assert_eq!("4".parse::<ListId>(), Ok(ListId::Four));
        assert_eq!(ListId::Four.list_name(), "rfids_4");
        for bad in ["0", "6", "", " 1", "one"] {
            assert!(bad.parse::<ListId>().is_err(), "{:?}", bad);
        }
    }

    #[test]
    fn only_scan_card_has_no_list() {
        for kind in BlockKind::ALL {
            assert_eq!(kind.takes_list(), kind != BlockKind::ScanCard);
        }
    }

    #[test]
    fn definition_json_reflects_shape() {
        let check = BlockKind::ScanAndCheck.spec().definition_json();
        assert_eq!(check["type"], "scan_and_check");
        assert!(check.get("output").is_some());
        assert!(check.get("previousStatement").is_none());
        assert_eq!(check["args0"][0]["name"], "list_name");
        assert_eq!(check["args0"][0]["options"].as_array().map(Vec::len), Some(5));

        let clear = BlockKind::ClearList.spec().definition_json();
        assert!(clear.get("output").is_none());
        assert!(clear.get("previousStatement").is_some());
        assert!(clear.get("nextStatement").is_some());

        let scan = BlockKind::ScanCard.spec().definition_json();
        assert!(scan.get("args0").is_none());
        assert_eq!(definitions_json().unwrap().as_array().map(Vec::len), Some(5));
    }
}
