use crate::core::types::{
    MilitaryId, MilitaryKindId, PersonId, Point, SettlementId, TroopId,
};
use thiserror::Error;

/// A command's precondition did not hold; world state is unchanged
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Person not found: {0}")]
    PersonNotFound(PersonId),

    #[error("Settlement not found: {0}")]
    SettlementNotFound(SettlementId),

    #[error("Troop not found: {0}")]
    TroopNotFound(TroopId),

    #[error("Military not found: {0}")]
    MilitaryNotFound(MilitaryId),

    #[error("Military kind not found: {0}")]
    MilitaryKindNotFound(MilitaryKindId),

    #[error("Person {person} is not in settlement {settlement}")]
    MayorNotPresent {
        person: PersonId,
        settlement: SettlementId,
    },

    #[error("Person {person} is not available in settlement {settlement}")]
    PersonNotPresent {
        person: PersonId,
        settlement: SettlementId,
    },

    #[error("Settlement {0} belongs to no faction and may not have a mayor")]
    NoFaction(SettlementId),

    #[error("Mayor of settlement {0} cannot change while the faction leader is present")]
    FactionLeaderPresent(SettlementId),

    #[error("Settlement {0} already has a mayor")]
    MayorAlreadyAssigned(SettlementId),

    #[error("Settlement {settlement} cannot create military kind {kind}")]
    KindNotCreatable {
        settlement: SettlementId,
        kind: MilitaryKindId,
    },

    #[error("Insufficient fund: need {needed}, have {available}")]
    InsufficientFund { needed: i32, available: i32 },

    #[error("Military {0} has no persons to lead it")]
    NoLeader(MilitaryId),

    #[error("Military {0} is not garrisoned in a settlement")]
    NotGarrisoned(MilitaryId),

    #[error("Military {0} has no soldiers to deploy")]
    EmptyRoster(MilitaryId),

    #[error("Cell {0} cannot hold a unit")]
    CellNotPlaceable(Point),

    #[error("Cell {cell} is not next to settlement {settlement}")]
    OutOfDeployRange {
        cell: Point,
        settlement: SettlementId,
    },

    #[error("Troop {0} has no friendly settlement to enter")]
    NothingToEnter(TroopId),

    #[error("Troop {0} is not standing on a hostile settlement")]
    NothingToOccupy(TroopId),

    #[error("World is read-only: {0}")]
    ReadOnly(#[from] IndexError),
}

/// Scenario data references something that does not exist; loading aborts
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DataIntegrityError {
    #[error("{table} row {row}: field '{field}' references missing id {target}")]
    MissingReference {
        table: &'static str,
        row: u32,
        field: &'static str,
        target: u32,
    },

    #[error("{table}: duplicate id {id}")]
    DuplicateId { table: &'static str, id: u32 },

    #[error("{table} row {row}: field '{field}' has malformed value '{value}'")]
    Malformed {
        table: &'static str,
        row: u32,
        field: &'static str,
        value: String,
    },

    #[error("troops row {0}: no military is deployed as this troop")]
    UnmannedTroop(u32),

    #[error("map has {actual} cells, expected {expected}")]
    MapSize { expected: usize, actual: usize },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IndexError {
    #[error("This index has been made read-only")]
    ReadOnly,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Invalid TOML: {0}")]
    Parse(String),

    #[error("Invalid tunable: {0}")]
    Invalid(String),
}

impl From<toml::de::Error> for ConfigError {
    fn from(e: toml::de::Error) -> Self {
        ConfigError::Parse(e.to_string())
    }
}

#[derive(Error, Debug)]
pub enum SimError {
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("Data integrity error: {0}")]
    DataIntegrity(#[from] DataIntegrityError),

    #[error(transparent)]
    Index(#[from] IndexError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SimError>;
