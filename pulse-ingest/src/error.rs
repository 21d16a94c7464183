use thiserror::Error;

use crate::exports::DatasetKind;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum IngestError {
    #[error("missing required exports: {}", list_kinds(.0))]
    MissingDatasets(Vec<DatasetKind>),
}

fn list_kinds(kinds: &[DatasetKind]) -> String {
    kinds
        .iter()
        .map(|k| k.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
