use bt_blackboard::BlackboardError;
use bt_core::{BtError, NodeIndex, TemplateId};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TreeError {
    #[error("template limit of {limit} reached")]
    TemplateCapacity { limit: usize },

    #[error("a template named '{0}' already exists")]
    DuplicateTemplate(String),

    #[error("unknown template {0}")]
    UnknownTemplate(TemplateId),

    #[error("{template} already holds {limit} nodes")]
    NodeCapacity { template: TemplateId, limit: usize },

    #[error("{template} already has root {existing}")]
    DuplicateRoot { template: TemplateId, existing: NodeIndex },

    #[error("parent {parent} does not exist in {template}")]
    InvalidParent { template: TemplateId, parent: NodeIndex },

    #[error("decorator {parent} in {template} already has a child")]
    DecoratorArity { template: TemplateId, parent: NodeIndex },

    #[error("leaf {parent} in {template} cannot have children")]
    LeafChild { template: TemplateId, parent: NodeIndex },

    #[error("template '{name}' ({template}) has no root node")]
    NoRoot { template: TemplateId, name: String },

    #[error("variable error: {0}")]
    Blackboard(#[from] BlackboardError),

    #[error(transparent)]
    Config(#[from] BtError),
}

pub type TreeResult<T> = Result<T, TreeError>;
