use bt_blackboard::BlackboardError;
use bt_core::{BtError, TemplateId};
use bt_tree::TreeError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Config(#[from] BtError),

    #[error("template error: {0}")]
    Tree(#[from] TreeError),

    #[error("blackboard error: {0}")]
    Blackboard(#[from] BlackboardError),

    #[error("unknown template {0}")]
    UnknownTemplate(TemplateId),

    #[error("failed to start worker pool: {0}")]
    ThreadPool(String),
}

pub type EngineResult<T> = Result<T, EngineError>;
