use crate::models::ItemCategory;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("Access denied for {0}")]
    AuthorizationDenied(ItemCategory),

    #[error("Store not authorized for {0}, request access first")]
    NotAuthorized(ItemCategory),

    #[error("Unsupported item")]
    UnsupportedItemForCategory,

    #[error("Save failed: {0}")]
    StoreSave(String),

    #[error("Remove failed: {0}")]
    StoreRemove(String),

    #[error("Commit failed: {0}")]
    StoreCommit(String),

    #[error("Fetch failed: {0}")]
    StoreFetch(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Dispatcher error: {0}")]
    Dispatch(String),

    #[error("Error: {0}")]
    Other(#[from] anyhow::Error),
}

impl BridgeError {
    pub fn store_save<S: Into<String>>(msg: S) -> Self {
        Self::StoreSave(msg.into())
    }

    pub fn store_remove<S: Into<String>>(msg: S) -> Self {
        Self::StoreRemove(msg.into())
    }

    pub fn store_commit<S: Into<String>>(msg: S) -> Self {
        Self::StoreCommit(msg.into())
    }

    pub fn store_fetch<S: Into<String>>(msg: S) -> Self {
        Self::StoreFetch(msg.into())
    }

    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::Config(msg.into())
    }

    pub fn dispatch<S: Into<String>>(msg: S) -> Self {
        Self::Dispatch(msg.into())
    }

    /// True for failures raised by the store while staging or committing.
    pub fn is_store_failure(&self) -> bool {
        matches!(
            self,
            Self::StoreSave(_) | Self::StoreRemove(_) | Self::StoreCommit(_) | Self::StoreFetch(_)
        )
    }
}

pub type BridgeResult<T> = Result<T, BridgeError>;
