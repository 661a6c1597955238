//! gh-github: GitHub REST client and the operations exposed to the model
//!
//! [`GitHubClient`] wraps the REST API for one authenticated account;
//! [`operations`] turns each supported action into a [`gh_core::Tool`].

use std::sync::Arc;

use gh_core::ToolManager;

pub mod client;
pub mod error;
pub mod models;
pub mod operations;

pub use client::GitHubClient;
pub use error::{GitHubError, Result};
pub use models::*;
pub use operations::*;

/// Register every GitHub operation with the tool manager
pub fn register_default_tools(manager: &mut ToolManager<GitHubClient>) {
    // user
    manager.register(Arc::new(GetUserInfoTool));
    manager.register(Arc::new(GetAnyUserInfoTool));

    // repositories
    manager.register(Arc::new(ListReposTool));
    manager.register(Arc::new(CreateRepoTool));
    manager.register(Arc::new(DeleteRepoTool));
    manager.register(Arc::new(ForkRepoTool));
    manager.register(Arc::new(GetRepoStatsTool));

    // files
    manager.register(Arc::new(ListFilesTool));
    manager.register(Arc::new(GetFileContentTool));
    manager.register(Arc::new(CreateFileTool));
    manager.register(Arc::new(UpdateFileTool));
    manager.register(Arc::new(DeleteFileTool));

    // collaborators
    manager.register(Arc::new(ListCollaboratorsTool));
    manager.register(Arc::new(AddCollaboratorTool));
    manager.register(Arc::new(RemoveCollaboratorTool));

    // issues
    manager.register(Arc::new(CreateIssueTool));
    manager.register(Arc::new(ListIssuesTool));
    manager.register(Arc::new(CloseIssueTool));

    // branches
    manager.register(Arc::new(ListBranchesTool));
    manager.register(Arc::new(CreateBranchTool));

    // search
    manager.register(Arc::new(SearchReposTool));
    manager.register(Arc::new(SearchUsersTool));
}
